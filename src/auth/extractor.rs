use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use uuid::Uuid;

use crate::auth::session::SessionManager;
use crate::error::AppError;

/// Identity of the caller behind a valid bearer access token.
///
/// Taking this as a handler argument makes the route protected: requests
/// without a valid token, or whose user has been deleted, never reach the
/// handler body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let sessions = req.app_data::<web::Data<SessionManager>>().cloned();
        let headers = req.headers().clone();

        Box::pin(async move {
            let sessions = sessions.ok_or_else(|| {
                AppError::Internal("session manager is not registered".to_string())
            })?;

            sessions.authenticate(&headers).await.map(AuthenticatedUser)
        })
    }
}
