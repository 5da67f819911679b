/// Authentication Routes
///
/// Login, access token refresh, and refresh token revocation. The session
/// manager does the work; these handlers only translate HTTP.

use actix_web::{web, HttpRequest, HttpResponse};

use crate::auth::{LoginRequest, SessionManager};
use crate::error::{AppError, ErrorContext};

/// POST /api/login
///
/// Returns the user profile plus `token` (access) and `refresh_token`.
///
/// # Errors
/// - 400: Missing email or password
/// - 401: Invalid credentials (unknown email and wrong password look the same)
/// - 500: Internal server error
pub async fn login(
    form: web::Json<LoginRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let session = sessions.login(&form).await.map_err(|e| {
        context.log_error(&e);
        e
    })?;

    Ok(HttpResponse::Ok().json(session))
}

/// POST /api/refresh
///
/// Takes `Authorization: Bearer <refresh token>` and returns a new access
/// token. The refresh token stays as it was.
///
/// # Errors
/// - 401: Missing, unknown, revoked or expired refresh token
pub async fn refresh(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");

    let refreshed = sessions.refresh(req.headers()).await.map_err(|e| {
        context.log_error(&e);
        e
    })?;

    Ok(HttpResponse::Ok().json(refreshed))
}

/// POST /api/revoke
///
/// Takes `Authorization: Bearer <refresh token>`; 204 on success.
///
/// # Errors
/// - 401: Missing, unknown or already revoked refresh token
pub async fn revoke(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_revoke");

    sessions.revoke(req.headers()).await.map_err(|e| {
        context.log_error(&e);
        e
    })?;

    Ok(HttpResponse::NoContent().finish())
}
