/// Session Manager
///
/// Login, refresh, revoke, and the identity probe every protected handler
/// goes through. A session is one access token plus one refresh token
/// issued together; after login they live and die independently.
///
/// Per refresh token: `Active -> Revoked` on explicit revoke, or
/// `Active -> Expired` judged lazily whenever the token is presented.

use std::sync::Arc;

use actix_web::http::header::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::credentials::extract_bearer;
use crate::auth::jwt::AccessTokenCodec;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::refresh_token::{
    issue_refresh_token, lookup_refresh_token, revoke_refresh_token, RefreshTokenState,
};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, DatabaseError, TokenRejection, ValidationError};
use crate::repository::Repository;

lazy_static! {
    // Verified against when the email is unknown, so both login failures
    // cost one bcrypt verification.
    static ref DUMMY_PASSWORD_HASH: Option<String> =
        hash_password("postboard-dummy-password").ok();
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: Uuid,
    pub email: String,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
}

pub struct SessionManager {
    repository: Arc<dyn Repository>,
    codec: AccessTokenCodec,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl SessionManager {
    pub fn new(repository: Arc<dyn Repository>, settings: &JwtSettings) -> Self {
        Self {
            repository,
            codec: AccessTokenCodec::from_settings(settings),
            access_token_ttl: settings.access_token_ttl(),
            refresh_token_ttl: settings.refresh_token_ttl(),
        }
    }

    pub fn codec(&self) -> &AccessTokenCodec {
        &self.codec
    }

    /// Verify email and password and open a session.
    ///
    /// Unknown email and wrong password both fail with the same
    /// `InvalidCredentials`. If the refresh token cannot be issued the
    /// whole login fails; no half session is handed out.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AppError> {
        if request.email.trim().is_empty() {
            return Err(ValidationError::EmptyField("email".to_string()).into());
        }
        if request.password.is_empty() {
            return Err(ValidationError::EmptyField("password".to_string()).into());
        }

        let user = match self.repository.find_user_by_email(request.email.trim()).await? {
            Some(user) => user,
            None => {
                if let Some(dummy) = DUMMY_PASSWORD_HASH.as_deref() {
                    let _ = verify_password(&request.password, dummy);
                }
                tracing::info!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !verify_password(&request.password, &user.hashed_password)? {
            tracing::info!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self
            .codec
            .generate_access_token(user.id, self.access_token_ttl)?;
        let refresh_token =
            issue_refresh_token(self.repository.as_ref(), user.id, self.refresh_token_ttl).await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            id: user.id,
            email: user.email,
            is_premium: user.is_premium,
            created_at: user.created_at,
            updated_at: user.updated_at,
            token,
            refresh_token,
        })
    }

    /// Exchange a live refresh token for a fresh access token.
    ///
    /// The refresh token itself is neither rotated nor extended.
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<RefreshResponse, AppError> {
        let raw = extract_bearer(headers)?;
        let record = self.find_refresh_token(raw).await?;

        match record.state_at(Utc::now()) {
            RefreshTokenState::Active => {}
            RefreshTokenState::Revoked => {
                tracing::warn!(user_id = %record.user_id, "Revoked refresh token presented");
                return Err(TokenRejection::Revoked.into());
            }
            RefreshTokenState::Expired => {
                tracing::info!(user_id = %record.user_id, "Expired refresh token presented");
                return Err(TokenRejection::Expired.into());
            }
        }

        let token = self
            .codec
            .generate_access_token(record.user_id, self.access_token_ttl)?;

        tracing::info!(user_id = %record.user_id, "Access token refreshed");
        Ok(RefreshResponse { token })
    }

    /// Revoke the presented refresh token.
    ///
    /// Unknown, already-revoked and expired tokens all come back
    /// `Unauthorized`, whether or not an expired record has been purged yet.
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let raw = extract_bearer(headers)?;
        let record = self.find_refresh_token(raw).await?;

        match record.state_at(Utc::now()) {
            RefreshTokenState::Active => {}
            RefreshTokenState::Revoked => return Err(TokenRejection::Revoked.into()),
            RefreshTokenState::Expired => return Err(TokenRejection::Expired.into()),
        }

        revoke_refresh_token(self.repository.as_ref(), raw)
            .await
            .map_err(|e| match e {
                AppError::Database(DatabaseError::NotFound(_)) => {
                    AppError::unauthorized(TokenRejection::Revoked)
                }
                other => other,
            })?;

        tracing::info!(user_id = %record.user_id, "Refresh token revoked");
        Ok(())
    }

    /// Identify the caller from a bearer access token.
    ///
    /// A token stays cryptographically valid after its user is deleted, so
    /// the subject is looked up before the id is handed out.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Uuid, AppError> {
        let token = extract_bearer(headers)?;
        let user_id = self.codec.validate_access_token(token)?;

        if self.repository.find_user_by_id(user_id).await?.is_none() {
            tracing::warn!(user_id = %user_id, "Access token for a deleted user");
            return Err(TokenRejection::UnknownUser.into());
        }

        Ok(user_id)
    }

    async fn find_refresh_token(
        &self,
        raw: &str,
    ) -> Result<crate::auth::RefreshTokenRecord, AppError> {
        lookup_refresh_token(self.repository.as_ref(), raw)
            .await
            .map_err(|e| match e {
                AppError::Database(DatabaseError::NotFound(_)) => {
                    tracing::warn!("Unknown refresh token presented");
                    AppError::unauthorized(TokenRejection::UnknownRefreshToken)
                }
                other => other,
            })
    }
}
