/// Access Token Codec
///
/// Mints and validates short-lived HS256 access tokens. The server keeps no
/// record of them: a token is valid iff its signature verifies under the one
/// shared secret and the clock has not reached its `exp`.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, TokenRejection};

/// No access token outlives this, whatever the caller asks for.
pub const MAX_ACCESS_TOKEN_TTL_SECS: i64 = 3600;

pub struct AccessTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl AccessTokenCodec {
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
        }
    }

    pub fn from_settings(settings: &JwtSettings) -> Self {
        Self::new(&settings.secret, settings.issuer.clone())
    }

    /// Mint an access token for `user_id`.
    ///
    /// `ttl` is capped at one hour. Zero or negative values are accepted and
    /// produce a token that is already expired.
    ///
    /// # Errors
    /// Returns an internal error if signing fails
    pub fn generate_access_token(&self, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
        let ttl = ttl.min(Duration::seconds(MAX_ACCESS_TOKEN_TTL_SECS));
        let claims = Claims::new(user_id, ttl, self.issuer.clone());

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Validate an access token and return the user it was minted for.
    ///
    /// Signature is checked before expiry, so an expired token signed with
    /// some other secret reports `InvalidSignature`.
    pub fn validate_access_token(&self, token: &str) -> Result<Uuid, TokenRejection> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let rejection = match e.kind() {
                    ErrorKind::InvalidSignature => TokenRejection::InvalidSignature,
                    ErrorKind::ExpiredSignature => TokenRejection::Expired,
                    _ => TokenRejection::Malformed,
                };
                tracing::debug!(error = %e, reason = %rejection, "Access token rejected");
                rejection
            })?;

        // jsonwebtoken only rejects once `exp` is strictly in the past
        if claims.is_expired() {
            return Err(TokenRejection::Expired);
        }

        claims.user_id()
    }
}
