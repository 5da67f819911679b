/// Access token claims
///
/// The payload of every access token: who it is for, who minted it and
/// the window in which it is valid (RFC 7519 registered claims only).

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TokenRejection;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    pub iss: String,
}

impl Claims {
    /// Claims for `user_id` valid for `ttl` from now.
    ///
    /// A zero or negative `ttl` yields claims that are already expired.
    pub fn new(user_id: Uuid, ttl: Duration, issuer: impl Into<String>) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            iat: now,
            exp: now + ttl.num_seconds(),
            iss: issuer.into(),
        }
    }

    pub fn user_id(&self) -> Result<Uuid, TokenRejection> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenRejection::Malformed)
    }

    /// Expired once the clock reaches `exp`.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
