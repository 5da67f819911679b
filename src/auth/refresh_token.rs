/// Refresh Token Store
///
/// Refresh tokens are:
/// - 32 bytes from the OS CSPRNG, hex encoded (256 bits of entropy)
/// - Hashed with SHA-256 before storage (never store plaintext)
/// - Reusable until revoked or expired; a refresh does not rotate them
/// - Revocable exactly once

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AppError, DatabaseError};
use crate::repository::RefreshTokenRepository;

const REFRESH_TOKEN_BYTES: usize = 32;

/// Server-side record of an issued refresh token
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Revoked,
    Expired,
}

impl RefreshTokenRecord {
    /// Revocation wins over expiry when both apply.
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked_at.is_some() {
            RefreshTokenState::Revoked
        } else if now >= self.expires_at {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }

    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == RefreshTokenState::Active
    }

    pub fn is_usable(&self) -> bool {
        self.is_usable_at(Utc::now())
    }
}

/// Generate a new raw refresh token.
///
/// This is what the client holds; the server only ever stores its digest.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 of the raw token, hex encoded
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issue a refresh token for `user_id`, valid for `ttl` from now.
///
/// # Errors
/// Returns error if the insert fails
pub async fn issue_refresh_token<R>(
    repository: &R,
    user_id: Uuid,
    ttl: Duration,
) -> Result<String, AppError>
where
    R: RefreshTokenRepository + ?Sized,
{
    let token = generate_refresh_token();
    let now = Utc::now();
    let record = RefreshTokenRecord {
        token_hash: hash_token(&token),
        user_id,
        created_at: now,
        expires_at: now + ttl,
        revoked_at: None,
    };

    repository.create_refresh_token(&record).await?;

    tracing::debug!(user_id = %user_id, expires_at = %record.expires_at, "Refresh token issued");
    Ok(token)
}

/// Look up the record for a raw token, exact match only.
///
/// # Errors
/// `NotFound` if no record matches
pub async fn lookup_refresh_token<R>(
    repository: &R,
    token: &str,
) -> Result<RefreshTokenRecord, AppError>
where
    R: RefreshTokenRepository + ?Sized,
{
    repository
        .get_refresh_token(&hash_token(token))
        .await?
        .ok_or_else(|| AppError::not_found("refresh token"))
}

/// Mark a refresh token revoked.
///
/// # Errors
/// `NotFound` if the token does not exist or was already revoked
pub async fn revoke_refresh_token<R>(repository: &R, token: &str) -> Result<(), AppError>
where
    R: RefreshTokenRepository + ?Sized,
{
    let revoked = repository
        .mark_refresh_token_revoked(&hash_token(token), Utc::now())
        .await?;

    if revoked {
        Ok(())
    } else {
        Err(AppError::Database(DatabaseError::NotFound(
            "live refresh token".to_string(),
        )))
    }
}

/// Delete every record whose expiry has passed
pub async fn purge_expired_refresh_tokens<R>(repository: &R) -> Result<u64, AppError>
where
    R: RefreshTokenRepository + ?Sized,
{
    let purged = repository.delete_expired_refresh_tokens(Utc::now()).await?;
    tracing::info!(purged = purged, "Expired refresh tokens purged");
    Ok(purged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use crate::repository::UserRepository;

    #[test]
    fn test_generate_refresh_token() {
        let token = generate_refresh_token();

        // 32 bytes, hex encoded
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let first = generate_refresh_token();
        let second = generate_refresh_token();

        assert_ne!(first, second);
    }

    #[test]
    fn test_token_hashing() {
        let token = generate_refresh_token();
        let hash1 = hash_token(&token);
        let hash2 = hash_token(&token);

        assert_eq!(hash1, hash2);
        assert_ne!(token, hash1);
        assert_eq!(hash1.len(), 64);
    }

    fn record(expires_in: Duration, revoked: bool) -> RefreshTokenRecord {
        let now = Utc::now();
        RefreshTokenRecord {
            token_hash: hash_token("t"),
            user_id: Uuid::new_v4(),
            created_at: now,
            expires_at: now + expires_in,
            revoked_at: revoked.then_some(now),
        }
    }

    #[test]
    fn test_usable_states() {
        let now = Utc::now();

        assert_eq!(record(Duration::days(1), false).state_at(now), RefreshTokenState::Active);
        assert_eq!(record(Duration::days(-1), false).state_at(now), RefreshTokenState::Expired);
        assert_eq!(record(Duration::days(1), true).state_at(now), RefreshTokenState::Revoked);
        assert_eq!(record(Duration::days(-1), true).state_at(now), RefreshTokenState::Revoked);

        assert!(record(Duration::days(1), false).is_usable());
        assert!(!record(Duration::days(-1), false).is_usable());
        assert!(!record(Duration::days(1), true).is_usable());
    }

    #[test]
    fn test_expiry_boundary_is_not_usable() {
        let record = record(Duration::days(1), false);
        assert!(!record.is_usable_at(record.expires_at));
    }

    async fn repository_with_user() -> (MemoryRepository, Uuid) {
        let repository = MemoryRepository::new();
        let user = repository
            .create_user("a@b.com", "hash")
            .await
            .expect("Failed to create user");
        (repository, user.id)
    }

    #[tokio::test]
    async fn test_issue_then_lookup() {
        let (repository, user_id) = repository_with_user().await;

        let token = issue_refresh_token(&repository, user_id, Duration::days(60))
            .await
            .expect("Failed to issue token");
        let record = lookup_refresh_token(&repository, &token)
            .await
            .expect("Failed to look up token");

        assert_eq!(record.user_id, user_id);
        assert!(record.revoked_at.is_none());
        assert_ne!(record.token_hash, token);

        let expected = Utc::now() + Duration::days(60);
        let drift = (record.expires_at - expected).num_seconds().abs();
        assert!(drift <= 5, "expires_at drifted by {}s", drift);
    }

    #[tokio::test]
    async fn test_lookup_is_exact_match() {
        let (repository, user_id) = repository_with_user().await;
        let token = issue_refresh_token(&repository, user_id, Duration::days(60))
            .await
            .expect("Failed to issue token");

        let prefix = &token[..32];
        let result = lookup_refresh_token(&repository, prefix).await;
        assert!(matches!(result, Err(AppError::Database(DatabaseError::NotFound(_)))));

        let result = lookup_refresh_token(&repository, "unknown").await;
        assert!(matches!(result, Err(AppError::Database(DatabaseError::NotFound(_)))));
    }

    #[tokio::test]
    async fn test_revoke_is_one_way() {
        let (repository, user_id) = repository_with_user().await;
        let token = issue_refresh_token(&repository, user_id, Duration::days(60))
            .await
            .expect("Failed to issue token");

        revoke_refresh_token(&repository, &token)
            .await
            .expect("First revoke should succeed");

        let record = lookup_refresh_token(&repository, &token)
            .await
            .expect("Revoked tokens stay on record");
        assert!(record.revoked_at.is_some());
        assert!(!record.is_usable());

        let second = revoke_refresh_token(&repository, &token).await;
        assert!(matches!(second, Err(AppError::Database(DatabaseError::NotFound(_)))));

        let after = lookup_refresh_token(&repository, &token)
            .await
            .expect("Revoked tokens stay on record");
        assert_eq!(after.revoked_at, record.revoked_at);
    }

    #[tokio::test]
    async fn test_revoke_unknown_token() {
        let repository = MemoryRepository::new();
        let result = revoke_refresh_token(&repository, "nope").await;

        assert!(matches!(result, Err(AppError::Database(DatabaseError::NotFound(_)))));
    }

    #[tokio::test]
    async fn test_purge_only_removes_expired() {
        let (repository, user_id) = repository_with_user().await;
        let live = issue_refresh_token(&repository, user_id, Duration::days(60))
            .await
            .expect("Failed to issue token");
        let dead = issue_refresh_token(&repository, user_id, Duration::seconds(-10))
            .await
            .expect("Failed to issue token");

        let purged = purge_expired_refresh_tokens(&repository)
            .await
            .expect("Failed to purge");

        assert_eq!(purged, 1);
        assert!(lookup_refresh_token(&repository, &live).await.is_ok());
        assert!(lookup_refresh_token(&repository, &dead).await.is_err());
    }
}
