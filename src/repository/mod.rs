/// Persistence boundary
///
/// Handlers and the session manager only talk to these traits. Postgres
/// backs them in production; the in-memory backend serves tests and
/// local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::RefreshTokenRecord;
use crate::error::AppError;
use crate::models::{Post, PostFilter, User};

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with a unique-constraint error if the email is taken
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, AppError>;

    async fn upgrade_user(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Removes every user along with their posts and refresh tokens
    async fn delete_all_users(&self) -> Result<u64, AppError>;
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;

    async fn get_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, AppError>;

    /// `false` when no unrevoked record matches
    async fn mark_refresh_token_revoked(
        &self,
        token_hash: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    async fn delete_expired_refresh_tokens(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create_post(&self, user_id: Uuid, body: &str) -> Result<Post, AppError>;

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, AppError>;

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, AppError>;

    /// `false` when there was nothing to delete
    async fn delete_post(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Everything the service needs from storage
pub trait Repository: UserRepository + RefreshTokenRepository + PostRepository {}

impl<T> Repository for T where T: UserRepository + RefreshTokenRepository + PostRepository {}
