/// In-memory repository.
///
/// Mirrors the Postgres constraints that matter to callers: unique emails,
/// foreign keys from posts and refresh tokens to users, and revocation
/// that only touches unrevoked rows.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{PostRepository, RefreshTokenRepository, UserRepository};
use crate::auth::RefreshTokenRecord;
use crate::error::{AppError, DatabaseError};
use crate::models::{Post, PostFilter, SortOrder, User};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
    // insertion order doubles as a tiebreak when timestamps collide
    posts: Vec<Post>,
}

#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("memory repository lock poisoned".to_string()))
    }
}

fn duplicate_email() -> AppError {
    AppError::Database(DatabaseError::UniqueConstraintViolation(
        "Email already registered".to_string(),
    ))
}

fn missing_user(user_id: Uuid) -> AppError {
    AppError::Database(DatabaseError::UnexpectedError(format!(
        "foreign key violation: user {} does not exist",
        user_id
    )))
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let mut state = self.lock()?;
        if state.users.values().any(|u| u.email == email) {
            return Err(duplicate_email());
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_premium: false,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let state = self.lock()?;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, AppError> {
        let mut state = self.lock()?;
        if state.users.values().any(|u| u.email == email && u.id != id) {
            return Err(duplicate_email());
        }

        Ok(state.users.get_mut(&id).map(|user| {
            user.email = email.to_string();
            user.hashed_password = hashed_password.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn upgrade_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let mut state = self.lock()?;
        Ok(state.users.get_mut(&id).map(|user| {
            user.is_premium = true;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete_all_users(&self) -> Result<u64, AppError> {
        let mut state = self.lock()?;
        let deleted = state.users.len() as u64;
        state.users.clear();
        state.posts.clear();
        state.refresh_tokens.clear();
        Ok(deleted)
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryRepository {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError> {
        let mut state = self.lock()?;
        if !state.users.contains_key(&record.user_id) {
            return Err(missing_user(record.user_id));
        }
        if state.refresh_tokens.contains_key(&record.token_hash) {
            return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                "refresh token already exists".to_string(),
            )));
        }

        state
            .refresh_tokens
            .insert(record.token_hash.clone(), record.clone());
        Ok(())
    }

    async fn get_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, AppError> {
        Ok(self.lock()?.refresh_tokens.get(token_hash).cloned())
    }

    async fn mark_refresh_token_revoked(
        &self,
        token_hash: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut state = self.lock()?;
        match state.refresh_tokens.get_mut(token_hash) {
            Some(record) if record.revoked_at.is_none() => {
                record.revoked_at = Some(revoked_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_expired_refresh_tokens(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut state = self.lock()?;
        let before = state.refresh_tokens.len();
        state.refresh_tokens.retain(|_, record| record.expires_at > now);
        Ok((before - state.refresh_tokens.len()) as u64)
    }
}

#[async_trait]
impl PostRepository for MemoryRepository {
    async fn create_post(&self, user_id: Uuid, body: &str) -> Result<Post, AppError> {
        let mut state = self.lock()?;
        if !state.users.contains_key(&user_id) {
            return Err(missing_user(user_id));
        }

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            body: body.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, AppError> {
        let state = self.lock()?;
        let mut posts: Vec<Post> = state
            .posts
            .iter()
            .filter(|p| filter.author_id.map_or(true, |author| p.user_id == author))
            .cloned()
            .collect();

        posts.sort_by_key(|p| p.created_at);
        if filter.sort == SortOrder::Desc {
            posts.reverse();
        }
        Ok(posts)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        Ok(self.lock()?.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.lock()?;
        let before = state.posts.len();
        state.posts.retain(|p| p.id != id);
        Ok(state.posts.len() < before)
    }
}
