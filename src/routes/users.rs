use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::{hash_password, AuthenticatedUser};
use crate::error::{AppError, ErrorContext};
use crate::models::UserResponse;
use crate::repository::Repository;
use crate::validators::{is_valid_email, require_password};

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/users
///
/// # Errors
/// - 400: Empty or malformed email, empty password
/// - 409: Email already registered
pub async fn create_user(
    form: web::Json<UserRequest>,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_create");

    let email = is_valid_email(&form.email)?;
    let password = require_password(&form.password)?;
    let hashed_password = hash_password(password)?;

    let user = repository
        .create_user(&email, &hashed_password)
        .await
        .map_err(|e| {
            context.log_error(&e);
            e
        })?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User created"
    );

    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// PUT /api/users
///
/// Replaces the caller's email and password.
pub async fn update_user(
    caller: AuthenticatedUser,
    form: web::Json<UserRequest>,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_update").with_user_id(caller.id().to_string());

    let email = is_valid_email(&form.email)?;
    let password = require_password(&form.password)?;
    let hashed_password = hash_password(password)?;

    let user = repository
        .update_user(caller.id(), &email, &hashed_password)
        .await
        .map_err(|e| {
            context.log_error(&e);
            e
        })?
        .ok_or_else(|| AppError::not_found("user"))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User updated"
    );

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}
