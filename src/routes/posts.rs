/// Post Routes
///
/// Creating and deleting posts requires a bearer access token; reading is
/// public.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::{AppError, AuthError, ErrorContext, ValidationError};
use crate::models::PostFilter;
use crate::moderation::clean_body;
use crate::repository::Repository;
use crate::validators::validate_post_body;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub body: String,
}

fn parse_post_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidFormat("post id".to_string()).into())
}

/// POST /api/posts
///
/// # Errors
/// - 400: Body empty or longer than 140 characters
/// - 401: Missing or invalid access token
pub async fn create_post(
    caller: AuthenticatedUser,
    form: web::Json<CreatePostRequest>,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("post_create").with_user_id(caller.id().to_string());

    let body = clean_body(validate_post_body(&form.body)?);

    let post = repository
        .create_post(caller.id(), &body)
        .await
        .map_err(|e| {
            context.log_error(&e);
            e
        })?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %caller.id(),
        post_id = %post.id,
        "Post created"
    );

    Ok(HttpResponse::Created().json(post))
}

/// GET /api/posts?author_id=<uuid>&sort=asc|desc
pub async fn list_posts(
    filter: web::Query<PostFilter>,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, AppError> {
    let posts = repository.list_posts(&filter).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/{id}
pub async fn get_post(
    path: web::Path<String>,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, AppError> {
    let id = parse_post_id(&path)?;

    let post = repository
        .get_post(id)
        .await?
        .ok_or_else(|| AppError::not_found("post"))?;

    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/posts/{id}
///
/// # Errors
/// - 403: Caller is not the author
/// - 404: No such post
pub async fn delete_post(
    caller: AuthenticatedUser,
    path: web::Path<String>,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("post_delete").with_user_id(caller.id().to_string());
    let id = parse_post_id(&path)?;

    let post = repository
        .get_post(id)
        .await?
        .ok_or_else(|| AppError::not_found("post"))?;

    if post.user_id != caller.id() {
        let err = AppError::Auth(AuthError::Forbidden(
            "only the author may delete a post".to_string(),
        ));
        context.log_error(&err);
        return Err(err);
    }

    if !repository.delete_post(id).await? {
        return Err(AppError::not_found("post"));
    }

    tracing::info!(
        request_id = %context.request_id,
        user_id = %caller.id(),
        post_id = %id,
        "Post deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}
