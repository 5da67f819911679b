use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{extract_api_key, hash_token};
use crate::configuration::Settings;
use crate::error::{AppError, TokenRejection, ValidationError};
use crate::repository::Repository;

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: WebhookData,
}

/// POST /api/billing/webhooks
///
/// Authenticated with `Authorization: ApiKey <key>`. Only `user.upgraded`
/// does anything; other events are acknowledged and dropped.
///
/// The key is checked before the body is parsed, so unauthenticated callers
/// always get 401 whatever they send.
pub async fn billing_webhook(
    req: HttpRequest,
    body: web::Bytes,
    settings: web::Data<Settings>,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, AppError> {
    let key = extract_api_key(req.headers())?;
    // Compared as digests, never as raw keys
    if hash_token(key) != hash_token(&settings.billing.webhook_key) {
        return Err(TokenRejection::InvalidApiKey.into());
    }

    let payload: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;

    if payload.event != USER_UPGRADED {
        tracing::debug!(event = %payload.event, "Ignoring billing event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let user = repository
        .upgrade_user(payload.data.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    tracing::info!(user_id = %user.id, "User upgraded to premium");
    Ok(HttpResponse::NoContent().finish())
}
