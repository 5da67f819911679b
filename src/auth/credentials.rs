/// Credential Header Parser
///
/// Pulls `Authorization: <Scheme> <credential>` out of request headers.
/// The scheme prefix is case-sensitive.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::TokenRejection;

const BEARER_PREFIX: &str = "Bearer ";
const API_KEY_PREFIX: &str = "ApiKey ";

/// Extract a bearer token from the `Authorization` header
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, TokenRejection> {
    extract_credential(headers, BEARER_PREFIX)
}

/// Extract an API key sent as `Authorization: ApiKey <key>`
pub fn extract_api_key(headers: &HeaderMap) -> Result<&str, TokenRejection> {
    extract_credential(headers, API_KEY_PREFIX)
}

fn extract_credential<'a>(headers: &'a HeaderMap, prefix: &str) -> Result<&'a str, TokenRejection> {
    let mut values = headers.get_all(AUTHORIZATION);
    let value = values.next().ok_or(TokenRejection::MissingHeader)?;

    // More than one Authorization header is ambiguous
    if values.next().is_some() {
        return Err(TokenRejection::MalformedHeader);
    }

    let credential = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix(prefix))
        .map(str::trim)
        .ok_or(TokenRejection::MalformedHeader)?;

    if credential.is_empty() {
        return Err(TokenRejection::MalformedHeader);
    }

    Ok(credential)
}
