/// Input validators
///
/// Field checks shared by the user and post handlers. All of them return
/// the cleaned value on success so handlers never use the raw input.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
pub const MAX_POST_LENGTH: usize = 140;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(concat!(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@",
        r"[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
        r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    ))
    .unwrap();
}

/// Validates an email address, returning it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Passwords are taken as-is; only emptiness is rejected
pub fn require_password(password: &str) -> Result<&str, ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }
    Ok(password)
}

/// Validates a post body against the length limit, counted in characters
pub fn validate_post_body(body: &str) -> Result<&str, ValidationError> {
    if body.trim().is_empty() {
        return Err(ValidationError::EmptyField("body".to_string()));
    }

    if body.chars().count() > MAX_POST_LENGTH {
        return Err(ValidationError::TooLong("Post".to_string(), MAX_POST_LENGTH));
    }

    Ok(body)
}
