/// Password Hashing and Verification
///
/// bcrypt: salted, cost-parameterised, and verified by re-deriving the hash
/// and comparing in constant time.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

/// Hash a password using bcrypt
///
/// Every call draws a fresh salt, so hashing the same password twice gives
/// two different strings.
///
/// # Errors
/// Only if bcrypt itself fails, which is an internal error.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its stored hash
///
/// `Ok(false)` means the password does not match.
///
/// # Errors
/// Returns an internal error if the stored hash is not a bcrypt hash.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    verify(password, password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}
