/// Authentication module
///
/// Password hashing, access token minting/validation, the refresh token
/// store, Authorization header parsing, and the session manager that ties
/// them together.

mod claims;
mod credentials;
mod extractor;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use credentials::{extract_api_key, extract_bearer};
pub use extractor::AuthenticatedUser;
pub use jwt::{AccessTokenCodec, MAX_ACCESS_TOKEN_TTL_SECS};
pub use password::{hash_password, verify_password};
pub use refresh_token::{
    generate_refresh_token, hash_token, issue_refresh_token, lookup_refresh_token,
    purge_expired_refresh_tokens, revoke_refresh_token, RefreshTokenRecord, RefreshTokenState,
};
pub use session::{LoginRequest, LoginResponse, RefreshResponse, SessionManager};
