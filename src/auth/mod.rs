//! Authentication for model-config
//!
//! A shared password is exchanged once for an HMAC-SHA256 signed bearer token
//! that carries the user name and an expiry. Verification is pure: the only
//! shared input is the signing secret.

pub mod password;
pub mod secret;
pub mod token;

pub use password::{check_password, login_user, DEFAULT_USER};
pub use secret::SecretString;
pub use token::{bearer_token, issue, issue_at, verify, verify_at, TokenClaims, DEFAULT_TOKEN_TTL_SECS};
