//! Shared-password login check

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::secret::SecretString;
use crate::error::{ModelConfigError, ModelConfigResult};

type HmacSha256 = Hmac<Sha256>;

/// User recorded when a login or token carries no name
pub const DEFAULT_USER: &str = "external-user";

const PASSWORD_DOMAIN: &[u8] = b"model-config/password-check";

/// Compare a supplied password against the configured one
///
/// Both sides are reduced to an HMAC tag so the final comparison runs in
/// constant time regardless of length. An empty configured password never
/// matches.
pub fn check_password(supplied: &str, expected: &SecretString) -> ModelConfigResult<()> {
    if expected.is_empty() {
        return Err(ModelConfigError::Unauthorized);
    }

    let expected_tag = password_tag(expected.as_bytes())?;
    let mut mac = HmacSha256::new_from_slice(PASSWORD_DOMAIN)
        .map_err(|e| ModelConfigError::Config(e.to_string()))?;
    mac.update(supplied.as_bytes());
    mac.verify_slice(&expected_tag)
        .map_err(|_| ModelConfigError::Unauthorized)
}

/// Normalise the user name supplied at login
pub fn login_user(user: Option<&str>) -> String {
    match user.map(str::trim) {
        Some(u) if !u.is_empty() => u.to_string(),
        _ => DEFAULT_USER.to_string(),
    }
}

fn password_tag(password: &[u8]) -> ModelConfigResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(PASSWORD_DOMAIN)
        .map_err(|e| ModelConfigError::Config(e.to_string()))?;
    mac.update(password);
    Ok(mac.finalize().into_bytes().to_vec())
}
