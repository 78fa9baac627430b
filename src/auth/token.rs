//! Stateless bearer tokens
//!
//! A token is `base64url(json(claims)) + "." + base64url(hmac_sha256(secret,
//! payload_segment))`. Nothing is stored server-side; the signature and the
//! embedded expiry are all that is checked.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::password::DEFAULT_USER;
use crate::error::{ModelConfigError, ModelConfigResult};

type HmacSha256 = Hmac<Sha256>;

/// Default token lifetime: twelve hours
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60 * 12;

/// Claims embedded in a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub user: String,
    /// Expiry as unix seconds; zero means absent
    #[serde(default)]
    pub exp: i64,
}

/// Issue a token valid for `ttl_secs` from now
pub fn issue(user: &str, secret: &[u8], ttl_secs: i64) -> ModelConfigResult<String> {
    issue_at(user, secret, ttl_secs, Utc::now().timestamp())
}

/// Issue a token against an explicit clock
pub fn issue_at(user: &str, secret: &[u8], ttl_secs: i64, now: i64) -> ModelConfigResult<String> {
    let claims = TokenClaims {
        user: user.to_string(),
        exp: now + ttl_secs,
    };
    let payload_part = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
    let sig = sign(&payload_part, secret)?;
    Ok(format!("{}.{}", payload_part, URL_SAFE_NO_PAD.encode(sig)))
}

/// Verify a token and return its claims
///
/// Every failure is reported as `Unauthorized`; the reason is only traced.
pub fn verify(token: &str, secret: &[u8]) -> ModelConfigResult<TokenClaims> {
    verify_at(token, secret, Utc::now().timestamp())
}

/// Verify a token against an explicit clock
pub fn verify_at(token: &str, secret: &[u8], now: i64) -> ModelConfigResult<TokenClaims> {
    let reject = |reason: &str| {
        tracing::debug!(reason, "bearer token rejected");
        ModelConfigError::Unauthorized
    };

    let (payload_part, sig_part) = split_token(token).ok_or_else(|| reject("malformed"))?;

    let sig = URL_SAFE_NO_PAD
        .decode(sig_part)
        .map_err(|_| reject("signature encoding"))?;
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| reject("secret"))?;
    mac.update(payload_part.as_bytes());
    mac.verify_slice(&sig)
        .map_err(|_| reject("signature mismatch"))?;

    // Only authenticated payloads are decoded.
    let payload = URL_SAFE_NO_PAD
        .decode(payload_part)
        .map_err(|_| reject("payload encoding"))?;
    let mut claims: TokenClaims =
        serde_json::from_slice(&payload).map_err(|_| reject("payload json"))?;

    if claims.exp == 0 || now >= claims.exp {
        return Err(reject("expired"));
    }
    if claims.user.trim().is_empty() {
        claims.user = DEFAULT_USER.to_string();
    }
    Ok(claims)
}

/// Pull the token out of an `Authorization` header value
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

fn split_token(token: &str) -> Option<(&str, &str)> {
    let parts: Vec<&str> = token.split('.').collect();
    match parts.as_slice() {
        [payload, sig] if !payload.is_empty() && !sig.is_empty() => Some((payload, sig)),
        _ => None,
    }
}

fn sign(payload_part: &str, secret: &[u8]) -> ModelConfigResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| ModelConfigError::Config(format!("Invalid signing secret: {}", e)))?;
    mac.update(payload_part.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}
