//! Upstream store credentials
//!
//! The sheets API wants a short-lived bearer credential. Obtaining one is
//! delegated to a `CredentialSource`; `get_or_refresh` keeps the last one in
//! an explicit `CredentialCache` until shortly before it expires.

use async_trait::async_trait;
use tokio::process::Command;

use crate::auth::SecretString;
use crate::error::{ModelConfigError, ModelConfigResult};

/// Refresh this many seconds before the recorded expiry
pub const REFRESH_SKEW_SECS: i64 = 60;

/// Lifetime assumed when a source does not report one
pub const DEFAULT_CREDENTIAL_TTL_SECS: i64 = 3600;

/// A credential handed out by a source
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub access_token: SecretString,
    /// Seconds until expiry, if the source knows
    pub expires_in: Option<i64>,
}

/// Something that can mint a fresh upstream credential
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch(&self) -> ModelConfigResult<IssuedCredential>;
}

/// Cached credential and its expiry (unix seconds)
#[derive(Debug, Clone, Default)]
pub struct CredentialCache {
    credential: Option<SecretString>,
    expires_at: i64,
}

impl CredentialCache {
    /// True if the cached credential may still be used at `now`
    pub fn is_fresh(&self, now: i64) -> bool {
        self.credential.is_some() && self.expires_at - REFRESH_SKEW_SECS > now
    }

    /// Expiry of the cached credential, zero when empty
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }
}

/// Return the cached credential, fetching a new one when it is stale
pub async fn get_or_refresh(
    cache: &mut CredentialCache,
    now: i64,
    source: &dyn CredentialSource,
) -> ModelConfigResult<SecretString> {
    if let Some(credential) = cache.credential.as_ref().filter(|_| cache.is_fresh(now)) {
        return Ok(credential.clone());
    }

    let issued = source.fetch().await?;
    if issued.access_token.is_empty() {
        return Err(ModelConfigError::Credential(
            "credential source returned an empty token".into(),
        ));
    }
    cache.expires_at = now + issued.expires_in.unwrap_or(DEFAULT_CREDENTIAL_TTL_SECS);
    cache.credential = Some(issued.access_token.clone());
    tracing::debug!(expires_at = cache.expires_at, "refreshed upstream credential");
    Ok(issued.access_token)
}

/// A fixed access token from configuration
pub struct StaticCredential {
    token: SecretString,
}

impl StaticCredential {
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }
}

#[async_trait]
impl CredentialSource for StaticCredential {
    async fn fetch(&self) -> ModelConfigResult<IssuedCredential> {
        Ok(IssuedCredential {
            access_token: self.token.clone(),
            expires_in: None,
        })
    }
}

/// Runs a shell command and uses its trimmed stdout as the token
///
/// e.g. `gcloud auth application-default print-access-token`
pub struct CommandCredential {
    command: String,
}

impl CommandCredential {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl CredentialSource for CommandCredential {
    async fn fetch(&self) -> ModelConfigResult<IssuedCredential> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .output()
            .await
            .map_err(|e| ModelConfigError::Credential(format!("Failed to run command: {}", e)))?;

        if !output.status.success() {
            return Err(ModelConfigError::Credential(format!(
                "credential command exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let token = String::from_utf8(output.stdout)
            .map_err(|e| ModelConfigError::Credential(format!("Invalid UTF-8 token: {}", e)))?;
        Ok(IssuedCredential {
            access_token: SecretString::new(token.trim()),
            expires_in: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        expires_in: Option<i64>,
    }

    impl CountingSource {
        fn new(expires_in: Option<i64>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                expires_in,
            }
        }
    }

    #[async_trait]
    impl CredentialSource for CountingSource {
        async fn fetch(&self) -> ModelConfigResult<IssuedCredential> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(IssuedCredential {
                access_token: SecretString::new(format!("token-{}", n)),
                expires_in: self.expires_in,
            })
        }
    }

    #[tokio::test]
    async fn test_cached_until_skew() {
        let source = CountingSource::new(Some(600));
        let mut cache = CredentialCache::default();

        let first = get_or_refresh(&mut cache, 1000, &source).await.unwrap();
        assert_eq!(first.expose(), "token-1");
        assert_eq!(cache.expires_at(), 1600);

        let again = get_or_refresh(&mut cache, 1539, &source).await.unwrap();
        assert_eq!(again.expose(), "token-1");

        let refreshed = get_or_refresh(&mut cache, 1540, &source).await.unwrap();
        assert_eq!(refreshed.expose(), "token-2");
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_default_ttl() {
        let source = CountingSource::new(None);
        let mut cache = CredentialCache::default();
        get_or_refresh(&mut cache, 0, &source).await.unwrap();
        assert_eq!(cache.expires_at(), DEFAULT_CREDENTIAL_TTL_SECS);
    }

    #[test]
    fn test_empty_cache_is_stale() {
        assert!(!CredentialCache::default().is_fresh(0));
    }

    #[tokio::test]
    async fn test_static_credential() {
        let source = StaticCredential::new(SecretString::new("abc"));
        let mut cache = CredentialCache::default();
        let token = get_or_refresh(&mut cache, 10, &source).await.unwrap();
        assert_eq!(token.expose(), "abc");
    }

    #[tokio::test]
    async fn test_empty_token_rejected() {
        let source = StaticCredential::new(SecretString::new(""));
        let mut cache = CredentialCache::default();
        let err = get_or_refresh(&mut cache, 10, &source).await.unwrap_err();
        assert!(matches!(err, ModelConfigError::Credential(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_credential() {
        let source = CommandCredential::new("echo '  from-command  '");
        let issued = source.fetch().await.unwrap();
        assert_eq!(issued.access_token.expose(), "from-command");

        let failing = CommandCredential::new("exit 3");
        assert!(failing.fetch().await.is_err());
    }
}
