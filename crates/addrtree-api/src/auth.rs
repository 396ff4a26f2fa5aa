use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::device_code::DeviceCodeCredential;
use crate::error::Error;

/// A bearer token for Graph, with an optional expiry.
#[derive(Debug, Clone)]
pub struct AccessToken {
    secret: SecretString,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            secret: SecretString::from(secret.into()),
            expires_at,
        }
    }

    /// Raw token value for the `Authorization` header.
    pub fn secret(&self) -> &str {
        self.secret.expose_secret()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// A token without expiry never expires. `skew` is subtracted from the
    /// expiry so a token is not handed out seconds before it dies.
    pub fn is_expired_at(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        self.expires_at.is_some_and(|exp| now + skew >= exp)
    }
}

/// Source of access tokens.
///
/// `get_token` is the silent path: it may return `Ok(None)` when no usable
/// token is at hand without user interaction. `login` is the interactive
/// path; after it succeeds, `get_token` is expected to yield a token.
pub trait TokenCredential: Send + Sync {
    fn get_token(
        &self,
        scopes: &[String],
    ) -> impl Future<Output = Result<Option<AccessToken>, Error>> + Send;

    fn login(&self, scopes: &[String]) -> impl Future<Output = Result<(), Error>> + Send;
}

// ── Static token ────────────────────────────────────────────────────

/// A pre-issued bearer token (e.g. from `az account get-access-token`).
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    pub fn new(token: &SecretString) -> Self {
        Self {
            token: AccessToken::new(token.expose_secret(), None),
        }
    }
}

impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scopes: &[String]) -> Result<Option<AccessToken>, Error> {
        if self.token.secret().is_empty() {
            return Ok(None);
        }
        Ok(Some(self.token.clone()))
    }

    async fn login(&self, _scopes: &[String]) -> Result<(), Error> {
        Err(Error::Authentication {
            message: "interactive login is not available for a static token".into(),
        })
    }
}

// ── Runtime-selected credential ─────────────────────────────────────

/// The credential kinds a profile can select at runtime.
pub enum Credential {
    Static(StaticTokenCredential),
    DeviceCode(DeviceCodeCredential),
}

impl TokenCredential for Credential {
    async fn get_token(&self, scopes: &[String]) -> Result<Option<AccessToken>, Error> {
        match self {
            Self::Static(c) => c.get_token(scopes).await,
            Self::DeviceCode(c) => c.get_token(scopes).await,
        }
    }

    async fn login(&self, scopes: &[String]) -> Result<(), Error> {
        match self {
            Self::Static(c) => c.login(scopes).await,
            Self::DeviceCode(c) => c.login(scopes).await,
        }
    }
}
