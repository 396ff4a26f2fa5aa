// ── Runtime directory configuration ──
//
// These types describe how to reach Microsoft Graph and where to cache.
// They carry credential data but never touch disk; the TUI builds a
// `DirectoryConfig` from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::cache::DEFAULT_CACHE_TTL;

/// How to obtain a Graph access token.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// A pre-issued bearer token.
    Token(SecretString),
    /// OAuth 2.0 device authorization grant for a public client.
    DeviceCode {
        tenant: String,
        client_id: String,
        /// Refresh token saved from an earlier session, if any.
        refresh_token: Option<SecretString>,
    },
}

/// Configuration for one directory session.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Graph root, e.g. `https://graph.microsoft.com/v1.0`.
    pub graph_url: Url,
    pub auth: AuthCredentials,
    /// Delegated scopes requested for every token.
    pub scopes: Vec<String>,
    pub timeout: Duration,
    /// Directory for the department cache. `None` disables caching.
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl: Duration,
    /// Extra CA certificate (PEM) to trust.
    pub ca_cert: Option<PathBuf>,
}

impl DirectoryConfig {
    /// Defaults for everything except the endpoint and credentials.
    pub fn new(graph_url: Url, auth: AuthCredentials) -> Self {
        Self {
            graph_url,
            auth,
            scopes: vec![addrtree_api::USER_READ_ALL_SCOPE.to_owned()],
            timeout: Duration::from_secs(30),
            cache_dir: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            ca_cert: None,
        }
    }
}
