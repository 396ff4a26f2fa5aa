use thiserror::Error;

/// Top-level error type for the `addrtree-api` crate.
///
/// Covers token acquisition, transport, and Graph API failures.
/// `addrtree-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// A credential could not produce a token.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The device-code grant ended with a terminal error from the authority.
    #[error("Device code sign-in failed ({code}): {description}")]
    DeviceCode { code: String, description: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Graph API ───────────────────────────────────────────────────
    /// Non-success status from Graph. `reason` is the canonical status text.
    #[error("Graph API request failed: {status} {reason}: {message}")]
    Graph {
        status: u16,
        reason: String,
        message: String,
        code: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the token was rejected and signing in again might help.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::Graph { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// Extract the Graph error code (e.g. `Authorization_RequestDenied`), if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Graph { code, .. } => code.as_deref(),
            Self::DeviceCode { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }
}
