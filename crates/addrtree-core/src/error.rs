// ── Core error types ──
//
// User-facing errors from addrtree-core. Consumers never see reqwest or
// serde errors directly; `From<addrtree_api::Error>` translates them into
// domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to Microsoft Graph at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    /// `message` already carries the status line, e.g.
    /// `Graph API request failed: 403 Forbidden: Insufficient privileges`.
    #[error("{message}")]
    Api {
        message: String,
        /// Graph error code (e.g. `Authorization_RequestDenied`).
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Local errors ─────────────────────────────────────────────────
    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<addrtree_api::Error> for CoreError {
    fn from(err: addrtree_api::Error) -> Self {
        match err {
            addrtree_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            addrtree_api::Error::DeviceCode { code, description } => {
                CoreError::AuthenticationFailed {
                    message: if description.is_empty() {
                        code
                    } else {
                        format!("{code}: {description}")
                    },
                }
            }
            addrtree_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            addrtree_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            addrtree_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            addrtree_api::Error::Graph {
                status,
                reason,
                message,
                code,
            } => CoreError::Api {
                message: format!("Graph API request failed: {status} {reason}: {message}"),
                code,
                status: Some(status),
            },
            addrtree_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_keeps_status_line() {
        let err: CoreError = addrtree_api::Error::Graph {
            status: 403,
            reason: "Forbidden".into(),
            message: "Insufficient privileges".into(),
            code: Some("Authorization_RequestDenied".into()),
        }
        .into();

        assert_eq!(err.status(), Some(403));
        assert_eq!(
            err.to_string(),
            "Graph API request failed: 403 Forbidden: Insufficient privileges"
        );
    }

    #[test]
    fn device_code_error_is_authentication() {
        let err: CoreError = addrtree_api::Error::DeviceCode {
            code: "expired_token".into(),
            description: String::new(),
        }
        .into();
        assert!(matches!(err, CoreError::AuthenticationFailed { message } if message == "expired_token"));
    }
}
