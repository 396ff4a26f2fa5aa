// OAuth 2.0 device authorization grant against the Microsoft identity platform.
//
// The credential keeps the current access token and refresh token in memory.
// `get_token` only ever refreshes silently; `login` runs the full device-code
// flow and reports the user code through a prompt callback.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::{AccessToken, TokenCredential};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Public Microsoft identity platform authority.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";
const OFFLINE_ACCESS: &str = "offline_access";
const EXPIRY_SKEW_SECS: i64 = 60;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const SLOW_DOWN_STEP_SECS: u64 = 5;

/// What the user needs to complete a device-code sign-in.
#[derive(Debug, Clone)]
pub struct DeviceCodePrompt {
    pub user_code: String,
    pub verification_uri: String,
    /// Human-readable instruction from the authority, when provided.
    pub message: Option<String>,
}

impl DeviceCodePrompt {
    /// The authority's message, or a synthesized one.
    pub fn instructions(&self) -> String {
        self.message.clone().unwrap_or_else(|| {
            format!(
                "Open {} and enter code {}",
                self.verification_uri, self.user_code
            )
        })
    }
}

/// Callback invoked once per `login` with the code to show the user.
pub type PromptCallback = Arc<dyn Fn(&DeviceCodePrompt) + Send + Sync>;

#[derive(Default)]
struct TokenState {
    access: Option<AccessToken>,
    refresh: Option<SecretString>,
}

/// Device-code credential for a public client application.
pub struct DeviceCodeCredential {
    http: reqwest::Client,
    authority: Url,
    tenant: String,
    client_id: String,
    prompt: PromptCallback,
    state: Mutex<TokenState>,
}

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    interval: Option<u64>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

impl DeviceCodeCredential {
    pub fn new(
        tenant: impl Into<String>,
        client_id: impl Into<String>,
        prompt: PromptCallback,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Self::with_authority(DEFAULT_AUTHORITY_HOST, tenant, client_id, prompt, transport)
    }

    /// Same as [`new`](Self::new) against a non-default authority host
    /// (sovereign clouds, or a mock server in tests).
    pub fn with_authority(
        authority: &str,
        tenant: impl Into<String>,
        client_id: impl Into<String>,
        prompt: PromptCallback,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let authority = Url::parse(&format!("{}/", authority.trim_end_matches('/')))?;
        Ok(Self {
            http: transport.build_client()?,
            authority,
            tenant: tenant.into(),
            client_id: client_id.into(),
            prompt,
            state: Mutex::new(TokenState::default()),
        })
    }

    /// Seed a refresh token saved from an earlier session.
    pub fn with_refresh_token(self, refresh: SecretString) -> Self {
        Self {
            state: Mutex::new(TokenState {
                access: None,
                refresh: Some(refresh),
            }),
            ..self
        }
    }

    /// The current refresh token, so callers can persist it.
    pub async fn refresh_token(&self) -> Option<SecretString> {
        self.state.lock().await.refresh.clone()
    }

    fn endpoint(&self, leaf: &str) -> Result<Url, Error> {
        Ok(self
            .authority
            .join(&format!("{}/oauth2/v2.0/{leaf}", self.tenant))?)
    }

    fn scope_param(scopes: &[String]) -> String {
        let mut parts: Vec<&str> = scopes.iter().map(String::as_str).collect();
        if !parts.contains(&OFFLINE_ACCESS) {
            parts.push(OFFLINE_ACCESS);
        }
        parts.join(" ")
    }

    /// Exchange the stored refresh token for a fresh access token.
    async fn refresh(&self, refresh: &SecretString, scopes: &[String]) -> Result<TokenResponse, Error> {
        let url = self.endpoint("token")?;
        let scope = Self::scope_param(scopes);
        debug!("refreshing access token");

        let resp = self
            .http
            .post(url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("refresh_token", refresh.expose_secret()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await?;

        if resp.status().is_success() {
            return parse_token(resp).await;
        }
        let err = parse_token_error(resp).await;
        Err(Error::DeviceCode {
            code: err.error,
            description: err.error_description.unwrap_or_default(),
        })
    }

    async fn request_device_code(&self, scopes: &[String]) -> Result<DeviceCodeResponse, Error> {
        let url = self.endpoint("devicecode")?;
        let scope = Self::scope_param(scopes);
        let resp = self
            .http
            .post(url)
            .form(&[("client_id", self.client_id.as_str()), ("scope", scope.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            let err = parse_token_error(resp).await;
            return Err(Error::DeviceCode {
                code: err.error,
                description: err.error_description.unwrap_or_default(),
            });
        }
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    async fn poll_for_token(&self, device: &DeviceCodeResponse) -> Result<TokenResponse, Error> {
        let url = self.endpoint("token")?;
        let mut interval = device.interval.unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        let deadline = tokio::time::Instant::now() + Duration::from_secs(device.expires_in);

        loop {
            if tokio::time::Instant::now() >= deadline {
                return Err(Error::DeviceCode {
                    code: "expired_token".into(),
                    description: "the device code expired before sign-in completed".into(),
                });
            }

            let resp = self
                .http
                .post(url.clone())
                .form(&[
                    ("grant_type", DEVICE_CODE_GRANT),
                    ("client_id", self.client_id.as_str()),
                    ("device_code", device.device_code.as_str()),
                ])
                .send()
                .await?;

            if resp.status().is_success() {
                return parse_token(resp).await;
            }

            let err = parse_token_error(resp).await;
            match err.error.as_str() {
                "authorization_pending" => {}
                "slow_down" => interval += SLOW_DOWN_STEP_SECS,
                _ => {
                    return Err(Error::DeviceCode {
                        code: err.error,
                        description: err.error_description.unwrap_or_default(),
                    });
                }
            }
            tokio::time::sleep(Duration::from_secs(interval)).await;
        }
    }

    fn store(state: &mut TokenState, token: TokenResponse) -> AccessToken {
        let expires_at = token
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));
        let access = AccessToken::new(token.access_token, expires_at);
        state.access = Some(access.clone());
        if let Some(refresh) = token.refresh_token {
            state.refresh = Some(SecretString::from(refresh));
        }
        access
    }
}

async fn parse_token(resp: reqwest::Response) -> Result<TokenResponse, Error> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

async fn parse_token_error(resp: reqwest::Response) -> TokenErrorResponse {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    serde_json::from_str(&body).unwrap_or_else(|_| TokenErrorResponse {
        error: "unknown_error".into(),
        error_description: Some(format!("HTTP {status}")),
    })
}

impl TokenCredential for DeviceCodeCredential {
    async fn get_token(&self, scopes: &[String]) -> Result<Option<AccessToken>, Error> {
        let mut state = self.state.lock().await;

        if let Some(access) = &state.access {
            if !access.is_expired_at(Utc::now(), chrono::Duration::seconds(EXPIRY_SKEW_SECS)) {
                return Ok(Some(access.clone()));
            }
        }

        let Some(refresh) = state.refresh.clone() else {
            return Ok(None);
        };

        match self.refresh(&refresh, scopes).await {
            Ok(token) => Ok(Some(Self::store(&mut state, token))),
            Err(e) => {
                warn!(error = %e, "refresh token rejected");
                state.refresh = None;
                state.access = None;
                Err(e)
            }
        }
    }

    async fn login(&self, scopes: &[String]) -> Result<(), Error> {
        let device = self.request_device_code(scopes).await?;
        (self.prompt)(&DeviceCodePrompt {
            user_code: device.user_code.clone(),
            verification_uri: device.verification_uri.clone(),
            message: device.message.clone(),
        });

        let token = self.poll_for_token(&device).await?;
        let mut state = self.state.lock().await;
        Self::store(&mut state, token);
        info!("device code sign-in complete");
        Ok(())
    }
}
