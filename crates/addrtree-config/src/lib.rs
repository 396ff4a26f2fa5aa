//! Configuration for the addrtree terminal UI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `addrtree_core::DirectoryConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use addrtree_core::{AuthCredentials, DirectoryConfig};

/// Keyring service name for every stored secret.
pub const KEYRING_SERVICE: &str = "addrtree";

/// Azure AD tenant used when a device-code profile names none.
pub const DEFAULT_TENANT: &str = "organizations";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is given on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named directory profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: explicit choice, else the configured
    /// default, else `"default"`.
    pub fn profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,

    /// `default`, `dark`, or `contrast`.
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            cache_ttl_hours: default_cache_ttl_hours(),
            theme: default_theme(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_cache_ttl_hours() -> u64 {
    24
}
fn default_theme() -> String {
    "default".into()
}

/// A named directory profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Graph root (e.g. "https://graph.microsoft.com/v1.0").
    #[serde(default = "default_graph_url")]
    pub graph_url: String,

    /// Auth mode: "device_code" or "token".
    #[serde(default = "default_auth_mode")]
    pub auth_mode: String,

    /// Tenant id or domain for device-code sign-in.
    pub tenant: Option<String>,

    /// Application (client) id registered for device-code sign-in.
    pub client_id: Option<String>,

    /// Bearer token (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the bearer token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Cache the department list on disk.
    #[serde(default = "default_cache")]
    pub cache: bool,
}

fn default_graph_url() -> String {
    addrtree_api::DEFAULT_GRAPH_URL.into()
}
fn default_auth_mode() -> String {
    "device_code".into()
}
fn default_cache() -> bool {
    true
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "addrtree", "addrtree")
}

fn home_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push("addrtree");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding the department cache.
pub fn cache_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".cache"),
        |dirs| dirs.cache_dir().to_path_buf(),
    )
}

// ── Config loading ──────────────────────────────────────────────────

fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ADDRTREE_").split("__"))
}

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file (missing files are treated as empty).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment_for(path).extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|e| {
        warn!(error = %e, "ignoring unreadable config");
        Config::default()
    })
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str, item: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/{item}"),
    )?)
}

/// Resolve a bearer token: `token_env` variable, then keyring, then plaintext.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name, "token") {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// A device-code refresh token saved by an earlier session.
pub fn load_refresh_token(profile_name: &str) -> Option<SecretString> {
    let entry = keyring_entry(profile_name, "refresh-token").ok()?;
    match entry.get_password() {
        Ok(secret) => Some(SecretString::from(secret)),
        Err(e) => {
            debug!(profile = profile_name, error = %e, "no stored refresh token");
            None
        }
    }
}

/// Persist a device-code refresh token for the next session.
pub fn store_refresh_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name, "refresh-token")?.set_password(token.expose_secret())?;
    Ok(())
}

/// Resolve `AuthCredentials` from a profile's `auth_mode` field.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<AuthCredentials, ConfigError> {
    match profile.auth_mode.as_str() {
        "token" => Ok(AuthCredentials::Token(resolve_token(profile, profile_name)?)),
        "device_code" => {
            let client_id = profile
                .client_id
                .clone()
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| ConfigError::Validation {
                    field: "client_id".into(),
                    reason: "required for auth_mode = \"device_code\"".into(),
                })?;
            Ok(AuthCredentials::DeviceCode {
                tenant: profile
                    .tenant
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TENANT.into()),
                client_id,
                refresh_token: load_refresh_token(profile_name),
            })
        }
        other => Err(ConfigError::Validation {
            field: "auth_mode".into(),
            reason: format!("expected 'device_code' or 'token', got '{other}'"),
        }),
    }
}

/// Build a `DirectoryConfig` from a profile and the global defaults.
pub fn profile_to_directory_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<DirectoryConfig, ConfigError> {
    let graph_url: url::Url = profile
        .graph_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "graph_url".into(),
            reason: format!("invalid URL: {}", profile.graph_url),
        })?;

    let auth = resolve_auth(profile, profile_name)?;

    let mut config = DirectoryConfig::new(graph_url, auth);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.cache_ttl = Duration::from_secs(defaults.cache_ttl_hours.saturating_mul(60 * 60));
    config.cache_dir = profile.cache.then(|| cache_dir().join(profile_name));
    config.ca_cert.clone_from(&profile.ca_cert);
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        default_profile = "work"

        [defaults]
        timeout = 10
        theme = "dark"

        [profiles.work]
        auth_mode = "token"
        token = "plain-token"
        token_env = "ADDRTREE_TEST_SURELY_UNSET_VAR"
        cache = false

        [profiles.sso]
        tenant = "contoso.onmicrosoft.com"
        client_id = "11111111-2222-3333-4444-555555555555"
    "#;

    fn parse(toml: &str) -> Config {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(toml))
            .extract()
            .unwrap()
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg = parse(SAMPLE);
        assert_eq!(cfg.defaults.timeout, 10);
        assert_eq!(cfg.defaults.cache_ttl_hours, 24);
        assert_eq!(cfg.defaults.theme, "dark");

        let sso = cfg.profile("sso").unwrap();
        assert_eq!(sso.graph_url, addrtree_api::DEFAULT_GRAPH_URL);
        assert_eq!(sso.auth_mode, "device_code");
        assert!(sso.cache);
    }

    #[test]
    fn profile_selection() {
        let cfg = parse(SAMPLE);
        assert_eq!(cfg.profile_name(None), "work");
        assert_eq!(cfg.profile_name(Some("sso")), "sso");
        assert!(matches!(
            cfg.profile("missing"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn token_profile_builds_directory_config() {
        let cfg = parse(SAMPLE);
        let profile = cfg.profile("work").unwrap();
        let dc = profile_to_directory_config(profile, "addrtree-test-work", &cfg.defaults).unwrap();

        assert!(matches!(
            dc.auth,
            AuthCredentials::Token(ref t) if t.expose_secret() == "plain-token"
        ));
        assert_eq!(dc.timeout, Duration::from_secs(10));
        assert_eq!(dc.cache_dir, None);
        assert_eq!(dc.cache_ttl, Duration::from_secs(24 * 3600));
        assert_eq!(dc.graph_url.as_str(), "https://graph.microsoft.com/v1.0");
    }

    #[test]
    fn device_code_requires_client_id() {
        let profile = Profile {
            graph_url: default_graph_url(),
            auth_mode: "device_code".into(),
            cache: true,
            ..Profile::default()
        };
        assert!(matches!(
            resolve_auth(&profile, "addrtree-test-nocid"),
            Err(ConfigError::Validation { ref field, .. }) if field == "client_id"
        ));
    }

    #[test]
    fn unknown_auth_mode_rejected() {
        let profile = Profile {
            graph_url: default_graph_url(),
            auth_mode: "kerberos".into(),
            ..Profile::default()
        };
        assert!(matches!(
            resolve_auth(&profile, "x"),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn invalid_graph_url_rejected() {
        let profile = Profile {
            graph_url: "not a url".into(),
            auth_mode: "token".into(),
            token: Some("t".into()),
            ..Profile::default()
        };
        assert!(matches!(
            profile_to_directory_config(&profile, "x", &Defaults::default()),
            Err(ConfigError::Validation { ref field, .. }) if field == "graph_url"
        ));
    }

    #[test]
    fn load_from_disk_reads_profiles() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profile_name(None), "work");
        assert_eq!(
            loaded.profile("sso").unwrap().client_id.as_deref(),
            Some("11111111-2222-3333-4444-555555555555")
        );
    }
}
