//! `addrtree`: terminal address book over Microsoft Graph.
//!
//! Browse users by department, mark them, and collect them into To/Cc/Bcc
//! lines, then hand a `mailto:` or meeting deep link to the OS.
//!
//! Logs go to a file (default `<tmp>/addrtree.log`) so the terminal stays
//! clean. Directory calls run on background tasks that report back through
//! the action channel.

mod action;
mod app;
mod component;
mod event;
mod panes;
mod theme;
mod tui;
mod widgets;
mod worker;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use addrtree_api::{DeviceCodePrompt, PromptCallback};
use addrtree_config::Config;
use addrtree_core::{AppEvent, AuthCredentials, Directory, DirectoryConfig};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use secrecy::SecretString;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::action::Action;
use crate::app::App;
use crate::theme::ThemeName;

/// Browse the organization directory by department and address mail or
/// meetings to the people you pick.
#[derive(Parser, Debug)]
#[command(name = "addrtree", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short, long, env = "ADDRTREE_PROFILE")]
    profile: Option<String>,

    /// Graph root (e.g. https://graph.microsoft.com/v1.0)
    #[arg(long, env = "ADDRTREE_GRAPH_URL")]
    graph_url: Option<String>,

    /// Pre-issued bearer token
    #[arg(short, long, env = "ADDRTREE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Tenant id or domain for device-code sign-in
    #[arg(long)]
    tenant: Option<String>,

    /// Application (client) id for device-code sign-in
    #[arg(long)]
    client_id: Option<String>,

    /// Directory for the department cache
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Always load departments from Graph
    #[arg(long)]
    no_cache: bool,

    /// Color palette: default, dark, or contrast
    #[arg(long)]
    theme: Option<String>,

    /// Log file path
    #[arg(long, default_value_os_t = std::env::temp_dir().join("addrtree.log"))]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing; stdout belongs to the terminal UI. Hold the guard
/// until exit so buffered lines flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "addrtree={level},addrtree_core={level},addrtree_api={level},addrtree_config={level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .map_or_else(std::env::temp_dir, PathBuf::from);
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("addrtree.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Credentials given on the command line, if any.
fn cli_auth(cli: &Cli, profile_name: &str) -> Option<AuthCredentials> {
    if let Some(token) = &cli.token {
        return Some(AuthCredentials::Token(SecretString::from(token.clone())));
    }
    let client_id = cli.client_id.clone()?;
    Some(AuthCredentials::DeviceCode {
        tenant: cli
            .tenant
            .clone()
            .unwrap_or_else(|| addrtree_config::DEFAULT_TENANT.into()),
        client_id,
        refresh_token: addrtree_config::load_refresh_token(profile_name),
    })
}

fn setup_hint(profile_name: &str) -> String {
    format!(
        "no Graph credentials for profile '{profile_name}'.\n\
         Pass --token (or set ADDRTREE_TOKEN), pass --client-id for device-code sign-in,\n\
         or add [profiles.{profile_name}] to {}",
        addrtree_config::config_path().display()
    )
}

/// Priority: CLI flags > config profile > error with setup hint.
fn build_directory_config(cli: &Cli, cfg: &Config, profile_name: &str) -> Result<DirectoryConfig> {
    let profile = cfg.profiles.get(profile_name);

    let mut config = if let Some(auth) = cli_auth(cli, profile_name) {
        let graph_url = profile.map_or(addrtree_api::DEFAULT_GRAPH_URL, |p| p.graph_url.as_str());
        let mut config = DirectoryConfig::new(graph_url.parse()?, auth);
        config.timeout = Duration::from_secs(
            profile
                .and_then(|p| p.timeout)
                .unwrap_or(cfg.defaults.timeout),
        );
        config.cache_ttl = Duration::from_secs(cfg.defaults.cache_ttl_hours.saturating_mul(3600));
        config.cache_dir = profile
            .is_none_or(|p| p.cache)
            .then(|| addrtree_config::cache_dir().join(profile_name));
        config.ca_cert = profile.and_then(|p| p.ca_cert.clone());
        config
    } else {
        let profile = cfg
            .profile(profile_name)
            .wrap_err_with(|| setup_hint(profile_name))?;
        addrtree_config::profile_to_directory_config(profile, profile_name, &cfg.defaults)
            .wrap_err_with(|| format!("profile '{profile_name}' is not usable"))?
    };

    if let Some(url) = &cli.graph_url {
        config.graph_url = url.parse().wrap_err("invalid --graph-url")?;
    }
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
    if cli.no_cache {
        config.cache_dir = None;
    }
    Ok(config)
}

fn resolve_theme(cli: &Cli, cfg: &Config) -> ThemeName {
    let name = cli.theme.as_deref().unwrap_or(&cfg.defaults.theme);
    ThemeName::from_str(name).unwrap_or_else(|_| {
        warn!(theme = name, "unknown theme, using default");
        ThemeName::default()
    })
}

/// Post the device code into the UI as a notice.
fn prompt_callback(action_tx: mpsc::UnboundedSender<Action>) -> PromptCallback {
    Arc::new(move |prompt: &DeviceCodePrompt| {
        info!(verification_uri = %prompt.verification_uri, "device code sign-in requested");
        let _ = action_tx.send(AppEvent::Notice(prompt.instructions()).into());
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let cfg = addrtree_config::load_config_or_default();
    let profile_name = cfg.profile_name(cli.profile.as_deref());
    let config = build_directory_config(&cli, &cfg, &profile_name)?;
    let uses_device_code = matches!(config.auth, AuthCredentials::DeviceCode { .. });

    info!(
        profile = %profile_name,
        graph_url = %config.graph_url,
        cache = config.cache_dir.is_some(),
        "starting addrtree"
    );

    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let directory = Directory::from_config(&config, prompt_callback(action_tx.clone()))?;

    let mut app = App::new(
        directory.clone(),
        resolve_theme(&cli, &cfg).palette(),
        action_tx,
        action_rx,
    );
    app.run().await?;

    if uses_device_code {
        if let Some(refresh) = directory.refresh_token().await {
            if let Err(e) = addrtree_config::store_refresh_token(&profile_name, &refresh) {
                warn!(error = %e, "could not save refresh token");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use addrtree_config::Profile;
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("addrtree").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_token_wins_over_profile() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                graph_url: "https://graph.microsoft.us/v1.0".into(),
                auth_mode: "device_code".into(),
                cache: false,
                ..Profile::default()
            },
        );
        let cli = parse(&["--token", "abc"]);
        let config = build_directory_config(&cli, &cfg, "default").unwrap();

        assert!(matches!(config.auth, AuthCredentials::Token(_)));
        assert_eq!(config.graph_url.as_str(), "https://graph.microsoft.us/v1.0");
        assert_eq!(config.cache_dir, None);
    }

    #[test]
    fn missing_profile_gives_setup_hint() {
        let cli = parse(&[]);
        let err = build_directory_config(&cli, &Config::default(), "work").unwrap_err();
        assert!(err.to_string().contains("--client-id"));
    }

    #[test]
    fn overrides_apply_last() {
        let cli = parse(&["--token", "abc", "--graph-url", "http://localhost:8080/v1.0", "--no-cache"]);
        let config = build_directory_config(&cli, &Config::default(), "default").unwrap();
        assert_eq!(config.graph_url.as_str(), "http://localhost:8080/v1.0");
        assert_eq!(config.cache_dir, None);
    }

    #[test]
    fn unknown_theme_falls_back() {
        let cli = parse(&["--theme", "sepia"]);
        assert_eq!(resolve_theme(&cli, &Config::default()), ThemeName::Default);
        let cli = parse(&["--theme", "dark"]);
        assert_eq!(resolve_theme(&cli, &Config::default()), ThemeName::Dark);
    }
}
