//! Server Configuration
//!
//! Command-line flags with environment fallbacks.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{ArgGroup, Parser, ValueEnum};
use corral_client::pagination::MAX_PAGE_SIZE;
use corral_client::{AppCredentials, ServiceAuth};

/// Runner-group control plane for GitHub Actions
#[derive(Parser, Debug, Clone)]
#[command(name = "corral-orchestrator")]
#[command(about = "Let team maintainers manage their own GitHub Actions runner group", long_about = None)]
#[command(version)]
#[command(group(ArgGroup::new("service_auth").required(true).args(["github_token", "app_id"])))]
#[command(group(ArgGroup::new("app_key").args(["private_key", "private_key_path"])))]
pub struct Config {
    /// Organization whose runner groups are managed
    #[arg(long, env = "CORRAL_ORG")]
    pub org: String,

    /// Static service token used for organization-level calls
    #[arg(long, env = "CORRAL_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub App id; organization calls then run as the App installation
    #[arg(long, env = "CORRAL_APP_ID", requires = "installation_id", requires = "app_key")]
    pub app_id: Option<String>,

    /// Installation of the App on the organization
    #[arg(long, env = "CORRAL_INSTALLATION_ID", requires = "app_id")]
    pub installation_id: Option<u64>,

    /// App private key, PEM encoded
    #[arg(long, env = "CORRAL_APP_PRIVATE_KEY", hide_env_values = true, requires = "app_id")]
    pub private_key: Option<String>,

    /// File holding the App private key
    #[arg(long, env = "CORRAL_APP_PRIVATE_KEY_PATH", requires = "app_id")]
    pub private_key_path: Option<PathBuf>,

    /// GitHub REST API root
    #[arg(long, env = "CORRAL_API_URL", default_value = "https://api.github.com")]
    pub api_url: String,

    /// Address the HTTP server listens on
    #[arg(long, env = "CORRAL_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,

    /// Sustained requests per second allowed for each caller
    #[arg(long, env = "CORRAL_RATE_LIMIT", default_value_t = 5.0)]
    pub rate_limit: f64,

    /// Requests a caller may make in a burst
    #[arg(long, env = "CORRAL_RATE_BURST", default_value_t = 5)]
    pub rate_burst: u32,

    /// Items requested per page from paginated listings
    #[arg(
        long,
        env = "CORRAL_PAGE_SIZE",
        default_value_t = MAX_PAGE_SIZE,
        value_parser = clap::value_parser!(u8).range(1..=MAX_PAGE_SIZE as i64)
    )]
    pub page_size: u8,

    /// Timeout for each upstream request, in seconds
    #[arg(long, env = "CORRAL_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Log output format
    #[arg(long, env = "CORRAL_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Credential for organization calls, reading the App key file if one
    /// was given
    pub fn service_auth(&self) -> anyhow::Result<ServiceAuth> {
        let Some(app_id) = &self.app_id else {
            return match &self.github_token {
                Some(token) => Ok(ServiceAuth::from(token.clone())),
                None => bail!("Either --github-token or --app-id is required"),
            };
        };

        let installation_id = self
            .installation_id
            .context("--installation-id is required with --app-id")?;
        let private_key = match (&self.private_key, &self.private_key_path) {
            (Some(pem), _) => pem.clone(),
            (None, Some(path)) => std::fs::read_to_string(path).with_context(|| {
                format!("Failed to read App private key from {}", path.display())
            })?,
            (None, None) => bail!("--private-key or --private-key-path is required with --app-id"),
        };

        Ok(ServiceAuth::App(AppCredentials::new(
            app_id.clone(),
            installation_id,
            private_key,
        )))
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}
