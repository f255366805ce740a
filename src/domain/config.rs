//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for the Matrix login, the webappify backend and bot behaviour.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

/// Configuration for various connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
    #[serde(default)]
    pub webappify: WebappifyConfig,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub username: String,
    pub password: String,
    pub homeserver: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    #[default]
    Post,
    Get,
}

/// Backend the drafts are submitted to.
#[derive(Debug, Deserialize, Clone)]
pub struct WebappifyConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub method: HttpMethod,
    /// Seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for WebappifyConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            endpoint: default_endpoint(),
            method: HttpMethod::default(),
            timeout: default_timeout(),
        }
    }
}

impl WebappifyConfig {
    /// Full URL of the API script.
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        )
    }

    /// Prefix for links to generated apps; the app id is appended directly.
    pub fn apps_url(&self) -> String {
        format!("{}/apps/", self.url.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

fn default_url() -> String {
    "https://webappify.org".to_string()
}
fn default_endpoint() -> String {
    "home/scripts/backend/webappify/webappify.php".to_string()
}
fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            refresh: RefreshConfig::default(),
        }
    }
}

fn default_prefix() -> String {
    "::".to_string()
}

/// Template list refresh schedule, in seconds.
#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    #[serde(default = "default_initial_delay")]
    pub initial_delay: u64,
    #[serde(default = "default_interval")]
    pub interval: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            initial_delay: default_initial_delay(),
            interval: default_interval(),
        }
    }
}

fn default_initial_delay() -> u64 {
    10
}
fn default_interval() -> u64 {
    60 * 60
}

impl AppConfig {
    /// Reads the YAML file and applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config = Self::from_yaml(&content)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Failed to parse config.yaml")?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero periods; `tokio::time::interval` panics on them.
    fn validate(&self) -> Result<()> {
        if self.bot.refresh.interval == 0 {
            bail!("bot.refresh.interval must be at least 1 second");
        }
        if self.services.webappify.timeout == 0 {
            bail!("services.webappify.timeout must be at least 1 second");
        }
        Ok(())
    }

    /// `WEBAPPIFY_URL` replaces `services.webappify.url`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("WEBAPPIFY_URL").filter(|u| !u.is_empty()) {
            self.services.webappify.url = url;
        }
    }
}
