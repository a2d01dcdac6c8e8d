use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// Default polling cadence for the background publisher loop.
pub const DEFAULT_PUBLISH_INTERVAL_SECS: u64 = 60;

/// Top-level config (masthead.toml + MASTHEAD_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MastheadConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub publisher: PublisherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Public-facing site settings. `base_url` is joined with post slugs to build
/// the canonical links that appear in newsletter emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_site_title")]
    pub title: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            title: default_site_title(),
        }
    }
}

/// Outbound mail settings.
///
/// When `enabled` is false (the default) the server runs with a logging
/// mailer: newsletter sends are recorded in the log but nothing leaves the
/// process. Set `enabled = true` and fill in `api_url`/`api_token` to deliver
/// through an HTTP mail provider.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MailConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the provider's send endpoint, e.g. "https://api.example.com/v1/send".
    pub api_url: Option<String>,
    /// Bearer token for the provider API.
    pub api_token: Option<String>,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    #[serde(default = "default_from_email")]
    pub from_email: String,
}

/// Background publisher loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// When false the loop never starts; POST /api/scheduler still works.
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_publish_interval")]
    pub interval_secs: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: DEFAULT_PUBLISH_INTERVAL_SECS,
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_base_url() -> String {
    format!("http://{}:{}", DEFAULT_BIND, DEFAULT_PORT)
}
fn default_site_title() -> String {
    "My Newsletter".to_string()
}
fn default_from_name() -> String {
    "Masthead".to_string()
}
fn default_from_email() -> String {
    "newsletter@localhost".to_string()
}
fn default_publish_interval() -> u64 {
    DEFAULT_PUBLISH_INTERVAL_SECS
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.masthead/masthead.db", home)
}

impl MastheadConfig {
    /// Load config from a TOML file with MASTHEAD_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.masthead/masthead.toml
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: MastheadConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("MASTHEAD_").split("_"))
            .extract()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.masthead/masthead.toml", home)
}
