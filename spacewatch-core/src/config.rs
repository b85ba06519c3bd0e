//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/spacewatch/config.toml`, with
//! `SPACEWATCH_*` environment variables taking precedence for the API
//! settings (handy for development shells and CI).
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/spacewatch/` (~/.config/spacewatch/)
//! - State/Logs: `$XDG_STATE_HOME/spacewatch/` (~/.local/state/spacewatch/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Remote API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How requests reach the GraphQL endpoint.
///
/// Chosen once at configuration time; nothing inspects the runtime
/// environment per call to decide.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApiRoute {
    /// Talk to the API's own endpoint; `/graphql` is appended
    #[default]
    Direct,
    /// Talk to a backend proxy; the configured endpoint is used verbatim
    Proxied,
}

impl ApiRoute {
    /// Resolve the URL GraphQL documents are POSTed to.
    pub fn graphql_url(&self, endpoint: &str) -> String {
        let endpoint = endpoint.trim_end_matches('/');
        match self {
            ApiRoute::Direct => format!("{}/graphql", endpoint),
            ApiRoute::Proxied => endpoint.to_string(),
        }
    }
}

/// Remote API configuration
///
/// Exactly one credential form must be populated: either the key id/secret
/// pair (exchanged for a token via the API's own auth mutation) or a
/// pre-issued token (used as-is, no exchange call).
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// API endpoint, e.g. `https://my-account.app.example.io`
    pub endpoint: Option<String>,

    /// API key id (paired with `api_key_secret`)
    pub api_key_id: Option<String>,

    /// API key secret (paired with `api_key_id`)
    pub api_key_secret: Option<String>,

    /// Pre-issued bearer token (alternative to the key pair)
    pub api_token: Option<String>,

    /// Request routing strategy
    #[serde(default)]
    pub route: ApiRoute,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Page size for the paginated stacks query
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

// The serde defaults only apply during deserialization; a hand-written
// Default keeps the env-var-only path (no config file at all) on the same
// values.
impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key_id: None,
            api_key_secret: None,
            api_token: None,
            route: ApiRoute::default(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> usize {
    100
}

/// Credential material resolved from configuration; immutable once built
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Key id/secret pair, exchanged for a short-lived token on first use
    ApiKey { key_id: String, key_secret: String },
    /// Pre-issued token, passed through without an exchange call
    Token(String),
}

impl ApiConfig {
    /// Apply `SPACEWATCH_*` environment variable overrides
    pub fn apply_env(&mut self) {
        if let Ok(endpoint) = std::env::var("SPACEWATCH_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Ok(key_id) = std::env::var("SPACEWATCH_API_KEY_ID") {
            self.api_key_id = Some(key_id);
        }
        if let Ok(secret) = std::env::var("SPACEWATCH_API_KEY_SECRET") {
            self.api_key_secret = Some(secret);
        }
        if let Ok(token) = std::env::var("SPACEWATCH_API_TOKEN") {
            self.api_token = Some(token);
        }
    }

    /// Returns the configured endpoint or a configuration error
    pub fn endpoint(&self) -> Result<&str> {
        self.endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Error::Config("api.endpoint is required".to_string()))
    }

    /// Resolve the configured credential material.
    ///
    /// Fails with [`Error::AuthConfiguration`] when neither form is present,
    /// when the key pair is incomplete, or when both forms are set at once.
    pub fn credentials(&self) -> Result<Credentials> {
        let has_key = self.api_key_id.is_some() || self.api_key_secret.is_some();

        match (&self.api_key_id, &self.api_key_secret, &self.api_token) {
            (Some(_), Some(_), Some(_)) => Err(Error::AuthConfiguration(
                "both api_key_id/api_key_secret and api_token are set; pick one".to_string(),
            )),
            (Some(key_id), Some(key_secret), None) => Ok(Credentials::ApiKey {
                key_id: key_id.clone(),
                key_secret: key_secret.clone(),
            }),
            (None, None, Some(token)) if !token.is_empty() => {
                Ok(Credentials::Token(token.clone()))
            }
            (None, None, Some(_)) => Err(Error::AuthConfiguration(
                "api_token is empty".to_string(),
            )),
            _ if has_key => Err(Error::AuthConfiguration(
                "api_key_id and api_key_secret must both be set".to_string(),
            )),
            _ => Err(Error::AuthConfiguration(
                "set either api_key_id/api_key_secret or api_token".to_string(),
            )),
        }
    }

    /// Validate configuration, returning the first problem found
    pub fn validate(&self) -> Result<()> {
        self.endpoint()?;
        self.credentials()?;
        if self.page_size == 0 {
            return Err(Error::Config("api.page_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path, then apply env overrides
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Config::default()
        };

        config.api.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/spacewatch/config.toml`
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("spacewatch").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/spacewatch/`
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("spacewatch")
    }

    /// Returns the log file path
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("spacewatch.log")
    }
}
