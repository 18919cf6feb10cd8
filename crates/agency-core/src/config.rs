//! Configuration management for the admin dashboard

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend API configuration
    pub api: ApiConfig,

    /// Session persistence configuration
    pub session: SessionConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Data table configuration
    pub table: TableConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Scheme, host and port of the backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix shared by every resource
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Request timeout in seconds; the HTTP client default applies when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// File backing the persisted session
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,

    /// Key holding the serialized current user
    #[serde(default = "default_user_key")]
    pub user_key: String,

    /// Key holding the raw auth token
    #[serde(default = "default_token_key")]
    pub token_key: String,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Login endpoint, relative to the API prefix
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

/// Data table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Rows per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or text)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_prefix() -> String {
    "/api/v1".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./.agency-session.json")
}

fn default_user_key() -> String {
    "user".to_string()
}

fn default_token_key() -> String {
    "token".to_string()
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

const fn default_page_size() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            prefix: default_prefix(),
            timeout_seconds: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            user_key: default_user_key(),
            token_key: default_token_key(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ApiConfig {
    /// Base URL joined with the resource prefix, without a trailing slash
    pub fn root(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.prefix.trim_end_matches('/')
        )
    }
}

impl Config {
    /// Load configuration from an optional `agency-admin` file and `AGENCY__*` variables
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from `path` (required when given) or the optional
    /// `agency-admin` file, then `AGENCY__*` variables
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, or if configuration
    /// cannot be parsed.
    pub fn load_from(path: Option<&Path>) -> crate::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("agency-admin").required(false),
        };
        let config = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix("AGENCY").separator("__"))
            .build()?;

        let config: Self = config.try_deserialize()?;
        debug!("Configuration loaded for {}", config.api.root());
        Ok(config)
    }
}
