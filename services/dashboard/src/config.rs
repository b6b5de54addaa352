//! Client configuration
//!
//! Values come from built-in defaults overridden by `DASHBOARD_*`
//! environment variables, e.g. `DASHBOARD_API_BASE_URL` or
//! `DASHBOARD_API_TIMEOUT_MS`.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::models::Language;

pub const ENV_PREFIX: &str = "DASHBOARD";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_API_TIMEOUT_MS: i64 = 30_000;
pub const DEFAULT_APP_NAME: &str = "Construction Reports";
pub const DEFAULT_STORAGE_PATH: &str = ".dashboard-storage.json";

/// Dashboard client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Backend REST API base URL
    pub api_base_url: String,
    /// Per-request network timeout in milliseconds
    pub api_timeout_ms: u64,
    pub app_name: String,
    pub app_version: String,
    /// Language used when no preference has been persisted yet
    pub default_language: Language,
    /// Enables debug-level logging
    pub enable_devtools: bool,
    /// File backing the durable client storage
    pub storage_path: PathBuf,
    /// When set, durable storage lives in Redis instead of the file
    #[serde(default)]
    pub redis_url: Option<String>,
}

impl DashboardConfig {
    /// Load the configuration from defaults and `DASHBOARD_*` variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("api_timeout_ms", DEFAULT_API_TIMEOUT_MS)?
            .set_default("app_name", DEFAULT_APP_NAME)?
            .set_default("app_version", env!("CARGO_PKG_VERSION"))?
            .set_default("default_language", Language::Ar.code())?
            .set_default("enable_devtools", false)?
            .set_default("storage_path", DEFAULT_STORAGE_PATH)?
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Configuration pointing at `api_base_url` with every other value defaulted
    pub fn for_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            api_timeout_ms: DEFAULT_API_TIMEOUT_MS as u64,
            app_name: DEFAULT_APP_NAME.to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            default_language: Language::Ar,
            enable_devtools: false,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            redis_url: None,
        }
    }

    /// Request timeout as a duration
    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout_ms)
    }
}
