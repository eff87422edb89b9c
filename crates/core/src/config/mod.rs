//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (CATALOG_CACHE_*)
//! 2. Bare `PORT` environment variable
//! 3. TOML config file (if CATALOG_CACHE_CONFIG_FILE set)
//! 4. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "CATALOG_CACHE_";

/// Application configuration with layered loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Interface the HTTP server binds to.
    ///
    /// Set via CATALOG_CACHE_HOST environment variable.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the HTTP server listens on.
    ///
    /// Set via PORT or CATALOG_CACHE_PORT environment variables.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the upstream catalog service.
    ///
    /// Set via CATALOG_CACHE_UPSTREAM_BASE_URL environment variable.
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,

    /// User-Agent string for upstream requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upstream request timeout in milliseconds.
    ///
    /// Each upstream call is a single attempt bounded by this timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Seconds between refresh runs. Runs are aligned to wall-clock
    /// multiples of this value, so 3600 fires at the top of every hour.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Run one refresh in the background right after startup.
    #[serde(default)]
    pub refresh_on_startup: bool,

    /// Keep refreshing the remaining resources when one fails, instead of
    /// abandoning the run.
    #[serde(default)]
    pub refresh_isolate_failures: bool,
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

fn default_upstream_base_url() -> String {
    "https://swapi.dev/api".into()
}

fn default_user_agent() -> String {
    "catalog-cache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_refresh_interval_secs() -> u64 {
    3600
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            upstream_base_url: default_upstream_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            refresh_interval_secs: default_refresh_interval_secs(),
            refresh_on_startup: false,
            refresh_isolate_failures: false,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Refresh period as Duration.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config_file = std::env::var(format!("{ENV_PREFIX}CONFIG_FILE")).ok();
        let config: Self = Self::figment(config_file.as_deref())
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Provider stack behind [`AppConfig::load`].
    pub fn figment(config_file: Option<&str>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::raw().only(&["port"])).merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }
}
