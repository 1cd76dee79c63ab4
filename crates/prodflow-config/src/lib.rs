//! # Prodflow Config
//!
//! Single-file YAML configuration for the production coordination
//! core: application identity, rate limiting profiles, store backends,
//! and observability settings. Every field has a default so an empty
//! file (or no file at all) yields a working development setup.

mod loader;

pub use loader::{load_config, ConfigError};

use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration schema.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProdflowConfig {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub stores: StoresConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            environment: default_env(),
        }
    }
}

fn default_app_name() -> String {
    "prodflow".to_string()
}

fn default_env() -> String {
    "development".to_string()
}

/// Sliding-window limiter profiles plus the cleanup cadence.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_auth_profile")]
    pub auth: RateProfile,
    #[serde(default = "default_api_profile")]
    pub api: RateProfile,
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth: default_auth_profile(),
            api: default_api_profile(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl RateLimitConfig {
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateProfile {
    pub limit: usize,
    pub window_secs: u64,
}

impl RateProfile {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

fn default_auth_profile() -> RateProfile {
    RateProfile {
        limit: 5,
        window_secs: 60,
    }
}

fn default_api_profile() -> RateProfile {
    RateProfile {
        limit: 100,
        window_secs: 60,
    }
}

fn default_cleanup_interval_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StoresConfig {
    #[serde(default)]
    pub plan: StoreSpec,
    #[serde(default)]
    pub schedule: StoreSpec,
    #[serde(default)]
    pub link: StoreSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSpec {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub connection_url: Option<String>,
}

impl Default for StoreSpec {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            connection_url: None,
        }
    }
}

fn default_backend() -> String {
    "in_memory".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
