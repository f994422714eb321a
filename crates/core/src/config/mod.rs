//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (TROLLEY_*)
//! 2. TOML config file (if TROLLEY_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Inclusive bounds, in seconds, for one randomized pause.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (TROLLEY_*)
/// 2. TOML config file (if TROLLEY_CONFIG_FILE set)
/// 3. Built-in defaults
///
/// The delay ranges are configuration rather than constants so cautious
/// operators can stretch them and tests can shrink them to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Storefront origin that search and product paths are joined onto.
    ///
    /// Set via TROLLEY_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path to the JSON nutrition cache file.
    ///
    /// Set via TROLLEY_CACHE_PATH environment variable.
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via TROLLEY_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Bodies shorter than this count as soft-blocked responses.
    ///
    /// Set via TROLLEY_MIN_BODY_BYTES environment variable.
    #[serde(default = "default_min_body_bytes")]
    pub min_body_bytes: usize,

    /// Maximum detail-page fetches per search batch.
    ///
    /// Set via TROLLEY_MAX_NUTRITION_FETCHES environment variable.
    #[serde(default = "default_max_nutrition_fetches")]
    pub max_nutrition_fetches: usize,

    /// Pause taken before each search request.
    ///
    /// Set via TROLLEY_SEARCH_DELAY__MIN_SECS / __MAX_SECS.
    #[serde(default = "default_search_delay")]
    pub search_delay: DelayRange,

    /// Pause taken before each detail-page request.
    ///
    /// Set via TROLLEY_DETAIL_DELAY__MIN_SECS / __MAX_SECS.
    #[serde(default = "default_detail_delay")]
    pub detail_delay: DelayRange,

    /// Cooldown after a successful detail-page fetch.
    ///
    /// Set via TROLLEY_COOLDOWN_DELAY__MIN_SECS / __MAX_SECS.
    #[serde(default = "default_cooldown_delay")]
    pub cooldown_delay: DelayRange,
}

fn default_base_url() -> String {
    "https://www.tesco.com".into()
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("./trolley-cache.json")
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_min_body_bytes() -> usize {
    10_000
}

fn default_max_nutrition_fetches() -> usize {
    2
}

fn default_search_delay() -> DelayRange {
    DelayRange::new(2.0, 4.0)
}

fn default_detail_delay() -> DelayRange {
    DelayRange::new(180.0, 360.0)
}

fn default_cooldown_delay() -> DelayRange {
    DelayRange::new(120.0, 300.0)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cache_path: default_cache_path(),
            timeout_ms: default_timeout_ms(),
            min_body_bytes: default_min_body_bytes(),
            max_nutrition_fetches: default_max_nutrition_fetches(),
            search_delay: default_search_delay(),
            detail_delay: default_detail_delay(),
            cooldown_delay: default_cooldown_delay(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `TROLLEY_`
    /// 2. TOML file from `TROLLEY_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("TROLLEY_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("TROLLEY_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
