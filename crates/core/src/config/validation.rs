//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use thiserror::Error;

use crate::config::{AppConfig, DelayRange};

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn validate_delay(field: &str, range: DelayRange) -> Result<(), ConfigError> {
    if !range.min_secs.is_finite() || !range.max_secs.is_finite() || range.min_secs < 0.0 {
        return Err(ConfigError::Invalid {
            field: field.into(),
            reason: "delay bounds must be finite and non-negative".into(),
        });
    }
    if range.min_secs > range.max_secs {
        return Err(ConfigError::Invalid {
            field: field.into(),
            reason: "min_secs must not exceed max_secs".into(),
        });
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `base_url` is empty or not http(s)
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `max_nutrition_fetches` is 0
    /// - any delay range is negative, non-finite, or inverted
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Invalid {
                field: "base_url".into(),
                reason: "must not be empty".into(),
            });
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "base_url".into(),
                reason: "must be an http(s) origin".into(),
            });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must be at least 100ms".into(),
            });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.max_nutrition_fetches == 0 {
            return Err(ConfigError::Invalid {
                field: "max_nutrition_fetches".into(),
                reason: "must be at least 1".into(),
            });
        }

        validate_delay("search_delay", self.search_delay)?;
        validate_delay("detail_delay", self.detail_delay)?;
        validate_delay("cooldown_delay", self.cooldown_delay)?;

        if self.min_body_bytes == 0 {
            tracing::warn!("min_body_bytes is 0; short-body soft-block detection is disabled");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_base_url() {
        let config = AppConfig { base_url: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "base_url"));
    }

    #[test]
    fn test_validate_non_http_base_url() {
        let config = AppConfig { base_url: "ftp://www.tesco.com".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "base_url"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() }; // 5min 1sec
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_zero_nutrition_cap() {
        let config = AppConfig { max_nutrition_fetches: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_nutrition_fetches"));
    }

    #[test]
    fn test_validate_inverted_delay_range() {
        let config = AppConfig { search_delay: DelayRange::new(4.0, 2.0), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "search_delay"));
    }

    #[test]
    fn test_validate_negative_delay() {
        let config = AppConfig { cooldown_delay: DelayRange::new(-1.0, 10.0), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cooldown_delay"));
    }

    #[test]
    fn test_validate_zero_width_delay_is_ok() {
        let config = AppConfig {
            search_delay: DelayRange::new(0.0, 0.0),
            detail_delay: DelayRange::new(0.0, 0.0),
            cooldown_delay: DelayRange::new(0.0, 0.0),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_edge_timeouts() {
        let config = AppConfig { timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());

        let config = AppConfig { timeout_ms: 300_000, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
