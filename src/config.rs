//! Process-wide expectation configuration
//!
//! Timeouts, retry budget and viewport defaults are "set once, used
//! everywhere" state. The host installs a configuration at startup;
//! components read it at first use and fall back to the documented
//! defaults when nothing was installed. Components also accept an
//! explicit configuration, which keeps tests independent of the
//! singleton.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ExpectError;

static GLOBAL: OnceCell<ExpectConfig> = OnceCell::new();

/// Process-wide configuration surface
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpectConfig {
    /// Deadline for a single polling wait (milliseconds)
    pub expectation_timeout_ms: u64,

    /// Pause between condition evaluations inside a wait (milliseconds)
    pub poll_interval_ms: u64,

    /// Retry budget for a single retryable action
    pub retry_attempts: u32,

    /// Fixed pause between retry attempts (milliseconds)
    pub retry_delay_ms: u64,

    /// Default browser viewport width (pixels)
    pub viewport_width: u32,

    /// Default browser viewport height (pixels)
    pub viewport_height: u32,
}

impl Default for ExpectConfig {
    fn default() -> Self {
        Self {
            expectation_timeout_ms: 10_000,
            poll_interval_ms: 100,
            retry_attempts: 3,
            retry_delay_ms: 1_000,
            viewport_width: 1024,
            viewport_height: 768,
        }
    }
}

impl ExpectConfig {
    /// Validate the configuration, failing fast on unusable values
    pub fn validate(&self) -> Result<(), ExpectError> {
        if self.expectation_timeout_ms == 0 {
            return Err(ExpectError::Configuration(
                "expectation_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ExpectError::Configuration(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.retry_attempts == 0 {
            return Err(ExpectError::Configuration(
                "retry_attempts must be greater than zero".to_string(),
            ));
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ExpectError::Configuration(
                "viewport dimensions must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Install this configuration as the process-wide default.
    ///
    /// Fails when the configuration is invalid or when a configuration
    /// was already installed (first installation wins).
    pub fn install(self) -> Result<(), ExpectError> {
        self.validate()?;
        GLOBAL.set(self).map_err(|_| {
            ExpectError::Configuration("configuration already installed".to_string())
        })
    }

    /// The installed configuration, or the documented defaults
    pub fn global() -> &'static ExpectConfig {
        GLOBAL.get_or_init(ExpectConfig::default)
    }

    /// Polling wait deadline as a [`Duration`]
    pub fn expectation_timeout(&self) -> Duration {
        Duration::from_millis(self.expectation_timeout_ms)
    }

    /// Poll interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Retry delay as a [`Duration`]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExpectConfig::default();
        assert_eq!(config.expectation_timeout_ms, 10_000);
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay_ms, 1_000);
        assert_eq!(config.viewport_width, 1024);
        assert_eq!(config.viewport_height, 768);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ExpectConfig {
            expectation_timeout_ms: 0,
            ..ExpectConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ExpectError::Configuration(_))
        ));
    }

    #[test]
    fn test_zero_retry_budget_rejected() {
        let config = ExpectConfig {
            retry_attempts: 0,
            ..ExpectConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ExpectError::Configuration(_))
        ));
    }

    #[test]
    fn test_zero_viewport_rejected() {
        let config = ExpectConfig {
            viewport_width: 0,
            ..ExpectConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
