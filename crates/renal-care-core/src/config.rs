//! Runtime configuration and logging setup.

use chrono::{FixedOffset, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Application-level constants
pub const APP_NAME: &str = "renal-care";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of days in a displayed adherence week.
pub const WEEK_LENGTH_DAYS: u32 = 7;

/// Longest window a single range query may cover.
pub const MAX_RANGE_DAYS: u32 = 366;

/// Filter used when neither `RUST_LOG` nor the configuration supplies one.
pub const DEFAULT_LOG_FILTER: &str = "renal_care_core=info";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("UTC offset out of range: {0} minutes")]
    InvalidUtcOffset(i32),

    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidLogFilter { filter: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Core configuration supplied by the host app.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoreConfig {
    /// Offset of the owner's wall clock from UTC, in minutes
    pub utc_offset_minutes: i32,
    /// First day of a displayed week
    pub week_starts_on: Weekday,
    /// `tracing` filter installed when the core opens, unless `RUST_LOG` is set
    pub log_filter: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            week_starts_on: Weekday::Mon,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl CoreConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: CoreConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field that can be out of range.
    pub fn validate(&self) -> ConfigResult<()> {
        self.utc_offset()?;
        EnvFilter::try_new(&self.log_filter).map_err(|e| ConfigError::InvalidLogFilter {
            filter: self.log_filter.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// The configured offset as a chrono offset.
    pub fn utc_offset(&self) -> ConfigResult<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidUtcOffset(self.utc_offset_minutes))
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `filter`; `filter` wins over [`DEFAULT_LOG_FILTER`].
/// Returns `false` if a subscriber was already installed.
pub fn init_logging(filter: Option<&str>) -> bool {
    let fallback = filter.unwrap_or(DEFAULT_LOG_FILTER);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoreConfig::default();
        assert_eq!(config.utc_offset_minutes, 0);
        assert_eq!(config.week_starts_on, Weekday::Mon);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_utc_offset() {
        let config = CoreConfig {
            utc_offset_minutes: -300,
            ..CoreConfig::default()
        };
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), -5 * 3600);

        let config = CoreConfig {
            utc_offset_minutes: 24 * 60,
            ..CoreConfig::default()
        };
        assert!(matches!(
            config.utc_offset(),
            Err(ConfigError::InvalidUtcOffset(1440))
        ));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = CoreConfig::from_json(r#"{"utc_offset_minutes": 60}"#).unwrap();
        assert_eq!(config.utc_offset_minutes, 60);
        assert_eq!(config.week_starts_on, Weekday::Mon);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_from_json_rejects_bad_offset() {
        let result = CoreConfig::from_json(r#"{"utc_offset_minutes": 100000}"#);
        assert!(matches!(result, Err(ConfigError::InvalidUtcOffset(_))));
    }

    #[test]
    fn test_from_json_weekday_and_filter() {
        let config =
            CoreConfig::from_json(r#"{"week_starts_on": "Sun", "log_filter": "warn"}"#).unwrap();
        assert_eq!(config.week_starts_on, Weekday::Sun);
        assert_eq!(config.log_filter, "warn");

        assert!(matches!(
            CoreConfig::from_json(r#"{"week_starts_on": "someday"}"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            CoreConfig::from_json(r#"{"log_filter": "renal_care_core=loud"}"#),
            Err(ConfigError::InvalidLogFilter { .. })
        ));
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(Some("renal_care_core=debug"));
        assert!(!init_logging(None));
    }
}
