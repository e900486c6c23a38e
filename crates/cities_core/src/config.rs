//! Core runtime configuration.
//!
//! # Responsibility
//! - Hold site-level knobs shared by storage, formatting and logging.
//! - Parse JSON config with defaults for every missing key.
//!
//! # Invariants
//! - A config returned by `from_json_str` has passed `validate()`.

use crate::datetime::ChronoDateFormatter;
use crate::logging::default_log_level;
use crate::model::city::{is_valid_langcode, DEFAULT_FORCED_COUNTRY_CODE};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_OFFSET_SECONDS: i32 = 24 * 3600 - 1;

/// Site configuration for the city core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Language used for new cities when the caller does not name one.
    pub default_langcode: String,
    /// Country code written onto every saved address.
    pub forced_country_code: String,
    /// Offset east of UTC used for user-facing date labels.
    pub timezone_offset_seconds: i32,
    /// Log level; `None` uses the build-mode default.
    pub log_level: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_langcode: "en".to_string(),
            forced_country_code: DEFAULT_FORCED_COUNTRY_CODE.to_string(),
            timezone_offset_seconds: 0,
            log_level: None,
        }
    }
}

impl CoreConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_langcode(&self.default_langcode) {
            return Err(ConfigError::Invalid(format!(
                "default_langcode `{}` is not a valid langcode",
                self.default_langcode
            )));
        }
        let country = self.forced_country_code.as_str();
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::Invalid(format!(
                "forced_country_code `{country}` must be two uppercase letters"
            )));
        }
        if !(-MAX_OFFSET_SECONDS..=MAX_OFFSET_SECONDS).contains(&self.timezone_offset_seconds) {
            return Err(ConfigError::Invalid(format!(
                "timezone_offset_seconds `{}` is out of range",
                self.timezone_offset_seconds
            )));
        }
        Ok(())
    }

    /// Effective log level.
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    /// Date formatter rendering at the configured offset.
    pub fn date_formatter(&self) -> Result<ChronoDateFormatter, ConfigError> {
        ChronoDateFormatter::with_offset_seconds(self.timezone_offset_seconds).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "timezone_offset_seconds `{}` is out of range",
                self.timezone_offset_seconds
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "failed to parse config: {message}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {}
