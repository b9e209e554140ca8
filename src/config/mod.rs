//! Engine configuration.
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `LENDLINE`
//! prefix and `__` (double underscore) as the nesting separator, e.g.
//! `LENDLINE__STALENESS_MINUTES=45`.

mod error;

pub use error::{ConfigError, ValidationError};

use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::Language;

fn default_staleness_minutes() -> i64 {
    30
}

fn default_min_applicant_age() -> u32 {
    18
}

fn default_max_applicant_age() -> u32 {
    75
}

fn default_offer_presentation_cap() -> usize {
    3
}

fn default_gateway_deadline_secs() -> u64 {
    10
}

/// Tunables of the dialog orchestration engine.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Idle minutes after which a session is reset on the next event.
    #[serde(default = "default_staleness_minutes")]
    pub staleness_minutes: i64,

    /// Youngest accepted applicant age in whole years.
    #[serde(default = "default_min_applicant_age")]
    pub min_applicant_age: u32,

    /// Oldest accepted applicant age in whole years.
    #[serde(default = "default_max_applicant_age")]
    pub max_applicant_age: u32,

    /// Most offers the channel can present as direct choices in one
    /// message; excess offers are truncated with an audit record.
    #[serde(default = "default_offer_presentation_cap")]
    pub offer_presentation_cap: usize,

    /// Deadline for one decision/support gateway call.
    #[serde(default = "default_gateway_deadline_secs")]
    pub gateway_deadline_secs: u64,

    /// Language used before the user has chosen one.
    #[serde(default)]
    pub default_language: Language,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            staleness_minutes: default_staleness_minutes(),
            min_applicant_age: default_min_applicant_age(),
            max_applicant_age: default_max_applicant_age(),
            offer_presentation_cap: default_offer_presentation_cap(),
            gateway_deadline_secs: default_gateway_deadline_secs(),
            default_language: Language::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Loads a `.env` file if present (development), then reads
    /// `LENDLINE`-prefixed variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed into its typed
    /// field.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("LENDLINE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation of loaded values.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any value is out of range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.staleness_minutes < 1 {
            return Err(ValidationError::TooSmall {
                field: "staleness_minutes",
                minimum: 1,
                actual: self.staleness_minutes,
            });
        }
        if self.offer_presentation_cap < 1 {
            return Err(ValidationError::TooSmall {
                field: "offer_presentation_cap",
                minimum: 1,
                actual: self.offer_presentation_cap as i64,
            });
        }
        if self.gateway_deadline_secs < 1 {
            return Err(ValidationError::TooSmall {
                field: "gateway_deadline_secs",
                minimum: 1,
                actual: self.gateway_deadline_secs as i64,
            });
        }
        if self.min_applicant_age >= self.max_applicant_age {
            return Err(ValidationError::AgeWindowInverted {
                min: self.min_applicant_age,
                max: self.max_applicant_age,
            });
        }
        Ok(())
    }

    /// Deadline for one gateway call.
    pub fn gateway_deadline(&self) -> Duration {
        Duration::from_secs(self.gateway_deadline_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.staleness_minutes, 30);
        assert_eq!(config.offer_presentation_cap, 3);
        assert_eq!(config.default_language, Language::En);
    }

    #[test]
    fn rejects_zero_staleness() {
        let config = EngineConfig {
            staleness_minutes: 0,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::TooSmall {
                field: "staleness_minutes",
                minimum: 1,
                actual: 0,
            })
        );
    }

    #[test]
    fn rejects_inverted_age_window() {
        let config = EngineConfig {
            min_applicant_age: 80,
            max_applicant_age: 75,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::AgeWindowInverted { min: 80, max: 75 })
        );
    }
}
