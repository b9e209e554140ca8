//! Configuration error types.

use thiserror::Error;

/// Errors while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors found by semantic validation of loaded values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be at least {minimum}, got {actual}")]
    TooSmall {
        field: &'static str,
        minimum: i64,
        actual: i64,
    },

    #[error("minimum applicant age {min} must be below maximum {max}")]
    AgeWindowInverted { min: u32, max: u32 },
}
