#![forbid(unsafe_code)]

//! Configuration errors and environment override helpers.

use std::fmt;

/// Environment variable overriding the activation delay, in milliseconds.
pub const ENV_ACTIVATION_DELAY_MS: &str = "HOVERKIT_ACTIVATION_DELAY_MS";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// An environment override could not be parsed.
    InvalidEnv { key: &'static str, value: String },
    /// A delay exceeds the allowed maximum.
    DelayTooLong { field: &'static str, millis: u128, max_millis: u128 },
    /// A dimension is negative, NaN, or infinite.
    InvalidDimension { field: &'static str, value: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnv { key, value } => {
                write!(f, "invalid value for {key}: {value:?}")
            }
            Self::DelayTooLong {
                field,
                millis,
                max_millis,
            } => write!(f, "{field} of {millis}ms exceeds the {max_millis}ms limit"),
            Self::InvalidDimension { field, value } => {
                write!(f, "{field} must be finite and non-negative, got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse an unsigned integer override, treating an unset or blank key as absent.
pub fn env_override_u64<F>(get_env: &F, key: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = get_env(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidEnv { key, value: raw })
}

/// Check that a layout dimension is usable.
pub fn check_dimension(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDimension { field, value })
    }
}
