//! Configuration error types.

use thiserror::Error;

/// Errors raised while parsing or validating a [`crate::WorldConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML text could not be parsed.
    #[error("failed to parse world config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be written back to TOML.
    #[error("failed to serialize world config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A field is out of its allowed range.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Dotted field path.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
