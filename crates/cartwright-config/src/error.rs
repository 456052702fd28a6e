//! # Config Error Types
//!
//! Failures while loading, saving or applying configuration.

use cartwright_core::CartError;
use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the config file failed.
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`crate::CartwrightConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The config parsed but breaks a rule checked by `validate`.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// No explicit path was given and the platform has no config directory.
    #[error("No config path available")]
    NoConfigPath,

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Cart(#[from] CartError),
}

impl ConfigError {
    /// Returns true if the error came from the file contents rather than the
    /// environment the process runs in.
    pub fn is_content_error(&self) -> bool {
        matches!(self, ConfigError::Parse(_) | ConfigError::Invalid(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ConfigError::Invalid("bps must be <= 10000".into());
        assert_eq!(err.to_string(), "Invalid configuration: bps must be <= 10000");
        assert!(err.is_content_error());

        let err: ConfigError = CartError::UnknownEvent("ship".into()).into();
        assert!(matches!(err, ConfigError::Cart(_)));
        assert!(!err.is_content_error());
    }
}
