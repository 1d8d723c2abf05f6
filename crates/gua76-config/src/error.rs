//! Error types for configuration operations.

use gua76_dynamics::SetupError;
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur while parsing, validating or converting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Preset not found
    #[error("preset not found: {0}")]
    PresetNotFound(String),

    /// Validation errors
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The processor rejected the configuration
    #[error("processor setup failed: {0}")]
    Setup(#[from] SetupError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn preset_not_found_display() {
        let err = ConfigError::PresetNotFound("my-preset".to_string());
        assert_eq!(err.to_string(), "preset not found: my-preset");
        assert!(err.source().is_none());
    }

    #[test]
    fn toml_parse_wraps_source() {
        let err: ConfigError = toml::from_str::<toml::Table>("= broken")
            .map_err(ConfigError::from)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("failed to parse TOML"), "got: {msg}");
        assert!(err.source().is_some());
    }

    #[test]
    fn setup_error_converts() {
        let err = ConfigError::from(SetupError::ZeroBlockSize);
        assert!(matches!(err, ConfigError::Setup(SetupError::ZeroBlockSize)));
        assert!(err.to_string().contains("max block size"), "got: {err}");
    }

    #[test]
    fn validation_error_converts() {
        let err = ConfigError::from(ValidationError::UnknownControl("gain".to_string()));
        assert_eq!(err.to_string(), "validation failed: unknown control: gain");
    }
}
