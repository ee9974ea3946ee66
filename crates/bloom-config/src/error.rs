//! # Configuration Errors

use bloom_core::ValidationError;
use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failures while loading, validating or saving store configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the config file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for `StoreConfig`.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be written as TOML.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is well-formed but not acceptable as pricing policy.
    #[error("Invalid store configuration: {0}")]
    Invalid(String),

    /// A value failed a bloom-core validation rule.
    #[error("Invalid store configuration: {0}")]
    Validation(#[from] ValidationError),

    /// No path was given and no platform config directory exists.
    #[error("No config path available")]
    NoConfigPath,
}
