//! Error types for bumpkin-core

use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,

    /// A CI action input has a value of the wrong shape.
    #[error("input {name:?} has invalid value {value:?} (expected true or false)")]
    InvalidInput {
        /// Input name, e.g. `skip-tag`.
        name: String,
        /// The rejected value.
        value: String,
    },
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;
