//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("configuration file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// A source could not be read into [`WidgetryConfig`](super::WidgetryConfig).
    #[error("malformed configuration: {0}")]
    Malformed(String),

    /// A value was read but is not acceptable.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// A key required by another setting is unset.
    #[error("configuration key `{0}` must be set")]
    MissingKey(String),
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey(key.into())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
