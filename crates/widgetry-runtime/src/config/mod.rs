//! Configuration module for the Widgetry runtime.
//!
//! This module provides layered configuration loading (figment) and
//! validation for widget discovery and logging.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    CatalogConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, SpanEventConfig,
    WidgetryConfig,
};
pub use validation::validate_config;
