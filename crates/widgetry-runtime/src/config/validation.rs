//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{CatalogConfig, LogOutput, LoggingConfig, WidgetryConfig};

/// Validates the entire configuration.
///
/// Log levels are checked while extracting, since unknown level names fail to
/// deserialize.
pub fn validate_config(config: &WidgetryConfig) -> ConfigResult<()> {
    validate_catalog_config(&config.catalog)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates widget discovery settings.
fn validate_catalog_config(catalog: &CatalogConfig) -> ConfigResult<()> {
    let dir = catalog.widget_dir.as_str();

    if dir.is_empty() {
        return Err(ConfigError::missing_key("catalog.widget_dir"));
    }

    if dir.contains(['/', '\\']) || dir == "." || dir == ".." {
        return Err(ConfigError::invalid(format!(
            "Widget directory must be a plain directory name, got: {dir}"
        )));
    }

    if catalog.package_paths.iter().any(|p| p.as_os_str().is_empty()) {
        return Err(ConfigError::invalid("Package paths cannot be empty"));
    }

    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_key("logging.file_path"));
    }

    if logging.max_files == 0 {
        return Err(ConfigError::invalid("max_files must be greater than 0"));
    }

    if logging.filters.keys().any(|module| module.trim().is_empty()) {
        return Err(ConfigError::invalid("Log filter module names cannot be empty"));
    }

    Ok(())
}
