//! Layered configuration loading with figment.
//!
//! Sources, lowest priority first:
//!
//! 1. [`WidgetryConfig::default`]
//! 2. `widgetry.<profile>.toml` next to the main file
//! 3. `widgetry.toml` (or `config.toml`) in the first search directory that
//!    has one
//! 4. `WIDGETRY_*` environment variables, `__` separating nested keys:
//!    `WIDGETRY_CATALOG__WIDGET_DIR=widgets`, `WIDGETRY_LOGGING__LEVEL=debug`
//! 5. Values set through [`ConfigLoader::merge`] and [`ConfigLoader::set`]
//!
//! With the `yaml-config` feature the same names ending in `.yaml` / `.yml`
//! are searched as well.
//!
//! ```rust,ignore
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .search_path("./etc")
//!     .set("catalog.widget_dir", "widgets")
//!     .load()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Serialized};
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::WidgetryConfig;
use super::validation::validate_config;

/// Environment variable selecting the configuration profile.
pub const PROFILE_ENV: &str = "WIDGETRY_PROFILE";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "WIDGETRY_";

/// Base names of configuration files, preferred first.
const FILE_STEMS: [&str; 2] = ["widgetry", "config"];

/// Extensions understood with the enabled format features.
const EXTENSIONS: &[&str] = &[
    #[cfg(feature = "toml-config")]
    "toml",
    #[cfg(feature = "yaml-config")]
    "yaml",
    #[cfg(feature = "yaml-config")]
    "yml",
];

/// Name of the active configuration profile.
///
/// `dev` and `prod` are normalized to `development` and `production`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile(String);

impl Profile {
    /// The profile used when none is selected.
    pub const DEFAULT: &'static str = "development";

    /// Normalizes a profile name.
    pub fn parse(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        Self(match name.as_str() {
            "dev" | "" => Self::DEFAULT.to_string(),
            "prod" => "production".to_string(),
            _ => name,
        })
    }

    /// Reads `WIDGETRY_PROFILE`, falling back to [`Profile::DEFAULT`].
    pub fn from_env() -> Self {
        std::env::var(PROFILE_ENV)
            .map(|name| Self::parse(&name))
            .unwrap_or_default()
    }

    /// Returns the profile name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builder collecting configuration sources.
pub struct ConfigLoader {
    profile: Profile,
    search_paths: Vec<PathBuf>,
    explicit_file: Option<PathBuf>,
    load_env: bool,
    overrides: Figment,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader using the profile from the environment.
    pub fn new() -> Self {
        Self {
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            explicit_file: None,
            load_env: true,
            overrides: Figment::new(),
        }
    }

    /// Selects the configuration profile.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    /// Adds a directory to search for configuration files.
    ///
    /// Without any, the current directory and the user configuration
    /// directory are searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds the current directory to the search paths.
    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    /// Adds `<user config dir>/widgetry` to the search paths.
    pub fn with_user_config_dir(self) -> Self {
        match user_config_dir() {
            Some(dir) => self.search_path(dir),
            None => self,
        }
    }

    /// Loads exactly this file instead of searching.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.explicit_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Reads `WIDGETRY_*` variables (the default).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Ignores the environment.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Overrides every other source with a whole configuration.
    pub fn merge(mut self, config: WidgetryConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Overrides a single dotted key, e.g. `logging.level`.
    pub fn set<T: Serialize>(mut self, key: &str, value: T) -> Self {
        self.overrides = self.overrides.merge(Serialized::default(key, value));
        self
    }

    /// Loads, validates and returns the configuration.
    pub fn load(self) -> ConfigResult<WidgetryConfig> {
        let profile = self.profile.clone();
        let config: WidgetryConfig = self
            .into_figment()?
            .extract()
            .map_err(|e| ConfigError::Malformed(e.to_string()))?;
        validate_config(&config)?;

        debug!(
            profile       = %profile,
            widget_dir    = %config.catalog.widget_dir,
            package_paths = config.catalog.package_paths.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    fn into_figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(WidgetryConfig::default()));

        let files = match &self.explicit_file {
            Some(path) if !path.is_file() => return Err(ConfigError::FileNotFound(path.clone())),
            Some(path) => vec![path.clone()],
            None => self.discover_files(),
        };
        if files.is_empty() {
            warn!("No configuration file found, using defaults");
        }
        for path in files {
            info!(path = %path.display(), "Loading configuration file");
            figment = merge_file(figment, &path)?;
        }

        if self.load_env {
            trace!(prefix = ENV_PREFIX, "Reading environment overrides");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["PROFILE"]).split("__"));
        }

        Ok(figment.merge(self.overrides))
    }

    /// Profile file and main file of the first search directory holding a
    /// main file, per enabled format.
    fn discover_files(&self) -> Vec<PathBuf> {
        let dirs: Vec<PathBuf> = if self.search_paths.is_empty() {
            std::env::current_dir()
                .ok()
                .into_iter()
                .chain(user_config_dir())
                .collect()
        } else {
            self.search_paths.clone()
        };

        let mut files = Vec::new();
        for ext in EXTENSIONS {
            let found = dirs.iter().find_map(|dir| {
                FILE_STEMS.iter().find_map(|stem| {
                    let main = dir.join(format!("{stem}.{ext}"));
                    main.is_file().then(|| {
                        let profiled = dir.join(format!("{stem}.{}.{ext}", self.profile));
                        (profiled, main)
                    })
                })
            });
            if let Some((profiled, main)) = found {
                if profiled.is_file() {
                    files.push(profiled);
                }
                files.push(main);
            }
        }
        files
    }
}

fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("widgetry"))
}

/// Merges one file, choosing the provider by extension.
fn merge_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        #[cfg(feature = "toml-config")]
        "toml" => Ok(figment.merge(Toml::file(path))),
        #[cfg(feature = "yaml-config")]
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        ext => Err(ConfigError::Malformed(format!(
            "unsupported configuration format `.{ext}` for {}",
            path.display()
        ))),
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<WidgetryConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from `path`, with environment overrides.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<WidgetryConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogLevel, LogOutput};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let dir = TempDir::new().unwrap();
        let config = ConfigLoader::new()
            .search_path(dir.path())
            .without_env()
            .load()
            .unwrap();

        assert_eq!(config.logging.level.as_str(), "info");
        assert_eq!(config.catalog.widget_dir, "widget");
        assert!(config.catalog.package_paths.is_empty());
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_profile_file_is_overridden_by_main_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("widgetry.staging.toml"),
            "[logging]\nlevel = \"trace\"\noutput = \"stderr\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("widgetry.toml"),
            "[catalog]\npackage_paths = [\"core\", \"addons\"]\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = ConfigLoader::new()
            .profile("staging")
            .search_path(dir.path())
            .without_env()
            .load()
            .unwrap();

        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.output, LogOutput::Stderr);
        assert_eq!(
            config.catalog.package_paths,
            [PathBuf::from("core"), PathBuf::from("addons")]
        );
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("widgetry.toml");

        fs::write(&path, "[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(matches!(
            ConfigLoader::new().file(&path).without_env().load(),
            Err(ConfigError::Malformed(_))
        ));

        fs::write(&path, "[catalog]\nwidget_dir = \"a/b\"\n").unwrap();
        assert!(matches!(
            ConfigLoader::new().file(&path).without_env().load(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let result = ConfigLoader::new()
            .file(dir.path().join("absent.toml"))
            .without_env()
            .load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_programmatic_merge_wins() {
        let dir = TempDir::new().unwrap();
        let mut overrides = WidgetryConfig::default();
        overrides.catalog.widget_dir = "widgets".to_string();

        let config = ConfigLoader::new()
            .search_path(dir.path())
            .without_env()
            .merge(overrides)
            .load()
            .unwrap();
        assert_eq!(config.catalog.widget_dir, "widgets");
    }

    #[test]
    fn test_single_key_override() {
        let dir = TempDir::new().unwrap();
        let config = ConfigLoader::new()
            .search_path(dir.path())
            .without_env()
            .set("logging.level", "trace")
            .load()
            .unwrap();
        assert_eq!(config.logging.level, LogLevel::Trace);
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!(Profile::parse("prod").as_str(), "production");
        assert_eq!(Profile::parse("DEV"), Profile::default());
        assert_eq!(Profile::parse(" Staging ").as_str(), "staging");
    }
}
