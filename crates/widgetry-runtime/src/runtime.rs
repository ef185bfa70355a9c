//! Assembly of a ready-to-use [`WidgetManager`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use widgetry_runtime::WidgetRuntime;
//!
//! // Loads widgetry.toml from the current directory, installs logging and
//! // uses the in-memory store, Jinja views and rule validator.
//! let runtime = WidgetRuntime::builder().build()?;
//!
//! // Custom configuration and collaborators
//! let runtime = WidgetRuntime::builder()
//!     .config_file("config/widgetry.toml")
//!     .profile("production")
//!     .package_path("addons/shared")
//!     .store(Arc::new(MyDatabaseStore::connect(url)?))
//!     .build()?;
//!
//! for rendered in runtime.manager().render_area("sidebar")? {
//!     println!("{}", rendered.html);
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use widgetry_core::{FieldValidator, OptionCodec, ViewRenderer, WidgetDescriptor, WidgetStore};
use widgetry_framework::{WidgetCatalog, WidgetManager, WidgetRegistry};

use crate::config::{ConfigLoader, WidgetryConfig};
use crate::error::RuntimeResult;
use crate::logging;
use crate::store::MemoryStore;
use crate::validator::RuleValidator;
use crate::view::JinjaViewRenderer;

/// A configured widget engine.
pub struct WidgetRuntime {
    config: WidgetryConfig,
    manager: WidgetManager,
}

impl WidgetRuntime {
    /// Creates a runtime builder.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from configuration with the default collaborators.
    ///
    /// Initializes logging from `config.logging` if no subscriber is installed.
    pub fn from_config(config: WidgetryConfig) -> RuntimeResult<Self> {
        RuntimeBuilder::new().config(config).build()
    }

    /// Returns the configuration the runtime was built from.
    pub fn config(&self) -> &WidgetryConfig {
        &self.config
    }

    /// Returns the widget manager.
    pub fn manager(&self) -> &WidgetManager {
        &self.manager
    }

    /// Consumes the runtime, returning the widget manager.
    pub fn into_manager(self) -> WidgetManager {
        self.manager
    }
}

/// Builder for [`WidgetRuntime`].
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    config: Option<WidgetryConfig>,
    init_logging: bool,
    package_paths: Vec<PathBuf>,
    collect_linked: bool,
    widgets: Vec<WidgetDescriptor>,
    store: Option<Arc<dyn WidgetStore>>,
    views: Option<Arc<dyn ViewRenderer>>,
    validator: Option<Arc<dyn FieldValidator>>,
    codec: Option<Arc<dyn OptionCodec>>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            config: None,
            init_logging: true,
            package_paths: Vec::new(),
            collect_linked: true,
            widgets: Vec::new(),
            store: None,
            views: None,
            validator: None,
            codec: None,
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: WidgetryConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Uses `config` as is, skipping every configuration source.
    pub fn config(mut self, config: WidgetryConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Whether to install a tracing subscriber from the logging config
    /// (enabled by default).
    pub fn init_logging(mut self, enabled: bool) -> Self {
        self.init_logging = enabled;
        self
    }

    // =========================================================================
    // Widgets
    // =========================================================================

    /// Adds a package root after the configured ones.
    pub fn package_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.package_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Whether to collect widgets registered with `#[register_widget]`
    /// (enabled by default).
    pub fn collect_linked_widgets(mut self, enabled: bool) -> Self {
        self.collect_linked = enabled;
        self
    }

    /// Registers a widget implementation by hand, overriding a linked one
    /// with the same slug.
    pub fn widget(mut self, descriptor: WidgetDescriptor) -> Self {
        self.widgets.push(descriptor);
        self
    }

    // =========================================================================
    // Collaborators
    // =========================================================================

    /// Sets the record store (default: [`MemoryStore`]).
    pub fn store(mut self, store: Arc<dyn WidgetStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the view renderer (default: [`JinjaViewRenderer`]).
    pub fn views(mut self, views: Arc<dyn ViewRenderer>) -> Self {
        self.views = Some(views);
        self
    }

    /// Sets the field validator (default: [`RuleValidator`]).
    pub fn validator(mut self, validator: Arc<dyn FieldValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Sets the option codec (default: JSON).
    pub fn codec(mut self, codec: Arc<dyn OptionCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Builds the runtime.
    ///
    /// Fails if the configuration cannot be loaded. Package roots that are not
    /// directories are logged and contribute no widgets.
    pub fn build(self) -> RuntimeResult<WidgetRuntime> {
        let config = match self.config {
            Some(config) => config,
            None => self.config_loader.load()?,
        };

        if self.init_logging {
            logging::init_from_config(&config.logging);
        }

        let roots: Vec<PathBuf> = config
            .catalog
            .package_paths
            .iter()
            .chain(&self.package_paths)
            .cloned()
            .collect();
        for missing in roots.iter().filter(|root| !root.is_dir()) {
            warn!(path = %missing.display(), "Package path is not a directory, skipping");
        }
        let catalog = WidgetCatalog::build_in(&roots, &config.catalog.widget_dir);

        let mut registry = if self.collect_linked {
            WidgetRegistry::collect_all()
        } else {
            WidgetRegistry::new()
        };
        for descriptor in self.widgets {
            registry.register(descriptor);
        }
        debug!(slugs = ?registry.slugs(), "Widget registry ready");

        let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let views = self
            .views
            .unwrap_or_else(|| Arc::new(JinjaViewRenderer::new()));
        let validator = self
            .validator
            .unwrap_or_else(|| Arc::new(RuleValidator::new()));

        let mut manager = WidgetManager::new(catalog, registry, store, views, validator);
        if let Some(codec) = self.codec {
            manager = manager.with_codec(codec);
        }

        info!(
            roots = roots.len(),
            widgets = manager.catalog().len(),
            implementations = manager.registry().len(),
            "Widget runtime initialized"
        );

        Ok(WidgetRuntime { config, manager })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use std::fs;
    use tempfile::TempDir;

    fn builder() -> RuntimeBuilder {
        WidgetRuntime::builder()
            .config(WidgetryConfig::default())
            .init_logging(false)
    }

    #[test]
    fn test_build_with_defaults() {
        let runtime = builder().build().unwrap();
        assert!(runtime.manager().catalog().is_empty());
        assert!(runtime.manager().list_areas().unwrap().is_empty());
    }

    #[test]
    fn test_package_paths_extend_config() {
        let core = TempDir::new().unwrap();
        let addons = TempDir::new().unwrap();
        fs::create_dir_all(core.path().join("widget/tags")).unwrap();
        fs::create_dir_all(addons.path().join("widget/tags")).unwrap();
        fs::create_dir_all(addons.path().join("widget/html")).unwrap();

        let mut config = WidgetryConfig::default();
        config.catalog.package_paths.push(core.path().to_path_buf());

        let runtime = builder()
            .config(config)
            .package_path(addons.path())
            .build()
            .unwrap();

        let catalog = runtime.manager().catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.location("tags"), Some(addons.path().join("widget/tags").as_path()));
        assert_eq!(runtime.config().catalog.package_paths.len(), 1);
    }

    #[test]
    fn test_custom_widget_dir() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("widgets/tags")).unwrap();

        let mut config = WidgetryConfig::default();
        config.catalog.widget_dir = "widgets".to_string();
        config.catalog.package_paths.push(root.path().to_path_buf());

        let runtime = builder().config(config).build().unwrap();
        assert!(runtime.manager().catalog().contains("tags"));
    }

    #[test]
    fn test_missing_package_path_is_skipped() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("widget/tags")).unwrap();
        let missing = root.path().join("nowhere");

        let runtime = builder()
            .package_path(root.path())
            .package_path(&missing)
            .build()
            .unwrap();
        let slugs: Vec<&str> = runtime.manager().catalog().slugs().collect();
        assert_eq!(slugs, ["tags"]);
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("widgetry.toml");
        fs::write(&path, "[catalog]\nwidget_dir = \"a/b\"\n").unwrap();

        let result = WidgetRuntime::builder()
            .without_env()
            .config_file(&path)
            .init_logging(false)
            .build();
        assert!(matches!(result, Err(RuntimeError::Config(_))));
    }
}
