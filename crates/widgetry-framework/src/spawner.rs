//! Turning a catalog slug into a live widget.
//!
//! Spawning resolves three things in order:
//!
//! 1. the package location, from the [`WidgetCatalog`] (unknown slug is an
//!    error);
//! 2. the definition file `<location>/<slug>.toml` (absent means "not a
//!    widget", `Ok(None)`);
//! 3. the implementation, from the [`WidgetRegistry`] (a definition without
//!    an implementation is an error).
//!
//! The definition file doubles as the package manifest. It is parsed with
//! figment; a malformed file degrades to an empty manifest.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Format, Toml};
use tracing::{debug, trace, warn};
use widgetry_core::{
    Capabilities, FieldSpec, Options, RunOutput, Widget, WidgetError, WidgetManifest,
    WidgetResult, WidgetSummary,
};

use crate::catalog::WidgetCatalog;
use crate::registry::WidgetRegistry;

/// Extension of widget definition files.
pub const DEFINITION_EXTENSION: &str = "toml";

/// Directory inside a package that holds its templates.
pub const VIEWS_DIR: &str = "views";

/// Path of the definition file for `slug` inside `location`.
pub fn definition_path(location: &Path, slug: &str) -> PathBuf {
    location.join(format!("{slug}.{DEFINITION_EXTENSION}"))
}

// =============================================================================
// SpawnedWidget
// =============================================================================

/// A freshly instantiated widget bound to its package.
///
/// Created per operation. Hook calls are gated on the capability set computed
/// at spawn time, and hook failures are tagged with the slug and hook name.
pub struct SpawnedWidget {
    slug: String,
    location: PathBuf,
    manifest: WidgetManifest,
    capabilities: Capabilities,
    widget: Box<dyn Widget>,
}

impl SpawnedWidget {
    /// Widget slug.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Package directory.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Metadata from the definition file.
    pub fn manifest(&self) -> &WidgetManifest {
        &self.manifest
    }

    /// Hooks the implementation provides.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Returns `true` if the implementation provides `capability`.
    pub fn has(&self, capability: Capabilities) -> bool {
        self.capabilities.contains(capability)
    }

    /// Metadata summary used by catalog listings.
    pub fn summary(&self) -> WidgetSummary {
        WidgetSummary {
            slug: self.slug.clone(),
            manifest: self.manifest.clone(),
            capabilities: self.capabilities,
        }
    }

    /// Declared fields, empty when the widget declares none.
    pub fn fields(&self) -> Vec<FieldSpec> {
        if self.has(Capabilities::FIELDS) {
            self.widget.fields()
        } else {
            Vec::new()
        }
    }

    /// Runs the display hook. Widgets without one render with defaults.
    pub fn run(&mut self, options: &Options) -> WidgetResult<RunOutput> {
        if !self.has(Capabilities::RUN) {
            return Ok(RunOutput::Defaults);
        }
        trace!(slug = %self.slug, "Running display hook");
        self.widget
            .run(options)
            .map_err(|e| WidgetError::hook(&self.slug, "run", e))
    }

    /// Runs the form hook, or returns `None` when the widget has none.
    pub fn form(&mut self, options: &Options) -> WidgetResult<Option<Options>> {
        if !self.has(Capabilities::FORM) {
            return Ok(None);
        }
        trace!(slug = %self.slug, "Running form hook");
        self.widget
            .form(options)
            .map(Some)
            .map_err(|e| WidgetError::hook(&self.slug, "form", e))
    }

    /// Runs the save hook. Widgets without one store options unchanged.
    pub fn save(&mut self, options: Options) -> WidgetResult<Options> {
        if !self.has(Capabilities::SAVE) {
            return Ok(options);
        }
        trace!(slug = %self.slug, "Running save hook");
        self.widget
            .save(options)
            .map_err(|e| WidgetError::hook(&self.slug, "save", e))
    }

    /// Resolves the template file for `view` (`display` or `form`).
    ///
    /// The first file in `views/`, by name, whose stem equals `view` wins, so
    /// `display.html` and `display.jinja` are both accepted.
    pub fn template(&self, view: &'static str) -> WidgetResult<PathBuf> {
        let missing = || WidgetError::TemplateMissing {
            slug: self.slug.clone(),
            view,
            location: self.location.clone(),
        };

        let read = std::fs::read_dir(self.location.join(VIEWS_DIR)).map_err(|_| missing())?;

        let mut candidates: Vec<PathBuf> = read
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.file_stem().is_some_and(|stem| stem == view))
            .collect();
        candidates.sort();

        candidates.into_iter().next().ok_or_else(missing)
    }
}

impl fmt::Debug for SpawnedWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnedWidget")
            .field("slug", &self.slug)
            .field("location", &self.location)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// WidgetSpawner
// =============================================================================

/// Owns the catalog and registry and spawns widgets from them.
#[derive(Debug, Clone, Default)]
pub struct WidgetSpawner {
    catalog: WidgetCatalog,
    registry: WidgetRegistry,
}

impl WidgetSpawner {
    /// Creates a spawner over a built catalog and registry.
    pub fn new(catalog: WidgetCatalog, registry: WidgetRegistry) -> Self {
        Self { catalog, registry }
    }

    /// The discovered packages.
    pub fn catalog(&self) -> &WidgetCatalog {
        &self.catalog
    }

    /// The registered implementations.
    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    /// Spawns the widget with `slug`.
    ///
    /// # Errors
    ///
    /// - [`WidgetError::UnknownWidget`] if the catalog never saw `slug`.
    /// - [`WidgetError::ImplementationMissing`] if the definition file exists
    ///   but no implementation is registered.
    ///
    /// Returns `Ok(None)` when the package has no definition file.
    pub fn spawn(&self, slug: &str) -> WidgetResult<Option<SpawnedWidget>> {
        let location = self
            .catalog
            .location(slug)
            .ok_or_else(|| WidgetError::unknown(slug))?;

        let definition = definition_path(location, slug);
        if !definition.is_file() {
            debug!(slug, path = %definition.display(), "Widget definition file missing");
            return Ok(None);
        }

        let descriptor = self
            .registry
            .get(slug)
            .ok_or_else(|| WidgetError::ImplementationMissing {
                slug: slug.to_string(),
            })?;

        let manifest = load_manifest(&definition, slug);

        let mut widget = descriptor.instantiate();
        widget.set_location(location);
        let capabilities = widget.capabilities();

        trace!(slug, capabilities = %capabilities, "Widget spawned");

        Ok(Some(SpawnedWidget {
            slug: slug.to_string(),
            location: location.to_path_buf(),
            manifest,
            capabilities,
            widget,
        }))
    }
}

fn load_manifest(path: &Path, slug: &str) -> WidgetManifest {
    match Figment::from(Toml::file(path)).extract::<WidgetManifest>() {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!(slug, path = %path.display(), error = %e, "Invalid widget definition file, using empty manifest");
            WidgetManifest::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use serde_json::json;

    #[test]
    fn test_unknown_slug_is_an_error() {
        let fixture = Fixture::new();
        let err = fixture.spawner().spawn("nope").unwrap_err();
        assert!(matches!(err, WidgetError::UnknownWidget { slug } if slug == "nope"));
    }

    #[test]
    fn test_missing_definition_file_is_absent() {
        let fixture = Fixture::new();
        fixture.bare_package("assets");
        assert!(fixture.spawner().spawn("assets").unwrap().is_none());
    }

    #[test]
    fn test_definition_without_implementation() {
        let fixture = Fixture::new();
        fixture.package("ghost", "title = \"Ghost\"\n");
        let spawner = WidgetSpawner::new(fixture.catalog(), WidgetRegistry::new());
        let err = spawner.spawn("ghost").unwrap_err();
        assert!(matches!(err, WidgetError::ImplementationMissing { slug } if slug == "ghost"));
    }

    #[test]
    fn test_spawn_reads_manifest_and_location() {
        let fixture = Fixture::new();
        let location = fixture.package(
            "tags",
            "title = \"Tags\"\ndescription = \"Tag cloud\"\nauthor = \"Team\"\nversion = \"1.0\"\n",
        );

        let widget = fixture.spawner().spawn("tags").unwrap().unwrap();

        assert_eq!(widget.slug(), "tags");
        assert_eq!(widget.location(), location.as_path());
        assert_eq!(widget.manifest().title, "Tags");
        assert_eq!(widget.manifest().description, "Tag cloud");
        assert_eq!(widget.manifest().website, "");
        assert!(widget.has(Capabilities::FIELDS));
        assert!(widget.has(Capabilities::RUN));
        assert!(!widget.has(Capabilities::FORM));
    }

    #[test]
    fn test_malformed_manifest_degrades() {
        let fixture = Fixture::new();
        fixture.package("tags", "title = [unterminated");
        let widget = fixture.spawner().spawn("tags").unwrap().unwrap();
        assert_eq!(widget.manifest(), &WidgetManifest::default());
        assert_eq!(widget.summary().to_new_widget().title, "tags");
    }

    #[test]
    fn test_absent_hooks_fall_back() {
        let fixture = Fixture::new();
        fixture.package("html", "");
        let mut widget = fixture.spawner().spawn("html").unwrap().unwrap();

        let mut options = Options::new();
        options.insert("html".into(), json!("<p>hi</p>"));

        assert!(widget.capabilities().is_empty());
        assert!(widget.fields().is_empty());
        assert_eq!(widget.run(&options).unwrap(), RunOutput::Defaults);
        assert_eq!(widget.form(&options).unwrap(), None);
        assert_eq!(widget.save(options.clone()).unwrap(), options);
    }

    #[test]
    fn test_hook_failure_is_tagged() {
        let fixture = Fixture::new();
        fixture.package("broken", "");
        let mut widget = fixture.spawner().spawn("broken").unwrap().unwrap();
        let err = widget.run(&Options::new()).unwrap_err();
        assert!(matches!(err, WidgetError::Hook { ref slug, hook: "run", .. } if slug == "broken"));
        assert!(err.to_string().contains("feed unavailable"));
    }

    #[test]
    fn test_template_resolution() {
        let fixture = Fixture::new();
        let location = fixture.package("tags", "");
        fixture.view("tags", "display.jinja", "b");
        fixture.view("tags", "display.html", "a");
        fixture.view("tags", "displayed.html", "c");

        let widget = fixture.spawner().spawn("tags").unwrap().unwrap();

        assert_eq!(
            widget.template("display").unwrap(),
            location.join(VIEWS_DIR).join("display.html")
        );
        let err = widget.template("form").unwrap_err();
        assert!(matches!(err, WidgetError::TemplateMissing { view: "form", .. }));
    }
}
