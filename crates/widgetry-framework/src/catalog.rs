//! Discovery of widget packages on disk.
//!
//! Every package root may contain a widget directory (`widget/` by default)
//! whose immediate subdirectories are widget packages:
//!
//! ```text
//! <root>/widget/<slug>/<slug>.toml      definition file
//! <root>/widget/<slug>/views/display.*  public template
//! <root>/widget/<slug>/views/form.*     edit-form template
//! ```
//!
//! The catalog only maps slugs to directories. Whether a package can actually
//! be spawned is decided later by the [`WidgetSpawner`](crate::WidgetSpawner).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace};

/// Default name of the widget directory inside a package root.
pub const DEFAULT_WIDGET_DIR: &str = "widget";

/// One discovered widget package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Directory name of the package.
    pub slug: String,
    /// Full path of the package directory.
    pub location: PathBuf,
}

/// Slug → location map in discovery order.
///
/// Built once at startup and read-only afterwards. When two roots provide the
/// same slug the later root wins, but the slug keeps the position where it was
/// first discovered.
#[derive(Debug, Clone, Default)]
pub struct WidgetCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl WidgetCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `<root>/widget/` for every root, in order.
    pub fn build<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self::build_in(roots, DEFAULT_WIDGET_DIR)
    }

    /// Scans `<root>/<widget_dir>/` for every root, in order.
    ///
    /// Missing or unreadable widget directories contribute nothing.
    pub fn build_in<I, P>(roots: I, widget_dir: &str) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut catalog = Self::new();

        for root in roots {
            let dir = root.as_ref().join(widget_dir);
            for (slug, location) in scan_widget_dir(&dir) {
                catalog.insert(slug, location);
            }
        }

        info!(widgets = catalog.len(), "Widget catalog built");
        catalog
    }

    /// Adds or replaces a slug's location.
    pub fn insert(&mut self, slug: impl Into<String>, location: impl Into<PathBuf>) {
        let slug = slug.into();
        let location = location.into();

        match self.index.get(&slug) {
            Some(&i) => {
                debug!(
                    slug     = %slug,
                    previous = %self.entries[i].location.display(),
                    location = %location.display(),
                    "Widget overridden by later package root"
                );
                self.entries[i].location = location;
            }
            None => {
                trace!(slug = %slug, location = %location.display(), "Widget discovered");
                self.index.insert(slug.clone(), self.entries.len());
                self.entries.push(CatalogEntry { slug, location });
            }
        }
    }

    /// Location of the package with `slug`.
    pub fn location(&self, slug: &str) -> Option<&Path> {
        self.index
            .get(slug)
            .map(|&i| self.entries[i].location.as_path())
    }

    /// Returns `true` if `slug` was discovered.
    pub fn contains(&self, slug: &str) -> bool {
        self.index.contains_key(slug)
    }

    /// Slugs in discovery order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.slug.as_str())
    }

    /// Entries in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Number of discovered widgets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was discovered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Immediate, non-hidden subdirectories of `dir`, sorted by name.
fn scan_widget_dir(dir: &Path) -> Vec<(String, PathBuf)> {
    let read = match std::fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "No widget directory in package root");
            return Vec::new();
        }
    };

    let mut found: Vec<(String, PathBuf)> = read
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let path = entry.path();
            let name = entry.file_name().into_string().ok()?;
            (!name.starts_with('.') && path.is_dir()).then_some((name, path))
        })
        .collect();

    found.sort_by(|a, b| a.0.cmp(&b.0));
    found
}
