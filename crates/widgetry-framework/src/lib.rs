//! # Widgetry Framework
//!
//! The widget engine: discovery, spawning, validation and rendering of
//! widgets, plus the [`WidgetManager`] facade over areas and instances.
//!
//! ## Modules
//!
//! - [`catalog`] - Scans package roots for widget directories
//! - [`registry`] - Slug → implementation lookup fed by `#[register_widget]`
//! - [`spawner`] - Instantiates widgets and gates their hooks on capabilities
//! - [`validation`] - Feeds declared fields to the field validator
//! - [`render`] - Display and form rendering through the view renderer
//! - [`manager`] - The facade applications use
//!
//! Storage, templating and form validation are collaborators passed in as
//! trait objects; `widgetry-runtime` provides default implementations.

pub mod catalog;
pub mod manager;
pub mod registry;
pub mod render;
pub mod spawner;
pub mod validation;

#[cfg(test)]
mod testing;

pub use catalog::{CatalogEntry, DEFAULT_WIDGET_DIR, WidgetCatalog};
pub use manager::{RenderedInstance, WidgetManager};
pub use registry::WidgetRegistry;
pub use render::{DISPLAY_VIEW, FORM_VIEW, RenderPipeline, form_values, normalize_display_data};
pub use spawner::{DEFINITION_EXTENSION, SpawnedWidget, VIEWS_DIR, WidgetSpawner, definition_path};
pub use validation::ValidationAdapter;
