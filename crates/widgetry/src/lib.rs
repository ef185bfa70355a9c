//! # Widgetry
//!
//! A pluggable widget engine: small content units ("widgets") that live in
//! package directories, are installed into a store, placed into named areas
//! with per-instance options, edited through validated forms and rendered
//! through templates.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌─────────────────────────────┐
//! │ WidgetRuntime│──▶│ WidgetManager │──▶│ WidgetSpawner               │
//! │ (config,     │   │ (facade)      │   │  catalog: slug → package dir│
//! │  logging)    │   │               │   │  registry: slug → impl      │
//! └──────────────┘   └───────┬───────┘   └─────────────────────────────┘
//!                            │
//!             ┌──────────────┼──────────────┐
//!             ▼              ▼              ▼
//!        WidgetStore    ViewRenderer   FieldValidator
//! ```
//!
//! - **Catalog**: scans `<root>/widget/<slug>/` in every package root; later
//!   roots override earlier ones
//! - **Registry**: implementations registered with `#[register_widget]`
//! - **Manager**: areas, installed widgets and instances; display and form
//!   rendering; validation and the save hook
//! - **Collaborators**: storage, templating and validation are traits; the
//!   runtime ships in-memory, minijinja and rule-based defaults
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use widgetry::prelude::*;
//!
//! #[derive(Default)]
//! pub struct Tags;
//!
//! #[register_widget("tags")]
//! impl Widget for Tags {
//!     fn fields(&self) -> Vec<FieldSpec> {
//!         vec![FieldSpec::new("limit", "Limit", "trim|required|is_natural_no_zero")]
//!     }
//!
//!     fn run(&mut self, options: &Options) -> HookResult<RunOutput> {
//!         Ok(RunOutput::Data(serde_json::json!({ "tags": ["rust", "web"] })))
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let runtime = WidgetRuntime::builder().package_path("addons").build()?;
//!     for rendered in runtime.manager().render_area("sidebar")? {
//!         println!("{}", rendered.html);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default): read `widgetry.toml`
//! - `yaml-config`: read `widgetry.yaml`
//! - `json-log`: JSON log output

pub use widgetry_core as core;
pub use widgetry_framework as framework;
pub use widgetry_runtime as runtime;

pub use widgetry_macros::register_widget;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use widgetry::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use widgetry_runtime::{RuntimeBuilder, WidgetRuntime, WidgetryConfig};

    // Widget contract - for implementing widgets
    pub use widgetry_core::{
        Capabilities, FieldSpec, HookResult, OPTIONS_KEY, Options, RunOutput, Widget,
    };
    pub use widgetry_macros::register_widget;

    // Engine facade and its results
    pub use widgetry_core::{NewArea, NewWidget, Outcome, WidgetError, WidgetResult};
    pub use widgetry_framework::{RenderedInstance, WidgetManager};

    // Collaborator traits for custom implementations
    pub use widgetry_core::{FieldValidator, OptionCodec, ViewRenderer, WidgetStore};
}
