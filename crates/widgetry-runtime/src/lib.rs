//! Widgetry Runtime - configuration, logging and default collaborators for
//! the Widgetry widget engine.
//!
//! This crate provides:
//! - Layered configuration (`widgetry.toml`, profiles, `WIDGETRY_*` env vars)
//! - Logging setup on top of `tracing-subscriber`
//! - [`MemoryStore`], an in-process [`WidgetStore`](widgetry_core::WidgetStore)
//! - [`JinjaViewRenderer`], a minijinja [`ViewRenderer`](widgetry_core::ViewRenderer)
//! - [`RuleValidator`], a CodeIgniter-style [`FieldValidator`](widgetry_core::FieldValidator)
//! - [`WidgetRuntime`], which wires all of the above into a
//!   [`WidgetManager`](widgetry_framework::WidgetManager)
//!
//! ```ignore
//! use widgetry_runtime::WidgetRuntime;
//!
//! fn main() -> anyhow::Result<()> {
//!     let runtime = WidgetRuntime::builder().build()?;
//!     let manager = runtime.manager();
//!
//!     if let Some(html) = manager.render_display("tags", &Default::default())? {
//!         println!("{html}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod store;
pub mod validator;
pub mod view;

pub use config::{ConfigError, ConfigLoader, ConfigResult, WidgetryConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{RuntimeBuilder, WidgetRuntime};
pub use store::MemoryStore;
pub use validator::RuleValidator;
pub use view::JinjaViewRenderer;

/// Widgets log through these; hosts can reach them without extra dependencies.
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for widget implementations.
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, instrument, span, trace, warn};
}
