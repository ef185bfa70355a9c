//! Procedural macros for the Widgetry widget engine.
//!
//! This crate provides:
//!
//! - `#[register_widget("slug")]` - Registers a widget type and derives its
//!   capability set
//!
//! # Register Widget Attribute
//!
//! ```rust,ignore
//! use widgetry::prelude::*;
//!
//! #[derive(Default)]
//! pub struct Tags {
//!     location: PathBuf,
//! }
//!
//! #[register_widget("tags")]
//! impl Widget for Tags {
//!     fn set_location(&mut self, location: &Path) {
//!         self.location = location.to_path_buf();
//!     }
//!
//!     fn fields(&self) -> Vec<FieldSpec> {
//!         vec![FieldSpec::new("limit", "Limit", "required|is_natural_no_zero")]
//!     }
//!
//!     fn run(&mut self, options: &Options) -> HookResult<RunOutput> {
//!         Ok(RunOutput::Defaults)
//!     }
//! }
//! ```
//!
//! The expansion keeps the `impl` block, adds
//! `fn capabilities(&self) -> Capabilities` reporting `FIELDS | RUN`, and
//! appends a link-time registry entry whose factory calls `Tags::default()`.

mod widget;

use proc_macro::TokenStream;
use syn::{ItemImpl, LitStr, parse_macro_input};

/// Registers a widget implementation under a slug.
///
/// Must be placed on an `impl Widget for Type` block where `Type: Default`.
/// The slug is the name of the widget's package directory.
///
/// The capability set is derived from which of `run`, `form`, `save` and
/// `fields` the block defines. A hand-written `capabilities` method is left
/// untouched.
///
/// The expansion refers to `::widgetry_core`, which must be a direct
/// dependency of the crate using the attribute.
#[proc_macro_attribute]
pub fn register_widget(attr: TokenStream, item: TokenStream) -> TokenStream {
    let slug = parse_macro_input!(attr as LitStr);
    let item = parse_macro_input!(item as ItemImpl);

    match widget::register_widget(slug, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
