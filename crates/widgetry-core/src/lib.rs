//! # Widgetry Core
//!
//! Foundation types of the Widgetry widget engine.
//!
//! ## Contents
//!
//! - **Widget contract**: the [`Widget`] trait, its [`Capabilities`] bit-set,
//!   declared [`FieldSpec`]s and the [`RunOutput`] of the display hook
//! - **Registration**: [`WidgetDescriptor`] and the link-time
//!   [`WIDGET_REGISTRY`] filled by `#[register_widget]`
//! - **Options**: the [`Options`] map and its storage [`OptionCodec`]
//! - **Records**: areas, installed widgets and instances as exchanged with
//!   storage
//! - **Collaborators**: [`WidgetStore`], [`ViewRenderer`], [`FieldValidator`]
//! - **Errors**: [`WidgetError`] and the per-collaborator error types
//!
//! The engine itself (catalog, spawner, render pipeline, manager) lives in
//! `widgetry-framework`.

pub mod collaborator;
pub mod error;
pub mod options;
pub mod outcome;
pub mod record;
pub mod widget;

pub use collaborator::{FieldValidator, ViewRenderer, WidgetStore};
pub use error::{
    BoxError, HookResult, StoreError, StoreResult, ViewError, ViewResult, WidgetError,
    WidgetResult,
};
pub use options::{JsonOptionCodec, OPTIONS_KEY, OptionCodec, Options};
pub use outcome::Outcome;
pub use record::{
    Area, InstalledWidget, Instance, InstanceRecord, InstanceUpdate, NewArea, NewInstance,
    NewWidget, RecordKey, WidgetManifest, WidgetSummary,
};
pub use widget::{
    Capabilities, FieldRule, FieldSpec, RuleSpec, RunOutput, WIDGET_API_VERSION, WIDGET_REGISTRY,
    Widget, WidgetDescriptor, parse_rules,
};

// Used by `#[register_widget]` expansions.
#[doc(hidden)]
pub use linkme;
