//! The widget implementation contract.
//!
//! # Architecture
//!
//! A widget is a plain Rust type implementing [`Widget`]. Every hook is
//! optional; which ones a type actually overrides is reported through
//! [`Widget::capabilities`], which the `#[register_widget]` attribute fills in
//! from the methods present in the `impl` block.
//!
//! A [`WidgetDescriptor`] is the *static, `Copy` handle* to a widget type: a
//! slug plus a factory function pointer. Descriptors are collected at link time
//! in [`WIDGET_REGISTRY`], so no central list of widget types is maintained.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use widgetry::prelude::*;
//!
//! #[derive(Default)]
//! pub struct Newest;
//!
//! #[register_widget("newest")]
//! impl Widget for Newest {
//!     fn run(&mut self, options: &Options) -> HookResult<RunOutput> {
//!         Ok(RunOutput::Defaults)
//!     }
//! }
//! ```

pub mod capability;
pub mod descriptor;
pub mod field;

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::HookResult;
use crate::options::{OPTIONS_KEY, Options};

pub use capability::Capabilities;
pub use descriptor::{WIDGET_API_VERSION, WIDGET_REGISTRY, WidgetDescriptor};
pub use field::{FieldRule, FieldSpec, RuleSpec, parse_rules};

// ─── RunOutput ───────────────────────────────────────────────────────────────

/// What a widget's display hook asks the engine to render.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutput {
    /// Emit nothing for this instance.
    Suppress,
    /// Render the display template with an empty data context.
    Defaults,
    /// Render with this data. Non-map values are coerced into a map.
    Data(Value),
}

impl RunOutput {
    /// Builds display data from any serializable value.
    ///
    /// Structs become maps of their serialized fields.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> HookResult<Self> {
        Ok(Self::Data(serde_json::to_value(value)?))
    }
}

impl From<bool> for RunOutput {
    fn from(value: bool) -> Self {
        if value { Self::Defaults } else { Self::Suppress }
    }
}

impl From<Options> for RunOutput {
    fn from(data: Options) -> Self {
        Self::Data(Value::Object(data))
    }
}

impl From<Value> for RunOutput {
    fn from(value: Value) -> Self {
        Self::Data(value)
    }
}

// ─── Widget ──────────────────────────────────────────────────────────────────

/// A pluggable content unit with optional display and edit behaviour.
///
/// One value is created per engine operation and dropped afterwards, so hooks
/// may keep per-call state in `self` without synchronisation.
pub trait Widget: 'static {
    /// Receives the widget's package directory before any hook runs.
    fn set_location(&mut self, _location: &Path) {}

    /// Hooks this type implements.
    ///
    /// Generated by `#[register_widget]`; write it by hand only when
    /// implementing the trait without the attribute.
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }

    /// Produces the data context for the public display template.
    fn run(&mut self, _options: &Options) -> HookResult<RunOutput> {
        Ok(RunOutput::Defaults)
    }

    /// Produces the data context for the edit-form template.
    ///
    /// `options` holds one entry per declared field.
    fn form(&mut self, options: &Options) -> HookResult<Options> {
        let mut data = Options::new();
        data.insert(OPTIONS_KEY.to_string(), Value::Object(options.clone()));
        Ok(data)
    }

    /// Transforms submitted options before they are stored.
    fn save(&mut self, options: Options) -> HookResult<Options> {
        Ok(options)
    }

    /// Declares the editable fields and their validation rules.
    fn fields(&self) -> Vec<FieldSpec> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Latest {
        count: u32,
        heading: &'static str,
    }

    #[test]
    fn test_bool_conversion() {
        assert_eq!(RunOutput::from(false), RunOutput::Suppress);
        assert_eq!(RunOutput::from(true), RunOutput::Defaults);
    }

    #[test]
    fn test_from_serialize_struct() {
        let out = RunOutput::from_serialize(&Latest {
            count: 3,
            heading: "Newest",
        })
        .unwrap();
        assert_eq!(out, RunOutput::Data(json!({"count": 3, "heading": "Newest"})));
    }

    #[test]
    fn test_default_hooks() {
        struct Bare;
        impl Widget for Bare {}

        let mut widget = Bare;
        let mut options = Options::new();
        options.insert("limit".into(), json!(5));

        assert!(widget.capabilities().is_empty());
        assert_eq!(widget.run(&options).unwrap(), RunOutput::Defaults);
        assert_eq!(widget.save(options.clone()).unwrap(), options);
        assert_eq!(
            widget.form(&options).unwrap().get(OPTIONS_KEY),
            Some(&json!({"limit": 5}))
        );
        assert!(widget.fields().is_empty());
    }
}
