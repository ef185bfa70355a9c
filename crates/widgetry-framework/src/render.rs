//! Display and form rendering of spawned widgets.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};
use widgetry_core::{FieldSpec, OPTIONS_KEY, Options, RunOutput, ViewRenderer, WidgetResult};

use crate::spawner::SpawnedWidget;

/// View name of the public template.
pub const DISPLAY_VIEW: &str = "display";

/// View name of the edit-form template.
pub const FORM_VIEW: &str = "form";

/// Runs widget hooks and hands the resulting context to the view renderer.
#[derive(Clone)]
pub struct RenderPipeline {
    views: Arc<dyn ViewRenderer>,
}

impl RenderPipeline {
    /// Wraps a view renderer collaborator.
    pub fn new(views: Arc<dyn ViewRenderer>) -> Self {
        Self { views }
    }

    /// Renders the public output of `widget`.
    ///
    /// Returns `Ok(None)` when the display hook suppresses output. The data
    /// context always carries the instance options under `options`,
    /// overwriting any value the hook put there.
    pub fn display(&self, widget: &mut SpawnedWidget, options: &Options) -> WidgetResult<Option<String>> {
        let Some(mut data) = normalize_display_data(widget.run(options)?) else {
            debug!(slug = widget.slug(), "Widget suppressed its output");
            return Ok(None);
        };
        data.insert(OPTIONS_KEY.to_string(), Value::Object(options.clone()));

        self.render_view(widget, DISPLAY_VIEW, &data).map(Some)
    }

    /// Renders the edit form of `widget`.
    ///
    /// Each declared field is pre-filled from `submitted`, then `saved`, then
    /// the empty string. Widgets without declared fields have no form and
    /// render to an empty string.
    pub fn form(&self, widget: &mut SpawnedWidget, saved: &Options, submitted: &Options) -> WidgetResult<String> {
        let fields = widget.fields();
        if fields.is_empty() {
            trace!(slug = widget.slug(), "Widget declares no fields, no form");
            return Ok(String::new());
        }

        let values = form_values(&fields, saved, submitted);
        let mut data = widget.form(&values)?.unwrap_or_default();
        data.entry(OPTIONS_KEY).or_insert(Value::Object(values));

        self.render_view(widget, FORM_VIEW, &data)
    }

    fn render_view(&self, widget: &SpawnedWidget, view: &'static str, data: &Options) -> WidgetResult<String> {
        let template = widget.template(view)?;
        trace!(slug = widget.slug(), template = %template.display(), "Rendering widget view");
        Ok(self.views.render(&template, data)?)
    }
}

/// Coerces a display hook result into a data map.
///
/// `None` means the widget asked for no output. Maps are used as they are,
/// sequences become maps keyed `"0"`, `"1"`, … and any other scalar ends up
/// under `"0"`.
pub fn normalize_display_data(output: RunOutput) -> Option<Options> {
    let value = match output {
        RunOutput::Suppress => return None,
        RunOutput::Defaults => return Some(Options::new()),
        RunOutput::Data(value) => value,
    };

    match value {
        Value::Bool(false) => None,
        Value::Bool(true) | Value::Null => Some(Options::new()),
        Value::Object(map) => Some(map),
        Value::Array(items) => Some(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (i.to_string(), item))
                .collect(),
        ),
        scalar => {
            let mut map = Options::new();
            map.insert("0".to_string(), scalar);
            Some(map)
        }
    }
}

/// One entry per declared field: submitted value, else saved, else `""`.
pub fn form_values(fields: &[FieldSpec], saved: &Options, submitted: &Options) -> Options {
    fields
        .iter()
        .map(|spec| {
            let value = submitted
                .get(&spec.field)
                .or_else(|| saved.get(&spec.field))
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()));
            (spec.field.clone(), value)
        })
        .collect()
}
