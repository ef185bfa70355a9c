//! [`ViewRenderer`] backed by minijinja.

use std::path::Path;

use minijinja::Environment;
use serde_json::Value;
use tracing::trace;
use widgetry_core::{Options, ViewError, ViewRenderer, ViewResult};

/// Renders widget templates as Jinja templates.
///
/// Templates are read from disk on every call. Output is HTML-escaped when the
/// template file name ends in `.html`, `.htm` or `.xml`; use the `safe` filter
/// for trusted markup.
#[derive(Debug, Clone, Default)]
pub struct JinjaViewRenderer {
    globals: Options,
}

impl JinjaViewRenderer {
    /// Creates a renderer without globals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value visible to every template.
    pub fn with_global(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.globals.insert(name.into(), value.into());
        self
    }
}

impl ViewRenderer for JinjaViewRenderer {
    fn render(&self, template: &Path, context: &Options) -> ViewResult<String> {
        let source = std::fs::read_to_string(template).map_err(|source| ViewError::Io {
            path: template.to_path_buf(),
            source,
        })?;
        let name = template
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let render_error = |e: minijinja::Error| ViewError::Render {
            path: template.to_path_buf(),
            reason: e.to_string(),
        };

        let mut env = Environment::new();
        for (key, value) in &self.globals {
            env.add_global(key.clone(), minijinja::Value::from_serialize(value));
        }
        env.add_template(&name, &source).map_err(render_error)?;

        trace!(template = %template.display(), "Rendering template");
        env.get_template(&name)
            .and_then(|tmpl| tmpl.render(minijinja::Value::from_serialize(context)))
            .map_err(render_error)
    }
}
