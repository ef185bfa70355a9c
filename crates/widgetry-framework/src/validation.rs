//! Adapter between a widget's declared fields and the field validator.

use std::sync::Arc;

use tracing::debug;
use widgetry_core::{FieldRule, FieldValidator, Options};

use crate::spawner::SpawnedWidget;

/// Validates submitted options against a widget's field declarations.
#[derive(Clone)]
pub struct ValidationAdapter {
    validator: Arc<dyn FieldValidator>,
}

impl ValidationAdapter {
    /// Wraps a validator collaborator.
    pub fn new(validator: Arc<dyn FieldValidator>) -> Self {
        Self { validator }
    }

    /// Error messages for `submitted`, empty when the input is acceptable.
    ///
    /// Widgets without declared fields accept anything and the validator is
    /// not consulted.
    pub fn errors(&self, widget: &SpawnedWidget, submitted: &Options) -> Vec<String> {
        let rules: Vec<FieldRule> = widget.fields().iter().map(|f| f.to_rule()).collect();
        if rules.is_empty() {
            return Vec::new();
        }

        let errors = self
            .validator
            .validate(&rules, submitted)
            .unwrap_or_default();

        debug!(
            slug   = widget.slug(),
            fields = rules.len(),
            errors = errors.len(),
            "Widget options validated"
        );
        errors
    }
}
