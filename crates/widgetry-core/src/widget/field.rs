//! Declared form fields and their validation rules.

use serde::{Deserialize, Serialize};

/// A form field declared by a widget.
///
/// `rules` uses the pipe-separated rule syntax understood by the validation
/// collaborator, e.g. `"trim|required|max_length[40]"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Option key the field writes to.
    pub field: String,
    /// Human-readable label used in error messages.
    #[serde(default)]
    pub label: String,
    /// Pipe-separated rule list.
    #[serde(default)]
    pub rules: String,
}

impl FieldSpec {
    /// Creates a field with the given key, label and rule string.
    pub fn new(field: impl Into<String>, label: impl Into<String>, rules: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
            rules: rules.into(),
        }
    }

    /// Returns the label, or the field key when no label was declared.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.field
        } else {
            &self.label
        }
    }

    /// Translates this declaration into a rule set for the validator.
    pub fn to_rule(&self) -> FieldRule {
        FieldRule {
            field: self.field.clone(),
            label: self.display_label().to_string(),
            rules: parse_rules(&self.rules),
        }
    }
}

/// One parsed rule, e.g. `max_length[40]` → `{ name: "max_length", param: Some("40") }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Rule name.
    pub name: String,
    /// Bracketed parameter, if any.
    pub param: Option<String>,
}

impl RuleSpec {
    /// Creates a rule without a parameter.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param: None,
        }
    }

    /// Creates a rule with a parameter.
    pub fn with_param(name: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param: Some(param.into()),
        }
    }
}

/// The validator-facing form of a [`FieldSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Option key being validated.
    pub field: String,
    /// Label used in messages.
    pub label: String,
    /// Parsed rules, in declaration order.
    pub rules: Vec<RuleSpec>,
}

impl FieldRule {
    /// Returns `true` if the rule list contains `name`.
    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.name == name)
    }
}

/// Splits a rule string on `|`, ignoring pipes inside `[...]` parameters.
pub fn parse_rules(rules: &str) -> Vec<RuleSpec> {
    let mut parsed = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, ch) in rules.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                push_rule(&mut parsed, &rules[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    push_rule(&mut parsed, &rules[start..]);

    parsed
}

fn push_rule(out: &mut Vec<RuleSpec>, raw: &str) {
    let raw = raw.trim();
    if raw.is_empty() {
        return;
    }

    match raw.find('[') {
        Some(open) if raw.ends_with(']') => {
            out.push(RuleSpec::with_param(&raw[..open], &raw[open + 1..raw.len() - 1]));
        }
        _ => out.push(RuleSpec::named(raw)),
    }
}
