//! [`FieldValidator`] implementing CodeIgniter-style form rules.
//!
//! Supported rules:
//!
//! | Rule | Passes when the value |
//! |------|-----------------------|
//! | `required` | is present and not blank |
//! | `min_length[n]`, `max_length[n]`, `exact_length[n]` | has that many characters |
//! | `numeric`, `integer`, `decimal` | is a number of that shape |
//! | `is_natural`, `is_natural_no_zero` | is `0, 1, 2…` / `1, 2, 3…` |
//! | `alpha`, `alpha_numeric`, `alpha_dash` | uses only those ASCII classes |
//! | `valid_email`, `valid_url` | looks like an address / http(s) or ftp URL |
//! | `matches[field]`, `differs[field]` | equals / differs from another field |
//! | `greater_than[n]`, `less_than[n]` | is a number beyond the bound |
//! | `in_list[a,b,c]` | is one of the listed values |
//!
//! Of the prep rules, `trim` trims the value seen by the rules after it;
//! `xss_clean`, `strip_tags` and `htmlspecialchars` are accepted and ignored.
//! Submitted options are never modified. Each field stops at its first failing
//! rule, and an empty field without `required` skips its other rules.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};
use widgetry_core::{FieldRule, FieldValidator, Options, RuleSpec};

const IGNORED_PREP_RULES: [&str; 3] = ["xss_clean", "strip_tags", "htmlspecialchars"];

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9+_\-]+(\.[a-z0-9+_\-]+)*@([a-z0-9\-]+\.)+[a-z]{2,}$")
        .expect("valid email pattern")
});

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?|ftp)://[^\s/$.?#][^\s]*$").expect("valid url pattern")
});

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\-+]?[0-9]*\.?[0-9]+$").expect("valid numeric pattern"));

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\-+]?[0-9]+$").expect("valid integer pattern"));

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\-+]?[0-9]+\.[0-9]+$").expect("valid decimal pattern"));

/// Rule-string validator with CodeIgniter error messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

impl RuleValidator {
    /// Creates a validator.
    pub fn new() -> Self {
        Self
    }
}

impl FieldValidator for RuleValidator {
    fn validate(&self, rules: &[FieldRule], values: &Options) -> Option<Vec<String>> {
        let mut errors = Vec::new();

        for field in rules {
            let mut value = text(values.get(&field.field));

            if value.trim().is_empty() && !field.has_rule("required") {
                continue;
            }

            for rule in &field.rules {
                if rule.name == "trim" {
                    value = value.trim().to_string();
                    continue;
                }
                if IGNORED_PREP_RULES.contains(&rule.name.as_str()) {
                    continue;
                }
                match check(rule, &value, values, rules) {
                    Check::Pass => {}
                    Check::Fail(message) => {
                        errors.push(message.replace("{field}", &field.label));
                        break;
                    }
                    Check::Unknown => {
                        warn!(rule = %rule.name, field = %field.field, "Unknown validation rule, skipping");
                    }
                }
            }
        }

        debug!(fields = rules.len(), errors = errors.len(), "Form rules evaluated");
        (!errors.is_empty()).then_some(errors)
    }
}

enum Check {
    Pass,
    /// Message with `{field}` standing for the field label.
    Fail(String),
    Unknown,
}

/// Submitted value as text; absent and `null` are empty.
fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => if *b { "1" } else { "" }.to_string(),
        Some(other) => other.to_string(),
    }
}

fn check(rule: &RuleSpec, value: &str, values: &Options, rules: &[FieldRule]) -> Check {
    let param = rule.param.as_deref().unwrap_or("");
    let fail = |template: &str| Check::Fail(template.replace("{param}", param));
    let pass_if = |ok: bool, template: &str| if ok { Check::Pass } else { fail(template) };

    match rule.name.as_str() {
        "required" => pass_if(
            !value.trim().is_empty(),
            "The {field} field is required.",
        ),
        "min_length" => pass_if(
            length_bound(param).is_some_and(|n| value.chars().count() >= n),
            "The {field} field must be at least {param} characters in length.",
        ),
        "max_length" => pass_if(
            length_bound(param).is_some_and(|n| value.chars().count() <= n),
            "The {field} field can not exceed {param} characters in length.",
        ),
        "exact_length" => pass_if(
            length_bound(param).is_some_and(|n| value.chars().count() == n),
            "The {field} field must be exactly {param} characters in length.",
        ),
        "numeric" => pass_if(
            NUMERIC.is_match(value),
            "The {field} field must contain only numbers.",
        ),
        "integer" => pass_if(
            INTEGER.is_match(value),
            "The {field} field must contain an integer.",
        ),
        "decimal" => pass_if(
            DECIMAL.is_match(value),
            "The {field} field must contain a decimal number.",
        ),
        "is_natural" => pass_if(
            !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()),
            "The {field} field must contain only positive numbers.",
        ),
        "is_natural_no_zero" => pass_if(
            !value.is_empty()
                && value.bytes().all(|b| b.is_ascii_digit())
                && value.bytes().any(|b| b != b'0'),
            "The {field} field must contain a number greater than zero.",
        ),
        "alpha" => pass_if(
            !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic()),
            "The {field} field may only contain alphabetical characters.",
        ),
        "alpha_numeric" => pass_if(
            !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric()),
            "The {field} field may only contain alpha-numeric characters.",
        ),
        "alpha_dash" => pass_if(
            !value.is_empty()
                && value
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
            "The {field} field may only contain alpha-numeric characters, underscores, and dashes.",
        ),
        "valid_email" => pass_if(
            EMAIL.is_match(value),
            "The {field} field must contain a valid email address.",
        ),
        "valid_url" => pass_if(
            URL.is_match(value),
            "The {field} field must contain a valid URL.",
        ),
        "matches" => {
            let other = text(values.get(param));
            let message = format!(
                "The {{field}} field does not match the {} field.",
                label_of(param, rules)
            );
            pass_if(value == other, &message)
        }
        "differs" => {
            let other = text(values.get(param));
            let message = format!(
                "The {{field}} field must differ from the {} field.",
                label_of(param, rules)
            );
            pass_if(value != other, &message)
        }
        "greater_than" => pass_if(
            compare(value, param).is_some_and(|(v, bound)| v > bound),
            "The {field} field must contain a number greater than {param}.",
        ),
        "less_than" => pass_if(
            compare(value, param).is_some_and(|(v, bound)| v < bound),
            "The {field} field must contain a number less than {param}.",
        ),
        "in_list" => pass_if(
            param.split(',').any(|item| item.trim() == value),
            "The {field} field must be one of: {param}.",
        ),
        _ => Check::Unknown,
    }
}

fn length_bound(param: &str) -> Option<usize> {
    param.trim().parse().ok()
}

fn compare(value: &str, param: &str) -> Option<(f64, f64)> {
    if !NUMERIC.is_match(value) {
        return None;
    }
    Some((value.parse().ok()?, param.trim().parse().ok()?))
}

/// Label of another field, falling back to its name.
fn label_of<'a>(field: &'a str, rules: &'a [FieldRule]) -> &'a str {
    rules
        .iter()
        .find(|r| r.field == field)
        .map_or(field, |r| r.label.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use widgetry_core::FieldSpec;

    fn rules(specs: &[(&str, &str, &str)]) -> Vec<FieldRule> {
        specs
            .iter()
            .map(|(field, label, rules)| FieldSpec::new(*field, *label, *rules).to_rule())
            .collect()
    }

    fn values(value: Value) -> Options {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn errors(specs: &[(&str, &str, &str)], input: Value) -> Vec<String> {
        RuleValidator
            .validate(&rules(specs), &values(input))
            .unwrap_or_default()
    }

    #[test]
    fn test_all_pass_is_none() {
        let result = RuleValidator.validate(
            &rules(&[("limit", "Limit", "trim|required|is_natural_no_zero|less_than[50]")]),
            &values(json!({"limit": "10"})),
        );
        assert_eq!(result, None);
    }

    #[test]
    fn test_required_and_first_failure_only() {
        assert_eq!(
            errors(&[("title", "Title", "required|min_length[3]")], json!({"title": "  "})),
            ["The Title field is required."]
        );
        assert_eq!(
            errors(&[("title", "Title", "required|min_length[3]|alpha")], json!({"title": "a1"})),
            ["The Title field must be at least 3 characters in length."]
        );
    }

    #[test]
    fn test_optional_empty_field_is_skipped() {
        assert!(errors(&[("email", "Email", "valid_email")], json!({})).is_empty());
        assert!(errors(&[("email", "Email", "valid_email")], json!({"email": ""})).is_empty());
        assert_eq!(
            errors(&[("email", "Email", "valid_email")], json!({"email": "nope"})),
            ["The Email field must contain a valid email address."]
        );
    }

    #[test]
    fn test_numeric_rules() {
        let spec = [("n", "Count", "numeric")];
        assert!(errors(&spec, json!({"n": "-1.5"})).is_empty());
        assert!(errors(&spec, json!({"n": 7})).is_empty());
        assert!(!errors(&spec, json!({"n": "1e3"})).is_empty());

        assert!(errors(&[("n", "N", "integer")], json!({"n": "+42"})).is_empty());
        assert!(!errors(&[("n", "N", "decimal")], json!({"n": "42"})).is_empty());
        assert!(!errors(&[("n", "N", "is_natural")], json!({"n": "-1"})).is_empty());
        assert_eq!(
            errors(&[("n", "N", "is_natural_no_zero")], json!({"n": "000"})),
            ["The N field must contain a number greater than zero."]
        );
        assert_eq!(
            errors(&[("n", "N", "greater_than[5]")], json!({"n": "5"})),
            ["The N field must contain a number greater than 5."]
        );
    }

    #[test]
    fn test_cross_field_rules() {
        let spec = [
            ("password", "Password", "required"),
            ("confirm", "Confirmation", "matches[password]"),
        ];
        assert_eq!(
            errors(&spec, json!({"password": "a", "confirm": "b"})),
            ["The Confirmation field does not match the Password field."]
        );
        assert!(errors(&spec, json!({"password": "a", "confirm": "a"})).is_empty());
    }

    #[test]
    fn test_lists_and_character_classes() {
        assert_eq!(
            errors(&[("order", "Order", "in_list[asc,desc]")], json!({"order": "up"})),
            ["The Order field must be one of: asc,desc."]
        );
        assert!(errors(&[("slug", "Slug", "alpha_dash")], json!({"slug": "side-bar_1"})).is_empty());
        assert!(!errors(&[("slug", "Slug", "alpha_dash")], json!({"slug": "side bar"})).is_empty());
        assert!(errors(&[("u", "URL", "valid_url")], json!({"u": "https://example.org/x"})).is_empty());
    }

    #[test]
    fn test_trim_applies_to_later_rules() {
        assert!(errors(&[("n", "N", "trim|is_natural")], json!({"n": " 12 "})).is_empty());
        assert!(!errors(&[("n", "N", "is_natural|trim")], json!({"n": " 12 "})).is_empty());
    }

    #[test]
    fn test_unknown_rule_is_skipped() {
        assert!(errors(&[("x", "X", "callback_custom|max_length[2]")], json!({"x": "ab"})).is_empty());
        assert!(!errors(&[("x", "X", "callback_custom|max_length[2]")], json!({"x": "abc"})).is_empty());
    }
}
