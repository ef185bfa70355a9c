//! Structured result of administrative operations.

use serde::{Deserialize, Serialize};

/// Result value handed back to the admin UI layer.
///
/// Serializes as `{"status": "success"}` or
/// `{"status": "error", "error": ["..."]}`. Expected failures such as form
/// validation end up here instead of in an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// The operation was applied.
    Success,
    /// The operation was rejected; nothing was written.
    Error {
        /// Human-readable messages.
        error: Vec<String>,
    },
}

impl Outcome {
    /// Creates a rejection with the given messages.
    pub fn error<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Error {
            error: messages.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` for [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Messages of a rejection, empty on success.
    pub fn errors(&self) -> &[String] {
        match self {
            Self::Success => &[],
            Self::Error { error } => error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        assert_eq!(
            serde_json::to_value(Outcome::Success).unwrap(),
            json!({"status": "success"})
        );
        assert_eq!(
            serde_json::to_value(Outcome::error(["The Title field is required."])).unwrap(),
            json!({"status": "error", "error": ["The Title field is required."]})
        );
    }

    #[test]
    fn test_accessors() {
        let rejected = Outcome::error(vec![String::from("bad")]);
        assert!(!rejected.is_success());
        assert_eq!(rejected.errors(), ["bad"]);
        assert!(Outcome::Success.errors().is_empty());
    }
}
