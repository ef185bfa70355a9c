//! Widget instance options and their storage codec.
//!
//! Instance configuration travels through the engine as an [`Options`] map and
//! is persisted as an opaque text blob. The [`OptionCodec`] trait is the only
//! place that knows the blob format, so the storage representation can change
//! without touching callers.

use serde_json::{Map, Value};
use tracing::warn;

/// Flat, string-keyed configuration of a widget instance.
pub type Options = Map<String, Value>;

/// Reserved key under which the original options are exposed to templates.
pub const OPTIONS_KEY: &str = "options";

// =============================================================================
// OptionCodec
// =============================================================================

/// Converts instance options to and from their stored representation.
///
/// Implementations must round-trip: `decode(&encode(m)) == m` for every flat
/// map of scalars and arrays. Decoding never fails; a blob that cannot be read
/// yields an empty map so corrupted rows cannot break rendering.
pub trait OptionCodec: Send + Sync {
    /// Serializes options into a storable blob.
    fn encode(&self, options: &Options) -> String;

    /// Deserializes a stored blob, falling back to an empty map.
    fn decode(&self, blob: &str) -> Options;
}

/// JSON object encoding of [`Options`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOptionCodec;

impl OptionCodec for JsonOptionCodec {
    fn encode(&self, options: &Options) -> String {
        // A map of JSON values always serializes.
        Value::Object(options.clone()).to_string()
    }

    fn decode(&self, blob: &str) -> Options {
        if blob.trim().is_empty() {
            return Options::new();
        }

        match serde_json::from_str::<Value>(blob) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                warn!(kind = value_kind(&other), "Stored options are not a map, using empty options");
                Options::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to decode stored options, using empty options");
                Options::new()
            }
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
