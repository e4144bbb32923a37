//! Cache Key Module
//!
//! Deterministic cache key derivation from request parameters.

use std::collections::BTreeMap;

use serde_json::Value;

// == Build Key ==
/// Derives a canonical cache key from a parameter object.
///
/// Top-level `null` fields are dropped and the remaining field names are
/// ordered lexicographically before serialization, so two parameter sets with
/// the same effective values always map to the same key regardless of the
/// order they were built in. Non-object values are serialized as-is.
pub fn build_key(params: &Value) -> String {
    match params {
        Value::Object(map) => {
            let sorted: BTreeMap<&str, &Value> = map
                .iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(name, value)| (name.as_str(), value))
                .collect();

            // BTreeMap<&str, &Value> always serializes, keys are strings
            serde_json::to_string(&sorted).unwrap_or_default()
        }
        other => other.to_string(),
    }
}
