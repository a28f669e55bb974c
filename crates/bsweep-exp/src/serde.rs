//! Serialization of configs and plans.
//!
//! Config hashes and `bsweep plan --format json` both go through
//! [`to_canonical_json_bytes`], so the same sweep always produces the same
//! bytes regardless of field order in the YAML it was loaded from.

use bsweep_core::errors::{ErrorInfo, SweepError};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

fn serde_error(code: &str, err: impl ToString) -> SweepError {
    SweepError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Rebuilds every object with its keys in lexicographic order.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        scalar => scalar,
    }
}

/// Compact JSON with sorted keys; the input of the config hash and the
/// JSON plan output.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SweepError> {
    let tree = serde_json::to_value(value).map_err(|err| serde_error("json_serialize", err))?;
    serde_json::to_vec(&sort_keys(tree)).map_err(|err| serde_error("json_write", err))
}

/// YAML rendering of a sweep plan.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, SweepError> {
    serde_yaml::to_string(value).map_err(|err| serde_error("yaml_serialize", err))
}

/// Parses a sweep config document. Syntax and type errors surface as
/// [`SweepError::Config`] with code `yaml_deserialize`.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, SweepError> {
    serde_yaml::from_slice(data)
        .map_err(|err| SweepError::Config(ErrorInfo::new("yaml_deserialize", err.to_string())))
}
