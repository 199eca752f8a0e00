use std::collections::BTreeMap;
use std::iter::FromIterator;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ErrorInfo, TvsError};

fn serde_error(code: &str, err: impl ToString) -> TvsError {
    TvsError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => {
            let canonical_values = values.into_iter().map(canonicalize).collect();
            Value::Array(canonical_values)
        }
        other => other,
    }
}

/// Serializes a value into canonical JSON bytes with deterministic key ordering.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, TvsError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json_serialize", err))?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical).map_err(|err| serde_error("json_write", err))?;
    Ok(bytes)
}

/// Deserializes a value from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, TvsError> {
    serde_json::from_slice(data).map_err(|err| serde_error("json_deserialize", err))
}

/// Reads a JSON document from disk.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, TvsError> {
    let bytes = std::fs::read(path).map_err(|err| {
        TvsError::Serde(
            ErrorInfo::new("file_read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    from_json_slice(&bytes).map_err(|err| match err {
        TvsError::Serde(info) => {
            TvsError::Serde(info.with_context("path", path.display().to_string()))
        }
        other => other,
    })
}
