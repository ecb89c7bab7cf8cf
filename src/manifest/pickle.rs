use std::io::Read;

use serde_pickle::{DeOptions, HashableValue, Value};

use super::types::RawRecord;
use super::DecodedRecord;
use crate::error::{Result, ViewerError};

/// Python 2 scanners pickle `str` keys and values as raw bytes. Decode them
/// as UTF-8 with replacement so one odd filename cannot sink the manifest.
fn lossy_text(value: Value) -> Value {
    match value {
        Value::Bytes(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        Value::List(items) => Value::List(items.into_iter().map(lossy_text).collect()),
        Value::Tuple(items) => Value::Tuple(items.into_iter().map(lossy_text).collect()),
        Value::Set(items) | Value::FrozenSet(items) => Value::List(
            items
                .into_iter()
                .map(|item| lossy_text(item.into_value()))
                .collect(),
        ),
        Value::Dict(map) => Value::Dict(
            map.into_iter()
                .map(|(k, v)| (lossy_key(k), lossy_text(v)))
                .collect(),
        ),
        other => other,
    }
}

fn lossy_key(key: HashableValue) -> HashableValue {
    match key {
        HashableValue::Bytes(bytes) => {
            HashableValue::String(String::from_utf8_lossy(&bytes).into_owned())
        }
        other => other,
    }
}

/// Read the pickled path → record mapping. Each record is decoded on its
/// own; a malformed one comes back as `Err` with the reason.
pub(crate) fn read_records<R: Read>(reader: R) -> Result<Vec<(String, DecodedRecord)>> {
    let value = serde_pickle::value_from_reader(reader, DeOptions::new())
        .map_err(|e| ViewerError::ManifestMissing(format!("invalid pickle manifest: {}", e)))?;
    let Value::Dict(map) = value else {
        return Err(ViewerError::ManifestMissing(
            "pickle manifest is not a mapping".to_string(),
        ));
    };

    let mut records = Vec::with_capacity(map.len());
    for (key, record) in map {
        let key = match lossy_key(key) {
            HashableValue::String(key) => key,
            other => {
                tracing::warn!("Skipping manifest record with non-text key {:?}", other);
                continue;
            }
        };
        let decoded = serde_pickle::from_value::<RawRecord>(lossy_text(record))
            .map_err(|e| e.to_string());
        records.push((key, decoded));
    }
    Ok(records)
}
