use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::LedgerResult;

/// Serialize `value` as JSON with every object's keys sorted.
///
/// Field declaration order and map iteration order never reach the output,
/// so two nodes holding equal content produce identical bytes.
pub fn canonical_json<T: Serialize>(value: &T) -> LedgerResult<Vec<u8>> {
    let sorted = sort_keys(serde_json::to_value(value)?);
    Ok(serde_json::to_vec(&sorted)?)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            // Re-inserting in sorted order keeps the result sorted even when
            // serde_json is built with `preserve_order`.
            let mut out = Map::new();
            for (k, v) in entries {
                out.insert(k, sort_keys(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Lowercase hex SHA-256 digest (64 chars).
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(sha256(bytes))
}
