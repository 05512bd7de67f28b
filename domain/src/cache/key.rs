//! Result-cache fingerprints.
//!
//! A key is `"{tool}:{hex}"` where `hex` is the first 8 bytes of
//! `SHA-256("{tool}:{canonical_json(arguments)}")`. Canonical JSON sorts
//! object keys at every depth, so argument maps that differ only in
//! insertion order fingerprint identically.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

const FINGERPRINT_BYTES: usize = 8;

/// Deterministic identity of a `(tool, arguments)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn fingerprint(tool: &str, arguments: &HashMap<String, Value>) -> Self {
        let object: Map<String, Value> = arguments
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self::fingerprint_value(tool, &Value::Object(object))
    }

    /// Fingerprint arbitrary JSON arguments.
    pub fn fingerprint_value(tool: &str, arguments: &Value) -> Self {
        let canonical = canonicalize(arguments);
        // Serializing a Value cannot fail; fall back to Display just in case.
        let json = serde_json::to_string(&canonical).unwrap_or_else(|_| canonical.to_string());

        let mut hasher = Sha256::new();
        hasher.update(tool.as_bytes());
        hasher.update(b":");
        hasher.update(json.as_bytes());
        let digest = hasher.finalize();

        CacheKey(format!(
            "{}:{}",
            tool,
            hex::encode(&digest[..FINGERPRINT_BYTES])
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tool name portion of the key.
    pub fn tool(&self) -> &str {
        self.0
            .rsplit_once(':')
            .map(|(tool, _)| tool)
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rebuild `value` with every object's keys in sorted order.
///
/// `serde_json::Map` preserves insertion order when `preserve_order` is
/// enabled anywhere in the dependency graph, so ordering is done explicitly.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let sorted: Map<String, Value> = keys
                .into_iter()
                .map(|k| (k.clone(), canonicalize(&map[k])))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
