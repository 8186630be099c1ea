//! SHA-256 digests over the exact bytes handed to the pinning service.
//!
//! JSON documents are serialized once, canonically, and the same buffer is both
//! pinned and hashed. Recording a hash of a different serialization than the one
//! stored on IPFS breaks on-chain verification of the metadata.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// 32-byte SHA-256 digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest(pub [u8; 32]);

impl ContentDigest {
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    /// `0x`-prefixed lowercase hex (66 characters)
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

pub fn digest(bytes: &[u8]) -> ContentDigest {
    ContentDigest::of(bytes)
}

/// Rebuilds `value` with every object's keys inserted in sorted order.
///
/// Works whether or not serde_json's `preserve_order` feature is enabled
/// somewhere in the dependency graph.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Compact serialization with recursively sorted keys.
pub fn canonical_json_bytes(value: &Value) -> Vec<u8> {
    // Serializing a Value cannot fail: keys are strings and numbers are finite.
    serde_json::to_vec(&canonicalize(value)).unwrap_or_default()
}
