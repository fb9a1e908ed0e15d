//! Request fingerprinting
//!
//! A fingerprint is `hex(SHA-256(kind || "|" || canonical_json(payload)))`.
//! Canonicalization sorts every object's keys recursively; arrays keep their
//! order and scalars keep serde_json's default rendering. This is done
//! explicitly rather than relying on the backing map's iteration order, so
//! the digest stays stable even if a dependency turns on serde_json's
//! `preserve_order` feature.

use medrec_core::RequestKind;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Compute the cache fingerprint for a (kind, payload) pair.
///
/// Deterministic for structurally-equal payloads regardless of key-insertion
/// order, across process restarts.
pub fn fingerprint(kind: RequestKind, payload: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(canonical_json(payload).as_bytes());
    hex::encode(hasher.finalize())
}

/// Serialize a JSON value with all object keys sorted recursively.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Display on Value produces compact JSON and cannot fail.
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
