//! Cache entry type

use medrec_core::{CallMetadata, RequestKind, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A memoized response to one external generative call.
///
/// Entries are immutable once written; a `store` for the same fingerprint
/// replaces the whole entry. An expired entry is never served and is removed
/// only by the sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Hex SHA-256 of the canonicalized (kind, payload) pair.
    pub fingerprint: String,
    pub kind: RequestKind,
    /// Snapshot of the request payload that produced the response.
    pub payload: Value,
    /// The structured response as extracted from the AI's reply.
    pub response: Value,
    pub metadata: CallMetadata,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl CacheEntry {
    /// Whether the entry may no longer be served as of `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}
