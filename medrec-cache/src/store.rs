//! Response store backends and the cache facade.

use crate::entry::CacheEntry;
use crate::fingerprint::fingerprint;
use chrono::{Duration, Utc};
use medrec_core::{CacheError, CallMetadata, RequestKind, Timestamp};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// Fixed time-to-live for cached responses: 24 hours.
pub const DEFAULT_TTL_SECS: i64 = 24 * 60 * 60;

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Persistence backend for cache entries, keyed by fingerprint.
///
/// Implementations must be thread-safe. A `put` for an existing fingerprint
/// replaces the entry wholesale; entries are never partially updated.
pub trait ResponseStore: Send + Sync {
    /// Fetch the entry for a fingerprint, expired or not.
    fn get(&self, fingerprint: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Insert or replace an entry. Last writer wins.
    fn put(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// Delete every entry expired as of `now`; returns the count removed.
    fn sweep(&self, now: Timestamp) -> Result<usize, CacheError>;

    /// Delete every entry regardless of expiry; returns the count removed.
    fn clear(&self) -> Result<usize, CacheError>;

    /// Current number of entries, live or expired.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// IN-MEMORY BACKEND
// ============================================================================

/// In-process store backed by a `RwLock<HashMap>`.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseStore for MemoryStore {
    fn get(&self, fingerprint: &str) -> Result<Option<CacheEntry>, CacheError> {
        let entries = self.entries.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(entries.get(fingerprint).cloned())
    }

    fn put(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
        entries.insert(entry.fingerprint.clone(), entry);
        Ok(())
    }

    fn sweep(&self, now: Timestamp) -> Result<usize, CacheError> {
        // The write lock is held only for the retain pass itself.
        let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        Ok(before - entries.len())
    }

    fn clear(&self) -> Result<usize, CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }

    fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.len())
            .finish()
    }
}

// ============================================================================
// CACHE FACADE
// ============================================================================

/// Content-addressed response cache with a fixed TTL.
///
/// Explicitly constructed and passed by reference into whatever needs it;
/// there is no process-wide singleton.
pub struct ResponseCache {
    store: Box<dyn ResponseStore>,
    ttl: Duration,
}

impl ResponseCache {
    /// In-memory cache with the standard 24h TTL.
    pub fn new() -> Self {
        Self::with_store(Box::new(MemoryStore::new()), Duration::seconds(DEFAULT_TTL_SECS))
    }

    /// Cache over an arbitrary backend with an explicit TTL.
    pub fn with_store(store: Box<dyn ResponseStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// In-memory cache with a custom TTL. Mainly for tests that need to
    /// force entries into the past.
    pub fn in_memory_with_ttl(ttl: Duration) -> Self {
        Self::with_store(Box::new(MemoryStore::new()), ttl)
    }

    /// Read-only lookup. Returns the stored response iff a live entry exists
    /// for the fingerprint. Read failures are logged and reported as a MISS.
    pub fn lookup(&self, kind: RequestKind, payload: &Value) -> Option<Value> {
        let fp = fingerprint(kind, payload);
        match self.store.get(&fp) {
            Ok(Some(entry)) if !entry.is_expired(Utc::now()) => {
                tracing::debug!(kind = %kind, fingerprint = %fp, "cache hit");
                Some(entry.response)
            }
            Ok(Some(_)) => {
                // Expired entries are a MISS; the sweep removes them.
                tracing::debug!(kind = %kind, fingerprint = %fp, "cache entry expired");
                None
            }
            Ok(None) => {
                tracing::debug!(kind = %kind, fingerprint = %fp, "cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = %kind, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Insert-or-replace the response for a (kind, payload) pair with
    /// expiry = now + TTL. The caller decides what to do with a failure;
    /// per policy it is logged and discarded.
    pub fn store(
        &self,
        kind: RequestKind,
        payload: &Value,
        response: Value,
        metadata: CallMetadata,
    ) -> Result<(), CacheError> {
        self.store_with_ttl(kind, payload, response, metadata, self.ttl)
    }

    /// As `store`, with an explicit TTL. Exposed for expiry tests.
    pub fn store_with_ttl(
        &self,
        kind: RequestKind,
        payload: &Value,
        response: Value,
        metadata: CallMetadata,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let now = Utc::now();
        let entry = CacheEntry {
            fingerprint: fingerprint(kind, payload),
            kind,
            payload: payload.clone(),
            response,
            metadata,
            created_at: now,
            expires_at: now + ttl,
        };
        self.store.put(entry)
    }

    /// Delete all expired entries; returns the count removed. Invoked by an
    /// external scheduler, independent of the request path.
    pub fn sweep(&self) -> usize {
        match self.store.sweep(Utc::now()) {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(error = %e, "cache sweep failed");
                0
            }
        }
    }

    /// Delete every entry regardless of expiry; returns the count removed.
    pub fn clear(&self) -> usize {
        match self.store.clear() {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(error = %e, "cache clear failed");
                0
            }
        }
    }

    /// Current number of entries, live or expired.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.len())
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata() -> CallMetadata {
        CallMetadata {
            model: "gemini-2.5-flash".to_string(),
            response_time_ms: Some(250),
            tokens_used: Some(512),
        }
    }

    #[test]
    fn test_round_trip() {
        let cache = ResponseCache::new();
        let payload = json!({"patient_context": {"age": 67}, "sources": []});
        let response = json!({"reconciled_medication": "Lisinopril 10mg"});

        cache
            .store(
                RequestKind::MedicationReconciliation,
                &payload,
                response.clone(),
                metadata(),
            )
            .unwrap();

        let hit = cache
            .lookup(RequestKind::MedicationReconciliation, &payload)
            .unwrap();
        assert_eq!(hit, response);
    }

    #[test]
    fn test_lookup_misses_for_unknown_payload() {
        let cache = ResponseCache::new();
        assert!(cache
            .lookup(RequestKind::MedicationReconciliation, &json!({"age": 1}))
            .is_none());
    }

    #[test]
    fn test_lookup_does_not_cross_kinds() {
        let cache = ResponseCache::new();
        let payload = json!({"age": 67});
        cache
            .store(
                RequestKind::MedicationReconciliation,
                &payload,
                json!({"r": 1}),
                metadata(),
            )
            .unwrap();
        assert!(cache
            .lookup(RequestKind::DataQualityAssessment, &payload)
            .is_none());
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache = ResponseCache::new();
        let payload = json!({"age": 67});
        cache
            .store_with_ttl(
                RequestKind::MedicationReconciliation,
                &payload,
                json!({"r": 1}),
                metadata(),
                Duration::seconds(-1),
            )
            .unwrap();

        assert!(cache
            .lookup(RequestKind::MedicationReconciliation, &payload)
            .is_none());
        // The expired entry is still present until swept.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_store_replaces_existing_entry() {
        let cache = ResponseCache::new();
        let payload = json!({"age": 67});
        cache
            .store(
                RequestKind::MedicationReconciliation,
                &payload,
                json!({"version": 1}),
                metadata(),
            )
            .unwrap();
        cache
            .store(
                RequestKind::MedicationReconciliation,
                &payload,
                json!({"version": 2}),
                metadata(),
            )
            .unwrap();

        assert_eq!(cache.len(), 1);
        let hit = cache
            .lookup(RequestKind::MedicationReconciliation, &payload)
            .unwrap();
        assert_eq!(hit, json!({"version": 2}));
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let cache = ResponseCache::new();
        cache
            .store_with_ttl(
                RequestKind::MedicationReconciliation,
                &json!({"age": 1}),
                json!({"r": 1}),
                metadata(),
                Duration::seconds(-1),
            )
            .unwrap();
        cache
            .store_with_ttl(
                RequestKind::MedicationReconciliation,
                &json!({"age": 2}),
                json!({"r": 2}),
                metadata(),
                Duration::seconds(-1),
            )
            .unwrap();
        cache
            .store(
                RequestKind::DataQualityAssessment,
                &json!({"age": 3}),
                json!({"r": 3}),
                metadata(),
            )
            .unwrap();

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.sweep(), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache
            .lookup(RequestKind::DataQualityAssessment, &json!({"age": 3}))
            .is_some());

        // A second sweep finds nothing to remove.
        assert_eq!(cache.sweep(), 0);
    }

    #[test]
    fn test_clear_removes_everything() {
        let cache = ResponseCache::new();
        cache
            .store(
                RequestKind::MedicationReconciliation,
                &json!({"age": 1}),
                json!({"r": 1}),
                metadata(),
            )
            .unwrap();
        cache
            .store(
                RequestKind::DataQualityAssessment,
                &json!({"age": 2}),
                json!({"r": 2}),
                metadata(),
            )
            .unwrap();

        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_memory_store_len() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        let now = Utc::now();
        store
            .put(CacheEntry {
                fingerprint: "ff".repeat(32),
                kind: RequestKind::MedicationReconciliation,
                payload: json!({}),
                response: json!({}),
                metadata: metadata(),
                created_at: now,
                expires_at: now + Duration::hours(24),
            })
            .unwrap();
        assert_eq!(store.len(), 1);
    }
}
