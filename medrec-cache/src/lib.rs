//! MEDREC Response Cache
//!
//! Content-addressed store mapping (request kind, canonical payload) to a
//! cached structured response with a bounded lifetime. Fingerprints are
//! SHA-256 digests of a key-order-normalized serialization, so structurally
//! equal payloads hit the same entry across process restarts.
//!
//! Caching is best-effort: read failures are a MISS, write failures surface
//! as a `CacheError` the caller deliberately discards and logs.

pub mod entry;
pub mod fingerprint;
pub mod store;

pub use entry::CacheEntry;
pub use fingerprint::{canonical_json, fingerprint};
pub use store::{MemoryStore, ResponseCache, ResponseStore, DEFAULT_TTL_SECS};
