//! Shared key-value cache trait.
//!
//! Defines the interface for the cache tier that holds both idempotency
//! markers and conversation state (in separate namespaces).
//! `MemoryCache` is the process-local implementation; networked and
//! file-backed implementations live in polyglot-infra.

pub mod memory;

use std::time::Duration;

use polyglot_types::error::CacheError;

pub use memory::MemoryCache;

/// Namespace for event-id idempotency markers.
pub const IDEMPOTENCY_NAMESPACE: &str = "idempotency";

/// Namespace for serialized conversation state.
pub const CONVERSATION_NAMESPACE: &str = "conversation";

/// Build a namespaced cache key: `"{namespace}:{key}"`.
pub fn namespaced(namespace: &str, key: &str) -> String {
    format!("{namespace}:{key}")
}

/// Trait for a string key-value cache with per-key expiry.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// An expired key must behave exactly like a missing key for every method.
pub trait Cache: Send + Sync {
    /// Get a value by key. Returns None if the key is absent or expired.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, CacheError>> + Send;

    /// Set a value (overwrite). `ttl = None` keeps the key until deleted.
    fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> impl std::future::Future<Output = Result<(), CacheError>> + Send;

    /// Delete a key. No-op if the key does not exist.
    fn delete(&self, key: &str)
    -> impl std::future::Future<Output = Result<(), CacheError>> + Send;

    /// Atomically set `key` only if it is absent (or expired).
    ///
    /// Returns `true` if this call created the key. Must be a single atomic
    /// operation: concurrent callers racing on the same key see exactly one `true`.
    fn set_nx(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> impl std::future::Future<Output = Result<bool, CacheError>> + Send;
}
