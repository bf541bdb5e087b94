//! Process-local cache backed by a `DashMap` with lazy expiry.
//!
//! Expiry uses `tokio::time::Instant`, so tests can drive TTLs with
//! `tokio::time::pause()` / `advance()` instead of sleeping.
//! Only correct when a single process owns the cache.

use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use polyglot_types::error::CacheError;
use tokio::time::Instant;

use super::Cache;

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: &str, ttl: Option<Duration>) -> Self {
        Self {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-memory implementation of [`Cache`].
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys, including expired keys not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired key. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }
}

impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), CacheEntry::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<bool, CacheError> {
        // The entry API holds the shard lock for the whole check-and-insert.
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(Instant::now()) {
                    occupied.insert(CacheEntry::new(value, ttl));
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry::new(value, ttl));
                Ok(true)
            }
        }
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn set_get_delete() {
        let cache = MemoryCache::new();
        cache.set("k", "v", None).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        cache.set("k", "v2", None).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v2"));

        cache.delete("k").await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
        cache.delete("missing").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn ttl_expiry_under_paused_clock() {
        let cache = MemoryCache::new();
        cache.set("k", "v", Some(Duration::from_secs(10))).await.unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get("k").await.unwrap().is_none());
        assert!(cache.is_empty(), "expired key is removed on read");
    }

    #[tokio::test(start_paused = true)]
    async fn set_refreshes_ttl() {
        let cache = MemoryCache::new();
        cache.set("k", "v", Some(Duration::from_secs(10))).await.unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set("k", "v", Some(Duration::from_secs(10))).await.unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;
        assert!(cache.get("k").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn set_nx_only_first_call_wins() {
        let cache = MemoryCache::new();
        assert!(cache.set_nx("k", "1", None).await.unwrap());
        assert!(!cache.set_nx("k", "2", None).await.unwrap());
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test(start_paused = true)]
    async fn set_nx_reclaims_expired_key() {
        let cache = MemoryCache::new();
        assert!(cache.set_nx("k", "1", Some(Duration::from_secs(5))).await.unwrap());
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(cache.set_nx("k", "2", None).await.unwrap());
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn set_nx_is_atomic_under_concurrency() {
        let cache = Arc::new(MemoryCache::new());
        let mut handles = Vec::new();
        for i in 0..64 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.set_nx("evt", &i.to_string(), None).await.unwrap()
            }));
        }
        let results = futures_util::future::join_all(handles).await;
        let winners = results.into_iter().filter(|r| *r.as_ref().unwrap()).count();
        assert_eq!(winners, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn purge_expired_removes_only_expired() {
        let cache = MemoryCache::new();
        cache.set("short", "v", Some(Duration::from_secs(1))).await.unwrap();
        cache.set("forever", "v", None).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }
}
