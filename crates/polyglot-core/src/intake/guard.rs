//! Idempotency guard for inbound events.

use std::sync::Arc;
use std::time::Duration;

use polyglot_types::error::CacheError;
use tracing::debug;

use crate::cache::{Cache, IDEMPOTENCY_NAMESPACE, namespaced};
use crate::deadline::with_deadline;

/// Guards against processing the same event id twice.
///
/// Reservation is a single atomic `set_nx`; there is no separate
/// check-then-mark step for concurrent deliveries to slip between.
pub struct IdempotencyGuard<C: Cache> {
    cache: Arc<C>,
    ttl: Option<Duration>,
    timeout: Duration,
}

impl<C: Cache> IdempotencyGuard<C> {
    /// `ttl = None` keeps markers until the cache is wiped.
    pub fn new(cache: Arc<C>, ttl: Option<Duration>, timeout: Duration) -> Self {
        Self {
            cache,
            ttl,
            timeout,
        }
    }

    /// Claim `event_id`. Returns `true` exactly once per id.
    pub async fn reserve(&self, event_id: &str) -> Result<bool, CacheError> {
        let key = namespaced(IDEMPOTENCY_NAMESPACE, event_id);
        let fresh = with_deadline(
            self.timeout,
            self.cache.set_nx(&key, "1", self.ttl),
            CacheError::Timeout,
        )
        .await?;
        if !fresh {
            debug!(event_id, "duplicate event");
        }
        Ok(fresh)
    }
}
