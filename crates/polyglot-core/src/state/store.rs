//! Conversation state store.
//!
//! States live in the `conversation` cache namespace as JSON, keyed by
//! conversation id. Every write refreshes the TTL. Every failure, including
//! a timeout, is wrapped into a `DomainException` naming the event type and
//! conversation id that triggered it.

use std::sync::Arc;
use std::time::Duration;

use polyglot_types::conversation::ConversationState;
use polyglot_types::error::CacheError;
use polyglot_types::result::DomainException;
use tracing::debug;

use crate::cache::{CONVERSATION_NAMESPACE, Cache, namespaced};
use crate::deadline::with_deadline;

/// Typed view over the conversation namespace of a [`Cache`].
pub struct ConversationStateStore<C: Cache> {
    cache: Arc<C>,
    ttl: Duration,
    timeout: Duration,
}

impl<C: Cache> ConversationStateStore<C> {
    pub fn new(cache: Arc<C>, ttl: Duration, timeout: Duration) -> Self {
        Self {
            cache,
            ttl,
            timeout,
        }
    }

    /// Load the state for `conversation_id`. `None` if absent or expired.
    pub async fn get(
        &self,
        conversation_id: &str,
        event_type: &str,
    ) -> Result<Option<ConversationState>, DomainException> {
        let key = namespaced(CONVERSATION_NAMESPACE, conversation_id);
        let raw = with_deadline(self.timeout, self.cache.get(&key), CacheError::Timeout)
            .await
            .map_err(|e| failure(&e, "get", conversation_id, event_type))?;

        match raw {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| {
                    failure(
                        &CacheError::Serialization(e.to_string()),
                        "get",
                        conversation_id,
                        event_type,
                    )
                }),
            None => Ok(None),
        }
    }

    /// Store `state`, overwriting any previous value and refreshing its TTL.
    pub async fn set(
        &self,
        state: &ConversationState,
        event_type: &str,
    ) -> Result<(), DomainException> {
        let conversation_id = state.conversation_id.as_str();
        let json = serde_json::to_string(state).map_err(|e| {
            failure(
                &CacheError::Serialization(e.to_string()),
                "set",
                conversation_id,
                event_type,
            )
        })?;
        let key = namespaced(CONVERSATION_NAMESPACE, conversation_id);
        with_deadline(
            self.timeout,
            self.cache.set(&key, &json, Some(self.ttl)),
            CacheError::Timeout,
        )
        .await
        .map_err(|e| failure(&e, "set", conversation_id, event_type))?;

        debug!(conversation_id, status = %state.status, "conversation state stored");
        Ok(())
    }

    /// Remove the state for `conversation_id`. No-op if absent.
    pub async fn delete(&self, conversation_id: &str, event_type: &str) -> Result<(), DomainException> {
        let key = namespaced(CONVERSATION_NAMESPACE, conversation_id);
        with_deadline(self.timeout, self.cache.delete(&key), CacheError::Timeout)
            .await
            .map_err(|e| failure(&e, "delete", conversation_id, event_type))
    }
}

fn failure(
    error: &CacheError,
    operation: &str,
    conversation_id: &str,
    event_type: &str,
) -> DomainException {
    DomainException::new(
        error.exception_class(),
        format!("conversation state {operation} failed: {error}"),
        event_type,
    )
    .with_param("conversation_id", conversation_id)
    .with_param("operation", operation)
}
