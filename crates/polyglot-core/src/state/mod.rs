//! Conversation state persistence and per-conversation serialization.
//!
//! - `store` -- `ConversationStateStore` keyed by conversation id
//! - `locks` -- `ConversationLocks` holding one async mutex per live conversation

pub mod locks;
pub mod store;

pub use locks::{ConversationGuard, ConversationLocks};
pub use store::ConversationStateStore;
