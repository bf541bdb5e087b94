//! Inbound event parsing.
//!
//! Raw webhook bytes are validated into a `ConversationEvent` exactly once,
//! here, before the idempotency guard and router see the event.

pub mod parse;

pub use parse::{html_to_text, parse_envelope};
