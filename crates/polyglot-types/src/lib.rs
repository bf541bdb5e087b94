//! Shared domain types for Polyglot.
//!
//! This crate contains the core domain types used across the relay:
//! conversation state, the validated webhook envelope, processing results
//! and domain exceptions, configuration, and the collaborator error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod conversation;
pub mod error;
pub mod event;
pub mod result;
