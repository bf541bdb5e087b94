//! HTTP transport for the relay.
//!
//! Axum server exposing the Intercom webhook receiver and a health check.

pub mod error;
pub mod handlers;
pub mod router;
