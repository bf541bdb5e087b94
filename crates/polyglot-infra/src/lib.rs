//! Infrastructure layer for Polyglot.
//!
//! Implementations of the ports defined in `polyglot-core`: the SQLite cache
//! and result sink, the Intercom messaging client, the HTTP language-service
//! client, and the configuration loader.

pub mod config;
pub mod language;
pub mod messaging;
pub mod sqlite;
