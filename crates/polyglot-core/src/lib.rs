//! Conversation state machine, event routing, and port traits for Polyglot.
//!
//! This crate defines the ports (cache, translation, analysis, messaging,
//! result sink) that the infrastructure layer implements. It depends only on
//! `polyglot-types` -- never on `polyglot-infra` or any network/database crate.

pub mod analysis;
pub mod cache;
pub mod deadline;
pub mod event;
pub mod handler;
pub mod intake;
pub mod language;
pub mod messaging;
pub mod router;
pub mod sink;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
