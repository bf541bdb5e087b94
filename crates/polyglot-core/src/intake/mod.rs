//! Inbound event intake: parse, reserve, route.
//!
//! - `guard` -- `IdempotencyGuard`, one atomic reservation per event id
//! - `pipeline` -- `EventIntake`, the entry point the transport calls

pub mod guard;
pub mod pipeline;

pub use guard::IdempotencyGuard;
pub use pipeline::{EventIntake, IntakeOutcome};
