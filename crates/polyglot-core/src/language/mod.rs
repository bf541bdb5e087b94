//! Translation and language detection.
//!
//! - `service` -- `TranslationService` trait implemented by the remote backend
//! - `orchestrator` -- `TranslationOrchestrator` dispatching on target language

pub mod orchestrator;
pub mod service;

pub use orchestrator::TranslationOrchestrator;
pub use service::TranslationService;
