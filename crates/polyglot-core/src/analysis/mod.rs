//! Two-phase message analysis and rolling context accumulation.
//!
//! - `analyzer` -- `ContextAnalyzer` trait for the external LLM classifier
//! - `accumulator` -- `ContextAccumulator` turning verdicts into admin notes

pub mod accumulator;
pub mod analyzer;

pub use accumulator::{ContextAccumulator, UserNote, build_admin_note};
pub use analyzer::{AnalysisStatus, ContextAnalyzer, UserMessageAnalysis};
