//! Resolution orchestration and its diagnostics.

pub mod diagnostics;
pub mod orchestrator;

pub use diagnostics::{DiagnosticEntry, Diagnostics};
pub use orchestrator::Resolver;
