//! Per-resolution diagnostic collector.

use serde::Serialize;

/// One note recorded while resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticEntry {
    /// Provider or strategy that produced the note.
    pub source: String,
    pub message: String,
}

/// Notes gathered during one resolution, in order.
///
/// Owned by the caller and threaded through as `&mut`; every note is also
/// emitted as a `tracing` debug event.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<DiagnosticEntry>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a note.
    pub fn record(&mut self, source: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("[{}] {}", source, message);

        self.entries.push(DiagnosticEntry {
            source: source.to_string(),
            message,
        });
    }

    pub fn entries(&self) -> &[DiagnosticEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
