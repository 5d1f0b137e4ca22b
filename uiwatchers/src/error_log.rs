use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::warn;

/// Recorded when a dialog matched but its text could not be read.
pub const UNAVAILABLE_TEXT: &str = "";

/// Which kind of interstitial produced a diagnostic entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentKind {
    /// Application not responding
    Anr,
    /// Application crashed
    Crash,
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anr => write!(f, "anr"),
            Self::Crash => write!(f, "crash"),
        }
    }
}

/// Append-only, thread-safe list of diagnostic strings.
///
/// Clones share the same underlying list, so the engine, its watchers and
/// test code on another thread all observe one log. Entries keep detection
/// order and are never edited; [`ErrorLog::reset`] is the only way to remove
/// them.
#[derive(Clone, Default)]
pub struct ErrorLog {
    entries: Arc<RwLock<Vec<String>>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry.
    pub fn record(&self, text: impl Into<String>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.push(text.into());
    }

    /// Append the diagnostic for a detected incident. `None` means the dialog
    /// text could not be read and the placeholder is recorded instead.
    pub fn record_incident(&self, kind: IncidentKind, text: Option<String>) {
        let text = text.unwrap_or_else(|| UNAVAILABLE_TEXT.to_string());
        warn!(incident = %kind, text = %text, "Recorded UI incident");
        self.record(text);
    }

    /// Copy of the current entries. Later appends are not reflected.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove every entry.
    pub fn reset(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A view of this log that can read and clear it but not append.
    pub fn reader(&self) -> ErrorLogReader {
        ErrorLogReader { log: self.clone() }
    }
}

/// Read side of an [`ErrorLog`], handed to test code that must not forge
/// diagnostics. Clones observe the same entries as the log they came from.
#[derive(Clone)]
pub struct ErrorLogReader {
    log: ErrorLog,
}

impl ErrorLogReader {
    pub fn snapshot(&self) -> Vec<String> {
        self.log.snapshot()
    }

    pub fn reset(&self) {
        self.log.reset();
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}

impl fmt::Debug for ErrorLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorLog")
            .field("entries", &self.snapshot())
            .finish()
    }
}

impl fmt::Debug for ErrorLogReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorLogReader")
            .field("entries", &self.snapshot())
            .finish()
    }
}
