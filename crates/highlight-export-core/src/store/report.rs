//! What a sync run did, note by note

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// How a note was affected by a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Created,
    Updated,
    Unchanged,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Created => "created",
            OperationKind::Updated => "updated",
            OperationKind::Unchanged => "unchanged",
        };
        f.pad(name)
    }
}

/// A bookmark that was processed successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteOutcome {
    pub kind: OperationKind,
    pub bookmark_id: String,
    pub title: String,
    pub path: PathBuf,
    /// Highlights tracked by the note after the run
    pub total: usize,
    /// Highlights added by this run
    pub added: usize,
    /// Added highlights per color
    pub colors: BTreeMap<String, usize>,
}

/// A bookmark that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteFailure {
    pub bookmark_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub error: String,
}

/// A note file left out of the run because it could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub outcomes: Vec<NoteOutcome>,
    pub failures: Vec<NoteFailure>,
    pub skipped: Vec<SkippedFile>,
    /// Whether the run stopped early on request
    pub cancelled: bool,
}

impl SyncReport {
    /// Number of notes with the given outcome
    pub fn count(&self, kind: OperationKind) -> usize {
        self.outcomes.iter().filter(|o| o.kind == kind).count()
    }

    /// Highlights added across all notes
    pub fn added(&self) -> usize {
        self.outcomes.iter().map(|o| o.added).sum()
    }

    /// Highlights tracked across all processed notes
    pub fn total(&self) -> usize {
        self.outcomes.iter().map(|o| o.total).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Look up the outcome for a bookmark
    pub fn outcome(&self, bookmark_id: &str) -> Option<&NoteOutcome> {
        self.outcomes.iter().find(|o| o.bookmark_id == bookmark_id)
    }
}
