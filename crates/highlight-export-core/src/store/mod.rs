//! Note repository
//!
//! The notes directory is the only persisted state. Each run scans and parses
//! every note, indexes them by source id, then creates or updates one note
//! per incoming bookmark.

pub mod io;
mod report;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::codec::{MarkdownCodec, NoteCodec};
use crate::error::{ExportError, Result};
use crate::hash;
use crate::note::ParsedNote;
use crate::source::{Bookmark, Highlight};

pub use report::{NoteFailure, NoteOutcome, OperationKind, SkippedFile, SyncReport};

/// Highest numeric suffix tried when a generated file name is taken
const MAX_ID_SUFFIX: usize = 99;

/// A bookmark and the highlights that belong to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteInput {
    pub bookmark: Bookmark,
    pub highlights: Vec<Highlight>,
}

/// Notes found on disk, keyed by source id
#[derive(Debug, Default)]
pub struct NoteIndex {
    notes: Vec<ParsedNote>,
    by_source: HashMap<String, usize>,
    /// Files that could not be parsed
    pub skipped: Vec<SkippedFile>,
}

impl NoteIndex {
    /// Add a note; a later note with the same source id replaces the earlier one.
    ///
    /// Re-inserting a note from the same path refreshes it in place.
    fn insert(&mut self, note: ParsedNote) {
        let source_id = note.metadata.source_id.clone();
        if let Some(&previous) = self.by_source.get(&source_id) {
            if self.notes[previous].path == note.path {
                self.notes[previous] = note;
                return;
            }
            tracing::warn!(
                source_id = %source_id,
                kept = %note.path.display(),
                ignored = %self.notes[previous].path.display(),
                "duplicate source id, using the later note"
            );
        }

        self.by_source.insert(source_id, self.notes.len());
        self.notes.push(note);
    }

    /// Note tracking the given bookmark
    pub fn get(&self, source_id: &str) -> Option<&ParsedNote> {
        self.by_source.get(source_id).map(|&i| &self.notes[i])
    }

    /// Number of indexed source ids
    pub fn len(&self) -> usize {
        self.by_source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }
}

/// Directory of markdown notes
#[derive(Debug)]
pub struct NoteRepository<C = MarkdownCodec> {
    root: PathBuf,
    extension: String,
    codec: C,
}

impl<C: NoteCodec> NoteRepository<C> {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>, codec: C) -> Self {
        NoteRepository {
            root: root.into(),
            extension: extension.into(),
            codec,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Read and parse every note under the root.
    ///
    /// Unparseable or undecodable notes are skipped with a warning. Failing
    /// to read the directory or a file is fatal.
    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    pub fn scan(&self) -> Result<NoteIndex> {
        let start = Instant::now();
        io::ensure_root(&self.root)?;

        let mut index = NoteIndex::default();
        for path in io::list_notes(&self.root, &self.extension)? {
            let parsed =
                io::read_note(&path).and_then(|content| self.codec.parse(&content, &path));
            match parsed {
                Ok(note) => index.insert(note),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping note");
                    index.skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        crate::trace_time!(start, "scan_notes", notes = index.len());
        tracing::debug!(notes = index.len(), skipped = index.skipped.len(), "scanned notes");
        Ok(index)
    }

    /// Create or update one note per input, in order.
    ///
    /// `cancel` is checked before each input; a cancelled run keeps what it
    /// already wrote.
    #[tracing::instrument(skip(self, inputs, cancel), fields(root = %self.root.display(), inputs = inputs.len()))]
    pub fn sync(&self, inputs: &[NoteInput], cancel: &AtomicBool) -> Result<SyncReport> {
        let mut index = self.scan()?;
        let mut report = SyncReport {
            skipped: std::mem::take(&mut index.skipped),
            ..Default::default()
        };

        for input in inputs {
            if cancel.load(Ordering::SeqCst) {
                tracing::info!("sync cancelled");
                report.cancelled = true;
                break;
            }

            let existing = index.get(&input.bookmark.id).cloned();
            let target = existing.as_ref().map(|note| note.path.clone());
            let result = match existing {
                Some(note) => self.update_note(&note, input, &mut index),
                None => self.create_note(input, &mut index),
            };

            match result {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!(bookmark_id = %input.bookmark.id, error = %e, "note failed");
                    report.failures.push(NoteFailure {
                        bookmark_id: input.bookmark.id.clone(),
                        title: input.bookmark.title.clone(),
                        path: target,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    fn update_note(
        &self,
        note: &ParsedNote,
        input: &NoteInput,
        index: &mut NoteIndex,
    ) -> Result<NoteOutcome> {
        let known: HashSet<&str> = note.highlight_ids.iter().map(String::as_str).collect();
        let added = fresh_highlights(&input.highlights, &known);

        let (kind, total) = match self.codec.update(note, &input.bookmark, &input.highlights)? {
            Some(op) => {
                io::write_atomic(&note.path, &op.content)?;
                tracing::info!(path = %note.path.display(), added = added.len(), "updated note");
                self.reindex(&op.content, &note.path, index);
                (OperationKind::Updated, tracked_count(&op.metadata.source_hash))
            }
            None => (OperationKind::Unchanged, known.len()),
        };

        Ok(outcome(kind, &input.bookmark, &note.path, total, &added))
    }

    fn create_note(&self, input: &NoteInput, index: &mut NoteIndex) -> Result<NoteOutcome> {
        let mut op = self.codec.generate(&input.bookmark, &input.highlights)?;
        let base_id = op.metadata.id.clone();
        let mut path = self.root.join(op.file_name(&self.extension));

        // Same slug in the same second: try `<id>-2`, `<id>-3`, ...
        let mut suffix = 2;
        while path.exists() {
            if suffix > MAX_ID_SUFFIX {
                return Err(ExportError::NoteExists { path });
            }
            op = op.with_id(format!("{}-{}", base_id, suffix))?;
            path = self.root.join(op.file_name(&self.extension));
            suffix += 1;
        }

        io::write_atomic(&path, &op.content)?;
        tracing::info!(path = %path.display(), "created note");

        let added = fresh_highlights(&input.highlights, &HashSet::new());
        let created = outcome(
            OperationKind::Created,
            &input.bookmark,
            &path,
            tracked_count(&op.metadata.source_hash),
            &added,
        );

        self.reindex(&op.content, &path, index);
        Ok(created)
    }

    /// Index what was just written so a repeated bookmark later in the same
    /// run merges into the note as it now is on disk
    fn reindex(&self, content: &str, path: &Path, index: &mut NoteIndex) {
        match self.codec.parse(content, path) {
            Ok(note) => index.insert(note),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "written note does not parse"),
        }
    }
}

/// Incoming highlights not yet tracked, first occurrence of each id
fn fresh_highlights<'a>(highlights: &'a [Highlight], known: &HashSet<&str>) -> Vec<&'a Highlight> {
    let mut seen = HashSet::new();
    highlights
        .iter()
        .filter(|h| !known.contains(h.id.as_str()))
        .filter(|h| seen.insert(h.id.as_str()))
        .collect()
}

fn tracked_count(source_hash: &str) -> usize {
    hash::decode(source_hash).map(|ids| ids.len()).unwrap_or_default()
}

fn outcome(
    kind: OperationKind,
    bookmark: &Bookmark,
    path: &Path,
    total: usize,
    added: &[&Highlight],
) -> NoteOutcome {
    let mut colors = BTreeMap::new();
    if kind != OperationKind::Unchanged {
        for highlight in added {
            *colors.entry(highlight.color.clone()).or_insert(0) += 1;
        }
    }

    NoteOutcome {
        kind,
        bookmark_id: bookmark.id.clone(),
        title: bookmark.title.clone(),
        path: path.to_path_buf(),
        total,
        added: if kind == OperationKind::Unchanged {
            0
        } else {
            added.len()
        },
        colors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn note(source_id: &str, id: &str) -> String {
        format!("---\nid: {}\nsource-id: {}\n---\n# Note\n", id, source_id)
    }

    #[test]
    fn test_scan_creates_missing_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("notes");
        let repo = NoteRepository::new(&root, "md", MarkdownCodec::default());

        let index = repo.scan().unwrap();
        assert!(index.is_empty());
        assert!(root.is_dir());
    }

    #[test]
    fn test_scan_skips_unparseable_notes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("good.md"), note("b1", "1-good")).unwrap();
        fs::write(dir.path().join("bad.md"), "---\nid: [oops\n---\n").unwrap();
        fs::write(dir.path().join("plain.md"), "# No frontmatter\n").unwrap();

        let repo = NoteRepository::new(dir.path(), "md", MarkdownCodec::default());
        let index = repo.scan().unwrap();

        assert_eq!(index.len(), 1);
        assert!(index.get("b1").is_some());
        assert_eq!(index.skipped.len(), 2);
    }

    #[test]
    fn test_scan_skips_undecodable_notes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("good.md"), note("b1", "1-good")).unwrap();
        fs::write(dir.path().join("latin1.md"), b"---\nid: caf\xe9\n---\n").unwrap();

        let repo = NoteRepository::new(dir.path(), "md", MarkdownCodec::default());
        let index = repo.scan().unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.skipped.len(), 1);
        assert_eq!(index.skipped[0].path, dir.path().join("latin1.md"));
        assert!(index.skipped[0].reason.contains("UTF-8"));
    }

    #[test]
    fn test_duplicate_source_id_later_wins() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.md"), note("b1", "1-a")).unwrap();
        fs::write(dir.path().join("b.md"), note("b1", "2-b")).unwrap();

        let repo = NoteRepository::new(dir.path(), "md", MarkdownCodec::default());
        let index = repo.scan().unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("b1").unwrap().metadata.id, "2-b");
    }

    #[test]
    fn test_fresh_highlights_skips_known_and_repeats() {
        let highlight = |id: &str| Highlight {
            id: id.to_string(),
            text: String::new(),
            color: "red".to_string(),
            created: Default::default(),
            bookmark_id: "b1".to_string(),
            href: String::new(),
            bookmark_title: String::new(),
        };
        let highlights = vec![highlight("h1"), highlight("h2"), highlight("h2"), highlight("h3")];
        let known: HashSet<&str> = ["h1"].into_iter().collect();

        let ids: Vec<&str> = fresh_highlights(&highlights, &known)
            .iter()
            .map(|h| h.id.as_str())
            .collect();
        assert_eq!(ids, ["h2", "h3"]);
    }
}
