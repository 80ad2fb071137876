//! End-to-end export: fetch highlights, resolve bookmarks, sync notes

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::codec::NoteCodec;
use crate::error::Result;
use crate::source::{Highlight, HighlightSource};
use crate::store::{NoteFailure, NoteInput, NoteRepository, SyncReport};

/// Group highlights by bookmark id, keeping first-seen bookmark order
pub fn group_by_bookmark(highlights: Vec<Highlight>) -> Vec<(String, Vec<Highlight>)> {
    let mut order: Vec<(String, Vec<Highlight>)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for highlight in highlights {
        match slots.get(&highlight.bookmark_id) {
            Some(&slot) => order[slot].1.push(highlight),
            None => {
                slots.insert(highlight.bookmark_id.clone(), order.len());
                order.push((highlight.bookmark_id.clone(), vec![highlight]));
            }
        }
    }

    order
}

/// Drives a [`HighlightSource`] into a [`NoteRepository`]
pub struct Exporter<'a, S, C> {
    source: &'a S,
    repository: &'a NoteRepository<C>,
}

impl<'a, S: HighlightSource, C: NoteCodec> Exporter<'a, S, C> {
    pub fn new(source: &'a S, repository: &'a NoteRepository<C>) -> Self {
        Exporter { source, repository }
    }

    /// Run a full export.
    ///
    /// Bookmarks that cannot be resolved are reported as failures. Fetching
    /// the highlight list itself failing aborts the run.
    #[tracing::instrument(skip(self, cancel))]
    pub fn export(&self, cancel: &AtomicBool) -> Result<SyncReport> {
        let highlights = self.source.fetch_highlights()?;
        tracing::info!(highlights = highlights.len(), "fetched highlights");

        let mut inputs = Vec::new();
        let mut failures = Vec::new();
        let mut cancelled = false;

        for (bookmark_id, highlights) in group_by_bookmark(highlights) {
            if cancel.load(Ordering::SeqCst) {
                cancelled = true;
                break;
            }

            match self.source.fetch_bookmark(&bookmark_id) {
                Ok(bookmark) => inputs.push(NoteInput {
                    bookmark,
                    highlights,
                }),
                Err(e) => {
                    tracing::warn!(bookmark_id = %bookmark_id, error = %e, "could not resolve bookmark");
                    let title = highlights
                        .first()
                        .map(|h| h.bookmark_title.clone())
                        .unwrap_or_default();
                    failures.push(NoteFailure {
                        bookmark_id,
                        title,
                        path: None,
                        error: e.to_string(),
                    });
                }
            }
        }

        let mut report = if cancelled {
            tracing::info!("export cancelled before sync");
            SyncReport {
                cancelled: true,
                ..Default::default()
            }
        } else {
            self.repository.sync(&inputs, cancel)?
        };
        failures.append(&mut report.failures);
        report.failures = failures;

        Ok(report)
    }
}
