//! Reading, generating and updating note files
//!
//! [`NoteCodec`] is the single seam between the repository and the note
//! format. [`MarkdownCodec`] is the YAML-frontmatter markdown implementation.

mod generate;
mod update;

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::{ExportError, Result};
use crate::group::{ColorConfig, HighlightGrouper};
use crate::hash;
use crate::note::{frontmatter, sections, NoteOperation, ParsedNote};
use crate::source::{Bookmark, Highlight};

pub use update::REFERENCES;

/// Parse, generate and update notes
pub trait NoteCodec {
    /// Parse file content into a note
    fn parse(&self, content: &str, path: &Path) -> Result<ParsedNote>;

    /// Build a brand-new note for a bookmark
    fn generate(&self, bookmark: &Bookmark, highlights: &[Highlight]) -> Result<NoteOperation>;

    /// Merge highlights into an existing note.
    ///
    /// Returns `Ok(None)` when every incoming highlight is already tracked,
    /// in which case the file must be left alone.
    fn update(
        &self,
        existing: &ParsedNote,
        bookmark: &Bookmark,
        highlights: &[Highlight],
    ) -> Result<Option<NoteOperation>>;
}

/// Markdown notes with a YAML frontmatter block
#[derive(Debug, Clone)]
pub struct MarkdownCodec {
    grouper: HighlightGrouper,
    base_tags: Vec<String>,
    clock: fn() -> DateTime<Utc>,
}

impl Default for MarkdownCodec {
    fn default() -> Self {
        MarkdownCodec::new(ColorConfig::default(), Vec::new())
    }
}

impl MarkdownCodec {
    pub fn new(colors: ColorConfig, base_tags: Vec<String>) -> Self {
        MarkdownCodec {
            grouper: HighlightGrouper::new(colors),
            base_tags,
            clock: generate::system_clock,
        }
    }

    /// Replace the clock used to stamp new local ids
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn grouper(&self) -> &HighlightGrouper {
        &self.grouper
    }
}

impl NoteCodec for MarkdownCodec {
    fn parse(&self, content: &str, path: &Path) -> Result<ParsedNote> {
        let (yaml, body) =
            frontmatter::split(content).ok_or_else(|| ExportError::InvalidFrontmatter {
                path: path.to_path_buf(),
                reason: "missing frontmatter delimiters".to_string(),
            })?;
        let (metadata, raw) = frontmatter::parse_metadata(yaml, path)?;

        let highlight_ids = if metadata.source_hash.trim().is_empty() {
            Vec::new()
        } else {
            match hash::decode(&metadata.source_hash) {
                Ok(ids) => ids,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "unreadable source hash, treating note as tracking no highlights"
                    );
                    Vec::new()
                }
            }
        };

        Ok(ParsedNote {
            path: path.to_path_buf(),
            metadata,
            sections: sections::parse_content(body),
            highlight_ids,
            raw,
        })
    }

    fn generate(&self, bookmark: &Bookmark, highlights: &[Highlight]) -> Result<NoteOperation> {
        generate::generate(self, bookmark, highlights)
    }

    fn update(
        &self,
        existing: &ParsedNote,
        bookmark: &Bookmark,
        highlights: &[Highlight],
    ) -> Result<Option<NoteOperation>> {
        update::update(self, existing, bookmark, highlights)
    }
}
