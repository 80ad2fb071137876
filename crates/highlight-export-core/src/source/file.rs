//! Offline source backed by a JSON export file

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{Bookmark, Highlight, HighlightSource};
use crate::error::{ExportError, Result};

#[derive(Debug, Default, Deserialize)]
struct ExportDocument {
    #[serde(default)]
    highlights: Vec<Highlight>,
    #[serde(default)]
    bookmarks: Vec<Bookmark>,
}

/// Reads `{ "highlights": [...], "bookmarks": [...] }` from disk
#[derive(Debug)]
pub struct JsonFileSource {
    path: PathBuf,
    highlights: Vec<Highlight>,
    bookmarks: HashMap<String, Bookmark>,
}

impl JsonFileSource {
    /// Load and index an export file
    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ExportError::io_at(path, e))?;
        let mut source = Self::from_json(&content)?;
        source.path = path.to_path_buf();
        Ok(source)
    }

    /// Build a source from an in-memory JSON document
    pub fn from_json(content: &str) -> Result<Self> {
        let doc: ExportDocument = serde_json::from_str(content)?;
        let bookmarks = doc
            .bookmarks
            .into_iter()
            .map(|b| (b.id.clone(), b))
            .collect();

        Ok(JsonFileSource {
            path: PathBuf::new(),
            highlights: doc.highlights,
            bookmarks,
        })
    }
}

impl HighlightSource for JsonFileSource {
    fn fetch_highlights(&self) -> Result<Vec<Highlight>> {
        Ok(self.highlights.clone())
    }

    fn fetch_bookmark(&self, id: &str) -> Result<Bookmark> {
        self.bookmarks
            .get(id)
            .cloned()
            .ok_or_else(|| ExportError::BookmarkUnresolved {
                id: id.to_string(),
                reason: format!("not present in {}", self.path.display()),
            })
    }
}
