//! Note model: frontmatter, body sections and local ids

pub mod frontmatter;
pub mod id;
pub mod sections;

use std::path::PathBuf;

use serde_yaml::Mapping;

use crate::error::Result;

pub use frontmatter::NoteMetadata;
pub use sections::{HeadingLevel, Section};

/// A note read from disk, alive for a single run
#[derive(Debug, Clone)]
pub struct ParsedNote {
    pub path: PathBuf,
    pub metadata: NoteMetadata,
    pub sections: Vec<Section>,
    /// Highlight ids decoded from the source hash
    pub highlight_ids: Vec<String>,
    /// Frontmatter exactly as parsed, including keys we do not own
    pub raw: Mapping,
}

impl ParsedNote {
    /// Reassembled body text
    pub fn body(&self) -> String {
        sections::render(&self.sections)
    }

    /// Whether the note already carries this highlight id
    pub fn tracks(&self, highlight_id: &str) -> bool {
        self.highlight_ids.iter().any(|id| id == highlight_id)
    }
}

/// Final metadata and file content produced by the codec
#[derive(Debug, Clone, PartialEq)]
pub struct NoteOperation {
    pub metadata: NoteMetadata,
    pub content: String,
}

impl NoteOperation {
    /// File name for this note, `<local id>.<ext>`
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.metadata.id, extension)
    }

    /// The same note under another local id
    pub fn with_id(&self, id: impl Into<String>) -> Result<NoteOperation> {
        let body = frontmatter::split(&self.content).map_or("", |(_, body)| body);
        let metadata = NoteMetadata {
            id: id.into(),
            ..self.metadata.clone()
        };

        let mut content = frontmatter::render(&metadata)?;
        content.push_str(body);
        Ok(NoteOperation { metadata, content })
    }
}
