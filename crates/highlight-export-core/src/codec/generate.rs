//! Content for brand-new notes

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::MarkdownCodec;
use crate::error::Result;
use crate::group::HighlightGroup;
use crate::hash;
use crate::note::{frontmatter, id, NoteMetadata, NoteOperation};
use crate::source::{Bookmark, Highlight};

pub(super) fn generate(
    codec: &MarkdownCodec,
    bookmark: &Bookmark,
    highlights: &[Highlight],
) -> Result<NoteOperation> {
    let highlights = unique_by_id(highlights);
    let now = (codec.clock)();

    let metadata = NoteMetadata {
        id: id::local_id(&bookmark.title, now),
        created: Some(bookmark.created),
        ..derive_metadata(codec, bookmark, highlights.iter().map(|h| h.id.as_str()))
    };

    let mut content = frontmatter::render(&metadata)?;
    content.push_str(&format!("# {}\n\n", display_title(bookmark)));

    let description = bookmark.description.trim();
    if !description.is_empty() {
        content.push_str(description);
        content.push_str("\n\n");
    }

    for group in codec.grouper.group(highlights.iter().copied()) {
        content.push_str(&render_section(&group));
    }

    tracing::debug!(
        bookmark_id = %bookmark.id,
        note_id = %metadata.id,
        highlights = highlights.len(),
        "generated note"
    );

    Ok(NoteOperation { metadata, content })
}

/// Metadata fields that follow the bookmark.
///
/// Identity fields (`id`, `created`) are left empty for the caller to fill.
pub(super) fn derive_metadata<'a>(
    codec: &MarkdownCodec,
    bookmark: &Bookmark,
    highlight_ids: impl IntoIterator<Item = &'a str>,
) -> NoteMetadata {
    let title = bookmark.title.trim();
    let aliases = if title.is_empty() {
        Vec::new()
    } else {
        vec![title.to_string()]
    };

    NoteMetadata {
        id: String::new(),
        aliases,
        tags: union(&codec.base_tags, &bookmark.labels),
        created: None,
        source_id: bookmark.id.clone(),
        source_hash: hash::encode_set(highlight_ids),
        source_url: bookmark.href.clone(),
        media: bookmark.title.clone(),
        media_type: bookmark.kind.clone(),
        media_published: bookmark.published,
        media_url: bookmark.url.clone(),
        authors: bookmark.authors.clone(),
    }
}

/// `## Category` heading followed by one paragraph per highlight
pub(super) fn render_section(group: &HighlightGroup<'_>) -> String {
    format!("## {}\n\n{}", group.name, render_paragraphs(group))
}

pub(super) fn render_paragraphs(group: &HighlightGroup<'_>) -> String {
    group
        .highlights
        .iter()
        .map(|h| format!("{}\n\n", h.text.trim()))
        .collect()
}

/// First-seen union of two lists, dropping blanks and repeats
pub(super) fn union(first: &[String], second: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    first
        .iter()
        .chain(second)
        .filter(|item| !item.trim().is_empty())
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

/// Drop repeated highlight ids, keeping the first occurrence
pub(super) fn unique_by_id(highlights: &[Highlight]) -> Vec<&Highlight> {
    let mut seen = HashSet::new();
    highlights
        .iter()
        .filter(|h| seen.insert(h.id.as_str()))
        .collect()
}

fn display_title(bookmark: &Bookmark) -> &str {
    let title = bookmark.title.trim();
    if title.is_empty() {
        "Untitled"
    } else {
        title
    }
}

/// Wall clock used for new local ids
pub(super) fn system_clock() -> DateTime<Utc> {
    Utc::now()
}
