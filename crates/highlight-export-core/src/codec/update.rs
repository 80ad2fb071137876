//! Merge newly observed highlights into an existing note
//!
//! Only sections that receive new highlights change. Every other section is
//! written back exactly as it was read, and a `## References` section always
//! ends the note.

use std::collections::HashSet;

use super::generate::{derive_metadata, render_paragraphs, render_section, union, unique_by_id};
use super::MarkdownCodec;
use crate::error::{ExportError, Result};
use crate::group::HighlightGroup;
use crate::note::{frontmatter, NoteMetadata, NoteOperation, ParsedNote, Section};
use crate::source::{Bookmark, Highlight};

/// Title of the section kept at the end of every note
pub const REFERENCES: &str = "References";

pub(super) fn update(
    codec: &MarkdownCodec,
    existing: &ParsedNote,
    bookmark: &Bookmark,
    highlights: &[Highlight],
) -> Result<Option<NoteOperation>> {
    let incoming = unique_by_id(highlights);
    let known: HashSet<&str> = existing.highlight_ids.iter().map(String::as_str).collect();
    let new: Vec<&Highlight> = incoming
        .iter()
        .copied()
        .filter(|h| !known.contains(h.id.as_str()))
        .collect();

    if new.is_empty() {
        tracing::debug!(path = %existing.path.display(), "no new highlights");
        return Ok(None);
    }

    if existing.metadata.id.trim().is_empty() {
        return Err(ExportError::MissingLocalId {
            path: existing.path.clone(),
        });
    }

    let all_ids = existing
        .highlight_ids
        .iter()
        .map(String::as_str)
        .chain(incoming.iter().map(|h| h.id.as_str()));
    let metadata = merge_metadata(codec, &existing.metadata, bookmark, all_ids);

    let raw = frontmatter::overlay(&existing.raw, &metadata)?;
    let mut content = frontmatter::render(&raw)?;
    content.push_str(&merge_body(&existing.sections, codec.grouper.group(new.iter().copied())));

    tracing::debug!(
        path = %existing.path.display(),
        added = new.len(),
        "merged highlights into note"
    );

    Ok(Some(NoteOperation { metadata, content }))
}

fn merge_metadata<'a>(
    codec: &MarkdownCodec,
    existing: &NoteMetadata,
    bookmark: &Bookmark,
    highlight_ids: impl IntoIterator<Item = &'a str>,
) -> NoteMetadata {
    let fresh = derive_metadata(codec, bookmark, highlight_ids);

    NoteMetadata {
        id: existing.id.clone(),
        aliases: union(&existing.aliases, &fresh.aliases),
        tags: union(&existing.tags, &fresh.tags),
        created: existing.created,
        source_id: existing.source_id.clone(),
        authors: union(&existing.authors, &fresh.authors),
        ..fresh
    }
}

/// Rebuild the body with new highlight groups merged in
fn merge_body(sections: &[Section], groups: Vec<HighlightGroup<'_>>) -> String {
    let mut pending: Vec<Option<HighlightGroup<'_>>> = groups.into_iter().map(Some).collect();
    let mut references = Vec::new();
    let mut body = String::new();

    for section in sections {
        if section.is_h2(REFERENCES) {
            references.push(section);
            continue;
        }

        let target = pending
            .iter_mut()
            .find(|slot| matches!(slot, Some(group) if section.is_h2(&group.name)));
        match target.and_then(Option::take) {
            Some(group) => {
                let mut merged = section.clone();
                merged.append_paragraphs(&render_paragraphs(&group));
                push_section(&mut body, &merged.to_string());
            }
            None => push_section(&mut body, &section.to_string()),
        }
    }

    for group in pending.into_iter().flatten() {
        separate_paragraph(&mut body);
        body.push_str(&render_section(&group));
    }

    for section in references {
        push_section(&mut body, &section.to_string());
    }

    body
}

/// Append rendered section text, starting it on a fresh line
fn push_section(body: &mut String, text: &str) {
    if !body.is_empty() && !body.ends_with('\n') {
        body.push('\n');
    }
    body.push_str(text);
}

/// Leave exactly one blank line before new trailing content
fn separate_paragraph(body: &mut String) {
    if body.is_empty() {
        return;
    }
    if !body.ends_with('\n') {
        body.push('\n');
    }
    if !body.ends_with("\n\n") {
        body.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::HighlightGrouper;
    use crate::note::sections::{parse_content, render};
    use chrono::DateTime;

    fn highlight(id: &str, color: &str, text: &str) -> Highlight {
        Highlight {
            id: id.to_string(),
            text: text.to_string(),
            color: color.to_string(),
            created: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            bookmark_id: "b1".to_string(),
            href: String::new(),
            bookmark_title: String::new(),
        }
    }

    fn merge(body: &str, highlights: &[Highlight]) -> String {
        let grouper = HighlightGrouper::default();
        merge_body(&parse_content(body), grouper.group(highlights))
    }

    #[test]
    fn test_appends_to_matching_section() {
        let body = "# T\n\n## Key takeaways\n\nold\n\n## Important references\n\nref\n\n";
        let merged = merge(body, &[highlight("h3", "green", "new")]);
        assert_eq!(
            merged,
            "# T\n\n## Key takeaways\n\nold\n\nnew\n\n## Important references\n\nref\n\n"
        );
    }

    #[test]
    fn test_untargeted_sections_are_untouched() {
        let body = "# T\n\n## Mine\n  odd   spacing\n\n\n## Key takeaways\nold\n";
        let merged = merge(body, &[highlight("h3", "green", "new")]);
        assert!(merged.starts_with("# T\n\n## Mine\n  odd   spacing\n\n\n## Key takeaways\n"));
    }

    #[test]
    fn test_unmatched_group_becomes_new_section() {
        let body = "# T\n\n## Key takeaways\n\nold\n";
        let merged = merge(body, &[highlight("h3", "red", "spicy")]);
        assert_eq!(
            merged,
            "# T\n\n## Key takeaways\n\nold\n\n## Thought-provoking insights\n\nspicy\n\n"
        );
    }

    #[test]
    fn test_new_sections_in_category_order() {
        let merged = merge(
            "# T\n\n",
            &[highlight("1", "blue", "b"), highlight("2", "green", "g")],
        );
        let green = merged.find("## Key takeaways").unwrap();
        let blue = merged.find("## Important references").unwrap();
        assert!(green < blue);
    }

    #[test]
    fn test_references_moves_last() {
        let body = "# T\n\n## References\n\n- link\n\n## Key takeaways\n\nold\n";
        let merged = merge(body, &[highlight("1", "red", "new")]);
        assert_eq!(
            merged,
            "# T\n\n## Key takeaways\n\nold\n\n## Thought-provoking insights\n\nnew\n\n## References\n\n- link\n\n"
        );
    }

    #[test]
    fn test_references_is_never_a_target() {
        let colors = crate::group::ColorConfig {
            order: vec![],
            names: [("grey".to_string(), REFERENCES.to_string())]
                .into_iter()
                .collect(),
        };
        let grouper = HighlightGrouper::new(colors);
        let body = "# T\n\n## References\n\n- link\n";
        let merged = merge_body(
            &parse_content(body),
            grouper.group(&[highlight("1", "grey", "quote")]),
        );
        assert_eq!(merged, "# T\n\n## References\n\nquote\n\n## References\n\n- link\n");
    }

    #[test]
    fn test_only_first_matching_section_receives_highlights() {
        let body = "## Key takeaways\n\na\n\n## Key takeaways\n\nb\n";
        let merged = merge(body, &[highlight("1", "green", "new")]);
        assert_eq!(
            merged,
            "## Key takeaways\n\na\n\nnew\n\n## Key takeaways\n\nb\n"
        );
    }

    #[test]
    fn test_missing_trailing_newline_is_repaired_before_new_content() {
        let merged = merge("# T\n\nend", &[highlight("1", "green", "new")]);
        assert_eq!(merged, "# T\n\nend\n\n## Key takeaways\n\nnew\n\n");
    }

    #[test]
    fn test_no_groups_renders_unchanged() {
        let body = "# T\n\n## References\n\nx\n";
        let sections = parse_content(body);
        assert_eq!(merge_body(&sections, Vec::new()), render(&sections));
    }
}
