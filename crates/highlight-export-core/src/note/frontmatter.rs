use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{ExportError, Result};
use crate::source::null_as_default;

/// Keys owned by [`NoteMetadata`]. Everything else in a frontmatter block
/// belongs to the user and is carried through untouched.
pub const KNOWN_KEYS: [&str; 12] = [
    "id",
    "aliases",
    "tags",
    "created",
    "source-id",
    "source-hash",
    "source-url",
    "media",
    "media-type",
    "media-published",
    "media-url",
    "authors",
];

/// Note frontmatter (YAML header)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NoteMetadata {
    /// Local id, also the file stem. Never changes once assigned.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub aliases: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
    #[serde(default, with = "simple_time", skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Bookmark id this note was generated from (required)
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_id: String,
    /// Token over every highlight id merged into the note
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_hash: String,
    /// Archive location in the highlight service
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub source_url: String,
    /// Title of the highlighted media
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub media: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub media_type: String,
    #[serde(default, with = "simple_time", skip_serializing_if = "Option::is_none")]
    pub media_published: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub media_url: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub authors: Vec<String>,
}

/// Timestamps are written as `YYYY-MM-DD HH:MM`; RFC 3339 is accepted on read.
mod simple_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M";

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&time.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        let raw = match raw.as_deref().map(str::trim) {
            None | Some("") => return Ok(None),
            Some(raw) => raw,
        };

        if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Some(time.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(raw, FORMAT)
            .map(|naive| Some(naive.and_utc()))
            .map_err(|_| {
                serde::de::Error::custom(format!(
                    "time must be in format YYYY-MM-DD HH:MM or RFC 3339, got: {}",
                    raw
                ))
            })
    }
}

/// Split file content into its YAML block and the verbatim body.
///
/// The block must open on the first line with `---` and close with a line
/// that is exactly `---`. Returns `None` when either delimiter is missing.
pub fn split(content: &str) -> Option<(&str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parse a YAML block into typed metadata plus the raw mapping it came from
#[tracing::instrument(skip(yaml), fields(path = %path.display()))]
pub fn parse_metadata(yaml: &str, path: &Path) -> Result<(NoteMetadata, Mapping)> {
    let invalid = |reason: String| ExportError::InvalidFrontmatter {
        path: path.to_path_buf(),
        reason,
    };

    let raw = match serde_yaml::from_str::<Value>(yaml).map_err(|e| invalid(e.to_string()))? {
        Value::Mapping(mapping) => mapping,
        Value::Null => Mapping::new(),
        _ => return Err(invalid("frontmatter is not a mapping".to_string())),
    };

    let metadata: NoteMetadata = serde_yaml::from_value(Value::Mapping(raw.clone()))
        .map_err(|e| invalid(e.to_string()))?;

    if metadata.source_id.trim().is_empty() {
        return Err(invalid("missing required field: source-id".to_string()));
    }

    Ok((metadata, raw))
}

/// Lay regenerated metadata over a raw mapping.
///
/// Known keys take the regenerated value in their original position (or are
/// dropped when the new metadata no longer carries them); unknown keys are
/// copied as-is; known keys new to the mapping are appended.
pub fn overlay(raw: &Mapping, metadata: &NoteMetadata) -> Result<Mapping> {
    let fresh = match serde_yaml::to_value(metadata)? {
        Value::Mapping(mapping) => mapping,
        _ => Mapping::new(),
    };

    let mut merged = Mapping::new();
    for (key, value) in raw {
        match key.as_str() {
            Some(name) if KNOWN_KEYS.contains(&name) => {
                if let Some(value) = fresh.get(key) {
                    merged.insert(key.clone(), value.clone());
                }
            }
            _ => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    for (key, value) in &fresh {
        if !merged.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }

    Ok(merged)
}

/// Render a frontmatter block including both delimiters
pub fn render<T: Serialize>(metadata: &T) -> Result<String> {
    let yaml = serde_yaml::to_string(metadata)?;
    Ok(format!("---\n{}---\n", yaml))
}
