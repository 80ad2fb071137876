//! Upstream highlight records and the sources that provide them
//!
//! Field names follow the Readeck API so the same types deserialize both the
//! HTTP responses and offline JSON exports.

pub mod file;
pub mod readeck;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

pub use file::JsonFileSource;
pub use readeck::{ReadeckClient, ReadeckSettings};

/// A highlighted excerpt belonging to exactly one bookmark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    /// Source-assigned id, stable across fetches
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    /// Color tag, mapped to a category by the grouper
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    #[serde(default)]
    pub created: DateTime<Utc>,
    /// Parent bookmark id
    pub bookmark_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub href: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bookmark_title: String,
}

/// A saved article that highlights hang off
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    /// Document type (article, video, ...)
    #[serde(rename = "document_type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Archive location in the highlight service
    #[serde(default, deserialize_with = "null_as_default")]
    pub href: String,
    /// Original site location
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default)]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
}

/// Anything that can hand out highlights and resolve their bookmarks
pub trait HighlightSource {
    /// Fetch every highlight, oldest first
    fn fetch_highlights(&self) -> Result<Vec<Highlight>>;

    /// Resolve a bookmark by id
    fn fetch_bookmark(&self, id: &str) -> Result<Bookmark>;
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_from_api_json() {
        let json = r#"{
            "id": "h1",
            "href": "https://readeck.example/api/bookmarks/b1/annotations/h1",
            "text": "Some text",
            "created": "2025-03-26T14:00:00Z",
            "color": "yellow",
            "bookmark_id": "b1",
            "bookmark_title": "A title",
            "bookmark_site_name": "example.com"
        }"#;
        let h: Highlight = serde_json::from_str(json).unwrap();
        assert_eq!(h.id, "h1");
        assert_eq!(h.color, "yellow");
        assert_eq!(h.bookmark_id, "b1");
        assert_eq!(h.created.timestamp(), 1_742_997_600);
    }

    #[test]
    fn test_bookmark_tolerates_nulls() {
        let json = r#"{
            "id": "b1",
            "title": "Rework",
            "authors": null,
            "labels": ["books"],
            "document_type": "article",
            "url": "https://site.example",
            "created": "2025-03-26T14:00:00Z",
            "published": null
        }"#;
        let b: Bookmark = serde_json::from_str(json).unwrap();
        assert!(b.authors.is_empty());
        assert_eq!(b.labels, vec!["books"]);
        assert_eq!(b.kind, "article");
        assert!(b.published.is_none());
        assert!(b.description.is_empty());
    }
}
