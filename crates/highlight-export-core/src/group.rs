//! Classify highlights into ordered, named categories by color

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::source::Highlight;

/// Color to category mapping and category priority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorConfig {
    /// Colors listed first, in this order
    #[serde(default = "default_order")]
    pub order: Vec<String>,
    /// Display name per color, layered over the built-in names
    #[serde(default = "default_names", deserialize_with = "merge_default_names")]
    pub names: BTreeMap<String, String>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        ColorConfig {
            order: default_order(),
            names: default_names(),
        }
    }
}

fn default_order() -> Vec<String> {
    ["green", "red", "yellow", "blue"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn default_names() -> BTreeMap<String, String> {
    [
        ("yellow", "General highlights"),
        ("red", "Thought-provoking insights"),
        ("blue", "Important references"),
        ("green", "Key takeaways"),
    ]
    .iter()
    .map(|(color, name)| (color.to_string(), name.to_string()))
    .collect()
}

fn merge_default_names<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut names = default_names();
    names.extend(BTreeMap::<String, String>::deserialize(deserializer)?);
    Ok(names)
}

/// Highlights sharing one color, in presentation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightGroup<'a> {
    pub color: String,
    pub name: String,
    pub highlights: Vec<&'a Highlight>,
}

/// Groups highlights using an explicit [`ColorConfig`]
#[derive(Debug, Clone, Default)]
pub struct HighlightGrouper {
    colors: ColorConfig,
}

impl HighlightGrouper {
    pub fn new(colors: ColorConfig) -> Self {
        HighlightGrouper { colors }
    }

    /// Display name for a color
    pub fn category_name(&self, color: &str) -> String {
        if let Some(name) = self.colors.names.get(color) {
            return name.clone();
        }

        let lower = color.to_lowercase();
        let mut chars = lower.chars();
        match chars.next() {
            Some(first) => format!("{}{} highlights", first.to_uppercase(), chars.as_str()),
            None => "Uncolored highlights".to_string(),
        }
    }

    /// Group highlights by color.
    ///
    /// Configured colors come first in configured order, the rest follow in
    /// ascending alphabetical order of color. Within a group highlights are
    /// sorted by creation time, then id.
    pub fn group<'a, I>(&self, highlights: I) -> Vec<HighlightGroup<'a>>
    where
        I: IntoIterator<Item = &'a Highlight>,
    {
        let mut by_color: BTreeMap<&'a str, Vec<&'a Highlight>> = BTreeMap::new();
        for highlight in highlights {
            by_color
                .entry(highlight.color.as_str())
                .or_default()
                .push(highlight);
        }

        let mut groups = Vec::with_capacity(by_color.len());
        for color in &self.colors.order {
            if let Some(members) = by_color.remove(color.as_str()) {
                groups.push(self.make_group(color, members));
            }
        }
        // BTreeMap iteration is already alphabetical
        for (color, members) in by_color {
            groups.push(self.make_group(color, members));
        }
        groups
    }

    fn make_group<'a>(&self, color: &str, mut highlights: Vec<&'a Highlight>) -> HighlightGroup<'a> {
        highlights.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        HighlightGroup {
            color: color.to_string(),
            name: self.category_name(color),
            highlights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn highlight(id: &str, color: &str, ts: i64) -> Highlight {
        Highlight {
            id: id.to_string(),
            text: format!("text {}", id),
            color: color.to_string(),
            created: DateTime::<Utc>::from_timestamp(ts, 0).unwrap(),
            bookmark_id: "b1".to_string(),
            href: String::new(),
            bookmark_title: String::new(),
        }
    }

    #[test]
    fn test_configured_order_then_alphabetical() {
        let highlights = vec![
            highlight("1", "purple", 1),
            highlight("2", "yellow", 1),
            highlight("3", "green", 1),
            highlight("4", "orange", 1),
            highlight("5", "red", 1),
        ];
        let grouper = HighlightGrouper::default();
        let colors: Vec<String> = grouper
            .group(&highlights)
            .into_iter()
            .map(|g| g.color)
            .collect();
        assert_eq!(colors, ["green", "red", "yellow", "orange", "purple"]);
    }

    #[test]
    fn test_names_from_table_and_fallback() {
        let grouper = HighlightGrouper::default();
        assert_eq!(grouper.category_name("green"), "Key takeaways");
        assert_eq!(grouper.category_name("purple"), "Purple highlights");
        assert_eq!(grouper.category_name("ORANGE"), "Orange highlights");
        assert_eq!(grouper.category_name(""), "Uncolored highlights");
    }

    #[test]
    fn test_within_group_sorted_by_time_then_id() {
        let highlights = vec![
            highlight("c", "red", 20),
            highlight("b", "red", 10),
            highlight("a", "red", 20),
        ];
        let groups = HighlightGrouper::default().group(&highlights);
        let ids: Vec<&str> = groups[0].highlights.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[test]
    fn test_custom_config() {
        let colors = ColorConfig {
            order: vec!["blue".to_string()],
            names: [("blue".to_string(), "Quotes".to_string())]
                .into_iter()
                .collect(),
        };
        let highlights = vec![highlight("1", "green", 1), highlight("2", "blue", 1)];
        let groups = HighlightGrouper::new(colors).group(&highlights);
        assert_eq!(groups[0].name, "Quotes");
        assert_eq!(groups[1].name, "Green highlights");
    }

    #[test]
    fn test_configured_names_extend_defaults() {
        let colors: ColorConfig =
            serde_json::from_str(r#"{"names": {"green": "Big ideas", "purple": "Questions"}}"#)
                .unwrap();
        assert_eq!(colors.names["green"], "Big ideas");
        assert_eq!(colors.names["purple"], "Questions");
        assert_eq!(colors.names["red"], "Thought-provoking insights");
        assert_eq!(colors.order, default_order());
    }

    #[test]
    fn test_empty_input() {
        assert!(HighlightGrouper::default().group(&Vec::<Highlight>::new()).is_empty());
    }
}
