//! Heading-delimited sections of a note body
//!
//! Only two markdown constructs matter here: ATX headings (`#` to `######`
//! followed by whitespace) and fenced code blocks (a line whose trimmed form
//! starts with three backticks toggles the fence). Everything else is opaque
//! content. Splitting is lossless: rendering the parsed sections reproduces
//! the input byte for byte.

use std::fmt;

/// Heading level of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeadingLevel {
    /// Content before the first heading
    None,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// Level for a run of `#` characters, if it is a valid heading depth
    pub fn from_depth(depth: usize) -> Option<Self> {
        match depth {
            1 => Some(HeadingLevel::H1),
            2 => Some(HeadingLevel::H2),
            3 => Some(HeadingLevel::H3),
            4 => Some(HeadingLevel::H4),
            5 => Some(HeadingLevel::H5),
            6 => Some(HeadingLevel::H6),
            _ => None,
        }
    }

    /// Number of `#` characters (0 for [`HeadingLevel::None`])
    pub fn depth(self) -> usize {
        match self {
            HeadingLevel::None => 0,
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
            HeadingLevel::H5 => 5,
            HeadingLevel::H6 => 6,
        }
    }
}

/// One heading and the content up to the next heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub level: HeadingLevel,
    /// Trimmed heading text (empty for [`HeadingLevel::None`])
    pub title: String,
    /// Everything after the heading line, line terminators included
    pub content: String,
    /// Heading line exactly as read, including its terminator
    heading: String,
}

impl Section {
    /// Build a section with a canonical `## Title` heading line
    pub fn new(level: HeadingLevel, title: impl Into<String>, content: impl Into<String>) -> Self {
        let title = title.into();
        let heading = match level {
            HeadingLevel::None => String::new(),
            level => format!("{} {}\n", "#".repeat(level.depth()), title),
        };
        Section {
            level,
            title,
            content: content.into(),
            heading,
        }
    }

    /// A heading-less section holding leading content
    pub fn preamble(content: impl Into<String>) -> Self {
        Section::new(HeadingLevel::None, "", content)
    }

    /// The heading line as it will be rendered
    pub fn heading_line(&self) -> &str {
        &self.heading
    }

    /// Whether this is a level-2 section with the given title
    pub fn is_h2(&self, title: &str) -> bool {
        self.level == HeadingLevel::H2 && self.title == title
    }

    /// Append trailing paragraphs, separated from existing content by one blank line
    pub fn append_paragraphs(&mut self, paragraphs: &str) {
        if self.content.trim().is_empty() {
            self.content = String::from("\n");
        } else {
            let kept = self.content.trim_end().len();
            self.content.truncate(kept);
            self.content.push_str("\n\n");
        }
        self.content.push_str(paragraphs);
    }

    /// Whether the rendered section ends with a line terminator
    pub fn ends_with_newline(&self) -> bool {
        if self.content.is_empty() {
            self.heading.is_empty() || self.heading.ends_with('\n')
        } else {
            self.content.ends_with('\n')
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.heading, self.content)
    }
}

/// Recognize an ATX heading line, returning its level and trimmed title
fn parse_heading(line: &str) -> Option<(HeadingLevel, String)> {
    let depth = line.bytes().take_while(|&b| b == b'#').count();
    let level = HeadingLevel::from_depth(depth)?;
    let rest = &line[depth..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some((level, rest.trim().to_string()))
}

fn is_fence(line: &str) -> bool {
    line.trim().starts_with("```")
}

/// Split a note body into sections
pub fn parse_content(body: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = Section::preamble("");
    let mut seen_heading = false;
    let mut in_fence = false;

    for line in body.split_inclusive('\n') {
        if is_fence(line) {
            in_fence = !in_fence;
            current.content.push_str(line);
            continue;
        }

        if !in_fence {
            if let Some((level, title)) = parse_heading(line.trim_end_matches(['\n', '\r'])) {
                if seen_heading || !current.content.is_empty() {
                    sections.push(current);
                }
                current = Section {
                    level,
                    title,
                    content: String::new(),
                    heading: line.to_string(),
                };
                seen_heading = true;
                continue;
            }
        }

        current.content.push_str(line);
    }

    if seen_heading || !current.content.is_empty() {
        sections.push(current);
    }
    sections
}

/// Reassemble sections into a body
pub fn render(sections: &[Section]) -> String {
    sections.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headings_and_levels() {
        let body = "# Title\n\nintro\n\n## Key takeaways\n\nA\n\n### Deep\nB\n";
        let sections = parse_content(body);

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].level, HeadingLevel::H1);
        assert_eq!(sections[0].title, "Title");
        assert_eq!(sections[0].content, "\nintro\n\n");
        assert_eq!(sections[1].level, HeadingLevel::H2);
        assert_eq!(sections[1].title, "Key takeaways");
        assert_eq!(sections[1].content, "\nA\n\n");
        assert_eq!(sections[2].level, HeadingLevel::H3);
        assert_eq!(sections[2].content, "B\n");
    }

    #[test]
    fn test_preamble_only_when_non_empty() {
        let sections = parse_content("# Title\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].level, HeadingLevel::H1);

        let sections = parse_content("loose text\n# Title\n");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].level, HeadingLevel::None);
        assert_eq!(sections[0].content, "loose text\n");
    }

    #[test]
    fn test_empty_body_has_no_sections() {
        assert!(parse_content("").is_empty());
    }

    #[test]
    fn test_body_without_headings_is_one_section() {
        let sections = parse_content("just text\n\nmore\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].level, HeadingLevel::None);
    }

    #[test]
    fn test_trailing_heading_without_content_is_kept() {
        let sections = parse_content("# A\ntext\n## Empty");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].title, "Empty");
        assert_eq!(sections[1].content, "");
    }

    #[test]
    fn test_heading_requires_whitespace_and_depth() {
        let sections = parse_content("#hashtag\n####### seven\n##\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].level, HeadingLevel::None);
    }

    #[test]
    fn test_heading_title_is_trimmed() {
        let sections = parse_content("##\tSpaced   \n");
        assert_eq!(sections[0].title, "Spaced");
        assert_eq!(sections[0].heading_line(), "##\tSpaced   \n");
    }

    #[test]
    fn test_code_fence_hides_headings() {
        let body = "## Code\n```bash\n# not a heading\n## nor this\n```\n# Real\n";
        let sections = parse_content(body);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Code");
        assert_eq!(
            sections[0].content,
            "```bash\n# not a heading\n## nor this\n```\n"
        );
        assert_eq!(sections[1].title, "Real");
    }

    #[test]
    fn test_indented_fence_toggles() {
        let body = "## A\n   ```\n# hidden\n   ```\n## B\n";
        let sections = parse_content(body);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].title, "B");
    }

    #[test]
    fn test_unclosed_fence_swallows_rest() {
        let sections = parse_content("## A\n```\n# hidden\n## also hidden\n");
        assert_eq!(sections.len(), 1);
    }

    #[test]
    fn test_render_is_lossless() {
        let bodies = [
            "",
            "no newline at end",
            "\n\n# Title\n\n\n## A  \n  indented\n\n\n",
            "# T\r\n\r\nwindows\r\n## B\r\n",
            "pre\n```\n# x\n```\n### H3\n#### H4\ntext",
            "## Trailing\n\n   \n",
        ];
        for body in bodies {
            assert_eq!(render(&parse_content(body)), body);
        }
    }

    #[test]
    fn test_new_section_heading() {
        let section = Section::new(HeadingLevel::H2, "Key takeaways", "\nA\n\n");
        assert_eq!(section.to_string(), "## Key takeaways\n\nA\n\n");
        assert!(section.is_h2("Key takeaways"));
        assert!(!section.is_h2("References"));
    }

    #[test]
    fn test_append_paragraphs_to_content() {
        let mut section = Section::new(HeadingLevel::H2, "A", "\nfirst\n\n\n");
        section.append_paragraphs("second\n\n");
        assert_eq!(section.content, "\nfirst\n\nsecond\n\n");
    }

    #[test]
    fn test_append_paragraphs_to_empty_section() {
        let mut section = Section::new(HeadingLevel::H2, "A", "");
        section.append_paragraphs("only\n\n");
        assert_eq!(section.to_string(), "## A\n\nonly\n\n");
    }

    #[test]
    fn test_append_paragraphs_without_trailing_newline() {
        let mut section = Section::new(HeadingLevel::H2, "A", "\nfirst");
        section.append_paragraphs("second\n\n");
        assert_eq!(section.content, "\nfirst\n\nsecond\n\n");
    }

    #[test]
    fn test_ends_with_newline() {
        assert!(Section::new(HeadingLevel::H2, "A", "").ends_with_newline());
        assert!(!parse_content("## A\nno end")[0].ends_with_newline());
        assert!(!parse_content("## A")[0].ends_with_newline());
    }
}
