//! Required structure of the final answer

use crate::core::string::labeled_line;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REQUIRED_SECTIONS: &[&str] = &["Summary", "Final Answer"];

/// Section headers the final answer must contain.
///
/// A section counts as present when a line is a markdown heading with its
/// name (`# Summary`, `## Final Answer`) or starts with `Name:`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalAnswerSchema {
    pub required_sections: Vec<String>,
}

impl Default for FinalAnswerSchema {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIRED_SECTIONS.iter().copied())
    }
}

impl FinalAnswerSchema {
    pub fn new<I, S>(sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_sections: sections
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.trim().is_empty())
                .collect(),
        }
    }

    /// Required sections not found in `text`, in schema order
    pub fn missing_sections(&self, text: &str) -> Vec<String> {
        self.required_sections
            .iter()
            .filter(|section| !text.lines().any(|line| is_section_header(line, section)))
            .cloned()
            .collect()
    }
}

fn is_section_header(line: &str, section: &str) -> bool {
    let trimmed = line.trim();

    if let Some(heading) = trimmed.strip_prefix('#') {
        let title = heading
            .trim_start_matches('#')
            .trim()
            .trim_end_matches(':')
            .trim_matches(|c: char| matches!(c, '*' | '_'))
            .trim_end_matches(':')
            .trim();
        return title.eq_ignore_ascii_case(section);
    }

    labeled_line(trimmed).is_some_and(|(label, _)| label.eq_ignore_ascii_case(section))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sections() {
        let schema = FinalAnswerSchema::default();
        assert_eq!(schema.required_sections, vec!["Summary", "Final Answer"]);
    }

    #[test]
    fn test_headings_satisfy_schema() {
        let schema = FinalAnswerSchema::default();
        let text = "# Summary\nWe agreed.\n\n## Final Answer\nUse a B-tree.";
        assert!(schema.missing_sections(text).is_empty());
    }

    #[test]
    fn test_label_lines_satisfy_schema() {
        let schema = FinalAnswerSchema::default();
        let text = "Summary: we agreed.\n**Final Answer**: use a B-tree.";
        assert!(schema.missing_sections(text).is_empty());
    }

    #[test]
    fn test_missing_sections_reported_in_order() {
        let schema = FinalAnswerSchema::new(["Summary", "Risks", "Final Answer"]);
        let text = "## final answer\nShip it.";
        assert_eq!(schema.missing_sections(text), vec!["Summary", "Risks"]);
    }

    #[test]
    fn test_mention_in_prose_is_not_a_header() {
        let schema = FinalAnswerSchema::new(["Summary"]);
        assert_eq!(
            schema.missing_sections("In summary, we agreed."),
            vec!["Summary"]
        );
    }

    #[test]
    fn test_blank_sections_dropped() {
        let schema = FinalAnswerSchema::new(["Summary", "  "]);
        assert_eq!(schema.required_sections, vec!["Summary"]);
    }
}
