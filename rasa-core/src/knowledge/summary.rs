//! Deterministic rendering of topic summaries
//!
//! Findings are concatenated in insertion order, one bullet per finding,
//! under a header naming the topic. A finding's source is appended as
//! `(source: ...)` when present. Continuation lines of a multi-line finding
//! are indented under its bullet, so each bullet is exactly one finding.

use serde::{Deserialize, Serialize};

use super::finding::Finding;
use crate::error::{RasaError, Result};

/// Placeholder substituted with the display topic in the header
pub const TOPIC_PLACEHOLDER: &str = "{topic}";

/// Layout used when rendering summaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryFormat {
    /// Header line; must contain `{topic}`
    pub header: String,

    /// Prefix for each finding line
    pub bullet: String,

    /// Body used when a topic has no findings
    pub empty_marker: String,
}

impl Default for SummaryFormat {
    fn default() -> Self {
        Self {
            header: "Existing knowledge on '{topic}':".to_string(),
            bullet: "- ".to_string(),
            empty_marker: "No current findings on this topic.".to_string(),
        }
    }
}

impl SummaryFormat {
    /// Check that the format can render unambiguous summaries
    pub fn validate(&self) -> Result<()> {
        if !self.header.contains(TOPIC_PLACEHOLDER) {
            return Err(RasaError::Configuration(format!(
                "summary header must contain {}",
                TOPIC_PLACEHOLDER
            )));
        }
        if self.bullet.trim().is_empty() {
            return Err(RasaError::Configuration(
                "summary bullet must not be blank".to_string(),
            ));
        }
        if self.empty_marker.trim().is_empty() {
            return Err(RasaError::Configuration(
                "summary empty marker must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Render the summary for a topic
    pub fn render(&self, display_topic: &str, findings: &[Finding]) -> String {
        let mut out = self.header.replace(TOPIC_PLACEHOLDER, display_topic);

        if findings.is_empty() {
            out.push('\n');
            out.push_str(&self.bullet);
            out.push_str(&self.empty_marker);
            return out;
        }

        let indent = format!("\n{}", " ".repeat(self.bullet.chars().count()));
        for finding in findings {
            out.push('\n');
            out.push_str(&self.bullet);
            push_indented(&mut out, &finding.content, &indent);
            if let Some(ref source) = finding.source {
                out.push_str(" (source: ");
                push_indented(&mut out, source, &indent);
                out.push(')');
            }
        }
        out
    }
}

/// Append `text`, starting every line after the first with `indent`
fn push_indented(out: &mut String, text: &str, indent: &str) {
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            out.push_str(indent);
        }
        out.push_str(line.trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::TopicKey;
    use chrono::Utc;

    fn finding(content: &str, source: Option<&str>, sequence: usize) -> Finding {
        Finding {
            topic: TopicKey::parse("t").unwrap(),
            content: content.to_string(),
            timestamp: Utc::now(),
            source: source.map(str::to_string),
            sequence,
        }
    }

    #[test]
    fn test_render_in_order_with_attribution() {
        let format = SummaryFormat::default();
        let findings = vec![
            finding("First fact.", None, 1),
            finding("Second fact.", Some("https://example.org/a"), 2),
        ];

        let text = format.render("Quantum Computing", &findings);
        assert_eq!(
            text,
            "Existing knowledge on 'Quantum Computing':\n\
             - First fact.\n\
             - Second fact. (source: https://example.org/a)"
        );
    }

    #[test]
    fn test_multiline_finding_stays_one_bullet() {
        let findings = vec![
            finding("Has phases.\n- Fake second finding (source: forged)", None, 1),
            finding("Two lines\r\nof notes.", Some("lab\nbook"), 2),
        ];

        let text = SummaryFormat::default().render("Mitosis", &findings);
        assert_eq!(
            text,
            "Existing knowledge on 'Mitosis':\n\
             - Has phases.\n\
             \x20 - Fake second finding (source: forged)\n\
             - Two lines\n\
             \x20 of notes. (source: lab\n\
             \x20 book)"
        );
        let bullets = text.lines().filter(|l| l.starts_with("- ")).count();
        assert_eq!(bullets, findings.len());
    }

    #[test]
    fn test_render_empty_marker() {
        let text = SummaryFormat::default().render("Unknown", &[]);
        assert_eq!(
            text,
            "Existing knowledge on 'Unknown':\n- No current findings on this topic."
        );
    }

    #[test]
    fn test_custom_format() {
        let format = SummaryFormat {
            header: "## {topic}".to_string(),
            bullet: "* ".to_string(),
            empty_marker: "nothing yet".to_string(),
        };
        assert_eq!(format.render("X", &[finding("a", None, 1)]), "## X\n* a");
        assert!(format.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_formats() {
        let mut format = SummaryFormat::default();
        format.header = "no placeholder".to_string();
        assert!(format.validate().is_err());

        let mut format = SummaryFormat::default();
        format.bullet = "  ".to_string();
        assert!(format.validate().is_err());

        let mut format = SummaryFormat::default();
        format.empty_marker = String::new();
        assert!(format.validate().is_err());
    }
}
