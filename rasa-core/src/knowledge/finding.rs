//! Finding records and the results returned by the knowledge bank

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::topic::TopicKey;

/// A single piece of research content stored under a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Normalized topic key
    pub topic: TopicKey,

    /// The synthesized fact or note
    pub content: String,

    /// When the finding was stored; never earlier than the previous finding
    /// under the same topic
    pub timestamp: DateTime<Utc>,

    /// Provenance, e.g. the search result the finding came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// 1-based position within the topic's sequence
    pub sequence: usize,
}

/// All findings stored under one topic, in insertion order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRecord {
    /// Normalized key
    pub key: TopicKey,

    /// Spelling used by the first save under this key
    pub display_topic: String,

    /// Findings in insertion order
    pub findings: Vec<Finding>,
}

impl TopicRecord {
    pub(crate) fn new(key: TopicKey, display_topic: impl Into<String>) -> Self {
        Self {
            key,
            display_topic: display_topic.into(),
            findings: Vec::new(),
        }
    }

    /// Number of findings under this topic
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Whether the topic holds no findings
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Acknowledgement returned by `save_finding`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveReceipt {
    /// Normalized topic key the finding was stored under
    pub topic: TopicKey,

    /// Display spelling of the topic
    pub display_topic: String,

    /// Findings under the topic after this save
    pub count: usize,

    /// The stored finding
    pub finding: Finding,
}

impl SaveReceipt {
    /// Human-readable acknowledgement suitable for returning to an agent
    pub fn acknowledgement(&self) -> String {
        format!(
            "Finding successfully saved to Research Bank under topic '{}'.",
            self.display_topic
        )
    }
}

/// Result of `summarize_topic_knowledge`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSummary {
    /// Normalized topic key
    pub topic: TopicKey,

    /// Display spelling of the topic
    pub display_topic: String,

    /// Rendered summary text (the empty marker when nothing is stored)
    pub summary: String,

    /// Number of findings the summary was built from
    pub count: usize,
}

impl TopicSummary {
    /// Whether any knowledge exists for the topic
    pub fn has_knowledge(&self) -> bool {
        self.count > 0
    }
}

/// Listing entry for a stored topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicInfo {
    pub key: TopicKey,
    pub display_topic: String,
    pub count: usize,
}

/// Read-only copy of the whole bank
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeSnapshot {
    /// Topics sorted by key
    pub topics: Vec<TopicRecord>,

    /// When the snapshot was taken
    pub taken_at: Option<DateTime<Utc>>,
}

impl KnowledgeSnapshot {
    /// Total findings across all topics
    pub fn total_findings(&self) -> usize {
        self.topics.iter().map(TopicRecord::len).sum()
    }
}
