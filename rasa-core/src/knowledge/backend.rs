//! Knowledge backend trait for pluggable storage implementations
//!
//! The knowledge bank talks to storage only through `KnowledgeBackend`.
//! The shipped implementation is in-memory; a durable store can be injected
//! behind the same append/read contract without touching the bank.
//!
//! Backends are synchronous: every operation is a short in-memory critical
//! section, and the bank never suspends while holding storage.

use crate::error::Result;

use super::finding::{Finding, TopicInfo, TopicRecord};
use super::topic::TopicKey;

/// Outcome of a successful append
#[derive(Debug, Clone)]
pub struct Appended {
    /// The finding as stored (timestamp and sequence assigned by the backend)
    pub finding: Finding,

    /// Display spelling recorded for the topic
    pub display_topic: String,

    /// Findings under the topic after the append
    pub count: usize,
}

/// New finding handed to a backend
#[derive(Debug, Clone)]
pub struct NewFinding {
    /// Display spelling to record if the topic is new
    pub display_topic: String,

    /// Trimmed, non-empty content
    pub content: String,

    /// Trimmed, non-empty source if provided
    pub source: Option<String>,
}

/// The core knowledge backend trait
///
/// Implementations must make `append` atomic per topic: concurrent appends
/// are applied one at a time, none are lost, and timestamps within a topic
/// never decrease. Stored findings are never modified or removed.
pub trait KnowledgeBackend: Send + Sync {
    /// Append a finding under `key`, creating the topic if absent
    fn append(&self, key: &TopicKey, finding: NewFinding) -> Result<Appended>;

    /// Get the record for a topic, if any findings exist
    fn get(&self, key: &TopicKey) -> Result<Option<TopicRecord>>;

    /// List stored topics sorted by key
    fn topics(&self) -> Result<Vec<TopicInfo>>;

    /// Copy every topic record, sorted by key
    fn records(&self) -> Result<Vec<TopicRecord>>;

    /// Total findings across all topics
    fn total_findings(&self) -> Result<usize> {
        Ok(self.topics()?.iter().map(|t| t.count).sum())
    }

    /// Health check - verify the backend is operational
    fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
