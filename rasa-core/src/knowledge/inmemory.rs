//! In-memory knowledge backend
//!
//! Stores topic records in a `HashMap` behind a single `RwLock`. Every append
//! holds the write lock for its whole read-stamp-push sequence.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use super::backend::{Appended, KnowledgeBackend, NewFinding};
use super::finding::{Finding, TopicInfo, TopicRecord};
use super::topic::TopicKey;
use crate::error::{RasaError, Result};

/// In-memory backend; contents are discarded when it is dropped
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeBackend {
    topics: RwLock<HashMap<TopicKey, TopicRecord>>,
}

impl InMemoryKnowledgeBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<TopicKey, TopicRecord>>> {
        self.topics
            .read()
            .map_err(|_| RasaError::Backend("knowledge store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<TopicKey, TopicRecord>>> {
        self.topics
            .write()
            .map_err(|_| RasaError::Backend("knowledge store lock poisoned".to_string()))
    }
}

impl KnowledgeBackend for InMemoryKnowledgeBackend {
    fn append(&self, key: &TopicKey, finding: NewFinding) -> Result<Appended> {
        let mut topics = self.write()?;
        let record = topics
            .entry(key.clone())
            .or_insert_with(|| TopicRecord::new(key.clone(), finding.display_topic));

        // Stamp under the lock so timestamps follow append order
        let now = Utc::now();
        let timestamp = record
            .findings
            .last()
            .map_or(now, |last| last.timestamp.max(now));

        let stored = Finding {
            topic: key.clone(),
            content: finding.content,
            timestamp,
            source: finding.source,
            sequence: record.findings.len() + 1,
        };
        record.findings.push(stored.clone());

        Ok(Appended {
            finding: stored,
            display_topic: record.display_topic.clone(),
            count: record.findings.len(),
        })
    }

    fn get(&self, key: &TopicKey) -> Result<Option<TopicRecord>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn topics(&self) -> Result<Vec<TopicInfo>> {
        let topics = self.read()?;
        let mut infos: Vec<TopicInfo> = topics
            .values()
            .map(|r| TopicInfo {
                key: r.key.clone(),
                display_topic: r.display_topic.clone(),
                count: r.findings.len(),
            })
            .collect();
        infos.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(infos)
    }

    fn records(&self) -> Result<Vec<TopicRecord>> {
        let topics = self.read()?;
        let mut records: Vec<TopicRecord> = topics.values().cloned().collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(records)
    }

    fn total_findings(&self) -> Result<usize> {
        Ok(self.read()?.values().map(TopicRecord::len).sum())
    }
}
