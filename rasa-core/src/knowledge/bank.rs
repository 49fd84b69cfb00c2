//! The research knowledge bank (long-term memory)

use chrono::Utc;
use std::sync::Arc;

use super::backend::{KnowledgeBackend, NewFinding};
use super::finding::{Finding, KnowledgeSnapshot, SaveReceipt, TopicInfo, TopicSummary};
use super::inmemory::InMemoryKnowledgeBackend;
use super::summary::SummaryFormat;
use super::topic::{TopicKey, display_form};
use crate::config::{KnowledgeConfig, SeedFinding};
use crate::error::{RasaError, Result};
use crate::events::{HookRegistry, KnowledgeEvent, KnowledgeHook};

/// Append-only store of research findings grouped by topic
///
/// The bank is constructed explicitly and shared by reference (usually an
/// `Arc`) with the tools and agents that need it. It is populated only
/// through [`save_finding`](Self::save_finding) and read through
/// [`summarize_topic_knowledge`](Self::summarize_topic_knowledge); findings
/// are never edited or removed.
pub struct KnowledgeBank {
    backend: Arc<dyn KnowledgeBackend>,
    format: SummaryFormat,
    hooks: HookRegistry,
}

impl std::fmt::Debug for KnowledgeBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBank")
            .field("format", &self.format)
            .field("hooks", &self.hooks)
            .finish()
    }
}

impl Default for KnowledgeBank {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBank {
    /// Create an empty in-memory bank with the default summary format
    pub fn new() -> Self {
        Self {
            backend: Arc::new(InMemoryKnowledgeBackend::new()),
            format: SummaryFormat::default(),
            hooks: HookRegistry::default(),
        }
    }

    /// Start building a bank
    pub fn builder() -> KnowledgeBankBuilder {
        KnowledgeBankBuilder::new()
    }

    /// Build an in-memory bank from configuration, saving any seed findings
    pub fn from_config(config: &KnowledgeConfig) -> Result<Self> {
        Self::builder()
            .format(config.summary_format())
            .seed(config.seed.clone())
            .build()
    }

    /// Save a finding under a topic
    ///
    /// The topic is normalized (trimmed, whitespace collapsed, lowercased)
    /// and the finding is appended to that topic's sequence, creating it if
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `topic` or `content` is empty or
    /// whitespace-only.
    pub fn save_finding(
        &self,
        topic: &str,
        content: &str,
        source: Option<&str>,
    ) -> Result<SaveReceipt> {
        let key = TopicKey::parse(topic)?;
        let content = content.trim();
        if content.is_empty() {
            return Err(RasaError::blank("content"));
        }
        let source = source
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let appended = self.backend.append(
            &key,
            NewFinding {
                display_topic: display_form(topic),
                content: content.to_string(),
                source,
            },
        )?;

        self.hooks.dispatch(&KnowledgeEvent::FindingSaved {
            topic: key.to_string(),
            content_len: appended.finding.content.len(),
            count: appended.count,
            has_source: appended.finding.source.is_some(),
            timestamp: appended.finding.timestamp,
        });

        Ok(SaveReceipt {
            topic: key,
            display_topic: appended.display_topic,
            count: appended.count,
            finding: appended.finding,
        })
    }

    /// Summarize everything known about a topic
    ///
    /// Findings are concatenated in insertion order. An unknown topic yields
    /// the "no current findings" summary with a count of zero, not an error.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `topic` is empty or whitespace-only.
    pub fn summarize_topic_knowledge(&self, topic: &str) -> Result<TopicSummary> {
        let key = TopicKey::parse(topic)?;

        let (display_topic, findings) = match self.backend.get(&key)? {
            Some(record) => (record.display_topic, record.findings),
            None => (display_form(topic), Vec::new()),
        };

        let summary = self.format.render(&display_topic, &findings);
        let count = findings.len();

        self.hooks.dispatch(&KnowledgeEvent::KnowledgeRead {
            topic: key.to_string(),
            count,
            timestamp: Utc::now(),
        });

        Ok(TopicSummary {
            topic: key,
            display_topic,
            summary,
            count,
        })
    }

    /// Findings stored under a topic, in insertion order
    pub fn findings(&self, topic: &str) -> Result<Vec<Finding>> {
        let key = TopicKey::parse(topic)?;
        Ok(self
            .backend
            .get(&key)?
            .map(|r| r.findings)
            .unwrap_or_default())
    }

    /// Number of findings stored under a topic
    pub fn finding_count(&self, topic: &str) -> Result<usize> {
        let key = TopicKey::parse(topic)?;
        Ok(self.backend.get(&key)?.map_or(0, |r| r.len()))
    }

    /// Stored topics sorted by key
    pub fn topics(&self) -> Result<Vec<TopicInfo>> {
        self.backend.topics()
    }

    /// Total findings across all topics
    pub fn total_findings(&self) -> Result<usize> {
        self.backend.total_findings()
    }

    /// Read-only copy of the whole bank
    pub fn snapshot(&self) -> Result<KnowledgeSnapshot> {
        Ok(KnowledgeSnapshot {
            topics: self.backend.records()?,
            taken_at: Some(Utc::now()),
        })
    }

    /// The summary layout in use
    pub fn format(&self) -> &SummaryFormat {
        &self.format
    }

    /// End the bank's lifecycle, returning its final contents
    ///
    /// Nothing is persisted; the snapshot is the caller's last view of the
    /// findings before the bank is dropped.
    pub fn shutdown(&self) -> Result<KnowledgeSnapshot> {
        let snapshot = self.snapshot()?;
        tracing::info!(
            topics = snapshot.topics.len(),
            findings = snapshot.total_findings(),
            "Knowledge bank shut down"
        );
        Ok(snapshot)
    }
}

/// Builder for [`KnowledgeBank`]
pub struct KnowledgeBankBuilder {
    backend: Option<Arc<dyn KnowledgeBackend>>,
    format: SummaryFormat,
    hooks: HookRegistry,
    seed: Vec<SeedFinding>,
}

impl Default for KnowledgeBankBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBankBuilder {
    /// Create a builder with the in-memory backend and logging hook
    pub fn new() -> Self {
        Self {
            backend: None,
            format: SummaryFormat::default(),
            hooks: HookRegistry::default(),
            seed: Vec::new(),
        }
    }

    /// Use a specific storage backend
    pub fn backend(mut self, backend: Arc<dyn KnowledgeBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the summary layout
    pub fn format(mut self, format: SummaryFormat) -> Self {
        self.format = format;
        self
    }

    /// Register an additional observer
    pub fn hook(mut self, hook: Arc<dyn KnowledgeHook>) -> Self {
        self.hooks.register(hook);
        self
    }

    /// Replace the hook registry (drops the default logging hook)
    pub fn hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    /// Findings to save once the bank is built
    pub fn seed(mut self, seed: Vec<SeedFinding>) -> Self {
        self.seed = seed;
        self
    }

    /// Build the bank
    ///
    /// Seed findings go through `save_finding` like any other write.
    pub fn build(self) -> Result<KnowledgeBank> {
        self.format.validate()?;

        let backend = match self.backend {
            Some(backend) => backend,
            None => Arc::new(InMemoryKnowledgeBackend::new()),
        };
        backend.health_check()?;

        let bank = KnowledgeBank {
            backend,
            format: self.format,
            hooks: self.hooks,
        };

        for seed in &self.seed {
            bank.save_finding(&seed.topic, &seed.content, seed.source.as_deref())?;
        }

        tracing::info!(seeded = self.seed.len(), "Knowledge bank initialized");
        Ok(bank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<KnowledgeEvent>>,
    }

    impl KnowledgeHook for Recorder {
        fn on_finding_saved(&self, event: &KnowledgeEvent) {
            self.events.lock().unwrap().push(event.clone());
        }

        fn on_knowledge_read(&self, event: &KnowledgeEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn test_save_returns_running_count() {
        let bank = KnowledgeBank::new();

        let first = bank.save_finding("Rust", "Ownership rules.", None).unwrap();
        let second = bank.save_finding("rust", "Borrowing rules.", None).unwrap();
        let other = bank.save_finding("Go", "Goroutines.", None).unwrap();

        assert_eq!(first.count, 1);
        assert_eq!(second.count, 2);
        assert_eq!(other.count, 1);
        assert_eq!(second.topic.as_str(), "rust");
        assert_eq!(
            second.acknowledgement(),
            "Finding successfully saved to Research Bank under topic 'Rust'."
        );
    }

    #[test]
    fn test_save_rejects_blank_fields() {
        let bank = KnowledgeBank::new();

        assert!(bank.save_finding("", "x", None).unwrap_err().is_invalid_input());
        assert!(bank.save_finding("x", "", None).unwrap_err().is_invalid_input());
        assert!(bank.save_finding("  ", "x", None).unwrap_err().is_invalid_input());
        assert!(bank.save_finding("x", "\n\t", None).unwrap_err().is_invalid_input());
        assert_eq!(bank.total_findings().unwrap(), 0);
    }

    #[test]
    fn test_save_trims_content_and_drops_blank_source() {
        let bank = KnowledgeBank::new();

        let receipt = bank.save_finding("Topic", "  padded  ", Some("   ")).unwrap();
        assert_eq!(receipt.finding.content, "padded");
        assert_eq!(receipt.finding.source, None);

        let receipt = bank
            .save_finding("Topic", "sourced", Some(" https://example.org "))
            .unwrap();
        assert_eq!(receipt.finding.source.as_deref(), Some("https://example.org"));
    }

    #[test]
    fn test_summarize_unknown_topic() {
        let bank = KnowledgeBank::new();

        let summary = bank.summarize_topic_knowledge("  Dark Matter ").unwrap();
        assert!(!summary.has_knowledge());
        assert_eq!(summary.count, 0);
        assert_eq!(summary.display_topic, "Dark Matter");
        assert!(summary.summary.contains("No current findings on this topic."));
    }

    #[test]
    fn test_summarize_rejects_blank_topic() {
        let bank = KnowledgeBank::new();
        assert!(
            bank.summarize_topic_knowledge(" ")
                .unwrap_err()
                .is_invalid_input()
        );
    }

    #[test]
    fn test_summarize_preserves_order_and_sources() {
        let bank = KnowledgeBank::new();
        bank.save_finding("Photosynthesis", "Uses chlorophyll.", None).unwrap();
        bank.save_finding(" photosynthesis ", "Produces oxygen.", Some("textbook"))
            .unwrap();

        let summary = bank.summarize_topic_knowledge("PHOTOSYNTHESIS").unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(
            summary.summary,
            "Existing knowledge on 'Photosynthesis':\n\
             - Uses chlorophyll.\n\
             - Produces oxygen. (source: textbook)"
        );
    }

    #[test]
    fn test_summarize_does_not_mutate() {
        let bank = KnowledgeBank::new();
        bank.save_finding("a", "one", None).unwrap();

        bank.summarize_topic_knowledge("a").unwrap();
        bank.summarize_topic_knowledge("b").unwrap();

        assert_eq!(bank.total_findings().unwrap(), 1);
        assert_eq!(bank.topics().unwrap().len(), 1);
    }

    #[test]
    fn test_hooks_receive_observability_records() {
        let recorder = Arc::new(Recorder::default());
        let bank = KnowledgeBank::builder()
            .hook(recorder.clone())
            .build()
            .unwrap();

        bank.save_finding("Mitosis", "Mitosis has 5 phases.", None).unwrap();
        bank.summarize_topic_knowledge("mitosis").unwrap();

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        match &events[0] {
            KnowledgeEvent::FindingSaved {
                topic,
                content_len,
                count,
                ..
            } => {
                assert_eq!(topic, "mitosis");
                assert_eq!(*content_len, "Mitosis has 5 phases.".len());
                assert_eq!(*count, 1);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(
            &events[1],
            KnowledgeEvent::KnowledgeRead { count: 1, .. }
        ));
    }

    #[test]
    fn test_failed_save_emits_nothing() {
        let recorder = Arc::new(Recorder::default());
        let bank = KnowledgeBank::builder()
            .hooks(HookRegistry::new())
            .hook(recorder.clone())
            .build()
            .unwrap();

        let _ = bank.save_finding("", "x", None);
        assert!(recorder.events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_from_config_saves_seed() {
        let config = KnowledgeConfig {
            seed: vec![SeedFinding {
                topic: "Quantum Computing".to_string(),
                content: "Initial notes on Qubit entanglement.".to_string(),
                source: None,
            }],
            ..Default::default()
        };

        let bank = KnowledgeBank::from_config(&config).unwrap();
        assert_eq!(bank.finding_count("quantum computing").unwrap(), 1);
    }

    #[test]
    fn test_builder_rejects_invalid_format() {
        let format = SummaryFormat {
            header: "no placeholder".to_string(),
            ..Default::default()
        };
        assert!(KnowledgeBank::builder().format(format).build().is_err());
    }

    #[test]
    fn test_snapshot_and_shutdown() {
        let bank = KnowledgeBank::new();
        bank.save_finding("b", "two", None).unwrap();
        bank.save_finding("a", "one", None).unwrap();

        let snapshot = bank.shutdown().unwrap();
        assert_eq!(snapshot.total_findings(), 2);
        assert_eq!(snapshot.topics[0].key.as_str(), "a");
        assert!(snapshot.taken_at.is_some());
    }
}
