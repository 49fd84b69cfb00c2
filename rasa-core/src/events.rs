//! Observability events and hooks for knowledge bank operations
//!
//! Every `save_finding` and `summarize_topic_knowledge` call produces a
//! `KnowledgeEvent`. Registered hooks receive it after the operation
//! completes; the default registry holds a `LoggingHook` that writes the
//! event through `tracing`.
//!
//! # Example
//!
//! ```rust
//! use rasa_core::events::{HookRegistry, LoggingHook};
//! use rasa_core::knowledge::KnowledgeBank;
//! use std::sync::Arc;
//!
//! let mut hooks = HookRegistry::new();
//! hooks.register(Arc::new(LoggingHook));
//! assert_eq!(hooks.len(), 1);
//!
//! let bank = KnowledgeBank::builder().hooks(hooks).build()?;
//! bank.save_finding("Mitosis", "Mitosis has 5 phases.", None)?;
//! # Ok::<(), rasa_core::error::RasaError>(())
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Event emitted by the knowledge bank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum KnowledgeEvent {
    /// A finding was appended
    FindingSaved {
        /// Normalized topic key
        topic: String,
        /// Length of the stored content in bytes
        content_len: usize,
        /// Findings under the topic after the save
        count: usize,
        /// Whether a source was recorded
        has_source: bool,
        timestamp: DateTime<Utc>,
    },

    /// A topic summary was read
    KnowledgeRead {
        /// Normalized topic key
        topic: String,
        /// Findings the summary was built from
        count: usize,
        timestamp: DateTime<Utc>,
    },
}

impl KnowledgeEvent {
    /// Topic the event refers to
    pub fn topic(&self) -> &str {
        match self {
            KnowledgeEvent::FindingSaved { topic, .. } => topic,
            KnowledgeEvent::KnowledgeRead { topic, .. } => topic,
        }
    }

    /// Finding count carried by the event
    pub fn count(&self) -> usize {
        match self {
            KnowledgeEvent::FindingSaved { count, .. } => *count,
            KnowledgeEvent::KnowledgeRead { count, .. } => *count,
        }
    }
}

/// Observer for knowledge bank operations
///
/// Hooks run synchronously after the store has been updated and cannot
/// fail the operation that triggered them.
pub trait KnowledgeHook: Send + Sync {
    /// Called after a finding is saved
    fn on_finding_saved(&self, _event: &KnowledgeEvent) {}

    /// Called after a topic summary is read
    fn on_knowledge_read(&self, _event: &KnowledgeEvent) {}
}

/// Registry for managing hooks
#[derive(Clone)]
pub struct HookRegistry {
    hooks: Vec<Arc<dyn KnowledgeHook>>,
}

impl HookRegistry {
    /// Create an empty hook registry
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Create a registry holding only the `LoggingHook`
    pub fn with_logging() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(LoggingHook));
        registry
    }

    /// Register a hook
    pub fn register(&mut self, hook: Arc<dyn KnowledgeHook>) {
        self.hooks.push(hook);
    }

    /// Number of registered hooks
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hooks are registered
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Deliver an event to every hook
    pub fn dispatch(&self, event: &KnowledgeEvent) {
        for hook in &self.hooks {
            match event {
                KnowledgeEvent::FindingSaved { .. } => hook.on_finding_saved(event),
                KnowledgeEvent::KnowledgeRead { .. } => hook.on_knowledge_read(event),
            }
        }
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::with_logging()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hook_count", &self.hooks.len())
            .finish()
    }
}

/// Writes knowledge events through `tracing`
pub struct LoggingHook;

impl KnowledgeHook for LoggingHook {
    fn on_finding_saved(&self, event: &KnowledgeEvent) {
        if let KnowledgeEvent::FindingSaved {
            topic,
            content_len,
            count,
            has_source,
            ..
        } = event
        {
            tracing::info!(
                topic = %topic,
                content_len = content_len,
                count = count,
                has_source = has_source,
                "Finding saved"
            );
        }
    }

    fn on_knowledge_read(&self, event: &KnowledgeEvent) {
        if let KnowledgeEvent::KnowledgeRead { topic, count, .. } = event {
            if *count == 0 {
                tracing::debug!(topic = %topic, "No knowledge stored for topic");
            }
            tracing::info!(topic = %topic, count = count, "Retrieved knowledge summary");
        }
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
    fn test_dispatch_reaches_every_hook() {
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());

        let mut registry = HookRegistry::new();
        registry.register(first.clone());
        registry.register(second.clone());

        registry.dispatch(&KnowledgeEvent::KnowledgeRead {
            topic: "rust".to_string(),
            count: 3,
            timestamp: Utc::now(),
        });

        assert_eq!(first.events.lock().unwrap().len(), 1);
        assert_eq!(second.events.lock().unwrap()[0].count(), 3);
    }

    #[test]
    fn test_default_registry_logs() {
        let registry = HookRegistry::default();
        assert_eq!(registry.len(), 1);

        // Must not panic without a subscriber installed
        registry.dispatch(&KnowledgeEvent::FindingSaved {
            topic: "rust".to_string(),
            content_len: 4,
            count: 1,
            has_source: false,
            timestamp: Utc::now(),
        });
    }

    #[test]
    fn test_event_serialization_tag() {
        let event = KnowledgeEvent::FindingSaved {
            topic: "mitosis".to_string(),
            content_len: 21,
            count: 2,
            has_source: true,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "finding_saved");
        assert_eq!(json["count"], 2);
        assert_eq!(event.topic(), "mitosis");
    }
}
