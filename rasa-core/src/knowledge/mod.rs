//! Research knowledge bank (long-term memory)
//!
//! Findings are appended under a normalized topic key and read back as a
//! deterministic, insertion-ordered summary. Storage sits behind the
//! [`KnowledgeBackend`] trait; [`InMemoryKnowledgeBackend`] is the default.
//!
//! # Example
//!
//! ```rust
//! use rasa_core::knowledge::KnowledgeBank;
//!
//! let bank = KnowledgeBank::new();
//! bank.save_finding("Mitosis", "Mitosis has 5 phases.", None)?;
//! let summary = bank.summarize_topic_knowledge("mitosis")?;
//! assert_eq!(summary.count, 1);
//! # Ok::<(), rasa_core::error::RasaError>(())
//! ```

mod backend;
mod bank;
mod finding;
mod inmemory;
mod summary;
mod topic;

pub use backend::{Appended, KnowledgeBackend, NewFinding};
pub use bank::{KnowledgeBank, KnowledgeBankBuilder};
pub use finding::{Finding, KnowledgeSnapshot, SaveReceipt, TopicInfo, TopicRecord, TopicSummary};
pub use inmemory::InMemoryKnowledgeBackend;
pub use summary::{SummaryFormat, TOPIC_PLACEHOLDER};
pub use topic::TopicKey;
