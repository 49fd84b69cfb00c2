//! # RASA - Research And Study Assistant core
//!
//! RASA pairs a research agent, which gathers facts and files them away, with
//! a study agent, which tutors from what has been filed. This crate holds
//! everything the two share:
//! - A long-term knowledge bank of findings grouped by normalized topic
//! - Capability-gated tools (`save_finding`, `summarize_topic_knowledge`)
//! - A keyword router that picks the agent and topic for each request
//! - Layered configuration and `tracing`-based observability hooks
//!
//! ## Quick Start
//!
//! ```rust
//! use rasa_core::prelude::*;
//!
//! let bank = KnowledgeBank::new();
//! bank.save_finding("Mitosis", "Mitosis has 5 phases.", None)?;
//! bank.save_finding("mitosis", "Phases: prophase, metaphase, anaphase, telophase.", None)?;
//!
//! let summary = bank.summarize_topic_knowledge("Mitosis")?;
//! assert_eq!(summary.count, 2);
//!
//! let mut state = AssistantState::new("student_123");
//! state.push_user("Test me on Mitosis. How many phases are there?");
//! route(&mut state)?;
//! assert_eq!(state.intent, Some(Intent::Study));
//! # Ok::<(), RasaError>(())
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod knowledge;
pub mod tools;
pub mod workflow;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{KnowledgeConfig, RasaConfig, RouterConfig, ToolsConfig};
    pub use crate::error::{RasaError, Result};
    pub use crate::events::{HookRegistry, KnowledgeEvent, KnowledgeHook, LoggingHook};
    pub use crate::knowledge::{
        Finding, KnowledgeBackend, KnowledgeBank, SaveReceipt, TopicKey, TopicSummary,
    };
    pub use crate::tools::{
        knowledge_registry, CapabilityPolicy, Tool, ToolContext, ToolRegistry, ToolResultEnvelope,
        ToolRuntime,
    };
    pub use crate::workflow::{route, study_context, AssistantState, Intent, IntentRouter};
}
