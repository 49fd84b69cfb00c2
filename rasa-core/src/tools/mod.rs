//! Tool layer between agents and the knowledge bank
//!
//! Agents never touch the bank directly. They call `save_finding` and
//! `summarize_topic_knowledge` through a [`ToolRuntime`] that enforces a
//! deny-by-default capability policy, validates arguments, applies a timeout,
//! and wraps every outcome in a [`ToolResultEnvelope`] with provenance.
//!
//! # Example
//!
//! ```rust,no_run
//! use rasa_core::knowledge::KnowledgeBank;
//! use rasa_core::tools::{knowledge_registry, CapabilityPolicy, ToolContext, ToolRuntime};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = knowledge_registry(Arc::new(KnowledgeBank::new()))?;
//! let runtime = ToolRuntime::new(CapabilityPolicy::research_agent());
//! let tool = registry.require("save_finding")?;
//!
//! let args = serde_json::json!({"topic": "Mitosis", "finding": "Mitosis has 5 phases."});
//! let envelope = runtime.execute(tool.as_ref(), args, &ToolContext::new()).await;
//! assert!(envelope.is_success());
//! # Ok(())
//! # }
//! ```

mod capability;
mod knowledge;
mod registry;
mod result;
mod runtime;
mod tool;

pub use capability::{Capability, CapabilityPolicy, CapabilitySet};
pub use knowledge::{
    knowledge_registry, knowledge_tools, SaveFindingOutput, SaveFindingTool,
    SummarizeTopicKnowledgeTool, TopicKnowledgeOutput, SAVE_FINDING, SUMMARIZE_TOPIC_KNOWLEDGE,
};
pub use registry::{DiscoveryResult, RegistryError, ToolRegistry, ToolSummary};
pub use result::{
    PolicyDecision, ToolError, ToolErrorKind, ToolProvenance, ToolResult, ToolResultEnvelope,
    ValidationError, RESULT_SCHEMA_VERSION,
};
pub use runtime::{ToolContext, ToolRuntime};
pub use tool::{args_hash, BoxedTool, Tool, ToolExample, ToolExecutionContext, ToolMetadata, ToolSchema};
