//! Knowledge bank tools for the research and study agents
//!
//! `save_finding` appends a finding to the bank and `summarize_topic_knowledge`
//! reads back what is known about a topic. Both wrap a shared
//! [`KnowledgeBank`] and return envelopes with provenance.

use crate::knowledge::KnowledgeBank;
use crate::tools::{
    BoxedTool, Capability, CapabilitySet, RegistryError, Tool, ToolError, ToolErrorKind, ToolExample,
    ToolExecutionContext, ToolMetadata, ToolRegistry, ToolResultEnvelope, ToolSchema,
    ValidationError,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Tool name for the write operation
pub const SAVE_FINDING: &str = "save_finding";

/// Tool name for the read operation
pub const SUMMARIZE_TOPIC_KNOWLEDGE: &str = "summarize_topic_knowledge";

/// Output of the `save_finding` tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFindingOutput {
    pub success: bool,
    /// Normalized topic key
    pub topic: String,
    /// Findings under the topic after the save
    pub count: usize,
    /// Acknowledgement to hand back to the model
    pub message: String,
}

/// Output of the `summarize_topic_knowledge` tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicKnowledgeOutput {
    /// Normalized topic key
    pub topic: String,
    /// Findings the summary was built from
    pub count: usize,
    /// Whether anything is stored for the topic
    pub found: bool,
    pub summary: String,
}

fn string_arg<'a>(args: &'a Value, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| args.get(*name).and_then(Value::as_str))
}

fn missing(field: &str) -> ToolError {
    ToolError::new(ToolErrorKind::Validation, format!("{} parameter is required", field))
        .with_code("MISSING_PARAMETER")
}

/// Tool that saves a finding to the knowledge bank
pub struct SaveFindingTool {
    metadata: ToolMetadata,
    bank: Arc<KnowledgeBank>,
}

impl SaveFindingTool {
    pub fn new(bank: Arc<KnowledgeBank>) -> Self {
        Self {
            metadata: ToolMetadata::new(
                SAVE_FINDING,
                "Saves a synthesized finding or note to the permanent research memory",
            )
            .with_hint("Use after a search turns up a new fact worth keeping")
            .with_hint("Check summarize_topic_knowledge first to avoid saving duplicates")
            .with_returns("Confirmation with the number of findings now stored under the topic")
            .with_tag("knowledge")
            .with_tag("research"),
            bank,
        }
    }
}

impl std::fmt::Debug for SaveFindingTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveFindingTool")
            .field("name", &self.metadata.name)
            .finish()
    }
}

#[async_trait]
impl Tool for SaveFindingTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(serde_json::json!({
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "Topic the finding belongs to; case and surrounding whitespace are ignored"
                },
                "finding": {
                    "type": "string",
                    "description": "The synthesized fact or note to save"
                },
                "source": {
                    "type": "string",
                    "description": "Optional provenance, such as the URL of the search result"
                }
            },
            "required": ["topic", "finding"]
        }))
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![ToolExample::new(
            "save a fact about mitosis",
            serde_json::json!({"topic": "Mitosis", "finding": "Mitosis has 5 phases."}),
            serde_json::json!({"success": true, "topic": "mitosis", "count": 1}),
        )]
    }

    fn required_capabilities(&self) -> CapabilitySet {
        CapabilitySet::from_capabilities([Capability::MemoryWrite])
    }

    // "content" is accepted as an alias for "finding"
    fn validate(&self, args: &Value) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if string_arg(args, &["topic"]).is_none_or(|s| s.trim().is_empty()) {
            errors.push(ValidationError::new("topic", "topic is required"));
        }
        if string_arg(args, &["finding", "content"]).is_none_or(|s| s.trim().is_empty()) {
            errors.push(ValidationError::new("finding", "finding is required"));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    async fn execute(
        &self,
        args: Value,
        ctx: &ToolExecutionContext,
    ) -> Result<ToolResultEnvelope, ToolError> {
        let started_at = Instant::now();

        let topic = string_arg(&args, &["topic"]).ok_or_else(|| missing("topic"))?;
        let content =
            string_arg(&args, &["finding", "content"]).ok_or_else(|| missing("finding"))?;
        let source = string_arg(&args, &["source"]);

        let receipt = self.bank.save_finding(topic, content, source)?;

        let output = SaveFindingOutput {
            success: true,
            topic: receipt.topic.to_string(),
            count: receipt.count,
            message: receipt.acknowledgement(),
        };

        let provenance = ctx
            .provenance(SAVE_FINDING, &args)
            .with_duration(started_at.elapsed());

        Ok(ToolResultEnvelope::success(
            serde_json::to_value(output).map_err(|e| ToolError::internal(e.to_string()))?,
            provenance,
        ))
    }
}

/// Tool that summarizes what the knowledge bank holds on a topic
pub struct SummarizeTopicKnowledgeTool {
    metadata: ToolMetadata,
    bank: Arc<KnowledgeBank>,
}

impl SummarizeTopicKnowledgeTool {
    pub fn new(bank: Arc<KnowledgeBank>) -> Self {
        Self {
            metadata: ToolMetadata::new(
                SUMMARIZE_TOPIC_KNOWLEDGE,
                "Retrieves and summarizes all existing findings on a topic from long-term memory",
            )
            .with_hint("Use before researching to see what is already known")
            .with_hint("Use when tutoring to ground answers in saved findings")
            .with_returns("The stored findings in the order they were saved, and their count")
            .with_tag("knowledge")
            .with_tag("study"),
            bank,
        }
    }
}

impl std::fmt::Debug for SummarizeTopicKnowledgeTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizeTopicKnowledgeTool")
            .field("name", &self.metadata.name)
            .finish()
    }
}

#[async_trait]
impl Tool for SummarizeTopicKnowledgeTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(serde_json::json!({
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "Topic to summarize; case and surrounding whitespace are ignored"
                }
            },
            "required": ["topic"]
        }))
    }

    fn required_capabilities(&self) -> CapabilitySet {
        CapabilitySet::from_capabilities([Capability::MemoryRead])
    }

    async fn execute(
        &self,
        args: Value,
        ctx: &ToolExecutionContext,
    ) -> Result<ToolResultEnvelope, ToolError> {
        let started_at = Instant::now();

        let topic = string_arg(&args, &["topic"]).ok_or_else(|| missing("topic"))?;
        let summary = self.bank.summarize_topic_knowledge(topic)?;

        let output = TopicKnowledgeOutput {
            topic: summary.topic.to_string(),
            count: summary.count,
            found: summary.has_knowledge(),
            summary: summary.summary,
        };

        let provenance = ctx
            .provenance(SUMMARIZE_TOPIC_KNOWLEDGE, &args)
            .with_duration(started_at.elapsed());

        Ok(ToolResultEnvelope::success(
            serde_json::to_value(output).map_err(|e| ToolError::internal(e.to_string()))?,
            provenance,
        ))
    }
}

/// Both knowledge tools sharing one bank
pub fn knowledge_tools(bank: Arc<KnowledgeBank>) -> Vec<BoxedTool> {
    vec![
        Arc::new(SaveFindingTool::new(Arc::clone(&bank))),
        Arc::new(SummarizeTopicKnowledgeTool::new(bank)),
    ]
}

/// A registry holding the knowledge tools
pub fn knowledge_registry(bank: Arc<KnowledgeBank>) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register_all(knowledge_tools(bank))?;
    Ok(registry)
}
