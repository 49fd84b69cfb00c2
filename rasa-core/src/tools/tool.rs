//! The `Tool` trait
//!
//! A tool describes itself (name, description, JSON Schema, capabilities)
//! so an agent can pick it, and executes against JSON arguments. The runtime
//! owns policy, validation and timeouts; `execute` only does the work.

use super::capability::CapabilitySet;
use super::result::{ToolError, ToolProvenance, ToolResultEnvelope, ValidationError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// What an agent reads when choosing a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    /// Situations the tool is meant for
    pub usage_hints: Vec<String>,
    pub returns: String,
    pub tags: Vec<String>,
}

impl ToolMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            usage_hints: Vec::new(),
            returns: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.usage_hints.push(hint.into());
        self
    }

    pub fn with_returns(mut self, returns: impl Into<String>) -> Self {
        self.returns = returns.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// JSON Schema object describing a tool's arguments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolSchema {
    pub parameters: Value,
}

impl ToolSchema {
    pub fn new(parameters: Value) -> Self {
        Self { parameters }
    }

    pub fn required_fields(&self) -> Vec<&str> {
        match self.parameters.get("required") {
            Some(Value::Array(fields)) => fields.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

/// A worked call shown alongside the schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExample {
    pub name: String,
    pub input: Value,
    pub output: Value,
}

impl ToolExample {
    pub fn new(name: impl Into<String>, input: Value, output: Value) -> Self {
        Self {
            name: name.into(),
            input,
            output,
        }
    }
}

/// Caller identity handed to `Tool::execute`
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    pub agent_id: Option<String>,
    pub trace_id: Option<String>,
}

impl ToolExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Start a provenance record for a call made under this context
    pub fn provenance(&self, tool_name: &str, args: &Value) -> ToolProvenance {
        ToolProvenance {
            agent_id: self.agent_id.clone(),
            trace_id: self.trace_id.clone(),
            ..ToolProvenance::new(tool_name, args_hash(args))
        }
    }
}

/// First 16 hex digits of the SHA-256 of the serialized arguments
pub fn args_hash(args: &Value) -> String {
    let digest = Sha256::digest(args.to_string().as_bytes());
    digest
        .iter()
        .take(8)
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn metadata(&self) -> &ToolMetadata;

    fn name(&self) -> &str {
        &self.metadata().name
    }

    fn description(&self) -> &str {
        &self.metadata().description
    }

    fn schema(&self) -> ToolSchema;

    fn examples(&self) -> Vec<ToolExample> {
        Vec::new()
    }

    /// Capabilities the calling agent must hold; none by default
    fn required_capabilities(&self) -> CapabilitySet {
        CapabilitySet::new()
    }

    /// Reject arguments before `execute` runs
    ///
    /// Every field the schema lists as required must be a non-blank string.
    fn validate(&self, args: &Value) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        for field in self.schema().required_fields() {
            let present = matches!(args.get(field), Some(Value::String(s)) if !s.trim().is_empty());
            if !present {
                errors.push(ValidationError::new(field, format!("{} is required", field)));
            }
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    async fn execute(
        &self,
        args: Value,
        ctx: &ToolExecutionContext,
    ) -> Result<ToolResultEnvelope, ToolError>;
}

pub type BoxedTool = Arc<dyn Tool>;
