//! Name-keyed tool catalogue
//!
//! The research agent lists every tool its policy allows; the study agent
//! only sees the read side.

use super::capability::CapabilityPolicy;
use super::tool::{BoxedTool, Tool};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Below this a discovery match is noise
const MIN_DISCOVERY_SCORE: f32 = 0.1;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("Tool '{0}' not found")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    Validation(String),
}

/// Serializable view of a tool, as shown to an agent or printed by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub required_capabilities: Vec<String>,
    pub input_schema: serde_json::Value,
}

impl From<&dyn Tool> for ToolSummary {
    fn from(tool: &dyn Tool) -> Self {
        let metadata = tool.metadata();
        Self {
            name: metadata.name.clone(),
            description: metadata.description.clone(),
            tags: metadata.tags.clone(),
            required_capabilities: tool
                .required_capabilities()
                .iter()
                .map(|cap| cap.to_string())
                .collect(),
            input_schema: tool.schema().parameters,
        }
    }
}

/// Relevance of `tool` to a free-text query, from 0.0 to 1.0
///
/// An exact name is 1.0. Otherwise the best of: the query inside the name
/// (0.9), the description (0.7), a tag (0.6) or a usage hint (0.5), and the
/// share of query words longer than two letters found in the description,
/// scaled to 0.6.
fn relevance(query: &str, tool: &dyn Tool) -> f32 {
    let query = query.trim().to_lowercase();
    let metadata = tool.metadata();
    let name = metadata.name.to_lowercase();
    if name == query {
        return 1.0;
    }

    let description = metadata.description.to_lowercase();
    let any_contains = |texts: &[String]| texts.iter().any(|t| t.to_lowercase().contains(&query));

    let substring = [
        (name.contains(&query), 0.9),
        (description.contains(&query), 0.7),
        (any_contains(&metadata.tags), 0.6),
        (any_contains(&metadata.usage_hints), 0.5),
    ]
    .into_iter()
    .filter_map(|(hit, score)| hit.then_some(score))
    .fold(0.0f32, f32::max);

    let words: Vec<&str> = query.split_whitespace().collect();
    let overlap = if words.is_empty() {
        0.0
    } else {
        let hits = words
            .iter()
            .filter(|w| w.len() > 2 && description.contains(**w))
            .count();
        hits as f32 / words.len() as f32 * 0.6
    };

    substring.max(overlap)
}

#[derive(Clone)]
pub struct DiscoveryResult {
    pub tool: BoxedTool,
    pub score: f32,
}

impl fmt::Debug for DiscoveryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DiscoveryResult({}, {:.2})", self.tool.name(), self.score)
    }
}

/// Tools by unique name, iterated alphabetically
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, BoxedTool>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.tools.keys()).finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: BoxedTool) -> Result<(), RegistryError> {
        use std::collections::btree_map::Entry;

        match self.tools.entry(tool.name().to_string()) {
            Entry::Occupied(existing) => Err(RegistryError::DuplicateTool(existing.key().clone())),
            Entry::Vacant(slot) => {
                slot.insert(tool);
                Ok(())
            }
        }
    }

    /// Stops at the first duplicate; tools before it stay registered
    pub fn register_all(&mut self, tools: Vec<BoxedTool>) -> Result<(), RegistryError> {
        tools.into_iter().try_for_each(|tool| self.register(tool))
    }

    pub fn get(&self, name: &str) -> Option<&BoxedTool> {
        self.tools.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&BoxedTool, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn list(&self) -> Vec<ToolSummary> {
        self.tools
            .values()
            .map(|tool| ToolSummary::from(tool.as_ref()))
            .collect()
    }

    /// Tools relevant to `query`, best first
    pub fn discover(&self, query: &str) -> Vec<DiscoveryResult> {
        let mut found: Vec<DiscoveryResult> = self
            .tools
            .values()
            .map(|tool| DiscoveryResult {
                score: relevance(query, tool.as_ref()),
                tool: Arc::clone(tool),
            })
            .filter(|hit| hit.score >= MIN_DISCOVERY_SCORE)
            .collect();
        found.sort_by(|a, b| b.score.total_cmp(&a.score));
        found
    }

    /// Tools an agent holding `policy` is allowed to call
    pub fn filter_by_policy(&self, policy: &CapabilityPolicy) -> Vec<&BoxedTool> {
        self.tools
            .values()
            .filter(|tool| policy.check_all(&tool.required_capabilities()).is_ok())
            .collect()
    }

    pub fn validate_args(
        &self,
        tool_name: &str,
        args: &serde_json::Value,
    ) -> Result<(), RegistryError> {
        self.require(tool_name)?.validate(args).map_err(|errors| {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            RegistryError::Validation(joined)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{
        Capability, CapabilitySet, ToolError, ToolExecutionContext, ToolMetadata,
        ToolResultEnvelope, ToolSchema,
    };
    use async_trait::async_trait;
    use serde_json::Value;

    /// Write-side tool, hidden from the study agent
    struct ForgetTopicTool {
        metadata: ToolMetadata,
    }

    impl ForgetTopicTool {
        fn new() -> Self {
            Self {
                metadata: ToolMetadata::new("forget_topic", "Drop every finding saved under a topic")
                    .with_tag("cleanup")
                    .with_hint("Use when a topic was saved by mistake"),
            }
        }
    }

    #[async_trait]
    impl Tool for ForgetTopicTool {
        fn metadata(&self) -> &ToolMetadata {
            &self.metadata
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new(serde_json::json!({
                "type": "object",
                "properties": { "topic": { "type": "string" } },
                "required": ["topic"]
            }))
        }

        fn required_capabilities(&self) -> CapabilitySet {
            CapabilitySet::from_capabilities([Capability::MemoryWrite])
        }

        async fn execute(
            &self,
            args: Value,
            ctx: &ToolExecutionContext,
        ) -> Result<ToolResultEnvelope, ToolError> {
            Ok(ToolResultEnvelope::success(
                serde_json::json!({"forgotten": 0}),
                ctx.provenance("forget_topic", &args),
            ))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(ForgetTopicTool::new())).unwrap();
        registry
    }

    #[test]
    fn test_register_and_get() {
        let registry = registry();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("forget_topic"));
        assert!(registry.get("missing").is_none());
        assert_eq!(
            registry.require("missing").err(),
            Some(RegistryError::NotFound("missing".to_string()))
        );
        assert!(matches!(registry.require("forget_topic"), Ok(tool) if tool.name() == "forget_topic"));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = registry();
        let err = registry.register(Arc::new(ForgetTopicTool::new())).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTool("forget_topic".to_string()));
        assert_eq!(err.to_string(), "Tool 'forget_topic' is already registered");
    }

    #[test]
    fn test_discover() {
        let registry = registry();

        let exact = registry.discover("forget_topic");
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].score, 1.0);

        assert!(!registry.discover("cleanup").is_empty());
        assert!(registry.discover("zzz").is_empty());
    }

    #[test]
    fn test_filter_by_policy() {
        let registry = registry();
        assert!(registry.filter_by_policy(&CapabilityPolicy::study_agent()).is_empty());
        assert_eq!(
            registry
                .filter_by_policy(&CapabilityPolicy::research_agent())
                .len(),
            1
        );
    }

    #[test]
    fn test_list_and_validate_args() {
        let registry = registry();
        let summaries = registry.list();
        assert_eq!(summaries[0].required_capabilities, vec!["memory_write"]);
        assert_eq!(summaries[0].input_schema["required"][0], "topic");

        assert!(registry
            .validate_args("forget_topic", &serde_json::json!({"topic": "mitosis"}))
            .is_ok());
        assert!(matches!(
            registry.validate_args("forget_topic", &serde_json::json!({})),
            Err(RegistryError::Validation(_))
        ));
    }
}
