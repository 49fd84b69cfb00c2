//! Tool outcomes and their provenance
//!
//! A tool call always produces a [`ToolResultEnvelope`]. Failures are data,
//! not panics or bare errors, so an agent loop can decide whether to retry,
//! fix its arguments, or give up, and every envelope records which agent
//! called which tool with what.

use crate::error::RasaError;
use crate::tools::CapabilitySet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Bumped when the envelope layout changes
pub const RESULT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultEnvelope {
    pub schema_version: u32,
    pub result: ToolResult,
    pub provenance: ToolProvenance,
}

impl ToolResultEnvelope {
    fn wrap(result: ToolResult, provenance: ToolProvenance) -> Self {
        Self {
            schema_version: RESULT_SCHEMA_VERSION,
            result,
            provenance,
        }
    }

    pub fn success(value: Value, provenance: ToolProvenance) -> Self {
        Self::wrap(ToolResult::Success { value }, provenance)
    }

    pub fn error(error: ToolError, provenance: ToolProvenance) -> Self {
        Self::wrap(ToolResult::Error { error }, provenance)
    }

    pub fn cancelled(reason: impl Into<String>, provenance: ToolProvenance) -> Self {
        Self::wrap(
            ToolResult::Cancelled {
                reason: reason.into(),
            },
            provenance,
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self.result, ToolResult::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self.result, ToolResult::Error { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.result, ToolResult::Cancelled { .. })
    }

    /// Whether calling again with the same arguments might succeed
    pub fn is_retryable(&self) -> bool {
        self.get_error().is_some_and(|e| e.kind.is_retryable())
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.result {
            ToolResult::Success { value } => Some(value),
            _ => None,
        }
    }

    pub fn get_error(&self) -> Option<&ToolError> {
        match &self.result {
            ToolResult::Error { error } => Some(error),
            _ => None,
        }
    }

    /// The success value; cancellation becomes a `Cancelled` error
    pub fn into_value(self) -> Result<Value, ToolError> {
        match self.result {
            ToolResult::Success { value } => Ok(value),
            ToolResult::Error { error } => Err(error),
            ToolResult::Cancelled { reason } => Err(ToolError::new(ToolErrorKind::Cancelled, reason)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResult {
    Success { value: Value },
    Error { error: ToolError },
    Cancelled { reason: String },
}

/// Failure classes; the class decides retryability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// Bad arguments; the caller must change them
    Validation,
    /// The agent's policy does not grant what the tool needs
    CapabilityDenied,
    Timeout,
    /// Storage hiccup such as a poisoned lock
    Transient,
    /// A bug in the tool
    Internal,
    Cancelled,
}

impl ToolErrorKind {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ToolErrorKind::Timeout | ToolErrorKind::Transient)
    }
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToolErrorKind::Validation => "validation",
            ToolErrorKind::CapabilityDenied => "capability_denied",
            ToolErrorKind::Timeout => "timeout",
            ToolErrorKind::Transient => "transient",
            ToolErrorKind::Internal => "internal",
            ToolErrorKind::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// A structured tool failure
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    /// Stable machine-readable code, e.g. `INVALID_INPUT`
    pub code: Option<String>,
    /// Extra detail such as per-field validation errors
    pub context: Option<Value>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            context: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// One error covering every failed field; the fields go in `context`
    pub fn validation(errors: Vec<ValidationError>) -> Self {
        let summary = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        let context = serde_json::to_value(&errors).unwrap_or(Value::Null);
        Self::new(ToolErrorKind::Validation, format!("Validation failed: {}", summary))
            .with_code("VALIDATION_FAILED")
            .with_context(context)
    }

    pub fn capability_denied(missing: &CapabilitySet) -> Self {
        let names = missing.names();
        Self::new(
            ToolErrorKind::CapabilityDenied,
            format!("Required capabilities denied: {}", names.join(", ")),
        )
        .with_code("CAPABILITY_DENIED")
        .with_context(serde_json::json!(names))
    }

    pub fn timeout(after: Duration) -> Self {
        let after = humantime_serde::re::humantime::format_duration(after);
        Self::new(
            ToolErrorKind::Timeout,
            format!("Tool execution timed out after {}", after),
        )
        .with_code("TIMEOUT")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Internal, message).with_code("INTERNAL_ERROR")
    }
}

impl From<RasaError> for ToolError {
    fn from(err: RasaError) -> Self {
        match err {
            RasaError::InvalidInput(msg) => {
                ToolError::new(ToolErrorKind::Validation, msg).with_code("INVALID_INPUT")
            }
            RasaError::Backend(msg) => {
                ToolError::new(ToolErrorKind::Transient, msg).with_code("BACKEND_ERROR")
            }
            other => ToolError::internal(other.to_string()),
        }
    }
}

/// A problem with one argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Who called which tool, with what, and how it went
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolProvenance {
    pub tool_name: String,
    /// Hex prefix of the SHA-256 of the arguments
    pub args_hash: String,
    pub started_at: DateTime<Utc>,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    pub agent_id: Option<String>,
    pub trace_id: Option<String>,
    /// Checks the runtime made before executing
    pub policy_decisions: Vec<PolicyDecision>,
}

impl ToolProvenance {
    /// Provenance stamped with the current time
    pub fn new(tool_name: impl Into<String>, args_hash: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            args_hash: args_hash.into(),
            started_at: Utc::now(),
            duration: Duration::ZERO,
            agent_id: None,
            trace_id: None,
            policy_decisions: Vec::new(),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_policy_decision(mut self, decision: PolicyDecision) -> Self {
        self.policy_decisions.push(decision);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDecision {
    /// Name of the check, e.g. `capability_check`
    pub check: String,
    pub allowed: bool,
    pub reason: Option<String>,
}

impl PolicyDecision {
    pub fn new(check: impl Into<String>, allowed: bool) -> Self {
        Self {
            check: check.into(),
            allowed,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
