//! Runs tools on behalf of one agent
//!
//! A [`ToolRuntime`] is bound to an agent's [`CapabilityPolicy`]. Each call
//! passes the same gates in order: cancellation, policy, argument
//! validation, then execution bounded by the timeout and the caller's
//! cancellation token. The caller always gets an envelope back.

use super::capability::CapabilityPolicy;
use super::result::{PolicyDecision, ToolError, ToolErrorKind, ToolProvenance, ToolResultEnvelope};
use super::tool::{Tool, ToolExecutionContext};
use crate::config::ToolsConfig;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

const CAPABILITY_CHECK: &str = "capability_check";

/// Who is calling, and how to stop them
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    pub agent_id: Option<String>,
    /// Correlates calls made within one session
    pub trace_id: Option<String>,
    pub cancellation: Option<CancellationToken>,
}

impl ToolContext {
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

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(&self.cancellation, Some(token) if token.is_cancelled())
    }

    /// The part of the context a tool gets to see
    pub fn to_execution_context(&self) -> ToolExecutionContext {
        ToolExecutionContext {
            agent_id: self.agent_id.clone(),
            trace_id: self.trace_id.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolRuntime {
    policy: CapabilityPolicy,
    default_timeout: Duration,
}

impl ToolRuntime {
    /// Uses the timeout from `ToolsConfig::default()`
    pub fn new(policy: CapabilityPolicy) -> Self {
        Self::with_config(policy, &ToolsConfig::default())
    }

    pub fn with_config(policy: CapabilityPolicy, config: &ToolsConfig) -> Self {
        Self {
            policy,
            default_timeout: config.default_timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn policy(&self) -> &CapabilityPolicy {
        &self.policy
    }

    pub fn timeout(&self) -> Duration {
        self.default_timeout
    }

    pub async fn execute(
        &self,
        tool: &dyn Tool,
        args: Value,
        ctx: &ToolContext,
    ) -> ToolResultEnvelope {
        let started = Instant::now();
        let exec_ctx = ctx.to_execution_context();
        let provenance = exec_ctx.provenance(tool.name(), &args);

        if ctx.is_cancelled() {
            return ToolResultEnvelope::cancelled("Cancelled before execution", provenance);
        }

        let provenance = match self.check_policy(tool, ctx, provenance) {
            Ok(provenance) => provenance,
            Err(denied) => return denied,
        };

        if let Err(errors) = tool.validate(&args) {
            return ToolResultEnvelope::error(
                ToolError::validation(errors),
                provenance.with_duration(started.elapsed()),
            );
        }

        let outcome = self.run_bounded(tool, args, &exec_ctx, ctx).await;
        let provenance = provenance.with_duration(started.elapsed());

        match outcome {
            Ok(envelope) => merge_provenance(envelope, provenance),
            Err(error) => {
                tracing::debug!(tool = %tool.name(), %error, "Tool call failed");
                ToolResultEnvelope::error(error, provenance)
            }
        }
    }

    /// Same as [`execute`](Self::execute), reduced to the success value
    pub async fn execute_simple(
        &self,
        tool: &dyn Tool,
        args: Value,
        ctx: &ToolContext,
    ) -> Result<Value, ToolError> {
        self.execute(tool, args, ctx).await.into_value()
    }

    fn check_policy(
        &self,
        tool: &dyn Tool,
        ctx: &ToolContext,
        provenance: ToolProvenance,
    ) -> Result<ToolProvenance, ToolResultEnvelope> {
        match self.policy.check_all(&tool.required_capabilities()) {
            Ok(()) => Ok(provenance.with_policy_decision(PolicyDecision::new(CAPABILITY_CHECK, true))),
            Err(denied) => {
                let names = denied.names().join(", ");
                tracing::warn!(
                    tool = %tool.name(),
                    agent_id = ?ctx.agent_id,
                    denied = %names,
                    "Tool call denied by capability policy"
                );
                let decision = PolicyDecision::new(CAPABILITY_CHECK, false)
                    .with_reason(format!("not granted: {}", names));
                Err(ToolResultEnvelope::error(
                    ToolError::capability_denied(&denied),
                    provenance.with_policy_decision(decision),
                ))
            }
        }
    }

    async fn run_bounded(
        &self,
        tool: &dyn Tool,
        args: Value,
        exec_ctx: &ToolExecutionContext,
        ctx: &ToolContext,
    ) -> Result<ToolResultEnvelope, ToolError> {
        let limit = self.default_timeout;
        let bounded = async move {
            tokio::time::timeout(limit, tool.execute(args, exec_ctx))
                .await
                .unwrap_or_else(|_| Err(ToolError::timeout(limit)))
        };

        let Some(token) = &ctx.cancellation else {
            return bounded.await;
        };
        tokio::select! {
            _ = token.cancelled() => Err(ToolError::new(ToolErrorKind::Cancelled, "Execution cancelled")),
            outcome = bounded => outcome,
        }
    }
}

/// Fold the runtime's view of the call into the tool's own envelope
fn merge_provenance(mut envelope: ToolResultEnvelope, runtime: ToolProvenance) -> ToolResultEnvelope {
    let tool_view = &mut envelope.provenance;
    tool_view.started_at = runtime.started_at;
    tool_view.duration = runtime.duration;
    tool_view.agent_id = runtime.agent_id;
    tool_view.trace_id = runtime.trace_id;
    tool_view.policy_decisions.extend(runtime.policy_decisions);
    envelope
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Capability, CapabilitySet, ToolMetadata, ToolSchema};
    use async_trait::async_trait;
    use serde_json::json;

    /// Sleeps, then reports success
    struct NapTool {
        metadata: ToolMetadata,
        nap: Duration,
    }

    impl NapTool {
        fn new(nap: Duration) -> Self {
            Self {
                metadata: ToolMetadata::new("nap", "Sleeps before answering"),
                nap,
            }
        }
    }

    #[async_trait]
    impl Tool for NapTool {
        fn metadata(&self) -> &ToolMetadata {
            &self.metadata
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new(json!({"type": "object"}))
        }

        async fn execute(
            &self,
            args: Value,
            ctx: &ToolExecutionContext,
        ) -> Result<ToolResultEnvelope, ToolError> {
            tokio::time::sleep(self.nap).await;
            Ok(ToolResultEnvelope::success(json!({"awake": true}), ctx.provenance("nap", &args)))
        }
    }

    /// Needs MemoryWrite and a non-blank `note`
    struct NoteTool {
        metadata: ToolMetadata,
    }

    impl NoteTool {
        fn new() -> Self {
            Self {
                metadata: ToolMetadata::new("note", "Writes a note"),
            }
        }
    }

    #[async_trait]
    impl Tool for NoteTool {
        fn metadata(&self) -> &ToolMetadata {
            &self.metadata
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new(json!({
                "type": "object",
                "properties": {"note": {"type": "string"}},
                "required": ["note"]
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
            Ok(ToolResultEnvelope::success(json!({"written": true}), ctx.provenance("note", &args)))
        }
    }

    fn note() -> Value {
        json!({"note": "Mitosis has 5 phases."})
    }

    #[tokio::test]
    async fn test_default_policy_denies() {
        let runtime = ToolRuntime::new(CapabilityPolicy::default());
        let envelope = runtime.execute(&NoteTool::new(), note(), &ToolContext::new()).await;

        assert_eq!(envelope.get_error().unwrap().kind, ToolErrorKind::CapabilityDenied);
        let decision = &envelope.provenance.policy_decisions[0];
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("not granted: memory_write"));
    }

    #[tokio::test]
    async fn test_policy_runs_before_validation() {
        let study = ToolRuntime::new(CapabilityPolicy::study_agent());
        let envelope = study.execute(&NoteTool::new(), json!({}), &ToolContext::new()).await;
        assert_eq!(envelope.get_error().unwrap().kind, ToolErrorKind::CapabilityDenied);

        let research = ToolRuntime::new(CapabilityPolicy::research_agent());
        let envelope = research.execute(&NoteTool::new(), json!({}), &ToolContext::new()).await;
        assert_eq!(envelope.get_error().unwrap().kind, ToolErrorKind::Validation);

        let envelope = research.execute(&NoteTool::new(), note(), &ToolContext::new()).await;
        assert!(envelope.is_success());
        assert!(envelope.provenance.policy_decisions[0].allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_retryable() {
        let config = ToolsConfig {
            default_timeout: Duration::from_millis(50),
        };
        let runtime = ToolRuntime::with_config(CapabilityPolicy::allow_all(), &config);

        let envelope = runtime
            .execute(&NapTool::new(Duration::from_secs(5)), Value::Null, &ToolContext::new())
            .await;

        assert_eq!(envelope.get_error().unwrap().kind, ToolErrorKind::Timeout);
        assert!(envelope.is_retryable());
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits() {
        let runtime = ToolRuntime::new(CapabilityPolicy::allow_all());
        let token = CancellationToken::new();
        token.cancel();

        let envelope = runtime
            .execute(
                &NapTool::new(Duration::from_secs(5)),
                Value::Null,
                &ToolContext::new().with_cancellation(token),
            )
            .await;
        assert!(envelope.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_execution() {
        let runtime = ToolRuntime::new(CapabilityPolicy::allow_all());
        let token = CancellationToken::new();
        let ctx = ToolContext::new().with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });
        let envelope = runtime
            .execute(&NapTool::new(Duration::from_secs(5)), Value::Null, &ctx)
            .await;
        canceller.await.unwrap();

        assert_eq!(envelope.get_error().unwrap().kind, ToolErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn test_runtime_provenance_wins() {
        let runtime = ToolRuntime::new(CapabilityPolicy::allow_all());
        let ctx = ToolContext::new()
            .with_agent_id("research_agent")
            .with_trace_id("session-7");

        let envelope = runtime
            .execute(&NapTool::new(Duration::from_millis(10)), Value::Null, &ctx)
            .await;

        assert_eq!(envelope.provenance.agent_id.as_deref(), Some("research_agent"));
        assert_eq!(envelope.provenance.trace_id.as_deref(), Some("session-7"));
        assert!(envelope.provenance.duration >= Duration::from_millis(10));
        assert_eq!(envelope.provenance.policy_decisions.len(), 1);
    }

    #[tokio::test]
    async fn test_execute_simple_unwraps() {
        let runtime = ToolRuntime::new(CapabilityPolicy::allow_all());
        let value = runtime
            .execute_simple(&NapTool::new(Duration::ZERO), Value::Null, &ToolContext::new())
            .await
            .unwrap();
        assert_eq!(value, json!({"awake": true}));

        let denied = ToolRuntime::new(CapabilityPolicy::deny_all())
            .execute_simple(&NoteTool::new(), note(), &ToolContext::new())
            .await
            .unwrap_err();
        assert_eq!(denied.kind, ToolErrorKind::CapabilityDenied);
    }
}
