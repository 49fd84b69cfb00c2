//! Knowledge lookups performed on behalf of the agents

use super::state::AssistantState;
use crate::error::{RasaError, Result};
use crate::knowledge::{KnowledgeBank, TopicSummary};

/// Saved knowledge the study agent grounds its answer in
///
/// Summarizes the routed topic. Nothing stored is not an error; the summary
/// then carries the empty marker and a count of zero.
///
/// # Errors
///
/// Returns `InvalidInput` if the state has not been routed to a topic.
pub fn study_context(bank: &KnowledgeBank, state: &AssistantState) -> Result<TopicSummary> {
    let topic = state
        .research_topic
        .as_deref()
        .ok_or_else(|| RasaError::blank("research_topic"))?;

    let summary = bank.summarize_topic_knowledge(topic)?;
    tracing::debug!(
        session_id = %state.session_id,
        user_id = %state.user_id,
        topic = %summary.topic,
        count = summary.count,
        "Loaded study context"
    );
    Ok(summary)
}
