//! Request routing between the research and study agents
//!
//! A conversation lives in an [`AssistantState`]. The [`IntentRouter`] reads
//! the latest user message, picks an [`Intent`] and topic, and records both
//! in the state. The study agent then pulls its grounding from the knowledge
//! bank with [`study_context`].

mod context;
mod router;
mod state;

pub use context::study_context;
pub use router::{IntentRouter, RouteDecision};
pub use state::{AssistantState, Intent, Message, Role};

use crate::config::RouterConfig;
use crate::error::Result;

/// Route `state` with the default keyword router
pub fn route(state: &mut AssistantState) -> Result<RouteDecision> {
    IntentRouter::new(&RouterConfig::default())?.route(state)
}
