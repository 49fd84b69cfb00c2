//! Typed assistant state shared between the router and the agents

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
        }
    }
}

/// Which agent should handle a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Intent {
    /// Multi-step research that may save findings
    Research,
    /// Tutoring grounded in saved findings
    Study,
    /// Anything else
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Research => "RESEARCH",
            Intent::Study => "STUDY",
            Intent::General => "GENERAL",
        }
    }

    /// Agent identifier used for tool provenance
    pub fn agent_id(&self) -> &'static str {
        match self {
            Intent::Research => "research_agent",
            Intent::Study => "study_agent",
            Intent::General => "general_agent",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State carried through one assistant session
///
/// `messages` only ever grows. `intent` and `research_topic` are unset until
/// the router has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantState {
    pub messages: Vec<Message>,
    pub user_id: String,
    pub research_topic: Option<String>,
    pub intent: Option<Intent>,
    pub session_id: String,
}

impl AssistantState {
    /// Empty state for `user_id` with a fresh session id
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            user_id: user_id.into(),
            research_topic: None,
            intent: None,
            session_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append a user message
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Message::user(content));
    }

    /// Most recent user message, if any
    pub fn last_user_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }
}
