//! Keyword intent router
//!
//! Decides which agent handles the latest user message and which topic it is
//! about. Research keywords win over study keywords; anything else is a
//! general inquiry.

use super::state::{AssistantState, Intent};
use crate::config::RouterConfig;
use crate::error::{RasaError, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Outcome of routing one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub intent: Intent,
    /// Topic as written in the message (case preserved)
    pub topic: String,
    /// Keyword that selected the intent, if any
    pub matched_keyword: Option<String>,
}

/// Rule-based router built from [`RouterConfig`]
#[derive(Debug, Clone)]
pub struct IntentRouter {
    research_keywords: Vec<String>,
    study_keywords: Vec<String>,
    delimiter: Regex,
    sentence_end: Regex,
    general_topic: String,
}

impl IntentRouter {
    /// Build a router from configuration
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if both keyword lists are empty, the delimiter
    /// is blank, or a pattern fails to compile.
    pub fn new(config: &RouterConfig) -> Result<Self> {
        let normalize = |keywords: &[String]| -> Vec<String> {
            keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect()
        };
        let research_keywords = normalize(config.research_keywords.as_slice());
        let study_keywords = normalize(config.study_keywords.as_slice());
        if research_keywords.is_empty() && study_keywords.is_empty() {
            return Err(RasaError::Configuration(
                "router needs at least one keyword".to_string(),
            ));
        }
        if config.topic_delimiter.trim().is_empty() {
            return Err(RasaError::Configuration(
                "router.topic_delimiter must not be blank".to_string(),
            ));
        }

        let delimiter = RegexBuilder::new(&regex::escape(&config.topic_delimiter))
            .case_insensitive(true)
            .build()
            .map_err(|e| RasaError::Configuration(format!("invalid topic delimiter: {}", e)))?;
        let sentence_end = Regex::new(r"[.?!](\s|$)")
            .map_err(|e| RasaError::Configuration(format!("invalid sentence pattern: {}", e)))?;

        Ok(Self {
            research_keywords,
            study_keywords,
            delimiter,
            sentence_end,
            general_topic: config.general_topic.trim().to_string(),
        })
    }

    /// Classify a single message
    pub fn classify(&self, message: &str) -> RouteDecision {
        let lowered = message.to_lowercase();
        let matching = |keywords: &[String]| {
            keywords
                .iter()
                .find(|k| lowered.contains(k.as_str()))
                .cloned()
        };

        let (intent, matched_keyword) = if let Some(k) = matching(self.research_keywords.as_slice()) {
            (Intent::Research, Some(k))
        } else if let Some(k) = matching(self.study_keywords.as_slice()) {
            (Intent::Study, Some(k))
        } else {
            (Intent::General, None)
        };

        let topic = match intent {
            Intent::General => self.general_topic.clone(),
            _ => self
                .extract_topic(message)
                .unwrap_or_else(|| self.general_topic.clone()),
        };

        RouteDecision {
            intent,
            topic,
            matched_keyword,
        }
    }

    /// Text after the last delimiter, up to the end of its sentence
    ///
    /// Falls back to the whole message when the delimiter is absent. Returns
    /// `None` when nothing but punctuation and whitespace is left.
    fn extract_topic(&self, message: &str) -> Option<String> {
        let tail = match self.delimiter.find_iter(message).last() {
            Some(m) => &message[m.end()..],
            None => message,
        };
        let tail = tail.trim_start();
        let sentence = match self.sentence_end.find(tail) {
            Some(m) => &tail[..m.start()],
            None => tail,
        };
        let topic = sentence
            .trim()
            .trim_end_matches(|c: char| c.is_ascii_punctuation())
            .trim_end();

        (!topic.is_empty()).then(|| topic.to_string())
    }

    /// Route the latest user message and record the decision in `state`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the conversation has no user message or the
    /// latest one is blank.
    pub fn route(&self, state: &mut AssistantState) -> Result<RouteDecision> {
        let message = state
            .last_user_message()
            .map(|m| m.content.trim())
            .filter(|m| !m.is_empty())
            .ok_or_else(|| RasaError::blank("messages"))?;

        let decision = self.classify(message);
        tracing::info!(
            session_id = %state.session_id,
            intent = %decision.intent,
            topic = %decision.topic,
            "Routed request"
        );

        state.intent = Some(decision.intent);
        state.research_topic = Some(decision.topic.clone());
        Ok(decision)
    }
}
