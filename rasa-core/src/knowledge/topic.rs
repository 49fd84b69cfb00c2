//! Topic key normalization

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RasaError, Result};

/// Normalized topic key used to group findings
///
/// Normalization trims surrounding whitespace, collapses internal whitespace
/// runs to a single space, and case-folds: lowercase, then `ß` becomes `ss`
/// and final sigma becomes `σ`. Applying it twice yields the same key, so
/// `"Photosynthesis"` and `"  photosynthesis "` share one entry, as do
/// `"STRASSE"` and `"Straße"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicKey(String);

impl TopicKey {
    /// Normalize a raw topic into a key
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the topic is empty or whitespace-only.
    pub fn parse(raw: &str) -> Result<Self> {
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return Err(RasaError::blank("topic"));
        }
        Ok(Self(fold_case(&collapsed)))
    }

    /// The normalized key text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TopicKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lowercase plus the two folds `to_lowercase` misses
fn fold_case(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        match c {
            'ß' => folded.push_str("ss"),
            'ς' => folded.push('σ'),
            c => folded.push(c),
        }
    }
    folded
}

/// Caller-facing spelling of a topic: trimmed, whitespace collapsed, case kept
pub(crate) fn display_form(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_whitespace_fold_to_same_key() {
        let a = TopicKey::parse("Photosynthesis").unwrap();
        let b = TopicKey::parse(" photosynthesis ").unwrap();
        let c = TopicKey::parse("PHOTOSYNTHESIS\t").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.as_str(), "photosynthesis");
    }

    #[test]
    fn test_sharp_s_and_final_sigma_fold() {
        assert_eq!(
            TopicKey::parse("STRASSE").unwrap(),
            TopicKey::parse("Straße").unwrap()
        );
        assert_eq!(TopicKey::parse("ẞ").unwrap().as_str(), "ss");
        assert_eq!(
            TopicKey::parse("ΟΔΟΣ").unwrap(),
            TopicKey::parse("οδος").unwrap()
        );
        let folded = TopicKey::parse("Straße").unwrap();
        assert_eq!(TopicKey::parse(folded.as_str()).unwrap(), folded);
    }

    #[test]
    fn test_internal_whitespace_collapses() {
        let key = TopicKey::parse("  Quantum \n  Computing ").unwrap();
        assert_eq!(key.as_str(), "quantum computing");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = TopicKey::parse(" Cell   Biology ").unwrap();
        let twice = TopicKey::parse(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_blank_topic_rejected() {
        assert!(TopicKey::parse("").unwrap_err().is_invalid_input());
        assert!(TopicKey::parse("   \t\n").unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_display_form_keeps_case() {
        assert_eq!(display_form("  Quantum   Computing "), "Quantum Computing");
    }
}
