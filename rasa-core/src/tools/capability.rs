//! What a tool may touch, and which agent may call it
//!
//! Each tool declares the capabilities it needs. A [`CapabilityPolicy`]
//! grants nothing unless told to; the study agent gets knowledge reads, the
//! research agent also gets knowledge writes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Summarize or list the knowledge bank
    MemoryRead,
    /// Append findings to the knowledge bank
    MemoryWrite,
}

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::MemoryRead, Capability::MemoryWrite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::MemoryRead => "memory_read",
            Capability::MemoryWrite => "memory_write",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of capabilities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_capabilities(caps: impl IntoIterator<Item = Capability>) -> Self {
        caps.into_iter().collect()
    }

    /// Returns false if the capability was already present
    pub fn insert(&mut self, cap: Capability) -> bool {
        self.0.insert(cap)
    }

    pub fn contains(&self, cap: Capability) -> bool {
        self.0.contains(&cap)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    /// Wire names in a stable order
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|c| c.as_str()).collect()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Grants capabilities to an agent
///
/// The default policy grants nothing. A denial overrides any grant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityPolicy {
    granted: CapabilitySet,
    revoked: CapabilitySet,
}

impl CapabilityPolicy {
    pub fn deny_all() -> Self {
        Self::default()
    }

    pub fn allow_all() -> Self {
        Self::deny_all().allow_many(Capability::ALL)
    }

    /// Knowledge reads and writes
    pub fn research_agent() -> Self {
        Self::deny_all().allow_many([Capability::MemoryRead, Capability::MemoryWrite])
    }

    /// Knowledge reads only
    pub fn study_agent() -> Self {
        Self::deny_all().allow(Capability::MemoryRead)
    }

    pub fn allow(self, cap: Capability) -> Self {
        self.allow_many([cap])
    }

    pub fn allow_many(mut self, caps: impl IntoIterator<Item = Capability>) -> Self {
        for cap in caps {
            self.granted.insert(cap);
            self.revoked.0.remove(&cap);
        }
        self
    }

    pub fn deny(mut self, cap: Capability) -> Self {
        self.revoked.insert(cap);
        self.granted.0.remove(&cap);
        self
    }

    pub fn is_allowed(&self, cap: Capability) -> bool {
        self.granted.contains(cap) && !self.revoked.contains(cap)
    }

    /// Check a tool's requirements, returning the ones not granted
    pub fn check_all(&self, required: &CapabilitySet) -> Result<(), CapabilitySet> {
        let missing: CapabilitySet = required.iter().filter(|c| !self.is_allowed(*c)).collect();
        if missing.is_empty() { Ok(()) } else { Err(missing) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_grants_nothing() {
        let policy = CapabilityPolicy::default();
        assert!(Capability::ALL.iter().all(|c| !policy.is_allowed(*c)));
    }

    #[test]
    fn test_agent_presets() {
        let research = CapabilityPolicy::research_agent();
        assert!(Capability::ALL.iter().all(|c| research.is_allowed(*c)));
        assert_eq!(
            serde_json::to_value(Capability::ALL).unwrap(),
            serde_json::json!(["memory_read", "memory_write"])
        );

        let study = CapabilityPolicy::study_agent();
        assert!(study.is_allowed(Capability::MemoryRead));
        assert!(!study.is_allowed(Capability::MemoryWrite));
    }

    #[test]
    fn test_deny_overrides_allow_all() {
        let policy = CapabilityPolicy::allow_all().deny(Capability::MemoryWrite);
        assert!(!policy.is_allowed(Capability::MemoryWrite));
        assert!(policy.is_allowed(Capability::MemoryRead));

        let policy = policy.allow(Capability::MemoryWrite);
        assert!(policy.is_allowed(Capability::MemoryWrite));
    }

    #[test]
    fn test_check_all_returns_missing() {
        let policy = CapabilityPolicy::study_agent();
        assert!(policy
            .check_all(&CapabilitySet::from_capabilities([Capability::MemoryRead]))
            .is_ok());

        let missing = policy
            .check_all(&CapabilitySet::from_capabilities([
                Capability::MemoryRead,
                Capability::MemoryWrite,
            ]))
            .unwrap_err();
        assert_eq!(missing.names(), vec!["memory_write"]);
    }

    #[test]
    fn test_set_is_ordered_and_serializes_as_list() {
        let mut set = CapabilitySet::from_capabilities([Capability::MemoryWrite, Capability::MemoryRead]);
        assert!(!set.insert(Capability::MemoryWrite));
        assert_eq!(set.names(), vec!["memory_read", "memory_write"]);
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            serde_json::json!(["memory_read", "memory_write"])
        );
    }
}
