//! Ruleset constants for every network kind.
//!
//! All limits live in one data structure so a scenario can override them
//! from a RON document instead of patching code.
//!
//! # Example RON
//!
//! ```ron
//! NetworkRules(
//!     lance_slave_slots: 3,
//!     company_sub_master_slots: 2,
//!     improved_ceiling: 6,
//!     naval_ceiling: 5,
//!     nova_ceiling: 3,
//!     naval_max_range: 60,
//!     max_depth: 2,
//!     jamming_consistency: Strict,
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};
use crate::membership::NetworkKind;

/// Number of peer handle slots persisted for mesh kinds.
pub const PEER_SLOTS: usize = 6;

/// How a topology walk reacts when the boosted jamming test reports a unit
/// jammed but the standard test does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JammingConsistency {
    /// Abort the walk with [`NetworkError::JammingInconsistency`].
    #[default]
    Strict,
    /// Log a warning and use the standard test's answer.
    Lenient,
}

/// Capacity, range and depth limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkRules {
    /// Slaves a plain Standard master may hold.
    pub lance_slave_slots: u32,
    /// Sub-masters a dual-module company commander may hold.
    pub company_sub_master_slots: u32,
    /// Total members of one Improved network.
    pub improved_ceiling: u32,
    /// Total members of one Naval network.
    pub naval_ceiling: u32,
    /// Total members of one NovaMesh network.
    pub nova_ceiling: u32,
    /// Maximum map distance between two Naval members.
    pub naval_max_range: u32,
    /// Maximum hops from a Standard unit to its top.
    pub max_depth: u32,
    /// Reaction to inconsistent jamming answers.
    pub jamming_consistency: JammingConsistency,
}

impl Default for NetworkRules {
    fn default() -> Self {
        Self {
            lance_slave_slots: 3,
            company_sub_master_slots: 2,
            improved_ceiling: 6,
            naval_ceiling: 5,
            nova_ceiling: 3,
            naval_max_range: 60,
            max_depth: 2,
            jamming_consistency: JammingConsistency::Strict,
        }
    }
}

impl NetworkRules {
    /// Parse rules from a RON document. Omitted fields keep their defaults.
    ///
    /// `source` names the document in error messages.
    pub fn from_ron(source: &str, text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| NetworkError::DataParseError {
            path: source.to_string(),
            message: e.to_string(),
        })
    }

    /// Member ceiling for a mesh kind, counting the unit itself.
    ///
    /// Returns `None` for kinds that are not a flat mesh.
    #[must_use]
    pub const fn mesh_ceiling(&self, kind: NetworkKind) -> Option<u32> {
        match kind {
            NetworkKind::Improved => Some(self.improved_ceiling),
            NetworkKind::Naval => Some(self.naval_ceiling),
            NetworkKind::NovaMesh => Some(self.nova_ceiling),
            NetworkKind::None | NetworkKind::Standard => None,
        }
    }

    /// Check the rules for values the network code cannot honour.
    ///
    /// Returns a list of problems; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (name, ceiling) in [
            ("improved_ceiling", self.improved_ceiling),
            ("naval_ceiling", self.naval_ceiling),
            ("nova_ceiling", self.nova_ceiling),
        ] {
            if ceiling == 0 {
                errors.push(format!("{name} must count at least the unit itself"));
            }
            if ceiling as usize > PEER_SLOTS + 1 {
                errors.push(format!(
                    "{name} of {ceiling} exceeds the {PEER_SLOTS} persisted peer slots"
                ));
            }
        }

        if self.max_depth == 0 || self.max_depth > 2 {
            errors.push(format!(
                "max_depth must be 1 or 2, got {}",
                self.max_depth
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_ruleset() {
        let rules = NetworkRules::default();
        assert_eq!(rules.lance_slave_slots, 3);
        assert_eq!(rules.company_sub_master_slots, 2);
        assert_eq!(rules.mesh_ceiling(NetworkKind::Improved), Some(6));
        assert_eq!(rules.mesh_ceiling(NetworkKind::NovaMesh), Some(3));
        assert_eq!(rules.mesh_ceiling(NetworkKind::Naval), Some(5));
        assert_eq!(rules.mesh_ceiling(NetworkKind::Standard), None);
        assert_eq!(rules.naval_max_range, 60);
        assert!(rules.validate().is_empty());
    }

    #[test]
    fn test_from_ron_partial_override() {
        let rules = NetworkRules::from_ron(
            "scenario.ron",
            "NetworkRules(naval_max_range: 30, jamming_consistency: Lenient)",
        )
        .expect("valid rules");
        assert_eq!(rules.naval_max_range, 30);
        assert_eq!(rules.jamming_consistency, JammingConsistency::Lenient);
        assert_eq!(rules.lance_slave_slots, 3);
    }

    #[test]
    fn test_from_ron_reports_source() {
        let err = NetworkRules::from_ron("broken.ron", "NetworkRules(max_depth: \"two\")")
            .expect_err("should fail");
        match err {
            NetworkError::DataParseError { path, .. } => assert_eq!(path, "broken.ron"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_flags_bad_values() {
        let rules = NetworkRules {
            nova_ceiling: 0,
            improved_ceiling: 12,
            max_depth: 3,
            ..NetworkRules::default()
        };
        let errors = rules.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("nova_ceiling")));
        assert!(errors.iter().any(|e| e.contains("improved_ceiling")));
        assert!(errors.iter().any(|e| e.contains("max_depth")));
    }
}
