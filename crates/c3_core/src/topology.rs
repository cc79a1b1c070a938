//! Standard hierarchy resolution.
//!
//! A Standard network is at most two tiers deep: slaves report to a master,
//! and masters may in turn report to a dual-module company commander. The
//! stored master reference is only a request; whether it still holds is
//! decided here, on every call, against the live roster and the jamming
//! oracle.
//!
//! Single-hop validity:
//!
//! | Observed                                         | Stored reference | Result        |
//! |--------------------------------------------------|------------------|---------------|
//! | master gone from the game                         | cleared          | no master     |
//! | master shut down                                  | kept             | latent        |
//! | master lost its master hardware                   | cleared          | no master     |
//! | sub-master points at a non company commander      | cleared          | no master     |
//! | company commander lost its second module          | cleared          | no master     |
//! | chain deeper than the depth limit                 | cleared          | no master     |
//! | otherwise                                         | kept             | master        |
//!
//! Only [`NetworkRegistry::resolve_master`] writes the clearing back; every
//! other query treats a severed link as absent without touching state.

use crate::error::{NetworkError, Result};
use crate::jamming::{JammingOracle, NoJamming};
use crate::membership::NetworkKind;
use crate::registry::NetworkRegistry;
use crate::rules::JammingConsistency;
use crate::units::{Roster, UnitId, UnitInfo};

/// Why a stored master reference is permanently invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeverReason {
    /// The master left the game or was destroyed.
    MasterGone,
    /// The master no longer carries master hardware.
    MasterLostHardware,
    /// A sub-master points at a unit that is not a company commander.
    NotCompanyCommander,
    /// The unit was a company commander but lost its second module.
    LostDualModule,
    /// Following stored references exceeds the depth limit or loops.
    DepthExceeded,
}

/// Single-hop classification of a unit's master reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MasterLink {
    /// Not an active Standard unit.
    Unnetworked,
    /// Standard unit without a master reference.
    Independent,
    /// Self-referencing dual-module unit acting as company commander.
    CompanyCommander,
    /// Valid reference to a reachable master.
    Linked(UnitId),
    /// Reference kept, but the master is shut down and temporarily unreachable.
    Latent(UnitId),
    /// Reference is permanently invalid.
    Severed(SeverReason),
}

impl MasterLink {
    /// Master this link points at while it still occupies a slot.
    #[must_use]
    pub const fn holds_slot_under(self) -> Option<UnitId> {
        match self {
            Self::Linked(master) | Self::Latent(master) => Some(master),
            _ => None,
        }
    }
}

impl NetworkRegistry {
    /// Classify a unit's stored master reference without modifying anything.
    #[must_use]
    pub fn inspect_master(&self, roster: &impl Roster, id: UnitId) -> MasterLink {
        let Some(unit) = roster.live_unit(id) else {
            return MasterLink::Unnetworked;
        };
        if unit.kind() != NetworkKind::Standard {
            return MasterLink::Unnetworked;
        }

        let Some(master_id) = self.view(unit).master() else {
            return MasterLink::Independent;
        };

        if master_id == id {
            if !unit.shut_down && !unit.hardware.dual_module {
                return MasterLink::Severed(SeverReason::LostDualModule);
            }
            return MasterLink::CompanyCommander;
        }

        let Some(master) = roster.live_unit(master_id) else {
            return MasterLink::Severed(SeverReason::MasterGone);
        };
        if master.shut_down {
            return MasterLink::Latent(master_id);
        }
        if !master.hardware.standard_master {
            return MasterLink::Severed(SeverReason::MasterLostHardware);
        }
        if unit.hardware.standard_master && !self.is_company_command_role(roster, master_id) {
            return MasterLink::Severed(SeverReason::NotCompanyCommander);
        }
        if self.stored_chain_len(id) > self.rules().max_depth {
            return MasterLink::Severed(SeverReason::DepthExceeded);
        }

        MasterLink::Linked(master_id)
    }

    /// Number of stored hops above `id`, stopping at a self reference.
    ///
    /// Gives up one hop past the depth limit, so loops terminate.
    fn stored_chain_len(&self, id: UnitId) -> u32 {
        let limit = self.rules().max_depth + 1;
        let mut current = id;
        let mut hops = 0;
        while hops < limit {
            match self.get(current).and_then(|record| record.master()) {
                Some(next) if next != current => {
                    current = next;
                    hops += 1;
                }
                _ => break,
            }
        }
        hops
    }

    /// Resolve a unit's master, clearing the stored reference if it is
    /// permanently invalid.
    ///
    /// Returns the unit itself for a company commander and `None` for an
    /// independent, unnetworked, latent or severed link.
    pub fn resolve_master(&mut self, roster: &impl Roster, id: UnitId) -> Option<UnitId> {
        match self.inspect_master(roster, id) {
            MasterLink::Linked(master) => Some(master),
            MasterLink::CompanyCommander => Some(id),
            MasterLink::Severed(reason) => {
                tracing::trace!(unit = id, ?reason, "Severing stale master reference");
                if let Some(record) = self.stored_mut(id) {
                    record.set_master(None);
                }
                None
            }
            MasterLink::Unnetworked | MasterLink::Independent | MasterLink::Latent(_) => None,
        }
    }

    /// Whether a unit currently holds the company command role.
    #[must_use]
    pub fn is_company_command_role(&self, roster: &impl Roster, id: UnitId) -> bool {
        roster.live_unit(id).is_some_and(|unit| {
            unit.kind() == NetworkKind::Standard
                && unit.hardware.dual_module
                && self.view(unit).master() == Some(id)
        })
    }

    /// Highest reachable unit of a Standard hierarchy.
    ///
    /// Walks master references up to the depth limit, re-testing jamming on
    /// both ends of every hop. Units outside the Standard kind, and units
    /// with no reachable master, are their own top.
    pub fn resolve_top(
        &self,
        roster: &impl Roster,
        oracle: &impl JammingOracle,
        id: UnitId,
    ) -> Result<UnitId> {
        let mut current = id;
        for _ in 0..self.rules().max_depth {
            let MasterLink::Linked(master_id) = self.inspect_master(roster, current) else {
                break;
            };
            let (Some(unit), Some(master)) = (roster.unit(current), roster.unit(master_id))
            else {
                break;
            };
            if self.hop_jammed(oracle, unit, master)? {
                break;
            }
            current = master_id;
        }
        Ok(current)
    }

    /// Highest unit of a Standard hierarchy, disregarding jamming.
    #[must_use]
    pub fn resolve_top_ignoring_ecm(&self, roster: &impl Roster, id: UnitId) -> UnitId {
        // NoJamming never reports a boosted-only jam, so the walk cannot fail.
        self.resolve_top(roster, &NoJamming, id).unwrap_or(id)
    }

    fn hop_jammed(
        &self,
        oracle: &impl JammingOracle,
        unit: &UnitInfo,
        master: &UnitInfo,
    ) -> Result<bool> {
        Ok(self.standard_jammed(oracle, unit, master)?
            || self.standard_jammed(oracle, master, unit)?)
    }

    /// Jamming test for one end of a Standard link.
    ///
    /// Boosted hardware is only affected by the boosted test. The boosted
    /// test is stronger than the standard one, so a unit jammed by the
    /// boosted test but clear on the standard test means jamming state is
    /// inconsistent.
    fn standard_jammed(
        &self,
        oracle: &impl JammingOracle,
        unit: &UnitInfo,
        other: &UnitInfo,
    ) -> Result<bool> {
        let standard = oracle.is_jammed(unit, unit.position, other.position);
        if !unit.hardware.boosted {
            return Ok(standard);
        }

        let boosted = oracle.is_jammed_boosted(unit, unit.position, other.position);
        if boosted && !standard {
            match self.rules().jamming_consistency {
                JammingConsistency::Strict => {
                    tracing::error!(
                        unit = unit.id,
                        "Boosted jamming test disagrees with standard test"
                    );
                    return Err(NetworkError::JammingInconsistency { unit: unit.id });
                }
                JammingConsistency::Lenient => {
                    tracing::warn!(
                        unit = unit.id,
                        "Boosted jamming test disagrees with standard test, using standard result"
                    );
                    return Ok(standard);
                }
            }
        }
        Ok(boosted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jamming::NoJamming;
    use crate::rules::NetworkRules;
    use crate::units::{Hardware, UnitInfo, UnitRoster};

    fn lance() -> (UnitRoster, NetworkRegistry) {
        let roster: UnitRoster = [
            UnitInfo::new(1, 0).with_hardware(Hardware::standard_master()),
            UnitInfo::new(2, 0).with_hardware(Hardware::standard_slave()),
            UnitInfo::new(3, 0).with_hardware(Hardware::standard_slave()),
        ]
        .into_iter()
        .collect();
        let mut registry = NetworkRegistry::new(NetworkRules::default());
        for id in [2, 3] {
            let unit = roster.unit(id).expect("unit").clone();
            registry.record_mut(&unit).set_master(Some(1));
        }
        (roster, registry)
    }

    #[test]
    fn test_inspect_linked() {
        let (roster, registry) = lance();
        assert_eq!(registry.inspect_master(&roster, 2), MasterLink::Linked(1));
        assert_eq!(registry.inspect_master(&roster, 1), MasterLink::Independent);
    }

    #[test]
    fn test_master_removed_is_severed_and_cleared() {
        let (mut roster, mut registry) = lance();
        roster.remove(1);
        assert_eq!(
            registry.inspect_master(&roster, 2),
            MasterLink::Severed(SeverReason::MasterGone)
        );
        assert_eq!(registry.resolve_master(&roster, 2), None);
        assert_eq!(registry.get(2).and_then(|r| r.master()), None);
    }

    #[test]
    fn test_master_destroyed_counts_as_gone() {
        let (mut roster, registry) = lance();
        roster.get_mut(1).expect("master").destroyed = true;
        assert_eq!(
            registry.inspect_master(&roster, 2),
            MasterLink::Severed(SeverReason::MasterGone)
        );
    }

    #[test]
    fn test_shut_down_master_is_latent() {
        let (mut roster, mut registry) = lance();
        roster.get_mut(1).expect("master").shut_down = true;
        assert_eq!(registry.inspect_master(&roster, 2), MasterLink::Latent(1));
        assert_eq!(registry.resolve_master(&roster, 2), None);
        assert_eq!(registry.get(2).and_then(|r| r.master()), Some(1));

        roster.get_mut(1).expect("master").shut_down = false;
        assert_eq!(registry.resolve_master(&roster, 2), Some(1));
    }

    #[test]
    fn test_master_lost_hardware() {
        let (mut roster, mut registry) = lance();
        roster.get_mut(1).expect("master").hardware = Hardware::standard_slave();
        assert_eq!(registry.resolve_master(&roster, 2), None);
        assert_eq!(registry.get(2).and_then(|r| r.master()), None);
    }

    #[test]
    fn test_company_commander_lost_second_module() {
        let mut roster: UnitRoster = [UnitInfo::new(1, 0).with_hardware(Hardware::company_master())]
            .into_iter()
            .collect();
        let mut registry = NetworkRegistry::default();
        let unit = roster.unit(1).expect("unit").clone();
        registry.record_mut(&unit).set_master(Some(1));
        assert_eq!(registry.inspect_master(&roster, 1), MasterLink::CompanyCommander);
        assert_eq!(registry.resolve_master(&roster, 1), Some(1));

        roster.get_mut(1).expect("unit").hardware = Hardware::standard_master();
        assert_eq!(registry.resolve_master(&roster, 1), None);
        assert_eq!(registry.get(1).and_then(|r| r.master()), None);
    }

    #[test]
    fn test_sub_master_needs_dual_module_master() {
        let roster: UnitRoster = [
            UnitInfo::new(1, 0).with_hardware(Hardware::standard_master()),
            UnitInfo::new(2, 0).with_hardware(Hardware::standard_master()),
        ]
        .into_iter()
        .collect();
        let mut registry = NetworkRegistry::default();
        // Unit 1 claims the company role with a single module.
        let one = roster.unit(1).expect("unit").clone();
        registry.record_mut(&one).set_master(Some(1));
        let two = roster.unit(2).expect("unit").clone();
        registry.record_mut(&two).set_master(Some(1));

        assert_eq!(
            registry.inspect_master(&roster, 2),
            MasterLink::Severed(SeverReason::NotCompanyCommander)
        );
    }

    #[test]
    fn test_stored_loop_is_depth_exceeded() {
        let roster: UnitRoster = [
            UnitInfo::new(1, 0).with_hardware(Hardware::standard_slave()),
            UnitInfo::new(2, 0).with_hardware(Hardware::standard_master()),
        ]
        .into_iter()
        .collect();
        let mut registry = NetworkRegistry::default();
        let one = roster.unit(1).expect("unit").clone();
        registry.record_mut(&one).set_master(Some(2));
        let two = roster.unit(2).expect("unit").clone();
        registry.record_mut(&two).set_master(Some(1));

        // Unit 2's own link is severed: unit 1 carries no master hardware.
        assert_eq!(
            registry.inspect_master(&roster, 2),
            MasterLink::Severed(SeverReason::MasterLostHardware)
        );
        assert_eq!(
            registry.inspect_master(&roster, 1),
            MasterLink::Severed(SeverReason::DepthExceeded)
        );
    }

    #[test]
    fn test_resolve_top_of_lance() {
        let (roster, registry) = lance();
        assert_eq!(registry.resolve_top(&roster, &NoJamming, 2), Ok(1));
        assert_eq!(registry.resolve_top(&roster, &NoJamming, 1), Ok(1));
        assert_eq!(registry.resolve_top_ignoring_ecm(&roster, 3), 1);
    }
}
