//! Free slot counting.
//!
//! Capacity is recounted from the whole roster on every call. There are no
//! incremental counters to drift out of step with destruction, shutdown or
//! hardware loss.

use crate::membership::NetworkKind;
use crate::registry::NetworkRegistry;
use crate::units::{Roster, UnitId};

impl NetworkRegistry {
    /// Sub-master attachments a unit can still accept.
    ///
    /// Only a unit in the company command role has sub-master slots.
    #[must_use]
    pub fn free_master_slots(&self, roster: &impl Roster, id: UnitId) -> u32 {
        if !self.is_company_command_role(roster, id) {
            return 0;
        }
        self.remaining_under(roster, id, self.rules().company_sub_master_slots)
    }

    /// Final slave attachments (Standard) or further members (mesh kinds)
    /// a unit's network can still accept.
    #[must_use]
    pub fn free_slave_slots(&self, roster: &impl Roster, id: UnitId) -> u32 {
        let Some(unit) = roster.live_unit(id) else {
            return 0;
        };

        match unit.kind() {
            NetworkKind::None => 0,
            NetworkKind::Standard => {
                if !unit.hardware.standard_master || self.is_company_command_role(roster, id) {
                    return 0;
                }
                self.remaining_under(roster, id, self.rules().lance_slave_slots)
            }
            kind => {
                let record = self.view(unit);
                // The unit itself occupies one place in its own network.
                self.mesh_free_slots(roster, kind, record.network_id(), id)
                    .saturating_sub(1)
            }
        }
    }

    /// Places left in a mesh network for `joiner`.
    ///
    /// `joiner` is never counted as a member, so a request is allowed while
    /// this is non-zero. Units with a pending NovaMesh switch into the
    /// network count as members.
    #[must_use]
    pub fn mesh_free_slots(
        &self,
        roster: &impl Roster,
        kind: NetworkKind,
        network_id: &str,
        joiner: UnitId,
    ) -> u32 {
        let Some(ceiling) = self.rules().mesh_ceiling(kind) else {
            return 0;
        };
        let mut free = ceiling;

        for other_id in roster.unit_ids() {
            if free == 0 {
                return 0;
            }
            if other_id == joiner {
                continue;
            }
            let Some(other) = roster.live_unit(other_id) else {
                continue;
            };
            if other.kind() != kind {
                continue;
            }
            let record = self.view(other);
            if record.network_id() == network_id || record.pending_network_id() == Some(network_id)
            {
                free -= 1;
            }
        }

        free
    }

    /// Ceiling minus units whose link still occupies a slot under `id`.
    fn remaining_under(&self, roster: &impl Roster, id: UnitId, ceiling: u32) -> u32 {
        let mut free = ceiling;
        for other_id in roster.unit_ids() {
            if free == 0 {
                return 0;
            }
            if other_id == id {
                continue;
            }
            if self.inspect_master(roster, other_id).holds_slot_under() == Some(id) {
                free -= 1;
            }
        }
        free
    }
}

#[cfg(test)]
mod tests {
    use crate::membership::NetworkKind;
    use crate::registry::NetworkRegistry;
    use crate::units::{Hardware, Roster, UnitInfo, UnitRoster};

    fn attach(registry: &mut NetworkRegistry, roster: &UnitRoster, id: u64, master: u64) {
        let unit = roster.unit(id).expect("unit").clone();
        registry.record_mut(&unit).set_master(Some(master));
    }

    #[test]
    fn test_plain_master_slave_slots() {
        let roster: UnitRoster = std::iter::once(
            UnitInfo::new(1, 0).with_hardware(Hardware::standard_master()),
        )
        .chain((2..=5).map(|id| UnitInfo::new(id, 0).with_hardware(Hardware::standard_slave())))
        .collect();
        let mut registry = NetworkRegistry::default();

        assert_eq!(registry.free_slave_slots(&roster, 1), 3);
        assert_eq!(registry.free_master_slots(&roster, 1), 0);
        for (expected, slave) in [(2, 2), (1, 3), (0, 4)] {
            attach(&mut registry, &roster, slave, 1);
            assert_eq!(registry.free_slave_slots(&roster, 1), expected);
        }
        // A fourth stored reference never drives the count negative.
        attach(&mut registry, &roster, 5, 1);
        assert_eq!(registry.free_slave_slots(&roster, 1), 0);
    }

    #[test]
    fn test_slave_hardware_has_no_slots() {
        let roster: UnitRoster = [UnitInfo::new(1, 0).with_hardware(Hardware::standard_slave())]
            .into_iter()
            .collect();
        let registry = NetworkRegistry::default();
        assert_eq!(registry.free_slave_slots(&roster, 1), 0);
        assert_eq!(registry.free_master_slots(&roster, 1), 0);
    }

    #[test]
    fn test_missing_unit_has_no_slots() {
        let roster = UnitRoster::new();
        let registry = NetworkRegistry::default();
        assert_eq!(registry.free_slave_slots(&roster, 1), 0);
        assert_eq!(registry.free_master_slots(&roster, 1), 0);
    }

    #[test]
    fn test_company_commander_slots() {
        let roster: UnitRoster = [
            UnitInfo::new(1, 0).with_hardware(Hardware::company_master()),
            UnitInfo::new(2, 0).with_hardware(Hardware::standard_master()),
        ]
        .into_iter()
        .collect();
        let mut registry = NetworkRegistry::default();

        // Not yet in the company role: behaves as a plain master.
        assert_eq!(registry.free_master_slots(&roster, 1), 0);
        assert_eq!(registry.free_slave_slots(&roster, 1), 3);

        attach(&mut registry, &roster, 1, 1);
        assert_eq!(registry.free_master_slots(&roster, 1), 2);
        assert_eq!(registry.free_slave_slots(&roster, 1), 0);

        attach(&mut registry, &roster, 2, 1);
        assert_eq!(registry.free_master_slots(&roster, 1), 1);
    }

    #[test]
    fn test_mesh_slots_count_network_members() {
        let roster: UnitRoster = (1..=7)
            .map(|id| UnitInfo::new(id, 0).with_hardware(Hardware::improved()))
            .collect();
        let mut registry = NetworkRegistry::default();
        assert_eq!(registry.free_slave_slots(&roster, 1), 5);

        for id in 2..=6 {
            let unit = roster.unit(id).expect("unit").clone();
            registry.record_mut(&unit).set_network_id("C3i.1");
        }
        assert_eq!(registry.free_slave_slots(&roster, 1), 0);
        assert_eq!(
            registry.mesh_free_slots(&roster, NetworkKind::Improved, "C3i.7", 7),
            6
        );
    }

    #[test]
    fn test_nova_pending_joiners_reserve_slots() {
        let roster: UnitRoster = (1..=3)
            .map(|id| UnitInfo::new(id, 0).with_hardware(Hardware::nova()))
            .collect();
        let mut registry = NetworkRegistry::default();
        assert_eq!(registry.free_slave_slots(&roster, 1), 2);

        let two = roster.unit(2).expect("unit").clone();
        assert!(registry.record_mut(&two).set_pending("NovaMesh.1".into()));
        assert_eq!(registry.free_slave_slots(&roster, 1), 1);
    }
}
