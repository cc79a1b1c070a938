//! Test fixtures and helpers.
//!
//! Pre-built rosters, a jamming oracle driven by explicit unit sets, and a
//! small operation language for scripted and randomized scenarios.

use std::collections::BTreeSet;

use c3_core::hex::HexCoord;
use c3_core::jamming::{JamEffects, JammingOracle};
use c3_core::registry::NetworkRegistry;
use c3_core::units::{Domain, Hardware, TeamId, UnitId, UnitInfo, UnitRoster};

/// Jamming oracle whose answers are set directly per unit.
///
/// Unlike a real oracle it can be made inconsistent on purpose, by marking
/// a unit jammed on the boosted test only.
#[derive(Debug, Clone, Default)]
pub struct ScriptedJamming {
    jammed: BTreeSet<UnitId>,
    boosted: BTreeSet<UnitId>,
    mesh: BTreeSet<UnitId>,
}

impl ScriptedJamming {
    /// Oracle with nothing jammed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Jam a unit on the standard test.
    pub fn jam(&mut self, id: UnitId) {
        self.jammed.insert(id);
    }

    /// Jam a unit on both the standard and boosted tests.
    pub fn jam_hard(&mut self, id: UnitId) {
        self.jammed.insert(id);
        self.boosted.insert(id);
    }

    /// Jam a unit on the boosted test only.
    pub fn jam_boosted_only(&mut self, id: UnitId) {
        self.boosted.insert(id);
    }

    /// Subject a unit to mesh jamming.
    pub fn jam_mesh(&mut self, id: UnitId) {
        self.mesh.insert(id);
    }

    /// Lift every effect on a unit.
    pub fn clear(&mut self, id: UnitId) {
        self.jammed.remove(&id);
        self.boosted.remove(&id);
        self.mesh.remove(&id);
    }
}

impl JammingOracle for ScriptedJamming {
    fn is_jammed(&self, unit: &UnitInfo, _from: HexCoord, _to: HexCoord) -> bool {
        self.jammed.contains(&unit.id)
    }

    fn is_jammed_boosted(&self, unit: &UnitInfo, _from: HexCoord, _to: HexCoord) -> bool {
        self.boosted.contains(&unit.id)
    }

    fn jam_effects(&self, unit: &UnitInfo, _from: HexCoord, _to: HexCoord) -> JamEffects {
        let is_mesh_jamming = self.mesh.contains(&unit.id);
        let strength = u32::from(is_mesh_jamming) + u32::from(self.jammed.contains(&unit.id));
        JamEffects {
            is_mesh_jamming,
            strength,
        }
    }
}

/// Fluent roster construction.
///
/// Units are friendly (team 0) on the ground at the origin unless stated.
#[derive(Debug, Clone, Default)]
pub struct RosterBuilder {
    roster: UnitRoster,
}

impl RosterBuilder {
    /// Start an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit with the given hardware.
    #[must_use]
    pub fn with(mut self, id: UnitId, hardware: Hardware) -> Self {
        self.roster
            .insert(UnitInfo::new(id, 0).with_hardware(hardware));
        self
    }

    /// Add a fully specified unit.
    #[must_use]
    pub fn unit(mut self, unit: UnitInfo) -> Self {
        self.roster.insert(unit);
        self
    }

    /// Add a dual-module Standard master.
    #[must_use]
    pub fn company_master(self, id: UnitId) -> Self {
        self.with(id, Hardware::company_master())
    }

    /// Add a single-module Standard master.
    #[must_use]
    pub fn master(self, id: UnitId) -> Self {
        self.with(id, Hardware::standard_master())
    }

    /// Add a Standard slave.
    #[must_use]
    pub fn slave(self, id: UnitId) -> Self {
        self.with(id, Hardware::standard_slave())
    }

    /// Add an Improved unit.
    #[must_use]
    pub fn improved(self, id: UnitId) -> Self {
        self.with(id, Hardware::improved())
    }

    /// Add a NovaMesh unit with its hardware switched on.
    #[must_use]
    pub fn nova(self, id: UnitId) -> Self {
        self.with(id, Hardware::nova())
    }

    /// Add a Naval vessel in space at `position`.
    #[must_use]
    pub fn naval(self, id: UnitId, position: HexCoord) -> Self {
        self.unit(
            UnitInfo::new(id, 0)
                .with_hardware(Hardware::naval())
                .at(position)
                .in_domain(Domain::Space),
        )
    }

    /// Add a unit on another team.
    #[must_use]
    pub fn enemy(self, id: UnitId, team: TeamId, hardware: Hardware) -> Self {
        self.unit(UnitInfo::new(id, team).with_hardware(hardware))
    }

    /// Finish the roster.
    #[must_use]
    pub fn build(self) -> UnitRoster {
        self.roster
    }
}

/// Company commander 1 with sub-masters 2 and 3, slaves 4-5 under 2 and
/// 6-7 under 3. Unit 8 is an unattached master.
#[must_use]
pub fn company_fixture() -> (UnitRoster, NetworkRegistry) {
    let roster = RosterBuilder::new()
        .company_master(1)
        .master(2)
        .master(3)
        .slave(4)
        .slave(5)
        .slave(6)
        .slave(7)
        .master(8)
        .build();

    let mut registry = NetworkRegistry::default();
    for (unit, master) in [(1, 1), (2, 1), (3, 1), (4, 2), (5, 2), (6, 3), (7, 3)] {
        let attached = registry.attach_to_master(&roster, unit, Some(master));
        assert!(attached, "fixture attachment {unit} -> {master} refused");
    }
    (roster, registry)
}

/// One step of a scripted or generated scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkOp {
    /// Standard reattachment.
    Attach(UnitId, Option<UnitId>),
    /// Mesh join.
    Join(UnitId, UnitId),
    /// Mesh leave.
    Leave(UnitId),
    /// Round boundary.
    BeginRound,
    /// Unit leaves the game.
    Remove(UnitId),
    /// Power state flips.
    ToggleShutdown(UnitId),
    /// Self-healing master resolution.
    ResolveMaster(UnitId),
}

/// Apply one operation to a roster and registry.
///
/// `round` is advanced on each [`NetworkOp::BeginRound`].
pub fn apply_op(
    registry: &mut NetworkRegistry,
    roster: &mut UnitRoster,
    round: &mut u32,
    op: &NetworkOp,
) {
    tracing::trace!(?op, "Applying network op");
    match *op {
        NetworkOp::Attach(unit, master) => {
            registry.attach_to_master(roster, unit, master);
        }
        NetworkOp::Join(unit, member) => {
            registry.join_network(roster, unit, member);
        }
        NetworkOp::Leave(unit) => {
            registry.leave_network(roster, unit);
        }
        NetworkOp::BeginRound => {
            *round += 1;
            registry.begin_round(roster, *round);
        }
        NetworkOp::Remove(unit) => {
            roster.remove(unit);
        }
        NetworkOp::ToggleShutdown(unit) => {
            if let Some(info) = roster.get_mut(unit) {
                info.shut_down = !info.shut_down;
            }
        }
        NetworkOp::ResolveMaster(unit) => {
            registry.resolve_master(roster, unit);
        }
    }
}

/// Apply a whole script, returning the final round number.
pub fn run_script(registry: &mut NetworkRegistry, roster: &mut UnitRoster, ops: &[NetworkOp]) -> u32 {
    let mut round = 0;
    for op in ops {
        apply_op(registry, roster, &mut round, op);
    }
    round
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_fixture_shape() {
        let (roster, registry) = company_fixture();
        assert_eq!(roster.len(), 8);
        assert!(registry.is_company_command_role(&roster, 1));
        assert_eq!(registry.get(6).and_then(|r| r.master()), Some(3));
        assert_eq!(registry.get(6).map(|r| r.network_id()), Some("C3.1"));
    }

    #[test]
    fn test_scripted_jamming_toggles() {
        let unit = UnitInfo::new(1, 0);
        let mut oracle = ScriptedJamming::new();
        assert!(!oracle.is_jammed(&unit, unit.position, unit.position));
        oracle.jam(1);
        assert!(oracle.is_jammed(&unit, unit.position, unit.position));
        oracle.clear(1);
        assert!(!oracle.is_jammed(&unit, unit.position, unit.position));
    }

    #[test]
    fn test_run_script_counts_rounds() {
        let mut roster = RosterBuilder::new().master(1).slave(2).build();
        let mut registry = NetworkRegistry::default();
        let round = run_script(
            &mut registry,
            &mut roster,
            &[
                NetworkOp::Attach(2, Some(1)),
                NetworkOp::BeginRound,
                NetworkOp::BeginRound,
            ],
        );
        assert_eq!(round, 2);
        assert_eq!(registry.get(2).and_then(|r| r.master()), Some(1));
    }
}
