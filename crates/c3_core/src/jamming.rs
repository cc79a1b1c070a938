//! Jamming oracle.
//!
//! Jamming is adversarial and position dependent: it can appear or vanish
//! while attacks resolve within a round. The network code therefore asks
//! the oracle afresh on every hop of every query and never stores an
//! answer.

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::units::{TeamId, UnitInfo};

/// Detailed jamming picture used by the NovaMesh path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JamEffects {
    /// A jamming effect strong enough to break a NovaMesh link.
    pub is_mesh_jamming: bool,
    /// Number of hostile emitters covering the path.
    pub strength: u32,
}

/// Answers whether a unit's signal is currently suppressed.
pub trait JammingOracle {
    /// Standard jamming test for `unit` on the path from `from` to `to`.
    fn is_jammed(&self, unit: &UnitInfo, from: HexCoord, to: HexCoord) -> bool;

    /// Upgraded jamming test that also affects boosted hardware.
    ///
    /// Anything that trips this test must also trip [`is_jammed`](Self::is_jammed).
    fn is_jammed_boosted(&self, unit: &UnitInfo, from: HexCoord, to: HexCoord) -> bool;

    /// Detailed effects used by NovaMesh connectivity.
    fn jam_effects(&self, unit: &UnitInfo, from: HexCoord, to: HexCoord) -> JamEffects;
}

/// Oracle for maps with no jamming at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJamming;

impl JammingOracle for NoJamming {
    fn is_jammed(&self, _unit: &UnitInfo, _from: HexCoord, _to: HexCoord) -> bool {
        false
    }

    fn is_jammed_boosted(&self, _unit: &UnitInfo, _from: HexCoord, _to: HexCoord) -> bool {
        false
    }

    fn jam_effects(&self, _unit: &UnitInfo, _from: HexCoord, _to: HexCoord) -> JamEffects {
        JamEffects::default()
    }
}

/// Class of jamming emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EmitterKind {
    /// Regular jammer. Boosted hardware shrugs it off.
    #[default]
    Standard,
    /// Advanced jammer. Defeats boosted hardware and NovaMesh links.
    Angel,
    /// Mesh-disrupting jammer. Defeats NovaMesh links.
    Nova,
}

impl EmitterKind {
    /// Whether this emitter defeats boosted hardware.
    #[must_use]
    pub const fn beats_boost(self) -> bool {
        matches!(self, Self::Angel)
    }

    /// Whether this emitter breaks NovaMesh links.
    #[must_use]
    pub const fn is_mesh_jamming(self) -> bool {
        matches!(self, Self::Angel | Self::Nova)
    }
}

/// A jamming emitter on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emitter {
    /// Side operating the emitter. Friendly emitters never jam.
    pub team: TeamId,
    /// Emitter position.
    pub position: HexCoord,
    /// Coverage radius in hexes.
    pub radius: u32,
    /// Emitter class.
    pub kind: EmitterKind,
}

impl Emitter {
    /// Create a standard emitter.
    #[must_use]
    pub const fn new(team: TeamId, position: HexCoord, radius: u32) -> Self {
        Self {
            team,
            position,
            radius,
            kind: EmitterKind::Standard,
        }
    }

    /// Builder method to set the emitter class.
    #[must_use]
    pub const fn with_kind(mut self, kind: EmitterKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether the emitter covers either endpoint of a path.
    #[must_use]
    pub fn covers(&self, from: HexCoord, to: HexCoord) -> bool {
        self.position.within(from, self.radius) || self.position.within(to, self.radius)
    }
}

/// Oracle backed by a set of emitter bubbles.
///
/// A unit is affected when a hostile emitter's bubble contains either end
/// of the path being tested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcmField {
    emitters: Vec<Emitter>,
}

impl EcmField {
    /// Create an empty field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an emitter.
    pub fn add(&mut self, emitter: Emitter) {
        self.emitters.push(emitter);
    }

    /// Remove every emitter operated by `team`.
    pub fn clear_team(&mut self, team: TeamId) {
        self.emitters.retain(|emitter| emitter.team != team);
    }

    /// All emitters.
    #[must_use]
    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    fn hostile_covering<'a>(
        &'a self,
        unit: &'a UnitInfo,
        from: HexCoord,
        to: HexCoord,
    ) -> impl Iterator<Item = &'a Emitter> + 'a {
        self.emitters
            .iter()
            .filter(move |emitter| emitter.team != unit.team && emitter.covers(from, to))
    }
}

impl JammingOracle for EcmField {
    fn is_jammed(&self, unit: &UnitInfo, from: HexCoord, to: HexCoord) -> bool {
        self.hostile_covering(unit, from, to).next().is_some()
    }

    fn is_jammed_boosted(&self, unit: &UnitInfo, from: HexCoord, to: HexCoord) -> bool {
        self.hostile_covering(unit, from, to)
            .any(|emitter| emitter.kind.beats_boost())
    }

    fn jam_effects(&self, unit: &UnitInfo, from: HexCoord, to: HexCoord) -> JamEffects {
        let mut effects = JamEffects::default();
        for emitter in self.hostile_covering(unit, from, to) {
            effects.strength += 1;
            effects.is_mesh_jamming |= emitter.kind.is_mesh_jamming();
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_at(team: TeamId, q: i32) -> UnitInfo {
        UnitInfo::new(1, team).at(HexCoord::new(q, 0))
    }

    #[test]
    fn test_friendly_emitters_never_jam() {
        let mut field = EcmField::new();
        field.add(Emitter::new(0, HexCoord::ORIGIN, 6));
        let unit = unit_at(0, 2);
        assert!(!field.is_jammed(&unit, unit.position, unit.position));
    }

    #[test]
    fn test_hostile_bubble_jams_inside_radius_only() {
        let mut field = EcmField::new();
        field.add(Emitter::new(1, HexCoord::ORIGIN, 6));

        let inside = unit_at(0, 6);
        let outside = unit_at(0, 7);
        assert!(field.is_jammed(&inside, inside.position, inside.position));
        assert!(!field.is_jammed(&outside, outside.position, outside.position));
    }

    #[test]
    fn test_path_endpoint_coverage() {
        let mut field = EcmField::new();
        field.add(Emitter::new(1, HexCoord::new(20, 0), 2));
        let unit = unit_at(0, 0);
        assert!(field.is_jammed(&unit, unit.position, HexCoord::new(21, 0)));
        assert!(!field.is_jammed(&unit, unit.position, HexCoord::new(10, 0)));
    }

    #[test]
    fn test_boosted_test_needs_angel() {
        let mut field = EcmField::new();
        field.add(Emitter::new(1, HexCoord::ORIGIN, 6));
        let unit = unit_at(0, 1);
        assert!(field.is_jammed(&unit, unit.position, unit.position));
        assert!(!field.is_jammed_boosted(&unit, unit.position, unit.position));

        field.add(Emitter::new(1, HexCoord::ORIGIN, 6).with_kind(EmitterKind::Angel));
        assert!(field.is_jammed_boosted(&unit, unit.position, unit.position));
    }

    #[test]
    fn test_jam_effects_strength_and_mesh() {
        let mut field = EcmField::new();
        field.add(Emitter::new(1, HexCoord::ORIGIN, 6));
        field.add(Emitter::new(1, HexCoord::new(1, 0), 6));
        let unit = unit_at(0, 0);

        let effects = field.jam_effects(&unit, unit.position, unit.position);
        assert_eq!(effects.strength, 2);
        assert!(!effects.is_mesh_jamming);

        field.add(Emitter::new(2, HexCoord::ORIGIN, 1).with_kind(EmitterKind::Nova));
        let effects = field.jam_effects(&unit, unit.position, unit.position);
        assert_eq!(effects.strength, 3);
        assert!(effects.is_mesh_jamming);
    }

    #[test]
    fn test_clear_team() {
        let mut field = EcmField::new();
        field.add(Emitter::new(1, HexCoord::ORIGIN, 6));
        field.add(Emitter::new(2, HexCoord::ORIGIN, 6));
        field.clear_team(1);
        assert_eq!(field.emitters().len(), 1);
    }
}
