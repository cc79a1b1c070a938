//! External unit facts the network subsystem reads but never owns.
//!
//! The host simulation decides where units stand, whether they are shut
//! down or destroyed, and which network hardware survives on them. This
//! module defines the read-only view of those facts ([`UnitInfo`]) and the
//! [`Roster`] seam through which every query enumerates the game.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::membership::NetworkKind;

/// Stable identifier for a unit, valid for a whole game session.
pub type UnitId = u64;

/// Identifier for the side a unit fights on.
pub type TeamId = u32;

/// Operating domain of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Domain {
    /// Ground map.
    #[default]
    Ground,
    /// Low or high atmosphere.
    Atmosphere,
    /// Space map.
    Space,
}

/// Network hardware a unit currently carries.
///
/// These flags are derived from equipment state by the host and change
/// only when equipment is damaged, destroyed or repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hardware {
    /// Standard master computer.
    pub standard_master: bool,
    /// Standard slave computer.
    pub standard_slave: bool,
    /// Second master module, allowing company command.
    pub dual_module: bool,
    /// Boosted Standard hardware, hardened against regular jamming.
    pub boosted: bool,
    /// Improved computer.
    pub improved: bool,
    /// Naval computer.
    pub naval: bool,
    /// NovaMesh hardware installed and functional, regardless of mode.
    pub nova_installed: bool,
    /// NovaMesh hardware currently switched on.
    pub nova_enabled: bool,
}

impl Hardware {
    /// No network hardware.
    pub const NONE: Self = Self {
        standard_master: false,
        standard_slave: false,
        dual_module: false,
        boosted: false,
        improved: false,
        naval: false,
        nova_installed: false,
        nova_enabled: false,
    };

    /// A single Standard master module.
    #[must_use]
    pub const fn standard_master() -> Self {
        let mut hw = Self::NONE;
        hw.standard_master = true;
        hw
    }

    /// A dual Standard master module, able to act as company commander.
    #[must_use]
    pub const fn company_master() -> Self {
        let mut hw = Self::NONE;
        hw.standard_master = true;
        hw.dual_module = true;
        hw
    }

    /// A Standard slave computer.
    #[must_use]
    pub const fn standard_slave() -> Self {
        let mut hw = Self::NONE;
        hw.standard_slave = true;
        hw
    }

    /// An Improved computer.
    #[must_use]
    pub const fn improved() -> Self {
        let mut hw = Self::NONE;
        hw.improved = true;
        hw
    }

    /// A Naval computer.
    #[must_use]
    pub const fn naval() -> Self {
        let mut hw = Self::NONE;
        hw.naval = true;
        hw
    }

    /// NovaMesh hardware, switched on.
    #[must_use]
    pub const fn nova() -> Self {
        let mut hw = Self::NONE;
        hw.nova_installed = true;
        hw.nova_enabled = true;
        hw
    }

    /// Builder method to mark Standard hardware as boosted.
    #[must_use]
    pub const fn with_boost(mut self) -> Self {
        self.boosted = true;
        self
    }

    /// Any Standard hardware, master or slave.
    #[must_use]
    pub const fn has_standard(&self) -> bool {
        self.standard_master || self.standard_slave
    }

    /// Network kind implied by this hardware.
    ///
    /// Kinds are mutually exclusive. When damage or a malformed loadout
    /// leaves several flags set, Standard wins, then Improved, Naval and
    /// NovaMesh.
    #[must_use]
    pub const fn kind(&self) -> NetworkKind {
        if self.has_standard() {
            NetworkKind::Standard
        } else if self.improved {
            NetworkKind::Improved
        } else if self.naval {
            NetworkKind::Naval
        } else if self.nova_installed {
            NetworkKind::NovaMesh
        } else {
            NetworkKind::None
        }
    }
}

/// Read-only facts about one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitInfo {
    /// Unit identifier.
    pub id: UnitId,
    /// Owning side.
    pub team: TeamId,
    /// Current map position.
    pub position: HexCoord,
    /// Current operating domain.
    pub domain: Domain,
    /// Powered down (voluntarily or by heat).
    pub shut_down: bool,
    /// Destroyed but not yet removed from the roster.
    pub destroyed: bool,
    /// A stealth or low-signature system is active and suppresses networking.
    pub stealth_active: bool,
    /// Surviving network hardware.
    pub hardware: Hardware,
}

impl UnitInfo {
    /// Create an active ground unit with no network hardware.
    #[must_use]
    pub const fn new(id: UnitId, team: TeamId) -> Self {
        Self {
            id,
            team,
            position: HexCoord::ORIGIN,
            domain: Domain::Ground,
            shut_down: false,
            destroyed: false,
            stealth_active: false,
            hardware: Hardware::NONE,
        }
    }

    /// Builder method to set hardware.
    #[must_use]
    pub const fn with_hardware(mut self, hardware: Hardware) -> Self {
        self.hardware = hardware;
        self
    }

    /// Builder method to set position.
    #[must_use]
    pub const fn at(mut self, position: HexCoord) -> Self {
        self.position = position;
        self
    }

    /// Builder method to set the operating domain.
    #[must_use]
    pub const fn in_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    /// Network kind implied by current hardware.
    #[must_use]
    pub const fn kind(&self) -> NetworkKind {
        self.hardware.kind()
    }

    /// Whether the unit is still an active participant in the game.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.destroyed && !self.shut_down
    }
}

/// Read access to every unit in the game.
///
/// All network queries are recomputed from this view; nothing is cached
/// between calls, so a roster mutated between two queries is always seen
/// in its current state.
pub trait Roster {
    /// Look up a unit by identifier, including destroyed ones.
    fn unit(&self, id: UnitId) -> Option<&UnitInfo>;

    /// All unit identifiers in ascending order.
    fn unit_ids(&self) -> Vec<UnitId>;

    /// Whether two units are on opposing sides.
    fn is_hostile(&self, a: &UnitInfo, b: &UnitInfo) -> bool {
        a.team != b.team
    }

    /// Map distance between two positions.
    fn distance(&self, a: HexCoord, b: HexCoord) -> u32 {
        a.distance(b)
    }

    /// Look up a unit that is still in the game (not destroyed).
    fn live_unit(&self, id: UnitId) -> Option<&UnitInfo> {
        self.unit(id).filter(|unit| !unit.destroyed)
    }
}

/// In-memory roster keyed by unit identifier.
///
/// A `BTreeMap` keeps iteration order deterministic without a separate
/// sort pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRoster {
    units: BTreeMap<UnitId, UnitInfo>,
}

impl UnitRoster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a unit.
    pub fn insert(&mut self, unit: UnitInfo) {
        self.units.insert(unit.id, unit);
    }

    /// Remove a unit from the game.
    pub fn remove(&mut self, id: UnitId) -> Option<UnitInfo> {
        self.units.remove(&id)
    }

    /// Get a mutable reference to a unit.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut UnitInfo> {
        self.units.get_mut(&id)
    }

    /// Check if a unit exists.
    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    /// Number of units, including destroyed ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterate over all units in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitInfo> {
        self.units.values()
    }
}

impl Roster for UnitRoster {
    fn unit(&self, id: UnitId) -> Option<&UnitInfo> {
        self.units.get(&id)
    }

    fn unit_ids(&self) -> Vec<UnitId> {
        self.units.keys().copied().collect()
    }
}

impl FromIterator<UnitInfo> for UnitRoster {
    fn from_iter<I: IntoIterator<Item = UnitInfo>>(iter: I) -> Self {
        let mut roster = Self::new();
        for unit in iter {
            roster.insert(unit);
        }
        roster
    }
}
