//! Whether two units currently share targeting data.
//!
//! The checks run in a fixed order:
//!
//! 1. Either unit is gone, shut down or stealthed, or the two are hostile:
//!    not connected.
//! 2. Kinds differ: not connected.
//! 3. The kind-specific rule decides:
//!    - Improved: matching network id and neither end jammed where it stands
//!      (unless ECM is ignored).
//!    - Naval: matching network id, both in space, within range. Jamming has
//!      no effect.
//!    - NovaMesh: both switched on, matching network id and neither end under
//!      mesh jamming (unless ECM is ignored).
//!    - Standard: both resolve to the same top.
//!
//! Every rule is symmetric in its two arguments.

use crate::jamming::{JammingOracle, NoJamming};
use crate::membership::NetworkKind;
use crate::registry::NetworkRegistry;
use crate::units::{Domain, Roster, UnitId, UnitInfo};

/// Whether jamming is considered by a connectivity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EcmMode {
    /// Jamming can break links.
    #[default]
    Respect,
    /// Jamming is disregarded.
    Ignore,
}

impl NetworkRegistry {
    /// Whether `a` and `b` are presently on the same network.
    #[must_use]
    pub fn same_network(
        &self,
        roster: &impl Roster,
        oracle: &impl JammingOracle,
        a: UnitId,
        b: UnitId,
    ) -> bool {
        self.connected(roster, oracle, a, b, EcmMode::Respect)
    }

    /// Whether `a` and `b` would be on the same network with all jamming
    /// disregarded.
    #[must_use]
    pub fn same_network_ignoring_ecm(&self, roster: &impl Roster, a: UnitId, b: UnitId) -> bool {
        self.connected(roster, &NoJamming, a, b, EcmMode::Ignore)
    }

    /// Every other unit presently on the same network as `id`, in id order.
    #[must_use]
    pub fn network_members(
        &self,
        roster: &impl Roster,
        oracle: &impl JammingOracle,
        id: UnitId,
    ) -> Vec<UnitId> {
        roster
            .unit_ids()
            .into_iter()
            .filter(|&other| other != id && self.same_network(roster, oracle, id, other))
            .collect()
    }

    fn connected(
        &self,
        roster: &impl Roster,
        oracle: &impl JammingOracle,
        a: UnitId,
        b: UnitId,
        ecm: EcmMode,
    ) -> bool {
        let (Some(ua), Some(ub)) = (roster.live_unit(a), roster.live_unit(b)) else {
            return false;
        };
        if ua.shut_down || ub.shut_down || ua.stealth_active || ub.stealth_active {
            return false;
        }
        if roster.is_hostile(ua, ub) {
            return false;
        }
        let kind = ua.kind();
        if kind != ub.kind() {
            return false;
        }

        match kind {
            NetworkKind::None => false,
            NetworkKind::Improved => {
                self.shares_network_id(ua, ub)
                    && (ecm == EcmMode::Ignore
                        || !(Self::jammed_in_place(oracle, ua) || Self::jammed_in_place(oracle, ub)))
            }
            NetworkKind::Naval => {
                self.shares_network_id(ua, ub)
                    && ua.domain == Domain::Space
                    && ub.domain == Domain::Space
                    && roster.distance(ua.position, ub.position) <= self.rules().naval_max_range
            }
            NetworkKind::NovaMesh => {
                ua.hardware.nova_enabled
                    && ub.hardware.nova_enabled
                    && self.shares_network_id(ua, ub)
                    && (ecm == EcmMode::Ignore
                        || !(Self::mesh_jammed(oracle, ua) || Self::mesh_jammed(oracle, ub)))
            }
            NetworkKind::Standard => self.same_top(roster, oracle, a, b),
        }
    }

    fn shares_network_id(&self, a: &UnitInfo, b: &UnitInfo) -> bool {
        self.view(a).network_id() == self.view(b).network_id()
    }

    fn jammed_in_place(oracle: &impl JammingOracle, unit: &UnitInfo) -> bool {
        oracle.is_jammed(unit, unit.position, unit.position)
    }

    fn mesh_jammed(oracle: &impl JammingOracle, unit: &UnitInfo) -> bool {
        oracle
            .jam_effects(unit, unit.position, unit.position)
            .is_mesh_jamming
    }

    /// Tops are compared only when both walks succeed; an inconsistent
    /// jamming answer on either side disconnects the pair.
    fn same_top(
        &self,
        roster: &impl Roster,
        oracle: &impl JammingOracle,
        a: UnitId,
        b: UnitId,
    ) -> bool {
        match (
            self.resolve_top(roster, oracle, a),
            self.resolve_top(roster, oracle, b),
        ) {
            (Ok(top_a), Ok(top_b)) => top_a == top_b,
            _ => false,
        }
    }
}
