//! Membership changes.
//!
//! Standard reattachment is a two-phase operation: [`NetworkRegistry::plan_reconfiguration`]
//! validates a request against the current roster and lists every record it
//! will touch, then [`NetworkRegistry::commit`] applies exactly that list.
//! The cascade that releases a unit's subordinates when its role changes
//! shape is therefore visible in the plan rather than hidden in a setter.
//!
//! Mesh kinds join by adopting another member's network id. NovaMesh joins
//! are deferred: they wait in the pending field until the host calls
//! [`NetworkRegistry::begin_round`] at the next round boundary.

use crate::membership::{default_network_id, NetworkKind};
use crate::registry::NetworkRegistry;
use crate::rules::PEER_SLOTS;
use crate::units::{Roster, UnitId, UnitInfo};

/// Why a reattachment request was refused.
///
/// Refusal is a normal outcome, not an error: nothing changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The unit is not in the game.
    UnknownUnit,
    /// The unit carries no Standard hardware.
    NotStandard,
    /// The requested master is not in the game.
    UnknownMaster,
    /// The requested master belongs to an opposing side.
    HostileMaster,
    /// The requested master carries no master hardware.
    NotAMaster,
    /// A master-equipped unit may only report to a company commander.
    NotCompanyCommander,
    /// Only a dual-module unit may take the company command role.
    NoDualModule,
    /// The requested master has no free slot of the needed type.
    CapacityFull,
    /// The unit already has this master.
    Unchanged,
}

/// Every record change a reattachment will make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconfigurationPlan {
    /// Unit being reattached.
    pub unit: UnitId,
    /// New master reference. The unit's own id takes the company command role.
    pub new_master: Option<UnitId>,
    /// Units whose master reference will be cleared because the unit's
    /// role changed shape.
    pub cascade_targets: Vec<UnitId>,
    /// Network id assignments, the unit first, then its subtree and each
    /// released subtree.
    pub network_ids: Vec<(UnitId, String)>,
}

impl ReconfigurationPlan {
    /// Whether the plan releases any subordinates.
    #[must_use]
    pub fn cascades(&self) -> bool {
        !self.cascade_targets.is_empty()
    }
}

impl NetworkRegistry {
    /// Validate a Standard reattachment and list the changes it implies.
    ///
    /// `new_master` of `None` makes the unit independent; the unit's own id
    /// requests the company command role.
    pub fn plan_reconfiguration(
        &self,
        roster: &impl Roster,
        id: UnitId,
        new_master: Option<UnitId>,
    ) -> Result<ReconfigurationPlan, Rejection> {
        let unit = roster.live_unit(id).ok_or(Rejection::UnknownUnit)?;
        if unit.kind() != NetworkKind::Standard {
            return Err(Rejection::NotStandard);
        }
        let old_master = self.view(unit).master();
        if old_master == new_master {
            return Err(Rejection::Unchanged);
        }

        let network_id = match new_master {
            None => default_network_id(NetworkKind::Standard, id),
            Some(master_id) if master_id == id => {
                if !unit.hardware.dual_module {
                    return Err(Rejection::NoDualModule);
                }
                default_network_id(NetworkKind::Standard, id)
            }
            Some(master_id) => {
                let master = roster
                    .live_unit(master_id)
                    .ok_or(Rejection::UnknownMaster)?;
                if roster.is_hostile(unit, master) {
                    return Err(Rejection::HostileMaster);
                }
                if !master.hardware.standard_master {
                    return Err(Rejection::NotAMaster);
                }
                if unit.hardware.standard_master {
                    if !self.is_company_command_role(roster, master_id) {
                        return Err(Rejection::NotCompanyCommander);
                    }
                    if self.free_master_slots(roster, master_id) == 0 {
                        return Err(Rejection::CapacityFull);
                    }
                } else if self.free_slave_slots(roster, master_id) == 0 {
                    return Err(Rejection::CapacityFull);
                }
                self.view(master).network_id().to_string()
            }
        };

        // Switching between leading a company and any other role releases
        // every unit that pointed here.
        let was_self_rooted = old_master == Some(id);
        let is_self_rooted = new_master == Some(id);
        let cascade_targets = if was_self_rooted != is_self_rooted {
            self.stored_subordinates(roster, id)
        } else {
            Vec::new()
        };

        let mut network_ids = vec![(id, network_id.clone())];
        for sub in self.stored_subordinates(roster, id) {
            if cascade_targets.contains(&sub) {
                continue;
            }
            self.assign_subtree(roster, sub, &network_id, 1, &mut network_ids);
        }
        for &released in &cascade_targets {
            let own_id = default_network_id(NetworkKind::Standard, released);
            self.assign_subtree(roster, released, &own_id, 1, &mut network_ids);
        }

        Ok(ReconfigurationPlan {
            unit: id,
            new_master,
            cascade_targets,
            network_ids,
        })
    }

    /// Apply a plan produced by [`plan_reconfiguration`](Self::plan_reconfiguration).
    ///
    /// Units that left the roster or the Standard kind since planning are
    /// skipped.
    pub fn commit(&mut self, roster: &impl Roster, plan: &ReconfigurationPlan) {
        for &target in &plan.cascade_targets {
            if let Some(unit) = standard_unit(roster, target) {
                self.record_mut(unit).set_master(None);
            }
        }
        if plan.cascades() {
            tracing::debug!(
                unit = plan.unit,
                released = ?plan.cascade_targets,
                "Role change released subordinates"
            );
        }

        if let Some(unit) = standard_unit(roster, plan.unit) {
            self.record_mut(unit).set_master(plan.new_master);
        }
        for (id, network_id) in &plan.network_ids {
            if let Some(unit) = standard_unit(roster, *id) {
                self.record_mut(unit).set_network_id(network_id.as_str());
            }
        }

        tracing::debug!(
            unit = plan.unit,
            master = ?plan.new_master,
            renamed = plan.network_ids.len(),
            "Committed reconfiguration"
        );
    }

    /// Plan and commit a Standard reattachment in one step.
    ///
    /// Returns `true` if anything changed. Refused requests leave every
    /// record untouched.
    pub fn attach_to_master(
        &mut self,
        roster: &impl Roster,
        id: UnitId,
        new_master: Option<UnitId>,
    ) -> bool {
        match self.plan_reconfiguration(roster, id, new_master) {
            Ok(plan) => {
                self.commit(roster, &plan);
                true
            }
            Err(reason) => {
                tracing::debug!(unit = id, master = ?new_master, ?reason, "Attachment refused");
                false
            }
        }
    }

    /// Join the mesh network `member` belongs to.
    ///
    /// Improved and Naval units switch immediately and refresh their peer
    /// slots. NovaMesh units record a pending switch that takes effect at the
    /// next round boundary. Returns `false` if the request was refused.
    pub fn join_network(&mut self, roster: &impl Roster, id: UnitId, member: UnitId) -> bool {
        if id == member {
            return false;
        }
        let (Some(unit), Some(target)) = (roster.live_unit(id), roster.live_unit(member)) else {
            return false;
        };
        let kind = unit.kind();
        if !kind.is_mesh() || kind != target.kind() || roster.is_hostile(unit, target) {
            return false;
        }

        let network_id = self.view(target).network_id().to_string();
        if kind == NetworkKind::NovaMesh {
            return self.request_network_switch(roster, id, &network_id);
        }

        if self.view(unit).network_id() == network_id {
            return false;
        }
        if self.mesh_free_slots(roster, kind, &network_id, id) == 0 {
            tracing::debug!(unit = id, network = %network_id, "Network full, join refused");
            return false;
        }

        self.record_mut(unit).set_network_id(network_id.as_str());
        self.rebuild_peers(roster, id);
        tracing::debug!(unit = id, network = %network_id, "Joined network");
        true
    }

    /// Leave the current mesh network and form a network of one.
    ///
    /// A NovaMesh unit leaves at the next round boundary; leaving while
    /// still on its own network cancels a pending switch. Refused when
    /// other units have since filled the unit's own network.
    pub fn leave_network(&mut self, roster: &impl Roster, id: UnitId) -> bool {
        let Some(unit) = roster.live_unit(id) else {
            return false;
        };
        let kind = unit.kind();
        if !kind.is_mesh() {
            return false;
        }

        let own_id = default_network_id(kind, id);
        if self.view(unit).network_id() == own_id {
            return self
                .stored_mut(id)
                .and_then(|record| record.take_pending())
                .is_some();
        }
        if kind == NetworkKind::NovaMesh {
            return self.request_network_switch(roster, id, &own_id);
        }
        if self.mesh_free_slots(roster, kind, &own_id, id) == 0 {
            tracing::debug!(unit = id, network = %own_id, "Own network full, leave refused");
            return false;
        }

        let record = self.record_mut(unit);
        record.set_network_id(own_id);
        record.clear_peers();
        true
    }

    /// Request that a NovaMesh unit switch networks at the next round boundary.
    ///
    /// Refused when the unit is not NovaMesh, already on that network, or
    /// the target network is full counting other pending joiners.
    pub fn request_network_switch(
        &mut self,
        roster: &impl Roster,
        id: UnitId,
        network_id: &str,
    ) -> bool {
        let Some(unit) = roster.live_unit(id) else {
            return false;
        };
        if unit.kind() != NetworkKind::NovaMesh {
            return false;
        }
        if self.mesh_free_slots(roster, NetworkKind::NovaMesh, network_id, id) == 0 {
            tracing::debug!(unit = id, network = %network_id, "Network full, switch refused");
            return false;
        }

        let record = self.record_mut(unit);
        if record.network_id() == network_id {
            return false;
        }
        record.set_pending(network_id.to_string())
    }

    /// Apply a unit's pending NovaMesh switch.
    ///
    /// The peer slots are wiped so the mesh is rebuilt from scratch. Returns
    /// `false` when nothing was pending, so a second call in the same round
    /// is a no-op.
    pub fn apply_deferred_network_switch(&mut self, id: UnitId) -> bool {
        let Some(record) = self.stored_mut(id) else {
            return false;
        };
        let Some(network_id) = record.take_pending() else {
            return false;
        };
        tracing::debug!(unit = id, network = %network_id, "Applied deferred network switch");
        record.set_network_id(network_id);
        record.clear_peers();
        true
    }

    /// Round-boundary barrier.
    ///
    /// Applies every pending NovaMesh switch once per round number and
    /// returns the units that switched. Calling it again for the same or an
    /// earlier round does nothing.
    pub fn begin_round(&mut self, roster: &impl Roster, round: u32) -> Vec<UnitId> {
        if self.last_round().is_some_and(|last| round <= last) {
            return Vec::new();
        }
        self.set_last_round(round);

        let mut switched = Vec::new();
        for id in roster.unit_ids() {
            let is_nova = roster
                .live_unit(id)
                .is_some_and(|unit| unit.kind() == NetworkKind::NovaMesh);
            if is_nova && self.apply_deferred_network_switch(id) {
                switched.push(id);
            }
        }
        if !switched.is_empty() {
            tracing::debug!(round, switched = switched.len(), "Round boundary applied");
        }
        switched
    }

    /// Refill a mesh unit's peer slots from the units sharing its network id.
    ///
    /// Returns the number of peers recorded.
    pub fn rebuild_peers(&mut self, roster: &impl Roster, id: UnitId) -> usize {
        let Some(unit) = roster.live_unit(id) else {
            return 0;
        };
        let kind = unit.kind();
        if !kind.is_mesh() {
            return 0;
        }

        let network_id = self.view(unit).network_id().to_string();
        let found: Vec<UnitId> = roster
            .unit_ids()
            .into_iter()
            .filter(|&other| other != id)
            .filter(|&other| {
                roster.live_unit(other).is_some_and(|peer| {
                    peer.kind() == kind && self.view(peer).network_id() == network_id
                })
            })
            .take(PEER_SLOTS)
            .collect();

        let record = self.record_mut(unit);
        record.clear_peers();
        if let Some(peers) = record.peers_mut() {
            for (slot, peer) in peers.iter_mut().zip(&found) {
                *slot = Some(*peer);
            }
        }
        found.len()
    }

    /// Recorded peers of a mesh unit.
    #[must_use]
    pub fn peers(&self, id: UnitId) -> Vec<UnitId> {
        self.get(id)
            .map(|record| record.peers().iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    /// Live Standard units whose effective master reference names `id`.
    ///
    /// A unit that has since lost its Standard hardware is no longer a
    /// subordinate, whatever its stale record still says.
    fn stored_subordinates(&self, roster: &impl Roster, id: UnitId) -> Vec<UnitId> {
        roster
            .unit_ids()
            .into_iter()
            .filter(|&other| other != id)
            .filter(|&other| {
                standard_unit(roster, other)
                    .is_some_and(|unit| self.view(unit).master() == Some(id))
            })
            .collect()
    }

    /// Assign `network_id` to `root` and everything below it, bounded by the
    /// depth limit.
    fn assign_subtree(
        &self,
        roster: &impl Roster,
        root: UnitId,
        network_id: &str,
        depth: u32,
        out: &mut Vec<(UnitId, String)>,
    ) {
        if out.iter().any(|(id, _)| *id == root) {
            return;
        }
        out.push((root, network_id.to_string()));
        if depth >= self.rules().max_depth {
            return;
        }
        for sub in self.stored_subordinates(roster, root) {
            self.assign_subtree(roster, sub, network_id, depth + 1, out);
        }
    }
}

/// A unit still in the game whose hardware implies the Standard kind.
fn standard_unit(roster: &impl Roster, id: UnitId) -> Option<&UnitInfo> {
    roster
        .live_unit(id)
        .filter(|unit| unit.kind() == NetworkKind::Standard)
}
