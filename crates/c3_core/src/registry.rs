//! Storage for every unit's membership record.
//!
//! The registry owns only per-unit records. It holds no cross-unit graph:
//! topology, capacity and connectivity are recomputed from the records and
//! the current [`Roster`] on every query, which lets stale references heal
//! on the next read instead of requiring invalidation messages.
//!
//! Query and reconfiguration operations are implemented on
//! [`NetworkRegistry`] in the [`topology`](crate::topology),
//! [`capacity`](crate::capacity), [`connectivity`](crate::connectivity)
//! and [`reconfigure`](crate::reconfigure) modules.

use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};
use crate::membership::MembershipRecord;
use crate::rules::NetworkRules;
use crate::units::{Roster, UnitId, UnitInfo};

/// Snapshot format version for compatibility.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Membership records for all units, plus the rules they are judged by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkRegistry {
    rules: NetworkRules,
    records: BTreeMap<UnitId, MembershipRecord>,
    last_round: Option<u32>,
}

impl NetworkRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(rules: NetworkRules) -> Self {
        Self {
            rules,
            records: BTreeMap::new(),
            last_round: None,
        }
    }

    /// Rules in force.
    #[must_use]
    pub const fn rules(&self) -> &NetworkRules {
        &self.rules
    }

    /// Last round boundary processed by [`begin_round`](Self::begin_round).
    #[must_use]
    pub const fn last_round(&self) -> Option<u32> {
        self.last_round
    }

    pub(crate) fn set_last_round(&mut self, round: u32) {
        self.last_round = Some(round);
    }

    /// Stored record for a unit, if one has been created.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&MembershipRecord> {
        self.records.get(&id)
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no records have been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Effective record for a unit.
    ///
    /// A unit that never had a record, or whose stored record belongs to a
    /// kind its hardware no longer implies, reads as a fresh record for its
    /// current kind. Nothing is written.
    #[must_use]
    pub fn view(&self, unit: &UnitInfo) -> Cow<'_, MembershipRecord> {
        match self.records.get(&unit.id) {
            Some(record) if record.kind() == unit.kind() => Cow::Borrowed(record),
            _ => Cow::Owned(MembershipRecord::new(unit.kind(), unit.id)),
        }
    }

    /// Effective record for a unit on the roster.
    pub fn membership<'a>(
        &'a self,
        roster: &impl Roster,
        id: UnitId,
    ) -> Result<Cow<'a, MembershipRecord>> {
        let unit = roster.unit(id).ok_or(NetworkError::UnknownUnit(id))?;
        Ok(self.view(unit))
    }

    /// Mutable record for a unit, created or reset to match its hardware.
    pub(crate) fn record_mut(&mut self, unit: &UnitInfo) -> &mut MembershipRecord {
        let kind = unit.kind();
        let record = self
            .records
            .entry(unit.id)
            .or_insert_with(|| MembershipRecord::new(kind, unit.id));
        if record.kind() != kind {
            tracing::debug!(
                unit = unit.id,
                from = ?record.kind(),
                to = ?kind,
                "Network hardware changed, resetting membership"
            );
            *record = MembershipRecord::new(kind, unit.id);
        }
        record
    }

    /// Stored record without lazy creation, for units already known to have one.
    pub(crate) fn stored_mut(&mut self, id: UnitId) -> Option<&mut MembershipRecord> {
        self.records.get_mut(&id)
    }

    /// Bring a unit's record in line with its current hardware.
    ///
    /// The host calls this after damage or repair changes which network
    /// hardware a unit carries. Returns `true` when the record was created
    /// or reset.
    pub fn sync_hardware(&mut self, roster: &impl Roster, id: UnitId) -> bool {
        let Some(unit) = roster.unit(id) else {
            return false;
        };
        let changed = self
            .records
            .get(&id)
            .map_or(true, |record| record.kind() != unit.kind());
        if changed {
            self.record_mut(unit);
        }
        changed
    }

    /// Capture all records for save/restore.
    #[must_use]
    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            version: SNAPSHOT_VERSION,
            last_round: self.last_round,
            records: self
                .records
                .iter()
                .map(|(id, record)| (*id, record.clone()))
                .collect(),
        }
    }

    /// Rebuild a registry from a snapshot.
    pub fn restore(rules: NetworkRules, snapshot: NetworkSnapshot) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(NetworkError::InvalidState(format!(
                "Snapshot version mismatch: expected {}, got {}",
                SNAPSHOT_VERSION, snapshot.version
            )));
        }

        Ok(Self {
            rules,
            records: snapshot.records.into_iter().collect(),
            last_round: snapshot.last_round,
        })
    }

    /// Compute a deterministic hash of all records.
    ///
    /// Two registries holding identical records produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.last_round.hash(&mut hasher);
        self.records.len().hash(&mut hasher);
        for (id, record) in &self.records {
            id.hash(&mut hasher);
            record.hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Persisted form of a [`NetworkRegistry`].
///
/// Network identifiers, master references, pending NovaMesh switches and
/// peer slot arrays are stored verbatim. Hardware flags are not: they live
/// with equipment state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    /// Snapshot format version.
    pub version: u32,
    /// Last processed round boundary.
    pub last_round: Option<u32>,
    /// Records in unit id order.
    pub records: Vec<(UnitId, MembershipRecord)>,
}

impl NetworkSnapshot {
    /// Serialize to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| NetworkError::InvalidState(format!("Failed to serialize snapshot: {}", e)))
    }

    /// Deserialize from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| {
            NetworkError::InvalidState(format!("Failed to deserialize snapshot: {}", e))
        })
    }
}
