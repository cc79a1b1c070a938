//! Per-unit membership records.
//!
//! A record holds the state this subsystem owns for one unit: the network
//! identifier string plus a kind-specific link. Kinds are modelled as
//! separate variants, so "no network hardware" and "a Standard unit with
//! no master" are distinct states rather than one `None` disambiguated by
//! a side query.

use serde::{Deserialize, Serialize};

use crate::rules::PEER_SLOTS;
use crate::units::UnitId;

/// Mutually exclusive network technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NetworkKind {
    /// No network hardware.
    #[default]
    None,
    /// Master/slave hierarchy, at most two tiers deep.
    Standard,
    /// Flat mesh sharing a network identifier.
    Improved,
    /// Flat mesh of space-going vessels, range limited.
    Naval,
    /// Flat mesh with round-deferred reconfiguration.
    NovaMesh,
}

impl NetworkKind {
    /// Prefix used when deriving a network identifier string.
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Standard => "C3",
            Self::Improved => "C3i",
            Self::Naval => "NC3",
            Self::NovaMesh => "NovaMesh",
        }
    }

    /// Whether this kind is a flat mesh joined by identifier string.
    #[must_use]
    pub const fn is_mesh(self) -> bool {
        matches!(self, Self::Improved | Self::Naval | Self::NovaMesh)
    }
}

/// Network identifier a unit uses when it leads or forms its own network.
#[must_use]
pub fn default_network_id(kind: NetworkKind, unit: UnitId) -> String {
    match kind {
        NetworkKind::None => String::new(),
        _ => format!("{}.{unit}", kind.id_prefix()),
    }
}

/// Fixed-size array of peer handles used to rebuild a mesh lazily.
pub type PeerSlots = [Option<UnitId>; PEER_SLOTS];

/// Kind-specific link state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkLink {
    /// The unit carries no network hardware.
    Unnetworked,
    /// Standard hierarchy membership.
    Standard {
        /// Chosen master. `None` is independent; the unit's own id marks a
        /// company commander.
        master: Option<UnitId>,
    },
    /// Improved mesh membership.
    Improved {
        /// Known peers.
        peers: PeerSlots,
    },
    /// Naval mesh membership.
    Naval {
        /// Known peers.
        peers: PeerSlots,
    },
    /// NovaMesh membership.
    NovaMesh {
        /// Network switch requested this round, applied at the next boundary.
        pending: Option<String>,
        /// Known peers.
        peers: PeerSlots,
    },
}

impl NetworkLink {
    /// Fresh link for a kind.
    #[must_use]
    pub const fn for_kind(kind: NetworkKind) -> Self {
        match kind {
            NetworkKind::None => Self::Unnetworked,
            NetworkKind::Standard => Self::Standard { master: None },
            NetworkKind::Improved => Self::Improved {
                peers: [None; PEER_SLOTS],
            },
            NetworkKind::Naval => Self::Naval {
                peers: [None; PEER_SLOTS],
            },
            NetworkKind::NovaMesh => Self::NovaMesh {
                pending: None,
                peers: [None; PEER_SLOTS],
            },
        }
    }

    /// Kind this link belongs to.
    #[must_use]
    pub const fn kind(&self) -> NetworkKind {
        match self {
            Self::Unnetworked => NetworkKind::None,
            Self::Standard { .. } => NetworkKind::Standard,
            Self::Improved { .. } => NetworkKind::Improved,
            Self::Naval { .. } => NetworkKind::Naval,
            Self::NovaMesh { .. } => NetworkKind::NovaMesh,
        }
    }
}

/// State owned by the network subsystem for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipRecord {
    network_id: String,
    link: NetworkLink,
}

impl MembershipRecord {
    /// Fresh record for a unit of the given kind, leading its own network.
    #[must_use]
    pub fn new(kind: NetworkKind, unit: UnitId) -> Self {
        Self {
            network_id: default_network_id(kind, unit),
            link: NetworkLink::for_kind(kind),
        }
    }

    /// Network kind of the stored link.
    #[must_use]
    pub const fn kind(&self) -> NetworkKind {
        self.link.kind()
    }

    /// Network identifier string.
    #[must_use]
    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    /// Kind-specific link.
    #[must_use]
    pub const fn link(&self) -> &NetworkLink {
        &self.link
    }

    /// Stored master reference. Always `None` outside the Standard kind.
    #[must_use]
    pub fn master(&self) -> Option<UnitId> {
        match &self.link {
            NetworkLink::Standard { master } => *master,
            _ => None,
        }
    }

    /// Pending NovaMesh network switch.
    #[must_use]
    pub fn pending_network_id(&self) -> Option<&str> {
        match &self.link {
            NetworkLink::NovaMesh { pending, .. } => pending.as_deref(),
            _ => None,
        }
    }

    /// Peer handle slots. Empty outside the mesh kinds.
    #[must_use]
    pub fn peers(&self) -> &[Option<UnitId>] {
        match &self.link {
            NetworkLink::Improved { peers }
            | NetworkLink::Naval { peers }
            | NetworkLink::NovaMesh { peers, .. } => peers,
            NetworkLink::Unnetworked | NetworkLink::Standard { .. } => &[],
        }
    }

    pub(crate) fn set_network_id(&mut self, network_id: impl Into<String>) {
        self.network_id = network_id.into();
    }

    /// Overwrite the master reference. Ignored outside the Standard kind.
    pub(crate) fn set_master(&mut self, new_master: Option<UnitId>) {
        if let NetworkLink::Standard { master } = &mut self.link {
            *master = new_master;
        }
    }

    /// Set a pending NovaMesh switch. Returns `false` for other kinds.
    pub(crate) fn set_pending(&mut self, network_id: String) -> bool {
        match &mut self.link {
            NetworkLink::NovaMesh { pending, .. } => {
                *pending = Some(network_id);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn take_pending(&mut self) -> Option<String> {
        match &mut self.link {
            NetworkLink::NovaMesh { pending, .. } => pending.take(),
            _ => None,
        }
    }

    pub(crate) fn peers_mut(&mut self) -> Option<&mut PeerSlots> {
        match &mut self.link {
            NetworkLink::Improved { peers }
            | NetworkLink::Naval { peers }
            | NetworkLink::NovaMesh { peers, .. } => Some(peers),
            NetworkLink::Unnetworked | NetworkLink::Standard { .. } => None,
        }
    }

    pub(crate) fn clear_peers(&mut self) {
        if let Some(peers) = self.peers_mut() {
            *peers = [None; PEER_SLOTS];
        }
    }
}
