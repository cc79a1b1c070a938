//! # C3 Core
//!
//! Tactical command/sensor network rules for a turn-based combat simulation.
//!
//! Units carrying network hardware share targeting data with other members
//! of their network. This crate decides who is networked with whom:
//!
//! - Standard networks form a master/slave hierarchy at most two tiers deep,
//!   topped by an optional dual-module company commander.
//! - Improved, Naval and NovaMesh networks are flat meshes joined by a
//!   shared network identifier, each with its own size ceiling and
//!   reachability rules.
//!
//! The crate contains **only** deterministic rule logic:
//! - No rendering
//! - No hidden global state: the roster and jamming oracle are passed in
//! - No caching: every query recomputes from current unit state, so
//!   destruction, shutdown and jamming mid-round are always honoured
//!
//! ## Crate Structure
//!
//! - [`units`] - External unit facts and the [`units::Roster`] seam
//! - [`jamming`] - The [`jamming::JammingOracle`] seam and an emitter-based oracle
//! - [`membership`] - Per-unit membership records
//! - [`registry`] - Record storage, persistence and state hashing
//! - [`topology`] - Standard hierarchy resolution and self-healing
//! - [`capacity`] - Free slot counting
//! - [`connectivity`] - Same-network checks
//! - [`reconfigure`] - Attachment, mesh joins and round-boundary switches
//! - [`rules`] - Ruleset constants, loadable from RON

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod capacity;
pub mod connectivity;
pub mod error;
pub mod hex;
pub mod jamming;
pub mod membership;
pub mod reconfigure;
pub mod registry;
pub mod rules;
pub mod topology;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::connectivity::EcmMode;
    pub use crate::error::{NetworkError, Result};
    pub use crate::hex::HexCoord;
    pub use crate::jamming::{EcmField, Emitter, EmitterKind, JamEffects, JammingOracle, NoJamming};
    pub use crate::membership::{MembershipRecord, NetworkKind, NetworkLink};
    pub use crate::reconfigure::{ReconfigurationPlan, Rejection};
    pub use crate::registry::{NetworkRegistry, NetworkSnapshot};
    pub use crate::rules::{JammingConsistency, NetworkRules};
    pub use crate::topology::{MasterLink, SeverReason};
    pub use crate::units::{Domain, Hardware, Roster, TeamId, UnitId, UnitInfo, UnitRoster};
}
