//! Determinism testing utilities.
//!
//! Network queries must give the same answer for the same roster and
//! records no matter how often or in which order they are asked, and a
//! saved registry must restore to an identical state.
//!
//! # Sources of non-determinism guarded against
//!
//! - **Map iteration order**: records live in a `BTreeMap` and every
//!   roster scan walks ids in ascending order.
//! - **Hidden state**: queries take the roster and jamming oracle as
//!   arguments, so two registries fed the same inputs cannot diverge.
//! - **Lossy persistence**: snapshots store every record field verbatim.

use std::thread;

use c3_core::registry::{NetworkRegistry, NetworkSnapshot};
use c3_core::rules::NetworkRules;
use c3_core::units::UnitRoster;

use crate::fixtures::{apply_op, NetworkOp};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Final hash from each run.
    pub hashes: Vec<u64>,
    /// Number of steps applied per run.
    pub steps: usize,
}

impl DeterminismResult {
    /// All distinct hashes (one for a deterministic scenario).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            panic!(
                "Network state is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                self.unique_hashes().len(),
                self.hashes
            );
        }
    }
}

/// Run a setup-then-step scenario several times and compare final hashes.
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: usize,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, usize),
    HashFn: Fn(&S) -> u64,
{
    let hashes: Vec<u64> = (0..runs)
        .map(|_| {
            let mut state = setup();
            for index in 0..steps {
                step(&mut state, index);
            }
            hash(&state)
        })
        .collect();

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps,
    }
}

/// Replay one operation script against fresh copies of a roster, each on
/// its own thread, and compare the final registry hashes.
#[must_use]
pub fn verify_script_parallel(
    roster: &UnitRoster,
    rules: &NetworkRules,
    ops: &[NetworkOp],
    threads: usize,
) -> DeterminismResult {
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let mut roster = roster.clone();
            let rules = *rules;
            let ops = ops.to_vec();
            thread::spawn(move || {
                let mut registry = NetworkRegistry::new(rules);
                let mut round = 0;
                for op in &ops {
                    apply_op(&mut registry, &mut roster, &mut round, op);
                }
                registry.state_hash()
            })
        })
        .collect();

    let hashes: Vec<u64> = handles
        .into_iter()
        .map(|handle| handle.join().expect("script thread panicked"))
        .collect();

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps: ops.len(),
    }
}

/// Save a registry through bytes and restore it.
///
/// # Panics
///
/// Panics if either direction of the bincode round trip fails.
#[must_use]
pub fn snapshot_round_trip(registry: &NetworkRegistry) -> NetworkRegistry {
    let bytes = registry
        .snapshot()
        .to_bytes()
        .expect("snapshot serializes");
    let snapshot = NetworkSnapshot::from_bytes(&bytes).expect("snapshot deserializes");
    NetworkRegistry::restore(*registry.rules(), snapshot).expect("snapshot restores")
}

/// Whether a registry survives a save/restore unchanged.
#[must_use]
pub fn verify_snapshot_determinism(registry: &NetworkRegistry) -> bool {
    let restored = snapshot_round_trip(registry);
    restored.state_hash() == registry.state_hash() && &restored == registry
}

/// Proptest strategies for rosters and operation scripts.
pub mod strategies {
    use c3_core::hex::HexCoord;
    use c3_core::units::{Domain, Hardware, UnitId, UnitInfo, UnitRoster};
    use proptest::prelude::*;

    use crate::fixtures::NetworkOp;

    /// Any hardware fit, weighted towards Standard.
    pub fn arb_hardware() -> impl Strategy<Value = Hardware> {
        prop_oneof![
            3 => Just(Hardware::standard_master()),
            2 => Just(Hardware::company_master()),
            4 => Just(Hardware::standard_slave()),
            2 => Just(Hardware::improved()),
            1 => Just(Hardware::naval()),
            2 => Just(Hardware::nova()),
            1 => Just(Hardware::NONE),
        ]
        .prop_flat_map(|hardware| {
            any::<bool>().prop_map(move |boosted| {
                if boosted {
                    hardware.with_boost()
                } else {
                    hardware
                }
            })
        })
    }

    /// Hex position within the given radius of the origin, roughly.
    pub fn arb_position(radius: i32) -> impl Strategy<Value = HexCoord> {
        (-radius..=radius, -radius..=radius).prop_map(|(q, r)| HexCoord::new(q, r))
    }

    /// A unit with the given id, on team 0 or 1.
    pub fn arb_unit(id: UnitId) -> impl Strategy<Value = UnitInfo> {
        (
            arb_hardware(),
            0u32..2,
            arb_position(40),
            prop_oneof![Just(Domain::Ground), Just(Domain::Space)],
        )
            .prop_map(move |(hardware, team, position, domain)| {
                UnitInfo::new(id, team)
                    .with_hardware(hardware)
                    .at(position)
                    .in_domain(domain)
            })
    }

    /// A roster of `1..=max_units` units with ids `1..=n`.
    pub fn arb_roster(max_units: usize) -> impl Strategy<Value = UnitRoster> {
        (1..=max_units).prop_flat_map(|n| {
            (1..=n as UnitId)
                .map(arb_unit)
                .collect::<Vec<_>>()
                .prop_map(|units| units.into_iter().collect::<UnitRoster>())
        })
    }

    /// One operation over unit ids `1..=max_id`.
    pub fn arb_op(max_id: UnitId) -> impl Strategy<Value = NetworkOp> {
        let id = 1..=max_id;
        prop_oneof![
            6 => (id.clone(), proptest::option::of(1..=max_id))
                .prop_map(|(unit, master)| NetworkOp::Attach(unit, master)),
            3 => (id.clone(), 1..=max_id).prop_map(|(unit, member)| NetworkOp::Join(unit, member)),
            1 => id.clone().prop_map(NetworkOp::Leave),
            2 => Just(NetworkOp::BeginRound),
            1 => id.clone().prop_map(NetworkOp::Remove),
            1 => id.clone().prop_map(NetworkOp::ToggleShutdown),
            2 => id.prop_map(NetworkOp::ResolveMaster),
        ]
    }

    /// A script of up to `max_len` operations.
    pub fn arb_script(max_id: UnitId, max_len: usize) -> impl Strategy<Value = Vec<NetworkOp>> {
        prop::collection::vec(arb_op(max_id), 0..=max_len)
    }
}
