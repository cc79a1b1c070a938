//! Network query benchmarks for c3_core.
//!
//! Every query rescans the roster, so these track how that cost grows with
//! roster size.
//!
//! Run with: `cargo bench -p c3_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use c3_core::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Build `companies` full companies: one commander, two sub-masters and
/// three slaves under each sub-master, plus a hostile jammer bubble over
/// every other company.
fn build_companies(companies: u64) -> (UnitRoster, NetworkRegistry, EcmField) {
    let mut roster = UnitRoster::new();
    let mut field = EcmField::new();
    for company in 0..companies {
        let base = company * 10 + 1;
        let position = HexCoord::new(i32::try_from(company * 20).unwrap_or(i32::MAX), 0);
        roster.insert(
            UnitInfo::new(base, 0)
                .with_hardware(Hardware::company_master())
                .at(position),
        );
        for offset in 1..=8 {
            let hardware = if offset <= 2 {
                Hardware::standard_master()
            } else {
                Hardware::standard_slave()
            };
            roster.insert(UnitInfo::new(base + offset, 0).with_hardware(hardware).at(position));
        }
        if company % 2 == 1 {
            field.add(Emitter::new(1, position, 2));
        }
    }

    let mut registry = NetworkRegistry::default();
    for company in 0..companies {
        let base = company * 10 + 1;
        registry.attach_to_master(&roster, base, Some(base));
        registry.attach_to_master(&roster, base + 1, Some(base));
        registry.attach_to_master(&roster, base + 2, Some(base));
        for slave in 3..=5 {
            registry.attach_to_master(&roster, base + slave, Some(base + 1));
        }
        for slave in 6..=8 {
            registry.attach_to_master(&roster, base + slave, Some(base + 2));
        }
    }
    (roster, registry, field)
}

pub fn same_network_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("same_network");
    for companies in [4_u64, 16, 64] {
        let (roster, registry, field) = build_companies(companies);
        group.bench_with_input(
            BenchmarkId::from_parameter(companies * 9),
            &companies,
            |b, _| {
                b.iter(|| {
                    let mut linked = 0_u32;
                    for id in [4, 7, 13, 16] {
                        if registry.same_network(&roster, &field, black_box(id), black_box(8)) {
                            linked += 1;
                        }
                    }
                    linked
                });
            },
        );
    }
    group.finish();
}

pub fn capacity_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("free_slots");
    for companies in [4_u64, 16, 64] {
        let (roster, registry, _) = build_companies(companies);
        group.bench_with_input(
            BenchmarkId::from_parameter(companies * 9),
            &companies,
            |b, _| {
                b.iter(|| {
                    registry.free_master_slots(&roster, black_box(1))
                        + registry.free_slave_slots(&roster, black_box(2))
                });
            },
        );
    }
    group.finish();
}

pub fn network_members_benchmark(c: &mut Criterion) {
    let (roster, registry, field) = build_companies(16);
    c.bench_function("network_members_144", |b| {
        b.iter(|| registry.network_members(&roster, &field, black_box(4)));
    });
}

criterion_group!(
    benches,
    same_network_benchmark,
    capacity_benchmark,
    network_members_benchmark
);
criterion_main!(benches);
