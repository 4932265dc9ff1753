//! Criterion benchmarks for driving the replay engine.

use std::hint::black_box;

use cmlog_bench::stress_profile;
use cmlog_core::TickCounter;
use cmlog_replay::{ReplayConfig, ReplayEngine};
use cmlog_test_utils::{MockSimulation, RecordingBroadcaster};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

/// Replay 8K commands, eight per tick, against the mock simulation.
fn bench_replay_offline(c: &mut Criterion) {
    let events = stress_profile(8_192, 7);
    let last = events.last().map_or(0, |e| e.tick.0);

    c.bench_function("replay_offline_8k", |b| {
        b.iter_batched(
            || {
                let mut engine = ReplayEngine::new(ReplayConfig::default()).unwrap();
                engine.load_events(events.clone());
                (engine, MockSimulation::new(7))
            },
            |(mut engine, mut sim)| {
                for tick in 1..=last {
                    black_box(engine.step(TickCounter(tick), &mut sim, None));
                }
            },
            BatchSize::SmallInput,
        );
    });
}

/// Same replay with rebroadcast to peers enabled.
fn bench_replay_networked(c: &mut Criterion) {
    let events = stress_profile(8_192, 7);
    let last = events.last().map_or(0, |e| e.tick.0);
    let config = ReplayConfig {
        networked: true,
        ..ReplayConfig::default()
    };

    c.bench_function("replay_networked_8k", |b| {
        b.iter_batched(
            || {
                let mut engine = ReplayEngine::new(config.clone()).unwrap();
                engine.load_events(events.clone());
                (engine, MockSimulation::new(7), RecordingBroadcaster::new(0))
            },
            |(mut engine, mut sim, mut peers)| {
                for tick in 1..=last {
                    black_box(engine.step(TickCounter(tick), &mut sim, Some(&mut peers)));
                }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_replay_offline, bench_replay_networked);
criterion_main!(benches);
