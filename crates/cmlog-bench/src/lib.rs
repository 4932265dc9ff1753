//! Benchmark profiles for the cmlog codec and replay engine.
//!
//! - [`session_profile`]: a realistic multiplayer log, mostly small
//!   payloads with the occasional large one.
//! - [`stress_profile`]: many commands per tick, for throughput.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use cmlog_core::{ActorId, ClientId, CommandEvent, CommandId, ExpectedResult, TickCounter};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Build `n` commands spread over ticks, about one every 4 ticks.
///
/// Payloads are 8..=40 bytes, with one in 64 carrying 1 KiB. One in 20
/// commands is recorded as rejected and one in 10 as failed.
pub fn session_profile(n: usize, seed: u64) -> Vec<CommandEvent> {
    build(n, seed, 4)
}

/// Build `n` commands, eight per tick.
pub fn stress_profile(n: usize, seed: u64) -> Vec<CommandEvent> {
    build(n, seed, 0)
}

fn build(n: usize, seed: u64, tick_gap: u32) -> Vec<CommandEvent> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut tick = 1u32;
    (0..n)
        .map(|i| {
            if tick_gap == 0 {
                tick = 1 + (i / 8) as u32;
            } else {
                tick += rng.next_u32() % tick_gap;
            }
            let roll = rng.next_u32();
            let expected_result = match roll % 20 {
                0 => ExpectedResult::REJECTED,
                1 | 2 => ExpectedResult::FAILED,
                _ => ExpectedResult::SUCCEEDED,
            };
            let len = if roll % 64 == 7 {
                1024
            } else {
                8 + (rng.next_u32() % 33) as usize
            };
            let mut payload = vec![0u8; len];
            rng.fill_bytes(&mut payload);
            CommandEvent {
                tick: TickCounter(tick),
                expected_result,
                seed_byte: rng.next_u32() as u8,
                actor_id: ActorId((roll % 8) as u8),
                client_id: ClientId((roll % 8) as u16 + 1),
                command_id: CommandId((rng.next_u32() % 120) as u16),
                payload,
            }
        })
        .collect()
}
