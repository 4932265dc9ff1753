//! Reusable command log fixtures.
//!
//! - [`event`] / [`rejected`] build single records.
//! - [`sample_events`] builds a varied, tick-ordered log.
//! - [`recorded_session`] captures a log from a live [`MockSimulation`],
//!   so replaying it against a fresh simulation with the same seed is
//!   desync-free.

use cmlog_core::{ActorId, ClientId, CommandEvent, CommandId, ExpectedResult, TickCounter};

use crate::MockSimulation;

/// A record expected to succeed, with an empty payload.
pub fn event(tick: u32, command: u16) -> CommandEvent {
    CommandEvent {
        tick: TickCounter(tick),
        expected_result: ExpectedResult::SUCCEEDED,
        seed_byte: 0,
        actor_id: ActorId(1),
        client_id: ClientId(1),
        command_id: CommandId(command),
        payload: Vec::new(),
    }
}

/// A record the recording session rejected.
pub fn rejected(tick: u32, command: u16) -> CommandEvent {
    CommandEvent {
        expected_result: ExpectedResult::REJECTED,
        ..event(tick, command)
    }
}

/// `n` records with varied fields and payloads, ticks non-decreasing
/// from 1.
pub fn sample_events(n: usize) -> Vec<CommandEvent> {
    (0..n)
        .map(|i| CommandEvent {
            tick: TickCounter(1 + (i as u32) / 3),
            expected_result: ExpectedResult((i % 3) as u8),
            seed_byte: (i * 37) as u8,
            actor_id: ActorId((i % 15) as u8),
            client_id: ClientId((i * 7) as u16),
            command_id: CommandId((i % 90) as u16),
            payload: (0..(i % 40)).map(|b| (b + i) as u8).collect(),
        })
        .collect()
}

/// Record `n` commands on a simulation seeded with `seed`.
///
/// Two commands per tick starting at tick 1, alternating between actors
/// 1 and 2. Commands in `failing` are made to fail before recording.
pub fn recorded_session(seed: u64, n: usize, failing: &[u16]) -> Vec<CommandEvent> {
    let mut sim = MockSimulation::new(seed);
    for &command in failing {
        sim.fail_command(CommandId(command), Some("refused"));
    }
    (0..n)
        .map(|i| {
            let tick = 1 + (i / 2) as u32;
            let actor = 1 + (i % 2) as u8;
            let command = (i % 12) as u16;
            sim.record(tick, actor, command, vec![i as u8, 0xC0])
        })
        .collect()
}
