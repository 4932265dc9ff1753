//! Test utilities and mock collaborators for cmlog development.
//!
//! Provides mock implementations of the host-facing traits
//! ([`CommandExecutor`], [`SeedSource`], [`PeerBroadcaster`],
//! [`SlotStore`], [`ReportSink`]) plus record fixtures in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::{BTreeMap, HashMap};

use cmlog_core::{
    ActorId, ClientId, CommandEvent, CommandExecutor, CommandId, CommandOutcome, ExpectedResult,
    FrameId, PeerBroadcaster, ReportSink, SeedSource, SlotEntry, SlotStore, TickCounter,
};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ── MockSimulation ──────────────────────────────────────────────

/// One call observed by [`MockSimulation::execute`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutedCall {
    pub command: CommandId,
    /// Actor passed as the command's authority.
    pub actor: ActorId,
    /// The simulation's current actor while the command ran.
    pub context_actor: ActorId,
    pub payload: Vec<u8>,
}

/// Deterministic stand-in for the host simulation.
///
/// Every executed command advances a seeded ChaCha8 stream, so two
/// simulations built from the same seed and fed the same commands report
/// the same seed bytes. Commands succeed unless configured to fail with
/// [`fail_command`](MockSimulation::fail_command).
pub struct MockSimulation {
    actor: ActorId,
    rng: ChaCha8Rng,
    seed_byte: u8,
    failures: HashMap<CommandId, Option<String>>,
    names: HashMap<CommandId, String>,
    calls: Vec<ExecutedCall>,
}

impl MockSimulation {
    pub fn new(seed: u64) -> Self {
        Self {
            actor: ActorId(0),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed_byte: 0,
            failures: HashMap::new(),
            names: HashMap::new(),
            calls: Vec::new(),
        }
    }

    /// Make every execution of `command` fail with `error`.
    pub fn fail_command(&mut self, command: CommandId, error: Option<&str>) {
        self.failures.insert(command, error.map(str::to_owned));
    }

    /// Register a display name for `command`.
    pub fn set_name(&mut self, command: CommandId, name: impl Into<String>) {
        self.names.insert(command, name.into());
    }

    /// Calls observed so far, in order.
    pub fn calls(&self) -> &[ExecutedCall] {
        &self.calls
    }

    /// Execute a command live and return the record a recorder would
    /// have captured for it.
    pub fn record(
        &mut self,
        tick: u32,
        actor: u8,
        command: u16,
        payload: Vec<u8>,
    ) -> CommandEvent {
        let actor = ActorId(actor);
        let command = CommandId(command);
        let previous = self.current_actor();
        self.set_current_actor(actor);
        let outcome = self.execute(command, actor, &payload);
        self.set_current_actor(previous);
        CommandEvent {
            tick: TickCounter(tick),
            expected_result: ExpectedResult::from_outcome(outcome.succeeded),
            seed_byte: self.current_seed_byte(),
            actor_id: actor,
            client_id: ClientId(u16::from(actor.0) + 1),
            command_id: command,
            payload,
        }
    }
}

impl CommandExecutor for MockSimulation {
    fn current_actor(&self) -> ActorId {
        self.actor
    }

    fn set_current_actor(&mut self, actor: ActorId) {
        self.actor = actor;
    }

    fn execute(&mut self, command: CommandId, actor: ActorId, payload: &[u8]) -> CommandOutcome {
        self.calls.push(ExecutedCall {
            command,
            actor,
            context_actor: self.actor,
            payload: payload.to_vec(),
        });
        self.seed_byte = self.rng.next_u32() as u8;
        match self.failures.get(&command) {
            Some(error) => CommandOutcome::failure(error.clone()),
            None => CommandOutcome::success(),
        }
    }

    fn command_name(&self, command: CommandId) -> Option<&str> {
        self.names.get(&command).map(String::as_str)
    }
}

impl SeedSource for MockSimulation {
    fn current_seed_byte(&self) -> u8 {
        self.seed_byte
    }
}

// ── RecordingBroadcaster ────────────────────────────────────────

/// [`PeerBroadcaster`] that records every rebroadcast.
#[derive(Default)]
pub struct RecordingBroadcaster {
    pub frame_counter_max: FrameId,
    pub sent: Vec<(CommandEvent, FrameId)>,
}

impl RecordingBroadcaster {
    pub fn new(frame_counter_max: u32) -> Self {
        Self {
            frame_counter_max: FrameId(frame_counter_max),
            sent: Vec::new(),
        }
    }
}

impl PeerBroadcaster for RecordingBroadcaster {
    fn frame_counter_max(&self) -> FrameId {
        self.frame_counter_max
    }

    fn broadcast(&mut self, event: &CommandEvent, target_frame: FrameId) {
        self.sent.push((event.clone(), target_frame));
    }
}

// ── MemorySlotStore ─────────────────────────────────────────────

/// In-memory [`SlotStore`], keyed by slot index.
#[derive(Default)]
pub struct MemorySlotStore {
    slots: BTreeMap<u32, (u32, Vec<u8>)>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Indices of the slots held by `owner`, ascending.
    pub fn indices_of(&self, owner: u32) -> Vec<u32> {
        self.slots
            .iter()
            .filter(|(_, (o, _))| *o == owner)
            .map(|(&index, _)| index)
            .collect()
    }

    /// Contents of the slot at `index`.
    pub fn get(&self, index: u32) -> Option<&[u8]> {
        self.slots.get(&index).map(|(_, data)| data.as_slice())
    }
}

impl SlotStore for MemorySlotStore {
    fn entries(&self) -> Vec<SlotEntry<'_>> {
        self.slots
            .iter()
            .map(|(&index, (owner, data))| SlotEntry {
                index,
                owner: *owner,
                data,
            })
            .collect()
    }

    fn write_chunk(&mut self, index: u32, owner: u32, bytes: &[u8]) {
        self.slots.insert(index, (owner, bytes.to_vec()));
    }

    fn remove_owner(&mut self, owner: u32) {
        self.slots.retain(|_, (o, _)| *o != owner);
    }
}

// ── CollectingSink ──────────────────────────────────────────────

/// [`ReportSink`] that keeps every message.
#[derive(Default)]
pub struct CollectingSink {
    pub messages: Vec<String>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }
}

impl ReportSink for CollectingSink {
    fn report(&mut self, message: &str) {
        self.messages.push(message.to_owned());
    }
}
