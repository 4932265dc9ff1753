//! Collaborator traits implemented by the host simulation.
//!
//! The replay engine never owns simulation state. It reaches the host
//! through these traits: the command executor, the RNG accessor, the
//! network layer, the persistent slot store, and the message sink.

use crate::command::{CommandEvent, CommandOutcome};
use crate::id::{ActorId, CommandId, FrameId};

/// Executes recorded commands against the live simulation.
///
/// The executor also owns the "current actor" context. The replay
/// engine switches it through [`ActorScope`](crate::ActorScope), which
/// restores the previous actor on every exit path.
pub trait CommandExecutor {
    /// The actor the simulation currently acts on behalf of.
    fn current_actor(&self) -> ActorId;

    /// Switch the acting identity.
    fn set_current_actor(&mut self, actor: ActorId);

    /// Execute `command` with `payload` under `actor`'s authority.
    ///
    /// Runs synchronously; never panics on a rejected command.
    fn execute(&mut self, command: CommandId, actor: ActorId, payload: &[u8]) -> CommandOutcome;

    /// Human-readable name of an opcode, for diagnostics.
    fn command_name(&self, _command: CommandId) -> Option<&str> {
        None
    }
}

/// Read access to the simulation's deterministic RNG state.
pub trait SeedSource {
    /// Low 8 bits of the live RNG state.
    fn current_seed_byte(&self) -> u8;
}

/// Network layer used to rebroadcast replayed commands in lockstep.
pub trait PeerBroadcaster {
    /// Highest frame the server has already scheduled.
    fn frame_counter_max(&self) -> FrameId;

    /// Queue `event` for every connected peer, to be applied at `target_frame`.
    fn broadcast(&mut self, event: &CommandEvent, target_frame: FrameId);
}

/// One slot of a generic chunked persistent store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotEntry<'a> {
    /// Position of the slot in the store's array.
    pub index: u32,
    /// Tag identifying who owns the slot.
    pub owner: u32,
    /// Raw slot contents.
    pub data: &'a [u8],
}

/// Slot-oriented key-value storage provided by the host save system.
pub trait SlotStore {
    /// All slots, in ascending index order.
    fn entries(&self) -> Vec<SlotEntry<'_>>;

    /// Write one chunk at `index`, replacing any slot already there.
    fn write_chunk(&mut self, index: u32, owner: u32, bytes: &[u8]);

    /// Drop every slot owned by `owner`.
    fn remove_owner(&mut self, owner: u32);
}

/// Receives human-readable status and error messages.
///
/// Implemented for every `FnMut(&str)`, so callers usually pass a
/// closure.
pub trait ReportSink {
    /// Deliver one message.
    fn report(&mut self, message: &str);
}

impl<F: FnMut(&str)> ReportSink for F {
    fn report(&mut self, message: &str) {
        self(message)
    }
}
