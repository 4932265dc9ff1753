//! Recorded command events and execution outcomes.

use crate::id::{ActorId, ClientId, CommandId, TickCounter};

/// How the recording session resolved a command.
///
/// Stored as a single raw byte. `0` means the command was rejected
/// before execution and must not be replayed; `1` means it executed and
/// failed. Every other non-zero value is treated as "executed and
/// succeeded", which keeps unrecognised producer codes round-trippable
/// without guessing at their meaning.
///
/// # Examples
///
/// ```
/// use cmlog_core::ExpectedResult;
///
/// assert!(ExpectedResult::REJECTED.is_rejected());
/// assert!(!ExpectedResult::FAILED.expects_success());
/// assert!(ExpectedResult::SUCCEEDED.expects_success());
/// assert!(ExpectedResult(7).expects_success());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ExpectedResult(pub u8);

impl ExpectedResult {
    /// Command was rejected by the recording session.
    pub const REJECTED: Self = Self(0);
    /// Command executed and failed.
    pub const FAILED: Self = Self(1);
    /// Command executed and succeeded.
    pub const SUCCEEDED: Self = Self(2);

    /// Whether replay must skip this command without executing it.
    pub fn is_rejected(self) -> bool {
        self.0 == 0
    }

    /// Whether the recording session saw this command succeed.
    ///
    /// Only meaningful when [`is_rejected`](Self::is_rejected) is false.
    pub fn expects_success(self) -> bool {
        self.0 != 1
    }

    /// Expected result for a command that was executed with `succeeded`.
    pub fn from_outcome(succeeded: bool) -> Self {
        if succeeded {
            Self::SUCCEEDED
        } else {
            Self::FAILED
        }
    }
}

/// One recorded, replayable state-changing operation.
///
/// # Examples
///
/// ```
/// use cmlog_core::{ActorId, ClientId, CommandEvent, CommandId, ExpectedResult, TickCounter};
///
/// let event = CommandEvent {
///     tick: TickCounter(120),
///     expected_result: ExpectedResult::SUCCEEDED,
///     seed_byte: 0x5a,
///     actor_id: ActorId(1),
///     client_id: ClientId(3),
///     command_id: CommandId(17),
///     payload: vec![0, 1, 2],
/// };
///
/// assert!(!event.expected_result.is_rejected());
/// assert_eq!(event.payload.len(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandEvent {
    /// Tick at which the command must be applied.
    pub tick: TickCounter,
    /// Resolution observed by the recording session.
    pub expected_result: ExpectedResult,
    /// Low 8 bits of the recording session's RNG state after execution.
    pub seed_byte: u8,
    /// Identity the command executes under.
    pub actor_id: ActorId,
    /// Network client that issued the command.
    pub client_id: ClientId,
    /// Operation selector.
    pub command_id: CommandId,
    /// Command-specific arguments, opaque to the log.
    pub payload: Vec<u8>,
}

/// Result of executing one command against the host simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Whether the command succeeded.
    pub succeeded: bool,
    /// Human-readable reason for a failure, when the host has one.
    pub error_text: Option<String>,
}

impl CommandOutcome {
    /// A successful outcome.
    pub fn success() -> Self {
        Self {
            succeeded: true,
            error_text: None,
        }
    }

    /// A failed outcome with an optional reason.
    pub fn failure(error_text: Option<String>) -> Self {
        Self {
            succeeded: false,
            error_text,
        }
    }
}
