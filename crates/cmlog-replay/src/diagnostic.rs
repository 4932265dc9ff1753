//! Replay diagnostics and session statistics.
//!
//! Nothing the replay engine finds is fatal. Divergences and desyncs are
//! collected here for the caller to inspect after each step, and summed
//! over the session in [`ReplayStats`].

use std::fmt;

use cmlog_core::{ActorId, CommandId, TickCounter};
use indexmap::IndexMap;

/// A mismatch between a replayed command and its recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplayDiagnostic {
    /// The command succeeded but was recorded as failing.
    UnexpectedSuccess {
        /// Tick the command was recorded at.
        tick: TickCounter,
        /// Actor the command ran under.
        actor: ActorId,
        /// Opcode of the command.
        command: CommandId,
    },
    /// The command failed but was recorded as succeeding.
    UnexpectedFailure {
        /// Tick the command was recorded at.
        tick: TickCounter,
        /// Actor the command ran under.
        actor: ActorId,
        /// Opcode of the command.
        command: CommandId,
        /// Error text from the executor, if it gave one.
        error: Option<String>,
    },
    /// The RNG state after the command differs from the recording.
    Desync {
        /// Tick the command was recorded at.
        tick: TickCounter,
        /// Actor the command ran under.
        actor: ActorId,
        /// Opcode of the command.
        command: CommandId,
        /// Seed byte from the recording.
        expected: u8,
        /// Seed byte observed after replaying.
        actual: u8,
    },
}

impl ReplayDiagnostic {
    /// Tick of the command that produced this diagnostic.
    pub fn tick(&self) -> TickCounter {
        match self {
            Self::UnexpectedSuccess { tick, .. }
            | Self::UnexpectedFailure { tick, .. }
            | Self::Desync { tick, .. } => *tick,
        }
    }

    /// Opcode of the command that produced this diagnostic.
    pub fn command(&self) -> CommandId {
        match self {
            Self::UnexpectedSuccess { command, .. }
            | Self::UnexpectedFailure { command, .. }
            | Self::Desync { command, .. } => *command,
        }
    }

    /// Whether this is an RNG desync rather than a pass/fail divergence.
    pub fn is_desync(&self) -> bool {
        matches!(self, Self::Desync { .. })
    }
}

impl fmt::Display for ReplayDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedSuccess {
                tick,
                actor,
                command,
            } => write!(
                f,
                "replay divergence at tick {tick}: command {command} (actor {actor}) succeeded unexpectedly"
            ),
            Self::UnexpectedFailure {
                tick,
                actor,
                command,
                error,
            } => {
                write!(
                    f,
                    "replay divergence at tick {tick}: command {command} (actor {actor}) failed unexpectedly"
                )?;
                if let Some(error) = error {
                    write!(f, ": {error}")?;
                }
                Ok(())
            }
            Self::Desync {
                tick,
                actor,
                command,
                expected,
                actual,
            } => write!(
                f,
                "desync at tick {tick} after command {command} (actor {actor}): expected seed {expected}, current {actual}"
            ),
        }
    }
}

/// Outcome of one [`ReplayEngine::step`](crate::ReplayEngine::step).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Commands handed to the executor.
    pub executed: usize,
    /// Commands dropped because the recording rejected them.
    pub rejected: usize,
    /// Mismatches found, in execution order.
    pub diagnostics: Vec<ReplayDiagnostic>,
}

impl StepReport {
    /// Whether no command diverged or desynced.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of desync diagnostics.
    pub fn desyncs(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_desync()).count()
    }
}

/// Per-opcode counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandTally {
    /// Times executed.
    pub executed: u64,
    /// Times dropped as rejected.
    pub rejected: u64,
    /// Pass/fail divergences.
    pub divergences: u64,
    /// RNG desyncs.
    pub desyncs: u64,
}

/// Counters accumulated over one replay session.
#[derive(Clone, Debug, Default)]
pub struct ReplayStats {
    executed: u64,
    rejected: u64,
    skipped: u64,
    divergences: u64,
    desyncs: u64,
    first_desync: Option<TickCounter>,
    per_command: IndexMap<CommandId, CommandTally>,
}

impl ReplayStats {
    /// Commands handed to the executor.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Commands dropped as rejected.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Commands discarded because they predated the start tick.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Pass/fail divergences.
    pub fn divergences(&self) -> u64 {
        self.divergences
    }

    /// RNG desyncs.
    pub fn desyncs(&self) -> u64 {
        self.desyncs
    }

    /// Tick of the first desync. Later ones are usually consequences of it.
    pub fn first_desync(&self) -> Option<TickCounter> {
        self.first_desync
    }

    /// Counters per opcode, in first-seen order.
    pub fn per_command(&self) -> &IndexMap<CommandId, CommandTally> {
        &self.per_command
    }

    pub(crate) fn record_skipped(&mut self, count: usize) {
        self.skipped += count as u64;
    }

    pub(crate) fn record_rejected(&mut self, command: CommandId) {
        self.rejected += 1;
        self.per_command.entry(command).or_default().rejected += 1;
    }

    pub(crate) fn record_executed(&mut self, command: CommandId) {
        self.executed += 1;
        self.per_command.entry(command).or_default().executed += 1;
    }

    pub(crate) fn record(&mut self, diagnostic: &ReplayDiagnostic) {
        let tally = self.per_command.entry(diagnostic.command()).or_default();
        if diagnostic.is_desync() {
            self.desyncs += 1;
            tally.desyncs += 1;
            self.first_desync.get_or_insert(diagnostic.tick());
        } else {
            self.divergences += 1;
            tally.divergences += 1;
        }
    }
}
