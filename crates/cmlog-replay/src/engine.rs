//! Deterministic replay of a recorded command log.
//!
//! [`ReplayEngine`] owns the queue of decoded [`CommandEvent`]s and
//! drains it against the host simulation one tick at a time. Every
//! executed command is checked against its recording: the pass/fail
//! outcome and the low byte of the RNG state must both match. Mismatches
//! are reported, never fatal; the queue always advances.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──load──▶ Loaded ──step──▶ Replaying ──queue empty──▶ Exhausted
//!   ▲                                                            │
//!   └───────────────────────────── reset ◀───────────────────────┘
//! ```
//!
//! A load that recovers zero records goes straight to `Exhausted`. A load
//! that fails outright leaves the engine `Idle`.

use std::collections::VecDeque;
use std::path::Path;

use cmlog_core::{
    ActorScope, CommandEvent, CommandExecutor, PeerBroadcaster, ReportSink, SeedSource,
    TickCounter,
};
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, ReplayConfig};
use crate::diagnostic::{ReplayDiagnostic, ReplayStats, StepReport};
use crate::error::ReplayError;
use crate::lzma::LzmaFileStore;
use crate::reader::{decode_padded_stream, decode_stream};
use crate::store::ByteStore;
use crate::types::{DecodedStream, StreamHeader};

// ── ReplayState ─────────────────────────────────────────────────

/// Where the engine is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReplayState {
    /// Nothing loaded.
    #[default]
    Idle,
    /// Queue populated, first step not yet taken.
    Loaded,
    /// Queue being drained.
    Replaying,
    /// Queue empty: replay finished, or the load recovered nothing.
    Exhausted,
}

// ── LoadReport ──────────────────────────────────────────────────

/// Summary of a successful load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Header of the loaded stream, if one was complete.
    pub header: Option<StreamHeader>,
    /// Records queued.
    pub records: usize,
    /// Whether the stream was cut short.
    pub truncated: bool,
    /// Whether the stream came from a different build.
    pub producer_mismatch: bool,
}

// ── ReplayEngine ────────────────────────────────────────────────

/// Replays a command log against a live simulation.
///
/// # Examples
///
/// ```
/// use cmlog_core::{
///     ActorId, CommandEvent, CommandExecutor, CommandId, CommandOutcome, ExpectedResult,
///     SeedSource, TickCounter,
/// };
/// use cmlog_replay::{ReplayConfig, ReplayEngine};
///
/// struct Sim { actor: ActorId, ran: Vec<CommandId> }
///
/// impl CommandExecutor for Sim {
///     fn current_actor(&self) -> ActorId { self.actor }
///     fn set_current_actor(&mut self, actor: ActorId) { self.actor = actor }
///     fn execute(&mut self, cmd: CommandId, _: ActorId, _: &[u8]) -> CommandOutcome {
///         self.ran.push(cmd);
///         CommandOutcome::success()
///     }
/// }
///
/// impl SeedSource for Sim {
///     fn current_seed_byte(&self) -> u8 { 0 }
/// }
///
/// let mut engine = ReplayEngine::new(ReplayConfig::default()).unwrap();
/// engine.load_events([CommandEvent {
///     tick: TickCounter(3),
///     expected_result: ExpectedResult::SUCCEEDED,
///     command_id: CommandId(42),
///     ..CommandEvent::default()
/// }]);
///
/// let mut sim = Sim { actor: ActorId(0), ran: Vec::new() };
/// assert!(engine.step(TickCounter(2), &mut sim, None).is_clean());
/// assert!(sim.ran.is_empty());
///
/// let report = engine.step(TickCounter(3), &mut sim, None);
/// assert_eq!(report.executed, 1);
/// assert_eq!(sim.ran, vec![CommandId(42)]);
/// assert!(!engine.is_replaying());
/// ```
#[derive(Debug)]
pub struct ReplayEngine {
    config: ReplayConfig,
    queue: VecDeque<CommandEvent>,
    state: ReplayState,
    stats: ReplayStats,
}

impl ReplayEngine {
    /// Create an idle engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn new(config: ReplayConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            queue: VecDeque::new(),
            state: ReplayState::Idle,
            stats: ReplayStats::default(),
        })
    }

    /// The engine's configuration.
    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    // ── Loading ─────────────────────────────────────────────────

    /// Replace the queue with the stream held in `store`.
    ///
    /// The current queue is dropped first. A truncated stream still
    /// loads, with a shorter queue.
    ///
    /// # Errors
    ///
    /// Fails if the store yields nothing usable or the stream's format
    /// version is unsupported. The engine is then `Idle`. Every failure
    /// has already been reported to `sink`.
    pub fn load<S: ByteStore + ?Sized>(
        &mut self,
        store: &mut S,
        sink: &mut dyn ReportSink,
    ) -> Result<LoadReport, ReplayError> {
        self.reset();
        let bytes = store.read_bytes(sink)?;
        let decoded = if store.pads_tail() {
            decode_padded_stream(&bytes, &self.config, sink)?
        } else {
            decode_stream(&bytes, &self.config, sink)?
        };
        Ok(self.install(decoded))
    }

    /// Load an LZMA-compressed replay file.
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load); additionally fails if the file cannot be
    /// opened.
    pub fn load_file(
        &mut self,
        path: impl AsRef<Path>,
        sink: &mut dyn ReportSink,
    ) -> Result<LoadReport, ReplayError> {
        let mut store = LzmaFileStore::new(path.as_ref(), &self.config);
        let result = self.load(&mut store, sink);
        if let Err(e) = &result {
            error!(path = %path.as_ref().display(), error = %e, "replay file not loaded");
        }
        result
    }

    /// Replace the queue with `events`, already decoded.
    ///
    /// Returns the number of events queued.
    pub fn load_events(&mut self, events: impl IntoIterator<Item = CommandEvent>) -> usize {
        self.reset();
        self.queue.extend(events);
        self.state = self.state_after_load();
        info!(records = self.queue.len(), "replay queue loaded");
        self.queue.len()
    }

    fn install(&mut self, decoded: DecodedStream) -> LoadReport {
        let report = LoadReport {
            header: decoded.header,
            records: decoded.events.len(),
            truncated: decoded.truncated,
            producer_mismatch: decoded.producer_mismatch,
        };
        self.queue = decoded.events.into();
        self.state = self.state_after_load();
        info!(
            records = report.records,
            truncated = report.truncated,
            "replay queue loaded"
        );
        report
    }

    fn state_after_load(&self) -> ReplayState {
        if self.queue.is_empty() {
            ReplayState::Exhausted
        } else {
            ReplayState::Loaded
        }
    }

    /// Drop the queue and statistics and return to `Idle`.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.state = ReplayState::Idle;
        self.stats = ReplayStats::default();
    }

    // ── Replay ──────────────────────────────────────────────────

    /// Discard, without executing, every queued event recorded before
    /// `tick`.
    ///
    /// Only acts while `Loaded` or `Replaying`. Returns the number of
    /// events discarded.
    pub fn skip_to(&mut self, tick: TickCounter) -> usize {
        if !matches!(self.state, ReplayState::Loaded | ReplayState::Replaying) {
            return 0;
        }
        let mut skipped = 0;
        while self.queue.front().is_some_and(|e| e.tick < tick) {
            self.queue.pop_front();
            skipped += 1;
        }
        if skipped > 0 {
            info!(skipped, tick = tick.0, "skipped commands that predate the current tick");
            self.stats.record_skipped(skipped);
        }
        if self.queue.is_empty() {
            self.state = ReplayState::Exhausted;
        }
        skipped
    }

    /// Run every queued event due at or before `tick`.
    ///
    /// The first step after a load first skips the backlog older than
    /// `tick`, so replay starts aligned with the simulation clock.
    ///
    /// Events recorded as rejected are dropped unexecuted. Every other
    /// event runs under its recorded actor, with the previous actor
    /// restored afterwards. When the engine is configured as networked and
    /// `network` is given, each such event is first rebroadcast to peers,
    /// stamped `frame_lead` frames past the broadcaster's newest frame.
    pub fn step<H>(
        &mut self,
        tick: TickCounter,
        host: &mut H,
        network: Option<&mut dyn PeerBroadcaster>,
    ) -> StepReport
    where
        H: CommandExecutor + SeedSource + ?Sized,
    {
        let mut report = StepReport::default();
        if self.state == ReplayState::Loaded {
            self.state = ReplayState::Replaying;
            self.skip_to(tick);
        }
        if self.state != ReplayState::Replaying {
            return report;
        }

        let mut network = if self.config.networked { network } else { None };

        while self.queue.front().is_some_and(|e| e.tick <= tick) {
            let Some(event) = self.queue.pop_front() else {
                break;
            };

            if event.expected_result.is_rejected() {
                debug!(
                    tick = event.tick.0,
                    command = event.command_id.0,
                    "dropping command rejected in the recording"
                );
                self.stats.record_rejected(event.command_id);
                report.rejected += 1;
                continue;
            }

            if let Some(net) = network.as_deref_mut() {
                let target = net.frame_counter_max().ahead(self.config.frame_lead);
                net.broadcast(&event, target);
            }

            debug!(
                tick = event.tick.0,
                command = event.command_id.0,
                name = host.command_name(event.command_id).unwrap_or("unknown"),
                actor = event.actor_id.0,
                "replaying command"
            );

            let (outcome, seed) = {
                let mut scope = ActorScope::enter(&mut *host, event.actor_id);
                let outcome = scope.execute(event.command_id, event.actor_id, &event.payload);
                (outcome, scope.current_seed_byte())
            };
            self.stats.record_executed(event.command_id);
            report.executed += 1;

            if outcome.succeeded != event.expected_result.expects_success() {
                let diagnostic = if outcome.succeeded {
                    ReplayDiagnostic::UnexpectedSuccess {
                        tick: event.tick,
                        actor: event.actor_id,
                        command: event.command_id,
                    }
                } else {
                    ReplayDiagnostic::UnexpectedFailure {
                        tick: event.tick,
                        actor: event.actor_id,
                        command: event.command_id,
                        error: outcome.error_text,
                    }
                };
                warn!(
                    name = host.command_name(event.command_id).unwrap_or("unknown"),
                    "{diagnostic}"
                );
                self.stats.record(&diagnostic);
                report.diagnostics.push(diagnostic);
            }

            if seed != event.seed_byte {
                let diagnostic = ReplayDiagnostic::Desync {
                    tick: event.tick,
                    actor: event.actor_id,
                    command: event.command_id,
                    expected: event.seed_byte,
                    actual: seed,
                };
                warn!(
                    name = host.command_name(event.command_id).unwrap_or("unknown"),
                    "{diagnostic}"
                );
                self.stats.record(&diagnostic);
                report.diagnostics.push(diagnostic);
            }
        }

        if self.queue.is_empty() {
            self.state = ReplayState::Exhausted;
            info!(
                executed = self.stats.executed(),
                desyncs = self.stats.desyncs(),
                "replay finished"
            );
        }
        report
    }

    // ── Accessors ───────────────────────────────────────────────

    /// Whether events remain queued.
    pub fn is_replaying(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReplayState {
        self.state
    }

    /// Number of queued events.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// The next event to be replayed.
    pub fn front(&self) -> Option<&CommandEvent> {
        self.queue.front()
    }

    /// Counters accumulated since the last load.
    pub fn stats(&self) -> &ReplayStats {
        &self.stats
    }
}
