//! cmlog: command log recording, compressed storage and deterministic
//! replay for lockstep simulations.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the cmlog sub-crates. For most users, adding `cmlog` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use cmlog::prelude::*;
//!
//! // Record two commands into an in-memory stream.
//! let mut writer = StreamWriter::new(&StreamHeader::new(1)).unwrap();
//! for tick in [4u32, 9] {
//!     writer
//!         .append(&CommandEvent {
//!             tick: TickCounter(tick),
//!             expected_result: ExpectedResult::SUCCEEDED,
//!             command_id: CommandId(12),
//!             ..CommandEvent::default()
//!         })
//!         .unwrap();
//! }
//! let mut store = writer.finish();
//!
//! // Load it back into an engine.
//! let mut engine = ReplayEngine::new(ReplayConfig::for_producer(1)).unwrap();
//! let mut ignore = |_: &str| {};
//! let report = engine.load(&mut store, &mut ignore).unwrap();
//! assert_eq!(report.records, 2);
//! assert_eq!(engine.state(), ReplayState::Loaded);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `cmlog-core` | IDs, `CommandEvent`, host traits, `ActorScope` |
//! | [`replay`] | `cmlog-replay` | Bit packer, codec, stores, replay engine |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and host-facing traits (`cmlog-core`).
///
/// Contains the typed identifiers, [`types::CommandEvent`], and the traits
/// the host implements ([`types::CommandExecutor`], [`types::SeedSource`],
/// [`types::PeerBroadcaster`], [`types::SlotStore`]).
pub use cmlog_core as types;

/// Codec, storage and replay (`cmlog-replay`).
///
/// Write streams with [`replay::StreamWriter`], persist them through a
/// [`replay::ByteStore`], and replay them with [`replay::ReplayEngine`].
pub use cmlog_replay as replay;

/// Common imports for typical cmlog usage.
///
/// ```rust
/// use cmlog::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use cmlog_core::{
        ActorId, ActorScope, ClientId, CommandEvent, CommandExecutor, CommandId, CommandOutcome,
        ExpectedResult, FrameId, PeerBroadcaster, ReportSink, SeedSource, SlotStore, TickCounter,
    };

    // Streams
    pub use cmlog_replay::{
        decode_padded_stream, decode_stream, DecodedStream, StreamHeader, StreamWriter,
    };

    // Stores
    pub use cmlog_replay::{ByteStore, ChunkGeneration, ChunkedSlotStore, LzmaFileStore};

    // Engine
    pub use cmlog_replay::{
        LoadReport, ReplayConfig, ReplayDiagnostic, ReplayEngine, ReplayState, ReplayStats,
        StepReport,
    };

    // Errors
    pub use cmlog_replay::{BitError, ConfigError, ReplayError};
}
