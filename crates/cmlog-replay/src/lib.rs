//! Command log recording, storage and deterministic replay.
//!
//! A command log is a versioned binary stream of [`CommandEvent`]s, each
//! one a state-changing command captured during a session together with
//! the tick it ran at, whether it succeeded, and the low byte of the RNG
//! state right after it ran.
//!
//! # Layers
//!
//! - [`bits`]: big-endian integer and length-prefixed blob packing.
//! - [`codec`]: exact byte layout of the stream header and of one record.
//! - [`StreamWriter`] / [`decode_stream`]: whole streams, with truncation
//!   recovered as a shorter result rather than an error.
//! - [`ByteStore`]: where a stream lives. [`LzmaFileStore`] keeps
//!   replay files xz-compressed on disk; [`ChunkedSlotStore`] keeps the
//!   uncompressed stream in fixed-size chunks of the host's save slots.
//! - [`ReplayEngine`]: drains a loaded stream against the live
//!   simulation, checking every command's outcome and RNG byte.
//!
//! [`CommandEvent`]: cmlog_core::CommandEvent

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bits;
pub mod chunked;
pub mod codec;
pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod lzma;
pub mod reader;
pub mod store;
pub mod types;
pub mod writer;

/// Newest record stream format version this build reads and writes.
pub const FORMAT_VERSION: u16 = 2;

pub use bits::{BitError, BitReader, BitWriter};
pub use chunked::{
    encode_persisted, save_events, ChunkGeneration, ChunkedSlotStore, PERSIST_ALIGN,
    RESERVED_OWNER,
};
pub use config::{ConfigError, ReplayConfig};
pub use diagnostic::{CommandTally, ReplayDiagnostic, ReplayStats, StepReport};
pub use engine::{LoadReport, ReplayEngine, ReplayState};
pub use error::ReplayError;
pub use lzma::LzmaFileStore;
pub use reader::{decode_padded_stream, decode_stream};
pub use store::ByteStore;
pub use types::{DecodedStream, StreamHeader};
pub use writer::{encode_stream, StreamWriter};
