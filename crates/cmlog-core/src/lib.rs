//! Core types and traits for the cmlog command log.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions shared by the codec and the replay
//! engine: typed identifiers, the recorded [`CommandEvent`], and the
//! traits through which the host simulation is driven.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod command;
pub mod id;
pub mod scope;
pub mod traits;

pub use command::{CommandEvent, CommandOutcome, ExpectedResult};
pub use id::{ActorId, ClientId, CommandId, FrameId, TickCounter};
pub use scope::ActorScope;
pub use traits::{CommandExecutor, PeerBroadcaster, ReportSink, SeedSource, SlotEntry, SlotStore};
