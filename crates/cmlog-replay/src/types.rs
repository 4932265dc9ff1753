//! Data types for the record stream.

use cmlog_core::CommandEvent;

use crate::FORMAT_VERSION;

/// Header at the start of every record stream.
///
/// Version 1 streams carry only `format_version` and
/// `producer_version`; the remaining fields read back as zero.
///
/// # Examples
///
/// ```
/// use cmlog_replay::StreamHeader;
///
/// let header = StreamHeader::new(0x0E00_1234);
/// assert_eq!(header.format_version, cmlog_replay::FORMAT_VERSION);
/// assert_eq!(header.controller_type, 0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamHeader {
    /// Record stream layout version.
    pub format_version: u16,
    /// Build identity of the engine that recorded the stream.
    pub producer_version: u32,
    /// Kind of controller the session ran under (host-defined).
    pub controller_type: u8,
    /// In-game date when recording started.
    pub recording_date: i32,
    /// Sub-day fraction of `recording_date`.
    pub recording_date_fraction: u8,
    /// Game type of the recorded session (host-defined).
    pub game_type: u8,
}

impl StreamHeader {
    /// Current-version header for a stream produced by `producer_version`.
    pub fn new(producer_version: u32) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            producer_version,
            ..Self::default()
        }
    }
}

/// Everything recovered from one record stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedStream {
    /// The header, or `None` when the input ended before a full header.
    pub header: Option<StreamHeader>,
    /// Records in stream order.
    pub events: Vec<CommandEvent>,
    /// Whether the input ended in the middle of a header or record.
    pub truncated: bool,
    /// Whether the producer differs from the running build.
    pub producer_mismatch: bool,
}

impl DecodedStream {
    /// Number of records recovered.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no records were recovered.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
