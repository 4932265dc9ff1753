//! Error types for the command log.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::bits::BitError;

/// Errors that can occur while encoding, storing, or loading a command log.
///
/// Truncated record data is not an error at this level: the stream
/// reader converts it into a shorter result. Only conditions that leave
/// nothing usable are surfaced here.
#[derive(Debug)]
pub enum ReplayError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// A replay file could not be opened.
    Open {
        /// The file that was requested.
        path: PathBuf,
        /// Why opening it failed.
        source: io::Error,
    },
    /// A primitive read or write failed.
    Bits(BitError),
    /// The stream was written by a newer format than this build reads.
    VersionTooNew {
        /// The version found in the stream.
        found: u16,
        /// The newest version this build supports.
        supported: u16,
    },
    /// The stream carries a version number that was never issued.
    UnknownVersion {
        /// The version found in the stream.
        found: u16,
    },
    /// A command payload does not fit the 2-byte length prefix.
    PayloadTooLarge {
        /// Length of the rejected payload.
        len: usize,
    },
    /// The LZMA decoder or encoder could not be initialised.
    DecoderInit {
        /// Error reported by liblzma.
        detail: String,
    },
    /// The LZMA stream was corrupt and no bytes could be recovered.
    Decompress {
        /// Error reported by liblzma.
        detail: String,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Open { path, source } => {
                write!(f, "cannot open file `{}`: {source}", path.display())
            }
            Self::Bits(e) => write!(f, "{e}"),
            Self::VersionTooNew { found, supported } => write!(
                f,
                "unsupported log file version {found} (newest supported is {supported})"
            ),
            Self::UnknownVersion { found } => write!(f, "unknown log file version {found}"),
            Self::PayloadTooLarge { len } => {
                write!(f, "command payload of {len} bytes exceeds 65535")
            }
            Self::DecoderInit { detail } => {
                write!(f, "cannot initialize LZMA codec: {detail}")
            }
            Self::Decompress { detail } => write!(f, "LZMA decompressor error: {detail}"),
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Open { source, .. } => Some(source),
            Self::Bits(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ReplayError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<BitError> for ReplayError {
    fn from(e: BitError) -> Self {
        match e {
            BitError::DataTooLong { len } => Self::PayloadTooLarge { len },
            other => Self::Bits(other),
        }
    }
}
