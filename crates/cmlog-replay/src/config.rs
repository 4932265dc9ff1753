//! Replay configuration and validation.
//!
//! [`ReplayConfig`] carries everything the loader and the engine need
//! to know about the running build and the storage backends.
//! [`validate()`](ReplayConfig::validate) checks its invariants once, at
//! engine construction.

use std::error::Error;
use std::fmt;

/// Default input/output chunk for the LZMA streaming loop.
pub const DEFAULT_DECOMPRESS_CHUNK: usize = 128 * 1024;

/// Default memory limit handed to the LZMA auto-decoder.
pub const DEFAULT_DECODER_MEMLIMIT: u64 = 1 << 28;

/// Default xz preset used when writing replay files.
pub const DEFAULT_COMPRESSION_PRESET: u32 = 6;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`ReplayConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The decompression chunk size is zero.
    ZeroDecompressChunk,
    /// The decoder memory limit is zero.
    ZeroMemlimit,
    /// The xz preset is outside 0..=9.
    InvalidPreset {
        /// The configured preset.
        value: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDecompressChunk => write!(f, "decompress_chunk_size must be at least 1"),
            Self::ZeroMemlimit => write!(f, "decoder_memlimit must be at least 1"),
            Self::InvalidPreset { value } => {
                write!(f, "compression_preset must be in 0..=9, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}

// ── ReplayConfig ───────────────────────────────────────────────────

/// Configuration for loading and replaying command logs.
#[derive(Clone, Debug)]
pub struct ReplayConfig {
    /// Build identity of the running engine. Streams recorded by another
    /// build still load, with a warning.
    pub producer_version: u32,
    /// Bytes read from disk, and output bytes reserved, per LZMA step.
    /// Default: 128 KiB.
    pub decompress_chunk_size: usize,
    /// Memory limit for the LZMA auto-decoder. Default: 256 MiB.
    pub decoder_memlimit: u64,
    /// xz preset for writing replay files. Default: 6.
    pub compression_preset: u32,
    /// Rebroadcast executed commands to connected peers. Default: false.
    pub networked: bool,
    /// Frames added to the broadcaster's newest frame when stamping
    /// rebroadcast commands. Default: 1.
    pub frame_lead: u32,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            producer_version: 0,
            decompress_chunk_size: DEFAULT_DECOMPRESS_CHUNK,
            decoder_memlimit: DEFAULT_DECODER_MEMLIMIT,
            compression_preset: DEFAULT_COMPRESSION_PRESET,
            networked: false,
            frame_lead: 1,
        }
    }
}

impl ReplayConfig {
    /// Config for a build identified by `producer_version`, otherwise default.
    pub fn for_producer(producer_version: u32) -> Self {
        Self {
            producer_version,
            ..Self::default()
        }
    }

    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decompress_chunk_size == 0 {
            return Err(ConfigError::ZeroDecompressChunk);
        }
        if self.decoder_memlimit == 0 {
            return Err(ConfigError::ZeroMemlimit);
        }
        if self.compression_preset > 9 {
            return Err(ConfigError::InvalidPreset {
                value: self.compression_preset,
            });
        }
        Ok(())
    }
}
