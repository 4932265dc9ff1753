//! Backing stores for encoded record streams.
//!
//! The codec only ever sees a complete byte buffer. Where that buffer
//! lives is a [`ByteStore`]: a whole-file LZMA stream
//! ([`LzmaFileStore`](crate::lzma::LzmaFileStore)), fixed-size chunks in
//! the host's save slots ([`ChunkedSlotStore`](crate::chunked::ChunkedSlotStore)),
//! or a plain `Vec<u8>` in tests.

use cmlog_core::ReportSink;

use crate::error::ReplayError;

/// Persists and retrieves one opaque byte blob.
pub trait ByteStore {
    /// Replace the stored blob with `bytes`.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ReplayError>;

    /// Retrieve the stored blob.
    ///
    /// Recoverable problems (a corrupt tail, say) are reported to `sink`
    /// and the bytes that could be recovered are returned. An error means
    /// nothing usable was found.
    fn read_bytes(&mut self, sink: &mut dyn ReportSink) -> Result<Vec<u8>, ReplayError>;

    /// Whether blobs read back may end in zero fill added by the store.
    fn pads_tail(&self) -> bool {
        false
    }
}

impl ByteStore for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ReplayError> {
        self.clear();
        self.extend_from_slice(bytes);
        Ok(())
    }

    fn read_bytes(&mut self, _sink: &mut dyn ReportSink) -> Result<Vec<u8>, ReplayError> {
        Ok(self.clone())
    }
}
