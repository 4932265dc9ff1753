//! Whole-file LZMA storage for replay files.
//!
//! Replay files are a record stream pushed through a standard xz/LZMA
//! encoder. Decoding uses liblzma's auto-detecting decoder, fed in
//! fixed-size chunks, with the output buffer growing geometrically. A
//! corrupt or cut-off stream is best effort: whatever was decompressed
//! before the failure is kept.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use cmlog_core::ReportSink;
use tracing::{debug, error, warn};
use xz2::stream::{Action, Status, Stream};
use xz2::write::XzEncoder;

use crate::config::ReplayConfig;
use crate::error::ReplayError;
use crate::store::ByteStore;

/// A replay file on disk, LZMA-compressed as a whole.
#[derive(Clone, Debug)]
pub struct LzmaFileStore {
    path: PathBuf,
    chunk_size: usize,
    memlimit: u64,
    preset: u32,
}

impl LzmaFileStore {
    /// Store backed by `path`, using the chunk size, memory limit and
    /// preset from `config`.
    pub fn new(path: impl Into<PathBuf>, config: &ReplayConfig) -> Self {
        Self {
            path: path.into(),
            chunk_size: config.decompress_chunk_size.max(1),
            memlimit: config.decoder_memlimit,
            preset: config.compression_preset.min(9),
        }
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteStore for LzmaFileStore {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ReplayError> {
        let file = File::create(&self.path)?;
        let mut encoder = XzEncoder::new(BufWriter::new(file), self.preset);
        encoder.write_all(bytes)?;
        encoder.finish()?.flush()?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "wrote replay file");
        Ok(())
    }

    fn read_bytes(&mut self, sink: &mut dyn ReportSink) -> Result<Vec<u8>, ReplayError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(source) => {
                let e = ReplayError::Open {
                    path: self.path.clone(),
                    source,
                };
                error!(error = %e, "cannot open replay file");
                sink.report(&e.to_string());
                return Err(e);
            }
        };
        let data = decompress(file, self.chunk_size, self.memlimit, sink)?;
        debug!(path = %self.path.display(), bytes = data.len(), "read replay file");
        Ok(data)
    }
}

/// Compress `bytes` into an in-memory xz stream.
pub fn compress(bytes: &[u8], preset: u32) -> Result<Vec<u8>, ReplayError> {
    let mut encoder = XzEncoder::new(Vec::with_capacity(bytes.len() / 2), preset.min(9));
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Decompress an LZMA/xz stream read from `input`.
///
/// Input is read `chunk_size` bytes at a time. Decoder errors are
/// reported to `sink`; if any output was produced before the error it is
/// returned, otherwise [`ReplayError::Decompress`] is. Read errors on
/// `input` are fatal.
pub fn decompress<R: Read>(
    mut input: R,
    chunk_size: usize,
    memlimit: u64,
    sink: &mut dyn ReportSink,
) -> Result<Vec<u8>, ReplayError> {
    let chunk_size = chunk_size.max(1);
    let mut stream = Stream::new_auto_decoder(memlimit, 0).map_err(|e| {
        error!(error = %e, "cannot initialize LZMA decompressor");
        sink.report(&format!("Cannot initialize LZMA decompressor ({e})"));
        ReplayError::DecoderInit {
            detail: e.to_string(),
        }
    })?;

    let mut inbuf = vec![0u8; chunk_size];
    let mut out: Vec<u8> = Vec::with_capacity(chunk_size);
    let mut input_done = false;

    loop {
        let n = if input_done {
            0
        } else {
            match read_chunk(&mut input, &mut inbuf) {
                Ok(n) => n,
                Err(e) => {
                    error!(error = %e, "error reading compressed input");
                    sink.report(&format!("Error reading compressed input: {e}"));
                    return Err(ReplayError::Io(e));
                }
            }
        };
        if n < chunk_size {
            input_done = true;
        }
        let action = if input_done {
            Action::Finish
        } else {
            Action::Run
        };

        let mut pending = &inbuf[..n];
        loop {
            if out.len() == out.capacity() {
                out.reserve(out.capacity().max(chunk_size));
            }
            let in_before = stream.total_in();
            let out_before = out.len();
            let status = stream.process_vec(pending, &mut out, action);
            let consumed = (stream.total_in() - in_before) as usize;
            pending = &pending[consumed..];

            match status {
                Ok(Status::StreamEnd) => {
                    out.shrink_to_fit();
                    return Ok(out);
                }
                Ok(_) => {}
                Err(e) => return recover(out, e.to_string(), sink),
            }

            if pending.is_empty() && !input_done {
                break;
            }
            if consumed == 0 && out.len() == out_before {
                return recover(out, "unexpected end of compressed data".to_string(), sink);
            }
        }
    }
}

/// Fill `buf` from `input`, stopping early only at end of input.
fn read_chunk<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn recover(
    out: Vec<u8>,
    detail: String,
    sink: &mut dyn ReportSink,
) -> Result<Vec<u8>, ReplayError> {
    warn!(recovered = out.len(), error = %detail, "LZMA decompression failed");
    sink.report(&format!("LZMA decompressor returned error: {detail}"));
    if out.is_empty() {
        Err(ReplayError::Decompress { detail })
    } else {
        Ok(out)
    }
}
