//! Persisted extra state: an uncompressed record stream split into
//! fixed-size chunks inside the host's save slots.
//!
//! The host save system exposes an array of slots, each tagged with an
//! owner. Our chunks carry [`RESERVED_OWNER`] and are placed after every
//! slot any other owner uses, so the host's own data is never disturbed.

use cmlog_core::{CommandEvent, ReportSink, SlotStore};
use tracing::{debug, warn};

use crate::error::ReplayError;
use crate::store::ByteStore;
use crate::types::StreamHeader;
use crate::writer::StreamWriter;

/// Owner tag marking slots that hold our chunks.
pub const RESERVED_OWNER: u32 = 0x534B_0501;

/// Persisted streams are zero-padded to a multiple of this many bytes.
pub const PERSIST_ALIGN: usize = 64;

/// Slot layout generation of the host save format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChunkGeneration {
    /// Older saves: 64-byte slots.
    Legacy,
    /// Current saves: 1024-byte slots.
    #[default]
    Extended,
}

impl ChunkGeneration {
    /// Bytes carried by one slot.
    pub fn chunk_size(self) -> usize {
        match self {
            Self::Legacy => 64,
            Self::Extended => 1024,
        }
    }
}

/// [`ByteStore`] over the chunks one owner keeps in a [`SlotStore`].
pub struct ChunkedSlotStore<'a, S: SlotStore + ?Sized> {
    slots: &'a mut S,
    generation: ChunkGeneration,
    owner: u32,
}

impl<'a, S: SlotStore + ?Sized> ChunkedSlotStore<'a, S> {
    /// Chunks of [`RESERVED_OWNER`] in `slots`, laid out per `generation`.
    pub fn new(slots: &'a mut S, generation: ChunkGeneration) -> Self {
        Self {
            slots,
            generation,
            owner: RESERVED_OWNER,
        }
    }

    /// Use a different owner tag.
    pub fn with_owner(mut self, owner: u32) -> Self {
        self.owner = owner;
        self
    }

    /// Slot layout in use.
    pub fn generation(&self) -> ChunkGeneration {
        self.generation
    }

    /// First slot index past every slot held by another owner.
    fn base_index(&self) -> u32 {
        self.slots
            .entries()
            .iter()
            .filter(|e| e.owner != self.owner)
            .map(|e| e.index.saturating_add(1))
            .max()
            .unwrap_or(0)
    }
}

impl<S: SlotStore + ?Sized> ByteStore for ChunkedSlotStore<'_, S> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ReplayError> {
        let size = self.generation.chunk_size();
        self.slots.remove_owner(self.owner);
        let base = self.base_index();

        let mut index = base;
        for chunk in bytes.chunks(size) {
            if chunk.len() == size {
                self.slots.write_chunk(index, self.owner, chunk);
            } else {
                let mut last = chunk.to_vec();
                last.resize(size, 0);
                self.slots.write_chunk(index, self.owner, &last);
            }
            index = index.saturating_add(1);
        }
        debug!(
            base,
            chunks = index - base,
            bytes = bytes.len(),
            "saved chunked state"
        );
        Ok(())
    }

    fn read_bytes(&mut self, _sink: &mut dyn ReportSink) -> Result<Vec<u8>, ReplayError> {
        let size = self.generation.chunk_size();
        let mut out = Vec::new();
        let mut chunks = 0usize;
        for entry in self.slots.entries() {
            if entry.owner != self.owner {
                continue;
            }
            if entry.data.len() != size {
                warn!(
                    index = entry.index,
                    len = entry.data.len(),
                    expected = size,
                    "state chunk has unexpected size"
                );
            }
            let take = entry.data.len().min(size);
            out.extend_from_slice(&entry.data[..take]);
            out.resize(out.len() + (size - take), 0);
            chunks += 1;
        }
        debug!(chunks, bytes = out.len(), "loaded chunked state");
        Ok(out)
    }

    fn pads_tail(&self) -> bool {
        true
    }
}

/// Encode `events` as a persisted stream, zero-padded to
/// [`PERSIST_ALIGN`].
pub fn encode_persisted(
    header: &StreamHeader,
    events: &[CommandEvent],
) -> Result<Vec<u8>, ReplayError> {
    let mut writer = StreamWriter::new(header)?;
    writer.extend(events)?;
    writer.pad_to_multiple(PERSIST_ALIGN);
    Ok(writer.finish())
}

/// Encode `events` and store them as chunks in `slots`.
///
/// Returns the number of chunks written.
pub fn save_events<S: SlotStore + ?Sized>(
    slots: &mut S,
    generation: ChunkGeneration,
    header: &StreamHeader,
    events: &[CommandEvent],
) -> Result<usize, ReplayError> {
    let bytes = encode_persisted(header, events)?;
    ChunkedSlotStore::new(slots, generation).write_bytes(&bytes)?;
    Ok(bytes.len().div_ceil(generation.chunk_size()))
}
