//! Binary layout of the record stream header and of one command record.
//!
//! All integers are big-endian and byte-aligned, written through
//! [`BitWriter`] and read back through [`BitReader`]. The payload is the
//! only variable-length field and carries a 2-byte length prefix.

use cmlog_core::{ActorId, ClientId, CommandEvent, CommandId, ExpectedResult, TickCounter};

use crate::bits::{BitError, BitReader, BitWriter};
use crate::error::ReplayError;
use crate::types::StreamHeader;
use crate::FORMAT_VERSION;

/// Encoded size of a version 1 header.
pub const HEADER_LEN_V1: usize = 6;

/// Encoded size of a version 2 header.
pub const HEADER_LEN_V2: usize = 20;

/// Encoded size of a record with an empty payload.
pub const RECORD_FIXED_LEN: usize = 13;

/// Largest payload a record can carry.
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

// ── Header encode/decode ────────────────────────────────────────

/// Encode a stream header in the layout its `format_version` selects.
pub fn encode_header(w: &mut BitWriter, header: &StreamHeader) -> Result<(), ReplayError> {
    check_version(header.format_version)?;
    w.write_bytes(u32::from(header.format_version), 2);
    w.write_bytes(header.producer_version, 4);
    if header.format_version >= 2 {
        w.write_bytes(u32::from(header.controller_type), 1);
        w.write_bytes(header.recording_date as u32, 4);
        w.write_bytes(u32::from(header.recording_date_fraction), 1);
        w.write_bytes(u32::from(header.game_type), 1);
        // Reserved
        w.write_zeros(3);
        w.write_zeros(4);
    }
    Ok(())
}

/// Decode a stream header.
///
/// The version is checked before anything else is read: a newer or
/// unknown version stops decoding without touching the rest of the
/// buffer. A header cut short yields [`ReplayError::Bits`].
pub fn decode_header(r: &mut BitReader<'_>) -> Result<StreamHeader, ReplayError> {
    let format_version = r.read_bytes(2)? as u16;
    check_version(format_version)?;

    let mut header = StreamHeader {
        format_version,
        producer_version: r.read_bytes(4)?,
        ..StreamHeader::default()
    };
    if format_version >= 2 {
        header.controller_type = r.read_bytes(1)? as u8;
        header.recording_date = r.read_bytes(4)? as i32;
        header.recording_date_fraction = r.read_bytes(1)? as u8;
        header.game_type = r.read_bytes(1)? as u8;
        // Reserved
        r.read_bytes(3)?;
        r.read_bytes(4)?;
    }
    Ok(header)
}

fn check_version(version: u16) -> Result<(), ReplayError> {
    if version == 0 {
        return Err(ReplayError::UnknownVersion { found: version });
    }
    if version > FORMAT_VERSION {
        return Err(ReplayError::VersionTooNew {
            found: version,
            supported: FORMAT_VERSION,
        });
    }
    Ok(())
}

// ── Record encode/decode ────────────────────────────────────────

/// Encode one command record.
///
/// The payload length is checked before any byte is written, so a
/// rejected record leaves the writer unchanged.
pub fn encode_event(w: &mut BitWriter, event: &CommandEvent) -> Result<(), ReplayError> {
    if event.payload.len() > MAX_PAYLOAD_LEN {
        return Err(ReplayError::PayloadTooLarge {
            len: event.payload.len(),
        });
    }
    w.reserve(RECORD_FIXED_LEN + event.payload.len());
    w.write_bytes(event.tick.0, 4);
    w.write_bytes(u32::from(event.expected_result.0), 1);
    w.write_bytes(u32::from(event.seed_byte), 1);
    w.write_bytes(u32::from(event.actor_id.0), 1);
    w.write_bytes(u32::from(event.client_id.0), 2);
    w.write_bytes(u32::from(event.command_id.0), 2);
    w.write_data(&event.payload)?;
    Ok(())
}

/// Decode one command record.
pub fn decode_event(r: &mut BitReader<'_>) -> Result<CommandEvent, BitError> {
    Ok(CommandEvent {
        tick: TickCounter(r.read_bytes(4)?),
        expected_result: ExpectedResult(r.read_bytes(1)? as u8),
        seed_byte: r.read_bytes(1)? as u8,
        actor_id: ActorId(r.read_bytes(1)? as u8),
        client_id: ClientId(r.read_bytes(2)? as u16),
        command_id: CommandId(r.read_bytes(2)? as u16),
        payload: r.read_data()?,
    })
}

/// Encoded size of `event` in bytes.
pub fn encoded_len(event: &CommandEvent) -> usize {
    RECORD_FIXED_LEN + event.payload.len()
}
