//! Record stream writer.
//!
//! [`StreamWriter`] builds an uncompressed record stream in memory. The
//! header is written immediately on construction; records follow in the
//! order they are appended.

use cmlog_core::CommandEvent;

use crate::bits::BitWriter;
use crate::codec::{encode_event, encode_header};
use crate::error::ReplayError;
use crate::types::StreamHeader;

/// Encodes a record stream into a byte buffer.
///
/// # Examples
///
/// ```
/// use cmlog_core::{CommandEvent, TickCounter};
/// use cmlog_replay::{decode_stream, ReplayConfig, StreamHeader, StreamWriter};
///
/// let mut writer = StreamWriter::new(&StreamHeader::new(7)).unwrap();
/// for tick in [5u32, 10] {
///     let event = CommandEvent { tick: TickCounter(tick), ..CommandEvent::default() };
///     writer.append(&event).unwrap();
/// }
/// assert_eq!(writer.records_written(), 2);
/// let bytes = writer.finish();
///
/// let mut ignore = |_: &str| {};
/// let decoded = decode_stream(&bytes, &ReplayConfig::for_producer(7), &mut ignore).unwrap();
/// assert_eq!(decoded.events.len(), 2);
/// assert_eq!(decoded.events[1].tick, TickCounter(10));
/// ```
#[derive(Debug)]
pub struct StreamWriter {
    bits: BitWriter,
    records_written: u64,
}

impl StreamWriter {
    /// Start a stream, immediately writing `header`.
    pub fn new(header: &StreamHeader) -> Result<Self, ReplayError> {
        let mut bits = BitWriter::with_capacity(1000);
        encode_header(&mut bits, header)?;
        Ok(Self {
            bits,
            records_written: 0,
        })
    }

    /// Append one record.
    pub fn append(&mut self, event: &CommandEvent) -> Result<(), ReplayError> {
        encode_event(&mut self.bits, event)?;
        self.records_written += 1;
        Ok(())
    }

    /// Append every record of `events`, in order.
    pub fn extend<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a CommandEvent>,
    ) -> Result<(), ReplayError> {
        for event in events {
            self.append(event)?;
        }
        Ok(())
    }

    /// Append zero bytes until the stream length is a multiple of `block`.
    ///
    /// Read such streams back with
    /// [`decode_padded_stream`](crate::reader::decode_padded_stream).
    pub fn pad_to_multiple(&mut self, block: usize) {
        if block == 0 {
            return;
        }
        let rem = self.bits.byte_size() % block;
        if rem != 0 {
            self.bits.write_zeros(block - rem);
        }
    }

    /// Number of records appended so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Bytes encoded so far, header included.
    pub fn byte_size(&self) -> usize {
        self.bits.byte_size()
    }

    /// Consume the writer and return the encoded stream.
    pub fn finish(self) -> Vec<u8> {
        self.bits.into_bytes()
    }
}

/// Encode `header` followed by all of `events` into one buffer.
pub fn encode_stream(
    header: &StreamHeader,
    events: &[CommandEvent],
) -> Result<Vec<u8>, ReplayError> {
    let mut writer = StreamWriter::new(header)?;
    writer.extend(events)?;
    Ok(writer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{HEADER_LEN_V2, RECORD_FIXED_LEN};
    use cmlog_core::TickCounter;

    #[test]
    fn header_written_on_construction() {
        let writer = StreamWriter::new(&StreamHeader::new(1)).unwrap();
        assert_eq!(writer.byte_size(), HEADER_LEN_V2);
        assert_eq!(writer.records_written(), 0);
    }

    #[test]
    fn padding_rounds_up() {
        let mut writer = StreamWriter::new(&StreamHeader::new(1)).unwrap();
        writer
            .append(&CommandEvent {
                tick: TickCounter(1),
                payload: vec![1, 2, 3],
                ..CommandEvent::default()
            })
            .unwrap();
        assert_eq!(writer.byte_size(), HEADER_LEN_V2 + RECORD_FIXED_LEN + 3);
        writer.pad_to_multiple(64);
        assert_eq!(writer.byte_size(), 64);
        writer.pad_to_multiple(64);
        assert_eq!(writer.byte_size(), 64);
    }

    #[test]
    fn failed_append_is_not_counted() {
        let mut writer = StreamWriter::new(&StreamHeader::new(1)).unwrap();
        let big = CommandEvent {
            payload: vec![0; 70_000],
            ..CommandEvent::default()
        };
        assert!(writer.append(&big).is_err());
        assert_eq!(writer.records_written(), 0);
        assert_eq!(writer.byte_size(), HEADER_LEN_V2);
    }

    #[test]
    fn encode_stream_concatenates() {
        let events = vec![CommandEvent::default(); 3];
        let bytes = encode_stream(&StreamHeader::new(1), &events).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN_V2 + 3 * RECORD_FIXED_LEN);
    }
}
