//! Record stream decoding.
//!
//! [`decode_stream`] turns a complete, uncompressed record stream into a
//! [`DecodedStream`]. Truncation is recovered locally: every record that
//! decoded cleanly is kept and the result is flagged. Only an unusable
//! header version is returned as an error.
//!
//! [`decode_padded_stream`] is the variant for blobs read back from
//! fixed-size storage, whose tail may be zero fill.

use cmlog_core::ReportSink;
use tracing::{debug, error, info, warn};

use crate::bits::BitReader;
use crate::codec::{decode_event, decode_header};
use crate::config::ReplayConfig;
use crate::error::ReplayError;
use crate::types::DecodedStream;

/// Decode a full record stream, byte for byte.
///
/// - Empty input is the normal "no data" case: no header, no records.
/// - Input that ends inside the header or a record yields whatever was
///   complete, with `truncated` set.
/// - A producer version other than `config.producer_version` is reported
///   and decoding continues.
/// - A format version this build cannot read is reported and returned as
///   an error; no records are decoded.
///
/// Progress and problems go both to `tracing` and to `sink`.
pub fn decode_stream(
    bytes: &[u8],
    config: &ReplayConfig,
    sink: &mut dyn ReportSink,
) -> Result<DecodedStream, ReplayError> {
    decode_records(bytes, config, false, sink)
}

/// Decode a record stream that was zero-padded for storage.
///
/// Behaves as [`decode_stream`], except that the record loop ends
/// cleanly once every remaining byte is zero.
pub fn decode_padded_stream(
    bytes: &[u8],
    config: &ReplayConfig,
    sink: &mut dyn ReportSink,
) -> Result<DecodedStream, ReplayError> {
    decode_records(bytes, config, true, sink)
}

fn decode_records(
    bytes: &[u8],
    config: &ReplayConfig,
    padded: bool,
    sink: &mut dyn ReportSink,
) -> Result<DecodedStream, ReplayError> {
    let mut out = DecodedStream::default();
    if bytes.is_empty() {
        debug!("empty command stream");
        return Ok(out);
    }

    let mut r = BitReader::new(bytes);
    let header = match decode_header(&mut r) {
        Ok(header) => header,
        Err(ReplayError::Bits(e)) => {
            warn!(error = %e, "command stream ends inside its header");
            sink.report("Unexpected end of command data");
            out.truncated = true;
            return Ok(out);
        }
        Err(e) => {
            error!(error = %e, "command stream rejected");
            sink.report(&e.to_string());
            return Err(e);
        }
    };

    if header.producer_version != config.producer_version {
        warn!(
            current = config.producer_version,
            recorded = header.producer_version,
            "producer version mismatch"
        );
        sink.report(&format!(
            "Producer version doesn't match: current {}, log file {}",
            config.producer_version, header.producer_version
        ));
        out.producer_mismatch = true;
    }
    out.header = Some(header);

    while !r.is_eof() {
        if padded && r.rest().iter().all(|&b| b == 0) {
            debug!(padding = r.remaining(), "trailing zero padding");
            break;
        }
        match decode_event(&mut r) {
            Ok(event) => {
                debug!(
                    tick = event.tick.0,
                    command = event.command_id.0,
                    actor = event.actor_id.0,
                    client = event.client_id.0,
                    "decoded command"
                );
                sink.report(&format!(
                    "Command {} actor={} client={} tick={}",
                    event.command_id, event.actor_id, event.client_id, event.tick
                ));
                out.events.push(event);
            }
            Err(e) => {
                out.truncated = true;
                warn!(recovered = out.events.len(), error = %e, "command stream truncated");
                sink.report(&format!(
                    "Unexpected end of command data ({} commands recovered)",
                    out.events.len()
                ));
                break;
            }
        }
    }

    info!(
        records = out.events.len(),
        truncated = out.truncated,
        format_version = header.format_version,
        "decoded command stream"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StreamHeader;
    use crate::writer::encode_stream;
    use crate::FORMAT_VERSION;
    use cmlog_core::{ActorId, CommandEvent, CommandId, ExpectedResult, TickCounter};

    fn events(n: u32) -> Vec<CommandEvent> {
        (0..n)
            .map(|i| CommandEvent {
                tick: TickCounter(10 + i),
                expected_result: ExpectedResult::SUCCEEDED,
                seed_byte: i as u8,
                actor_id: ActorId(1),
                command_id: CommandId(5),
                payload: vec![i as u8; 4],
                ..CommandEvent::default()
            })
            .collect()
    }

    fn decode(bytes: &[u8], producer: u32) -> (Result<DecodedStream, ReplayError>, Vec<String>) {
        let mut messages = Vec::new();
        let result = {
            let mut sink = |m: &str| messages.push(m.to_string());
            decode_stream(bytes, &ReplayConfig::for_producer(producer), &mut sink)
        };
        (result, messages)
    }

    #[test]
    fn roundtrip_stream() {
        let bytes = encode_stream(&StreamHeader::new(9), &events(5)).unwrap();
        let (result, messages) = decode(&bytes, 9);
        let decoded = result.unwrap();
        assert_eq!(decoded.events, events(5));
        assert!(!decoded.truncated);
        assert!(!decoded.producer_mismatch);
        assert_eq!(messages.len(), 5);
        assert!(messages[0].starts_with("Command 5 actor=1"), "{}", messages[0]);
    }

    #[test]
    fn empty_input_is_no_data() {
        let (result, messages) = decode(&[], 9);
        let decoded = result.unwrap();
        assert!(decoded.header.is_none());
        assert!(decoded.is_empty());
        assert!(!decoded.truncated);
        assert!(messages.is_empty());
    }

    #[test]
    fn truncated_header_recovers_nothing() {
        let (result, messages) = decode(&[0, 2, 0], 9);
        let decoded = result.unwrap();
        assert!(decoded.header.is_none());
        assert!(decoded.truncated);
        assert_eq!(messages, vec!["Unexpected end of command data"]);
    }

    #[test]
    fn truncated_record_keeps_prefix() {
        let bytes = encode_stream(&StreamHeader::new(9), &events(3)).unwrap();
        let cut = &bytes[..bytes.len() - 2];
        let (result, messages) = decode(cut, 9);
        let decoded = result.unwrap();
        assert_eq!(decoded.len(), 2);
        assert!(decoded.truncated);
        assert!(messages.last().unwrap().contains("2 commands recovered"));
    }

    #[test]
    fn producer_mismatch_warns_and_continues() {
        let bytes = encode_stream(&StreamHeader::new(1), &events(2)).unwrap();
        let (result, messages) = decode(&bytes, 2);
        let decoded = result.unwrap();
        assert!(decoded.producer_mismatch);
        assert_eq!(decoded.len(), 2);
        assert!(messages[0].contains("current 2, log file 1"), "{}", messages[0]);
    }

    #[test]
    fn newer_version_decodes_nothing() {
        let mut bytes = encode_stream(&StreamHeader::new(9), &events(2)).unwrap();
        bytes[1] = (FORMAT_VERSION + 1) as u8;
        let (result, messages) = decode(&bytes, 9);
        assert!(matches!(result, Err(ReplayError::VersionTooNew { .. })));
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("unsupported log file version"));
    }

    #[test]
    fn zero_padding_is_ignored_when_padded() {
        let mut bytes = encode_stream(&StreamHeader::new(9), &events(2)).unwrap();
        bytes.resize(1024, 0);
        let mut ignore = |_: &str| {};
        let decoded =
            decode_padded_stream(&bytes, &ReplayConfig::for_producer(9), &mut ignore).unwrap();
        assert_eq!(decoded.events, events(2));
        assert!(!decoded.truncated);
    }

    #[test]
    fn default_records_survive_exact_decode() {
        let mut queue = events(1);
        queue.push(CommandEvent::default());
        queue.push(CommandEvent::default());
        let bytes = encode_stream(&StreamHeader::new(9), &queue).unwrap();
        let (result, _) = decode(&bytes, 9);
        let decoded = result.unwrap();
        assert_eq!(decoded.events, queue);
        assert!(!decoded.truncated);
    }

    #[test]
    fn cut_inside_zero_tick_bytes_is_truncation() {
        let queue: Vec<CommandEvent> = (1..=2)
            .map(|tick| CommandEvent {
                tick: TickCounter(tick),
                expected_result: ExpectedResult::SUCCEEDED,
                command_id: CommandId(3),
                ..CommandEvent::default()
            })
            .collect();
        let header_len = encode_stream(&StreamHeader::new(9), &[]).unwrap().len();
        let bytes = encode_stream(&StreamHeader::new(9), &queue).unwrap();
        let record_len = (bytes.len() - header_len) / 2;

        // The second record's tick starts with two zero bytes.
        let cut = &bytes[..header_len + record_len + 2];
        assert!(cut[header_len + record_len..].iter().all(|&b| b == 0));

        let (result, messages) = decode(cut, 9);
        let decoded = result.unwrap();
        assert_eq!(decoded.events, queue[..1].to_vec());
        assert!(decoded.truncated);
        assert!(messages.last().unwrap().contains("Unexpected end of command data"));
    }

    #[test]
    fn legacy_version_one_stream_decodes() {
        let header = StreamHeader {
            format_version: 1,
            producer_version: 9,
            ..StreamHeader::default()
        };
        let bytes = encode_stream(&header, &events(2)).unwrap();
        let (result, _) = decode(&bytes, 9);
        let decoded = result.unwrap();
        assert_eq!(decoded.header, Some(header));
        assert_eq!(decoded.events, events(2));
    }
}
