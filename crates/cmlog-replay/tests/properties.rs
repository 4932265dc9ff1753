//! Property tests for the bit packer, record codec and chunked store.

use cmlog_core::{ActorId, ClientId, CommandEvent, CommandId, ExpectedResult, TickCounter};
use cmlog_replay::codec::{decode_event, encode_event, MAX_PAYLOAD_LEN};
use cmlog_replay::{
    decode_padded_stream, decode_stream, encode_stream, BitReader, BitWriter, ByteStore,
    ChunkGeneration, ChunkedSlotStore, ReplayConfig, ReplayError, StreamHeader, FORMAT_VERSION,
};
use cmlog_test_utils::MemorySlotStore;
use proptest::prelude::*;

const PRODUCER: u32 = 0x0E01_0203;

fn arb_event(min_tick: u32) -> impl Strategy<Value = CommandEvent> {
    (
        min_tick..=u32::MAX,
        0u8..=2,
        any::<u8>(),
        any::<u8>(),
        any::<u16>(),
        any::<u16>(),
        prop::collection::vec(any::<u8>(), 0..256),
    )
        .prop_map(
            |(tick, result, seed, actor, client, command, payload)| CommandEvent {
                tick: TickCounter(tick),
                expected_result: ExpectedResult(result),
                seed_byte: seed,
                actor_id: ActorId(actor),
                client_id: ClientId(client),
                command_id: CommandId(command),
                payload,
            },
        )
}

fn decode(bytes: &[u8]) -> Result<cmlog_replay::DecodedStream, ReplayError> {
    let mut ignore = |_: &str| {};
    decode_stream(bytes, &ReplayConfig::for_producer(PRODUCER), &mut ignore)
}

proptest! {
    #[test]
    fn event_roundtrip(event in arb_event(0)) {
        let mut w = BitWriter::new();
        encode_event(&mut w, &event).unwrap();
        let bytes = w.into_bytes();
        let mut r = BitReader::new(&bytes);
        prop_assert_eq!(decode_event(&mut r).unwrap(), event);
        prop_assert!(r.is_eof());
    }

    #[test]
    fn stream_roundtrip(events in prop::collection::vec(arb_event(0), 0..40)) {
        let bytes = encode_stream(&StreamHeader::new(PRODUCER), &events).unwrap();
        let decoded = decode(&bytes).unwrap();
        prop_assert!(!decoded.truncated);
        prop_assert_eq!(decoded.events, events);
    }

    #[test]
    fn truncation_never_fails(
        events in prop::collection::vec(arb_event(0), 1..20),
        cut in any::<prop::sample::Index>(),
    ) {
        let header = StreamHeader::new(PRODUCER);
        let bytes = encode_stream(&header, &events).unwrap();
        let at = cut.index(bytes.len());
        let decoded = decode(&bytes[..at]).unwrap();
        prop_assert!(decoded.len() < events.len());

        // A cut on a record boundary is just a shorter stream, and an empty
        // prefix is "no data". Anywhere else the cut must be reported.
        let boundaries: Vec<usize> = (0..events.len())
            .map(|k| encode_stream(&header, &events[..k]).unwrap().len())
            .collect();
        prop_assert_eq!(decoded.truncated, at > 0 && !boundaries.contains(&at));
        prop_assert_eq!(&events[..decoded.len()], decoded.events.as_slice());
    }

    #[test]
    fn newer_versions_decode_nothing(
        version in (FORMAT_VERSION + 1)..=u16::MAX,
        events in prop::collection::vec(arb_event(1), 0..5),
    ) {
        let mut bytes = encode_stream(&StreamHeader::new(PRODUCER), &events).unwrap();
        bytes[..2].copy_from_slice(&version.to_be_bytes());
        let is_too_new = matches!(decode(&bytes), Err(ReplayError::VersionTooNew { .. }));
        prop_assert!(is_too_new);
    }

    #[test]
    fn write_bytes_keeps_low_bytes(value in any::<u32>(), amount in 1usize..=4) {
        let mut w = BitWriter::new();
        w.write_bytes(value, amount);
        prop_assert_eq!(w.byte_size(), amount);
        let bytes = w.into_bytes();
        let mut r = BitReader::new(&bytes);
        let mask = if amount == 4 { u32::MAX } else { (1u32 << (amount * 8)) - 1 };
        prop_assert_eq!(r.read_bytes(amount).unwrap(), value & mask);
    }

    #[test]
    fn write_bytes64_keeps_low_bytes(value in any::<u64>(), amount in 1usize..=8) {
        let mut w = BitWriter::new();
        w.write_bytes64(value, amount);
        let bytes = w.into_bytes();
        let mut r = BitReader::new(&bytes);
        let mask = if amount == 8 { u64::MAX } else { (1u64 << (amount * 8)) - 1 };
        prop_assert_eq!(r.read_bytes64(amount).unwrap(), value & mask);
    }

    #[test]
    fn money_roundtrip(value in any::<i64>()) {
        let mut w = BitWriter::new();
        w.write_money(value);
        let bytes = w.into_bytes();
        prop_assert_eq!(BitReader::new(&bytes).read_money().unwrap(), value);
    }

    #[test]
    fn chunked_blob_roundtrip(
        events in prop::collection::vec(arb_event(1), 0..30),
        legacy in any::<bool>(),
    ) {
        let generation = if legacy { ChunkGeneration::Legacy } else { ChunkGeneration::Extended };
        let bytes = encode_stream(&StreamHeader::new(PRODUCER), &events).unwrap();
        let mut slots = MemorySlotStore::new();
        let mut store = ChunkedSlotStore::new(&mut slots, generation);
        store.write_bytes(&bytes).unwrap();

        let mut ignore = |_: &str| {};
        let back = store.read_bytes(&mut ignore).unwrap();
        let size = generation.chunk_size();
        prop_assert_eq!(back.len(), bytes.len().div_ceil(size) * size);
        let decoded =
            decode_padded_stream(&back, &ReplayConfig::for_producer(PRODUCER), &mut ignore)
                .unwrap();
        prop_assert_eq!(decoded.events, events);
    }
}

#[test]
fn maximum_payload_roundtrips() {
    let event = CommandEvent {
        tick: TickCounter(1),
        payload: vec![0xAB; MAX_PAYLOAD_LEN],
        ..CommandEvent::default()
    };
    let bytes =
        encode_stream(&StreamHeader::new(PRODUCER), std::slice::from_ref(&event)).unwrap();
    assert_eq!(decode(&bytes).unwrap().events, vec![event]);
}

#[test]
fn extreme_values_roundtrip() {
    let mut w = BitWriter::new();
    w.write_bytes(0xFF, 1);
    w.write_bytes(0xFFFF, 2);
    w.write_bytes(0xFF_FFFF, 3);
    w.write_bytes(u32::MAX, 4);
    w.write_bytes64(u64::MAX, 8);
    w.write_bytes(0x1234_5678, 2);
    let bytes = w.into_bytes();
    let mut r = BitReader::new(&bytes);
    assert_eq!(r.read_bytes(1).unwrap(), 0xFF);
    assert_eq!(r.read_bytes(2).unwrap(), 0xFFFF);
    assert_eq!(r.read_bytes(3).unwrap(), 0xFF_FFFF);
    assert_eq!(r.read_bytes(4).unwrap(), u32::MAX);
    assert_eq!(r.read_bytes64(8).unwrap(), u64::MAX);
    assert_eq!(r.read_bytes(2).unwrap(), 0x5678);
    assert!(r.is_eof());
}
