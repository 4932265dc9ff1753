//! Criterion micro-benchmarks for the record codec and byte stores.

use std::hint::black_box;

use cmlog_bench::session_profile;
use cmlog_replay::{
    decode_stream, encode_stream, lzma, ByteStore, ChunkGeneration, ChunkedSlotStore,
    ReplayConfig, StreamHeader,
};
use cmlog_test_utils::MemorySlotStore;
use criterion::{criterion_group, criterion_main, Criterion};

const PRODUCER: u32 = 1;

/// Benchmark: encode a 10K-command session.
fn bench_encode_stream(c: &mut Criterion) {
    let events = session_profile(10_000, 42);
    let header = StreamHeader::new(PRODUCER);

    c.bench_function("encode_stream_10k", |b| {
        b.iter(|| {
            let bytes = encode_stream(&header, &events).unwrap();
            black_box(bytes);
        });
    });
}

/// Benchmark: decode the same session.
fn bench_decode_stream(c: &mut Criterion) {
    let events = session_profile(10_000, 42);
    let bytes = encode_stream(&StreamHeader::new(PRODUCER), &events).unwrap();
    let config = ReplayConfig::for_producer(PRODUCER);

    c.bench_function("decode_stream_10k", |b| {
        b.iter(|| {
            let mut ignore = |_: &str| {};
            let decoded = decode_stream(&bytes, &config, &mut ignore).unwrap();
            black_box(decoded);
        });
    });
}

/// Benchmark: compress then decompress the encoded session.
fn bench_lzma_roundtrip(c: &mut Criterion) {
    let events = session_profile(10_000, 42);
    let bytes = encode_stream(&StreamHeader::new(PRODUCER), &events).unwrap();
    let config = ReplayConfig::default();

    c.bench_function("lzma_roundtrip_10k", |b| {
        b.iter(|| {
            let packed = lzma::compress(&bytes, config.compression_preset).unwrap();
            let mut ignore = |_: &str| {};
            let unpacked = lzma::decompress(
                packed.as_slice(),
                config.decompress_chunk_size,
                config.decoder_memlimit,
                &mut ignore,
            )
            .unwrap();
            black_box(unpacked);
        });
    });
}

/// Benchmark: save and reload the session through 1 KiB slots.
fn bench_chunked_roundtrip(c: &mut Criterion) {
    let events = session_profile(2_000, 42);
    let bytes = encode_stream(&StreamHeader::new(PRODUCER), &events).unwrap();

    c.bench_function("chunked_roundtrip_2k", |b| {
        b.iter(|| {
            let mut slots = MemorySlotStore::new();
            let mut store = ChunkedSlotStore::new(&mut slots, ChunkGeneration::Extended);
            store.write_bytes(&bytes).unwrap();
            let mut ignore = |_: &str| {};
            black_box(store.read_bytes(&mut ignore).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_encode_stream,
    bench_decode_stream,
    bench_lzma_roundtrip,
    bench_chunked_roundtrip
);
criterion_main!(benches);
