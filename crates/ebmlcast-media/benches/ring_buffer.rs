//! Benchmarks for the ring buffer and segment stream.
//!
//! Measures raw append/read throughput and end-to-end segmenting of a
//! synthesized stream at typical network chunk sizes.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ebmlcast_ebml::builder::WebmBuilder;
use ebmlcast_media::{RingBuffer, SegmentStream, StreamConfig};

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_append");

    for chunk_size in [1024, 16 * 1024, 64 * 1024] {
        let chunk = vec![0xA5u8; chunk_size];
        group.throughput(Throughput::Bytes(chunk_size as u64));
        group.bench_function(format!("append_{}", chunk_size), |b| {
            let mut ring = RingBuffer::with_capacity(1024 * 1024).unwrap();
            b.iter(|| ring.append(black_box(&chunk)).unwrap());
        });
    }

    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_read");
    let capacity = 1024 * 1024;

    for read_size in [4 * 1024, 256 * 1024] {
        // Misalign the write head so reads straddle the wrap point.
        let mut ring = RingBuffer::with_capacity(capacity).unwrap();
        ring.append(&vec![1u8; capacity]).unwrap();
        ring.append(&vec![2u8; capacity / 2]).unwrap();
        let end = ring.total_written();
        let start = end - (capacity as u64 / 2) - (read_size as u64 / 2);

        group.throughput(Throughput::Bytes(read_size as u64));
        group.bench_function(format!("read_wrapped_{}", read_size), |b| {
            b.iter(|| black_box(ring.read(start, start + read_size as u64).unwrap()));
        });
    }

    group.finish();
}

fn bench_segmenting(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_stream");

    let frame = vec![0u8; 128 * 1024];
    let built = (0..16)
        .fold(WebmBuilder::new().live(true).cues(true), |builder, i| {
            builder.cluster(i * 33, &frame)
        })
        .build();

    group.throughput(Throughput::Bytes(built.bytes.len() as u64));
    for chunk_size in [4 * 1024, 64 * 1024] {
        group.bench_function(format!("write_chunks_{}", chunk_size), |b| {
            let config = StreamConfig::default().compute_durations(true);
            let mut stream = SegmentStream::new(config).unwrap();
            b.iter(|| {
                stream.reset();
                let mut emitted = 0;
                for chunk in built.bytes.chunks(chunk_size) {
                    emitted += stream.write(chunk).unwrap().len();
                }
                black_box(emitted)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_append, bench_read, bench_segmenting);
criterion_main!(benches);
