/// Decode throughput and latency benchmarks

use byteorder::{BigEndian, WriteBytesExt};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use itch_feed::{Parser, TagFilter};

fn push_header(buf: &mut Vec<u8>, tag: u8, timestamp: u64) {
    buf.push(tag);
    buf.write_u16::<BigEndian>(1).unwrap(); // stock locate
    buf.write_u16::<BigEndian>(0).unwrap(); // tracking number
    buf.write_u16::<BigEndian>((timestamp >> 32) as u16).unwrap();
    buf.write_u32::<BigEndian>(timestamp as u32).unwrap();
}

fn add_order_frame(buf: &mut Vec<u8>, reference: u64, price: u32) {
    buf.write_u16::<BigEndian>(36).unwrap();
    push_header(buf, b'A', reference);
    buf.write_u64::<BigEndian>(reference).unwrap();
    buf.push(b'B');
    buf.write_u32::<BigEndian>(100).unwrap();
    buf.extend_from_slice(b"AAPL    ");
    buf.write_u32::<BigEndian>(price).unwrap();
}

fn executed_frame(buf: &mut Vec<u8>, reference: u64) {
    buf.write_u16::<BigEndian>(31).unwrap();
    push_header(buf, b'E', reference);
    buf.write_u64::<BigEndian>(reference).unwrap();
    buf.write_u32::<BigEndian>(10).unwrap();
    buf.write_u64::<BigEndian>(reference).unwrap();
}

fn delete_frame(buf: &mut Vec<u8>, reference: u64) {
    buf.write_u16::<BigEndian>(19).unwrap();
    push_header(buf, b'D', reference);
    buf.write_u64::<BigEndian>(reference).unwrap();
}

/// Mixed stream resembling real order flow: mostly adds, then executions
/// and deletions against earlier references.
fn create_feed_buffer(msg_count: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(msg_count * 30);
    for i in 0..msg_count as u64 {
        match i % 4 {
            0 | 1 => add_order_frame(&mut buf, i, 1_500_000 + (i % 100) as u32),
            2 => executed_frame(&mut buf, i - 1),
            _ => delete_frame(&mut buf, i - 2),
        }
    }
    buf
}

fn bench_decode_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_throughput");

    for msg_count in [1_000usize, 10_000, 100_000] {
        let buffer = create_feed_buffer(msg_count);
        group.throughput(Throughput::Bytes(buffer.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(msg_count),
            &buffer,
            |b, buffer| {
                b.iter(|| {
                    let mut count = 0usize;
                    Parser::decode(black_box(buffer), |_| count += 1).unwrap();
                    count
                });
            },
        );
    }
    group.finish();
}

fn bench_decode_all(c: &mut Criterion) {
    let buffer = create_feed_buffer(10_000);
    c.bench_function("decode_all_10k", |b| {
        b.iter(|| Parser::decode_all(black_box(&buffer)).unwrap())
    });
}

fn bench_decode_filtered(c: &mut Criterion) {
    let buffer = create_feed_buffer(10_000);
    let filter = TagFilter::from_tags(b"AF");
    c.bench_function("decode_filtered_adds_10k", |b| {
        b.iter(|| Parser::decode_filtered(black_box(&buffer), filter).unwrap())
    });
}

fn bench_message_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_types");

    let mut add_order = Vec::new();
    add_order_frame(&mut add_order, 42, 1_500_000);

    let mut executed = Vec::new();
    executed_frame(&mut executed, 42);

    let mut deleted = Vec::new();
    delete_frame(&mut deleted, 42);

    group.bench_function("add_order", |b| {
        b.iter(|| Parser::decode(black_box(&add_order), |ev| drop(black_box(ev))))
    });
    group.bench_function("order_executed", |b| {
        b.iter(|| Parser::decode(black_box(&executed), |ev| drop(black_box(ev))))
    });
    group.bench_function("order_delete", |b| {
        b.iter(|| Parser::decode(black_box(&deleted), |ev| drop(black_box(ev))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_decode_throughput,
    bench_decode_all,
    bench_decode_filtered,
    bench_message_types
);
criterion_main!(benches);
