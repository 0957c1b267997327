/// Benchmarks for TinyVG decoding performance
///
/// Run with: cargo bench
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tinyvg_core::{encode, parse, probe_header};

#[path = "../tests/test_utils.rs"]
mod test_utils;

use test_utils::{SHIELD, TvgBuilder};

/// A document with `count` filled rectangles.
fn rect_document(count: usize) -> Vec<u8> {
    let mut builder = TvgBuilder::new(0, 64, 64, &[[255, 0, 0, 255], [0, 0, 255, 128]]);
    for i in 0..count {
        let offset = (i % 48) as u8;
        builder = builder.fill_rect((i % 2) as u8, offset, offset, 16, 16);
    }
    builder.finish()
}

/// Benchmark header probing
fn benchmark_probe(c: &mut Criterion) {
    c.bench_function("probe_header", |b| {
        b.iter(|| probe_header(black_box(&SHIELD)));
    });
}

/// Benchmark full document decoding
fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.throughput(Throughput::Bytes(SHIELD.len() as u64));
    group.bench_function("shield", |b| b.iter(|| parse(black_box(&SHIELD))));

    for count in [16, 256, 4096] {
        let data = rect_document(count);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rectangles", count), &data, |b, data| {
            b.iter(|| parse(black_box(data)));
        });
    }

    group.finish();
}

/// Benchmark re-encoding a decoded scene
fn benchmark_encode(c: &mut Criterion) {
    let Ok(scene) = parse(&rect_document(256)) else {
        return;
    };
    c.bench_function("encode_rectangles_256", |b| {
        b.iter(|| encode(black_box(&scene)));
    });
}

criterion_group!(benches, benchmark_probe, benchmark_parse, benchmark_encode);
criterion_main!(benches);
