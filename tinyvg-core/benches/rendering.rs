/// Benchmarks for the SVG and bitmap renderers
///
/// Run with: cargo bench
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tinyvg_core::{AntiAlias, Scene, parse, render_bitmap, render_svg, render_tvgt};

#[path = "../tests/test_utils.rs"]
mod test_utils;

fn shield() -> Option<Scene> {
    parse(&test_utils::SHIELD).ok()
}

/// Benchmark SVG and text output
fn benchmark_text(c: &mut Criterion) {
    let Some(scene) = shield() else {
        return;
    };
    c.bench_function("render_svg_shield", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(4096);
            render_svg(black_box(&scene), &mut out).map(|_| out.len())
        });
    });
    c.bench_function("render_tvgt_shield", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(4096);
            render_tvgt(black_box(&scene), &mut out).map(|_| out.len())
        });
    });
}

/// Benchmark rasterization across anti-alias levels
fn benchmark_bitmap(c: &mut Criterion) {
    let Some(scene) = shield() else {
        return;
    };
    let mut group = c.benchmark_group("render_bitmap");

    for level in [AntiAlias::None, AntiAlias::X9, AntiAlias::X64] {
        group.bench_with_input(
            BenchmarkId::new("shield_96", format!("{:?}", level)),
            &level,
            |b, &level| {
                b.iter(|| render_bitmap(black_box(&scene), level, 96, 96));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_text, benchmark_bitmap);
criterion_main!(benches);
