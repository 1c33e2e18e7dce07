//! Criterion micro-benchmarks for glyph classification over a map grid.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use delve_bench::glyph_profile;
use delve_meta::GlyphLayout;

/// Benchmark: classify every cell of a scripted glyph grid.
fn bench_classify_grid(c: &mut Criterion) {
    let mut session = glyph_profile(u32::MAX).unwrap();
    session.reset().unwrap();
    let grid: Vec<i32> = session
        .observation()
        .glyphs()
        .unwrap()
        .iter()
        .map(|&g| i32::from(g))
        .collect();
    let layout = GlyphLayout::NETHACK_3_6;

    c.bench_function("classify_21x79", |b| {
        b.iter(|| {
            let monsters = grid
                .iter()
                .filter(|&&g| layout.is_monster(black_box(g)))
                .count();
            black_box(monsters);
            for &g in &grid {
                black_box(layout.classify(g));
            }
        });
    });
}

/// Benchmark: walk the whole glyph space through every inverse.
fn bench_inverses_full_range(c: &mut Criterion) {
    let layout = GlyphLayout::NETHACK_3_6;

    c.bench_function("inverses_full_range", |b| {
        b.iter(|| {
            let mut acc = 0i64;
            for g in 0..layout.max_glyph {
                acc += i64::from(layout.glyph_to_mon(g))
                    + i64::from(layout.glyph_to_cmap(g))
                    + i64::from(layout.glyph_to_swallow(g));
            }
            black_box(acc)
        });
    });
}

criterion_group!(benches, bench_classify_grid, bench_inverses_full_range);
criterion_main!(benches);
