//! Criterion micro-benchmarks for session reset/step and buffer binding.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use delve_bench::{episode_profile, glyph_profile};
use delve_core::Channel;
use delve_obs::register;
use delve_test_utils::fixtures::{full_set, host_region};

/// Benchmark: one step with every channel bound.
fn bench_step_full(c: &mut Criterion) {
    let mut session = episode_profile(u32::MAX).unwrap();
    session.reset().unwrap();

    c.bench_function("step_full_observation", |b| {
        b.iter(|| {
            session.step(black_box(0)).unwrap();
        });
    });
}

/// Benchmark: one step with only the glyph grid bound.
fn bench_step_glyphs(c: &mut Criterion) {
    let mut session = glyph_profile(u32::MAX).unwrap();
    session.reset().unwrap();

    c.bench_function("step_glyphs_only", |b| {
        b.iter(|| {
            session.step(black_box(0)).unwrap();
            black_box(session.observation().glyphs());
        });
    });
}

/// Benchmark: reset followed by a 100-step episode.
fn bench_episode_100(c: &mut Criterion) {
    let mut session = episode_profile(100).unwrap();

    c.bench_function("episode_100_steps", |b| {
        b.iter(|| {
            session.reset().unwrap();
            while !session.done() {
                session.step(0).unwrap();
            }
        });
    });
}

/// Benchmark: validating and binding a full buffer set.
fn bench_bind_full_set(c: &mut Criterion) {
    c.bench_function("bind_full_set", |b| {
        b.iter_batched(
            || (episode_profile(1).unwrap(), full_set()),
            |(mut session, set)| session.set_buffers(set).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark: registering a single glyph region.
fn bench_register_glyphs(c: &mut Criterion) {
    c.bench_function("register_glyphs", |b| {
        b.iter_batched(
            || host_region(Channel::Glyphs),
            |region| black_box(register(Channel::Glyphs, Some(region)).unwrap()),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_step_full,
    bench_step_glyphs,
    bench_episode_100,
    bench_bind_full_set,
    bench_register_glyphs
);
criterion_main!(benches);
