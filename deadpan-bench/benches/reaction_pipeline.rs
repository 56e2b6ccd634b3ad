//! Deadpan Benchmark Suite
//!
//! Per-turn targets for the synchronous psychology path:
//!   behavior_record_full_window ...... < 10μs
//!   expectation_determine ............ < 2μs
//!   emotion_resolve_and_intensity .... < 1μs
//!   engine_turn_canned_lines ......... < 50μs

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

use deadpan_core::config::BehaviorConfig;
use deadpan_core::emotion::resolve;
use deadpan_core::reaction::intensity;
use deadpan_core::{BehaviorTracker, DrawContext, Expectation, ExpectationEngine};
use deadpan_engine::ReactionEngine;

fn filled_tracker() -> BehaviorTracker {
    let mut tracker = BehaviorTracker::new(BehaviorConfig::default());
    for i in 0..20u32 {
        tracker.record_action((i % 5) as usize, 8, 1.2, 2.0, 2, f64::from(i));
    }
    tracker
}

/// Benchmark: one pick recorded into a full window (target: < 10μs).
fn bench_behavior_record(c: &mut Criterion) {
    let mut tracker = filled_tracker();
    let mut t = 20.0;
    c.bench_function("behavior_record_full_window", |b| {
        b.iter(|| {
            t += 1.0;
            let pattern = tracker.record_action(black_box(3), black_box(8), 1.5, 2.2, 3, t);
            black_box(pattern.doubt_level);
        });
    });
}

/// Benchmark: expectation roll after warm-up (target: < 2μs).
fn bench_expectation(c: &mut Criterion) {
    let tracker = filled_tracker();
    let engine = ExpectationEngine::default();
    let mut rng = StdRng::seed_from_u64(7);
    c.bench_function("expectation_determine", |b| {
        b.iter(|| {
            let e = engine.determine(black_box(tracker.pattern()), black_box(1.2), black_box(9), &mut rng);
            black_box(e);
        });
    });
}

/// Benchmark: emotion matrix plus intensity (target: < 1μs).
fn bench_resolve(c: &mut Criterion) {
    let ctx = DrawContext::new(true, false, true, 3, 5, true);
    c.bench_function("emotion_resolve_and_intensity", |b| {
        b.iter(|| {
            let emotion = resolve(black_box(Expectation::Bait), black_box(&ctx));
            let i = intensity(Expectation::Bait, &ctx, black_box(1.7));
            black_box((emotion, i));
        });
    });
}

/// Benchmark: full player turn through the engine, canned lines only
/// (target: < 50μs).
fn bench_engine_turn(c: &mut Criterion) {
    let Ok(rt) = tokio::runtime::Builder::new_current_thread().enable_time().build() else {
        return;
    };
    let mut engine = ReactionEngine::builder().seed(7).build();
    let ctx = DrawContext::new(true, false, true, 6, 7, true);
    let mut n = 0u32;

    c.bench_function("engine_turn_canned_lines", |b| {
        b.iter(|| {
            n = n.wrapping_add(1);
            engine.record_player_action((n % 7) as usize, 1.1, 1.9, 7, 2);
            engine.determine_expectation();
            let result = rt.block_on(engine.evaluate_reaction(black_box(&ctx)));
            engine.tick(0.5);
            black_box(result);
        });
    });
}

criterion_group!(
    benches,
    bench_behavior_record,
    bench_expectation,
    bench_resolve,
    bench_engine_turn,
);
criterion_main!(benches);
