//! Property-Based Tests for Deadpan Core
//!
//! Uses `proptest` to check tracker and resolver invariants under random
//! input sequences: bounded windows, clamped scores, total matrices and
//! seed-reproducible expectations.

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use deadpan_core::behavior::BehaviorTracker;
use deadpan_core::config::{BehaviorConfig, PressureConfig};
use deadpan_core::emotion;
use deadpan_core::expectation::ExpectationEngine;
use deadpan_core::gesture::GestureTracker;
use deadpan_core::pressure::PressureTracker;
use deadpan_core::reaction;
use deadpan_core::types::{
    BehaviorPattern, DrawContext, Emotion, Expectation, GestureKind, Position, Tempo,
};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// `(raw_position, total_cards, hover, decision, hover_count, gap_secs)`
fn arb_pick() -> impl Strategy<Value = (usize, usize, f32, f32, u32, f64)> {
    (
        0usize..20,
        0usize..15,
        0.0f32..8.0,
        0.0f32..15.0,
        0u32..10,
        0.0f64..20.0,
    )
}

fn arb_expectation() -> impl Strategy<Value = Expectation> {
    prop_oneof![
        Just(Expectation::Neutral),
        Just(Expectation::Stop),
        Just(Expectation::Bait),
    ]
}

fn arb_emotion() -> impl Strategy<Value = Emotion> {
    (0usize..6).prop_map(|i| Emotion::ALL[i])
}

fn arb_ctx() -> impl Strategy<Value = DrawContext> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        0u32..15,
        0u32..15,
        any::<bool>(),
    )
        .prop_map(|(p, j, pair, r, o, aj)| DrawContext::new(p, j, pair, r, o, aj).with_legacy_outcome_flags())
}

fn arb_pattern() -> impl Strategy<Value = BehaviorPattern> {
    (
        0.0f32..=1.0,
        prop_oneof![
            Just(Tempo::Fast),
            Just(Tempo::Normal),
            Just(Tempo::Slow),
            Just(Tempo::Erratic)
        ],
        0.0f32..6.0,
        0u32..10,
        prop::option::of(prop_oneof![
            Just(Position::Left),
            Just(Position::Center),
            Just(Position::Right)
        ]),
    )
        .prop_map(|(doubt, tempo, hover, streak, pref)| BehaviorPattern {
            doubt_level: doubt,
            tempo,
            avg_hover_time: hover,
            avg_decision_time: hover,
            streak_same_position: streak,
            preferred_position: pref,
            position_counts: [0; 3],
        })
}

// ---------------------------------------------------------------------------
// Property: the behavior window is bounded and the pattern stays in range
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn behavior_window_is_bounded(picks in prop::collection::vec(arb_pick(), 1..60)) {
        let config = BehaviorConfig::default();
        let mut tracker = BehaviorTracker::new(config.clone());
        let mut now = 0.0f64;
        for (raw, total, hover, decision, count, gap) in picks {
            now += gap;
            tracker.record_action(raw, total, hover, decision, count, now);

            prop_assert!(tracker.len() <= config.max_history);
            for a in tracker.actions() {
                prop_assert!(now - a.timestamp <= config.window_secs);
            }

            let p = tracker.pattern();
            prop_assert!((0.0..=1.0).contains(&p.doubt_level));
            prop_assert!(p.avg_hover_time >= 0.0);
            let counted: u32 = p.position_counts.iter().sum();
            prop_assert_eq!(counted as usize, tracker.len());
            prop_assert!(p.streak_same_position as usize <= tracker.len());
            if let Some(pos) = p.preferred_position {
                prop_assert!(p.position_counts[pos.index()] as usize * 2 > tracker.len());
            }
        }
    }

    #[test]
    fn cleared_tracker_matches_fresh(picks in prop::collection::vec(arb_pick(), 1..20)) {
        let mut tracker = BehaviorTracker::default();
        let mut now = 0.0;
        for (raw, total, hover, decision, count, gap) in picks {
            now += gap;
            tracker.record_action(raw, total, hover, decision, count, now);
        }
        tracker.clear_history();
        let fresh = BehaviorTracker::default();
        prop_assert_eq!(tracker.pattern(), fresh.pattern());
    }

    #[test]
    fn gesture_window_is_bounded(gaps in prop::collection::vec((0usize..6, 0.0f64..30.0), 1..40)) {
        let mut tracker = GestureTracker::default();
        let mut now = 0.0;
        for (kind, gap) in gaps {
            now += gap;
            tracker.record(GestureKind::ALL[kind], None, now);
            for g in tracker.gestures() {
                prop_assert!(now - g.timestamp <= 60.0);
            }
            prop_assert!(tracker.summary().starts_with("Bluff actions in last minute:"));
        }
    }
}

// ---------------------------------------------------------------------------
// Property: pressure never leaves its bounds
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn pressure_stays_in_bounds(
        steps in prop::collection::vec((arb_emotion(), any::<bool>(), any::<bool>(), 0.0f64..10.0, arb_pattern()), 1..80)
    ) {
        let config = PressureConfig::default();
        let mut pressure = PressureTracker::new(config.clone());
        for (emotion, player, joker, dt, pattern) in steps {
            pressure.apply_reaction(emotion, player, joker);
            prop_assert!(pressure.level() >= config.base_pressure && pressure.level() <= config.max_pressure);
            pressure.observe_behavior(&pattern);
            prop_assert!(pressure.level() <= config.max_pressure);
            let before = pressure.level();
            pressure.tick(dt);
            prop_assert!(pressure.level() <= before);
            prop_assert!(pressure.level() >= config.base_pressure);
        }
    }
}

// ---------------------------------------------------------------------------
// Property: the emotion matrix and the pure reaction rules are total
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn ai_turn_emotion_ignores_expectation(exp in arb_expectation(), ctx in arb_ctx()) {
        let mut ai = ctx;
        ai.is_player_turn = false;
        prop_assert_eq!(
            emotion::resolve(exp, &ai),
            emotion::resolve(Expectation::Neutral, &ai)
        );
    }

    #[test]
    fn player_turn_never_anticipating(exp in arb_expectation(), ctx in arb_ctx()) {
        prop_assert_ne!(emotion::resolve(exp, &ctx), Emotion::Anticipating);
    }

    #[test]
    fn intensity_in_unit_range(exp in arb_expectation(), ctx in arb_ctx(), pressure in 0.0f32..3.0) {
        let v = reaction::intensity(exp, &ctx, pressure);
        prop_assert!((0.0..=1.0).contains(&v));
    }

    #[test]
    fn joker_draws_are_turning_points(ctx in arb_ctx()) {
        if ctx.drawn_card_is_joker {
            prop_assert!(reaction::is_turning_point(&ctx));
        }
    }
}

// ---------------------------------------------------------------------------
// Property: expectations are reproducible and neutral during warm-up
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn same_seed_same_expectations(seed in any::<u64>(), pattern in arb_pattern(), pressure in 0.0f32..3.0) {
        let engine = ExpectationEngine::default();
        let run = || {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..25).map(|t| engine.determine(&pattern, pressure, t, &mut rng)).collect::<Vec<_>>()
        };
        let a = run();
        prop_assert_eq!(&a, &run());
        prop_assert!(a[..=2].iter().all(|e| *e == Expectation::Neutral));
    }

    #[test]
    fn chance_within_configured_clamp(pattern in arb_pattern(), pressure in 0.0f32..3.0, turn in 3u32..100) {
        let engine = ExpectationEngine::default();
        let c = engine.chance(&pattern, pressure, turn);
        prop_assert!((0.05 - 1e-6..=0.7 + 1e-6).contains(&c));
    }
}
