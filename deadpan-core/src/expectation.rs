//! Pre-draw expectation: what the AI braces for.
//!
//! Before each player draw the AI may form a read: hope the player stops on
//! the Joker (`Stop`) or dangle a safe card as bait (`Bait`). Early turns
//! are always neutral. After warm-up the chance of forming a read grows
//! with the number of turns played and with behavioral signals.
//!
//! ```text
//! chance = clamp(base + ramp·bonus + preference + doubt − pressure, min, max)
//! roll < chance  ⇒  weighted pick between Stop and Bait
//! ```

use rand::Rng;
use tracing::debug;

use crate::config::ExpectationConfig;
use crate::types::{BehaviorPattern, Expectation, Tempo};

/// Decides the pre-draw expectation from behavior and pressure.
#[derive(Debug, Clone)]
pub struct ExpectationEngine {
    config: ExpectationConfig,
}

impl ExpectationEngine {
    /// Create an engine with the given tuning.
    #[must_use]
    pub fn new(config: ExpectationConfig) -> Self {
        Self { config }
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &ExpectationConfig {
        &self.config
    }

    /// Probability of forming a non-neutral read on `turn_count`.
    ///
    /// Zero during warm-up.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn chance(&self, pattern: &BehaviorPattern, pressure: f32, turn_count: u32) -> f32 {
        let c = &self.config;
        if turn_count <= c.warmup_turns {
            return 0.0;
        }
        let ramp = ((turn_count - c.warmup_turns) as f32 / c.progression_turns.max(1) as f32)
            .clamp(0.0, 1.0);
        let mut chance = c.base_chance + ramp * c.progression_bonus;
        if pattern.has_position_preference() {
            chance += 0.1;
        }
        if pattern.doubt_level > 0.5 {
            chance += 0.1;
        }
        if pressure > 2.0 {
            chance -= 0.1;
        }
        chance.clamp(c.min_chance, c.max_chance)
    }

    /// Decide the expectation for `turn_count`.
    pub fn determine<R: Rng + ?Sized>(
        &self,
        pattern: &BehaviorPattern,
        pressure: f32,
        turn_count: u32,
        rng: &mut R,
    ) -> Expectation {
        if turn_count <= self.config.warmup_turns {
            debug!(turn_count, "warm-up turn, expectation stays neutral");
            return Expectation::Neutral;
        }
        let chance = self.chance(pattern, pressure, turn_count);
        let roll: f32 = rng.r#gen();
        let expectation = if roll < chance {
            select_kind(pattern, pressure, rng)
        } else {
            Expectation::Neutral
        };
        debug!(turn_count, chance, roll, %expectation, "expectation determined");
        expectation
    }
}

impl Default for ExpectationEngine {
    fn default() -> Self {
        Self::new(ExpectationConfig::default())
    }
}

/// Relative weights of `(Stop, Bait)` for the current read.
#[must_use]
pub fn kind_weights(pattern: &BehaviorPattern, pressure: f32) -> (f32, f32) {
    let mut stop = 1.0;
    if pattern.doubt_level > 0.5 {
        stop += 2.0;
    }
    if pressure > 1.5 {
        stop += 1.0;
    }
    let mut bait = 1.0;
    if pattern.tempo == Tempo::Fast {
        bait += 2.0;
    }
    if pattern.has_position_preference() {
        bait += 1.0;
    }
    (stop, bait)
}

fn select_kind<R: Rng + ?Sized>(pattern: &BehaviorPattern, pressure: f32, rng: &mut R) -> Expectation {
    let (stop, bait) = kind_weights(pattern, pressure);
    let roll: f32 = rng.r#gen::<f32>() * (stop + bait);
    if roll < stop {
        Expectation::Stop
    } else {
        Expectation::Bait
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn warmup_turns_are_always_neutral() {
        let engine = ExpectationEngine::default();
        let pattern = BehaviorPattern {
            doubt_level: 1.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        for turn in 0..=2 {
            for _ in 0..50 {
                assert_eq!(engine.determine(&pattern, 0.0, turn, &mut rng), Expectation::Neutral);
            }
        }
    }

    #[test]
    fn chance_ramps_with_turns() {
        let engine = ExpectationEngine::default();
        let p = BehaviorPattern::default();
        assert!((engine.chance(&p, 0.0, 3) - 0.32).abs() < 1e-5);
        assert!((engine.chance(&p, 0.0, 12) - 0.5).abs() < 1e-5);
        assert!((engine.chance(&p, 0.0, 50) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn chance_is_clamped() {
        let engine = ExpectationEngine::default();
        let hot = BehaviorPattern {
            doubt_level: 0.9,
            preferred_position: Some(Position::Left),
            ..Default::default()
        };
        assert!((engine.chance(&hot, 0.0, 40) - 0.7).abs() < 1e-5);

        let config = ExpectationConfig {
            base_chance: 0.0,
            progression_bonus: 0.0,
            ..Default::default()
        };
        let cold = ExpectationEngine::new(config);
        assert!((cold.chance(&BehaviorPattern::default(), 2.5, 5) - 0.05).abs() < 1e-5);
    }

    #[test]
    fn high_pressure_lowers_chance() {
        let engine = ExpectationEngine::default();
        let p = BehaviorPattern::default();
        assert!(engine.chance(&p, 2.5, 12) < engine.chance(&p, 0.0, 12));
    }

    #[test]
    fn weights_follow_signals() {
        let doubtful = BehaviorPattern {
            doubt_level: 0.8,
            ..Default::default()
        };
        assert_eq!(kind_weights(&doubtful, 2.0), (4.0, 1.0));

        let hasty = BehaviorPattern {
            tempo: Tempo::Fast,
            preferred_position: Some(Position::Right),
            ..Default::default()
        };
        assert_eq!(kind_weights(&hasty, 0.0), (1.0, 4.0));
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let engine = ExpectationEngine::default();
        let p = BehaviorPattern::default();
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (3..30).map(|t| engine.determine(&p, 0.5, t, &mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn late_game_produces_non_neutral_reads() {
        let engine = ExpectationEngine::default();
        let p = BehaviorPattern {
            doubt_level: 0.8,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        let reads = (0..200)
            .map(|_| engine.determine(&p, 0.0, 20, &mut rng))
            .filter(|e| *e != Expectation::Neutral)
            .count();
        // Chance is 0.6, so roughly 120 of 200.
        assert!(reads > 80 && reads < 160, "got {reads}");
    }
}
