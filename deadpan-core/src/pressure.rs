//! Psychological pressure: a bounded, decaying tension scalar.
//!
//! Pressure rises when the AI's reads pay off or the player shows
//! hesitation, falls when the AI is let down, and bleeds away linearly
//! with session time. It is always kept inside `[base, max]`.

use tracing::debug;

use crate::config::PressureConfig;
use crate::types::{BehaviorPattern, Emotion, Tempo};

/// Flat decrement applied on every reaction.
const REACTION_DRAIN: f32 = 0.05;

/// Tracks the current pressure level.
#[derive(Debug, Clone)]
pub struct PressureTracker {
    config: PressureConfig,
    level: f32,
    peak: f32,
}

impl PressureTracker {
    /// Start at the base level.
    #[must_use]
    pub fn new(config: PressureConfig) -> Self {
        let level = config.base_pressure;
        Self {
            config,
            level,
            peak: level,
        }
    }

    /// Current level.
    #[must_use]
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Highest level reached since the last reset.
    #[must_use]
    pub fn peak(&self) -> f32 {
        self.peak
    }

    /// Upper bound.
    #[must_use]
    pub fn max(&self) -> f32 {
        self.config.max_pressure
    }

    /// Advance time by `dt` seconds.
    #[allow(clippy::cast_possible_truncation)]
    pub fn tick(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        let decay = self.config.decay_rate * dt as f32;
        self.level = (self.level - decay).max(self.config.base_pressure);
    }

    /// Apply the pressure change caused by a reaction. Returns the signed
    /// change actually applied after clamping.
    pub fn apply_reaction(&mut self, emotion: Emotion, is_player_turn: bool, drawn_joker: bool) -> f32 {
        let delta = reaction_delta(emotion, is_player_turn, drawn_joker);
        let before = self.level;
        self.set_clamped(before + delta);
        let applied = self.level - before;
        debug!(%emotion, delta, applied, level = self.level, "pressure updated by reaction");
        applied
    }

    /// Raise pressure from visible hesitation. Returns the increase applied.
    #[allow(clippy::cast_precision_loss)]
    pub fn observe_behavior(&mut self, pattern: &BehaviorPattern) -> f32 {
        let mut increase = 0.0f32;
        if pattern.streak_same_position >= 2 {
            increase += 0.5 * pattern.streak_same_position as f32;
        }
        if pattern.avg_hover_time > 2.0 {
            increase += 0.3;
        }
        if pattern.doubt_level > 0.7 {
            increase += 0.4;
        }
        if pattern.tempo == Tempo::Erratic {
            increase += 0.2;
        }
        if increase <= 0.0 {
            return 0.0;
        }
        let before = self.level;
        self.set_clamped(before + increase);
        let applied = self.level - before;
        debug!(increase, applied, level = self.level, "pressure raised by behavior");
        applied
    }

    /// Force a level, clamped into bounds.
    pub fn set(&mut self, level: f32) {
        self.set_clamped(level);
    }

    /// Back to base; peak is forgotten.
    pub fn reset(&mut self) {
        self.level = self.config.base_pressure;
        self.peak = self.level;
    }

    fn set_clamped(&mut self, level: f32) {
        let level = if level.is_finite() { level } else { self.config.base_pressure };
        self.level = level.clamp(self.config.base_pressure, self.config.max_pressure);
        self.peak = self.peak.max(self.level);
    }
}

impl Default for PressureTracker {
    fn default() -> Self {
        Self::new(PressureConfig::default())
    }
}

/// Unclamped pressure change for a reaction.
#[must_use]
pub fn reaction_delta(emotion: Emotion, is_player_turn: bool, drawn_joker: bool) -> f32 {
    let mut delta = match emotion {
        Emotion::Pleased | Emotion::Hurt => 0.3,
        Emotion::Frustrated if is_player_turn => -0.1,
        Emotion::Frustrated => -0.4,
        Emotion::Relieved => -0.3,
        Emotion::Calm => -0.1,
        Emotion::Anticipating => 0.0,
    };
    if drawn_joker {
        delta += if is_player_turn { 0.2 } else { -0.2 };
    }
    delta - REACTION_DRAIN
}
