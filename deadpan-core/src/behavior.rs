//! Player behavior tracking: reading the human across the table.
//!
//! The tracker keeps a short, time-bounded window of card picks and derives
//! a [`BehaviorPattern`] from it after every pick:
//!
//! - **Hover averages**: only hovers longer than a threshold count
//! - **Position habits**: per-bucket counts, current streak, dominant side
//! - **Tempo**: mean and spread of the intervals between picks
//! - **Doubt**: a clamped sum of hesitation signals
//!
//! Nothing here knows what the cards are.

use std::collections::VecDeque;
use std::fmt::Write as _;

use tracing::debug;

use crate::config::BehaviorConfig;
use crate::types::{BehaviorPattern, PlayerAction, Position, Tempo};

/// Sliding-window classifier over the player's recent picks.
#[derive(Debug, Clone)]
pub struct BehaviorTracker {
    config: BehaviorConfig,
    actions: VecDeque<PlayerAction>,
    pattern: BehaviorPattern,
}

impl BehaviorTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new(config: BehaviorConfig) -> Self {
        let capacity = config.max_history + 1;
        Self {
            config,
            actions: VecDeque::with_capacity(capacity),
            pattern: BehaviorPattern::default(),
        }
    }

    /// Record a pick and recompute the pattern.
    ///
    /// `raw_position` is the index of the picked card within a hand of
    /// `total_cards`; it is bucketed before storage. `timestamp` is the
    /// session clock in seconds and must not go backwards.
    pub fn record_action(
        &mut self,
        raw_position: usize,
        total_cards: usize,
        hover_duration: f32,
        decision_time: f32,
        hover_count: u32,
        timestamp: f64,
    ) -> &BehaviorPattern {
        let action = PlayerAction {
            position: Position::from_raw(raw_position, total_cards),
            hover_duration: hover_duration.max(0.0),
            decision_time: decision_time.max(0.0),
            hover_count,
            timestamp,
        };
        self.actions.push_back(action);
        self.evict(timestamp);
        self.pattern = analyze(&self.actions, self.config.min_valid_hover_secs);

        debug!(
            position = %action.position,
            hover = action.hover_duration,
            decision = action.decision_time,
            window = self.actions.len(),
            doubt = self.pattern.doubt_level,
            tempo = %self.pattern.tempo,
            streak = self.pattern.streak_same_position,
            "recorded player action"
        );
        &self.pattern
    }

    /// Drop every recorded action and reset the pattern.
    pub fn clear_history(&mut self) {
        self.actions.clear();
        self.pattern = BehaviorPattern::default();
        debug!("behavior history cleared");
    }

    /// Current pattern snapshot.
    #[must_use]
    pub fn pattern(&self) -> &BehaviorPattern {
        &self.pattern
    }

    /// Actions currently inside the window, oldest first.
    pub fn actions(&self) -> impl Iterator<Item = &PlayerAction> {
        self.actions.iter()
    }

    /// Number of actions inside the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Multi-line human-readable summary for debug overlays and logs.
    #[must_use]
    pub fn statistics(&self) -> String {
        if self.actions.is_empty() {
            return "No behavior data yet".to_string();
        }
        let p = &self.pattern;
        let mut out = String::new();
        let _ = writeln!(out, "Recorded Actions: {}", self.actions.len());
        let _ = writeln!(out, "Doubt Level: {:.2}", p.doubt_level);
        let _ = writeln!(out, "Tempo: {}", p.tempo);
        let _ = writeln!(out, "Avg Hover: {:.2}s", p.avg_hover_time);
        let _ = writeln!(out, "Avg Decision: {:.2}s", p.avg_decision_time);
        let _ = writeln!(out, "Streak Same Position: {}", p.streak_same_position);
        if let Some(pos) = p.preferred_position {
            let _ = writeln!(out, "Preferred Position: {pos}");
        }
        out
    }

    fn evict(&mut self, now: f64) {
        while let Some(oldest) = self.actions.front() {
            let expired = now - oldest.timestamp > self.config.window_secs;
            if expired || self.actions.len() > self.config.max_history {
                self.actions.pop_front();
            } else {
                break;
            }
        }
    }
}

impl Default for BehaviorTracker {
    fn default() -> Self {
        Self::new(BehaviorConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Derive a fresh pattern from a window of actions.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn analyze(actions: &VecDeque<PlayerAction>, min_valid_hover: f32) -> BehaviorPattern {
    let mut pattern = BehaviorPattern::default();
    if actions.is_empty() {
        return pattern;
    }

    // Hover and decision averages.
    let (hover_sum, decision_sum, valid) = actions
        .iter()
        .filter(|a| a.hover_duration > min_valid_hover)
        .fold((0.0f32, 0.0f32, 0u32), |(h, d, n), a| {
            (h + a.hover_duration, d + a.decision_time, n + 1)
        });
    if valid > 0 {
        pattern.avg_hover_time = hover_sum / valid as f32;
        pattern.avg_decision_time = decision_sum / valid as f32;
    }

    for action in actions {
        pattern.position_counts[action.position.index()] += 1;
    }

    if actions.len() >= 2 {
        pattern.streak_same_position = streak(actions);
        pattern.preferred_position = preference(&pattern.position_counts, actions.len());
        pattern.tempo = tempo(actions);
    }

    pattern.doubt_level = doubt(&pattern, actions);
    pattern
}

/// Consecutive picks, counting back from the newest, that share its bucket.
fn streak(actions: &VecDeque<PlayerAction>) -> u32 {
    let Some(last) = actions.back() else {
        return 0;
    };
    let run = actions
        .iter()
        .rev()
        .take_while(|a| a.position == last.position)
        .count();
    u32::try_from(run).unwrap_or(u32::MAX)
}

/// A bucket counts as preferred when it holds strictly more than half the window.
fn preference(counts: &[u32; 3], len: usize) -> Option<Position> {
    let (idx, max) = counts
        .iter()
        .enumerate()
        .fold((0, 0), |best, (i, &c)| if c > best.1 { (i, c) } else { best });
    (max as usize > len / 2).then(|| Position::ALL[idx])
}

fn tempo(actions: &VecDeque<PlayerAction>) -> Tempo {
    let intervals: Vec<f64> = actions
        .iter()
        .zip(actions.iter().skip(1))
        .map(|(a, b)| b.timestamp - a.timestamp)
        .collect();
    if intervals.is_empty() {
        return Tempo::Normal;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = intervals.len() as f64;
    let mean = intervals.iter().sum::<f64>() / n;
    let variance = intervals.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if std_dev > mean * 0.5 {
        Tempo::Erratic
    } else if mean < 2.0 {
        Tempo::Fast
    } else if mean > 8.0 {
        Tempo::Slow
    } else {
        Tempo::Normal
    }
}

#[allow(clippy::cast_precision_loss)]
fn doubt(pattern: &BehaviorPattern, actions: &VecDeque<PlayerAction>) -> f32 {
    let mut doubt = 0.0f32;

    if pattern.avg_hover_time > 3.0 {
        doubt += 0.4;
    } else if pattern.avg_hover_time > 2.0 {
        doubt += 0.2;
    }

    let max = pattern.position_counts.iter().copied().max().unwrap_or(0);
    let min = pattern.position_counts.iter().copied().min().unwrap_or(0);
    if max - min > 3 {
        doubt += 0.3;
    }

    if pattern.tempo == Tempo::Erratic {
        doubt += 0.3;
    }

    let total_hovers: u64 = actions.iter().map(|a| u64::from(a.hover_count)).sum();
    let avg_hover_count = total_hovers as f64 / actions.len() as f64;
    if avg_hover_count > 3.0 {
        doubt += 0.2;
    }

    doubt.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> BehaviorTracker {
        BehaviorTracker::default()
    }

    #[test]
    fn empty_tracker_has_zero_pattern() {
        let t = tracker();
        assert!(t.is_empty());
        assert_eq!(*t.pattern(), BehaviorPattern::default());
        assert_eq!(t.statistics(), "No behavior data yet");
    }

    #[test]
    fn single_action_keeps_defaults_for_multi_action_stats() {
        let mut t = tracker();
        let p = t.record_action(0, 6, 1.0, 1.5, 1, 0.0).clone();
        assert_eq!(p.streak_same_position, 0);
        assert_eq!(p.tempo, Tempo::Normal);
        assert!(p.preferred_position.is_none());
        assert!((p.avg_hover_time - 1.0).abs() < 1e-6);
        assert_eq!(p.position_counts, [1, 0, 0]);
    }

    #[test]
    fn window_evicts_old_actions() {
        let mut t = tracker();
        t.record_action(0, 6, 1.0, 1.0, 1, 0.0);
        t.record_action(0, 6, 1.0, 1.0, 1, 10.0);
        t.record_action(0, 6, 1.0, 1.0, 1, 35.0);
        // The action at t=0 is 35s old and falls out of the 30s window.
        assert_eq!(t.len(), 2);
        assert!(t.actions().all(|a| 35.0 - a.timestamp <= 30.0));
    }

    #[test]
    fn max_history_caps_window() {
        let mut t = tracker();
        t.record_action(5, 6, 1.0, 1.0, 1, 0.0);
        for i in 1..20u32 {
            t.record_action(0, 6, 1.0, 1.0, 1, f64::from(i) * 0.5);
        }
        assert_eq!(t.len(), 20);
        assert_eq!(t.pattern().position_counts[Position::Right.index()], 1);

        // The 21st pick pushes the only right-side pick out.
        t.record_action(0, 6, 1.0, 1.0, 1, 10.0);
        assert_eq!(t.len(), 20);
        assert_eq!(t.pattern().position_counts[Position::Right.index()], 0);
        assert_eq!(t.pattern().position_counts[Position::Left.index()], 20);
    }

    #[test]
    fn four_same_position_picks_produce_streak_and_preference() {
        let mut t = tracker();
        for i in 0..4u32 {
            t.record_action(0, 6, 1.0, 1.0, 1, f64::from(i) * 3.0);
        }
        let p = t.pattern();
        assert_eq!(p.streak_same_position, 4);
        assert_eq!(p.preferred_position, Some(Position::Left));
        assert!(p.has_position_preference());
    }

    #[test]
    fn even_split_has_no_preference() {
        let mut t = tracker();
        t.record_action(0, 6, 1.0, 1.0, 1, 0.0);
        t.record_action(5, 6, 1.0, 1.0, 1, 3.0);
        let p = t.pattern();
        // One of two is not strictly more than half.
        assert!(p.preferred_position.is_none());
        assert_eq!(p.streak_same_position, 1);
    }

    #[test]
    fn quick_regular_picks_are_fast() {
        let mut t = tracker();
        for i in 0..5u32 {
            t.record_action(2, 6, 0.5, 0.8, 1, f64::from(i));
        }
        assert_eq!(t.pattern().tempo, Tempo::Fast);
    }

    #[test]
    fn slow_regular_picks_are_slow() {
        let mut t = tracker();
        for i in 0..3u32 {
            t.record_action(2, 6, 0.5, 0.8, 1, f64::from(i) * 10.0);
        }
        assert_eq!(t.pattern().tempo, Tempo::Slow);
    }

    #[test]
    fn uneven_intervals_are_erratic_and_raise_doubt() {
        let mut t = tracker();
        t.record_action(0, 6, 0.5, 0.5, 1, 0.0);
        t.record_action(2, 6, 0.5, 0.5, 1, 0.5);
        t.record_action(4, 6, 0.5, 0.5, 1, 10.0);
        let p = t.pattern();
        assert_eq!(p.tempo, Tempo::Erratic);
        assert!((p.doubt_level - 0.3).abs() < 1e-6);
    }

    #[test]
    fn long_hovers_and_many_hovers_raise_doubt() {
        let mut t = tracker();
        t.record_action(2, 6, 3.5, 4.0, 5, 0.0);
        let p = t.pattern();
        // +0.4 for hover > 3s, +0.2 for hover count > 3.
        assert!((p.doubt_level - 0.6).abs() < 1e-6);
    }

    #[test]
    fn short_hovers_are_excluded_from_averages() {
        let mut t = tracker();
        t.record_action(2, 6, 0.05, 9.0, 0, 0.0);
        t.record_action(2, 6, 2.0, 3.0, 1, 3.0);
        let p = t.pattern();
        assert!((p.avg_hover_time - 2.0).abs() < 1e-6);
        assert!((p.avg_decision_time - 3.0).abs() < 1e-6);
    }

    #[test]
    fn doubt_is_clamped_to_one() {
        let mut t = tracker();
        let times = [0.0, 0.2, 9.0, 9.1, 20.0];
        for ts in times {
            t.record_action(0, 6, 5.0, 6.0, 8, ts);
        }
        let p = t.pattern();
        assert!(p.doubt_level <= 1.0);
        assert!((p.doubt_level - 1.0).abs() < 1e-6);
    }

    #[test]
    fn clear_history_resets_everything() {
        let mut t = tracker();
        for i in 0..4u32 {
            t.record_action(0, 6, 3.0, 3.0, 4, f64::from(i));
        }
        t.clear_history();
        assert!(t.is_empty());
        assert_eq!(*t.pattern(), BehaviorPattern::default());
    }

    #[test]
    fn statistics_mentions_preference() {
        let mut t = tracker();
        for i in 0..3u32 {
            t.record_action(5, 6, 1.0, 1.0, 1, f64::from(i) * 3.0);
        }
        let stats = t.statistics();
        assert!(stats.contains("Recorded Actions: 3"));
        assert!(stats.contains("Preferred Position: right"));
    }
}
