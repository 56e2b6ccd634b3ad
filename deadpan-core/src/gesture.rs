//! Table-talk gesture tracking.
//!
//! Players fidget with their own hand: shuffling, pushing a card forward,
//! wiggling one. The tracker keeps a one-minute window of these gestures and
//! turns it into a short English summary for the text generator.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GestureConfig;
use crate::types::GestureKind;

/// One recorded gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gesture {
    /// What the player did.
    pub kind: GestureKind,
    /// Session clock in seconds.
    pub timestamp: f64,
    /// Index of the card involved, when the gesture targeted one.
    pub card_index: Option<usize>,
}

/// Windowed history of player gestures.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    config: GestureConfig,
    gestures: VecDeque<Gesture>,
}

impl GestureTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            gestures: VecDeque::new(),
        }
    }

    /// Record a gesture at `timestamp` and evict anything older than the window.
    pub fn record(&mut self, kind: GestureKind, card_index: Option<usize>, timestamp: f64) {
        self.gestures.push_back(Gesture {
            kind,
            timestamp,
            card_index,
        });
        while let Some(oldest) = self.gestures.front() {
            if timestamp - oldest.timestamp > self.config.window_secs {
                self.gestures.pop_front();
            } else {
                break;
            }
        }
        debug!(kind = %kind, window = self.gestures.len(), "recorded gesture");
    }

    /// Forget every gesture.
    pub fn clear(&mut self) {
        self.gestures.clear();
    }

    /// Gestures in the window, oldest first.
    pub fn gestures(&self) -> impl Iterator<Item = &Gesture> {
        self.gestures.iter()
    }

    /// Number of gestures in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    /// Whether the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    /// Occurrences of `kind` in the window.
    #[must_use]
    pub fn count(&self, kind: GestureKind) -> usize {
        self.gestures.iter().filter(|g| g.kind == kind).count()
    }

    /// Most frequent kind and its count. Ties go to the earlier kind in
    /// [`GestureKind::ALL`].
    #[must_use]
    pub fn most_frequent(&self) -> Option<(GestureKind, usize)> {
        GestureKind::ALL
            .iter()
            .map(|&k| (k, self.count(k)))
            .filter(|&(_, n)| n > 0)
            .fold(None, |best, cur| match best {
                Some((_, n)) if n >= cur.1 => best,
                _ => Some(cur),
            })
    }

    /// Length of the run of identical kinds ending at the newest gesture.
    #[must_use]
    pub fn trailing_repeat(&self) -> Option<(GestureKind, usize)> {
        let last = self.gestures.back()?;
        let run = self
            .gestures
            .iter()
            .rev()
            .take_while(|g| g.kind == last.kind)
            .count();
        Some((last.kind, run))
    }

    /// Free-text description of recent gestures, for prompts.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.gestures.is_empty() {
            return "No bluff actions yet.".to_string();
        }

        let mut parts = vec![format!(
            "Bluff actions in last minute: {}.",
            self.gestures.len()
        )];

        if let Some((kind, n)) = self.most_frequent() {
            if n >= 3 {
                parts.push(format!("Frequently using {kind} ({n} times)."));
            }
        }
        if let Some((kind, run)) = self.trailing_repeat() {
            if run >= 2 {
                parts.push(format!("Repeated {kind} {run} times consecutively."));
            }
        }

        if self.gestures.len() >= 3 {
            if let (Some(first), Some(last)) = (self.gestures.front(), self.gestures.back()) {
                #[allow(clippy::cast_precision_loss)]
                let avg = (last.timestamp - first.timestamp) / (self.gestures.len() - 1) as f64;
                if avg < 5.0 {
                    parts.push("Actions are very frequent (restless hands).".to_string());
                } else if avg > 20.0 {
                    parts.push("Actions are spaced out (deliberate).".to_string());
                }
            }
        }

        parts.join(" ")
    }
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary() {
        assert_eq!(GestureTracker::default().summary(), "No bluff actions yet.");
    }

    #[test]
    fn single_gesture_summary() {
        let mut t = GestureTracker::default();
        t.record(GestureKind::Push, Some(2), 1.0);
        assert_eq!(t.summary(), "Bluff actions in last minute: 1.");
    }

    #[test]
    fn restless_repeated_shuffles() {
        let mut t = GestureTracker::default();
        for i in 0..4u32 {
            t.record(GestureKind::Shuffle, None, f64::from(i));
        }
        let s = t.summary();
        assert!(s.starts_with("Bluff actions in last minute: 4."));
        assert!(s.contains("Frequently using Shuffle (4 times)."));
        assert!(s.contains("Repeated Shuffle 4 times consecutively."));
        assert!(s.contains("restless hands"));
    }

    #[test]
    fn spaced_out_gestures_are_deliberate() {
        let mut t = GestureTracker::default();
        t.record(GestureKind::Push, None, 0.0);
        t.record(GestureKind::Pull, None, 25.0);
        t.record(GestureKind::Wiggle, None, 50.0);
        let s = t.summary();
        assert!(s.contains("deliberate"));
        assert!(!s.contains("Repeated"));
        assert!(!s.contains("Frequently"));
    }

    #[test]
    fn window_evicts_after_a_minute() {
        let mut t = GestureTracker::default();
        t.record(GestureKind::Spread, None, 0.0);
        t.record(GestureKind::Close, None, 61.0);
        assert_eq!(t.len(), 1);
        assert_eq!(t.count(GestureKind::Spread), 0);
    }

    #[test]
    fn most_frequent_prefers_higher_count() {
        let mut t = GestureTracker::default();
        t.record(GestureKind::Push, None, 0.0);
        t.record(GestureKind::Wiggle, None, 1.0);
        t.record(GestureKind::Wiggle, None, 2.0);
        assert_eq!(t.most_frequent(), Some((GestureKind::Wiggle, 2)));
        assert_eq!(t.trailing_repeat(), Some((GestureKind::Wiggle, 2)));
    }
}
