//! Session summary: a compact narrative of how the game has felt so far.
//!
//! Built from the reaction history, it feeds long-form commentary prompts
//! and end-of-game screens.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::types::{Emotion, EmotionalResult, Expectation, LineSource};

/// Aggregate view over a reaction history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Reactions considered.
    pub reactions: usize,
    /// How many of them were turning points.
    pub turning_points: usize,
    /// Reactions where the AI held a non-neutral read.
    pub reads_taken: usize,
    /// Reactions per emotion.
    pub emotion_counts: HashMap<Emotion, usize>,
    /// Emotion seen most often, ties broken by [`Emotion::ALL`] order.
    pub dominant_emotion: Option<Emotion>,
    /// Highest pressure reached.
    pub peak_pressure: f32,
    /// Lines that came from the text generator.
    pub enriched_lines: usize,
}

impl SessionSummary {
    /// Summarize `history`, oldest first.
    #[must_use]
    pub fn from_history<'a>(
        history: impl IntoIterator<Item = &'a EmotionalResult>,
        peak_pressure: f32,
    ) -> Self {
        let mut summary = Self {
            peak_pressure,
            ..Self::default()
        };
        for r in history {
            summary.reactions += 1;
            if r.is_turning_point {
                summary.turning_points += 1;
            }
            if r.expectation != Expectation::Neutral {
                summary.reads_taken += 1;
            }
            if r.line_source == LineSource::Enriched {
                summary.enriched_lines += 1;
            }
            *summary.emotion_counts.entry(r.emotion).or_insert(0) += 1;
        }
        summary.dominant_emotion = Emotion::ALL
            .iter()
            .filter_map(|e| summary.emotion_counts.get(e).map(|n| (*e, *n)))
            .fold(None, |best: Option<(Emotion, usize)>, cur| match best {
                Some((_, n)) if n >= cur.1 => best,
                _ => Some(cur),
            })
            .map(|(e, _)| e);
        summary
    }

    /// One-paragraph description for prompts. Mentions only moods and
    /// counts of events, never cards.
    #[must_use]
    pub fn narrative(&self) -> String {
        if self.reactions == 0 {
            return "The game has just begun.".to_string();
        }
        let mut out = format!("{} reactions so far", self.reactions);
        if self.turning_points > 0 {
            let _ = write!(out, ", {} of them dramatic", self.turning_points);
        }
        out.push('.');
        if let Some(e) = self.dominant_emotion {
            let _ = write!(out, " You have mostly felt {e}.");
        }
        if self.reads_taken > 0 {
            let _ = write!(out, " You tried to read the opponent {} times.", self.reads_taken);
        }
        let _ = write!(out, " Peak tension: {:.1}.", self.peak_pressure);
        out
    }
}

/// Game phase label from the number of turns played.
#[must_use]
pub fn game_phase(turn_count: u32) -> &'static str {
    match turn_count {
        0..=3 => "Early",
        4..=8 => "Mid",
        _ => "Late",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(emotion: Emotion, expectation: Expectation, turning: bool) -> EmotionalResult {
        EmotionalResult {
            expectation,
            emotion,
            reaction_intensity: 0.5,
            dialogue_line: "...".into(),
            line_source: LineSource::Static,
            pressure_delta: 0.0,
            is_turning_point: turning,
        }
    }

    #[test]
    fn empty_history() {
        let s = SessionSummary::from_history(std::iter::empty(), 0.0);
        assert_eq!(s.reactions, 0);
        assert!(s.dominant_emotion.is_none());
        assert_eq!(s.narrative(), "The game has just begun.");
    }

    #[test]
    fn counts_and_dominant_emotion() {
        let history = vec![
            result(Emotion::Calm, Expectation::Neutral, false),
            result(Emotion::Pleased, Expectation::Stop, true),
            result(Emotion::Pleased, Expectation::Bait, false),
        ];
        let s = SessionSummary::from_history(&history, 1.7);
        assert_eq!(s.reactions, 3);
        assert_eq!(s.turning_points, 1);
        assert_eq!(s.reads_taken, 2);
        assert_eq!(s.dominant_emotion, Some(Emotion::Pleased));
        let text = s.narrative();
        assert!(text.contains("3 reactions so far, 1 of them dramatic."));
        assert!(text.contains("mostly felt pleased"));
        assert!(text.contains("Peak tension: 1.7."));
    }

    #[test]
    fn phases() {
        assert_eq!(game_phase(0), "Early");
        assert_eq!(game_phase(3), "Early");
        assert_eq!(game_phase(8), "Mid");
        assert_eq!(game_phase(9), "Late");
    }
}
