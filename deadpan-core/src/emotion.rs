//! Emotion resolution: the payoff matrix.
//!
//! After a draw the AI's emotion is a pure function of the expectation it
//! held and what happened:
//!
//! ```text
//!                 │ Joker drawn │ Pair formed │ Normal card
//! ────────────────┼─────────────┼─────────────┼────────────
//! player, Stop    │ Pleased     │ Frustrated  │ Frustrated
//! player, Bait    │ Hurt        │ Frustrated  │ Pleased
//! player, Neutral │ Relieved    │ Calm        │ Calm
//! AI draws        │ Frustrated  │ Pleased     │ Calm
//! ```
//!
//! [`EmotionLog`] keeps the current emotion plus a few recent transitions so
//! prompts can describe how the mood has been moving.

use std::collections::VecDeque;
use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::types::{DrawContext, Emotion, Expectation};

/// Transitions remembered by [`EmotionLog`].
pub const TRANSITION_HISTORY: usize = 5;

/// Transitions shown by [`EmotionLog::context_summary`].
const SUMMARY_TRANSITIONS: usize = 3;

/// Apply the payoff matrix.
#[must_use]
pub fn resolve(expectation: Expectation, ctx: &DrawContext) -> Emotion {
    if !ctx.is_player_turn {
        return if ctx.drawn_card_is_joker {
            Emotion::Frustrated
        } else if ctx.formed_pair {
            Emotion::Pleased
        } else {
            Emotion::Calm
        };
    }

    match expectation {
        Expectation::Stop if ctx.drawn_card_is_joker => Emotion::Pleased,
        Expectation::Stop => Emotion::Frustrated,
        Expectation::Bait if ctx.drawn_card_is_joker => Emotion::Hurt,
        Expectation::Bait if ctx.formed_pair => Emotion::Frustrated,
        Expectation::Bait => Emotion::Pleased,
        Expectation::Neutral if ctx.drawn_card_is_joker => Emotion::Relieved,
        Expectation::Neutral => Emotion::Calm,
    }
}

/// Localization key describing *why* the AI feels `emotion`, in abstract terms.
#[must_use]
pub fn trigger_key(emotion: Emotion, expectation: Expectation) -> &'static str {
    match (emotion, expectation) {
        (Emotion::Pleased, Expectation::Stop) => "trigger.pleased_stop",
        (Emotion::Pleased, Expectation::Bait) => "trigger.pleased_bait",
        (Emotion::Pleased, Expectation::Neutral) => "trigger.pleased_default",
        (Emotion::Frustrated, Expectation::Stop) => "trigger.frustrated_stop",
        (Emotion::Frustrated, Expectation::Bait) => "trigger.frustrated_bait",
        (Emotion::Frustrated, Expectation::Neutral) => "trigger.frustrated_default",
        (Emotion::Hurt, _) => "trigger.hurt_default",
        (Emotion::Relieved, _) => "trigger.relieved_default",
        (Emotion::Anticipating, _) => "trigger.anticipating_default",
        (Emotion::Calm, _) => "trigger.calm_default",
    }
}

// ---------------------------------------------------------------------------
// Transition log
// ---------------------------------------------------------------------------

/// What moved the emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmotionTrigger {
    /// Expectation was set at the start of a player turn.
    TurnStart,
    /// The player drew a non-Joker card without pairing.
    PlayerDraw,
    /// The player drew the Joker.
    PlayerDrawJoker,
    /// The AI drew a non-Joker card without pairing.
    AiDraw,
    /// The AI drew the Joker.
    AiDrawJoker,
    /// A pair was formed and discarded.
    PairMatched,
    /// Reset back to calm.
    Reset,
}

impl EmotionTrigger {
    /// Classify a draw.
    #[must_use]
    pub fn from_draw(ctx: &DrawContext) -> Self {
        match (ctx.is_player_turn, ctx.drawn_card_is_joker, ctx.formed_pair) {
            (true, true, _) => Self::PlayerDrawJoker,
            (false, true, _) => Self::AiDrawJoker,
            (_, false, true) => Self::PairMatched,
            (true, false, false) => Self::PlayerDraw,
            (false, false, false) => Self::AiDraw,
        }
    }
}

/// Prompt-safe wording. Never names a card.
impl fmt::Display for EmotionTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TurnStart => "turn start",
            Self::PlayerDraw => "player's draw",
            Self::PlayerDrawJoker => "player's draw backfired",
            Self::AiDraw => "own draw",
            Self::AiDrawJoker => "own draw backfired",
            Self::PairMatched => "a match was made",
            Self::Reset => "reset",
        };
        f.write_str(s)
    }
}

/// One emotion change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionTransition {
    /// Previous emotion.
    pub from: Emotion,
    /// New emotion.
    pub to: Emotion,
    /// Cause.
    pub trigger: EmotionTrigger,
    /// Session clock in seconds.
    pub timestamp: f64,
}

/// Current emotion plus a short history of changes.
#[derive(Debug, Clone, Default)]
pub struct EmotionLog {
    current: Emotion,
    transitions: VecDeque<EmotionTransition>,
}

impl EmotionLog {
    /// Start calm with no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current emotion.
    #[must_use]
    pub fn current(&self) -> Emotion {
        self.current
    }

    /// Move to `to`. Self-transitions are not recorded.
    pub fn transition(&mut self, to: Emotion, trigger: EmotionTrigger, timestamp: f64) {
        if self.current == to {
            return;
        }
        trace!(from = %self.current, to = %to, trigger = %trigger, "emotion transition");
        self.transitions.push_back(EmotionTransition {
            from: self.current,
            to,
            trigger,
            timestamp,
        });
        while self.transitions.len() > TRANSITION_HISTORY {
            self.transitions.pop_front();
        }
        self.current = to;
    }

    /// Recorded transitions, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &EmotionTransition> {
        self.transitions.iter()
    }

    /// Back to calm with no history.
    pub fn reset(&mut self) {
        self.current = Emotion::Calm;
        self.transitions.clear();
    }

    /// Plain-text mood description for prompts.
    #[must_use]
    pub fn context_summary(&self) -> String {
        if self.transitions.is_empty() {
            return format!("Current emotional state: {} (no transitions yet)", self.current);
        }
        let mut out = format!("Current emotional state: {}\nRecent emotional transitions:", self.current);
        let skip = self.transitions.len().saturating_sub(SUMMARY_TRANSITIONS);
        for t in self.transitions.iter().skip(skip) {
            let _ = write!(out, "\n- {} -> {} (trigger: {})", t.from, t.to, t.trigger);
        }
        out
    }
}
