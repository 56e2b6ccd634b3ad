//! Reaction rules: intensity, turning points and which canned lines apply.
//!
//! These are the pure parts of the response pipeline. Each `*_key` function
//! answers "would this stage speak, and from which localization pool?" without
//! rolling any dice; probability gating happens in the pipeline.

use crate::types::{BehaviorPattern, DrawContext, Emotion, Expectation, Tempo};

/// Hand size at or below which a side is "almost out".
pub const ENDGAME_HAND: u32 = 3;

/// Combined hand size at or below which situational lines switch to endgame.
pub const ENDGAME_TOTAL: u32 = 5;

/// Whether a draw is dramatic enough to justify long-form commentary.
#[must_use]
pub fn is_turning_point(ctx: &DrawContext) -> bool {
    ctx.drawn_card_is_joker
        || ctx.remaining_cards <= ENDGAME_HAND
        || ctx.opponent_remaining_cards <= ENDGAME_HAND
}

/// Display intensity of a reaction, in `[0, 1]`.
#[must_use]
pub fn intensity(expectation: Expectation, ctx: &DrawContext, pressure: f32) -> f32 {
    let mut value = 0.3;
    if ctx.drawn_card_is_joker {
        value += 0.4;
    }
    if ctx.formed_pair {
        value += 0.2;
    }
    value += pressure.max(0.0) * 0.1;
    if expectation != Expectation::Neutral {
        value += 0.15;
    }
    if ctx.remaining_cards <= ENDGAME_HAND || ctx.opponent_remaining_cards <= ENDGAME_HAND {
        value += 0.2;
    }
    value.clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Decisive outcome
// ---------------------------------------------------------------------------

/// Who a game-ending draw favours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The AI has won or is about to.
    AiWins,
    /// The player has won or is about to.
    PlayerWins,
}

impl Outcome {
    /// Localization pool for this outcome.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::AiWins => "decisive.ai_wins",
            Self::PlayerWins => "decisive.player_wins",
        }
    }
}

/// Classify a game-ending draw, if this is one.
///
/// The drawer wins when the pair discard empties their hand and loses when
/// it leaves only the Joker. Independently, an empty opponent hand means the
/// opponent has gone out.
#[must_use]
pub fn decisive_outcome(ctx: &DrawContext) -> Option<Outcome> {
    let drawer_wins = ctx.formed_pair && ctx.pair_empties_hand;
    let drawer_left_with_joker = ctx.formed_pair && ctx.pair_leaves_only_joker;
    let opponent_emptied =
        ctx.opponent_remaining_cards == 0 && !drawer_wins && !drawer_left_with_joker;

    if !(drawer_wins || drawer_left_with_joker || opponent_emptied) {
        return None;
    }

    let player = ctx.is_player_turn;
    let ai_wins = (player && opponent_emptied)
        || (!player && drawer_wins)
        || (player && drawer_left_with_joker);
    Some(if ai_wins { Outcome::AiWins } else { Outcome::PlayerWins })
}

/// Whether the AI just pulled the Joker into its own hand.
#[must_use]
pub fn is_joker_overreaction(ctx: &DrawContext) -> bool {
    !ctx.is_player_turn && ctx.drawn_card_is_joker && ctx.ai_holds_joker
}

// ---------------------------------------------------------------------------
// Situational & behavior-aware pools
// ---------------------------------------------------------------------------

/// Pool for a hand-size remark, if one applies.
#[must_use]
pub fn situational_key(emotion: Emotion, ctx: &DrawContext) -> Option<&'static str> {
    if ctx.total_cards() <= ENDGAME_TOTAL {
        return Some(match emotion {
            Emotion::Pleased => "situation.endgame_pleased",
            Emotion::Frustrated => "situation.endgame_frustrated",
            _ => "situation.endgame_default",
        });
    }
    if ctx.is_player_turn {
        return None;
    }
    if ctx.remaining_cards < ctx.opponent_remaining_cards {
        match emotion {
            Emotion::Pleased => Some("situation.winning_pleased"),
            Emotion::Calm => Some("situation.winning_calm"),
            _ => None,
        }
    } else if ctx.remaining_cards > ctx.opponent_remaining_cards {
        match emotion {
            Emotion::Frustrated => Some("situation.losing_frustrated"),
            Emotion::Calm => Some("situation.losing_calm"),
            _ => None,
        }
    } else {
        None
    }
}

/// Pool for a remark about the player's habits, if one applies.
///
/// The first signal present decides: tempo, then doubt, then position
/// preference. A signal with no pool for `emotion` yields `None` rather
/// than falling through to the next one.
#[must_use]
pub fn behavior_key(emotion: Emotion, pattern: &BehaviorPattern) -> Option<&'static str> {
    match pattern.tempo {
        Tempo::Fast => {
            return match emotion {
                Emotion::Calm => Some("behavior.fast_calm"),
                Emotion::Pleased => Some("behavior.fast_pleased"),
                Emotion::Anticipating => Some("behavior.fast_anticipating"),
                _ => None,
            };
        }
        Tempo::Slow => {
            return match emotion {
                Emotion::Calm => Some("behavior.slow_calm"),
                Emotion::Frustrated => Some("behavior.slow_frustrated"),
                Emotion::Anticipating => Some("behavior.slow_anticipating"),
                _ => None,
            };
        }
        Tempo::Normal | Tempo::Erratic => {}
    }

    if pattern.doubt_level > 0.6 {
        return match emotion {
            Emotion::Pleased => Some("behavior.doubt_pleased"),
            Emotion::Anticipating => Some("behavior.doubt_anticipating"),
            Emotion::Calm => Some("behavior.doubt_calm"),
            _ => None,
        };
    }

    if pattern.has_position_preference() {
        return match emotion {
            Emotion::Pleased => Some("behavior.position_pleased"),
            Emotion::Calm => Some("behavior.position_calm"),
            _ => None,
        };
    }
    None
}

/// Pool for a hover remark, tiered by pressure.
#[must_use]
pub fn hover_key(pressure: f32) -> &'static str {
    if pressure < 1.0 {
        "hover.low"
    } else if pressure < 2.0 {
        "hover.mid"
    } else {
        "hover.high"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn ctx(player: bool, pair: bool, remaining: u32, opponent: u32, ai_joker: bool) -> DrawContext {
        DrawContext::new(player, false, pair, remaining, opponent, ai_joker)
    }

    #[test]
    fn turning_points() {
        assert!(is_turning_point(&DrawContext::new(true, true, false, 8, 8, false)));
        assert!(is_turning_point(&ctx(true, false, 3, 8, false)));
        assert!(is_turning_point(&ctx(true, false, 8, 2, false)));
        assert!(!is_turning_point(&ctx(true, false, 8, 8, false)));
    }

    #[test]
    fn intensity_accumulates_and_clamps() {
        let calm = ctx(true, false, 8, 8, false);
        assert!((intensity(Expectation::Neutral, &calm, 0.0) - 0.3).abs() < 1e-6);

        let pair_read = ctx(true, true, 8, 8, false);
        assert!((intensity(Expectation::Stop, &pair_read, 1.0) - 0.75).abs() < 1e-6);

        let wild = DrawContext::new(true, true, true, 2, 2, false);
        assert!((intensity(Expectation::Bait, &wild, 3.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn no_outcome_for_ordinary_draws() {
        assert_eq!(decisive_outcome(&ctx(true, true, 4, 5, false)), None);
    }

    #[test]
    fn drawer_emptying_hand() {
        let player = ctx(true, true, 0, 1, true).with_pair_empties_hand(true);
        assert_eq!(decisive_outcome(&player), Some(Outcome::PlayerWins));
        let ai = ctx(false, true, 0, 1, false).with_pair_empties_hand(true);
        assert_eq!(decisive_outcome(&ai), Some(Outcome::AiWins));
    }

    #[test]
    fn drawer_left_with_joker() {
        let player = ctx(true, true, 1, 2, false).with_pair_leaves_only_joker(true);
        assert_eq!(decisive_outcome(&player), Some(Outcome::AiWins));
        let ai = ctx(false, true, 1, 2, true).with_pair_leaves_only_joker(true);
        assert_eq!(decisive_outcome(&ai), Some(Outcome::PlayerWins));
    }

    #[test]
    fn opponent_emptied() {
        // The player drew the AI's last card.
        assert_eq!(decisive_outcome(&ctx(true, false, 3, 0, false)), Some(Outcome::AiWins));
        // The AI drew the player's last card.
        assert_eq!(decisive_outcome(&ctx(false, false, 3, 0, true)), Some(Outcome::PlayerWins));
    }

    #[test]
    fn legacy_count_inference_feeds_outcome() {
        let ai = ctx(false, true, 2, 3, false).with_legacy_outcome_flags();
        assert_eq!(decisive_outcome(&ai), Some(Outcome::AiWins));
    }

    #[test]
    fn overreaction_needs_ai_turn_and_joker() {
        assert!(is_joker_overreaction(&DrawContext::new(false, true, false, 5, 5, true)));
        assert!(!is_joker_overreaction(&DrawContext::new(true, true, false, 5, 5, false)));
    }

    #[test]
    fn situational_pools() {
        assert_eq!(
            situational_key(Emotion::Frustrated, &ctx(true, false, 2, 3, false)),
            Some("situation.endgame_frustrated")
        );
        assert_eq!(
            situational_key(Emotion::Hurt, &ctx(true, false, 2, 2, false)),
            Some("situation.endgame_default")
        );
        assert_eq!(
            situational_key(Emotion::Calm, &ctx(false, false, 4, 7, true)),
            Some("situation.winning_calm")
        );
        assert_eq!(
            situational_key(Emotion::Frustrated, &ctx(false, false, 7, 4, true)),
            Some("situation.losing_frustrated")
        );
        assert_eq!(situational_key(Emotion::Calm, &ctx(true, false, 7, 4, true)), None);
        assert_eq!(situational_key(Emotion::Hurt, &ctx(false, false, 4, 7, true)), None);
    }

    #[test]
    fn behavior_pools() {
        let fast = BehaviorPattern {
            tempo: Tempo::Fast,
            ..Default::default()
        };
        assert_eq!(behavior_key(Emotion::Pleased, &fast), Some("behavior.fast_pleased"));
        assert_eq!(behavior_key(Emotion::Hurt, &fast), None);

        let doubtful_fast = BehaviorPattern {
            tempo: Tempo::Fast,
            doubt_level: 0.9,
            ..Default::default()
        };
        // Tempo decides first even when doubt would have a pool.
        assert_eq!(behavior_key(Emotion::Frustrated, &doubtful_fast), None);
        assert_eq!(behavior_key(Emotion::Anticipating, &doubtful_fast), Some("behavior.fast_anticipating"));

        let doubtful_preferring = BehaviorPattern {
            doubt_level: 0.9,
            preferred_position: Some(Position::Left),
            ..Default::default()
        };
        // Doubt decides before preference.
        assert_eq!(behavior_key(Emotion::Calm, &doubtful_preferring), Some("behavior.doubt_calm"));

        let preferring = BehaviorPattern {
            preferred_position: Some(Position::Center),
            ..Default::default()
        };
        assert_eq!(behavior_key(Emotion::Calm, &preferring), Some("behavior.position_calm"));
    }

    #[test]
    fn hover_tiers() {
        assert_eq!(hover_key(0.2), "hover.low");
        assert_eq!(hover_key(1.5), "hover.mid");
        assert_eq!(hover_key(2.5), "hover.high");
    }
}
