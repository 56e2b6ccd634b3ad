//! Core type definitions for the deadpan psychology engine.
//!
//! All types are plain data and serializable so a game can log or replay a
//! session. None of them carry card identities.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identifies one play session. A fresh id is minted on every reset so late
/// results from a previous session can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// Coarse horizontal bucket of the card the player picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// Left third of the opponent's hand.
    Left,
    /// Middle third, also used when only one card is left.
    Center,
    /// Right third.
    Right,
}

impl Position {
    /// All buckets in index order.
    pub const ALL: [Position; 3] = [Self::Left, Self::Center, Self::Right];

    /// Normalize a raw card index into a bucket.
    ///
    /// A hand of one card (or an empty/unknown hand) is always `Center`.
    #[must_use]
    pub fn from_raw(raw_index: usize, total_cards: usize) -> Self {
        if total_cards <= 1 {
            return Self::Center;
        }
        match (raw_index.saturating_mul(3) / total_cards).min(2) {
            0 => Self::Left,
            1 => Self::Center,
            _ => Self::Right,
        }
    }

    /// Array index of this bucket (0..3).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Center => 1,
            Self::Right => 2,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed card pick by the human player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerAction {
    /// Bucketed position of the picked card.
    pub position: Position,
    /// Seconds the pointer hovered over cards before committing.
    pub hover_duration: f32,
    /// Seconds from turn start to the pick.
    pub decision_time: f32,
    /// How many distinct cards were hovered.
    pub hover_count: u32,
    /// Session clock at the time of the pick, in seconds.
    pub timestamp: f64,
}

/// Rhythm of the player's picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tempo {
    /// Average interval under two seconds.
    Fast,
    /// Steady, unremarkable pace.
    #[default]
    Normal,
    /// Average interval over eight seconds.
    Slow,
    /// Intervals vary by more than half their mean.
    Erratic,
}

impl Tempo {
    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Normal => "normal",
            Self::Slow => "slow",
            Self::Erratic => "erratic",
        }
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of what the tracker currently believes about the player.
///
/// Recomputed wholesale on every recorded action, from in-window actions only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BehaviorPattern {
    /// Heuristic hesitation score in `[0, 1]`.
    pub doubt_level: f32,
    /// Rhythm classification.
    pub tempo: Tempo,
    /// Mean hover seconds over actions with a meaningful hover.
    pub avg_hover_time: f32,
    /// Mean decision seconds over the same actions.
    pub avg_decision_time: f32,
    /// How many of the most recent picks share the latest bucket.
    pub streak_same_position: u32,
    /// Bucket picked in more than half of the window, if any.
    pub preferred_position: Option<Position>,
    /// Picks per bucket, indexed by [`Position::index`].
    pub position_counts: [u32; 3],
}

impl BehaviorPattern {
    /// Whether one bucket dominates the window.
    #[must_use]
    pub fn has_position_preference(&self) -> bool {
        self.preferred_position.is_some()
    }
}

/// A table-talk gesture the player performed with their own hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureKind {
    /// Shuffled their hand.
    Shuffle,
    /// Pushed a card forward, inviting a pick.
    Push,
    /// Pulled a card back.
    Pull,
    /// Wiggled a card.
    Wiggle,
    /// Fanned the hand wide.
    Spread,
    /// Closed the hand up.
    Close,
}

impl GestureKind {
    /// All gesture kinds.
    pub const ALL: [GestureKind; 6] = [
        Self::Shuffle,
        Self::Push,
        Self::Pull,
        Self::Wiggle,
        Self::Spread,
        Self::Close,
    ];

    /// Lowercase name, used in localization keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shuffle => "shuffle",
            Self::Push => "push",
            Self::Pull => "pull",
            Self::Wiggle => "wiggle",
            Self::Spread => "spread",
            Self::Close => "close",
        }
    }

    /// Display name used in free-text summaries.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Shuffle => "Shuffle",
            Self::Push => "Push",
            Self::Pull => "Pull",
            Self::Wiggle => "Wiggle",
            Self::Spread => "Spread",
            Self::Close => "Close",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Expectation & Emotion
// ---------------------------------------------------------------------------

/// What the AI braces for before the player draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Expectation {
    /// No particular read on the player.
    #[default]
    Neutral,
    /// Hopes the player stops on the Joker.
    Stop,
    /// Dangles a safe card hoping the player takes it.
    Bait,
}

impl Expectation {
    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Stop => "stop",
            Self::Bait => "bait",
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The AI's displayed emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Emotion {
    /// Resting state.
    #[default]
    Calm,
    /// Waiting to see what the player does.
    Anticipating,
    /// Things went its way.
    Pleased,
    /// Things did not go its way.
    Frustrated,
    /// Its read was exploited.
    Hurt,
    /// Dodged a bad outcome.
    Relieved,
}

impl Emotion {
    /// All emotions.
    pub const ALL: [Emotion; 6] = [
        Self::Calm,
        Self::Anticipating,
        Self::Pleased,
        Self::Frustrated,
        Self::Hurt,
        Self::Relieved,
    ];

    /// Lowercase name, used in localization keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Anticipating => "anticipating",
            Self::Pleased => "pleased",
            Self::Frustrated => "frustrated",
            Self::Hurt => "hurt",
            Self::Relieved => "relieved",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Draw facts
// ---------------------------------------------------------------------------

/// Facts about a draw, supplied by the game loop.
///
/// `remaining_cards` is the drawer's hand size after the draw and any pair
/// discard. The engine never learns which card was drawn beyond "Joker or not".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DrawContext {
    /// Whether the human player drew this turn.
    pub is_player_turn: bool,
    /// Whether the drawn card was the Joker.
    pub drawn_card_is_joker: bool,
    /// Whether the draw completed a pair that was discarded.
    pub formed_pair: bool,
    /// Drawer's cards after the draw.
    pub remaining_cards: u32,
    /// The other side's cards after the draw.
    pub opponent_remaining_cards: u32,
    /// Whether the AI holds the Joker after the draw.
    pub ai_holds_joker: bool,
    /// The pair discard emptied the drawer's hand.
    pub pair_empties_hand: bool,
    /// The pair discard left the drawer holding only the Joker.
    pub pair_leaves_only_joker: bool,
}

impl DrawContext {
    /// Create a context with both outcome flags cleared.
    #[must_use]
    pub fn new(
        is_player_turn: bool,
        drawn_card_is_joker: bool,
        formed_pair: bool,
        remaining_cards: u32,
        opponent_remaining_cards: u32,
        ai_holds_joker: bool,
    ) -> Self {
        Self {
            is_player_turn,
            drawn_card_is_joker,
            formed_pair,
            remaining_cards,
            opponent_remaining_cards,
            ai_holds_joker,
            pair_empties_hand: false,
            pair_leaves_only_joker: false,
        }
    }

    /// Infer the outcome flags from hand counts.
    ///
    /// Games that report `remaining_cards` *before* the pair discard can use
    /// this: two cards left plus a pair means the hand empties, three left
    /// plus a pair means the drawer keeps only the Joker when they hold it.
    #[must_use]
    pub fn with_legacy_outcome_flags(mut self) -> Self {
        let drawer_holds_joker = if self.is_player_turn {
            !self.ai_holds_joker
        } else {
            self.ai_holds_joker
        };
        self.pair_empties_hand = self.formed_pair && self.remaining_cards == 2;
        self.pair_leaves_only_joker =
            self.formed_pair && self.remaining_cards == 3 && drawer_holds_joker;
        self
    }

    /// Set whether the pair discard emptied the drawer's hand.
    #[must_use]
    pub fn with_pair_empties_hand(mut self, value: bool) -> Self {
        self.pair_empties_hand = value;
        self
    }

    /// Set whether the pair discard left the drawer with only the Joker.
    #[must_use]
    pub fn with_pair_leaves_only_joker(mut self, value: bool) -> Self {
        self.pair_leaves_only_joker = value;
        self
    }

    /// Cards left on the AI's side.
    #[must_use]
    pub fn ai_cards(&self) -> u32 {
        if self.is_player_turn {
            self.opponent_remaining_cards
        } else {
            self.remaining_cards
        }
    }

    /// Cards left on both sides combined.
    #[must_use]
    pub fn total_cards(&self) -> u32 {
        self.remaining_cards.saturating_add(self.opponent_remaining_cards)
    }
}

// ---------------------------------------------------------------------------
// Reaction output
// ---------------------------------------------------------------------------

/// Which stage of the response pipeline produced a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineSource {
    /// Short text-generation call.
    Enriched,
    /// The AI's own Joker draw.
    JokerOverreaction,
    /// A game-ending outcome.
    Decisive,
    /// Hand-size driven commentary.
    Situational,
    /// Commentary on the player's habits.
    Behavior,
    /// Static per-emotion table.
    Static,
    /// Nothing available; the hard-coded ellipsis.
    Silence,
}

/// Everything the engine produced for one draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalResult {
    /// Expectation that was active for the draw.
    pub expectation: Expectation,
    /// Resolved emotion.
    pub emotion: Emotion,
    /// Display intensity in `[0, 1]`.
    pub reaction_intensity: f32,
    /// Line to show or speak.
    pub dialogue_line: String,
    /// Pipeline stage that produced `dialogue_line`.
    pub line_source: LineSource,
    /// Pressure change caused by this reaction.
    pub pressure_delta: f32,
    /// Whether the draw was a turning point.
    pub is_turning_point: bool,
}
