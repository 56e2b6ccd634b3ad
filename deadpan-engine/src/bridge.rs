//! Bridge module: maps between deadpan-core state and deadpan-llm inputs.
//!
//! deadpan-core knows emotions, behavior patterns and pressure.
//! deadpan-llm knows prompts, providers and budgets.
//!
//! This module turns the first into the second without either crate
//! knowing about the other. It is also the only place that decides what a
//! prompt may say about a draw, so it is the only place that has to keep
//! card identity out of generated text.

use deadpan_core::config::LlmConfig;
use deadpan_core::emotion::trigger_key;
use deadpan_core::summary::game_phase;
use deadpan_core::{BehaviorPattern, DrawContext, Emotion, Expectation, LocalizationStore, Tempo};
use deadpan_llm::prompt::PromptEngine;
use deadpan_llm::{GenerationSettings, LlmClient, LlmError, LlmProvider, ReactionPrompt};
use tracing::info;

// ---------------------------------------------------------------------------
// Config → client
// ---------------------------------------------------------------------------

/// Token and timeout budgets from config.
#[must_use]
pub fn generation_settings(config: &LlmConfig) -> GenerationSettings {
    GenerationSettings {
        short_max_tokens: config.short_max_tokens,
        long_max_tokens: config.long_max_tokens,
        temperature: config.temperature,
        short_timeout_ms: config.short_timeout_ms,
        long_timeout_ms: config.long_timeout_ms,
    }
}

/// Build the HTTP client described by `config`.
///
/// Returns `Ok(None)` for the `none` provider.
///
/// # Errors
/// Unknown provider, a hosted provider without a key, or a prompt override
/// directory that fails to parse.
pub fn llm_client_from_config(config: &LlmConfig) -> Result<Option<LlmClient>, LlmError> {
    let provider = LlmProvider::from_name(&config.provider, &config.base_url, &config.api_key)?;
    if provider == LlmProvider::None {
        return Ok(None);
    }
    let prompts = match &config.prompt_dir {
        Some(dir) => PromptEngine::builtin_with_overrides(dir)?,
        None => PromptEngine::builtin(),
    };
    info!(
        provider = %config.provider,
        short_model = %config.short_model,
        long_model = %config.long_model,
        "text generation enabled"
    );
    Ok(Some(
        LlmClient::new(provider, config.short_model.clone(), config.long_model.clone())
            .with_settings(generation_settings(config))
            .with_prompts(prompts),
    ))
}

// ---------------------------------------------------------------------------
// Occasions and reasons
// ---------------------------------------------------------------------------

/// Occasion line for a draw, from the AI's point of view.
#[must_use]
pub fn draw_occasion(ctx: &DrawContext) -> &'static str {
    if ctx.is_player_turn {
        "The player just drew from your hand."
    } else {
        "You just drew from the player's hand."
    }
}

/// Occasion line for a hesitation remark.
pub const HOVER_OCCASION: &str = "The player is hesitating over your hand.";

/// Occasion line for turning-point commentary.
pub const TURNING_POINT_OCCASION: &str = "The game just reached a turning point.";

/// Abstract reason for `emotion`, looked up in the localization store.
#[must_use]
pub fn reaction_reason(locale: &dyn LocalizationStore, emotion: Emotion, expectation: Expectation) -> String {
    locale
        .get(trigger_key(emotion, expectation))
        .unwrap_or_else(|| format!("You feel {emotion}."))
}

/// Why the player's hesitation is worth a remark.
#[must_use]
pub fn hover_reason(pattern: &BehaviorPattern) -> &'static str {
    if pattern.doubt_level > 0.6 {
        "The player keeps circling and can't commit."
    } else if pattern.tempo == Tempo::Slow {
        "The player is taking their time again."
    } else if pattern.has_position_preference() {
        "The player keeps drifting to the same spot."
    } else {
        "The player is lingering."
    }
}

// ---------------------------------------------------------------------------
// Mood snapshot → prompt
// ---------------------------------------------------------------------------

/// Everything about the session a prompt may draw on.
#[derive(Debug, Clone)]
pub struct MoodSnapshot<'a> {
    /// Player's display name, if configured.
    pub player_name: Option<&'a str>,
    /// Current emotion.
    pub emotion: Emotion,
    /// Current behavior read.
    pub pattern: &'a BehaviorPattern,
    /// Current pressure.
    pub pressure: f32,
    /// Pressure ceiling.
    pub max_pressure: f32,
    /// Gesture summary text.
    pub gesture_summary: String,
    /// Turns started so far.
    pub turn_count: u32,
    /// Recent emotion transitions.
    pub mood_history: String,
    /// Session narrative.
    pub session_narrative: String,
}

impl MoodSnapshot<'_> {
    /// Prompt for `occasion`, explained by `reason`.
    #[must_use]
    pub fn prompt(&self, occasion: &str, reason: impl Into<String>, intensity: f32) -> ReactionPrompt {
        ReactionPrompt {
            player_name: self.player_name.map(str::to_string),
            occasion: occasion.to_string(),
            emotion: self.emotion.as_str().to_string(),
            reason: reason.into(),
            intensity: intensity.clamp(0.0, 1.0),
            doubt_level: self.pattern.doubt_level,
            tempo: self.pattern.tempo.as_str().to_string(),
            pressure: self.pressure,
            max_pressure: self.max_pressure,
            gesture_summary: self.gesture_summary.clone(),
            game_phase: game_phase(self.turn_count).to_string(),
            mood_history: self.mood_history.clone(),
            session_narrative: self.session_narrative.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadpan_core::TableLocalization;

    fn snapshot(pattern: &BehaviorPattern) -> MoodSnapshot<'_> {
        MoodSnapshot {
            player_name: Some("Mika"),
            emotion: Emotion::Hurt,
            pattern,
            pressure: 1.5,
            max_pressure: 3.0,
            gesture_summary: "No bluff actions yet.".into(),
            turn_count: 9,
            mood_history: "Current emotional state: hurt".into(),
            session_narrative: "The game has just begun.".into(),
        }
    }

    #[test]
    fn snapshot_fills_every_field() {
        let pattern = BehaviorPattern {
            doubt_level: 0.8,
            tempo: Tempo::Erratic,
            ..BehaviorPattern::default()
        };
        let prompt = snapshot(&pattern).prompt(TURNING_POINT_OCCASION, "because", 1.7);
        assert_eq!(prompt.player_name.as_deref(), Some("Mika"));
        assert_eq!(prompt.emotion, "hurt");
        assert_eq!(prompt.tempo, "erratic");
        assert_eq!(prompt.game_phase, "Late");
        assert!((prompt.intensity - 1.0).abs() < f32::EPSILON);
        assert!((prompt.doubt_level - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn reasons_come_from_locale_with_fallback() {
        let english = TableLocalization::english();
        let reason = reaction_reason(&english, Emotion::Pleased, Expectation::Bait);
        assert!(!reason.is_empty());
        assert_ne!(reason, "You feel pleased.");

        let empty = TableLocalization::empty();
        assert_eq!(reaction_reason(&empty, Emotion::Pleased, Expectation::Bait), "You feel pleased.");
    }

    #[test]
    fn occasions_never_mention_cards() {
        let player = DrawContext::new(true, true, false, 5, 5, false);
        let ai = DrawContext::new(false, true, false, 5, 5, true);
        for text in [draw_occasion(&player), draw_occasion(&ai), HOVER_OCCASION, TURNING_POINT_OCCASION] {
            let lower = text.to_lowercase();
            assert!(!lower.contains("card") && !lower.contains("joker"), "{text}");
        }
    }

    #[test]
    fn hover_reason_prefers_doubt() {
        let doubtful = BehaviorPattern {
            doubt_level: 0.9,
            tempo: Tempo::Slow,
            ..BehaviorPattern::default()
        };
        assert_eq!(hover_reason(&doubtful), "The player keeps circling and can't commit.");
        assert_eq!(hover_reason(&BehaviorPattern::default()), "The player is lingering.");
    }

    #[test]
    fn none_provider_yields_no_client() {
        let config = LlmConfig::default();
        assert!(llm_client_from_config(&config).expect("valid").is_none());

        let bad = LlmConfig {
            provider: "telepathy".into(),
            ..LlmConfig::default()
        };
        assert!(llm_client_from_config(&bad).is_err());
    }

    #[test]
    fn ollama_provider_builds_client() {
        let config = LlmConfig {
            provider: "ollama".into(),
            short_timeout_ms: 750,
            ..LlmConfig::default()
        };
        let client = llm_client_from_config(&config).expect("valid").expect("client");
        assert!(client.is_available());
        assert_eq!(client.settings().short_timeout_ms, 750);
    }
}
