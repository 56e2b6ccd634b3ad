//! Configuration for the deadpan engine.
//!
//! Maps directly to `deadpan.toml`. Every field has a default, so an empty
//! file (or no file at all) yields the tuning the game shipped with.

use serde::{Deserialize, Serialize};

use crate::error::{DeadpanError, Result};

/// Top-level deadpan configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeadpanConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Behavior tracker window.
    #[serde(default)]
    pub behavior: BehaviorConfig,
    /// Gesture tracker window.
    #[serde(default)]
    pub gestures: GestureConfig,
    /// Pre-draw expectation tuning.
    #[serde(default)]
    pub expectation: ExpectationConfig,
    /// Pressure bounds and decay.
    #[serde(default)]
    pub pressure: PressureConfig,
    /// Response pipeline probabilities and caps.
    #[serde(default)]
    pub dialogue: DialogueConfig,
    /// Text-generation backend.
    #[serde(default)]
    pub llm: LlmConfig,
}

impl DeadpanConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `DeadpanError::Config` if the TOML is invalid or fails validation.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| DeadpanError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Reject tunings that would break the engine's invariants.
    ///
    /// # Errors
    /// Returns `DeadpanError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let e = &self.expectation;
        if !(0.0..=1.0).contains(&e.min_chance) || !(0.0..=1.0).contains(&e.max_chance) {
            return Err(DeadpanError::Config(
                "expectation.min_chance and max_chance must be within [0, 1]".into(),
            ));
        }
        if e.min_chance > e.max_chance {
            return Err(DeadpanError::Config(
                "expectation.min_chance must not exceed max_chance".into(),
            ));
        }
        if e.progression_turns == 0 {
            return Err(DeadpanError::Config(
                "expectation.progression_turns must be at least 1".into(),
            ));
        }
        let p = &self.pressure;
        if p.max_pressure < p.base_pressure {
            return Err(DeadpanError::Config(
                "pressure.max_pressure must not be below base_pressure".into(),
            ));
        }
        if p.decay_rate < 0.0 {
            return Err(DeadpanError::Config("pressure.decay_rate must be >= 0".into()));
        }
        if self.behavior.max_history == 0 {
            return Err(DeadpanError::Config("behavior.max_history must be at least 1".into()));
        }
        if self.dialogue.history_cap == 0 {
            return Err(DeadpanError::Config("dialogue.history_cap must be at least 1".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Whether the engine speaks. When off, reactions still resolve but no
    /// line is presented, enriched or volunteered.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Fixed RNG seed for reproducible sessions. `None` seeds from entropy.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "info".to_string(),
            rng_seed: None,
        }
    }
}

/// Behavior tracker window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Actions older than this (seconds) are evicted.
    #[serde(default = "default_30_0")]
    pub window_secs: f64,
    /// Hard cap on retained actions.
    #[serde(default = "default_20_usize")]
    pub max_history: usize,
    /// Hovers at or below this many seconds do not count toward averages.
    #[serde(default = "default_0_1")]
    pub min_valid_hover_secs: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            window_secs: 30.0,
            max_history: 20,
            min_valid_hover_secs: 0.1,
        }
    }
}

/// Gesture tracker window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Gestures older than this (seconds) are evicted.
    #[serde(default = "default_60_0")]
    pub window_secs: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self { window_secs: 60.0 }
    }
}

/// Pre-draw expectation tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectationConfig {
    /// Chance of a non-neutral expectation right after warm-up.
    #[serde(default = "default_0_3")]
    pub base_chance: f32,
    /// Upper clamp on the chance.
    #[serde(default = "default_0_7")]
    pub max_chance: f32,
    /// Lower clamp on the chance.
    #[serde(default = "default_0_05")]
    pub min_chance: f32,
    /// Turns during which the expectation is always neutral.
    #[serde(default = "default_2")]
    pub warmup_turns: u32,
    /// Turns after warm-up over which the progression bonus ramps in.
    #[serde(default = "default_10")]
    pub progression_turns: u32,
    /// Full progression bonus once ramped in.
    #[serde(default = "default_0_2")]
    pub progression_bonus: f32,
}

impl Default for ExpectationConfig {
    fn default() -> Self {
        Self {
            base_chance: 0.3,
            max_chance: 0.7,
            min_chance: 0.05,
            warmup_turns: 2,
            progression_turns: 10,
            progression_bonus: 0.2,
        }
    }
}

/// Pressure bounds and decay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressureConfig {
    /// Resting level and lower bound.
    #[serde(default)]
    pub base_pressure: f32,
    /// Upper bound.
    #[serde(default = "default_3_0")]
    pub max_pressure: f32,
    /// Units lost per second of session time.
    #[serde(default = "default_0_1")]
    pub decay_rate: f32,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            base_pressure: 0.0,
            max_pressure: 3.0,
            decay_rate: 0.1,
        }
    }
}

/// Response pipeline probabilities and caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Probability the situational stage speaks when it applies.
    #[serde(default = "default_0_3")]
    pub situational_chance: f32,
    /// Probability the behavior-aware stage speaks when it applies.
    #[serde(default = "default_0_3")]
    pub behavior_chance: f32,
    /// Reaction history length.
    #[serde(default = "default_20_usize")]
    pub history_cap: usize,
    /// Whether hover-triggered remarks are produced at all.
    #[serde(default = "default_true")]
    pub hover_enabled: bool,
    /// Minimum session seconds between hover remarks.
    #[serde(default = "default_4_0")]
    pub hover_cooldown_secs: f64,
    /// Base probability of reacting to a player gesture.
    #[serde(default = "default_0_4")]
    pub gesture_reaction_chance: f32,
    /// Player's display name for generated lines.
    #[serde(default)]
    pub player_name: Option<String>,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            situational_chance: 0.3,
            behavior_chance: 0.3,
            history_cap: 20,
            hover_enabled: true,
            hover_cooldown_secs: 4.0,
            gesture_reaction_chance: 0.4,
            player_name: None,
        }
    }
}

/// Text-generation backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider: "ollama", "openai", "anthropic", "none".
    #[serde(default = "default_none")]
    pub provider: String,
    /// Base URL for the API.
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    /// API key for hosted providers.
    #[serde(default)]
    pub api_key: String,
    /// Model for one-line reactions.
    #[serde(default = "default_short_model")]
    pub short_model: String,
    /// Model for turning-point commentary.
    #[serde(default = "default_long_model")]
    pub long_model: String,
    /// Budget for a one-line reaction before falling back, in milliseconds.
    #[serde(default = "default_2000")]
    pub short_timeout_ms: u64,
    /// Budget for turning-point commentary, in milliseconds.
    #[serde(default = "default_15000")]
    pub long_timeout_ms: u64,
    /// Token cap for one-line reactions.
    #[serde(default = "default_100")]
    pub short_max_tokens: u32,
    /// Token cap for turning-point commentary.
    #[serde(default = "default_300")]
    pub long_max_tokens: u32,
    /// Sampling temperature.
    #[serde(default = "default_0_9")]
    pub temperature: f32,
    /// Optional directory of TOML prompt overrides.
    #[serde(default)]
    pub prompt_dir: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "none".to_string(),
            base_url: "http://localhost:11434".to_string(),
            api_key: String::new(),
            short_model: "qwen2.5:1.5b".to_string(),
            long_model: "mistral:7b-instruct".to_string(),
            short_timeout_ms: 2000,
            long_timeout_ms: 15000,
            short_max_tokens: 100,
            long_max_tokens: 300,
            temperature: 0.9,
            prompt_dir: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_none() -> String { "none".to_string() }
fn default_ollama_url() -> String { "http://localhost:11434".to_string() }
fn default_short_model() -> String { "qwen2.5:1.5b".to_string() }
fn default_long_model() -> String { "mistral:7b-instruct".to_string() }
fn default_0_05() -> f32 { 0.05 }
fn default_0_1() -> f32 { 0.1 }
fn default_0_2() -> f32 { 0.2 }
fn default_0_3() -> f32 { 0.3 }
fn default_0_4() -> f32 { 0.4 }
fn default_0_7() -> f32 { 0.7 }
fn default_0_9() -> f32 { 0.9 }
fn default_3_0() -> f32 { 3.0 }
fn default_4_0() -> f64 { 4.0 }
fn default_30_0() -> f64 { 30.0 }
fn default_60_0() -> f64 { 60.0 }
fn default_2() -> u32 { 2 }
fn default_10() -> u32 { 10 }
fn default_100() -> u32 { 100 }
fn default_300() -> u32 { 300 }
fn default_20_usize() -> usize { 20 }
fn default_2000() -> u64 { 2000 }
fn default_15000() -> u64 { 15000 }
