//! Core types for LLM requests and responses.

use serde::{Deserialize, Serialize};

/// Latency tier of a generated line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmTier {
    /// Canned lines only. Never reaches a backend.
    Instant,
    /// One short sentence, awaited with a tight budget.
    Short,
    /// Two or three sentences, generated out of band.
    Long,
}

/// Token, temperature and timeout budgets per tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Token cap for short lines.
    pub short_max_tokens: u32,
    /// Token cap for long commentary.
    pub long_max_tokens: u32,
    /// Sampling temperature for both tiers.
    pub temperature: f32,
    /// Timeout for short lines in milliseconds.
    pub short_timeout_ms: u64,
    /// Timeout for long commentary in milliseconds.
    pub long_timeout_ms: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            short_max_tokens: 100,
            long_max_tokens: 300,
            temperature: 0.9,
            short_timeout_ms: 2000,
            long_timeout_ms: 15000,
        }
    }
}

/// A request to the LLM.
#[derive(Debug, Clone, Serialize)]
pub struct LlmRequest {
    /// System prompt (persona, rules, constraints).
    pub system: String,
    /// User prompt (emotional state, behavior, instructions).
    pub user: String,
    /// Which tier is this request?
    pub tier: LlmTier,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl LlmRequest {
    /// Create a short-tier request with the given budgets.
    #[must_use]
    pub fn short(system: impl Into<String>, user: impl Into<String>, settings: &GenerationSettings) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            tier: LlmTier::Short,
            max_tokens: settings.short_max_tokens,
            temperature: settings.temperature,
            timeout_ms: settings.short_timeout_ms,
        }
    }

    /// Create a long-tier request with the given budgets.
    #[must_use]
    pub fn long(system: impl Into<String>, user: impl Into<String>, settings: &GenerationSettings) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            tier: LlmTier::Long,
            max_tokens: settings.long_max_tokens,
            temperature: settings.temperature,
            timeout_ms: settings.long_timeout_ms,
        }
    }

    /// Override the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// A response from the LLM.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmResponse {
    /// The generated text, unsanitized.
    pub text: String,
    /// How many tokens were generated, when the backend reports it.
    pub tokens_generated: u32,
    /// Latency in milliseconds.
    pub latency_ms: u64,
    /// Which model was used.
    pub model: String,
}
