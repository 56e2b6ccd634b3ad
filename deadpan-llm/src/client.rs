//! LLM Client: unified interface for Ollama, OpenAI-compatible and Anthropic backends.
//!
//! Each call is a single attempt. There is no retry loop: a reaction that
//! misses its window is replaced by a canned line, not tried again.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::generator::{TextGenerator, sanitize_line};
use crate::prompt::{PromptEngine, PromptId, ReactionPrompt};
use crate::types::{GenerationSettings, LlmRequest, LlmResponse, LlmTier};

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Provider backend for LLM inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmProvider {
    /// Ollama running locally (recommended).
    Ollama {
        /// Server root, e.g. `http://localhost:11434`.
        base_url: String,
    },
    /// OpenAI-compatible chat completions API.
    OpenAiCompatible {
        /// API root without the `/v1` suffix.
        base_url: String,
        /// Bearer token.
        api_key: String,
    },
    /// Anthropic Messages API.
    Anthropic {
        /// API root, e.g. `https://api.anthropic.com`.
        base_url: String,
        /// Value for the `x-api-key` header.
        api_key: String,
    },
    /// No backend. Every call fails and callers fall back to canned lines.
    None,
}

impl LlmProvider {
    /// Build a provider from a config name.
    ///
    /// Accepts `ollama`, `openai`, `anthropic` and `none` (case-insensitive).
    ///
    /// # Errors
    /// Returns [`LlmError::ConfigError`] for unknown names or a hosted
    /// provider without an API key.
    pub fn from_name(name: &str, base_url: &str, api_key: &str) -> Result<Self, LlmError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        match name.to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "ollama" => Ok(Self::Ollama { base_url }),
            "openai" | "openai_compatible" => {
                if api_key.is_empty() {
                    return Err(LlmError::ConfigError("openai provider needs an api_key".into()));
                }
                Ok(Self::OpenAiCompatible {
                    base_url,
                    api_key: api_key.to_string(),
                })
            }
            "anthropic" => {
                if api_key.is_empty() {
                    return Err(LlmError::ConfigError("anthropic provider needs an api_key".into()));
                }
                Ok(Self::Anthropic {
                    base_url,
                    api_key: api_key.to_string(),
                })
            }
            other => Err(LlmError::ConfigError(format!("unknown LLM provider: '{other}'"))),
        }
    }
}

/// The main LLM client that routes requests to the configured backend.
#[derive(Debug, Clone)]
pub struct LlmClient {
    provider: LlmProvider,
    http: Client,
    short_model: String,
    long_model: String,
    settings: GenerationSettings,
    prompts: PromptEngine,
}

impl LlmClient {
    /// Create a new LLM client with default budgets and built-in prompts.
    #[must_use]
    pub fn new(
        provider: LlmProvider,
        short_model: impl Into<String>,
        long_model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            http: Client::new(),
            short_model: short_model.into(),
            long_model: long_model.into(),
            settings: GenerationSettings::default(),
            prompts: PromptEngine::builtin(),
        }
    }

    /// Create a client with no backend (all calls fail → canned fallback).
    #[must_use]
    pub fn none() -> Self {
        Self::new(LlmProvider::None, String::new(), String::new())
    }

    /// Replace the token, temperature and timeout budgets.
    #[must_use]
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the prompt templates.
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptEngine) -> Self {
        self.prompts = prompts;
        self
    }

    /// Budgets in use.
    #[must_use]
    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Check if the client has a backend configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.provider, LlmProvider::None)
    }

    /// Send one request to the backend.
    ///
    /// # Errors
    /// Returns `Err` if no backend is configured, the request fails, times
    /// out, or the response cannot be parsed.
    pub async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let model = match request.tier {
            LlmTier::Short => &self.short_model,
            LlmTier::Long => &self.long_model,
            LlmTier::Instant => {
                return Err(LlmError::ConfigError("instant tier does not use the LLM".into()));
            }
        };

        let (url, body, headers) = match &self.provider {
            LlmProvider::None => {
                return Err(LlmError::Unavailable("No LLM provider configured".into()));
            }
            LlmProvider::Ollama { base_url } => (
                format!("{base_url}/api/generate"),
                json!({
                    "model": model,
                    "system": request.system,
                    "prompt": request.user,
                    "stream": false,
                    "options": {
                        "temperature": request.temperature,
                        "num_predict": request.max_tokens,
                    }
                }),
                Vec::new(),
            ),
            LlmProvider::OpenAiCompatible { base_url, api_key } => (
                format!("{base_url}/v1/chat/completions"),
                json!({
                    "model": model,
                    "messages": [
                        { "role": "system", "content": request.system },
                        { "role": "user", "content": request.user },
                    ],
                    "max_tokens": request.max_tokens,
                    "temperature": request.temperature,
                }),
                vec![("Authorization", format!("Bearer {api_key}"))],
            ),
            LlmProvider::Anthropic { base_url, api_key } => (
                format!("{base_url}/v1/messages"),
                json!({
                    "model": model,
                    "system": request.system,
                    "messages": [
                        { "role": "user", "content": request.user },
                    ],
                    "max_tokens": request.max_tokens,
                    "temperature": request.temperature,
                }),
                vec![
                    ("x-api-key", api_key.clone()),
                    ("anthropic-version", ANTHROPIC_VERSION.to_string()),
                ],
            ),
        };

        let start = Instant::now();
        let mut builder = self
            .http
            .post(&url)
            .json(&body)
            .timeout(Duration::from_millis(request.timeout_ms));
        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        let resp = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                warn!(url = %url, timeout_ms = request.timeout_ms, "LLM request timed out");
                LlmError::Timeout(request.timeout_ms)
            } else {
                warn!(url = %url, error = %e, "LLM request failed");
                LlmError::from(e)
            }
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            warn!(%status, "LLM backend returned error");
            return Err(LlmError::RequestFailed(format!("HTTP {status}: {detail}")));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let (text, tokens) = extract_text(&self.provider, &json)?;
        debug!(model = %model, latency_ms, tokens, "LLM response received");

        Ok(LlmResponse {
            text,
            tokens_generated: tokens,
            latency_ms,
            model: model.clone(),
        })
    }

    async fn generate_line(&self, id: PromptId, prompt: &ReactionPrompt) -> Result<String, LlmError> {
        let (system, user) = self.prompts.render(id, prompt)?;
        let request = match id {
            PromptId::ReactionShort => LlmRequest::short(system, user, &self.settings),
            PromptId::ReactionLong => LlmRequest::long(system, user, &self.settings),
        };
        let response = self.generate(&request).await?;
        sanitize_line(&response.text)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate_short(&self, prompt: &ReactionPrompt) -> Result<String, LlmError> {
        self.generate_line(PromptId::ReactionShort, prompt).await
    }

    async fn generate_long(&self, prompt: &ReactionPrompt) -> Result<String, LlmError> {
        self.generate_line(PromptId::ReactionLong, prompt).await
    }

    fn is_available(&self) -> bool {
        LlmClient::is_available(self)
    }
}

/// Pull the generated text and token count out of a provider response.
fn extract_text(provider: &LlmProvider, json: &Value) -> Result<(String, u32), LlmError> {
    let (text, tokens) = match provider {
        LlmProvider::Ollama { .. } => (json["response"].as_str(), json["eval_count"].as_u64()),
        LlmProvider::OpenAiCompatible { .. } => (
            json["choices"][0]["message"]["content"].as_str(),
            json["usage"]["completion_tokens"].as_u64(),
        ),
        LlmProvider::Anthropic { .. } => (
            json["content"]
                .as_array()
                .and_then(|blocks| blocks.iter().find(|b| b["type"] == "text"))
                .and_then(|b| b["text"].as_str()),
            json["usage"]["output_tokens"].as_u64(),
        ),
        LlmProvider::None => (None, None),
    };
    let text = text.ok_or_else(|| LlmError::ParseError(format!("no text in response: {json}")))?;
    let tokens = tokens.and_then(|t| u32::try_from(t).ok()).unwrap_or(0);
    Ok((text.to_string(), tokens))
}
