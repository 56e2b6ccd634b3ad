//! # deadpan-llm: Text Generation for Deadpan
//!
//! Provides the optional "voice" of the AI opponent across several backends:
//!   - **Ollama** (local, recommended default)
//!   - **OpenAI-compatible API** (`/v1/chat/completions`)
//!   - **Anthropic Messages API** (`/v1/messages`)
//!
//! The engine never depends on this crate succeeding. Every call is a single
//! attempt with a hard timeout, guarded by a one-slot [`EnrichmentGate`] so
//! at most one request is ever in flight. Failures surface as [`LlmError`]
//! and are swallowed by the caller, which falls back to canned lines.
//!
//! # Architecture
//!
//! ```text
//! Instant : canned lines, no LLM                     [<0.1ms, sync]
//! Short   : one-line reaction, small model            [≤2s, async, awaited]
//! Long    : turning-point commentary, larger model    [≤15s, async, detached]
//! ```

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod gate;
pub mod generator;
pub mod prompt;
pub mod types;

pub use client::{LlmClient, LlmProvider};
pub use error::LlmError;
pub use gate::{EnrichmentGate, GatePass, GateStats};
pub use generator::{TextGenerator, sanitize_line};
pub use prompt::{PromptEngine, PromptId, ReactionPrompt};
pub use types::{GenerationSettings, LlmRequest, LlmResponse, LlmTier};
