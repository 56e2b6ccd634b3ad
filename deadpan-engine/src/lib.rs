//! # deadpan-engine: Session Façade for Deadpan
//!
//! Wires the deterministic psychology in `deadpan-core` to the optional
//! text generation in `deadpan-llm` and hands finished lines to the host.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                  Game loop                   │
//! │   pick / gesture / draw / tick / reset       │
//! └──────────────────────┬───────────────────────┘
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │            ReactionEngine (engine)           │
//! │  ┌────────────┐ ┌────────────┐ ┌──────────┐  │
//! │  │ trackers   │ │ pipeline   │ │  bridge  │  │
//! │  │ (core)     │ │ A / B / C  │ │ prompts  │  │
//! │  └────────────┘ └─────┬──────┘ └──────────┘  │
//! └───────────────────────┼──────────────────────┘
//!                         ▼
//!        ┌──────────────────────────────┐
//!        │  TextGenerator (deadpan-llm) │  optional
//!        └──────────────────────────────┘
//!                         │
//!                         ▼
//!        ┌──────────────────────────────┐
//!        │  PresentationSink (host)     │
//!        └──────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `engine`: [`ReactionEngine`] and its builder
//! - `pipeline`: canned lines, awaited enrichment, detached commentary
//! - `bridge`: config to client, session state to prompt
//! - `sink`: where lines go once they are final

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bridge;
pub mod engine;
pub mod pipeline;
pub mod sink;

pub use engine::{EngineStats, ReactionEngine, ReactionEngineBuilder};
pub use pipeline::{Commentary, Enrichment, PipelineStats, ResponsePipeline};
pub use sink::{ChannelSink, NullSink, Presentation, PresentationKind, PresentationSink};
