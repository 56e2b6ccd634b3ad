//! # Deadpan Core Library
//!
//! Game-agnostic opponent psychology for a two-player card table.
//!
//! The AI opponent never looks at card values. Everything it "knows" comes
//! from how the human plays:
//!
//! - **Behavior**: timing, hover and position telemetry ([`BehaviorTracker`])
//! - **Gestures**: table talk like shuffling or pushing cards ([`GestureTracker`])
//! - **Expectation**: what the AI braces for before a draw ([`ExpectationEngine`])
//! - **Emotion**: the payoff matrix applied after a draw ([`emotion::resolve`])
//! - **Pressure**: a bounded, decaying tension scalar ([`PressureTracker`])
//!
//! ## Per-turn data flow
//!
//! ```text
//! PlayerAction ─▶ BehaviorTracker ─▶ BehaviorPattern ─┐
//!                                                     ▼
//!                       PressureTracker ◀── ExpectationEngine ─▶ Expectation
//!                              ▲                                     │
//!                              │        (draw happens in the game)   ▼
//!                              └──────── emotion::resolve ◀── DrawContext
//! ```
//!
//! Everything here is synchronous and deterministic given a seeded RNG. The
//! async response pipeline lives in `deadpan-engine`.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod behavior;
pub mod config;
pub mod emotion;
pub mod error;
pub mod expectation;
pub mod gesture;
pub mod locale;
pub mod pressure;
pub mod reaction;
pub mod summary;
pub mod types;

pub use behavior::BehaviorTracker;
pub use config::DeadpanConfig;
pub use error::DeadpanError;
pub use expectation::ExpectationEngine;
pub use gesture::GestureTracker;
pub use locale::{LocalizationStore, TableLocalization};
pub use pressure::PressureTracker;
pub use types::*;
