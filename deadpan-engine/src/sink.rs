//! Presentation sink: where finished lines go.
//!
//! The engine hands every line it produces to a [`PresentationSink`] and
//! also returns it to the caller. A sink never answers back; what it does
//! with the line (floating text, speech bubble, TTS) is the host's business.

use deadpan_core::{Emotion, SessionId};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

/// What produced a presented line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationKind {
    /// Post-draw reaction.
    Reaction,
    /// Remark while the player hesitates.
    Hover,
    /// Answer to a player gesture.
    Gesture,
    /// Turning-point commentary delivered out of band.
    Commentary,
}

/// A line ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    /// Session that produced the line.
    pub session: SessionId,
    /// What produced it.
    pub kind: PresentationKind,
    /// The line itself.
    pub text: String,
    /// Emotion at the time of speaking.
    pub emotion: Emotion,
    /// Display intensity in `[0, 1]`.
    pub intensity: f32,
}

/// Receives lines for display. Fire-and-forget.
pub trait PresentationSink: Send + Sync {
    /// Show `presentation`.
    fn present(&self, presentation: &Presentation);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn present(&self, _presentation: &Presentation) {}
}

/// Forwards lines to an unbounded Tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<Presentation>,
}

impl ChannelSink {
    /// A sink and the receiver its lines arrive on.
    #[must_use]
    pub fn new() -> (Self, UnboundedReceiver<Presentation>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PresentationSink for ChannelSink {
    fn present(&self, presentation: &Presentation) {
        if self.tx.send(presentation.clone()).is_err() {
            trace!("presentation receiver dropped, line discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> Presentation {
        Presentation {
            session: SessionId::new(),
            kind: PresentationKind::Reaction,
            text: text.into(),
            emotion: Emotion::Pleased,
            intensity: 0.5,
        }
    }

    #[test]
    fn channel_sink_forwards_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.present(&line("one"));
        sink.present(&line("two"));
        assert_eq!(rx.try_recv().expect("first").text, "one");
        assert_eq!(rx.try_recv().expect("second").text, "two");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.present(&line("nobody listening"));
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&PresentationKind::Commentary).expect("serialize");
        assert_eq!(json, "\"commentary\"");
    }
}
