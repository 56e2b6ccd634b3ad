//! Response pipeline: one line of dialogue per reaction, always.
//!
//! ```text
//! Joker drawn? ──yes──────────────────────────────┐
//!      │ no                                       │
//!      ▼                                          ▼
//! Short enrichment (gate + timeout) ──fail──▶ Joker over-reaction (AI drew it)
//!      │ ok                                       │ n/a
//!      ▼                                          ▼
//!   Enriched                                  Decisive outcome (always)
//!                                                 │ n/a
//!                                                 ▼
//!                                             Situational (30%)
//!                                                 │ n/a / roll failed
//!                                                 ▼
//!                                             Behavior-aware (30%)
//!                                                 │ n/a / roll failed
//!                                                 ▼
//!                                             emotion.<name> ──empty──▶ "..."
//! ```
//!
//! Enrichment failures never leave this module. The caller gets a line and
//! the [`LineSource`] it came from.

use std::sync::Arc;
use std::time::Duration;

use deadpan_core::reaction::{behavior_key, decisive_outcome, is_joker_overreaction, situational_key};
use deadpan_core::{BehaviorPattern, DrawContext, Emotion, LineSource, LocalizationStore, SessionId};
use deadpan_llm::{EnrichmentGate, GateStats, ReactionPrompt, TextGenerator, sanitize_line};
use rand::{Rng, RngCore};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace, warn};

/// Hard line for the AI drawing the Joker when no pool exists.
pub const JOKER_FALLBACK: &str = "JOKER...!";

/// Last-resort line when the emotion pool is empty.
pub const SILENCE: &str = "...";

/// Outcome of one short enrichment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment {
    /// A usable line.
    Line(String),
    /// Another request holds the slot.
    Busy,
    /// The request failed, timed out or came back empty.
    Failed,
    /// No generator configured.
    Unavailable,
}

/// Counters for the short tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Short calls that produced a line.
    pub short_hits: u64,
    /// Short calls that failed, timed out or returned nothing.
    pub short_misses: u64,
    /// Short calls skipped because the slot was taken.
    pub short_busy: u64,
    /// Reactions that skipped enrichment because the Joker was drawn.
    pub joker_skips: u64,
}

/// Turning-point commentary, tagged with the session that asked for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Commentary {
    /// Session at request time.
    pub session: SessionId,
    /// Emotion at request time.
    pub emotion: Emotion,
    /// Generated text.
    pub text: String,
}

/// Tiered dialogue producer.
pub struct ResponsePipeline {
    generator: Option<Arc<dyn TextGenerator>>,
    locale: Arc<dyn LocalizationStore>,
    gate: EnrichmentGate,
    short_timeout: Duration,
    long_timeout: Duration,
    situational_chance: f32,
    behavior_chance: f32,
    stats: PipelineStats,
}

impl std::fmt::Debug for ResponsePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponsePipeline")
            .field("generator", &self.generator.is_some())
            .field("gate", &self.gate)
            .field("short_timeout", &self.short_timeout)
            .field("long_timeout", &self.long_timeout)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl ResponsePipeline {
    /// Pipeline with canned lines only.
    #[must_use]
    pub fn new(locale: Arc<dyn LocalizationStore>) -> Self {
        Self {
            generator: None,
            locale,
            gate: EnrichmentGate::new(),
            short_timeout: Duration::from_millis(2000),
            long_timeout: Duration::from_millis(15000),
            situational_chance: 0.3,
            behavior_chance: 0.3,
            stats: PipelineStats::default(),
        }
    }

    /// Attach a text generator.
    #[must_use]
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Per-call budgets for the short and long tiers.
    #[must_use]
    pub fn with_timeouts(mut self, short: Duration, long: Duration) -> Self {
        self.short_timeout = short;
        self.long_timeout = long;
        self
    }

    /// Probabilities of the situational and behavior-aware stages.
    #[must_use]
    pub fn with_chances(mut self, situational: f32, behavior: f32) -> Self {
        self.situational_chance = situational;
        self.behavior_chance = behavior;
        self
    }

    /// Whether a usable generator is attached.
    #[must_use]
    pub fn has_generator(&self) -> bool {
        self.generator.as_ref().is_some_and(|g| g.is_available())
    }

    /// Whether an enrichment request is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// The localization store in use.
    #[must_use]
    pub fn locale(&self) -> &dyn LocalizationStore {
        self.locale.as_ref()
    }

    /// Short-tier counters.
    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Gate admission counters.
    #[must_use]
    pub fn gate_stats(&self) -> GateStats {
        self.gate.stats()
    }

    /// Produce the line for a reaction.
    pub async fn dialogue<R: RngCore + Send>(
        &mut self,
        emotion: Emotion,
        ctx: &DrawContext,
        pattern: &BehaviorPattern,
        prompt: &ReactionPrompt,
        rng: &mut R,
    ) -> (String, LineSource) {
        if ctx.drawn_card_is_joker {
            self.stats.joker_skips += 1;
            trace!("joker draw, enrichment skipped");
        } else if let Enrichment::Line(line) = self.enrich_short(prompt).await {
            return (line, LineSource::Enriched);
        }
        self.fallback(emotion, ctx, pattern, rng)
    }

    /// One short enrichment attempt. Never waits for the slot.
    pub async fn enrich_short(&mut self, prompt: &ReactionPrompt) -> Enrichment {
        let Some(generator) = self.generator.as_ref().filter(|g| g.is_available()).map(Arc::clone) else {
            return Enrichment::Unavailable;
        };
        let Some(_pass) = self.gate.try_enter() else {
            self.stats.short_busy += 1;
            debug!("short enrichment skipped, slot busy");
            return Enrichment::Busy;
        };

        let budget_ms = u64::try_from(self.short_timeout.as_millis()).unwrap_or(u64::MAX);
        match tokio::time::timeout(self.short_timeout, generator.generate_short(prompt)).await {
            Ok(Ok(raw)) => match sanitize_line(&raw) {
                Ok(line) => {
                    self.stats.short_hits += 1;
                    debug!(line = %line, "short enrichment line");
                    Enrichment::Line(line)
                }
                Err(e) => {
                    self.stats.short_misses += 1;
                    debug!(error = %e, "short enrichment unusable");
                    Enrichment::Failed
                }
            },
            Ok(Err(e)) => {
                self.stats.short_misses += 1;
                debug!(error = %e, "short enrichment failed");
                Enrichment::Failed
            }
            Err(_) => {
                self.stats.short_misses += 1;
                warn!(budget_ms, "short enrichment timed out");
                Enrichment::Failed
            }
        }
    }

    /// Canned-line chain: over-reaction, decisive, situational, behavior,
    /// emotion table, silence.
    pub fn fallback<R: RngCore + ?Sized>(
        &self,
        emotion: Emotion,
        ctx: &DrawContext,
        pattern: &BehaviorPattern,
        rng: &mut R,
    ) -> (String, LineSource) {
        let mut rng = RngAdapter(rng);

        if is_joker_overreaction(ctx) {
            let line = self
                .locale
                .pick("joker.overreaction", &mut rng)
                .unwrap_or_else(|| JOKER_FALLBACK.to_string());
            return (line, LineSource::JokerOverreaction);
        }

        if let Some(outcome) = decisive_outcome(ctx) {
            if let Some(line) = self.locale.pick(outcome.key(), &mut rng) {
                debug!(?outcome, "decisive line");
                return (line, LineSource::Decisive);
            }
        }

        if rng.r#gen::<f32>() < self.situational_chance {
            if let Some(line) = situational_key(emotion, ctx).and_then(|k| self.locale.pick(k, &mut rng)) {
                return (line, LineSource::Situational);
            }
        }

        if rng.r#gen::<f32>() < self.behavior_chance {
            if let Some(line) = behavior_key(emotion, pattern).and_then(|k| self.locale.pick(k, &mut rng)) {
                return (line, LineSource::Behavior);
            }
        }

        self.pick_static(emotion, &mut rng)
    }

    /// Uniform pick from the emotion's own pool, or silence.
    pub fn pick_static<R: RngCore + ?Sized>(&self, emotion: Emotion, rng: &mut R) -> (String, LineSource) {
        let mut rng = RngAdapter(rng);
        let key = format!("emotion.{}", emotion.as_str());
        match self.locale.pick(&key, &mut rng) {
            Some(line) if !line.trim().is_empty() => (line, LineSource::Static),
            _ => (SILENCE.to_string(), LineSource::Silence),
        }
    }

    /// Pick a line from `key`, if the pool has any.
    pub fn pick<R: RngCore + ?Sized>(&self, key: &str, rng: &mut R) -> Option<String> {
        self.locale.pick(key, &mut RngAdapter(rng))
    }

    /// Start long-form commentary on a background task.
    ///
    /// Returns `false` when no generator is attached, the slot is taken, or
    /// there is no Tokio runtime to run on. The result, if any, is sent on
    /// `tx` tagged with `session`.
    pub fn spawn_commentary(
        &mut self,
        prompt: ReactionPrompt,
        session: SessionId,
        emotion: Emotion,
        tx: UnboundedSender<Commentary>,
    ) -> bool {
        let Some(generator) = self.generator.as_ref().filter(|g| g.is_available()).map(Arc::clone) else {
            return false;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime, turning-point commentary skipped");
            return false;
        };
        let Some(pass) = self.gate.try_enter() else {
            debug!("commentary skipped, slot busy");
            return false;
        };

        let budget = self.long_timeout;
        handle.spawn(async move {
            let _pass = pass;
            let text = match tokio::time::timeout(budget, generator.generate_long(&prompt)).await {
                Ok(Ok(raw)) => sanitize_line(&raw).ok(),
                Ok(Err(e)) => {
                    debug!(error = %e, "commentary failed");
                    None
                }
                Err(_) => {
                    warn!(budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX), "commentary timed out");
                    None
                }
            };
            if let Some(text) = text {
                if tx.send(Commentary { session, emotion, text }).is_err() {
                    trace!("commentary receiver dropped");
                }
            }
        });
        true
    }
}

/// Lets generic RNGs, sized or not, be handed to [`LocalizationStore::pick`].
struct RngAdapter<'a, R: RngCore + ?Sized>(&'a mut R);

impl<R: RngCore + ?Sized> RngCore for RngAdapter<'_, R> {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}
