//! The session façade the game loop talks to.
//!
//! One [`ReactionEngine`] per table. It owns every tracker, drives the
//! per-turn flow and hands finished lines to the presentation sink:
//!
//! ```text
//! record_player_action ─▶ behavior + pressure
//! determine_expectation ─▶ turn += 1, Anticipating, Neutral/Stop/Bait
//! evaluate_reaction    ─▶ emotion, intensity, line, pressure delta
//! request_commentary   ─▶ background long-form line (turning points only)
//! drain_commentary     ─▶ lines from this session, stale ones discarded
//! ```
//!
//! Collaborators are injected through [`ReactionEngineBuilder`]. Every
//! public operation is total: missing collaborators or failing backends
//! only reduce dialogue variety.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use deadpan_core::emotion::{EmotionLog, EmotionTrigger, resolve};
use deadpan_core::reaction::{self, hover_key};
use deadpan_core::summary::SessionSummary;
use deadpan_core::{
    BehaviorPattern, BehaviorTracker, DeadpanConfig, DrawContext, Emotion, EmotionalResult, Expectation,
    ExpectationEngine, GestureKind, GestureTracker, LocalizationStore, PressureTracker, SessionId,
    TableLocalization,
};
use deadpan_llm::{GateStats, LlmError, TextGenerator};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::bridge::{
    HOVER_OCCASION, MoodSnapshot, TURNING_POINT_OCCASION, draw_occasion, hover_reason, llm_client_from_config,
    reaction_reason,
};
use crate::pipeline::{Commentary, Enrichment, PipelineStats, ResponsePipeline};
use crate::sink::{NullSink, Presentation, PresentationKind, PresentationSink};

/// Intensity used for gesture answers.
const GESTURE_INTENSITY: f32 = 0.4;

/// Intensity used for turning-point commentary.
const COMMENTARY_INTENSITY: f32 = 1.0;

/// Engine-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Enrichment slot admissions.
    pub gate: GateStats,
    /// Short-tier outcomes.
    pub pipeline: PipelineStats,
    /// Commentary tasks started.
    pub commentary_requested: u64,
    /// Commentary delivered to this session.
    pub commentary_delivered: u64,
    /// Commentary that arrived after a reset.
    pub commentary_discarded: u64,
    /// Hover remarks spoken.
    pub hover_lines: u64,
    /// Hover remarks dropped for cooldown or contention.
    pub hover_dropped: u64,
    /// Gesture answers spoken.
    pub gesture_reactions: u64,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Assembles a [`ReactionEngine`] from config and collaborators.
#[derive(Default)]
pub struct ReactionEngineBuilder {
    config: DeadpanConfig,
    generator: Option<Arc<dyn TextGenerator>>,
    locale: Option<Arc<dyn LocalizationStore>>,
    sink: Option<Arc<dyn PresentationSink>>,
    seed: Option<u64>,
}

impl ReactionEngineBuilder {
    /// Use `config` for every tunable.
    #[must_use]
    pub fn config(mut self, config: DeadpanConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a text generator.
    #[must_use]
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Attach the HTTP client described by the `[llm]` section of the
    /// config set so far. The `none` provider attaches nothing.
    ///
    /// # Errors
    /// Returns the provider or prompt-loading error.
    pub fn llm_from_config(mut self) -> Result<Self, LlmError> {
        if let Some(client) = llm_client_from_config(&self.config.llm)? {
            self.generator = Some(Arc::new(client));
        }
        Ok(self)
    }

    /// Use `locale` for canned lines. Defaults to the built-in English table.
    #[must_use]
    pub fn locale(mut self, locale: Arc<dyn LocalizationStore>) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Send lines to `sink`. Defaults to [`NullSink`].
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn PresentationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Seed the RNG. Overrides `general.rng_seed`.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the engine.
    ///
    /// A config that fails [`DeadpanConfig::validate`] is replaced by the
    /// defaults, with a warning.
    #[must_use]
    pub fn build(self) -> ReactionEngine {
        let config = match self.config.validate() {
            Ok(()) => self.config,
            Err(e) => {
                warn!(error = %e, "invalid config, falling back to defaults");
                DeadpanConfig::default()
            }
        };

        let locale = self.locale.unwrap_or_else(|| {
            debug!("no localization store supplied, using built-in English lines");
            Arc::new(TableLocalization::english())
        });

        let mut pipeline = ResponsePipeline::new(locale)
            .with_timeouts(
                Duration::from_millis(config.llm.short_timeout_ms),
                Duration::from_millis(config.llm.long_timeout_ms),
            )
            .with_chances(config.dialogue.situational_chance, config.dialogue.behavior_chance);
        match self.generator {
            Some(generator) => pipeline = pipeline.with_generator(generator),
            None => warn!("no text generator configured, running on canned lines only"),
        }

        let rng = match self.seed.or(config.general.rng_seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let (commentary_tx, commentary_rx) = mpsc::unbounded_channel();
        let session = SessionId::new();
        info!(%session, enabled = config.general.enabled, "reaction engine ready");

        ReactionEngine {
            session,
            clock: 0.0,
            turn_count: 0,
            expectation: Expectation::Neutral,
            emotions: EmotionLog::new(),
            behavior: BehaviorTracker::new(config.behavior.clone()),
            gestures: GestureTracker::new(config.gestures.clone()),
            expectations: ExpectationEngine::new(config.expectation.clone()),
            pressure: PressureTracker::new(config.pressure.clone()),
            pipeline,
            sink: self.sink.unwrap_or_else(|| Arc::new(NullSink)),
            history: VecDeque::with_capacity(config.dialogue.history_cap),
            rng,
            last_hover_at: None,
            commentary_tx,
            commentary_rx,
            stats: EngineStats::default(),
            config,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Opponent psychology for one table.
pub struct ReactionEngine {
    config: DeadpanConfig,
    session: SessionId,
    clock: f64,
    turn_count: u32,
    expectation: Expectation,
    emotions: EmotionLog,
    behavior: BehaviorTracker,
    gestures: GestureTracker,
    expectations: ExpectationEngine,
    pressure: PressureTracker,
    pipeline: ResponsePipeline,
    sink: Arc<dyn PresentationSink>,
    history: VecDeque<EmotionalResult>,
    rng: StdRng,
    last_hover_at: Option<f64>,
    commentary_tx: UnboundedSender<Commentary>,
    commentary_rx: UnboundedReceiver<Commentary>,
    stats: EngineStats,
}

impl std::fmt::Debug for ReactionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactionEngine")
            .field("session", &self.session)
            .field("clock", &self.clock)
            .field("turn_count", &self.turn_count)
            .field("expectation", &self.expectation)
            .field("emotion", &self.emotions.current())
            .field("pressure", &self.pressure.level())
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl ReactionEngine {
    /// Start building an engine.
    #[must_use]
    pub fn builder() -> ReactionEngineBuilder {
        ReactionEngineBuilder::default()
    }

    /// Engine with `config`, built-in lines and no text generator.
    #[must_use]
    pub fn new(config: DeadpanConfig) -> Self {
        Self::builder().config(config).build()
    }

    // -- accessors -----------------------------------------------------------

    /// Current session id. Changes on every reset.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session
    }

    /// Seconds of session time advanced through [`Self::tick`].
    #[must_use]
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &DeadpanConfig {
        &self.config
    }

    /// Current emotion.
    #[must_use]
    pub fn current_emotion(&self) -> Emotion {
        self.emotions.current()
    }

    /// Expectation held for the current turn.
    #[must_use]
    pub fn current_expectation(&self) -> Expectation {
        self.expectation
    }

    /// Turns started since the last reset.
    #[must_use]
    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    /// Current pressure.
    #[must_use]
    pub fn pressure(&self) -> f32 {
        self.pressure.level()
    }

    /// Current behavior read.
    #[must_use]
    pub fn behavior(&self) -> &BehaviorPattern {
        self.behavior.pattern()
    }

    /// Emotion and recent transitions.
    #[must_use]
    pub fn emotion_log(&self) -> &EmotionLog {
        &self.emotions
    }

    /// Free-text description of recent gestures.
    #[must_use]
    pub fn gesture_summary(&self) -> String {
        self.gestures.summary()
    }

    /// Recent reactions, oldest first.
    pub fn reaction_history(&self) -> impl ExactSizeIterator<Item = &EmotionalResult> {
        self.history.iter()
    }

    /// Summary of the reactions still in history.
    #[must_use]
    pub fn session_summary(&self) -> SessionSummary {
        SessionSummary::from_history(self.history.iter(), self.pressure.peak())
    }

    /// Whether `ctx` justifies long-form commentary.
    #[must_use]
    pub fn is_turning_point(&self, ctx: &DrawContext) -> bool {
        reaction::is_turning_point(ctx)
    }

    /// Counters.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            gate: self.pipeline.gate_stats(),
            pipeline: self.pipeline.stats(),
            ..self.stats
        }
    }

    // -- game loop -----------------------------------------------------------

    /// Advance session time by `dt` seconds; pressure decays.
    pub fn tick(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.clock += dt;
            self.pressure.tick(dt);
        }
    }

    /// Force pressure to `level`, clamped. For debug tooling.
    pub fn set_pressure(&mut self, level: f32) {
        self.pressure.set(level);
    }

    /// Record a player pick at the current session time.
    ///
    /// `position` is the picked index within a hand of `total_cards`.
    pub fn record_player_action(
        &mut self,
        position: usize,
        hover_duration: f32,
        decision_time: f32,
        total_cards: usize,
        hover_count: u32,
    ) -> &BehaviorPattern {
        let now = self.clock;
        self.record_player_action_at(position, hover_duration, decision_time, total_cards, hover_count, now)
    }

    /// Record a player pick at an explicit timestamp in seconds.
    pub fn record_player_action_at(
        &mut self,
        position: usize,
        hover_duration: f32,
        decision_time: f32,
        total_cards: usize,
        hover_count: u32,
        timestamp: f64,
    ) -> &BehaviorPattern {
        let pattern = self
            .behavior
            .record_action(position, total_cards, hover_duration, decision_time, hover_count, timestamp)
            .clone();
        let raised = self.pressure.observe_behavior(&pattern);
        if raised > 0.0 {
            debug!(raised, level = self.pressure.level(), "hesitation read as pressure");
        }
        self.behavior.pattern()
    }

    /// Record a table-talk gesture at the current session time.
    pub fn record_gesture(&mut self, kind: GestureKind, card_index: Option<usize>) {
        self.gestures.record(kind, card_index, self.clock);
    }

    /// Decide what the AI braces for before this turn's draw.
    ///
    /// Starts a new turn and always moves the emotion to `Anticipating`.
    pub fn determine_expectation(&mut self) -> Expectation {
        self.turn_count += 1;
        self.emotions
            .transition(Emotion::Anticipating, EmotionTrigger::TurnStart, self.clock);
        self.expectation = self.expectations.determine(
            self.behavior.pattern(),
            self.pressure.level(),
            self.turn_count,
            &mut self.rng,
        );
        info!(turn = self.turn_count, expectation = %self.expectation, "expectation set");
        self.expectation
    }

    /// React to a draw. Always returns a result with a non-empty line.
    pub async fn evaluate_reaction(&mut self, ctx: &DrawContext) -> EmotionalResult {
        let expectation = self.expectation;
        let emotion = resolve(expectation, ctx);
        self.emotions.transition(emotion, EmotionTrigger::from_draw(ctx), self.clock);

        let intensity = reaction::intensity(expectation, ctx, self.pressure.level());
        let is_turning_point = reaction::is_turning_point(ctx);
        let pattern = self.behavior.pattern().clone();

        let (line, source) = if self.config.general.enabled {
            let reason = reaction_reason(self.pipeline.locale(), emotion, expectation);
            let prompt = self.snapshot().prompt(draw_occasion(ctx), reason, intensity);
            self.pipeline
                .dialogue(emotion, ctx, &pattern, &prompt, &mut self.rng)
                .await
        } else {
            self.pipeline.fallback(emotion, ctx, &pattern, &mut self.rng)
        };

        let pressure_delta = self
            .pressure
            .apply_reaction(emotion, ctx.is_player_turn, ctx.drawn_card_is_joker);

        let result = EmotionalResult {
            expectation,
            emotion,
            reaction_intensity: intensity,
            dialogue_line: line,
            line_source: source,
            pressure_delta,
            is_turning_point,
        };

        self.history.push_back(result.clone());
        while self.history.len() > self.config.dialogue.history_cap {
            self.history.pop_front();
        }

        info!(
            %expectation,
            %emotion,
            intensity,
            source = ?source,
            turning_point = is_turning_point,
            line = %result.dialogue_line,
            "reaction"
        );
        self.present(PresentationKind::Reaction, &result.dialogue_line, emotion, intensity);
        result
    }

    /// Back to a fresh table: new session id, calm, neutral, empty history.
    ///
    /// Commentary still in flight for the old session is discarded when it
    /// arrives.
    pub fn reset_system(&mut self) {
        let old = self.session;
        self.session = SessionId::new();
        self.clock = 0.0;
        self.turn_count = 0;
        self.expectation = Expectation::Neutral;
        self.emotions.reset();
        self.behavior.clear_history();
        self.gestures.clear();
        self.pressure.reset();
        self.history.clear();
        self.last_hover_at = None;
        // Anything already queued belongs to the old session.
        self.drain_commentary();
        info!(old = %old, new = %self.session, "session reset");
    }

    // -- optional remarks ----------------------------------------------------

    /// A remark while the player hesitates.
    ///
    /// `None` when remarks are off, inside the cooldown, or another request
    /// holds the enrichment slot.
    pub async fn hover_dialogue(&mut self) -> Option<String> {
        if !self.config.general.enabled || !self.config.dialogue.hover_enabled {
            return None;
        }
        let cooling = self
            .last_hover_at
            .is_some_and(|last| self.clock - last < self.config.dialogue.hover_cooldown_secs);
        if cooling || self.pipeline.is_busy() {
            self.stats.hover_dropped += 1;
            debug!(cooling, "hover remark dropped");
            return None;
        }

        let level = self.pressure.level();
        let intensity = if self.pressure.max() > 0.0 { level / self.pressure.max() } else { 0.0 };
        let prompt = self
            .snapshot()
            .prompt(HOVER_OCCASION, hover_reason(self.behavior.pattern()), intensity);

        let line = match self.pipeline.enrich_short(&prompt).await {
            Enrichment::Line(line) => line,
            Enrichment::Busy => {
                self.stats.hover_dropped += 1;
                return None;
            }
            Enrichment::Failed | Enrichment::Unavailable => self.pipeline.pick(hover_key(level), &mut self.rng)?,
        };

        self.last_hover_at = Some(self.clock);
        self.stats.hover_lines += 1;
        let emotion = self.emotions.current();
        self.present(PresentationKind::Hover, &line, emotion, intensity.clamp(0.0, 1.0));
        Some(line)
    }

    /// Maybe answer a player gesture.
    pub fn react_to_gesture(&mut self, kind: GestureKind) -> Option<String> {
        if !self.config.general.enabled {
            return None;
        }
        let emotion = self.emotions.current();
        let mut chance = self.config.dialogue.gesture_reaction_chance;
        match emotion {
            Emotion::Frustrated => chance += 0.2,
            Emotion::Pleased => chance += 0.1,
            _ => {}
        }
        if self.rng.r#gen::<f32>() > chance {
            return None;
        }
        let key = format!("gesture.reaction_{}", kind.as_str());
        let line = self.pipeline.pick(&key, &mut self.rng)?;
        self.stats.gesture_reactions += 1;
        debug!(gesture = %kind, line = %line, "gesture answered");
        self.present(PresentationKind::Gesture, &line, emotion, GESTURE_INTENSITY);
        Some(line)
    }

    /// Ask for long-form commentary on a turning point.
    ///
    /// Returns whether a request was started. Results arrive through
    /// [`Self::drain_commentary`].
    pub fn request_commentary(&mut self, ctx: &DrawContext) -> bool {
        if !self.config.general.enabled || !reaction::is_turning_point(ctx) {
            return false;
        }
        let emotion = self.emotions.current();
        let reason = reaction_reason(self.pipeline.locale(), emotion, self.expectation);
        let intensity = reaction::intensity(self.expectation, ctx, self.pressure.level());
        let prompt = self.snapshot().prompt(TURNING_POINT_OCCASION, reason, intensity);
        let started = self
            .pipeline
            .spawn_commentary(prompt, self.session, emotion, self.commentary_tx.clone());
        if started {
            self.stats.commentary_requested += 1;
            debug!(%emotion, "commentary requested");
        }
        started
    }

    /// Commentary that has arrived for the current session.
    pub fn drain_commentary(&mut self) -> Vec<Commentary> {
        let mut delivered = Vec::new();
        while let Ok(commentary) = self.commentary_rx.try_recv() {
            if commentary.session == self.session {
                self.stats.commentary_delivered += 1;
                self.present(
                    PresentationKind::Commentary,
                    &commentary.text,
                    commentary.emotion,
                    COMMENTARY_INTENSITY,
                );
                delivered.push(commentary);
            } else {
                self.stats.commentary_discarded += 1;
                debug!(stale = %commentary.session, "late commentary discarded");
            }
        }
        delivered
    }

    // -- internals -----------------------------------------------------------

    fn snapshot(&self) -> MoodSnapshot<'_> {
        MoodSnapshot {
            player_name: self.config.dialogue.player_name.as_deref(),
            emotion: self.emotions.current(),
            pattern: self.behavior.pattern(),
            pressure: self.pressure.level(),
            max_pressure: self.pressure.max(),
            gesture_summary: self.gestures.summary(),
            turn_count: self.turn_count,
            mood_history: self.emotions.context_summary(),
            session_narrative: self.session_summary().narrative(),
        }
    }

    fn present(&self, kind: PresentationKind, text: &str, emotion: Emotion, intensity: f32) {
        if !self.config.general.enabled {
            return;
        }
        self.sink.present(&Presentation {
            session: self.session,
            kind,
            text: text.to_string(),
            emotion,
            intensity,
        });
    }
}
