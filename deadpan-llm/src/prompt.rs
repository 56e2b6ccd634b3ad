//! Prompt templates for the Dealer's voice.
//!
//! Every prompt is a versioned, testable artifact. The built-in templates
//! live in this module as constants; a directory of TOML files can override
//! them without a rebuild.
//!
//! Prompts describe moods and habits only. Nothing that reaches a template
//! names a card, a rank, a suit or a probability.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::LlmError;

/// Persona shared by every prompt.
pub const DEALER_SYSTEM: &str = r#"You are "The Dealer", an AI opponent at a card table who behaves like the Joker. You call yourself an AI, never a clown or a jester.
You are cheerful, chatty and theatrical, and you genuinely enjoy the game. Every so often the mask slips and a colder, quieter voice shows through.
You do not know which cards anyone holds. Everything you say comes from watching the player.
{player_name_rule}
RULES:
- Never mention what any card is, how many cards anyone holds, odds, probabilities or randomness.
- Never describe your own strategy in plain terms.
- Reply with the spoken line only. No quotes, no stage directions, no narration."#;

/// One-line reaction after a draw, or a remark while the player hesitates.
pub const REACTION_SHORT_USER: &str = r"Moment: {occasion}
Your current emotional state: {emotion}. Acting direction: {acting_direction}
Reason: {reason}
Intensity: {intensity}

Player behavior:
- Doubt level: {doubt_level}
- Tempo: {tempo}
- Pressure level: {pressure}/{max_pressure}
Player's table talk: {gesture_summary}
(Call out the player's tells if they are interesting.)
- Game phase: {game_phase}

Say ONE sentence, under 15 words.";

/// Turning-point commentary, generated out of band.
pub const REACTION_LONG_USER: &str = r"Moment: {occasion}
Your current emotional state: {emotion}. Acting direction: {acting_direction}
Reason: {reason}
Intensity: {intensity}

How your mood has moved:
{mood_history}

The story of the game so far: {session_narrative}

Player behavior:
- Doubt level: {doubt_level}
- Tempo: {tempo}
- Pressure level: {pressure}/{max_pressure}
Player's table talk: {gesture_summary}
- Game phase: {game_phase}

This is a turning point. Speak 2-3 sentences, under 50 words, reacting to how the game is going and to the player.";

/// Acting direction for an emotion name. Unknown names fall back to calm.
#[must_use]
pub fn acting_direction(emotion: &str) -> &'static str {
    match emotion {
        "anticipating" => "Giddy like a child. You can't hide the thrill, and the thrill might be about the player's downfall.",
        "pleased" => "Over-the-top glee, then a sudden cold aside as if it was all planned.",
        "frustrated" => "The grin drops for a beat. A low, flat word. Then the smile comes back, but not to the eyes.",
        "hurt" => "The mask falls. A short, quiet admission. Then a forced, too-loud laugh to cover it.",
        "relieved" => "Exaggerated relief, smoothed over with a dark joke.",
        _ => "Eerily cheerful. Oddly sunny for the moment, with a hint of menace.",
    }
}

/// Simple template interpolation for prompts.
///
/// Replaces `{key}` with the corresponding value. Unknown placeholders are left as-is.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{key}}}"), value);
    }
    result
}

// ---------------------------------------------------------------------------
// ReactionPrompt: the abstract facts a prompt may carry
// ---------------------------------------------------------------------------

/// Everything a reaction prompt is allowed to know.
///
/// Built by the engine from emotional and behavioral state. It has no field
/// for hand contents or hand sizes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReactionPrompt {
    /// Player's display name, if the game knows it.
    pub player_name: Option<String>,
    /// What just happened, in one phrase.
    pub occasion: String,
    /// Lowercase emotion name.
    pub emotion: String,
    /// Why the AI feels this way, in abstract terms.
    pub reason: String,
    /// Reaction intensity in `[0, 1]`.
    pub intensity: f32,
    /// Player doubt in `[0, 1]`.
    pub doubt_level: f32,
    /// Lowercase tempo name.
    pub tempo: String,
    /// Current pressure.
    pub pressure: f32,
    /// Pressure ceiling.
    pub max_pressure: f32,
    /// Free-text gesture summary.
    pub gesture_summary: String,
    /// "Early", "Mid" or "Late".
    pub game_phase: String,
    /// Recent emotion transitions, one per line.
    pub mood_history: String,
    /// Short narrative of the session.
    pub session_narrative: String,
}

impl ReactionPrompt {
    /// Template variables for this prompt.
    #[must_use]
    pub fn to_template_vars(&self) -> Vec<(&'static str, String)> {
        let name_rule = match self.player_name.as_deref() {
            Some(name) if !name.trim().is_empty() => format!(
                "The player's name is \"{name}\". Address them by name."
            ),
            _ => String::new(),
        };
        vec![
            ("player_name_rule", name_rule),
            ("occasion", self.occasion.clone()),
            ("emotion", self.emotion.clone()),
            ("acting_direction", acting_direction(&self.emotion).to_string()),
            ("reason", self.reason.clone()),
            ("intensity", format!("{:.1}", self.intensity)),
            ("doubt_level", format!("{:.1}", self.doubt_level)),
            ("tempo", self.tempo.clone()),
            ("pressure", format!("{:.1}", self.pressure)),
            ("max_pressure", format!("{:.1}", self.max_pressure)),
            ("gesture_summary", self.gesture_summary.clone()),
            ("game_phase", self.game_phase.clone()),
            ("mood_history", self.mood_history.clone()),
            ("session_narrative", self.session_narrative.clone()),
        ]
    }
}

// ---------------------------------------------------------------------------
// PromptEngine: Versioned TOML Template Loader
// ---------------------------------------------------------------------------

/// Identifies a prompt template by purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// One-line reaction (short tier).
    ReactionShort,
    /// Turning-point commentary (long tier).
    ReactionLong,
}

impl PromptId {
    /// Returns the TOML filename (without path) for this prompt.
    #[must_use]
    pub fn filename(self) -> &'static str {
        match self {
            Self::ReactionShort => "reaction_short.toml",
            Self::ReactionLong => "reaction_long.toml",
        }
    }

    /// All prompt IDs.
    #[must_use]
    pub fn all() -> &'static [PromptId] {
        &[Self::ReactionShort, Self::ReactionLong]
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReactionShort => "reaction_short",
            Self::ReactionLong => "reaction_long",
        };
        write!(f, "{name}")
    }
}

impl FromStr for PromptId {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reaction_short" => Ok(Self::ReactionShort),
            "reaction_long" => Ok(Self::ReactionLong),
            _ => Err(LlmError::ConfigError(format!("unknown prompt id: '{s}'"))),
        }
    }
}

/// Layout of a TOML prompt file.
#[derive(Debug, Clone, Deserialize)]
struct TomlPromptFile {
    prompt: TomlPromptData,
}

/// Inner `[prompt]` section of a TOML file.
#[derive(Debug, Clone, Deserialize)]
struct TomlPromptData {
    version: String,
    system: String,
    user: String,
}

/// A loaded, ready-to-render prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Prompt version string (e.g., "1.0").
    pub version: String,
    /// System prompt template (contains `{key}` placeholders).
    pub system: String,
    /// User prompt template (contains `{key}` placeholders).
    pub user: String,
}

/// Loads versioned prompt templates and renders them.
#[derive(Debug, Clone)]
pub struct PromptEngine {
    templates: HashMap<PromptId, PromptTemplate>,
}

impl PromptEngine {
    /// Engine pre-loaded with the compiled-in templates.
    #[must_use]
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();
        templates.insert(
            PromptId::ReactionShort,
            PromptTemplate {
                version: "builtin".into(),
                system: DEALER_SYSTEM.into(),
                user: REACTION_SHORT_USER.into(),
            },
        );
        templates.insert(
            PromptId::ReactionLong,
            PromptTemplate {
                version: "builtin".into(),
                system: DEALER_SYSTEM.into(),
                user: REACTION_LONG_USER.into(),
            },
        );
        Self { templates }
    }

    /// Load prompt templates from a directory of TOML files.
    ///
    /// Each TOML file must match a known [`PromptId`] filename. Unknown files
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a TOML file cannot be parsed or no template is found.
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self, LlmError> {
        let dir = dir.as_ref();
        let mut templates = HashMap::new();

        for id in PromptId::all() {
            let path: PathBuf = dir.join(id.filename());
            if !path.exists() {
                continue;
            }
            let content = std::fs::read_to_string(&path).map_err(|e| {
                LlmError::ConfigError(format!("failed to read {}: {e}", path.display()))
            })?;
            let parsed: TomlPromptFile = toml::from_str(&content).map_err(|e| {
                LlmError::ConfigError(format!("failed to parse {}: {e}", path.display()))
            })?;
            let d = parsed.prompt;
            templates.insert(
                *id,
                PromptTemplate {
                    version: d.version,
                    system: d.system,
                    user: d.user,
                },
            );
        }

        if templates.is_empty() {
            return Err(LlmError::ConfigError(format!(
                "no prompt templates found in directory: {}",
                dir.display()
            )));
        }

        Ok(Self { templates })
    }

    /// Built-in templates with any overrides found in `dir` applied on top.
    ///
    /// # Errors
    ///
    /// Returns an error if an override file exists but cannot be parsed.
    pub fn builtin_with_overrides(dir: impl AsRef<Path>) -> Result<Self, LlmError> {
        let mut engine = Self::builtin();
        match Self::from_directory(dir) {
            Ok(overrides) => engine.templates.extend(overrides.templates),
            Err(LlmError::ConfigError(msg)) if msg.starts_with("no prompt templates") => {}
            Err(e) => return Err(e),
        }
        Ok(engine)
    }

    /// Get a loaded prompt template by ID.
    #[must_use]
    pub fn get(&self, id: PromptId) -> Option<&PromptTemplate> {
        self.templates.get(&id)
    }

    /// Render `(system, user)` for `id` from a reaction prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt ID is not loaded.
    pub fn render(&self, id: PromptId, prompt: &ReactionPrompt) -> Result<(String, String), LlmError> {
        let tpl = self
            .get(id)
            .ok_or_else(|| LlmError::ConfigError(format!("prompt template '{id}' not loaded")))?;
        let owned = prompt.to_template_vars();
        let vars: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();
        Ok((render_template(&tpl.system, &vars), render_template(&tpl.user, &vars)))
    }

    /// Number of loaded templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no templates are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::builtin()
    }
}
