//! The `TextGenerator` seam between the engine and any text backend.
//!
//! The engine only ever sees this trait. [`crate::LlmClient`] implements it
//! over HTTP; tests and offline builds plug in their own.

use async_trait::async_trait;

use crate::error::LlmError;
use crate::prompt::ReactionPrompt;

/// Produces a spoken line for a reaction prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// One short sentence. The caller bounds this with its own timeout.
    ///
    /// # Errors
    /// Any failure; the caller falls back to canned lines.
    async fn generate_short(&self, prompt: &ReactionPrompt) -> Result<String, LlmError>;

    /// Two or three sentences for a turning point.
    ///
    /// # Errors
    /// Any failure; the caller simply drops the commentary.
    async fn generate_long(&self, prompt: &ReactionPrompt) -> Result<String, LlmError>;

    /// Whether calling this generator can ever succeed.
    fn is_available(&self) -> bool {
        true
    }
}

/// Clean raw model output into a speakable line.
///
/// Trims whitespace and removes every double quote (straight or curly).
///
/// # Errors
/// Returns [`LlmError::EmptyResponse`] when nothing is left.
pub fn sanitize_line(raw: &str) -> Result<String, LlmError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '"' | '\u{201C}' | '\u{201D}'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        Err(LlmError::EmptyResponse)
    } else {
        Ok(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_quotes_and_whitespace() {
        assert_eq!(sanitize_line("  \"Heh. Nice try.\"\n").expect("line"), "Heh. Nice try.");
        assert_eq!(sanitize_line("\u{201C}Oh?\u{201D}").expect("line"), "Oh?");
    }

    #[test]
    fn keeps_apostrophes() {
        assert_eq!(sanitize_line("Don't.").expect("line"), "Don't.");
    }

    #[test]
    fn empty_after_cleaning_is_an_error() {
        assert!(matches!(sanitize_line("   "), Err(LlmError::EmptyResponse)));
        assert!(matches!(sanitize_line("\"\""), Err(LlmError::EmptyResponse)));
    }
}
