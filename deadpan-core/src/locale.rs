//! Localization store: where every canned line comes from.
//!
//! Lines are addressed by dot-separated keys (`emotion.pleased`,
//! `decisive.ai_wins`). A key maps either to a single string or to a pool of
//! alternatives the pipeline picks from at random.
//!
//! [`TableLocalization`] flattens a nested JSON document into such keys:
//!
//! ```json
//! { "emotion": { "pleased": ["Heh.", "As expected."] } }
//! ```
//!
//! becomes `emotion.pleased → ["Heh.", "As expected."]`.

use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::Value;
use tracing::warn;

use crate::error::{DeadpanError, Result};

/// Built-in English table.
const ENGLISH_TABLE: &str = include_str!("../assets/en.json");

/// Source of localized lines.
pub trait LocalizationStore: Send + Sync {
    /// Single string for `key`. Pools yield their first entry.
    fn get(&self, key: &str) -> Option<String>;

    /// Every alternative for `key`. Empty when the key is missing.
    fn get_array(&self, key: &str) -> Vec<String>;

    /// One alternative for `key`, chosen uniformly.
    fn pick(&self, key: &str, rng: &mut dyn rand::RngCore) -> Option<String> {
        let pool = self.get_array(key);
        if pool.is_empty() {
            return self.get(key);
        }
        let idx = rng.gen_range(0..pool.len());
        pool.into_iter().nth(idx)
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Text(String),
    Pool(Vec<String>),
}

/// In-memory table loaded from nested JSON.
#[derive(Debug, Clone, Default)]
pub struct TableLocalization {
    entries: HashMap<String, Entry>,
}

impl TableLocalization {
    /// An empty table; every lookup misses.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a nested JSON document.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed, the root is not an object,
    /// or a leaf is neither a string nor an array of strings.
    pub fn from_json(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json)?;
        let Value::Object(map) = root else {
            return Err(DeadpanError::Localization {
                key: String::new(),
                reason: "root must be an object".into(),
            });
        };
        let mut entries = HashMap::new();
        for (k, v) in map {
            flatten(&k, v, &mut entries)?;
        }
        Ok(Self { entries })
    }

    /// Load a nested JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// The built-in English table. Falls back to an empty table, with a
    /// warning, if the embedded document is ever malformed.
    #[must_use]
    pub fn english() -> Self {
        Self::from_json(ENGLISH_TABLE).unwrap_or_else(|e| {
            warn!(error = %e, "built-in English table failed to load");
            Self::empty()
        })
    }

    /// Overlay `other` on top of this table; its keys win.
    #[must_use]
    pub fn merged(mut self, other: Self) -> Self {
        self.entries.extend(other.entries);
        self
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl LocalizationStore for TableLocalization {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries.get(key)? {
            Entry::Text(s) => Some(s.clone()),
            Entry::Pool(v) => v.first().cloned(),
        }
    }

    fn get_array(&self, key: &str) -> Vec<String> {
        match self.entries.get(key) {
            Some(Entry::Pool(v)) => v.clone(),
            Some(Entry::Text(s)) => vec![s.clone()],
            None => Vec::new(),
        }
    }

    fn pick(&self, key: &str, rng: &mut dyn rand::RngCore) -> Option<String> {
        match self.entries.get(key)? {
            Entry::Text(s) => Some(s.clone()),
            Entry::Pool(v) => v.choose(rng).cloned(),
        }
    }
}

fn flatten(prefix: &str, value: Value, out: &mut HashMap<String, Entry>) -> Result<()> {
    match value {
        Value::String(s) => {
            out.insert(prefix.to_string(), Entry::Text(s));
        }
        Value::Array(items) => {
            let pool = items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(DeadpanError::Localization {
                        key: prefix.to_string(),
                        reason: format!("array entries must be strings, found {other}"),
                    }),
                })
                .collect::<Result<Vec<_>>>()?;
            out.insert(prefix.to_string(), Entry::Pool(pool));
        }
        Value::Object(map) => {
            for (k, v) in map {
                flatten(&format!("{prefix}.{k}"), v, out)?;
            }
        }
        other => {
            return Err(DeadpanError::Localization {
                key: prefix.to_string(),
                reason: format!("unsupported value {other}"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Emotion, GestureKind};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn flattens_nested_objects() {
        let t = TableLocalization::from_json(
            r#"{ "a": { "b": "x", "c": { "d": ["1", "2"] } }, "top": "t" }"#,
        )
        .expect("valid");
        assert_eq!(t.get("a.b").as_deref(), Some("x"));
        assert_eq!(t.get_array("a.c.d"), vec!["1", "2"]);
        assert_eq!(t.get("a.c.d").as_deref(), Some("1"));
        assert_eq!(t.get("top").as_deref(), Some("t"));
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn missing_keys_miss() {
        let t = TableLocalization::empty();
        assert!(t.get("nope").is_none());
        assert!(t.get_array("nope").is_empty());
        let mut rng = StdRng::seed_from_u64(0);
        assert!(t.pick("nope", &mut rng).is_none());
    }

    #[test]
    fn rejects_non_string_leaves() {
        let err = TableLocalization::from_json(r#"{ "a": { "b": 3 } }"#).expect_err("invalid");
        assert!(matches!(err, DeadpanError::Localization { ref key, .. } if key == "a.b"));
        assert!(TableLocalization::from_json(r#"["x"]"#).is_err());
        assert!(TableLocalization::from_json("{ not json").is_err());
    }

    #[test]
    fn merged_overrides_keys() {
        let base = TableLocalization::from_json(r#"{ "k": "base", "only": "b" }"#).expect("valid");
        let over = TableLocalization::from_json(r#"{ "k": "over" }"#).expect("valid");
        let t = base.merged(over);
        assert_eq!(t.get("k").as_deref(), Some("over"));
        assert_eq!(t.get("only").as_deref(), Some("b"));
    }

    #[test]
    fn pick_stays_in_pool() {
        let t = TableLocalization::from_json(r#"{ "p": ["a", "b", "c"] }"#).expect("valid");
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let line = t.pick("p", &mut rng).expect("pool not empty");
            assert!(["a", "b", "c"].contains(&line.as_str()));
        }
    }

    #[test]
    fn english_table_covers_every_pool() {
        let t = TableLocalization::english();
        assert!(!t.is_empty());
        for e in Emotion::ALL {
            assert!(!t.get_array(&format!("emotion.{e}")).is_empty(), "emotion.{e}");
        }
        for g in GestureKind::ALL {
            let key = format!("gesture.reaction_{}", g.as_str());
            assert!(t.contains(&key), "{key}");
        }
        for key in [
            "joker.overreaction",
            "decisive.ai_wins",
            "decisive.player_wins",
            "situation.endgame_pleased",
            "situation.endgame_frustrated",
            "situation.endgame_default",
            "situation.winning_pleased",
            "situation.winning_calm",
            "situation.losing_frustrated",
            "situation.losing_calm",
            "behavior.fast_calm",
            "behavior.fast_pleased",
            "behavior.fast_anticipating",
            "behavior.slow_calm",
            "behavior.slow_frustrated",
            "behavior.slow_anticipating",
            "behavior.doubt_pleased",
            "behavior.doubt_anticipating",
            "behavior.doubt_calm",
            "behavior.position_pleased",
            "behavior.position_calm",
            "hover.low",
            "hover.mid",
            "hover.high",
            "trigger.pleased_stop",
            "trigger.pleased_bait",
            "trigger.pleased_default",
            "trigger.frustrated_stop",
            "trigger.frustrated_bait",
            "trigger.frustrated_default",
            "trigger.hurt_default",
            "trigger.relieved_default",
            "trigger.anticipating_default",
            "trigger.calm_default",
        ] {
            assert!(t.contains(key), "{key}");
        }
    }
}
