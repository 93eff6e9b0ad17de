//! Completion, lookup and edit results handed back to the editor.

use pi_lex::text::is_letter_or_digit;
use serde::{Deserialize, Serialize};

/// One completion candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Text inserted when the candidate is chosen.
    pub text: String,
    /// Text shown in the candidate list; `text` when empty.
    pub label: String,
    /// Icon category, e.g. `function`, `var`, `type`, `keyword`.
    pub icon: String,
    pub desc: String,
}

impl Completion {
    #[must_use]
    pub fn new(text: &str, icon: &str) -> Self {
        Self {
            text: text.to_string(),
            icon: icon.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    #[must_use]
    pub fn desc(mut self, desc: &str) -> Self {
        self.desc = desc.to_string();
        self
    }

    #[must_use]
    pub fn display(&self) -> &str {
        if self.label.is_empty() {
            &self.text
        } else {
            &self.label
        }
    }
}

/// Candidates for the text before the cursor, filtered by `seed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matches {
    pub seed: String,
    pub matches: Vec<Completion>,
}

impl Matches {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Sorts by exact-seed match first, then by label, and drops duplicates.
    pub fn rank(&mut self) {
        let seed = self.seed.clone();
        self.matches.sort_by(|a, b| {
            let exact = |c: &Completion| c.text != seed;
            exact(a)
                .cmp(&exact(b))
                .then_with(|| a.display().cmp(b.display()))
        });
        self.matches.dedup_by(|a, b| a.text == b.text && a.label == b.label);
    }
}

/// Documentation or definition for the term under the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookup {
    pub filename: String,
    pub text: String,
    /// Zero-based line range of the definition, end exclusive.
    pub start_line: u32,
    pub end_line: u32,
}

impl Lookup {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filename.is_empty() && self.text.is_empty()
    }
}

/// How to apply a chosen completion at the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// Replaces the seed before the cursor.
    pub new_text: String,
    /// Characters after the cursor to delete.
    pub forward_delete: usize,
}

/// Candidates from `words` starting with `seed`.
#[must_use]
pub fn seed_matches<'a>(seed: &str, words: impl IntoIterator<Item = &'a str>, icon: &str) -> Vec<Completion> {
    words
        .into_iter()
        .filter(|w| w.starts_with(seed))
        .map(|w| Completion::new(w, icon))
        .collect()
}

/// The edit for `completion` when `after` is the text following the cursor:
/// the rest of a partially typed identifier is deleted.
#[must_use]
pub fn edit_word(after: &str, completion: &Completion) -> Edit {
    let forward_delete = after
        .chars()
        .take_while(|c| is_letter_or_digit(*c))
        .count();
    Edit {
        new_text: completion.text.clone(),
        forward_delete,
    }
}
