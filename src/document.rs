//! Document representation for similarity and scoring.
//!
//! A document is an identifier plus raw text. Tokens, word counts and
//! sentence splits are derived on demand and never stored, because the
//! corpus a document is compared against changes with every evaluation.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EvaluatorError, Result};

/// A piece of text taking part in an evaluation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier (submission id, file name, ...).
    pub id: String,
    /// Raw text content.
    pub text: String,
}

impl Document {
    /// Create a document from raw text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Load a text file as a document named after its file stem.
    pub fn from_text_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| EvaluatorError::io(path, e))?;

        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();

        Ok(Self { id, text })
    }

    /// Lowercase token stream of the document.
    pub fn tokens(&self) -> Vec<String> {
        tokenize(&self.text)
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }

    /// Number of non-blank sentences.
    pub fn sentence_count(&self) -> usize {
        sentences(&self.text).count()
    }
}

/// Split text into case-folded word tokens.
///
/// Anything that is not alphanumeric or `_` separates tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Iterate over the non-blank sentences of `text`, delimited by runs of `.`, `!` or `?`.
pub fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        let tokens = tokenize("Hello, World! It's snake_case 42.");
        assert_eq!(
            tokens,
            vec!["hello", "world", "it", "s", "snake_case", "42"]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ... !!! ").is_empty());
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("one two\nthree\tfour"), 4);
    }

    #[test]
    fn test_sentences_collapse_delimiter_runs() {
        let text = "First one. Second one!!! Third?! ...";
        let parts: Vec<&str> = sentences(text).collect();
        assert_eq!(parts, vec!["First one", "Second one", "Third"]);
    }

    #[test]
    fn test_sentences_without_punctuation() {
        let doc = Document::new("d", "no punctuation here at all");
        assert_eq!(doc.sentence_count(), 1);
        assert_eq!(doc.word_count(), 5);
    }

    #[test]
    fn test_from_text_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("essay.txt");
        std::fs::write(&path, "Some essay text.").unwrap();

        let doc = Document::from_text_file(&path).unwrap();
        assert_eq!(doc.id, "essay");
        assert_eq!(doc.text, "Some essay text.");

        assert!(Document::from_text_file(&dir.path().join("missing.txt")).is_err());
    }
}
