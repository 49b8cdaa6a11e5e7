use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// A token with its UTF-8 byte offsets in the text it was produced from.
///
/// Prose tokens point into the paragraph's canonical text; code tokens point
/// at the lexeme in the raw source that produced the syntactic node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Token {
    /// The token text content.
    pub text: String,
    /// Byte offset (inclusive).
    pub start: usize,
    /// Byte offset (exclusive).
    pub end: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        self.text.as_str()
    }
}

/// Splits text into word tokens on Unicode word boundaries (UAX #29).
///
/// Only segments containing at least one alphanumeric character are kept, so
/// punctuation-only and whitespace segments never become tokens. The result
/// is deterministic and independent of the process locale.
pub fn tokenize(text: &str) -> Vec<Token> {
    text.unicode_word_indices()
        .filter(|(_, word)| word.chars().any(char::is_alphanumeric))
        .map(|(start, word)| Token {
            text: word.to_string(),
            start,
            end: start + word.len(),
        })
        .collect()
}
