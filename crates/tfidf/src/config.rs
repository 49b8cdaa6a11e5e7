use serde::{Deserialize, Serialize};

use crate::error::TfidfError;
use crate::stop_words::ENGLISH_STOP_WORDS;

/// Terms removed before n-gram generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopWords {
    #[default]
    None,
    English,
    Custom(Vec<String>),
}

impl StopWords {
    pub(crate) fn contains(&self, term: &str) -> bool {
        match self {
            StopWords::None => false,
            StopWords::English => ENGLISH_STOP_WORDS.binary_search(&term).is_ok(),
            StopWords::Custom(words) => words.iter().any(|w| w == term),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TfidfConfig {
    /// Inclusive range of word n-gram lengths.
    pub ngram_range: (usize, usize),
    /// Add one to document frequencies, as if an extra document contained
    /// every term once. Prevents zero divisions for unseen terms.
    pub smooth_idf: bool,
    /// Replace raw term counts with `1 + ln(tf)`.
    pub sublinear_tf: bool,
    #[serde(default)]
    pub stop_words: StopWords,
}

impl TfidfConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ngram_range(mut self, min: usize, max: usize) -> Self {
        self.ngram_range = (min, max);
        self
    }

    pub fn with_smooth_idf(mut self, enabled: bool) -> Self {
        self.smooth_idf = enabled;
        self
    }

    pub fn with_sublinear_tf(mut self, enabled: bool) -> Self {
        self.sublinear_tf = enabled;
        self
    }

    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }

    pub fn validate(&self) -> Result<(), TfidfError> {
        let (min, max) = self.ngram_range;
        if min < 1 || max < min {
            return Err(TfidfError::InvalidNgramRange { min, max });
        }
        Ok(())
    }
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            ngram_range: (1, 3),
            smooth_idf: true,
            sublinear_tf: false,
            stop_words: StopWords::None,
        }
    }
}
