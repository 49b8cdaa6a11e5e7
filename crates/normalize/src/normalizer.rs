use std::fmt;
use std::time::Instant;

use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn, Level};

use crate::code::{CodeCanonicalizer, PythonLikeCanonicalizer};
use crate::config::NormalizeConfig;
use crate::error::{CodeParseError, NormalizeError};
use crate::paragraph::{split_paragraph_bytes, split_paragraphs};
use crate::text::canonical_text;
use crate::token::{tokenize, Token};

/// How a paragraph's tokens were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphKind {
    Prose,
    Code,
}

/// A paragraph that survived normalization with at least one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedParagraph {
    /// Position among the document's non-blank paragraphs, 0-based.
    pub index: usize,
    /// Canonical text for prose, trimmed source for code. Token offsets point
    /// into this string.
    pub text: String,
    pub tokens: Vec<Token>,
    pub kind: ParagraphKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedParagraph {
    pub index: usize,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFallback {
    pub index: usize,
    pub error: String,
}

/// Result of normalizing one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedText {
    pub paragraphs: Vec<NormalizedParagraph>,
    /// Paragraphs rejected because of malformed input.
    pub skipped: Vec<SkippedParagraph>,
    /// Paragraphs detected as code whose parse failed; they were tokenized as
    /// prose instead.
    pub code_fallbacks: Vec<CodeFallback>,
    /// Paragraphs with no tokens after normalization.
    pub dropped_empty: usize,
}

impl NormalizedText {
    pub fn code_paragraphs(&self) -> usize {
        self.paragraphs
            .iter()
            .filter(|p| p.kind == ParagraphKind::Code)
            .count()
    }
}

/// Turns raw document text into normalized, tokenized paragraphs.
///
/// Constructed once per run and shared by reference; it holds no mutable
/// state, so `normalize` can be called from many threads at once.
pub struct Normalizer {
    cfg: NormalizeConfig,
    code: Box<dyn CodeCanonicalizer>,
    stemmer: Option<Stemmer>,
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("cfg", &self.cfg)
            .field("code", &self.code.name())
            .field("stemmer", &self.stemmer.is_some())
            .finish()
    }
}

impl Normalizer {
    /// Validates the config, installs the default code strategy and loads
    /// the stemmer when stemming is enabled.
    pub fn new(cfg: NormalizeConfig) -> Result<Self, NormalizeError> {
        cfg.validate()?;
        let stemmer = cfg.stem.then(|| Stemmer::create(Algorithm::English));
        Ok(Self {
            cfg,
            code: Box::new(PythonLikeCanonicalizer),
            stemmer,
        })
    }

    /// Replaces the code canonicalization strategy.
    pub fn with_code_strategy(mut self, strategy: Box<dyn CodeCanonicalizer>) -> Self {
        self.code = strategy;
        self
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.cfg
    }

    pub fn normalize(&self, raw: &str) -> NormalizedText {
        let span = tracing::span!(Level::DEBUG, "normalize.document", bytes = raw.len());
        let _guard = span.enter();
        let started = Instant::now();

        let mut out = NormalizedText::default();
        for para in split_paragraphs(raw) {
            self.push_paragraph(para.index, para.text, &mut out);
        }
        log_outcome(&out, started);
        out
    }

    /// Like [`Normalizer::normalize`], but decodes each paragraph on its own
    /// so one malformed paragraph is skipped rather than the whole document.
    pub fn normalize_bytes(&self, raw: &[u8]) -> NormalizedText {
        let span = tracing::span!(Level::DEBUG, "normalize.document", bytes = raw.len());
        let _guard = span.enter();
        let started = Instant::now();

        let mut out = NormalizedText::default();
        for para in split_paragraph_bytes(raw) {
            match std::str::from_utf8(para.bytes) {
                Ok(text) => self.push_paragraph(para.index, text, &mut out),
                Err(err) => {
                    let error = NormalizeError::InvalidEncoding {
                        paragraph: para.index,
                        valid_up_to: err.valid_up_to(),
                    };
                    warn!(paragraph = para.index, %error, "paragraph_skipped");
                    out.skipped.push(SkippedParagraph {
                        index: para.index,
                        error: error.to_string(),
                    });
                }
            }
        }
        log_outcome(&out, started);
        out
    }

    fn push_paragraph(&self, index: usize, text: &str, out: &mut NormalizedText) {
        if self.cfg.code_aware && self.code.detect(text) {
            match self.code.canonicalize(text) {
                Ok(tokens) => {
                    out.paragraphs.push(NormalizedParagraph {
                        index,
                        text: text.to_string(),
                        tokens,
                        kind: ParagraphKind::Code,
                    });
                    return;
                }
                Err(error) => self.record_fallback(index, error, out),
            }
        }

        let canonical = canonical_text(text, &self.cfg);
        let mut tokens = tokenize(&canonical);
        if let Some(stemmer) = &self.stemmer {
            // Offsets keep pointing at the surface word in `canonical`.
            for token in &mut tokens {
                token.text = stemmer.stem(&token.text).into_owned();
            }
        }
        if tokens.is_empty() {
            out.dropped_empty += 1;
            return;
        }
        out.paragraphs.push(NormalizedParagraph {
            index,
            text: canonical,
            tokens,
            kind: ParagraphKind::Prose,
        });
    }

    fn record_fallback(&self, index: usize, error: CodeParseError, out: &mut NormalizedText) {
        warn!(
            paragraph = index,
            strategy = self.code.name(),
            %error,
            "code_parse_fallback"
        );
        out.code_fallbacks.push(CodeFallback {
            index,
            error: error.to_string(),
        });
    }
}

fn log_outcome(out: &NormalizedText, started: Instant) {
    debug!(
        paragraphs = out.paragraphs.len(),
        skipped = out.skipped.len(),
        code_fallbacks = out.code_fallbacks.len(),
        dropped_empty = out.dropped_empty,
        elapsed_micros = started.elapsed().as_micros() as u64,
        "normalize_done"
    );
}
