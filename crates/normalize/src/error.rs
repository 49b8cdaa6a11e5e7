use thiserror::Error;

/// Errors raised by the normalizer.
///
/// `InvalidConfig` is fatal and surfaces before any text is processed.
/// `InvalidEncoding` is a per-paragraph input error: the paragraph is skipped
/// and recorded, the rest of the document is still normalized.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("paragraph {paragraph} is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidEncoding { paragraph: usize, valid_up_to: usize },
}

/// Structured-code canonicalization failure. Never fatal: the paragraph is
/// tokenized as prose instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodeParseError {
    #[error("line {line}: unexpected character {ch:?}")]
    UnexpectedChar { line: usize, ch: char },
    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },
    #[error("line {line}: unbalanced bracket {bracket:?}")]
    UnbalancedBracket { line: usize, bracket: char },
    #[error("line {line}: unindent does not match any outer indentation level")]
    InconsistentDedent { line: usize },
    #[error("line {line}: unexpected indent")]
    UnexpectedIndent { line: usize },
    #[error("line {line}: expected an indented block")]
    ExpectedBlock { line: usize },
    #[error("line {line}: invalid syntax near {near:?}")]
    InvalidSyntax { line: usize, near: String },
    #[error("no code tokens produced")]
    Empty,
}
