//! Code-aware tokenization.
//!
//! A paragraph that looks like source code can be replaced by a stream of
//! syntax-node kinds, so two submissions that differ only in identifier names
//! or formatting produce the same tokens. The strategy is pluggable through
//! [`CodeCanonicalizer`]; the built-in [`PythonLikeCanonicalizer`] handles
//! indentation-structured source.

mod lexer;
mod parser;

use std::fmt::Debug;

use crate::error::CodeParseError;
use crate::token::Token;

/// A language-specific strategy for turning source code into structural tokens.
pub trait CodeCanonicalizer: Send + Sync + Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Cheap check deciding whether a paragraph should be parsed at all.
    fn detect(&self, text: &str) -> bool;

    /// Parses `text` and returns one token per syntax node, in source order.
    fn canonicalize(&self, text: &str) -> Result<Vec<Token>, CodeParseError>;
}

/// Heuristic used by [`PythonLikeCanonicalizer::detect`]: some line starts
/// with a function, class or import keyword.
pub fn looks_like_code(text: &str) -> bool {
    text.lines().map(str::trim_start).any(|line| {
        line.starts_with("def ")
            || line.starts_with("class ")
            || line.starts_with("import ")
            || line.starts_with("async def ")
            || (line.starts_with("from ") && line.contains(" import "))
    })
}

/// Canonicalizer for Python-like, indentation-structured source.
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonLikeCanonicalizer;

impl CodeCanonicalizer for PythonLikeCanonicalizer {
    fn name(&self) -> &'static str {
        "python-like"
    }

    fn detect(&self, text: &str) -> bool {
        looks_like_code(text)
    }

    fn canonicalize(&self, text: &str) -> Result<Vec<Token>, CodeParseError> {
        let lexemes = lexer::lex(text)?;
        parser::parse(&lexemes)
    }
}
