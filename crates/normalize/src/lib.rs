//! Paragraph normalization layer.
//!
//! Turns raw document text into an ordered list of paragraphs, each with a
//! canonical text and a token stream that shingling, TF-IDF and highlighting
//! all consume.
//!
//! ## What we do
//!
//! - Split on one or more blank lines, trim, drop empty blocks
//! - Unicode NFKC, locale-free lowercasing, punctuation as delimiter
//! - Unicode word tokenization with byte offsets
//! - Optional Snowball English stemming of prose tokens
//! - Optional code-aware tokenization: paragraphs that look like source are
//!   replaced by a stream of syntax-node kinds, falling back to prose on
//!   parse failure
//!
//! No I/O, no clock-dependent output, no locale. Same text and config give
//! the same tokens on any machine.
//!
//! ```rust
//! use normalize::{NormalizeConfig, Normalizer};
//!
//! let normalizer = Normalizer::new(NormalizeConfig::default()).unwrap();
//! let out = normalizer.normalize("Cats, and DOGS!\n\nSecond paragraph.");
//! assert_eq!(out.paragraphs.len(), 2);
//! assert_eq!(out.paragraphs[0].text, "cats and dogs");
//! ```

mod code;
mod config;
mod error;
mod normalizer;
mod paragraph;
mod text;
mod token;

pub use crate::code::{looks_like_code, CodeCanonicalizer, PythonLikeCanonicalizer};
pub use crate::config::NormalizeConfig;
pub use crate::error::{CodeParseError, NormalizeError};
pub use crate::normalizer::{
    CodeFallback, NormalizedParagraph, NormalizedText, Normalizer, ParagraphKind,
    SkippedParagraph,
};
pub use crate::paragraph::{
    split_paragraph_bytes, split_paragraphs, RawParagraph, RawParagraphBytes,
};
pub use crate::text::canonical_text;
pub use crate::token::{tokenize, Token};
