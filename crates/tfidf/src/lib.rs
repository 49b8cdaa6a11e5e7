//! TF-IDF vector spaces over word n-grams.
//!
//! A [`VectorSpace`] is fitted once per scoring corpus. Its vectors are L2
//! normalized, so cosine similarity is a sparse dot product. Every vector
//! carries the [`SpaceId`] of the space that produced it and [`cosine`]
//! rejects mixed spaces with [`TfidfError::SpaceMismatch`].
//!
//! Weights follow the classical vectorizer:
//! `tf * (ln((1 + n) / (1 + df)) + 1)` with smoothing,
//! `tf * (ln(n / df) + 1)` without.
//!
//! ```rust
//! use tfidf::{cosine, TfidfConfig, VectorSpace};
//!
//! let corpus = vec![vec!["cats", "and", "dogs"], vec!["unrelated", "text"]];
//! let (space, vectors) = VectorSpace::fit(&corpus, TfidfConfig::default(), false).unwrap();
//! let query = space.transform(&["cats", "and", "dogs"]);
//! assert!(cosine(&query, &vectors[0]).unwrap() > 0.99);
//! assert_eq!(cosine(&query, &vectors[1]).unwrap(), 0.0);
//! ```

mod config;
mod error;
mod space;
mod stop_words;
mod vector;

pub use crate::config::{StopWords, TfidfConfig};
pub use crate::error::TfidfError;
pub use crate::space::VectorSpace;
pub use crate::vector::{cosine, SpaceId, SparseVector};
