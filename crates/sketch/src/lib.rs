//! Shingling and MinHash sketches.
//!
//! Works over token streams produced by the normalizer. The pipeline per
//! paragraph is `tokens -> shingles -> ShingleSet -> Signature`:
//!
//! ```rust
//! use sketch::{MinHasher, ShingleSet, SketchConfig};
//!
//! let hasher = MinHasher::new(SketchConfig::default()).unwrap();
//! let tokens = ["cats", "and", "dogs", "play"];
//! let set = ShingleSet::from_shingles(&hasher.shingle(&tokens));
//! let sig = hasher.sketch(&set);
//! assert_eq!(sig.len(), 128);
//! assert_eq!(sig.estimate_jaccard(&sig).unwrap(), 1.0);
//! ```
//!
//! Everything here is deterministic for a fixed seed and free of I/O.

mod config;
mod minhash;
mod shingles;

pub use crate::config::{SketchConfig, SketchError, DEFAULT_SEED};
pub use crate::minhash::{MinHasher, Signature};
pub use crate::shingles::{shingles, Shingle, ShingleSet};
