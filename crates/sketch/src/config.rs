//! Configuration and error types for shingling and MinHash.
//!
//! Sketches are a pure function of `(tokens, config)`: no I/O, no clock, no
//! environment. Two runs with the same seed produce bit-identical signatures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seed used when a run does not pick its own.
pub const DEFAULT_SEED: u64 = 0xF00D_BAAD_F00D_BAAD;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SketchConfig {
    /// Number of consecutive tokens per shingle.
    ///
    /// Paragraphs with fewer tokens than this have an empty shingle set and
    /// never reach the candidate index.
    pub shingle_size: usize,
    /// Number of MinHash permutations (signature length).
    pub signature_size: usize,
    /// Seed for token hashing and the permutation family.
    pub seed: u64,
    /// Compute signature slots on the rayon pool.
    pub use_parallel: bool,
}

impl SketchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shingle_size(mut self, shingle_size: usize) -> Self {
        self.shingle_size = shingle_size;
        self
    }

    pub fn with_signature_size(mut self, signature_size: usize) -> Self {
        self.signature_size = signature_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    pub fn validate(&self) -> Result<(), SketchError> {
        if self.shingle_size < 1 {
            return Err(SketchError::InvalidShingleSize {
                shingle_size: self.shingle_size,
            });
        }
        if self.signature_size < 1 {
            return Err(SketchError::InvalidSignatureSize {
                signature_size: self.signature_size,
            });
        }
        Ok(())
    }
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            shingle_size: 3,
            signature_size: 128,
            seed: DEFAULT_SEED,
            use_parallel: false,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SketchError {
    #[error("invalid config: shingle_size must be >= 1 (got {shingle_size})")]
    InvalidShingleSize { shingle_size: usize },

    #[error("invalid config: signature_size must be >= 1 (got {signature_size})")]
    InvalidSignatureSize { signature_size: usize },

    #[error("signature length mismatch: {left} vs {right}")]
    SignatureLengthMismatch { left: usize, right: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(SketchConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_sizes() {
        assert_eq!(
            SketchConfig::default().with_shingle_size(0).validate(),
            Err(SketchError::InvalidShingleSize { shingle_size: 0 })
        );
        assert_eq!(
            SketchConfig::default().with_signature_size(0).validate(),
            Err(SketchError::InvalidSignatureSize { signature_size: 0 })
        );
    }

    #[test]
    fn serde_round_trip() {
        let cfg = SketchConfig::default().with_shingle_size(5).with_seed(7);
        let json = serde_json::to_string(&cfg).expect("serialize");
        let back: SketchConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(cfg, back);
    }
}
