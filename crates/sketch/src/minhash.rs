//! MinHash signatures over shingle sets.
//!
//! A family of hash functions is derived from one 64-bit seed: slot `j` mixes
//! every shingle hash with a key from `splitmix64(seed + j * golden)` and
//! keeps the minimum. The fraction of agreeing slots between two signatures
//! is an unbiased estimate of the Jaccard similarity of the underlying sets.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::config::{SketchConfig, SketchError};
use crate::shingles::{shingles, Shingle, ShingleSet};

/// Fixed-length MinHash signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(Vec<u64>);

impl Signature {
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fraction of slots on which both signatures agree.
    pub fn estimate_jaccard(&self, other: &Signature) -> Result<f64, SketchError> {
        if self.len() != other.len() {
            return Err(SketchError::SignatureLengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        if self.is_empty() {
            return Ok(0.0);
        }
        let agree = self
            .0
            .iter()
            .zip(&other.0)
            .filter(|(a, b)| a == b)
            .count();
        Ok(agree as f64 / self.len() as f64)
    }
}

impl From<Vec<u64>> for Signature {
    fn from(values: Vec<u64>) -> Self {
        Self(values)
    }
}

/// Validated shingling and sketching parameters for one run.
#[derive(Debug, Clone)]
pub struct MinHasher {
    cfg: SketchConfig,
}

impl MinHasher {
    pub fn new(cfg: SketchConfig) -> Result<Self, SketchError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &SketchConfig {
        &self.cfg
    }

    pub fn signature_size(&self) -> usize {
        self.cfg.signature_size
    }

    /// Shingles a token stream with the configured size and seed.
    pub fn shingle<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<Shingle> {
        shingles(tokens, self.cfg.shingle_size, self.cfg.seed)
    }

    /// Compute a MinHash signature (parallel if `use_parallel` is set).
    ///
    /// An empty set yields a signature of all `u64::MAX`.
    pub fn sketch(&self, set: &ShingleSet) -> Signature {
        let m = self.cfg.signature_size;
        let unique = set.as_slice();
        if unique.is_empty() {
            return Signature(vec![u64::MAX; m]);
        }

        let mut result = Vec::with_capacity(m);
        if self.cfg.use_parallel {
            (0..m)
                .into_par_iter()
                .map(|j| compute_slot(unique, j, self.cfg.seed))
                .collect_into_vec(&mut result);
        } else {
            result.extend((0..m).map(|j| compute_slot(unique, j, self.cfg.seed)));
        }
        Signature(result)
    }
}

#[inline]
pub(crate) fn compute_slot(unique_shingles: &[u64], j: usize, seed: u64) -> u64 {
    let step = (j as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let key = splitmix64(seed.wrapping_add(step));
    unique_shingles
        .iter()
        .map(|&val| mix_u64(val, key))
        .min()
        .unwrap_or(u64::MAX)
}

#[inline]
pub(crate) fn mix_u64(x: u64, key: u64) -> u64 {
    let mut h = xxh3_64_with_seed(&x.to_le_bytes(), key);
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51afd7ed558ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ceb9fe1a85ec53);
    h ^ (h >> 33)
}

#[inline]
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
