//! Token n-gram shingling.
//!
//! Shingles are rolling polynomial hashes over per-token xxh3 hashes, so
//! producing all of them is O(n) in the number of tokens regardless of the
//! shingle size. Each shingle remembers the index of its first token, which
//! is what the highlighter needs to map shared shingles back onto text.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::minhash::splitmix64;

/// One n-gram of consecutive tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shingle {
    pub hash: u64,
    /// Index of the first token covered by this shingle.
    pub start: usize,
}

/// Compute rolling-hash shingles deterministically in O(n).
///
/// Returns an empty vector when `n == 0` or when there are fewer than `n`
/// tokens. The hash depends only on the token texts, their order and the
/// seed, never on where the n-gram occurs.
pub fn shingles<S: AsRef<str>>(tokens: &[S], n: usize, seed: u64) -> Vec<Shingle> {
    let len = tokens.len();
    if n == 0 || len < n {
        return Vec::new();
    }
    let th: Vec<u64> = tokens
        .iter()
        .map(|t| xxh3_64_with_seed(t.as_ref().as_bytes(), seed))
        .collect();

    const BASE: u64 = 1_000_003;
    let base = BASE ^ splitmix64(seed);

    // base^(n-1) removes the oldest token from the window.
    let mut base_nm1 = 1u64;
    for _ in 1..n {
        base_nm1 = base_nm1.wrapping_mul(base);
    }

    let mut out = Vec::with_capacity(len - n + 1);
    let mut h = 0u64;
    for &val in th.iter().take(n) {
        h = h.wrapping_mul(base).wrapping_add(val);
    }
    out.push(Shingle { hash: h, start: 0 });

    for (start, (&old, &new)) in th.iter().zip(th.iter().skip(n)).enumerate() {
        h = h.wrapping_sub(old.wrapping_mul(base_nm1));
        h = h.wrapping_mul(base).wrapping_add(new);
        out.push(Shingle {
            hash: h,
            start: start + 1,
        });
    }
    out
}

/// The distinct shingle hashes of a paragraph, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShingleSet {
    hashes: Vec<u64>,
}

impl ShingleSet {
    pub fn from_shingles(shingles: &[Shingle]) -> Self {
        Self::from_hashes(shingles.iter().map(|s| s.hash))
    }

    pub fn from_hashes(hashes: impl IntoIterator<Item = u64>) -> Self {
        let mut hashes: Vec<u64> = hashes.into_iter().collect();
        hashes.sort_unstable();
        hashes.dedup();
        Self { hashes }
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.hashes
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn contains(&self, hash: u64) -> bool {
        self.hashes.binary_search(&hash).is_ok()
    }

    /// Hashes present in both sets, ascending.
    pub fn intersection(&self, other: &ShingleSet) -> Vec<u64> {
        let (mut i, mut j) = (0, 0);
        let mut out = Vec::new();
        while i < self.hashes.len() && j < other.hashes.len() {
            match self.hashes[i].cmp(&other.hashes[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    out.push(self.hashes[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        out
    }

    /// Exact Jaccard similarity. Two empty sets have similarity 0.
    pub fn jaccard(&self, other: &ShingleSet) -> f64 {
        let inter = self.intersection(other).len();
        let union = self.len() + other.len() - inter;
        if union == 0 {
            return 0.0;
        }
        inter as f64 / union as f64
    }
}
