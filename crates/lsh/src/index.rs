use std::fmt::Debug;
use std::hash::Hash;

use hashbrown::{HashMap, HashSet};
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::error::LshError;
use crate::params::LshParams;

type Buckets<K> = Vec<HashMap<u64, Vec<K>>>;

/// Insert phase of the index. Accepts signatures until [`LshBuilder::freeze`].
#[derive(Debug, Clone)]
pub struct LshBuilder<K> {
    params: LshParams,
    signature_size: usize,
    buckets: Buckets<K>,
    keys: HashSet<K>,
}

impl<K> LshBuilder<K>
where
    K: Clone + Eq + Hash + Ord + Debug,
{
    pub fn new(params: LshParams, signature_size: usize) -> Result<Self, LshError> {
        params.validate(signature_size)?;
        Ok(Self {
            params,
            signature_size,
            buckets: (0..params.bands).map(|_| HashMap::new()).collect(),
            keys: HashSet::new(),
        })
    }

    pub fn params(&self) -> LshParams {
        self.params
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// `true` until the first insert.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn insert(&mut self, key: K, signature: &[u64]) -> Result<(), LshError> {
        check_length(self.signature_size, signature)?;
        if self.keys.contains(&key) {
            return Err(LshError::DuplicateKey(format!("{key:?}")));
        }
        for (band, bucket) in self.buckets.iter_mut().enumerate() {
            let h = band_hash(signature, band, self.params.rows);
            bucket.entry(h).or_default().push(key.clone());
        }
        self.keys.insert(key);
        Ok(())
    }

    /// Ends the insert phase. The returned index is read-only and can be
    /// shared across threads.
    pub fn freeze(self) -> LshIndex<K> {
        debug!(
            keys = self.keys.len(),
            bands = self.params.bands,
            rows = self.params.rows,
            "lsh_frozen"
        );
        LshIndex {
            params: self.params,
            signature_size: self.signature_size,
            buckets: self.buckets,
            len: self.keys.len(),
        }
    }
}

/// Query phase of the index.
#[derive(Debug, Clone)]
pub struct LshIndex<K> {
    params: LshParams,
    signature_size: usize,
    buckets: Buckets<K>,
    len: usize,
}

impl<K> LshIndex<K>
where
    K: Clone + Eq + Hash + Ord,
{
    pub fn params(&self) -> LshParams {
        self.params
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Keys sharing at least one band with `signature`, ascending.
    pub fn query(&self, signature: &[u64]) -> Result<Vec<K>, LshError> {
        check_length(self.signature_size, signature)?;
        let mut seen: HashSet<&K> = HashSet::new();
        for (band, bucket) in self.buckets.iter().enumerate() {
            let h = band_hash(signature, band, self.params.rows);
            if let Some(keys) = bucket.get(&h) {
                seen.extend(keys.iter());
            }
        }
        let mut out: Vec<K> = seen.into_iter().cloned().collect();
        out.sort_unstable();
        Ok(out)
    }
}

fn check_length(expected: usize, signature: &[u64]) -> Result<(), LshError> {
    if signature.len() != expected {
        return Err(LshError::SignatureLength {
            expected,
            got: signature.len(),
        });
    }
    Ok(())
}

fn band_hash(signature: &[u64], band: usize, rows: usize) -> u64 {
    let slots = &signature[band * rows..(band + 1) * rows];
    let mut bytes = Vec::with_capacity(rows * 8);
    for value in slots {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    xxh3_64_with_seed(&bytes, band as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch::{MinHasher, ShingleSet, SketchConfig};

    fn signature(hasher: &MinHasher, range: std::ops::Range<u64>) -> Vec<u64> {
        hasher
            .sketch(&ShingleSet::from_hashes(range))
            .as_slice()
            .to_vec()
    }

    fn hasher() -> MinHasher {
        MinHasher::new(SketchConfig::default()).expect("valid config")
    }

    #[test]
    fn near_duplicates_are_candidates() {
        let h = hasher();
        let params = LshParams::for_threshold(128, 0.5).expect("valid");
        let mut builder = LshBuilder::new(params, 128).expect("valid layout");
        builder.insert("a", &signature(&h, 0..100)).expect("insert");
        builder.insert("b", &signature(&h, 1000..1100)).expect("insert");
        let index = builder.freeze();

        let found = index.query(&signature(&h, 2..100)).expect("query");
        assert_eq!(found, vec!["a"]);
    }

    #[test]
    fn results_are_sorted_and_unique() {
        let h = hasher();
        let mut builder = LshBuilder::new(LshParams::new(16, 8), 128).expect("valid layout");
        let sig = signature(&h, 0..50);
        for key in [5u32, 3, 9, 1] {
            builder.insert(key, &sig).expect("insert");
        }
        let index = builder.freeze();
        assert_eq!(index.query(&sig).expect("query"), vec![1, 3, 5, 9]);
    }

    #[test]
    fn empty_index_returns_nothing() {
        let builder: LshBuilder<u32> =
            LshBuilder::new(LshParams::new(16, 8), 128).expect("valid layout");
        assert!(builder.is_empty());
        let index = builder.freeze();
        assert!(index.is_empty());
        assert!(index.query(&[0u64; 128]).expect("query").is_empty());
    }

    #[test]
    fn rejects_wrong_signature_length() {
        let mut builder = LshBuilder::new(LshParams::new(4, 4), 16).expect("valid layout");
        assert_eq!(
            builder.insert(1u32, &[0u64; 8]),
            Err(LshError::SignatureLength {
                expected: 16,
                got: 8
            })
        );
        let index = builder.freeze();
        assert!(index.query(&[0u64; 17]).is_err());
    }

    #[test]
    fn rejects_duplicate_keys() {
        let mut builder = LshBuilder::new(LshParams::new(4, 4), 16).expect("valid layout");
        builder.insert(7u32, &[1u64; 16]).expect("first insert");
        assert!(matches!(
            builder.insert(7u32, &[2u64; 16]),
            Err(LshError::DuplicateKey(_))
        ));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn rejects_layout_larger_than_signature() {
        assert!(LshBuilder::<u32>::new(LshParams::new(8, 4), 16).is_err());
    }
}
