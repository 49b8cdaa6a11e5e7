use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::TfidfError;

static NEXT_SPACE: AtomicU64 = AtomicU64::new(1);

/// Identity of a fitted vector space. Unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpaceId(u64);

impl SpaceId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SPACE.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "space#{}", self.0)
    }
}

/// L2-normalized sparse TF-IDF vector, entries sorted by dimension.
///
/// Only meaningful relative to the space that produced it; [`cosine`]
/// refuses to compare vectors from different spaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    space: SpaceId,
    entries: Vec<(u32, f64)>,
}

impl SparseVector {
    pub(crate) fn new(space: SpaceId, entries: Vec<(u32, f64)>) -> Self {
        Self { space, entries }
    }

    pub fn space(&self) -> SpaceId {
        self.space
    }

    pub fn entries(&self) -> &[(u32, f64)] {
        &self.entries
    }

    /// No term of this vector exists in its space.
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cosine similarity of two vectors from the same space, in `[0, 1]`.
///
/// Vectors are already unit length, so this is a sparse dot product. A zero
/// vector has similarity 0 with everything.
pub fn cosine(u: &SparseVector, v: &SparseVector) -> Result<f64, TfidfError> {
    if u.space != v.space {
        return Err(TfidfError::SpaceMismatch {
            left: u.space,
            right: v.space,
        });
    }
    let (a, b) = (&u.entries, &v.entries);
    let (mut i, mut j) = (0, 0);
    let mut dot = 0.0f64;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    Ok(dot.clamp(0.0, 1.0))
}
