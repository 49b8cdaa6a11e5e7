use thiserror::Error;

use crate::vector::SpaceId;

/// Contract violations in the vector-space layer. Always fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TfidfError {
    #[error("invalid ngram_range ({min}, {max}): need 1 <= min <= max")]
    InvalidNgramRange { min: usize, max: usize },

    #[error("vectors from different spaces compared: {left} vs {right}")]
    SpaceMismatch { left: SpaceId, right: SpaceId },
}
