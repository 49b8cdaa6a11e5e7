use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LshError {
    #[error("threshold must be in (0, 1), got {0}")]
    InvalidThreshold(f64),

    #[error("invalid band layout: {bands} bands x {rows} rows does not fit a signature of {signature_size}")]
    InvalidParams {
        bands: usize,
        rows: usize,
        signature_size: usize,
    },

    #[error("signature length {got} does not match index signature size {expected}")]
    SignatureLength { expected: usize, got: usize },

    #[error("key {0} already inserted")]
    DuplicateKey(String),
}
