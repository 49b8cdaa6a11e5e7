//! Banded MinHash LSH.
//!
//! Each signature is cut into `b` bands of `r` rows; two signatures are
//! candidates when any band hashes to the same bucket. The index has two
//! phases expressed as two types:
//!
//! - [`LshBuilder`] accepts inserts (empty until the first one)
//! - [`LshIndex`] is produced by [`LshBuilder::freeze`] and only answers
//!   queries, so inserting after a query cannot compile
//!
//! ```rust
//! use lsh::{LshBuilder, LshParams};
//!
//! let params = LshParams::for_threshold(8, 0.5).unwrap();
//! let mut builder = LshBuilder::new(params, 8).unwrap();
//! builder.insert("doc", &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
//! let index = builder.freeze();
//! assert_eq!(index.query(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap(), vec!["doc"]);
//! ```

mod error;
mod index;
mod params;

pub use crate::error::LshError;
pub use crate::index::{LshBuilder, LshIndex};
pub use crate::params::LshParams;
