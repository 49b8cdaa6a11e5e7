//! Band/row selection.
//!
//! With `b` bands of `r` rows, a pair with Jaccard `s` becomes a candidate
//! with probability `1 - (1 - s^r)^b`. For a threshold `t` we pick the layout
//! minimising the weighted sum of the false-positive area (below `t`) and the
//! false-negative area (above `t`) under that curve.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LshError;

const INTEGRATION_STEPS: usize = 100;
const FALSE_POSITIVE_WEIGHT: f64 = 0.5;
const FALSE_NEGATIVE_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LshParams {
    pub bands: usize,
    pub rows: usize,
}

impl LshParams {
    pub fn new(bands: usize, rows: usize) -> Self {
        Self { bands, rows }
    }

    /// Optimal layout for `threshold` using at most `signature_size` slots.
    pub fn for_threshold(signature_size: usize, threshold: f64) -> Result<Self, LshError> {
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(LshError::InvalidThreshold(threshold));
        }
        if signature_size == 0 {
            return Err(LshError::InvalidParams {
                bands: 0,
                rows: 0,
                signature_size,
            });
        }

        let mut best = Self::new(1, signature_size);
        let mut best_error = f64::MAX;
        for bands in 1..=signature_size {
            for rows in 1..=signature_size / bands {
                let candidate = Self::new(bands, rows);
                let error = FALSE_POSITIVE_WEIGHT * candidate.false_positive_area(threshold)
                    + FALSE_NEGATIVE_WEIGHT * candidate.false_negative_area(threshold);
                if error < best_error {
                    best_error = error;
                    best = candidate;
                }
            }
        }
        debug!(
            threshold,
            signature_size,
            bands = best.bands,
            rows = best.rows,
            error = best_error,
            "lsh_params_chosen"
        );
        Ok(best)
    }

    pub fn validate(&self, signature_size: usize) -> Result<(), LshError> {
        if self.bands == 0 || self.rows == 0 || self.bands * self.rows > signature_size {
            return Err(LshError::InvalidParams {
                bands: self.bands,
                rows: self.rows,
                signature_size,
            });
        }
        Ok(())
    }

    /// Probability that a pair with Jaccard `similarity` shares a band.
    pub fn candidate_probability(&self, similarity: f64) -> f64 {
        1.0 - (1.0 - similarity.powi(self.rows as i32)).powi(self.bands as i32)
    }

    fn false_positive_area(&self, threshold: f64) -> f64 {
        integrate(|s| self.candidate_probability(s), 0.0, threshold)
    }

    fn false_negative_area(&self, threshold: f64) -> f64 {
        integrate(|s| 1.0 - self.candidate_probability(s), threshold, 1.0)
    }
}

/// Midpoint rule.
fn integrate(f: impl Fn(f64) -> f64, a: f64, b: f64) -> f64 {
    let step = (b - a) / INTEGRATION_STEPS as f64;
    (0..INTEGRATION_STEPS)
        .map(|i| f(a + (i as f64 + 0.5) * step))
        .sum::<f64>()
        * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_layouts_for_128_slots() {
        assert_eq!(LshParams::for_threshold(128, 0.1), Ok(LshParams::new(64, 2)));
        assert_eq!(LshParams::for_threshold(128, 0.5), Ok(LshParams::new(25, 5)));
        assert_eq!(LshParams::for_threshold(128, 0.8), Ok(LshParams::new(9, 13)));
    }

    #[test]
    fn layout_fits_signature() {
        for size in [1, 7, 64, 200] {
            for t in [0.05, 0.3, 0.9] {
                let p = LshParams::for_threshold(size, t).expect("valid");
                assert!(p.validate(size).is_ok(), "size {size} t {t}");
            }
        }
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        for t in [0.0, 1.0, -0.2, f64::NAN] {
            assert!(LshParams::for_threshold(128, t).is_err());
        }
    }

    #[test]
    fn higher_threshold_is_stricter() {
        let loose = LshParams::for_threshold(128, 0.2).expect("valid");
        let strict = LshParams::for_threshold(128, 0.8).expect("valid");
        assert!(loose.candidate_probability(0.4) > strict.candidate_probability(0.4));
    }

    #[test]
    fn validate_rejects_oversized_layout() {
        assert!(LshParams::new(16, 9).validate(128).is_err());
        assert!(LshParams::new(0, 4).validate(128).is_err());
        assert!(LshParams::new(16, 8).validate(128).is_ok());
    }
}
