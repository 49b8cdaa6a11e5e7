use serde::{Deserialize, Serialize};
use thiserror::Error;

use lsh::{LshError, LshParams};
use sketch::{SketchConfig, SketchError, DEFAULT_SEED};
use tfidf::{TfidfConfig, TfidfError};

/// Run configuration for one detection pass.
///
/// Normalization settings (including `code_aware`) live on the injected
/// [`normalize::Normalizer`]; everything downstream of tokens is here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectConfig {
    /// Tokens per shingle for the candidate stage.
    pub shingle_size: usize,
    /// MinHash signature length.
    pub signature_size: usize,
    /// Seed for token hashing and MinHash permutations.
    #[serde(default = "DetectConfig::default_seed")]
    pub seed: u64,
    /// Use the LSH candidate stage. When off, every reference paragraph is
    /// scored exactly.
    pub use_lsh: bool,
    /// Jaccard threshold the LSH band layout is tuned for, in `(0, 1)`.
    pub lsh_threshold: f64,
    /// Explicit band layout overriding the threshold-derived one.
    #[serde(default)]
    pub lsh_params: Option<LshParams>,
    /// Exact-scoring vector space settings, including `ngram_range`.
    #[serde(default)]
    pub tfidf: TfidfConfig,
    /// Matches kept per submission document.
    pub topk: usize,
    /// Minimum cosine for a paragraph match or collusion comparison to count.
    pub min_score: f64,
    /// Process documents and paragraphs on the rayon pool.
    #[serde(default = "DetectConfig::default_parallel")]
    pub use_parallel: bool,
}

impl DetectConfig {
    pub(crate) fn default_seed() -> u64 {
        DEFAULT_SEED
    }

    pub(crate) fn default_parallel() -> bool {
        true
    }

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

    pub fn with_lsh(mut self, use_lsh: bool) -> Self {
        self.use_lsh = use_lsh;
        self
    }

    pub fn with_lsh_threshold(mut self, threshold: f64) -> Self {
        self.lsh_threshold = threshold;
        self
    }

    pub fn with_lsh_params(mut self, params: LshParams) -> Self {
        self.lsh_params = Some(params);
        self
    }

    pub fn with_tfidf(mut self, tfidf: TfidfConfig) -> Self {
        self.tfidf = tfidf;
        self
    }

    pub fn with_ngram_range(mut self, min: usize, max: usize) -> Self {
        self.tfidf.ngram_range = (min, max);
        self
    }

    pub fn with_topk(mut self, topk: usize) -> Self {
        self.topk = topk;
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    pub fn sketch_config(&self) -> SketchConfig {
        SketchConfig::default()
            .with_shingle_size(self.shingle_size)
            .with_signature_size(self.signature_size)
            .with_seed(self.seed)
    }

    /// Band layout for the candidate index: the explicit override if set,
    /// otherwise the layout optimised for `lsh_threshold`.
    pub fn resolve_lsh_params(&self) -> Result<LshParams, ConfigError> {
        match self.lsh_params {
            Some(params) => {
                params.validate(self.signature_size)?;
                Ok(params)
            }
            None => Ok(LshParams::for_threshold(
                self.signature_size,
                self.lsh_threshold,
            )?),
        }
    }

    /// A comparison counts when it reaches `min_score` and shares at least
    /// one term. A zero cosine is never reported.
    pub fn qualifies(&self, score: f64) -> bool {
        score > 0.0 && score >= self.min_score
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sketch_config().validate()?;
        self.tfidf.validate()?;
        if self.topk == 0 {
            return Err(ConfigError::InvalidTopK);
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(ConfigError::InvalidMinScore(self.min_score));
        }
        if !(self.lsh_threshold > 0.0 && self.lsh_threshold < 1.0) {
            return Err(ConfigError::Lsh(LshError::InvalidThreshold(
                self.lsh_threshold,
            )));
        }
        if let Some(params) = self.lsh_params {
            params.validate(self.signature_size)?;
        }
        Ok(())
    }
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            shingle_size: 3,
            signature_size: 128,
            seed: DEFAULT_SEED,
            use_lsh: true,
            lsh_threshold: 0.1,
            lsh_params: None,
            tfidf: TfidfConfig::default(),
            topk: 5,
            min_score: 0.0,
            use_parallel: true,
        }
    }
}

/// Fatal configuration problems, raised before any text is processed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("topk must be >= 1")]
    InvalidTopK,

    #[error("min_score must be within [0, 1], got {0}")]
    InvalidMinScore(f64),

    #[error(transparent)]
    Sketch(#[from] SketchError),

    #[error(transparent)]
    Lsh(#[from] LshError),

    #[error(transparent)]
    Tfidf(#[from] TfidfError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = DetectConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.topk, 5);
        assert_eq!(cfg.min_score, 0.0);
        assert_eq!(cfg.tfidf.ngram_range, (1, 3));
    }

    #[test]
    fn invalid_values_rejected() {
        assert_eq!(
            DetectConfig::default().with_topk(0).validate(),
            Err(ConfigError::InvalidTopK)
        );
        assert_eq!(
            DetectConfig::default().with_min_score(1.5).validate(),
            Err(ConfigError::InvalidMinScore(1.5))
        );
        assert!(matches!(
            DetectConfig::default().with_shingle_size(0).validate(),
            Err(ConfigError::Sketch(_))
        ));
        assert!(matches!(
            DetectConfig::default().with_lsh_threshold(1.0).validate(),
            Err(ConfigError::Lsh(_))
        ));
        assert!(matches!(
            DetectConfig::default().with_ngram_range(2, 1).validate(),
            Err(ConfigError::Tfidf(_))
        ));
        assert!(matches!(
            DetectConfig::default()
                .with_lsh_params(LshParams::new(32, 8))
                .validate(),
            Err(ConfigError::Lsh(_))
        ));
    }

    #[test]
    fn explicit_params_override_threshold() {
        let cfg = DetectConfig::default().with_lsh_params(LshParams::new(16, 8));
        assert_eq!(cfg.resolve_lsh_params(), Ok(LshParams::new(16, 8)));
        let derived = DetectConfig::default().resolve_lsh_params().expect("valid");
        assert_eq!(derived, LshParams::new(64, 2));
    }

    #[test]
    fn zero_scores_never_qualify() {
        let cfg = DetectConfig::default();
        assert!(!cfg.qualifies(0.0));
        assert!(cfg.qualifies(0.01));
        let strict = DetectConfig::default().with_min_score(0.5);
        assert!(!strict.qualifies(0.49));
        assert!(strict.qualifies(0.5));
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{
            "shingle_size": 4, "signature_size": 64, "use_lsh": false,
            "lsh_threshold": 0.4, "topk": 3, "min_score": 0.2
        }"#;
        let cfg: DetectConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(cfg.seed, DEFAULT_SEED);
        assert!(cfg.use_parallel);
        assert_eq!(cfg.tfidf, TfidfConfig::default());
        assert!(cfg.validate().is_ok());
    }
}
