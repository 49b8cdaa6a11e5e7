//! YAML configuration for a detection run.
//!
//! One file carries every stage's settings. Missing sections and fields take
//! their defaults, so an empty document apart from `version` is valid.
//!
//! ## Example
//!
//! ```yaml
//! version: "1.0"
//! name: "cs101 spring term"
//!
//! normalize:
//!   version: 1
//!   normalize_unicode: true
//!   lowercase: true
//!   strip_punctuation: true
//!   code_aware: true
//!   stem: false
//!
//! sketch:
//!   shingle_size: 3
//!   signature_size: 128
//!   seed: 17297687000019483309
//!   use_parallel: true
//!
//! lsh:
//!   enabled: true
//!   threshold: 0.1
//!   # bands: 32
//!   # rows: 4
//!
//! tfidf:
//!   ngram_range: [1, 3]
//!   smooth_idf: true
//!   sublinear_tf: false
//!   stop_words: "none"      # "english", or a list of words
//!
//! report:
//!   topk: 5
//!   min_score: 0.2
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use detect::{ConfigError, DetectConfig, LshParams, NormalizeConfig, StopWords, TfidfConfig};
use sketch::DEFAULT_SEED;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("invalid detection settings: {0}")]
    Detect(#[from] ConfigError),
}

/// Top-level YAML configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OverlapConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub normalize: NormalizeYamlConfig,

    #[serde(default)]
    pub sketch: SketchYamlConfig,

    #[serde(default)]
    pub lsh: LshYamlConfig,

    #[serde(default)]
    pub tfidf: TfidfYamlConfig,

    #[serde(default)]
    pub report: ReportYamlConfig,
}

impl OverlapConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: OverlapConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.normalize.validate()?;
        self.sketch.validate()?;
        self.lsh.validate()?;
        self.tfidf.validate()?;
        self.report.validate()?;

        // Cross-field rules (band layout vs signature size and the like).
        self.to_detect_config()?.validate()?;
        Ok(())
    }

    pub fn to_normalize_config(&self) -> NormalizeConfig {
        NormalizeConfig {
            version: self.normalize.version,
            normalize_unicode: self.normalize.normalize_unicode,
            lowercase: self.normalize.lowercase,
            strip_punctuation: self.normalize.strip_punctuation,
            code_aware: self.normalize.code_aware,
            stem: self.normalize.stem,
        }
    }

    pub fn to_detect_config(&self) -> Result<DetectConfig, ConfigLoadError> {
        let mut cfg = DetectConfig::default()
            .with_shingle_size(self.sketch.shingle_size)
            .with_signature_size(self.sketch.signature_size)
            .with_seed(self.sketch.seed)
            .with_parallel(self.sketch.use_parallel)
            .with_lsh(self.lsh.enabled)
            .with_lsh_threshold(self.lsh.threshold)
            .with_tfidf(self.tfidf.to_tfidf_config()?)
            .with_topk(self.report.topk)
            .with_min_score(self.report.min_score);
        if let (Some(bands), Some(rows)) = (self.lsh.bands, self.lsh.rows) {
            cfg = cfg.with_lsh_params(LshParams::new(bands, rows));
        }
        Ok(cfg)
    }
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            normalize: NormalizeYamlConfig::default(),
            sketch: SketchYamlConfig::default(),
            lsh: LshYamlConfig::default(),
            tfidf: TfidfYamlConfig::default(),
            report: ReportYamlConfig::default(),
        }
    }
}

/// Normalization YAML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizeYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "true_value")]
    pub normalize_unicode: bool,

    #[serde(default = "true_value")]
    pub lowercase: bool,

    #[serde(default = "true_value")]
    pub strip_punctuation: bool,

    #[serde(default)]
    pub code_aware: bool,

    #[serde(default)]
    pub stem: bool,
}

impl NormalizeYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version == 0 {
            return Err(ConfigLoadError::Validation(
                "normalize.version must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for NormalizeYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            normalize_unicode: true,
            lowercase: true,
            strip_punctuation: true,
            code_aware: false,
            stem: false,
        }
    }
}

/// Shingling and MinHash YAML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchYamlConfig {
    #[serde(default = "default_shingle_size")]
    pub shingle_size: usize,

    #[serde(default = "default_signature_size")]
    pub signature_size: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "true_value")]
    pub use_parallel: bool,
}

impl SketchYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.shingle_size == 0 {
            return Err(ConfigLoadError::Validation(
                "sketch.shingle_size must be >= 1".to_string(),
            ));
        }
        if self.signature_size == 0 {
            return Err(ConfigLoadError::Validation(
                "sketch.signature_size must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SketchYamlConfig {
    fn default() -> Self {
        Self {
            shingle_size: 3,
            signature_size: 128,
            seed: DEFAULT_SEED,
            use_parallel: true,
        }
    }
}

/// Candidate index YAML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LshYamlConfig {
    #[serde(default = "true_value")]
    pub enabled: bool,

    #[serde(default = "default_lsh_threshold")]
    pub threshold: f64,

    /// Explicit band layout; both `bands` and `rows` or neither.
    #[serde(default)]
    pub bands: Option<usize>,

    #[serde(default)]
    pub rows: Option<usize>,
}

impl LshYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ConfigLoadError::Validation(
                "lsh.threshold must be in (0, 1)".to_string(),
            ));
        }
        if self.bands.is_some() != self.rows.is_some() {
            return Err(ConfigLoadError::Validation(
                "lsh.bands and lsh.rows must be set together".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LshYamlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.1,
            bands: None,
            rows: None,
        }
    }
}

/// Stop words as written in YAML: `"none"`, `"english"` or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopWordsYaml {
    Named(String),
    List(Vec<String>),
}

impl Default for StopWordsYaml {
    fn default() -> Self {
        StopWordsYaml::Named("none".to_string())
    }
}

/// Exact scoring YAML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfYamlConfig {
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    #[serde(default = "true_value")]
    pub smooth_idf: bool,

    #[serde(default)]
    pub sublinear_tf: bool,

    #[serde(default)]
    pub stop_words: StopWordsYaml,
}

impl TfidfYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        let (min, max) = self.ngram_range;
        if min == 0 || max < min {
            return Err(ConfigLoadError::Validation(format!(
                "tfidf.ngram_range must satisfy 1 <= min <= max, got [{min}, {max}]"
            )));
        }
        self.stop_words()?;
        Ok(())
    }

    fn stop_words(&self) -> Result<StopWords, ConfigLoadError> {
        match &self.stop_words {
            StopWordsYaml::Named(name) => match name.as_str() {
                "none" => Ok(StopWords::None),
                "english" => Ok(StopWords::English),
                other => Err(ConfigLoadError::Validation(format!(
                    "tfidf.stop_words must be \"none\", \"english\" or a list, got {other:?}"
                ))),
            },
            StopWordsYaml::List(words) => Ok(StopWords::Custom(words.clone())),
        }
    }

    fn to_tfidf_config(&self) -> Result<TfidfConfig, ConfigLoadError> {
        let (min, max) = self.ngram_range;
        Ok(TfidfConfig::default()
            .with_ngram_range(min, max)
            .with_smooth_idf(self.smooth_idf)
            .with_sublinear_tf(self.sublinear_tf)
            .with_stop_words(self.stop_words()?))
    }
}

impl Default for TfidfYamlConfig {
    fn default() -> Self {
        Self {
            ngram_range: (1, 3),
            smooth_idf: true,
            sublinear_tf: false,
            stop_words: StopWordsYaml::default(),
        }
    }
}

/// Result ranking YAML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportYamlConfig {
    #[serde(default = "default_topk")]
    pub topk: usize,

    #[serde(default)]
    pub min_score: f64,
}

impl ReportYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.topk == 0 {
            return Err(ConfigLoadError::Validation(
                "report.topk must be >= 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(ConfigLoadError::Validation(
                "report.min_score must be in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ReportYamlConfig {
    fn default() -> Self {
        Self {
            topk: 5,
            min_score: 0.0,
        }
    }
}

// Helper functions for serde defaults
fn default_version() -> u32 {
    1
}
fn true_value() -> bool {
    true
}
fn default_shingle_size() -> usize {
    3
}
fn default_signature_size() -> usize {
    128
}
fn default_seed() -> u64 {
    DEFAULT_SEED
}
fn default_lsh_threshold() -> f64 {
    0.1
}
fn default_ngram_range() -> (usize, usize) {
    (1, 3)
}
fn default_topk() -> usize {
    5
}
