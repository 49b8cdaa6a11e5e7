//! Configuration for the normalizer.
//!
//! [`NormalizeConfig`] controls how paragraph text is turned into the token
//! stream every downstream stage (shingling, TF-IDF, highlighting) consumes.
//! Two runs with the same config and input produce the same tokens on any
//! machine: no locale, clock or environment is consulted.
//!
//! # Examples
//!
//! ```rust
//! use normalize::NormalizeConfig;
//!
//! let config = NormalizeConfig::default();
//! assert!(config.lowercase);
//! assert!(config.strip_punctuation);
//! assert!(!config.code_aware);
//!
//! let code = NormalizeConfig::default().with_code_aware(true);
//! assert!(code.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;

/// Configuration for paragraph normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizeConfig {
    /// Version of the normalization behaviour. Must be >= 1; bump it whenever
    /// the produced tokens change for the same input.
    pub version: u32,

    /// Apply Unicode NFKC normalization before any other transform, so that
    /// composed and decomposed forms of the same character compare equal.
    pub normalize_unicode: bool,

    /// Apply locale-free Unicode lowercasing.
    pub lowercase: bool,

    /// Treat punctuation (Unicode `P*` categories and ASCII symbols) as a
    /// delimiter.
    pub strip_punctuation: bool,

    /// Detect paragraphs that look like source code and tokenize them through
    /// the code canonicalization strategy instead of the prose tokenizer.
    #[serde(default)]
    pub code_aware: bool,

    /// Reduce prose tokens to their English Snowball stem, so inflected forms
    /// ("cats", "cat") produce the same token. Code tokens are left alone.
    #[serde(default)]
    pub stem: bool,
}

impl NormalizeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unicode_normalization(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }

    pub fn with_lowercase(mut self, enabled: bool) -> Self {
        self.lowercase = enabled;
        self
    }

    pub fn with_strip_punctuation(mut self, enabled: bool) -> Self {
        self.strip_punctuation = enabled;
        self
    }

    pub fn with_code_aware(mut self, enabled: bool) -> Self {
        self.code_aware = enabled;
        self
    }

    pub fn with_stemming(mut self, enabled: bool) -> Self {
        self.stem = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), NormalizeError> {
        if self.version == 0 {
            return Err(NormalizeError::InvalidConfig(
                "normalize version must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for NormalizeConfig {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let cfg = NormalizeConfig::default();
        assert_eq!(cfg.version, 1);
        assert!(cfg.normalize_unicode);
        assert!(cfg.lowercase);
        assert!(cfg.strip_punctuation);
        assert!(!cfg.code_aware);
        assert!(!cfg.stem);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn version_zero_rejected() {
        let cfg = NormalizeConfig {
            version: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(NormalizeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn builders_chain() {
        let cfg = NormalizeConfig::new()
            .with_lowercase(false)
            .with_strip_punctuation(false)
            .with_unicode_normalization(false)
            .with_code_aware(true)
            .with_stemming(true);
        assert!(!cfg.lowercase);
        assert!(!cfg.strip_punctuation);
        assert!(!cfg.normalize_unicode);
        assert!(cfg.code_aware);
        assert!(cfg.stem);
    }

    #[test]
    fn code_aware_defaults_when_missing_from_json() {
        let json = r#"{"version":1,"normalize_unicode":true,"lowercase":true,"strip_punctuation":false}"#;
        let cfg: NormalizeConfig = serde_json::from_str(json).expect("deserialize");
        assert!(!cfg.code_aware);
        assert!(!cfg.stem);
        assert!(!cfg.strip_punctuation);
    }
}
