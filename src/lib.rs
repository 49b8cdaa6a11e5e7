//! Workspace umbrella crate for paragraph-level overlap detection.
//!
//! This crate stitches together configuration loading, document sources and
//! the detector so callers can run a whole plagiarism and collusion pass with
//! a single entry point:
//!
//! ```no_run
//! use overlap::{run, OverlapConfig, PlainTextDirSource};
//!
//! let cfg = OverlapConfig::from_file("overlap.yaml")?;
//! let report = run(
//!     &PlainTextDirSource::new("submissions"),
//!     &PlainTextDirSource::new("references"),
//!     &cfg,
//! )?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod source;

pub use crate::config::{
    ConfigLoadError, LshYamlConfig, NormalizeYamlConfig, OverlapConfig, ReportYamlConfig,
    SketchYamlConfig, StopWordsYaml, TfidfYamlConfig,
};
pub use crate::source::{
    InMemorySource, LoadedCollection, PlainTextDirSource, SourceError, TEXT_EXTENSIONS, TextSource,
};

pub use detect::{
    Collection, CollusionPair, ConfigError, DetectConfig, DetectError, DetectionReport, Detector,
    Diagnostics, DocResult, DocumentText, HighlightedToken, ReferenceScore, ReportParams,
    SimilarityMatch, SourceDocument, Span, UnitIssue, highlight, mark_spans, shared_shingles,
    shared_spans,
};
pub use lsh::LshParams;
pub use normalize::{
    CodeCanonicalizer, NormalizeConfig, NormalizeError, Normalizer, ParagraphKind,
    PythonLikeCanonicalizer,
};
pub use sketch::{MinHasher, ShingleSet, Signature, SketchConfig};
pub use tfidf::{StopWords, TfidfConfig, VectorSpace, cosine};

use std::error::Error;
use std::fmt;
use std::time::Instant;

use tracing::info;

/// Errors that can abort a run. Per-paragraph problems never do; they end
/// up in [`Diagnostics`].
#[derive(Debug)]
pub enum PipelineError {
    Config(ConfigLoadError),
    Normalize(NormalizeError),
    Source(SourceError),
    Detect(DetectError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Config(err) => write!(f, "configuration failure: {err}"),
            PipelineError::Normalize(err) => write!(f, "normalizer setup failed: {err}"),
            PipelineError::Source(err) => write!(f, "loading documents failed: {err}"),
            PipelineError::Detect(err) => write!(f, "detection failed: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Config(err) => Some(err),
            PipelineError::Normalize(err) => Some(err),
            PipelineError::Source(err) => Some(err),
            PipelineError::Detect(err) => Some(err),
        }
    }
}

impl From<ConfigLoadError> for PipelineError {
    fn from(value: ConfigLoadError) -> Self {
        PipelineError::Config(value)
    }
}

impl From<NormalizeError> for PipelineError {
    fn from(value: NormalizeError) -> Self {
        PipelineError::Normalize(value)
    }
}

impl From<SourceError> for PipelineError {
    fn from(value: SourceError) -> Self {
        PipelineError::Source(value)
    }
}

impl From<DetectError> for PipelineError {
    fn from(value: DetectError) -> Self {
        PipelineError::Detect(value)
    }
}

/// Builds a detector from a loaded configuration.
pub fn detector_from_config(cfg: &OverlapConfig) -> Result<Detector, PipelineError> {
    cfg.validate()?;
    let normalizer = Normalizer::new(cfg.to_normalize_config())?;
    let detector = Detector::new(cfg.to_detect_config()?, normalizer)?;
    Ok(detector)
}

/// Loads both collections and runs plagiarism and collusion detection.
///
/// Files the sources could not read as text are logged and left out; they
/// do not fail the run.
pub fn run(
    submissions: &dyn TextSource,
    references: &dyn TextSource,
    cfg: &OverlapConfig,
) -> Result<DetectionReport, PipelineError> {
    let started = Instant::now();
    let detector = detector_from_config(cfg)?;

    let subs = submissions.load()?;
    let refs = references.load()?;
    info!(
        submissions = submissions.name(),
        references = references.name(),
        unsupported = subs.unsupported.len() + refs.unsupported.len(),
        "sources_loaded"
    );

    let report = detector.detect(subs.documents, refs.documents)?;
    info!(
        results = report.results.len(),
        collusion_pairs = report.collusion_pairs.len(),
        elapsed_micros = started.elapsed().as_micros() as u64,
        "run_complete"
    );
    Ok(report)
}
