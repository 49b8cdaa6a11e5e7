//! Paragraph-level plagiarism and collusion detection.
//!
//! A [`Detector`] runs two passes over pre-loaded documents:
//!
//! - **plagiarism**: each submission paragraph is matched against a
//!   reference corpus, and the best matches per submission are kept;
//! - **collusion**: paragraphs of distinct submissions are compared with one
//!   another and aggregated into document pairs.
//!
//! Both passes share the same pipeline. Paragraphs are normalized by
//! [`normalize::Normalizer`], sketched with MinHash over token shingles, and
//! proposed as candidates by a banded LSH index. Candidates are then rescored
//! exactly with TF-IDF cosine in a vector space fitted over the searched
//! corpus. Disabling LSH scores every pair exactly and yields a superset of
//! the LSH matches with identical scores.
//!
//! ```no_run
//! use detect::{DetectConfig, Detector, SourceDocument};
//! use normalize::{NormalizeConfig, Normalizer};
//!
//! let normalizer = Normalizer::new(NormalizeConfig::default())?;
//! let detector = Detector::new(DetectConfig::default().with_topk(3), normalizer)?;
//! let report = detector.detect(
//!     vec![SourceDocument::text("essay", "A paragraph about cats and dogs.")],
//!     vec![SourceDocument::text("source", "an original paragraph about cats and dogs")],
//! )?;
//! for m in &report.results[0].matches {
//!     println!("{} {:.3}", m.reference_doc, m.score);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod corpus;
mod engine;
mod highlight;
mod types;

pub use crate::config::{ConfigError, DetectConfig};
pub use crate::corpus::{Corpus, Document, Paragraph};
pub use crate::engine::{CollusionRun, Detector, PlagiarismRun, SubmissionMatches};
pub use crate::highlight::{
    highlight, mark_spans, shared_shingles, shared_spans, HighlightedToken, Span,
};
pub use crate::types::{
    Collection, CollusionPair, DetectError, DetectionReport, Diagnostics, DocResult, DocumentText,
    ParagraphId, ReferenceScore, ReportParams, SimilarityMatch, SourceDocument, UnitIssue,
};

pub use lsh::LshParams;
pub use normalize::{NormalizeConfig, Normalizer, ParagraphKind};
pub use tfidf::{StopWords, TfidfConfig};
