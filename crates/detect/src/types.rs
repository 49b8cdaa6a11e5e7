use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lsh::{LshError, LshParams};
use tfidf::TfidfError;

use crate::config::ConfigError;
use crate::highlight::Span;

/// Which input collection a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Submissions,
    References,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Submissions => f.write_str("submissions"),
            Collection::References => f.write_str("references"),
        }
    }
}

/// Raw document content as handed over by the ingestion collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentText {
    Text(String),
    /// Undecoded bytes; decoded per paragraph so malformed input only costs
    /// the paragraph it appears in.
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub id: String,
    pub content: DocumentText,
}

impl SourceDocument {
    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: DocumentText::Text(text.into()),
        }
    }

    pub fn bytes(id: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            content: DocumentText::Bytes(bytes.into()),
        }
    }
}

/// Position of a paragraph inside a [`crate::Corpus`]: document slot and
/// paragraph slot, both in input order. Ordering follows input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParagraphId {
    pub doc: usize,
    pub slot: usize,
}

/// One submission paragraph matched against one reference paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatch {
    /// Paragraph index within the submission.
    pub query_paragraph: usize,
    pub reference_doc: String,
    /// Paragraph index within the reference document.
    pub reference_paragraph: usize,
    /// TF-IDF cosine in `[0, 1]`.
    pub score: f64,
    /// Number of distinct shingles the two paragraphs share.
    pub shared_shingles: usize,
    /// Overlap spans in `query_text`, ascending.
    pub query_spans: Vec<Span>,
    /// Overlap spans in `reference_text`, ascending.
    pub reference_spans: Vec<Span>,
    pub query_text: String,
    pub reference_text: String,
}

/// Summary of one reference document's matches against a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceScore {
    pub reference_doc: String,
    pub best_score: f64,
    pub mean_score: f64,
    pub matched_paragraphs: usize,
}

/// Two submissions with overlapping paragraphs. `doc_a < doc_b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollusionPair {
    pub doc_a: String,
    pub doc_b: String,
    /// Mean cosine over the qualifying paragraph comparisons. Comparisons
    /// that share no term score 0 and never qualify, even at `min_score = 0`,
    /// so they are left out of the mean rather than diluting it. This keeps
    /// the score the same whether or not candidates come from the LSH index.
    pub score: f64,
    /// Number of qualifying paragraph comparisons.
    pub comparisons: usize,
}

/// Display parameters handed to the renderer with every result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportParams {
    pub topk: usize,
    pub min_score: f64,
}

/// Everything the renderer gets for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocResult {
    pub submission_id: String,
    pub params: ReportParams,
    /// One entry per reference document, best score first.
    pub reference_scores: Vec<ReferenceScore>,
    /// Ranked by score, truncated to `topk`.
    pub matches: Vec<SimilarityMatch>,
    /// Collusion pairs of the whole run.
    pub collusion_pairs: Vec<CollusionPair>,
}

/// A paragraph that was skipped or degraded, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitIssue {
    pub collection: Collection,
    pub doc_id: String,
    pub paragraph: usize,
    pub reason: String,
}

/// Per-run counts and isolated failures. Nothing in here aborted the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub submissions: usize,
    pub references: usize,
    pub submission_paragraphs: usize,
    pub reference_paragraphs: usize,
    /// Paragraphs rejected for malformed input.
    pub skipped: Vec<UnitIssue>,
    /// Code paragraphs that failed to parse and were scored as prose.
    pub code_fallbacks: Vec<UnitIssue>,
    pub code_paragraphs: usize,
    /// Paragraphs with no tokens after normalization.
    pub dropped_empty: usize,
    /// Submission paragraphs sharing no term with the reference space.
    pub zero_vectors: usize,
    pub plagiarism_candidates: usize,
    pub collusion_candidates: usize,
    pub lsh_params: Option<LshParams>,
}

/// Output of [`crate::Detector::detect`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub results: Vec<DocResult>,
    pub collusion_pairs: Vec<CollusionPair>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("duplicate document id {id:?} in {collection}")]
    DuplicateDocument { collection: Collection, id: String },

    #[error("vector space contract violated: {0}")]
    VectorSpace(#[from] TfidfError),

    #[error("candidate index failure: {0}")]
    Index(#[from] LshError),
}
