use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, Level};

use lsh::{LshBuilder, LshIndex, LshParams};
use normalize::Normalizer;
use sketch::MinHasher;
use tfidf::{cosine, SparseVector, VectorSpace};

use crate::config::{ConfigError, DetectConfig};
use crate::corpus::{Corpus, Document, Paragraph};
use crate::highlight::{shared_shingles, shared_spans};
use crate::types::{
    Collection, CollusionPair, DetectError, DetectionReport, Diagnostics, DocResult, ParagraphId,
    ReferenceScore, ReportParams, SimilarityMatch, SourceDocument, UnitIssue,
};

#[cfg(test)]
mod tests;

/// Per-submission output of the plagiarism stage.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionMatches {
    pub submission_id: String,
    pub reference_scores: Vec<ReferenceScore>,
    pub matches: Vec<SimilarityMatch>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlagiarismRun {
    pub submissions: Vec<SubmissionMatches>,
    pub candidates_examined: usize,
    pub zero_vectors: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollusionRun {
    pub pairs: Vec<CollusionPair>,
    pub candidates_examined: usize,
}

/// Two-stage overlap detector.
///
/// Stage one proposes candidates from a banded MinHash index (or every
/// paragraph when LSH is off); stage two rescores candidates exactly with
/// TF-IDF cosine. The vector space is fitted and the index frozen before any
/// query runs, and both are shared read-only across worker threads.
#[derive(Debug)]
pub struct Detector {
    cfg: DetectConfig,
    normalizer: Normalizer,
    hasher: MinHasher,
    lsh_params: Option<LshParams>,
}

impl Detector {
    pub fn new(cfg: DetectConfig, normalizer: Normalizer) -> Result<Self, DetectError> {
        cfg.validate()?;
        let hasher = MinHasher::new(cfg.sketch_config()).map_err(ConfigError::from)?;
        let lsh_params = if cfg.use_lsh {
            Some(cfg.resolve_lsh_params()?)
        } else {
            None
        };
        Ok(Self {
            cfg,
            normalizer,
            hasher,
            lsh_params,
        })
    }

    pub fn config(&self) -> &DetectConfig {
        &self.cfg
    }

    pub fn lsh_params(&self) -> Option<LshParams> {
        self.lsh_params
    }

    /// Normalizes and sketches one input collection.
    pub fn prepare(
        &self,
        collection: Collection,
        sources: Vec<SourceDocument>,
    ) -> Result<Corpus, DetectError> {
        Corpus::build(
            collection,
            sources,
            &self.normalizer,
            &self.hasher,
            self.cfg.use_parallel,
        )
    }

    /// Full run: plagiarism against references plus collusion among
    /// submissions.
    pub fn detect(
        &self,
        submissions: Vec<SourceDocument>,
        references: Vec<SourceDocument>,
    ) -> Result<DetectionReport, DetectError> {
        let started = Instant::now();
        let submissions = self.prepare(Collection::Submissions, submissions)?;
        let references = self.prepare(Collection::References, references)?;

        let plagiarism = self.plagiarism(&submissions, &references)?;
        let collusion = self.collusion(&submissions)?;

        let mut diagnostics = Diagnostics {
            submissions: submissions.len(),
            references: references.len(),
            submission_paragraphs: submissions.paragraph_count(),
            reference_paragraphs: references.paragraph_count(),
            zero_vectors: plagiarism.zero_vectors,
            plagiarism_candidates: plagiarism.candidates_examined,
            collusion_candidates: collusion.candidates_examined,
            lsh_params: self.lsh_params,
            ..Diagnostics::default()
        };
        collect_unit_issues(&submissions, &mut diagnostics);
        collect_unit_issues(&references, &mut diagnostics);

        let params = ReportParams {
            topk: self.cfg.topk,
            min_score: self.cfg.min_score,
        };
        let results = plagiarism
            .submissions
            .into_iter()
            .map(|s| DocResult {
                submission_id: s.submission_id,
                params,
                reference_scores: s.reference_scores,
                matches: s.matches,
                collusion_pairs: collusion.pairs.clone(),
            })
            .collect();

        info!(
            submissions = diagnostics.submissions,
            references = diagnostics.references,
            collusion_pairs = collusion.pairs.len(),
            skipped = diagnostics.skipped.len(),
            elapsed_micros = started.elapsed().as_micros() as u64,
            "detect_done"
        );
        Ok(DetectionReport {
            results,
            collusion_pairs: collusion.pairs,
            diagnostics,
        })
    }

    /// Matches every submission paragraph against the reference corpus.
    pub fn plagiarism(
        &self,
        submissions: &Corpus,
        references: &Corpus,
    ) -> Result<PlagiarismRun, DetectError> {
        let span = tracing::span!(
            Level::INFO,
            "detect.plagiarism",
            submissions = submissions.len(),
            references = references.len(),
            use_lsh = self.lsh_params.is_some()
        );
        let _guard = span.enter();
        let started = Instant::now();

        let (space, ref_vectors) = VectorSpace::fit(
            &references.token_texts(),
            self.cfg.tfidf.clone(),
            self.cfg.use_parallel,
        )?;
        let index = self.build_index(references)?;

        let per_doc = self.map_units(submissions.documents(), |doc| {
            self.match_document(doc, references, &space, &ref_vectors, index.as_ref())
        });

        let mut run = PlagiarismRun {
            submissions: Vec::with_capacity(submissions.len()),
            candidates_examined: 0,
            zero_vectors: 0,
        };
        for outcome in per_doc {
            let (matches, examined, zero) = outcome?;
            run.candidates_examined += examined;
            run.zero_vectors += zero;
            run.submissions.push(matches);
        }

        info!(
            candidates = run.candidates_examined,
            matches = run.submissions.iter().map(|s| s.matches.len()).sum::<usize>(),
            zero_vectors = run.zero_vectors,
            elapsed_micros = started.elapsed().as_micros() as u64,
            "plagiarism_done"
        );
        Ok(run)
    }

    /// Compares paragraphs across every pair of distinct submissions and
    /// aggregates the qualifying scores per document pair.
    pub fn collusion(&self, submissions: &Corpus) -> Result<CollusionRun, DetectError> {
        let span = tracing::span!(
            Level::INFO,
            "detect.collusion",
            submissions = submissions.len(),
            use_lsh = self.lsh_params.is_some()
        );
        let _guard = span.enter();
        let started = Instant::now();

        let (_space, vectors) = VectorSpace::fit(
            &submissions.token_texts(),
            self.cfg.tfidf.clone(),
            self.cfg.use_parallel,
        )?;
        let index = self.build_index(submissions)?;
        let ids: Vec<ParagraphId> = submissions.ids().collect();

        let per_paragraph = self.map_units(&ids, |&id| -> Result<_, DetectError> {
            let candidates = match &index {
                Some(index) => query_index(index, submissions.paragraph(id))?,
                None => ids.clone(),
            };
            let mut scored = Vec::new();
            let mut examined = 0usize;
            // Each unordered pair is scored once, from its lower document.
            for other in candidates.into_iter().filter(|other| other.doc > id.doc) {
                examined += 1;
                let score = cosine(
                    &vectors[submissions.flat_index(id)],
                    &vectors[submissions.flat_index(other)],
                )?;
                if self.cfg.qualifies(score) {
                    scored.push((other.doc, score));
                }
            }
            Ok((id.doc, scored, examined))
        });

        // Summation order follows input order, so results do not depend on
        // thread scheduling.
        let mut totals: BTreeMap<(usize, usize), (f64, usize)> = BTreeMap::new();
        let mut candidates_examined = 0;
        for outcome in per_paragraph {
            let (doc, scored, examined) = outcome?;
            candidates_examined += examined;
            for (other, score) in scored {
                let entry = totals.entry((doc, other)).or_insert((0.0, 0));
                entry.0 += score;
                entry.1 += 1;
            }
        }

        let mut pairs: Vec<CollusionPair> = totals
            .into_iter()
            .map(|((a, b), (sum, count))| {
                let (a, b) = (&submissions.document(a).id, &submissions.document(b).id);
                let (doc_a, doc_b) = if a <= b { (a, b) } else { (b, a) };
                CollusionPair {
                    doc_a: doc_a.clone(),
                    doc_b: doc_b.clone(),
                    score: sum / count as f64,
                    comparisons: count,
                }
            })
            .collect();
        pairs.sort_by(|x, y| {
            y.score
                .total_cmp(&x.score)
                .then_with(|| x.doc_a.cmp(&y.doc_a))
                .then_with(|| x.doc_b.cmp(&y.doc_b))
        });

        info!(
            candidates = candidates_examined,
            pairs = pairs.len(),
            elapsed_micros = started.elapsed().as_micros() as u64,
            "collusion_done"
        );
        Ok(CollusionRun {
            pairs,
            candidates_examined,
        })
    }

    fn build_index(&self, corpus: &Corpus) -> Result<Option<LshIndex<ParagraphId>>, DetectError> {
        let Some(params) = self.lsh_params else {
            return Ok(None);
        };
        let mut builder = LshBuilder::new(params, self.cfg.signature_size)?;
        for id in corpus.ids() {
            let para = corpus.paragraph(id);
            if !para.shingle_set.is_empty() {
                builder.insert(id, para.signature.as_slice())?;
            }
        }
        Ok(Some(builder.freeze()))
    }

    fn match_document(
        &self,
        doc: &Document,
        references: &Corpus,
        space: &VectorSpace,
        ref_vectors: &[SparseVector],
        index: Option<&LshIndex<ParagraphId>>,
    ) -> Result<(SubmissionMatches, usize, usize), DetectError> {
        let mut matches = Vec::new();
        let mut examined = 0;
        let mut zero_vectors = 0;

        for para in &doc.paragraphs {
            let query = space.transform(&para.tokens);
            if query.is_zero() {
                zero_vectors += 1;
                continue;
            }
            let candidates = match index {
                Some(index) => query_index(index, para)?,
                None => references.ids().collect(),
            };
            examined += candidates.len();
            for id in candidates {
                let score = cosine(&query, &ref_vectors[references.flat_index(id)])?;
                if self.cfg.qualifies(score) {
                    let reference = references.document(id.doc);
                    let matched = references.paragraph(id);
                    matches.push(self.describe_match(para, reference, matched, score));
                }
            }
        }

        let reference_scores = summarize(&matches, references);
        // Stable: ties keep (query paragraph, reference doc, reference
        // paragraph) input order.
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(self.cfg.topk);

        Ok((
            SubmissionMatches {
                submission_id: doc.id.clone(),
                reference_scores,
                matches,
            },
            examined,
            zero_vectors,
        ))
    }

    fn describe_match(
        &self,
        query: &Paragraph,
        reference_doc: &Document,
        reference: &Paragraph,
        score: f64,
    ) -> SimilarityMatch {
        let n = self.cfg.shingle_size;
        let shared = shared_shingles(&query.shingle_set, &reference.shingle_set);
        SimilarityMatch {
            query_paragraph: query.index,
            reference_doc: reference_doc.id.clone(),
            reference_paragraph: reference.index,
            score,
            shared_shingles: shared.len(),
            query_spans: shared_spans(&query.tokens, &query.shingles, &shared, n),
            reference_spans: shared_spans(&reference.tokens, &reference.shingles, &shared, n),
            query_text: query.text.clone(),
            reference_text: reference.text.clone(),
        }
    }

    fn map_units<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        if self.cfg.use_parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }
}

/// Paragraphs too short to shingle never enter or query the index.
fn query_index(
    index: &LshIndex<ParagraphId>,
    para: &Paragraph,
) -> Result<Vec<ParagraphId>, DetectError> {
    if para.shingle_set.is_empty() {
        return Ok(Vec::new());
    }
    Ok(index.query(para.signature.as_slice())?)
}

/// One entry per reference document, best score first; ties keep input order.
fn summarize(matches: &[SimilarityMatch], references: &Corpus) -> Vec<ReferenceScore> {
    let mut scores: Vec<ReferenceScore> = references
        .documents()
        .iter()
        .map(|reference| {
            let (best, sum, count) = matches
                .iter()
                .filter(|m| m.reference_doc == reference.id)
                .fold((0.0f64, 0.0f64, 0usize), |(best, sum, count), m| {
                    (best.max(m.score), sum + m.score, count + 1)
                });
            ReferenceScore {
                reference_doc: reference.id.clone(),
                best_score: best,
                mean_score: if count == 0 { 0.0 } else { sum / count as f64 },
                matched_paragraphs: count,
            }
        })
        .collect();
    scores.sort_by(|a, b| b.best_score.total_cmp(&a.best_score));
    scores
}

fn collect_unit_issues(corpus: &Corpus, diagnostics: &mut Diagnostics) {
    let collection = corpus.collection();
    for doc in corpus.documents() {
        diagnostics.dropped_empty += doc.dropped_empty;
        diagnostics.code_paragraphs += doc
            .paragraphs
            .iter()
            .filter(|p| p.kind == normalize::ParagraphKind::Code)
            .count();
        diagnostics
            .skipped
            .extend(doc.skipped.iter().map(|s| UnitIssue {
                collection,
                doc_id: doc.id.clone(),
                paragraph: s.index,
                reason: s.error.clone(),
            }));
        diagnostics
            .code_fallbacks
            .extend(doc.code_fallbacks.iter().map(|f| UnitIssue {
                collection,
                doc_id: doc.id.clone(),
                paragraph: f.index,
                reason: f.error.clone(),
            }));
    }
}
