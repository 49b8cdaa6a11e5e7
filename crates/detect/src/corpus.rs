use std::time::Instant;

use hashbrown::HashSet;
use rayon::prelude::*;
use tracing::info;

use normalize::{
    CodeFallback, NormalizedParagraph, NormalizedText, Normalizer, ParagraphKind, SkippedParagraph,
    Token,
};
use sketch::{MinHasher, Shingle, ShingleSet, Signature};

use crate::types::{Collection, DetectError, DocumentText, ParagraphId, SourceDocument};

/// A scored unit: one non-empty paragraph with its candidate-stage sketch.
#[derive(Debug, Clone)]
pub struct Paragraph {
    /// Stable 0-based index among the document's non-blank paragraphs.
    pub index: usize,
    pub text: String,
    pub tokens: Vec<Token>,
    pub kind: ParagraphKind,
    pub shingles: Vec<Shingle>,
    pub shingle_set: ShingleSet,
    pub signature: Signature,
}

/// An ingested document. Immutable once built.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub content: DocumentText,
    pub paragraphs: Vec<Paragraph>,
    pub skipped: Vec<SkippedParagraph>,
    pub code_fallbacks: Vec<CodeFallback>,
    pub dropped_empty: usize,
}

/// All documents of one collection, in input order.
#[derive(Debug, Clone)]
pub struct Corpus {
    collection: Collection,
    documents: Vec<Document>,
    offsets: Vec<usize>,
}

impl Corpus {
    /// Normalizes, shingles and sketches every document. Document ids must be
    /// unique within the collection.
    pub fn build(
        collection: Collection,
        sources: Vec<SourceDocument>,
        normalizer: &Normalizer,
        hasher: &MinHasher,
        parallel: bool,
    ) -> Result<Self, DetectError> {
        let started = Instant::now();
        {
            let mut seen = HashSet::with_capacity(sources.len());
            for source in &sources {
                if !seen.insert(source.id.as_str()) {
                    return Err(DetectError::DuplicateDocument {
                        collection,
                        id: source.id.clone(),
                    });
                }
            }
        }

        let build = |source: SourceDocument| {
            let normalized = match &source.content {
                DocumentText::Text(text) => normalizer.normalize(text),
                DocumentText::Bytes(bytes) => normalizer.normalize_bytes(bytes),
            };
            Document::from_normalized(source, normalized, hasher)
        };
        let documents: Vec<Document> = if parallel {
            sources.into_par_iter().map(build).collect()
        } else {
            sources.into_iter().map(build).collect()
        };

        let corpus = Self::from_documents(collection, documents);
        info!(
            collection = %collection,
            documents = corpus.len(),
            paragraphs = corpus.paragraph_count(),
            elapsed_micros = started.elapsed().as_micros() as u64,
            "corpus_built"
        );
        Ok(corpus)
    }

    fn from_documents(collection: Collection, documents: Vec<Document>) -> Self {
        let mut offsets = Vec::with_capacity(documents.len() + 1);
        let mut total = 0;
        for doc in &documents {
            offsets.push(total);
            total += doc.paragraphs.len();
        }
        offsets.push(total);
        Self {
            collection,
            documents,
            offsets,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn paragraph_count(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }

    pub fn document(&self, doc: usize) -> &Document {
        &self.documents[doc]
    }

    pub fn paragraph(&self, id: ParagraphId) -> &Paragraph {
        &self.documents[id.doc].paragraphs[id.slot]
    }

    /// Position of `id` in [`Corpus::ids`] order.
    pub fn flat_index(&self, id: ParagraphId) -> usize {
        self.offsets[id.doc] + id.slot
    }

    /// Every paragraph id in input order.
    pub fn ids(&self) -> impl Iterator<Item = ParagraphId> + '_ {
        self.documents
            .iter()
            .enumerate()
            .flat_map(|(doc, d)| (0..d.paragraphs.len()).map(move |slot| ParagraphId { doc, slot }))
    }

    /// Token texts of every paragraph in [`Corpus::ids`] order, for fitting a
    /// vector space.
    pub fn token_texts(&self) -> Vec<Vec<&str>> {
        self.documents
            .iter()
            .flat_map(|d| d.paragraphs.iter())
            .map(|p| p.tokens.iter().map(|t| t.text.as_str()).collect())
            .collect()
    }
}

impl Document {
    fn from_normalized(
        source: SourceDocument,
        normalized: NormalizedText,
        hasher: &MinHasher,
    ) -> Self {
        let NormalizedText {
            paragraphs,
            skipped,
            code_fallbacks,
            dropped_empty,
        } = normalized;
        Self {
            id: source.id,
            content: source.content,
            paragraphs: paragraphs
                .into_iter()
                .map(|p| Paragraph::sketch(p, hasher))
                .collect(),
            skipped,
            code_fallbacks,
            dropped_empty,
        }
    }
}

impl Paragraph {
    fn sketch(para: NormalizedParagraph, hasher: &MinHasher) -> Self {
        let shingles = hasher.shingle(&para.tokens);
        let shingle_set = ShingleSet::from_shingles(&shingles);
        let signature = hasher.sketch(&shingle_set);
        Self {
            index: para.index,
            text: para.text,
            tokens: para.tokens,
            kind: para.kind,
            shingles,
            shingle_set,
            signature,
        }
    }
}
