use std::collections::BTreeMap;
use std::time::Instant;

use hashbrown::HashMap;
use rayon::prelude::*;
use tracing::info;

use crate::config::TfidfConfig;
use crate::error::TfidfError;
use crate::vector::{SpaceId, SparseVector};

/// A fitted TF-IDF space: term to dimension plus per-dimension IDF.
///
/// Read-only after [`VectorSpace::fit`]; shared freely across threads.
#[derive(Debug, Clone)]
pub struct VectorSpace {
    id: SpaceId,
    cfg: TfidfConfig,
    vocabulary: HashMap<String, u32>,
    idf: Vec<f64>,
}

impl VectorSpace {
    /// Fits a space over `corpus` and returns it together with the vector of
    /// every corpus document, in input order. `parallel` spreads counting and
    /// weighing over the rayon pool; the result is identical either way.
    pub fn fit<D, S>(
        corpus: &[D],
        cfg: TfidfConfig,
        parallel: bool,
    ) -> Result<(Self, Vec<SparseVector>), TfidfError>
    where
        D: AsRef<[S]> + Sync,
        S: AsRef<str> + Sync,
    {
        cfg.validate()?;
        let started = Instant::now();

        let count = |doc: &D| term_counts(doc.as_ref(), &cfg);
        let counted: Vec<BTreeMap<String, u32>> = if parallel {
            corpus.par_iter().map(count).collect()
        } else {
            corpus.iter().map(count).collect()
        };

        // Sorted term order gives the same dimensions on every run.
        let mut df: BTreeMap<&str, u32> = BTreeMap::new();
        for counts in &counted {
            for term in counts.keys() {
                *df.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let n = corpus.len();
        let mut vocabulary = HashMap::with_capacity(df.len());
        let mut idf = Vec::with_capacity(df.len());
        for (dim, (term, freq)) in df.into_iter().enumerate() {
            vocabulary.insert(term.to_string(), dim as u32);
            idf.push(inverse_document_frequency(n, freq as usize, cfg.smooth_idf));
        }

        let space = Self {
            id: SpaceId::next(),
            cfg,
            vocabulary,
            idf,
        };
        let vectors: Vec<SparseVector> = if parallel {
            counted.par_iter().map(|counts| space.weigh(counts)).collect()
        } else {
            counted.iter().map(|counts| space.weigh(counts)).collect()
        };

        info!(
            space = %space.id,
            documents = n,
            vocabulary = space.idf.len(),
            elapsed_micros = started.elapsed().as_micros() as u64,
            "tfidf_fit"
        );
        Ok((space, vectors))
    }

    pub fn id(&self) -> SpaceId {
        self.id
    }

    pub fn config(&self) -> &TfidfConfig {
        &self.cfg
    }

    /// Number of dimensions.
    pub fn dimensions(&self) -> usize {
        self.idf.len()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&dim| self.idf[dim as usize])
    }

    /// Projects a new token stream into this space without refitting. Terms
    /// outside the vocabulary are ignored.
    pub fn transform<S: AsRef<str>>(&self, tokens: &[S]) -> SparseVector {
        self.weigh(&term_counts(tokens, &self.cfg))
    }

    fn weigh(&self, counts: &BTreeMap<String, u32>) -> SparseVector {
        let mut entries: Vec<(u32, f64)> = counts
            .iter()
            .filter_map(|(term, &tf)| {
                let dim = *self.vocabulary.get(term.as_str())?;
                let tf = if self.cfg.sublinear_tf {
                    1.0 + (tf as f64).ln()
                } else {
                    tf as f64
                };
                Some((dim, tf * self.idf[dim as usize]))
            })
            .collect();
        entries.sort_unstable_by_key(|&(dim, _)| dim);

        let norm = entries.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut entries {
                *w /= norm;
            }
        } else {
            entries.clear();
        }
        SparseVector::new(self.id, entries)
    }
}

fn inverse_document_frequency(n: usize, df: usize, smooth: bool) -> f64 {
    let (n, df) = if smooth {
        (n as f64 + 1.0, df as f64 + 1.0)
    } else {
        (n as f64, df as f64)
    };
    (n / df).ln() + 1.0
}

/// Word n-gram counts after stop-word removal. N-grams are joined with a
/// single space.
fn term_counts<S: AsRef<str>>(tokens: &[S], cfg: &TfidfConfig) -> BTreeMap<String, u32> {
    let words: Vec<&str> = tokens
        .iter()
        .map(AsRef::as_ref)
        .filter(|w| !cfg.stop_words.contains(w))
        .collect();
    let (min, max) = cfg.ngram_range;
    let mut counts = BTreeMap::new();
    for n in min..=max.min(words.len()) {
        for gram in words.windows(n) {
            *counts.entry(gram.join(" ")).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StopWords;
    use crate::vector::cosine;

    fn toks(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    fn fit(docs: &[&str], cfg: TfidfConfig) -> (VectorSpace, Vec<SparseVector>) {
        let corpus: Vec<Vec<&str>> = docs.iter().map(|d| toks(d)).collect();
        VectorSpace::fit(&corpus, cfg, true).expect("valid config")
    }

    #[test]
    fn self_similarity_is_one() {
        let (space, vectors) = fit(
            &["the cat sat on the mat", "dogs chase cats", "a b c d e"],
            TfidfConfig::default(),
        );
        for (doc, v) in ["the cat sat on the mat", "dogs chase cats", "a b c d e"]
            .iter()
            .zip(&vectors)
        {
            let again = space.transform(&toks(doc));
            assert!((cosine(v, &again).expect("same space") - 1.0).abs() < 1e-9);
            assert!((cosine(v, v).expect("same space") - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn disjoint_vocabularies_score_zero() {
        let (space, _) = fit(&["alpha beta gamma", "delta epsilon"], TfidfConfig::default());
        let a = space.transform(&toks("alpha beta"));
        let b = space.transform(&toks("delta epsilon"));
        assert_eq!(cosine(&a, &b), Ok(0.0));
    }

    #[test]
    fn unknown_terms_give_zero_vector() {
        let (space, _) = fit(&["alpha beta"], TfidfConfig::default());
        let v = space.transform(&toks("never seen"));
        assert!(v.is_zero());
        let empty: Vec<&str> = Vec::new();
        assert!(space.transform(&empty).is_zero());
    }

    #[test]
    fn smooth_idf_formula() {
        let (space, _) = fit(&["a b", "a c", "a d"], TfidfConfig::default());
        // n = 3, df(a) = 3, df(b) = 1
        assert!((space.idf("a").expect("known") - 1.0).abs() < 1e-12);
        let expected_b = (4.0f64 / 2.0).ln() + 1.0;
        assert!((space.idf("b").expect("known") - expected_b).abs() < 1e-12);
    }

    #[test]
    fn raw_idf_formula() {
        let (space, _) = fit(
            &["a b", "a c"],
            TfidfConfig::default().with_smooth_idf(false),
        );
        assert!((space.idf("a").expect("known") - 1.0).abs() < 1e-12);
        assert!((space.idf("b").expect("known") - (2.0f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn ngrams_cover_the_configured_range() {
        let (space, _) = fit(&["x y z"], TfidfConfig::default());
        for term in ["x", "y", "z", "x y", "y z", "x y z"] {
            assert!(space.idf(term).is_some(), "missing {term}");
        }
        assert_eq!(space.dimensions(), 6);

        let (bigrams, _) = fit(&["x y z"], TfidfConfig::default().with_ngram_range(2, 2));
        assert_eq!(bigrams.dimensions(), 2);
    }

    #[test]
    fn stop_words_removed_before_ngrams() {
        let cfg = TfidfConfig::default()
            .with_ngram_range(2, 2)
            .with_stop_words(StopWords::English);
        let (space, _) = fit(&["cats and dogs"], cfg);
        assert!(space.idf("cats dogs").is_some());
        assert!(space.idf("cats and").is_none());
    }

    #[test]
    fn sublinear_tf_dampens_repeats() {
        let docs = ["spam spam spam spam eggs", "eggs ham"];
        let (plain_space, plain) = fit(&docs, TfidfConfig::default().with_ngram_range(1, 1));
        let (_, damped) = fit(
            &docs,
            TfidfConfig::default()
                .with_ngram_range(1, 1)
                .with_sublinear_tf(true),
        );
        let spam = |space_vectors: &[SparseVector], space: &VectorSpace| {
            let dim = space.vocabulary["spam"];
            space_vectors[0]
                .entries()
                .iter()
                .find(|(d, _)| *d == dim)
                .map(|&(_, w)| w)
                .expect("spam present")
        };
        assert!(spam(&damped, &plain_space) < spam(&plain, &plain_space));
    }

    #[test]
    fn empty_corpus_fits_empty_space() {
        let corpus: Vec<Vec<&str>> = Vec::new();
        let (space, vectors) =
            VectorSpace::fit(&corpus, TfidfConfig::default(), false).expect("valid");
        assert_eq!(space.dimensions(), 0);
        assert!(vectors.is_empty());
    }

    #[test]
    fn invalid_config_rejected() {
        let corpus = vec![toks("a b")];
        let cfg = TfidfConfig::default().with_ngram_range(0, 1);
        assert!(VectorSpace::fit(&corpus, cfg, true).is_err());
    }

    #[test]
    fn dimensions_are_deterministic() {
        let (a, _) = fit(&["q w e", "r t y"], TfidfConfig::default());
        let (b, _) = fit(&["q w e", "r t y"], TfidfConfig::default());
        for term in ["q", "w e", "r t y"] {
            assert_eq!(a.vocabulary[term], b.vocabulary[term]);
        }
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn sequential_fit_matches_parallel() {
        let docs = ["the cat sat", "a dog ran far", "the dog sat on the cat"];
        let corpus: Vec<Vec<&str>> = docs.iter().map(|d| toks(d)).collect();
        let cfg = TfidfConfig::default();
        let (par_space, par) = VectorSpace::fit(&corpus, cfg.clone(), true).expect("fit");
        let (seq_space, seq) = VectorSpace::fit(&corpus, cfg, false).expect("fit");
        assert_eq!(par_space.vocabulary, seq_space.vocabulary);
        assert_eq!(par_space.idf, seq_space.idf);
        for (a, b) in par.iter().zip(&seq) {
            assert_eq!(a.entries(), b.entries());
        }
    }
}
