use normalize::{NormalizeConfig, Normalizer};

use super::*;

fn normalizer() -> Normalizer {
    Normalizer::new(NormalizeConfig::default()).expect("valid normalize config")
}

fn code_normalizer() -> Normalizer {
    Normalizer::new(NormalizeConfig::default().with_code_aware(true))
        .expect("valid normalize config")
}

fn detector(cfg: DetectConfig) -> Detector {
    Detector::new(cfg, normalizer()).expect("valid detect config")
}

fn exact() -> DetectConfig {
    DetectConfig::default().with_lsh(false)
}

fn cats_and_dogs() -> (Vec<SourceDocument>, Vec<SourceDocument>) {
    (
        vec![SourceDocument::text(
            "sub-1",
            "A paragraph about cats and dogs appears here.",
        )],
        vec![
            SourceDocument::text("ref-1", "this is an original paragraph about cats and dogs"),
            SourceDocument::text("ref-2", "unrelated content entirely"),
        ],
    )
}

fn essay_corpus() -> (Vec<SourceDocument>, Vec<SourceDocument>) {
    let references = vec![
        SourceDocument::text(
            "encyclopedia",
            "The mitochondria is the powerhouse of the cell and produces energy for the organism.\n\n\
             Photosynthesis converts light energy into chemical energy stored in glucose molecules.\n\n\
             The water cycle describes evaporation condensation and precipitation across the planet.",
        ),
        SourceDocument::text(
            "textbook",
            "Plate tectonics explains how continents drift slowly over millions of years.\n\n\
             Volcanoes form where magma rises through cracks in the crust of the earth.",
        ),
    ];
    let submissions = vec![
        SourceDocument::text(
            "alice",
            "As we know the mitochondria is the powerhouse of the cell and produces energy.\n\n\
             My summer holiday was spent reading novels beside a quiet lake.",
        ),
        SourceDocument::text(
            "bob",
            "Volcanoes form where magma rises through cracks in the crust of the earth, I think.\n\n\
             Photosynthesis converts light energy into chemical energy stored in sugar molecules.",
        ),
    ];
    (submissions, references)
}

#[test]
fn rejects_invalid_config() {
    let err = Detector::new(DetectConfig::default().with_topk(0), normalizer()).unwrap_err();
    assert!(matches!(err, DetectError::Config(ConfigError::InvalidTopK)));

    let err =
        Detector::new(DetectConfig::default().with_shingle_size(0), normalizer()).unwrap_err();
    assert!(matches!(err, DetectError::Config(_)));
}

#[test]
fn lsh_params_resolved_only_when_enabled() {
    assert!(detector(exact()).lsh_params().is_none());
    let params = detector(DetectConfig::default()).lsh_params().expect("params");
    assert!(params.bands * params.rows <= 128);
}

#[test]
fn cats_and_dogs_exact() {
    let (subs, refs) = cats_and_dogs();
    let cfg = exact().with_topk(3).with_min_score(0.2);
    let report = detector(cfg).detect(subs, refs).expect("detect");

    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    assert_eq!(result.submission_id, "sub-1");
    assert_eq!(result.params.topk, 3);
    assert_eq!(result.matches.len(), 1);

    let m = &result.matches[0];
    assert_eq!(m.reference_doc, "ref-1");
    assert_eq!((m.query_paragraph, m.reference_paragraph), (0, 0));
    assert!(m.score > 0.2);
    // 12 shared uniform-weight n-grams out of 12 and 24.
    assert!((m.score - 0.5f64.sqrt()).abs() < 1e-9, "score {}", m.score);
    assert_eq!(m.shared_shingles, 3);

    assert_eq!(m.query_spans.len(), 1);
    let span = m.query_spans[0];
    assert_eq!(&m.query_text[span.start..span.end], "paragraph about cats and dogs");
    let span = m.reference_spans[0];
    assert_eq!(&m.reference_text[span.start..span.end], "paragraph about cats and dogs");

    assert_eq!(result.reference_scores.len(), 2);
    assert_eq!(result.reference_scores[0].reference_doc, "ref-1");
    assert_eq!(result.reference_scores[1].reference_doc, "ref-2");
    assert_eq!(result.reference_scores[1].matched_paragraphs, 0);
    assert_eq!(result.reference_scores[1].best_score, 0.0);
}

#[test]
fn cats_and_dogs_with_lsh() {
    let (subs, refs) = cats_and_dogs();
    let cfg = DetectConfig::default().with_topk(3).with_min_score(0.2);
    let report = detector(cfg).detect(subs, refs).expect("detect");

    let matches = &report.results[0].matches;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].reference_doc, "ref-1");
    assert!(matches[0].score > 0.2);
    assert!(report.diagnostics.lsh_params.is_some());
}

#[test]
fn lsh_matches_are_subset_of_exact_with_same_scores() {
    let (subs, refs) = essay_corpus();
    let exact_report = detector(exact().with_topk(50))
        .detect(subs.clone(), refs.clone())
        .expect("exact");
    let lsh_report = detector(DetectConfig::default().with_topk(50))
        .detect(subs, refs)
        .expect("lsh");

    for (e, l) in exact_report.results.iter().zip(&lsh_report.results) {
        assert_eq!(e.submission_id, l.submission_id);
        for m in &l.matches {
            let same = e.matches.iter().find(|x| {
                x.reference_doc == m.reference_doc
                    && x.query_paragraph == m.query_paragraph
                    && x.reference_paragraph == m.reference_paragraph
            });
            let same = same.expect("lsh match missing from exact run");
            assert_eq!(same.score, m.score);
        }
    }
    assert!(
        lsh_report.diagnostics.plagiarism_candidates
            <= exact_report.diagnostics.plagiarism_candidates
    );
}

#[test]
fn lsh_recalls_near_duplicates() {
    let (subs, refs) = essay_corpus();
    let report = detector(DetectConfig::default().with_min_score(0.3))
        .detect(subs, refs)
        .expect("detect");

    let alice = &report.results[0];
    assert_eq!(alice.matches[0].reference_doc, "encyclopedia");
    assert_eq!(alice.matches[0].query_paragraph, 0);
    assert_eq!(alice.matches[0].reference_paragraph, 0);

    let bob = &report.results[1];
    let top = &bob.matches[0];
    assert_eq!((top.reference_doc.as_str(), top.reference_paragraph), ("textbook", 1));
    assert!(bob
        .matches
        .iter()
        .any(|m| m.reference_doc == "encyclopedia" && m.reference_paragraph == 1));
}

#[test]
fn matches_ranked_and_truncated_to_topk() {
    let refs = vec![SourceDocument::text(
        "ref",
        "alpha beta gamma delta epsilon zeta eta theta",
    )];
    let subs = vec![SourceDocument::text(
        "sub",
        "alpha beta gamma\n\n\
         alpha beta gamma delta epsilon zeta eta theta\n\n\
         alpha beta gamma delta epsilon",
    )];
    let report = detector(exact().with_topk(2)).detect(subs, refs).expect("detect");
    let result = &report.results[0];

    assert_eq!(result.matches.len(), 2);
    assert_eq!(result.matches[0].query_paragraph, 1);
    assert_eq!(result.matches[1].query_paragraph, 2);
    assert!(result.matches[0].score >= result.matches[1].score);
    // Summaries see every qualifying match, not just the kept ones.
    assert_eq!(result.reference_scores[0].matched_paragraphs, 3);
    assert!((result.reference_scores[0].best_score - 1.0).abs() < 1e-9);
}

#[test]
fn min_score_filters_weak_matches() {
    let (subs, refs) = cats_and_dogs();
    let report = detector(exact().with_min_score(0.9)).detect(subs, refs).expect("detect");
    assert!(report.results[0].matches.is_empty());
    assert_eq!(report.results[0].reference_scores[0].best_score, 0.0);
}

#[test]
fn collusion_pairs_are_ordered_and_exclude_self_pairs() {
    let shared = "the quick brown fox jumps over the lazy dog near the river bank";
    let subs = vec![
        SourceDocument::text("zeta", format!("{shared}\n\n{shared}")),
        SourceDocument::text("alpha", format!("an introduction nobody copied\n\n{shared}")),
        SourceDocument::text("mid", "completely separate vocabulary lives in here"),
    ];

    for cfg in [exact(), DetectConfig::default()] {
        let report = detector(cfg).detect(subs.clone(), Vec::new()).expect("detect");
        assert_eq!(report.collusion_pairs.len(), 1, "{:?}", report.collusion_pairs);
        let pair = &report.collusion_pairs[0];
        assert_eq!((pair.doc_a.as_str(), pair.doc_b.as_str()), ("alpha", "zeta"));
        // Two paragraphs of zeta against one of alpha. Alpha's introduction
        // shares no term with zeta, so its zero-cosine comparisons stay out
        // of the mean.
        assert_eq!(pair.comparisons, 2);
        assert!((pair.score - 1.0).abs() < 1e-9);
        assert_eq!(report.results[0].collusion_pairs, report.collusion_pairs);
    }
}

#[test]
fn collusion_without_overlap_is_empty() {
    let subs = vec![
        SourceDocument::text("a", "apples oranges pears"),
        SourceDocument::text("b", "granite basalt marble"),
    ];
    let run = {
        let d = detector(exact());
        let corpus = d.prepare(Collection::Submissions, subs).expect("prepare");
        d.collusion(&corpus).expect("collusion")
    };
    assert!(run.pairs.is_empty());
    assert_eq!(run.candidates_examined, 1);
}

#[test]
fn punctuation_only_documents_produce_nothing() {
    let subs = vec![
        SourceDocument::text("s1", "!!! ??? ..."),
        SourceDocument::text("s2", "--- ;;;"),
    ];
    let refs = vec![SourceDocument::text("r1", "*** ###")];
    let report = detector(DetectConfig::default()).detect(subs, refs).expect("detect");

    assert!(report.results.iter().all(|r| r.matches.is_empty()));
    assert!(report.collusion_pairs.is_empty());
    assert_eq!(report.diagnostics.dropped_empty, 3);
    assert_eq!(report.diagnostics.submission_paragraphs, 0);
}

#[test]
fn empty_inputs_are_not_errors() {
    let report = detector(DetectConfig::default()).detect(Vec::new(), Vec::new()).expect("detect");
    assert!(report.results.is_empty());
    assert!(report.collusion_pairs.is_empty());

    let (subs, _) = cats_and_dogs();
    let report = detector(DetectConfig::default()).detect(subs, Vec::new()).expect("detect");
    assert!(report.results[0].matches.is_empty());
    assert!(report.results[0].reference_scores.is_empty());
    assert_eq!(report.diagnostics.zero_vectors, 1);
}

#[test]
fn duplicate_ids_are_rejected() {
    let refs = vec![
        SourceDocument::text("same", "one"),
        SourceDocument::text("same", "two"),
    ];
    let err = detector(exact()).detect(Vec::new(), refs).unwrap_err();
    assert!(matches!(
        err,
        DetectError::DuplicateDocument {
            collection: Collection::References,
            ..
        }
    ));
}

#[test]
fn malformed_bytes_are_reported_not_fatal() {
    let mut bytes = b"A paragraph about cats and dogs appears here.\n\n".to_vec();
    bytes.extend_from_slice(&[0xC3, 0x28, b' ', b'x']);
    let subs = vec![SourceDocument::bytes("sub-1", bytes)];
    let (_, refs) = cats_and_dogs();

    let report = detector(exact()).detect(subs, refs).expect("detect");
    assert_eq!(report.results[0].matches.len(), 1);
    assert_eq!(report.diagnostics.skipped.len(), 1);
    let issue = &report.diagnostics.skipped[0];
    assert_eq!(issue.collection, Collection::Submissions);
    assert_eq!(issue.doc_id, "sub-1");
    assert_eq!(issue.paragraph, 1);
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let (subs, refs) = essay_corpus();
    let parallel = detector(DetectConfig::default().with_parallel(true))
        .detect(subs.clone(), refs.clone())
        .expect("parallel");
    let sequential = detector(DetectConfig::default().with_parallel(false))
        .detect(subs.clone(), refs.clone())
        .expect("sequential");
    assert_eq!(parallel, sequential);

    let again = detector(DetectConfig::default().with_parallel(true))
        .detect(subs, refs)
        .expect("repeat");
    assert_eq!(parallel, again);
}

#[test]
fn code_aware_detects_renamed_functions() {
    let original = "def total(items):\n    acc = 0\n    for x in items:\n        acc += x\n    return acc";
    let renamed = "def summe(werte):\n    s = 0\n    for w in werte:\n        s += w\n    return s";
    let subs = vec![SourceDocument::text("student", renamed)];
    let refs = vec![SourceDocument::text("solution", original)];

    let aware = Detector::new(exact(), code_normalizer()).expect("detector");
    let report = aware.detect(subs.clone(), refs.clone()).expect("detect");
    let m = &report.results[0].matches[0];
    assert!(m.score > 0.999, "score {}", m.score);
    assert_eq!(m.query_text, renamed);
    assert_eq!(report.diagnostics.code_paragraphs, 2);

    let plain = detector(exact()).detect(subs, refs).expect("detect");
    let plain_best = plain.results[0].reference_scores[0].best_score;
    assert!(plain_best < m.score);
}

#[test]
fn stemming_matches_inflected_wording() {
    let subs = vec![SourceDocument::text("student", "Cats chased mice")];
    let refs = vec![SourceDocument::text("source", "The cat chases a mouse")];

    let plain = detector(exact()).detect(subs.clone(), refs.clone()).expect("detect");
    assert!(plain.results[0].matches.is_empty());

    let stemming = Normalizer::new(NormalizeConfig::default().with_stemming(true))
        .expect("valid normalize config");
    let report = Detector::new(exact(), stemming)
        .expect("detector")
        .detect(subs, refs)
        .expect("detect");
    let m = &report.results[0].matches[0];
    assert!(m.score > 0.0, "score {}", m.score);
    assert_eq!(m.query_text, "cats chased mice");
}

#[test]
fn report_serializes_to_json() {
    let (subs, refs) = cats_and_dogs();
    let report = detector(exact()).detect(subs, refs).expect("detect");
    let json = serde_json::to_value(&report).expect("serialize");
    assert_eq!(json["results"][0]["submission_id"], "sub-1");
    assert_eq!(json["results"][0]["matches"][0]["reference_doc"], "ref-1");
    assert!(json["diagnostics"]["lsh_params"].is_null());
}
