//! Overlap highlighting.
//!
//! A token is marked when any shared shingle covers it. Spans merge runs of
//! consecutive marked tokens into byte ranges over the paragraph text, which
//! is what a renderer needs to wrap the overlapping passages.

use serde::{Deserialize, Serialize};

use normalize::Token;
use sketch::{Shingle, ShingleSet};

/// Byte range `[start, end)` in a paragraph's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightedToken {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub is_match: bool,
}

/// Shingles present in both paragraphs.
pub fn shared_shingles(a: &ShingleSet, b: &ShingleSet) -> ShingleSet {
    ShingleSet::from_hashes(a.intersection(b))
}

fn covered(token_count: usize, shingles: &[Shingle], shared: &ShingleSet, n: usize) -> Vec<bool> {
    let mut marks = vec![false; token_count];
    for shingle in shingles.iter().filter(|s| shared.contains(s.hash)) {
        let end = (shingle.start + n).min(token_count);
        for mark in &mut marks[shingle.start.min(end)..end] {
            *mark = true;
        }
    }
    marks
}

/// Marks every token covered by a shared shingle, in token order.
pub fn highlight(
    tokens: &[Token],
    shingles: &[Shingle],
    shared: &ShingleSet,
    shingle_size: usize,
) -> Vec<HighlightedToken> {
    covered(tokens.len(), shingles, shared, shingle_size)
        .into_iter()
        .zip(tokens)
        .map(|(is_match, token)| HighlightedToken {
            text: token.text.clone(),
            start: token.start,
            end: token.end,
            is_match,
        })
        .collect()
}

/// Byte spans of maximal runs of marked tokens.
pub fn shared_spans(
    tokens: &[Token],
    shingles: &[Shingle],
    shared: &ShingleSet,
    shingle_size: usize,
) -> Vec<Span> {
    let marks = covered(tokens.len(), shingles, shared, shingle_size);
    let mut spans: Vec<Span> = Vec::new();
    let mut previous_marked = false;
    for (token, marked) in tokens.iter().zip(marks) {
        if marked {
            match spans.last_mut() {
                Some(span) if previous_marked => span.end = token.end,
                _ => spans.push(Span {
                    start: token.start,
                    end: token.end,
                }),
            }
        }
        previous_marked = marked;
    }
    spans
}

/// Wraps each span of `text` in `open`/`close` markers. Spans must be
/// ascending, non-overlapping and on char boundaries, as produced by
/// [`shared_spans`].
pub fn mark_spans(text: &str, spans: &[Span], open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len() + spans.len() * (open.len() + close.len()));
    let mut cursor = 0;
    for span in spans {
        let (start, end) = (span.start.max(cursor), span.end.min(text.len()));
        if start >= end || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            continue;
        }
        out.push_str(&text[cursor..start]);
        out.push_str(open);
        out.push_str(&text[start..end]);
        out.push_str(close);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}
