//! Canonical text for a single paragraph.

use std::borrow::Cow;

use unicode_categories::UnicodeCategories;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::NormalizeConfig;

/// Produces the canonical form of a paragraph: NFKC (optional), lowercase
/// (optional), punctuation turned into delimiters (optional) and whitespace
/// collapsed to single ASCII spaces with no leading or trailing space.
///
/// ```rust
/// use normalize::{canonical_text, NormalizeConfig};
///
/// let cfg = NormalizeConfig::default();
/// assert_eq!(canonical_text("  Hello,   WORLD!  ", &cfg), "hello world");
/// ```
pub fn canonical_text(input: &str, cfg: &NormalizeConfig) -> String {
    let normalized: Cow<str> = if cfg.normalize_unicode {
        Cow::Owned(input.nfkc().collect::<String>())
    } else {
        Cow::Borrowed(input)
    };

    let mut out = String::with_capacity(normalized.len());
    let mut pending_space = false;

    // Graphemes keep combining sequences together; lowercasing can expand a
    // single char into several.
    for grapheme in normalized.graphemes(true) {
        if cfg.lowercase {
            for ch in grapheme.to_lowercase().chars() {
                push_char(ch, cfg, &mut out, &mut pending_space);
            }
        } else {
            for ch in grapheme.chars() {
                push_char(ch, cfg, &mut out, &mut pending_space);
            }
        }
    }
    out
}

fn push_char(ch: char, cfg: &NormalizeConfig, out: &mut String, pending_space: &mut bool) {
    if is_delimiter(ch, cfg) {
        if !out.is_empty() {
            *pending_space = true;
        }
        return;
    }
    if *pending_space {
        out.push(' ');
        *pending_space = false;
    }
    out.push(ch);
}

#[inline]
fn is_delimiter(ch: char, cfg: &NormalizeConfig) -> bool {
    ch.is_whitespace()
        || ch.is_control()
        || (cfg.strip_punctuation && (ch.is_punctuation() || ch.is_ascii_punctuation()))
}
