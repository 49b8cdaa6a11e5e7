//! Paragraph splitting.
//!
//! A paragraph break is one or more blank lines (lines holding nothing but
//! whitespace). Each paragraph is trimmed; blocks that are empty after
//! trimming are not paragraphs at all. Indices count the non-empty blocks in
//! source order and never change afterwards, even when a later stage drops a
//! paragraph whose normalized text turns out empty.

use std::ops::Range;

/// A paragraph candidate borrowed from the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawParagraph<'a> {
    pub index: usize,
    pub text: &'a str,
}

/// A paragraph candidate borrowed from raw bytes, not yet decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawParagraphBytes<'a> {
    pub index: usize,
    pub bytes: &'a [u8],
}

/// Splits `raw` into trimmed, non-empty paragraphs.
///
/// ```rust
/// use normalize::split_paragraphs;
///
/// let paras = split_paragraphs("first line\nstill first\n\n  \n second ");
/// assert_eq!(paras.len(), 2);
/// assert_eq!(paras[0].text, "first line\nstill first");
/// assert_eq!(paras[1].text, "second");
/// ```
pub fn split_paragraphs(raw: &str) -> Vec<RawParagraph<'_>> {
    let mut out = Vec::new();
    let mut block_start: Option<usize> = None;
    let mut offset = 0usize;

    for line in raw.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(start) = block_start.take() {
                push_str_block(raw, start..offset, &mut out);
            }
        } else if block_start.is_none() {
            block_start = Some(offset);
        }
        offset += line.len();
    }
    if let Some(start) = block_start {
        push_str_block(raw, start..raw.len(), &mut out);
    }
    out
}

fn push_str_block<'a>(raw: &'a str, range: Range<usize>, out: &mut Vec<RawParagraph<'a>>) {
    let text = raw[range].trim();
    if !text.is_empty() {
        out.push(RawParagraph {
            index: out.len(),
            text,
        });
    }
}

/// Splits raw bytes into paragraphs without decoding them, so a malformed
/// sequence only affects the paragraph it sits in.
pub fn split_paragraph_bytes(raw: &[u8]) -> Vec<RawParagraphBytes<'_>> {
    let mut out = Vec::new();
    let mut block_start: Option<usize> = None;
    let mut offset = 0usize;

    for line in raw.split_inclusive(|&b| b == b'\n') {
        if line.iter().all(u8::is_ascii_whitespace) {
            if let Some(start) = block_start.take() {
                push_byte_block(&raw[start..offset], &mut out);
            }
        } else if block_start.is_none() {
            block_start = Some(offset);
        }
        offset += line.len();
    }
    if let Some(start) = block_start {
        push_byte_block(&raw[start..], &mut out);
    }
    out
}

fn push_byte_block<'a>(block: &'a [u8], out: &mut Vec<RawParagraphBytes<'a>>) {
    let bytes = trim_ascii_whitespace(block);
    if !bytes.is_empty() {
        out.push(RawParagraphBytes {
            index: out.len(),
            bytes,
        });
    }
}

fn trim_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |idx| idx + 1);
    &bytes[start..end]
}
