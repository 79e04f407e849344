//! Annotation sub-parser
//!
//! Extracts trailing `(key = value, ...)` blocks from a single line of text.
//! Quotes (`'` and `"`) and backslash escapes are respected everywhere, so
//! parentheses inside string values never open or close a block.

use std::ops::Range;

use crate::syntax::{Annotation, AnnotationPair};

/// Result of [`parse_annotations`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnotationParse {
    pub annotations: Vec<Annotation>,
    /// Input with every matched annotation span removed, trimmed
    pub stripped_text: String,
    /// Matched spans, shifted by the caller's offset
    pub annotation_ranges: Vec<Range<usize>>,
}

/// Quote and escape state shared by every scan in this module
#[derive(Default)]
struct QuoteState {
    quote: Option<u8>,
    escaped: bool,
}

impl QuoteState {
    /// Feed one byte; returns true when the byte is structural (outside any
    /// quote and not escaped).
    fn feed(&mut self, byte: u8) -> bool {
        if self.escaped {
            self.escaped = false;
            return false;
        }
        if byte == b'\\' {
            self.escaped = true;
            return false;
        }
        match self.quote {
            Some(q) => {
                if byte == q {
                    self.quote = None;
                }
                false
            }
            None if byte == b'\'' || byte == b'"' => {
                self.quote = Some(byte);
                false
            }
            None => true,
        }
    }
}

/// Scan `text` for annotation blocks.
///
/// `file_offset` is added to every reported index so callers can pass a
/// slice and still get offsets into the originating line. Unmatched `(`
/// never fails: scanning resumes one character later.
pub fn parse_annotations(text: &str, file_offset: usize) -> AnnotationParse {
    let bytes = text.as_bytes();
    let mut result = AnnotationParse::default();
    let mut local_ranges: Vec<Range<usize>> = Vec::new();
    let mut state = QuoteState::default();
    let mut i = 0;

    while i < bytes.len() {
        let structural = state.feed(bytes[i]);
        if structural && bytes[i] == b'(' {
            if let Some(close) = find_matching_paren(bytes, i) {
                let inner = &text[i + 1..close];
                result.annotations.push(Annotation {
                    raw_text: text[i..=close].to_string(),
                    pairs: split_pairs(inner),
                    start_index: file_offset + i,
                    end_index: file_offset + close + 1,
                });
                local_ranges.push(i..close + 1);
                i = close + 1;
                continue;
            }
        }
        i += 1;
    }

    result.stripped_text = strip_ranges(text, &local_ranges);
    result.annotation_ranges = local_ranges
        .into_iter()
        .map(|r| r.start + file_offset..r.end + file_offset)
        .collect();
    result
}

/// Index of the `)` matching the `(` at `open`, counting nested parentheses
/// outside quotes.
fn find_matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut state = QuoteState::default();
    let mut depth = 0usize;
    for (idx, &byte) in bytes.iter().enumerate().skip(open) {
        if !state.feed(byte) {
            continue;
        }
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split the inside of a block on top-level commas and classify each piece.
fn split_pairs(inner: &str) -> Vec<AnnotationPair> {
    split_top_level(inner, b',')
        .into_iter()
        .filter_map(classify)
        .collect()
}

/// Split on `separator` when it is outside quotes and outside every `{}`,
/// `[]` and `()` nesting.
fn split_top_level(text: &str, separator: u8) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut state = QuoteState::default();
    let (mut curly, mut square, mut paren) = (0i32, 0i32, 0i32);
    let mut start = 0;
    for (idx, &byte) in text.as_bytes().iter().enumerate() {
        if !state.feed(byte) {
            continue;
        }
        match byte {
            b'{' => curly += 1,
            b'}' => curly -= 1,
            b'[' => square += 1,
            b']' => square -= 1,
            b'(' => paren += 1,
            b')' => paren -= 1,
            _ if byte == separator && curly <= 0 && square <= 0 && paren <= 0 => {
                pieces.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);
    pieces
}

/// Position of the first structural occurrence of `needle`
fn find_structural(text: &str, needle: u8) -> Option<usize> {
    let mut state = QuoteState::default();
    text.as_bytes()
        .iter()
        .enumerate()
        .find(|&(_, &byte)| state.feed(byte) && byte == needle)
        .map(|(idx, _)| idx)
}

fn classify(piece: &str) -> Option<AnnotationPair> {
    let piece = piece.trim();
    if piece.is_empty() {
        return None;
    }
    let eq = find_structural(piece, b'=');
    let brace = find_structural(piece, b'{');
    match (eq, brace) {
        (Some(eq), brace) if brace.is_none_or(|b| eq < b) => {
            let key = piece[..eq].trim();
            let value = piece[eq + 1..].trim();
            is_key(key).then(|| AnnotationPair::new(key, value))
        }
        (_, Some(brace)) => {
            let key = piece[..brace].trim();
            let value = piece[brace..].trim();
            is_key(key).then(|| AnnotationPair::new(key, value))
        }
        _ => is_key(piece).then(|| AnnotationPair::new(piece, "")),
    }
}

fn is_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

fn strip_ranges(text: &str, ranges: &[Range<usize>]) -> String {
    if ranges.is_empty() {
        return text.trim().to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for range in ranges {
        out.push_str(&text[cursor..range.start]);
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    out.trim().to_string()
}
