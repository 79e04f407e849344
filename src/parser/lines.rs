//! Line scanner
//!
//! One lexical pass over the document that records, for every line, the
//! facts the affected-region analysis needs: bracket depth on entry and
//! exit, whether the line is blank or comment-only, whether it opens a
//! top-level declaration, and whether it sits inside a block comment.
//!
//! The scan also fixes the *units* of a document: runs of lines that the
//! parser always reads together. A unit starts at line 0 and at every line
//! outside brackets and block comments that is blank, comment-only or opens
//! a declaration, or that follows a blank line or a line closing a block.
//! No declaration, comment or error crosses a unit start, so any run of
//! whole units parses the same on its own as inside the full document.

use super::lexer::Lexer;
use super::syntax_kind::SyntaxKind;
use crate::base::{LineIndex, LineRange};

/// Per-line lexical facts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineInfo {
    /// Bracket depth (`{`, `[`, `(` combined) at the start of the line
    pub depth_before: usize,
    /// Bracket depth after the last token of the line
    pub depth_after: usize,
    /// First significant (non-trivia) token on the line
    pub first_token: Option<SyntaxKind>,
    /// No tokens other than whitespace, and not inside a block comment
    pub blank: bool,
    /// Only comments (and whitespace) on the line
    pub comment_only: bool,
    /// The line begins inside a block comment opened on an earlier line
    pub starts_in_comment: bool,
    /// A block comment is still open at the end of the line
    pub ends_in_comment: bool,
}

impl LineInfo {
    /// Opens a declaration at top level (`struct`, `enum`, `service`, ...)
    pub fn is_top_level_declaration(&self) -> bool {
        self.depth_before == 0 && self.first_token.is_some_and(SyntaxKind::is_declaration_keyword)
    }

    /// Blank line outside every block
    pub fn is_top_level_blank(&self) -> bool {
        self.blank && self.depth_before == 0
    }

    /// Starts with a closing bracket
    pub fn starts_with_closer(&self) -> bool {
        self.first_token.is_some_and(SyntaxKind::is_closer)
    }
}

/// Scan result for a whole document
#[derive(Debug, Clone, Default)]
pub struct LineScan {
    lines: Vec<LineInfo>,
}

impl LineScan {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn get(&self, line: usize) -> Option<&LineInfo> {
        self.lines.get(line)
    }

    pub fn lines(&self) -> &[LineInfo] {
        &self.lines
    }

    /// Whether a unit starts at `line`. Line 0 and the line past the end
    /// always do.
    pub fn is_unit_start(&self, line: usize) -> bool {
        if line == 0 || line >= self.lines.len() {
            return true;
        }
        let info = &self.lines[line];
        if info.depth_before != 0 || info.starts_in_comment {
            return false;
        }
        let prev = &self.lines[line - 1];
        info.blank
            || info.comment_only
            || info.is_top_level_declaration()
            || prev.blank
            || prev.depth_before > 0
    }

    /// Unit starts strictly inside `lines`, in order
    pub fn unit_starts(&self, lines: LineRange) -> impl Iterator<Item = usize> + '_ {
        (lines.start + 1..=lines.end).filter(|&line| self.is_unit_start(line))
    }
}

impl std::ops::Index<usize> for LineScan {
    type Output = LineInfo;

    fn index(&self, line: usize) -> &LineInfo {
        &self.lines[line]
    }
}

/// Scan every line of `text`.
pub fn scan_lines(text: &str, index: &LineIndex) -> LineScan {
    let count = index.line_count();
    let mut lines = vec![
        LineInfo {
            blank: true,
            ..LineInfo::default()
        };
        count
    ];
    let mut depth_after: Vec<Option<usize>> = vec![None; count];
    let mut significant = vec![false; count];
    let mut depth = 0usize;

    for token in Lexer::new(text) {
        match token.kind {
            SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE => continue,
            SyntaxKind::BLOCK_COMMENT => {
                let first = index.line_of(token.offset);
                // An unterminated comment swallows every remaining line
                let last = if token.is_unterminated_comment() {
                    count - 1
                } else {
                    index.line_of(token.last_byte())
                };
                for line in first..=last {
                    lines[line].blank = false;
                    if line > first {
                        lines[line].starts_in_comment = true;
                    }
                    if line < last {
                        lines[line].ends_in_comment = true;
                    }
                }
                if token.is_unterminated_comment() {
                    lines[last].ends_in_comment = true;
                }
            }
            SyntaxKind::LINE_COMMENT | SyntaxKind::HASH_COMMENT => {
                lines[index.line_of(token.offset)].blank = false;
            }
            kind => {
                let line = index.line_of(token.offset);
                lines[line].blank = false;
                if !significant[line] {
                    significant[line] = true;
                    lines[line].first_token = Some(kind);
                }
                if kind.is_opener() {
                    depth += 1;
                    depth_after[line] = Some(depth);
                } else if kind.is_closer() {
                    depth = depth.saturating_sub(1);
                    depth_after[line] = Some(depth);
                }
            }
        }
    }

    let mut running = 0usize;
    for (line, info) in lines.iter_mut().enumerate() {
        info.depth_before = running;
        info.depth_after = depth_after[line].unwrap_or(running);
        info.comment_only = !info.blank && !significant[line];
        running = info.depth_after;
    }

    LineScan { lines }
}
