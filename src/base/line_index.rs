//! Byte offset ↔ line/character conversion.

use text_size::{TextRange, TextSize};

use super::position::{LineRange, Position};

/// Precomputed line start offsets for a piece of text.
///
/// The index does not own the text; every lookup takes the same text the
/// index was built from. Lines end at `\n`; a preceding `\r` is treated as
/// part of the terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        let mut offset = TextSize::from(0);
        for line in text.split_inclusive('\n') {
            offset += TextSize::of(line);
            if line.ends_with('\n') {
                line_starts.push(offset);
            }
        }
        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    /// Number of lines (an empty text has one empty line)
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn last_line(&self) -> usize {
        self.line_starts.len() - 1
    }

    /// Length of the indexed text
    pub fn len(&self) -> TextSize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == TextSize::from(0)
    }

    /// Byte offset where `line` starts; lines past the end map to the text length.
    pub fn line_start(&self, line: usize) -> TextSize {
        self.line_starts.get(line).copied().unwrap_or(self.len)
    }

    /// Byte offset where `line` ends, excluding its terminator.
    pub fn line_end(&self, text: &str, line: usize) -> TextSize {
        let Some(&next) = self.line_starts.get(line + 1) else {
            return self.len;
        };
        let mut end = next - TextSize::of('\n');
        if end > self.line_start(line) && text.as_bytes().get(usize::from(end) - 1) == Some(&b'\r') {
            end -= TextSize::of('\r');
        }
        end
    }

    /// Text of a single line without its terminator.
    pub fn line_text<'a>(&self, text: &'a str, line: usize) -> &'a str {
        if line >= self.line_count() {
            return "";
        }
        &text[TextRange::new(self.line_start(line), self.line_end(text, line))]
    }

    /// Byte range covering every line in `lines`, including the terminator of
    /// the last one.
    pub fn byte_range(&self, lines: LineRange) -> TextRange {
        let start = self.line_start(lines.start);
        let end = self.line_start(lines.end + 1).max(start);
        TextRange::new(start, end)
    }

    /// Line containing byte `offset`
    pub fn line_of(&self, offset: TextSize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset) - 1
    }

    /// Convert a byte offset to a position.
    pub fn position(&self, text: &str, offset: TextSize) -> Position {
        let offset = floor_char_boundary(text, offset.min(self.len));
        let line = self.line_of(offset);
        let start = self.line_start(line);
        let character = text[TextRange::new(start, offset)].encode_utf16().count();
        Position::new(line, character)
    }

    /// Convert a position to a byte offset.
    ///
    /// Positions past the end of a line clamp to the line end; lines past the
    /// end of the text clamp to the text length.
    pub fn offset(&self, text: &str, position: Position) -> TextSize {
        if position.line >= self.line_count() {
            return self.len;
        }
        let start = self.line_start(position.line);
        let end = self.line_end(text, position.line);
        let mut units = 0;
        let mut offset = start;
        for ch in text[TextRange::new(start, end)].chars() {
            if units >= position.character {
                return offset;
            }
            units += ch.len_utf16();
            offset += TextSize::of(ch);
        }
        end
    }
}

fn floor_char_boundary(text: &str, offset: TextSize) -> TextSize {
    let mut offset = usize::from(offset);
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    TextSize::of(&text[..offset])
}
