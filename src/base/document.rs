//! Live text documents and editor content changes.

use smol_str::SmolStr;
use thiserror::Error;

use super::fingerprint::ContentFingerprint;
use super::line_index::LineIndex;
use super::position::Span;

/// Identity of an open document (usually its URI). Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentId(SmolStr);

impl DocumentId {
    pub fn new(uri: impl AsRef<str>) -> Self {
        Self(SmolStr::new(uri.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

/// One content change reported by the editor.
///
/// `range` is expressed in the coordinates of the document *before* the
/// change; `None` replaces the whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    pub range: Option<Span>,
    pub text: String,
}

impl ContentChange {
    pub fn replace(range: Span, text: impl Into<String>) -> Self {
        Self {
            range: Some(range),
            text: text.into(),
        }
    }

    pub fn full(text: impl Into<String>) -> Self {
        Self {
            range: None,
            text: text.into(),
        }
    }

    /// Reject ranges that end before they start.
    pub fn check(&self) -> Result<(), DocumentError> {
        match self.range {
            Some(range) if range.end < range.start => Err(DocumentError::InvertedRange {
                start_line: range.start.line,
                start_character: range.start.character,
                end_line: range.end.line,
                end_character: range.end.character,
            }),
            _ => Ok(()),
        }
    }

    /// Number of line breaks in the inserted text
    pub fn inserted_line_breaks(&self) -> usize {
        self.text.bytes().filter(|&b| b == b'\n').count()
    }
}

/// Errors raised while applying content changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The change range ends before it starts.
    #[error("inverted change range {start_line}:{start_character}..{end_line}:{end_character}")]
    InvertedRange {
        start_line: usize,
        start_character: usize,
        end_line: usize,
        end_character: usize,
    },
}

/// The live buffer for one open document.
#[derive(Debug, Clone)]
pub struct TextDocument {
    id: DocumentId,
    language_id: SmolStr,
    version: i32,
    text: String,
    line_index: LineIndex,
}

impl TextDocument {
    pub fn new(
        id: impl Into<DocumentId>,
        language_id: impl AsRef<str>,
        version: i32,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let line_index = LineIndex::new(&text);
        Self {
            id: id.into(),
            language_id: SmolStr::new(language_id.as_ref()),
            version,
            text,
            line_index,
        }
    }

    /// Convenience constructor for a Thrift document
    pub fn thrift(id: impl Into<DocumentId>, text: impl Into<String>) -> Self {
        Self::new(id, "thrift", 0, text)
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn line_count(&self) -> usize {
        self.line_index.line_count()
    }

    pub fn fingerprint(&self) -> ContentFingerprint {
        ContentFingerprint::of(&self.text)
    }

    /// Apply a single change to the buffer and return it as applied.
    ///
    /// Positions past the end of a line or of the document clamp, the way
    /// editors expect; the returned change carries the clamped range.
    pub fn apply_change(&mut self, change: &ContentChange) -> Result<ContentChange, DocumentError> {
        change.check()?;
        Ok(self.apply_checked(change))
    }

    /// Apply a batch of changes in order and bump the version.
    ///
    /// The batch is checked before anything is applied: on error the buffer
    /// and version are untouched. Returns the changes as applied.
    pub fn apply_changes(
        &mut self,
        version: i32,
        changes: &[ContentChange],
    ) -> Result<Vec<ContentChange>, DocumentError> {
        for change in changes {
            change.check()?;
        }
        let applied = changes
            .iter()
            .map(|change| self.apply_checked(change))
            .collect();
        self.version = version;
        Ok(applied)
    }

    fn apply_checked(&mut self, change: &ContentChange) -> ContentChange {
        let applied = match change.range {
            None => {
                self.text.clone_from(&change.text);
                change.clone()
            }
            Some(range) => {
                let start = self.line_index.offset(&self.text, range.start);
                let end = self.line_index.offset(&self.text, range.end).max(start);
                let clamped = Span::new(
                    self.line_index.position(&self.text, start),
                    self.line_index.position(&self.text, end),
                );
                self.text
                    .replace_range(usize::from(start)..usize::from(end), &change.text);
                ContentChange::replace(clamped, change.text.clone())
            }
        };
        self.line_index = LineIndex::new(&self.text);
        applied
    }
}
