//! Syntax diagnostics
//!
//! Syntax problems never abort a parse. The parser records a [`SyntaxError`]
//! and keeps building a best-effort tree.
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Lexical errors (invalid tokens)
//! - E02xx: Structural errors (braces, delimiters)
//! - E03xx: Declaration errors (names, types, annotations)

use std::fmt;

use crate::base::Span;

/// Error codes for parser diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical errors
    // =========================================================================
    /// Invalid or unexpected character in source
    E0101,
    /// Unterminated string literal
    E0102,
    /// Unterminated block comment
    E0103,

    // =========================================================================
    // E02xx: Structural errors
    // =========================================================================
    /// Block opened with `{` or `(` never closed
    E0201,
    /// Closing brace with nothing to close
    E0202,
    /// Token that does not fit where it appears
    E0203,

    // =========================================================================
    // E03xx: Declaration errors
    // =========================================================================
    /// Missing identifier/name
    E0301,
    /// Missing or malformed type
    E0302,
    /// Annotation block with no declaration to attach to
    E0303,
    /// Missing value after `=`
    E0304,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0103 => "E0103",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0301 => "E0301",
            Self::E0302 => "E0302",
            Self::E0303 => "E0303",
            Self::E0304 => "E0304",
        }
    }

    /// Short description
    pub fn description(&self) -> &'static str {
        match self {
            Self::E0101 => "invalid character",
            Self::E0102 => "unterminated string literal",
            Self::E0103 => "unterminated block comment",
            Self::E0201 => "unterminated block",
            Self::E0202 => "unmatched closing brace",
            Self::E0203 => "unexpected token",
            Self::E0301 => "missing name",
            Self::E0302 => "missing type",
            Self::E0303 => "orphan annotation",
            Self::E0304 => "missing value",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A syntax diagnostic with location and code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: Span,
    pub code: ErrorCode,
    /// Optional suggestion for fixing the error
    pub hint: Option<String>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: Span, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            range,
            code,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Format the error for display
    pub fn format(&self) -> String {
        let mut result = format!(
            "{}:{}: {}: {}",
            self.range.start.line + 1,
            self.range.start.character + 1,
            self.code,
            self.message
        );
        if let Some(hint) = &self.hint {
            result.push_str(&format!("\n  hint: {}", hint));
        }
        result
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}
