//! Foundation types for the thriftls toolchain.
//!
//! This module provides fundamental types used throughout the parser:
//! - [`Position`], [`Span`] - Line/character positions for syntax nodes
//! - [`LineRange`] - Inclusive whole-line spans (dirty ranges, cache keys)
//! - [`LineIndex`] - Byte offset ↔ position conversion
//! - [`TextSize`], [`TextRange`] - Byte offsets, re-exported from `text-size`
//! - [`DocumentId`], [`TextDocument`], [`ContentChange`] - Live documents
//! - [`ContentFingerprint`] - Cache validation digests
//!
//! This module has NO dependencies on other thriftls modules.

mod document;
mod fingerprint;
mod line_index;
mod position;

pub use document::{ContentChange, DocumentError, DocumentId, TextDocument};
pub use fingerprint::ContentFingerprint;
pub use line_index::LineIndex;
pub use position::{LineRange, Position, Span};

// Re-export text-size types for convenience
pub use text_size;
pub use text_size::{TextRange, TextSize};
