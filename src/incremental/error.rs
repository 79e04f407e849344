//! Error types for the incremental parsing boundary.
//!
//! Syntax problems are diagnostics, not errors. These variants cover misuse
//! of the host API only.

use thiserror::Error;

use crate::base::{DocumentError, DocumentId};

/// Errors returned by the incremental host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncrementalError {
    /// No state is held for the document.
    #[error("unknown document: {0}")]
    UnknownDocument(DocumentId),

    /// The document's language is not handled by this host.
    #[error("unsupported language `{language_id}` for {document}")]
    UnsupportedLanguage {
        document: DocumentId,
        language_id: String,
    },

    /// A content change could not be applied.
    #[error(transparent)]
    Document(#[from] DocumentError),
}
