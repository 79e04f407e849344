//! Parse sessions for editor integrations.
//!
//! Editor-surface features (hover, go-to-definition, folding, symbols) live
//! outside this crate and read trees through the narrow interface here:
//!
//! - [`AnalysisHost::parse_with_cache`]: full parse cached by content
//! - [`AnalysisHost::incremental_parse_with_cache`]: bounded re-parse + merge
//! - [`AnalysisHost::clear_document_cache`]: drop a closed document
//!
//! ## Usage
//!
//! ```ignore
//! use thriftls::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new();
//! let tree = host.parse_with_cache(&doc);
//! ```

mod analysis;
mod shared;

pub use analysis::{AnalysisHost, DocumentParse, IncrementalParse};
pub use shared::SharedAnalysisHost;
