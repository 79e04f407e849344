//! Thrift IDL parser
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind
//!     ↓
//! Parser → SyntaxTree (arena of typed nodes) + SyntaxErrors
//!     ↓
//! LineScan → per-line depth facts for region analysis
//! ```
//!
//! ## Bounded reparsing
//!
//! When text changes, the incremental layer:
//! 1. Widens the edited lines to declaration boundaries ([`analyze_affected_region`])
//! 2. Parses only those lines ([`parse_range`])
//! 3. Splices the resulting [`Fragment`] into the cached tree

pub mod annotations;
mod errors;
mod lexer;
mod lines;
#[allow(clippy::module_inception)]
mod parser;
mod region;
mod syntax_kind;

pub use annotations::{AnnotationParse, parse_annotations};
pub use errors::{ErrorCode, SyntaxError};
pub use lexer::{Lexer, Token, tokenize};
pub use lines::{LineInfo, LineScan, scan_lines};
pub use parser::{Fragment, Parse, parse, parse_cancellable, parse_range};
pub(crate) use parser::{parse_range_scanned, parse_scanned};
pub use region::{DEFAULT_REGION_WINDOW, affected_region, analyze_affected_region, snap_to_units};
pub use syntax_kind::SyntaxKind;
