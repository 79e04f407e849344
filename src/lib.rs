//! # thriftls-base
//!
//! Incremental parser core for Thrift IDL: keeps an editor's syntax tree in
//! step with a changing buffer without re-parsing the whole document on
//! every keystroke.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide          → AnalysisHost (parse session), SharedAnalysisHost
//!   ↓
//! incremental  → Dirty-range tracker, region cache, merge/reparent engine
//!   ↓
//! parser       → Logos lexer, line scanner, annotations, recursive descent
//!   ↓
//! syntax       → Arena SyntaxTree, typed nodes, snapshots
//!   ↓
//! base         → Positions, LineIndex, TextDocument, fingerprints
//! ```

// ============================================================================
// MODULES (dependency order: base → syntax → parser → incremental → ide)
// ============================================================================

/// Foundation types: Position/Span/LineRange, LineIndex, documents
pub mod base;

/// Syntax: arena tree, typed nodes, annotations, snapshots
pub mod syntax;

/// Parser: Logos lexer, line scanner, grammar, affected-region analysis
pub mod parser;

/// Incremental machinery: dirty ranges, region cache, merge engine
pub mod incremental;

/// Parse sessions: cached and incremental parsing per document
pub mod ide;

// Re-export foundation types
pub use base::{ContentChange, DocumentId, LineIndex, LineRange, Position, Span, TextDocument};

// Re-export the parse surface
pub use ide::{AnalysisHost, IncrementalParse, SharedAnalysisHost};
pub use incremental::{
    ChangeChannel, ChangeEvent, DirtyRangeTracker, IncrementalError, IncrementalOptions,
    RegionCache, merge_incremental_results,
};
pub use parser::{
    Fragment, Parse, SyntaxError, analyze_affected_region, parse, parse_annotations,
    parse_cancellable, parse_range,
};
pub use syntax::{Node, NodeData, NodeId, NodeKind, SyntaxTree};
