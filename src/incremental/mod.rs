//! Incremental re-parse machinery.
//!
//! - [`DirtyRangeTracker`]: which lines changed since the last parse
//! - [`RegionCache`]: bounded-parse results keyed by line range and content
//! - [`merge_incremental_results`]: splice a fragment into a full tree
//!
//! [`AnalysisHost`](crate::ide::AnalysisHost) drives these end to end.

mod dirty;
mod error;
mod merge;
mod options;
mod region_cache;

pub use dirty::{ChangeChannel, ChangeEvent, DirtyRangeTracker};
pub use error::IncrementalError;
pub use merge::{MergeReport, merge_diagnostics, merge_incremental_results, supersedes};
pub use options::IncrementalOptions;
pub use region_cache::RegionCache;
