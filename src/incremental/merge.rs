//! Merge/reparent engine
//!
//! Splices a bounded-parse [`Fragment`] into a full tree:
//!
//! 1. every top-level node overlapping the replaced span is removed with its
//!    subtree
//! 2. nodes below the span move by the edit's line delta
//! 3. fragment nodes are copied in, keeping the body sorted by start
//! 4. each inserted subtree gets its parent links rewritten through every
//!    child collection
//!
//! An empty fragment still removes what it supersedes: the region is empty
//! after the edit.

use tracing::trace;

use crate::base::Span;
use crate::parser::{Fragment, SyntaxError};
use crate::syntax::{NodeId, NodeSnapshot, SyntaxTree};

/// Outcome of [`merge_incremental_results`]
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    /// Snapshots of the removed top-level nodes, in old coordinates
    pub removed: Vec<NodeSnapshot>,
    /// Ids of the inserted top-level nodes, in document order
    pub inserted: Vec<NodeId>,
    /// Top-level nodes moved by the line delta
    pub shifted: usize,
}

/// True when `range` must be replaced by a parse of `affected`.
pub fn supersedes(affected: &Span, range: &Span) -> bool {
    affected.overlaps(range) || (range.is_empty() && affected.contains(range.start))
}

/// Replace the top-level nodes of `tree` overlapping `affected` (old
/// coordinates) with the nodes of `fragment` (new coordinates). Nodes after
/// `affected` are moved by `line_delta`.
pub fn merge_incremental_results(
    tree: &mut SyntaxTree,
    affected: Span,
    fragment: &Fragment,
    line_delta: isize,
) -> MergeReport {
    let mut report = MergeReport::default();
    let mut kept = Vec::with_capacity(tree.body().len() + fragment.len());

    for id in tree.body().to_vec() {
        let range = tree[id].range;
        if supersedes(&affected, &range) {
            trace!(?id, ?range, "removing superseded node");
            report.removed.push(tree.snapshot_of(id));
            tree.free_subtree(id);
        } else {
            if range.start >= affected.end && line_delta != 0 {
                tree.shift_subtree(id, line_delta);
                report.shifted += 1;
            }
            kept.push(id);
        }
    }

    let root = tree.root();
    for &source in fragment.nodes() {
        let Some(id) = tree.graft(&fragment.tree, source) else {
            continue;
        };
        let start = tree[id].range.start;
        let at = kept.partition_point(|&other| tree[other].range.start <= start);
        kept.insert(at, id);
        tree.reparent(id, Some(root));
        report.inserted.push(id);
    }

    *tree.body_mut() = kept;
    report
}

/// Diagnostics counterpart of [`merge_incremental_results`]: drop errors in
/// the replaced span, move later ones, add the fragment's.
pub fn merge_diagnostics(
    errors: &mut Vec<SyntaxError>,
    affected: Span,
    fragment_errors: &[SyntaxError],
    line_delta: isize,
) {
    errors.retain(|error| !supersedes(&affected, &error.range));
    for error in errors.iter_mut() {
        if error.range.start >= affected.end {
            error.range.shift_lines(line_delta);
        }
    }
    errors.extend(fragment_errors.iter().cloned());
    errors.sort_by_key(|error| error.range.start);
}
