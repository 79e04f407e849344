//! Owned, id-free views of a tree for comparison and export.

use smol_str::SmolStr;

use super::annotation::Annotation;
use super::node::{NodeId, NodeKind};
use super::tree::SyntaxTree;
use crate::base::Span;

/// Structural copy of a subtree.
///
/// Two trees are structurally identical when their snapshots compare equal:
/// same kinds, names, ranges, payload summaries and ordering, regardless of
/// arena ids.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSnapshot {
    pub kind: NodeKind,
    pub name: Option<SmolStr>,
    pub range: Span,
    pub detail: String,
    pub annotations: Vec<Annotation>,
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn find(&self, kind: NodeKind, name: &str) -> Option<&NodeSnapshot> {
        if self.kind == kind && self.name.as_deref() == Some(name) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(kind, name))
    }

    pub fn child_names(&self) -> Vec<&str> {
        self.children
            .iter()
            .filter_map(|child| child.name.as_deref())
            .collect()
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl SyntaxTree {
    /// Snapshot of the whole document
    pub fn snapshot(&self) -> NodeSnapshot {
        self.snapshot_of(self.root())
    }

    /// Snapshot of the subtree rooted at `id`
    pub fn snapshot_of(&self, id: NodeId) -> NodeSnapshot {
        let node = &self[id];
        NodeSnapshot {
            kind: node.kind(),
            name: node.name.clone(),
            range: node.range,
            detail: node.data.detail(),
            annotations: node.annotations.clone(),
            children: node
                .children()
                .filter(|&child| self.get(child).is_some())
                .map(|child| self.snapshot_of(child))
                .collect(),
        }
    }
}
