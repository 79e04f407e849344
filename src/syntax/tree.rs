//! Arena-backed syntax tree.

use std::ops::Index;

use smol_str::SmolStr;
use thiserror::Error;

use super::node::{Node, NodeData, NodeId, NodeKind};
use crate::base::{Position, Span};

/// A parsed document: nodes stored in slots, referenced by [`NodeId`].
///
/// Freed subtrees leave empty slots that later allocations reuse, so ids of
/// untouched nodes stay stable across incremental merges.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    slots: Vec<Option<Node>>,
    free: Vec<NodeId>,
    root: NodeId,
}

/// Violations reported by [`SyntaxTree::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeInvariantError {
    #[error("child {child:?} of {parent:?} points at a freed slot")]
    Dangling { parent: NodeId, child: NodeId },

    #[error("siblings {first:?} and {second:?} under {parent:?} are out of order")]
    Unsorted {
        parent: NodeId,
        first: NodeId,
        second: NodeId,
    },

    #[error("siblings {first:?} and {second:?} under {parent:?} overlap")]
    Overlap {
        parent: NodeId,
        first: NodeId,
        second: NodeId,
    },

    #[error("{node:?} has parent {found:?}, expected {expected:?}")]
    ParentMismatch {
        node: NodeId,
        expected: Option<NodeId>,
        found: Option<NodeId>,
    },
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxTree {
    /// An empty document
    pub fn new() -> Self {
        let root = Node::new(NodeData::Document { body: Vec::new() }, Span::default());
        Self {
            slots: vec![Some(root)],
            free: Vec::new(),
            root: NodeId::from_index(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn document(&self) -> &Node {
        &self[self.root]
    }

    /// Top-level declarations in document order
    pub fn body(&self) -> &[NodeId] {
        match &self.document().data {
            NodeData::Document { body } => body,
            _ => &[],
        }
    }

    pub(crate) fn body_mut(&mut self) -> &mut Vec<NodeId> {
        let root = self.root;
        match self.get_mut(root).map(|node| &mut node.data) {
            Some(NodeData::Document { body }) => body,
            _ => unreachable!("root slot always holds a document"),
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Number of live nodes, the document included
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// True when the document has no declarations
    pub fn is_empty(&self) -> bool {
        self.body().is_empty()
    }

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id.index()] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId::from_index(self.slots.len() - 1)
            }
        }
    }

    /// Release `id` and everything below it. The caller unlinks it from its
    /// container.
    pub(crate) fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if current == self.root {
                continue;
            }
            if let Some(node) = self.slots.get_mut(current.index()).and_then(Option::take) {
                stack.extend(node.children());
                self.free.push(current);
            }
        }
    }

    pub fn set_document_range(&mut self, range: Span) {
        let root = self.root;
        if let Some(node) = self.get_mut(root) {
            node.range = range;
        }
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(Node::kind)
    }

    /// Direct children of `id` across every structural collection
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id)
            .map(|node| node.children().collect())
            .unwrap_or_default()
    }

    /// `id` and all nodes below it, preorder
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            out.push(current);
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Walk parent links from `id` up to the document
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.get(id).and_then(|node| node.parent);
        while let Some(parent) = current {
            out.push(parent);
            current = self.get(parent).and_then(|node| node.parent);
        }
        out
    }

    /// Deepest node whose range contains `position`
    pub fn node_at(&self, position: Position) -> Option<NodeId> {
        let mut current = self.root;
        loop {
            let next = self[current]
                .children()
                .find(|&child| self.get(child).is_some_and(|n| n.range.contains(position)));
            match next {
                Some(child) => current = child,
                None => break,
            }
        }
        (current != self.root).then_some(current)
    }

    /// First top-level declaration called `name`
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.body()
            .iter()
            .copied()
            .find(|&id| self.get(id).and_then(Node::name) == Some(name))
    }

    /// Top-level declarations of one kind
    pub fn declarations_of(&self, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.body()
            .iter()
            .copied()
            .filter(move |&id| self.kind(id) == Some(kind))
    }

    /// Deep-copy the subtree at `id` in `source` into this arena.
    ///
    /// The copy's root has no parent; callers link it and run
    /// [`SyntaxTree::reparent`].
    pub(crate) fn graft(&mut self, source: &SyntaxTree, id: NodeId) -> Option<NodeId> {
        let mut node = source.get(id)?.clone();
        node.parent = None;
        for list in node.data.collections_mut() {
            let mut copied = Vec::with_capacity(list.len());
            for &child in list.iter() {
                if let Some(new_child) = self.graft(source, child) {
                    copied.push(new_child);
                }
            }
            *list = copied;
        }
        Some(self.alloc(node))
    }

    /// Point every node below `id` at its immediate structural container and
    /// `id` itself at `parent`.
    pub fn reparent(&mut self, id: NodeId, parent: Option<NodeId>) {
        let mut stack = vec![(id, parent)];
        while let Some((current, parent)) = stack.pop() {
            let Some(node) = self.get_mut(current) else {
                continue;
            };
            node.parent = parent;
            stack.extend(node.children().map(|child| (child, Some(current))));
        }
    }

    /// Move `id` and its subtree by `delta` lines
    pub(crate) fn shift_subtree(&mut self, id: NodeId, delta: isize) {
        if delta == 0 {
            return;
        }
        for node_id in self.descendants(id) {
            if let Some(node) = self.get_mut(node_id) {
                node.range.shift_lines(delta);
                if let Some(name_range) = node.name_range.as_mut() {
                    name_range.shift_lines(delta);
                }
            }
        }
    }

    /// Check ordering, non-overlap and parent linkage for every collection.
    pub fn validate(&self) -> Result<(), TreeInvariantError> {
        if let Some(found) = self.document().parent {
            return Err(TreeInvariantError::ParentMismatch {
                node: self.root,
                expected: None,
                found: Some(found),
            });
        }
        for id in self.descendants(self.root) {
            let node = &self[id];
            for (_, list) in node.data.collections() {
                for &child in list {
                    let Some(child_node) = self.get(child) else {
                        return Err(TreeInvariantError::Dangling { parent: id, child });
                    };
                    if child_node.parent != Some(id) {
                        return Err(TreeInvariantError::ParentMismatch {
                            node: child,
                            expected: Some(id),
                            found: child_node.parent,
                        });
                    }
                }
                for pair in list.windows(2) {
                    let (first, second) = (pair[0], pair[1]);
                    let (a, b) = (&self[first].range, &self[second].range);
                    if a.start > b.start {
                        return Err(TreeInvariantError::Unsorted {
                            parent: id,
                            first,
                            second,
                        });
                    }
                    if a.overlaps(b) {
                        return Err(TreeInvariantError::Overlap {
                            parent: id,
                            first,
                            second,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Names of the top-level declarations, in order
    pub fn top_level_names(&self) -> Vec<SmolStr> {
        self.body()
            .iter()
            .filter_map(|&id| self.get(id).and_then(|node| node.name.clone()))
            .collect()
    }
}

impl Index<NodeId> for SyntaxTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {id:?} is not live in this tree"),
        }
    }
}
