//! Syntax tree types for Thrift IDL.
//!
//! The tree is an arena ([`SyntaxTree`]) of typed [`Node`]s. Containers own
//! their children through id lists (`body`, `fields`, `members`,
//! `functions`, `arguments`, `throws`); every node also records its
//! immediate container in `parent` so consumers can walk scopes upward.

mod annotation;
mod node;
mod snapshot;
mod tree;

pub use annotation::{Annotation, AnnotationPair};
pub use node::{ChildCollection, CommentStyle, Node, NodeData, NodeId, NodeKind, Requiredness};
pub use snapshot::NodeSnapshot;
pub use tree::{SyntaxTree, TreeInvariantError};
