//! Error types for the tree model.

use thiserror::Error;

use crate::node::NodeId;

/// Result type for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Structural invariant violations found by [`crate::MindMap::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Root id does not resolve to a node
    #[error("root {0} is not present in the node map")]
    DanglingRoot(NodeId),

    /// Root node has a parent
    #[error("root {0} has a parent")]
    RootHasParent(NodeId),

    /// A parentless node that is not the root
    #[error("node {0} has no parent but is not the root")]
    OrphanRoot(NodeId),

    /// A child id does not resolve
    #[error("node {parent} lists missing child {child}")]
    MissingChild { parent: NodeId, child: NodeId },

    /// The same child is listed twice
    #[error("node {parent} lists child {child} more than once")]
    DuplicateChild { parent: NodeId, child: NodeId },

    /// A child's parent pointer disagrees with the node listing it
    #[error("node {child} is listed by {listed_by} but points at {parent:?}")]
    ParentMismatch {
        child: NodeId,
        listed_by: NodeId,
        parent: Option<NodeId>,
    },

    /// A node's parent does not list it as a child
    #[error("node {child} is not listed by its parent {parent}")]
    NotListedByParent { child: NodeId, parent: NodeId },

    /// A node cannot be reached from the root
    #[error("node {0} is unreachable from the root")]
    Unreachable(NodeId),
}

/// Rejected label input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("label is required")]
    Empty,

    #[error("label must be at most {max} characters, got {len}")]
    TooLong { len: usize, max: usize },
}
