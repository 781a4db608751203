//! DOM operation errors

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Handle is stale or was never issued by this tree
    #[error("Node not found: {0:?}")]
    NotFound(NodeId),

    /// Inserting a node into itself, a descendant, or inserting a document
    #[error("Hierarchy request error: cannot insert {child:?} into {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// Node cannot hold children
    #[error("Invalid node type: {0:?} cannot have children")]
    InvalidNodeType(NodeId),

    /// Reference or removed node is not a child of the given parent
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// Only detached subtrees can be released
    #[error("Node {0:?} is still attached")]
    StillAttached(NodeId),
}
