//! Tracker faults
//!
//! None of these are returned to callers of `h`/`add`/`rm`; they mean the
//! shadow table disagrees with the live tree, either because the tree was
//! mutated behind the tracker's back or because of a bookkeeping bug.

use stayknit_dom::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// Attached under a new boundary while an older boundary still lists it
    #[error("component {node:?} is already tracked under {owner:?}, attaching under {target:?}")]
    AlreadyTracked { node: NodeId, owner: NodeId, target: NodeId },

    /// Connected component missing from its nearest tracked ancestor's set
    #[error("connected component {node:?} is not in the boundary set of {expected:?}")]
    Untracked { node: NodeId, expected: NodeId },

    /// A guard entry survived on a node inside the rendered document
    #[error("guard entry left on connected node {node:?}")]
    StrayGuard { node: NodeId },

    /// Boundary sets only ever hold components
    #[error("{member:?} in the boundary set of {key:?} is not a component")]
    NotAComponent { key: NodeId, member: NodeId },

    /// Reverse index out of step with the sets
    #[error("{member:?} is in the boundary set of {key:?} but indexed under {owner:?}")]
    OwnerMismatch { member: NodeId, key: NodeId, owner: Option<NodeId> },
}
