//! stayknit DOM - host tree and hyperscript API
//!
//! Arena-backed document tree plus the three live primitives (`h`, `add`,
//! `rm`) that markup is built with. The tracker in `stayknit-trace` wraps
//! these primitives; nothing in this crate knows about it.

mod node;
mod tree;
mod document;
mod operations;
pub mod hyperscript;

pub use node::{Node, NodeData, ElementData, Attribute};
pub use tree::{DomTree, Children};
pub use document::Document;
pub use operations::{DomError, DomResult};
pub use hyperscript::{Api, Factory, Hook, Markup, Value};

use std::fmt;

/// Node identifier (arena index + slot generation)
///
/// A handle stays valid until its subtree is released; after that every
/// lookup with it fails, even if the slot has been reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation this handle was issued for
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}
