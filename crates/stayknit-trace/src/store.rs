//! Shadow table
//!
//! All connections between components and their nearest component
//! descendants live in `tree`. Elements that aren't components but hold
//! component descendants are kept there too (guards), so those descendants
//! can be handed to a real ancestor once the element is attached. Every
//! component has an entry, even one with no children.

use std::fmt;

use indexmap::IndexSet;
use stayknit_dom::{Hook, NodeId};

use crate::weak::{Liveness, WeakMap};

/// Nearest tracked descendants of a node, in the order they were added
pub type BoundarySet = IndexSet<NodeId>;

/// A factory invocation in progress; becomes the component's metadata
#[derive(Clone)]
pub struct RenderFrame {
    pub name: String,
    pub on_attach: Vec<Hook>,
    pub on_detach: Vec<Hook>,
}

/// Metadata recorded against a component node
pub type InstanceMeta = RenderFrame;

impl RenderFrame {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), on_attach: Vec::new(), on_detach: Vec::new() }
    }
}

impl fmt::Debug for RenderFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderFrame")
            .field("name", &self.name)
            .field("on_attach", &self.on_attach.len())
            .field("on_detach", &self.on_detach.len())
            .finish()
    }
}

/// Tracker state: render stack, shadow table and component metadata
#[derive(Debug, Default)]
pub struct DataStore {
    /// Factories write here during render; moved to `meta` afterwards
    stack: Vec<RenderFrame>,
    tree: WeakMap<BoundarySet>,
    meta: WeakMap<InstanceMeta>,
    /// Reverse index: member -> key whose set holds it
    owners: WeakMap<NodeId>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- render stack ---

    pub fn push_frame(&mut self, frame: RenderFrame) {
        self.stack.push(frame);
    }

    pub fn pop_frame(&mut self) -> Option<RenderFrame> {
        self.stack.pop()
    }

    /// Innermost factory currently rendering
    pub fn current_frame(&self) -> Option<&RenderFrame> {
        self.stack.last()
    }

    pub fn current_frame_mut(&mut self) -> Option<&mut RenderFrame> {
        self.stack.last_mut()
    }

    pub fn render_depth(&self) -> usize {
        self.stack.len()
    }

    // --- shadow table ---

    pub fn boundary(&self, node: NodeId) -> Option<&BoundarySet> {
        self.tree.get(node)
    }

    pub fn has_boundary(&self, node: NodeId) -> bool {
        self.tree.has(node)
    }

    /// Replace the boundary set of `node`, re-pointing owners of its members
    pub fn set_boundary(&mut self, node: NodeId, set: BoundarySet) {
        if let Some(old) = self.tree.delete(node) {
            for member in old {
                self.release_owner(member, node);
            }
        }
        for &member in &set {
            self.owners.set(member, node);
        }
        self.tree.set(node, set);
    }

    /// Drop the entry of `node`. Members still owned by it lose their owner.
    pub fn delete_boundary(&mut self, node: NodeId) -> Option<BoundarySet> {
        let set = self.tree.delete(node)?;
        for &member in &set {
            self.release_owner(member, node);
        }
        Some(set)
    }

    /// Make sure `node` has an entry, creating an empty one
    pub fn ensure_boundary(&mut self, node: NodeId) -> &mut BoundarySet {
        self.tree.entry_or_default(node)
    }

    /// Add `member` to the set of `key`, creating the entry if needed.
    /// Returns the previous owner when it was a different key.
    pub fn insert_member(&mut self, key: NodeId, member: NodeId) -> Option<NodeId> {
        self.ensure_boundary(key).insert(member);
        match self.owners.set(member, key) {
            Some(previous) if previous != key => Some(previous),
            _ => None,
        }
    }

    /// Remove `member` from the set of `key`. Returns whether it was there.
    pub fn remove_member(&mut self, key: NodeId, member: NodeId) -> bool {
        let removed = self
            .tree
            .get_mut(key)
            .is_some_and(|set| set.shift_remove(&member));
        if removed {
            self.release_owner(member, key);
        }
        removed
    }

    /// Key whose boundary set currently holds `member`
    pub fn owner(&self, member: NodeId) -> Option<NodeId> {
        self.owners.get(member).copied()
    }

    fn release_owner(&mut self, member: NodeId, key: NodeId) {
        if self.owners.get(member) == Some(&key) {
            self.owners.delete(member);
        }
    }

    // --- metadata ---

    pub fn meta(&self, node: NodeId) -> Option<&InstanceMeta> {
        self.meta.get(node)
    }

    pub fn set_meta(&mut self, node: NodeId, meta: InstanceMeta) {
        self.meta.set(node, meta);
    }

    pub fn delete_meta(&mut self, node: NodeId) -> Option<InstanceMeta> {
        self.meta.delete(node)
    }

    /// Node was produced by a factory
    pub fn is_component(&self, node: NodeId) -> bool {
        self.meta.has(node)
    }

    /// Non-component kept in the table because it holds components
    pub fn is_guard(&self, node: NodeId) -> bool {
        self.tree.has(node) && !self.meta.has(node)
    }

    /// Number of shadow table entries
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&NodeId, &BoundarySet)> {
        self.tree.iter()
    }

    /// Forget everything about released nodes. Returns entries removed.
    pub fn sweep(&mut self, live: &dyn Liveness) -> usize {
        let mut removed = self.tree.sweep(live, |set| {
            set.retain(|member| live.is_alive(*member));
            true
        });
        removed += self.meta.sweep(live, |_| true);
        removed += self.owners.sweep(live, |owner| live.is_alive(*owner));
        removed
    }
}
