//! Weak node tables
//!
//! Keys are generational handles, so an entry can never be mistaken for a
//! node that later reuses the same arena slot. Entries whose node has been
//! released are dropped by `sweep`.

use std::collections::HashMap;

use stayknit_dom::{DomTree, NodeId};

/// Answers whether a node handle still refers to a live node
pub trait Liveness {
    fn is_alive(&self, node: NodeId) -> bool;
}

impl Liveness for DomTree {
    fn is_alive(&self, node: NodeId) -> bool {
        DomTree::is_alive(self, node)
    }
}

/// Node-keyed map that never keeps a node alive
#[derive(Debug)]
pub struct WeakMap<V> {
    entries: HashMap<NodeId, V>,
}

impl<V> WeakMap<V> {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    #[inline]
    pub fn get(&self, node: NodeId) -> Option<&V> {
        self.entries.get(&node)
    }

    #[inline]
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut V> {
        self.entries.get_mut(&node)
    }

    #[inline]
    pub fn has(&self, node: NodeId) -> bool {
        self.entries.contains_key(&node)
    }

    pub fn set(&mut self, node: NodeId, value: V) -> Option<V> {
        self.entries.insert(node, value)
    }

    pub fn delete(&mut self, node: NodeId) -> Option<V> {
        self.entries.remove(&node)
    }

    pub fn entry_or_default(&mut self, node: NodeId) -> &mut V
    where
        V: Default,
    {
        self.entries.entry(node).or_default()
    }

    /// Number of entries, dead ones included until the next sweep
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries whose key is dead; `keep` may also prune or reject
    /// live entries. Returns the number of entries removed.
    pub fn sweep(
        &mut self,
        live: &dyn Liveness,
        mut keep: impl FnMut(&mut V) -> bool,
    ) -> usize {
        let before = self.entries.len();
        self.entries.retain(|node, value| live.is_alive(*node) && keep(value));
        before - self.entries.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&NodeId, &V)> {
        self.entries.iter()
    }
}

impl<V> Default for WeakMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_drops_released_nodes() {
        let mut tree = DomTree::new();
        let kept = tree.create_element("div");
        let gone = tree.create_element("div");

        let mut map = WeakMap::new();
        map.set(kept, 1);
        map.set(gone, 2);
        tree.release(gone).unwrap();

        assert_eq!(map.sweep(&tree, |_| true), 1);
        assert_eq!(map.get(kept), Some(&1));
        assert!(!map.has(gone));
    }

    #[test]
    fn test_reused_slot_is_a_different_key() {
        let mut tree = DomTree::new();
        let old = tree.create_element("div");
        let mut map = WeakMap::new();
        map.set(old, "old");

        tree.release(old).unwrap();
        let fresh = tree.create_element("div");

        assert_eq!(old.index(), fresh.index());
        assert!(map.get(fresh).is_none());
    }

    #[test]
    fn test_sweep_predicate() {
        let mut tree = DomTree::new();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        let mut map = WeakMap::new();
        map.set(a, 0);
        map.set(b, 5);

        assert_eq!(map.sweep(&tree, |v| *v > 0), 1);
        assert!(map.has(b));
    }
}
