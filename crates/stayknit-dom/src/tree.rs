//! DOM Tree (arena-based allocation)
//!
//! Slots carry a generation counter. Releasing a detached subtree frees its
//! slots and bumps their generations, so handles held elsewhere go dead
//! instead of silently aliasing whatever is allocated into the slot next.

use crate::{DomError, DomResult, Node, NodeId};

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    root: NodeId,
    live: usize,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a tree with pre-allocated node storage
    pub fn with_capacity(capacity: usize) -> Self {
        let mut tree = Self {
            slots: Vec::with_capacity(capacity.max(1)),
            free_list: Vec::new(),
            root: NodeId::new(0, 0),
            live: 0,
        };
        tree.root = tree.alloc(Node::document());
        tree
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, node: Some(node) });
        NodeId::new(index, 0)
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by ID (None for dead handles)
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    /// Whether the handle still refers to a node
    #[inline]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.alloc(Node::text(content))
    }

    /// Create an empty fragment
    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(Node::fragment())
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    #[inline]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.first_child
    }

    #[inline]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.last_child
    }

    #[inline]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.next_sibling
    }

    #[inline]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.prev_sibling
    }

    pub fn is_fragment(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_fragment)
    }

    /// Iterate over the direct children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children { tree: self, next: self.first_child(id) }
    }

    /// Inclusive descendant check: true when `node` is `ancestor` or lies under it
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.is_alive(ancestor) {
            return false;
        }
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    /// Append a child (moving it if it already has a parent)
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference`, or append when `reference` is None.
    ///
    /// A fragment is never linked itself: its children move over in order and
    /// the fragment is left empty.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        if !self.node(parent)?.is_container() {
            return Err(DomError::InvalidNodeType(parent));
        }
        let child_node = self.node(child)?;
        if matches!(child_node.data, crate::NodeData::Document) || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        let mut reference = reference;
        if let Some(r) = reference {
            if self.node(r)?.parent != Some(parent) {
                return Err(DomError::NotAChild { parent, child: r });
            }
            if r == child {
                reference = self.next_sibling(child);
            }
        }

        if self.is_fragment(child) {
            let moved: Vec<NodeId> = self.children(child).collect();
            for id in moved {
                self.unlink(id)?;
                self.link_before(parent, id, reference)?;
            }
        } else {
            self.unlink(child)?;
            self.link_before(parent, child, reference)?;
        }
        tracing::trace!(?parent, ?child, "inserted");
        Ok(())
    }

    /// Remove a direct child from its parent, leaving it detached
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if self.node(child)?.parent != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.unlink(child)
    }

    /// Free a detached subtree. Returns the number of nodes released.
    pub fn release(&mut self, id: NodeId) -> DomResult<usize> {
        if self.node(id)?.parent.is_some() || id == self.root {
            return Err(DomError::StillAttached(id));
        }
        let mut stack = vec![id];
        let mut released = 0;
        while let Some(current) = stack.pop() {
            stack.extend(self.children(current));
            let slot = &mut self.slots[current.index() as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(current.index());
            released += 1;
        }
        self.live -= released;
        tracing::debug!(?id, released, "released subtree");
        Ok(released)
    }

    fn unlink(&mut self, id: NodeId) -> DomResult<()> {
        let (parent, prev, next) = {
            let node = self.node_mut(id)?;
            let links = (node.parent, node.prev_sibling, node.next_sibling);
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
            links
        };
        let Some(parent) = parent else {
            return Ok(());
        };
        match prev {
            Some(p) => self.node_mut(p)?.next_sibling = next,
            None => self.node_mut(parent)?.first_child = next,
        }
        match next {
            Some(n) => self.node_mut(n)?.prev_sibling = prev,
            None => self.node_mut(parent)?.last_child = prev,
        }
        Ok(())
    }

    fn link_before(&mut self, parent: NodeId, id: NodeId, reference: Option<NodeId>) -> DomResult<()> {
        let prev = match reference {
            Some(r) => self.node(r)?.prev_sibling,
            None => self.node(parent)?.last_child,
        };
        {
            let node = self.node_mut(id)?;
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = reference;
        }
        match prev {
            Some(p) => self.node_mut(p)?.next_sibling = Some(id),
            None => self.node_mut(parent)?.first_child = Some(id),
        }
        match reference {
            Some(r) => self.node_mut(r)?.prev_sibling = Some(id),
            None => self.node_mut(parent)?.last_child = Some(id),
        }
        Ok(())
    }

    /// Number of live nodes in the tree (document included)
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if tree holds nothing but the document
    pub fn is_empty(&self) -> bool {
        self.live <= 1
    }

    /// Approximate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        self.slots.capacity() * std::mem::size_of::<Slot>()
            + self.free_list.capacity() * std::mem::size_of::<u32>()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the direct children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_before_reference() {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        let a = tree.create_element("li");
        let b = tree.create_element("li");
        let c = tree.create_element("li");

        tree.append_child(ul, a).unwrap();
        tree.append_child(ul, c).unwrap();
        tree.insert_before(ul, b, Some(c)).unwrap();

        assert_eq!(tree.children(ul).collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(tree.prev_sibling(c), Some(b));
        assert_eq!(tree.last_child(ul), Some(c));
    }

    #[test]
    fn test_fragment_children_move() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let frag = tree.create_fragment();
        let a = tree.create_element("p");
        let b = tree.create_element("p");
        tree.append_child(frag, a).unwrap();
        tree.append_child(frag, b).unwrap();

        tree.append_child(div, frag).unwrap();

        assert_eq!(tree.children(div).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(tree.first_child(frag), None);
        assert_eq!(tree.parent(frag), None);
        assert_eq!(tree.parent(a), Some(div));
    }

    #[test]
    fn test_insert_moves_existing_child() {
        let mut tree = DomTree::new();
        let first = tree.create_element("div");
        let second = tree.create_element("div");
        let p = tree.create_element("p");
        tree.append_child(first, p).unwrap();
        tree.append_child(second, p).unwrap();

        assert_eq!(tree.first_child(first), None);
        assert_eq!(tree.parent(p), Some(second));
    }

    #[test]
    fn test_hierarchy_request() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("div");
        let inner = tree.create_element("div");
        tree.append_child(outer, inner).unwrap();

        assert_eq!(
            tree.append_child(inner, outer),
            Err(DomError::HierarchyRequest { parent: inner, child: outer })
        );
        assert!(tree.append_child(outer, outer).is_err());
    }

    #[test]
    fn test_text_cannot_have_children() {
        let mut tree = DomTree::new();
        let text = tree.create_text("x");
        let span = tree.create_element("span");
        assert_eq!(tree.append_child(text, span), Err(DomError::InvalidNodeType(text)));
    }

    #[test]
    fn test_release_invalidates_handles() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let p = tree.create_element("p");
        tree.append_child(div, p).unwrap();
        let before = tree.len();

        assert_eq!(tree.release(div), Ok(2));
        assert!(!tree.is_alive(div));
        assert!(!tree.is_alive(p));
        assert_eq!(tree.len(), before - 2);

        // Slot reuse must not revive the old handle
        let reused = tree.create_element("section");
        assert!(tree.is_alive(reused));
        assert!(!tree.is_alive(div) && !tree.is_alive(p));
    }

    #[test]
    fn test_release_attached_fails() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let root = tree.root();
        tree.append_child(root, div).unwrap();
        assert_eq!(tree.release(div), Err(DomError::StillAttached(div)));
        assert_eq!(tree.release(root), Err(DomError::StillAttached(root)));
    }

    #[test]
    fn test_contains_inclusive() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let span = tree.create_element("span");
        tree.append_child(div, span).unwrap();

        assert!(tree.contains(div, div));
        assert!(tree.contains(div, span));
        assert!(!tree.contains(span, div));
    }
}
