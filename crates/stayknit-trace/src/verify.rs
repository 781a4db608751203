//! Shadow table consistency check
//!
//! Walks the rendered part of the document (the body subtree) and compares
//! it with the table: every connected component must be listed by its
//! nearest tracked ancestor (the body or a component), no guard may remain
//! on a connected node, and sets hold only components indexed under the key
//! that lists them. Detached subtrees are not checked.

use stayknit_dom::{Document, NodeId};

use crate::error::InvariantViolation;
use crate::store::DataStore;

pub(crate) fn verify(document: &Document, store: &DataStore) -> Result<(), InvariantViolation> {
    let tree = &document.tree;
    let body = document.body();

    check_key(store, body)?;
    let mut stack: Vec<(NodeId, NodeId)> = vec![(body, body)];
    while let Some((node, key)) = stack.pop() {
        for child in tree.children(node) {
            let mut nearest = key;
            if store.is_component(child) {
                let listed = store.boundary(key).is_some_and(|set| set.contains(&child));
                if !listed {
                    return Err(InvariantViolation::Untracked { node: child, expected: key });
                }
                check_key(store, child)?;
                nearest = child;
            } else if store.has_boundary(child) {
                return Err(InvariantViolation::StrayGuard { node: child });
            }
            stack.push((child, nearest));
        }
    }
    Ok(())
}

fn check_key(store: &DataStore, key: NodeId) -> Result<(), InvariantViolation> {
    let Some(set) = store.boundary(key) else {
        return Ok(());
    };
    for &member in set {
        if !store.is_component(member) {
            return Err(InvariantViolation::NotAComponent { key, member });
        }
        let owner = store.owner(member);
        if owner != Some(key) {
            return Err(InvariantViolation::OwnerMismatch { member, key, owner });
        }
    }
    Ok(())
}

/// Total number of set memberships across the table
pub(crate) fn membership_count(store: &DataStore) -> usize {
    store.entries().map(|(_, set)| set.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RenderFrame;

    #[test]
    fn test_empty_document_is_consistent() {
        let doc = Document::default();
        assert_eq!(verify(&doc, &DataStore::new()), Ok(()));
    }

    #[test]
    fn test_missing_membership_detected() {
        let mut doc = Document::default();
        let body = doc.body();
        let comp = doc.tree.create_element("div");
        doc.tree.append_child(body, comp).unwrap();

        let mut store = DataStore::new();
        store.ensure_boundary(comp);
        store.set_meta(comp, RenderFrame::new("Comp"));

        assert_eq!(
            verify(&doc, &store),
            Err(InvariantViolation::Untracked { node: comp, expected: body })
        );

        store.insert_member(body, comp);
        assert_eq!(verify(&doc, &store), Ok(()));
        assert_eq!(membership_count(&store), 1);
    }

    #[test]
    fn test_stray_guard_detected() {
        let mut doc = Document::default();
        let body = doc.body();
        let div = doc.tree.create_element("div");
        doc.tree.append_child(body, div).unwrap();

        let mut store = DataStore::new();
        store.ensure_boundary(div);
        assert_eq!(verify(&doc, &store), Err(InvariantViolation::StrayGuard { node: div }));
    }

    #[test]
    fn test_guard_member_detected() {
        let mut doc = Document::default();
        let body = doc.body();
        let div = doc.tree.create_element("div");

        let mut store = DataStore::new();
        store.insert_member(body, div);
        assert_eq!(
            verify(&doc, &store),
            Err(InvariantViolation::NotAComponent { key: body, member: div })
        );
    }
}
