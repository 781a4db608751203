//! Edge case tests for the host tree and the untraced hyperscript API

use std::cell::Cell;
use std::rc::Rc;

use stayknit_dom::{Api, Document, DomError, DomTree, Factory, Markup, NodeData, NodeId, Value};

fn ids(tree: &DomTree, parent: NodeId) -> Vec<NodeId> {
    tree.children(parent).collect()
}

// ============================================================================
// TREE EDGE CASES
// ============================================================================

#[test]
fn test_insert_self_before_self_is_noop() {
    let mut tree = DomTree::new();
    let root = tree.create_element("div");
    let a = tree.create_element("a");
    let b = tree.create_element("b");
    tree.append_child(root, a).unwrap();
    tree.append_child(root, b).unwrap();

    tree.insert_before(root, a, Some(a)).unwrap();
    assert_eq!(ids(&tree, root), vec![a, b]);
}

#[test]
fn test_empty_fragment_inserts_nothing() {
    let mut tree = DomTree::new();
    let root = tree.create_element("div");
    let frag = tree.create_fragment();

    tree.append_child(root, frag).unwrap();
    assert_eq!(tree.first_child(root), None);
    assert_eq!(tree.parent(frag), None);
}

#[test]
fn test_fragment_inserts_before_reference() {
    let mut tree = DomTree::new();
    let root = tree.create_element("ul");
    let last = tree.create_element("li");
    tree.append_child(root, last).unwrap();
    let frag = tree.create_fragment();
    let (x, y) = (tree.create_element("li"), tree.create_element("li"));
    tree.append_child(frag, x).unwrap();
    tree.append_child(frag, y).unwrap();

    tree.insert_before(root, frag, Some(last)).unwrap();

    assert_eq!(ids(&tree, root), vec![x, y, last]);
    assert_eq!(tree.first_child(frag), None);
}

#[test]
fn test_dead_handles_fail_everywhere() {
    let mut tree = DomTree::new();
    let root = tree.create_element("div");
    let gone = tree.create_element("p");
    tree.release(gone).unwrap();

    assert_eq!(tree.append_child(root, gone), Err(DomError::NotFound(gone)));
    assert_eq!(tree.remove_child(root, gone), Err(DomError::NotFound(gone)));
    assert_eq!(tree.release(gone), Err(DomError::NotFound(gone)));
    assert_eq!(tree.parent(gone), None);
    assert_eq!(tree.children(gone).count(), 0);
}

#[test]
fn test_reused_slot_gets_new_generation() {
    let mut tree = DomTree::new();
    let old = tree.create_element("p");
    tree.release(old).unwrap();
    let new = tree.create_text("fresh");

    assert_eq!(new.index(), old.index());
    assert_ne!(new.generation(), old.generation());
    assert!(!tree.is_alive(old));
    assert!(tree.is_alive(new));
}

#[test]
fn test_release_counts_whole_subtree() {
    let mut tree = DomTree::new();
    let before = tree.len();
    let root = tree.create_element("div");
    for i in 0..3 {
        let p = tree.create_element("p");
        let text = tree.create_text(&format!("item {i}"));
        tree.append_child(p, text).unwrap();
        tree.append_child(root, p).unwrap();
    }

    assert_eq!(tree.release(root), Ok(7));
    assert_eq!(tree.len(), before);
}

// ============================================================================
// HYPERSCRIPT EDGE CASES
// ============================================================================

#[test]
fn test_nested_lists_flatten_in_order() {
    let mut doc = Document::default();
    let inner = Value::List(vec!["b".into(), "c".into()]);
    let value = doc
        .h(Markup::element("p").child(Value::List(vec!["a".into(), inner, Value::Empty, "d".into()])))
        .unwrap();

    assert_eq!(doc.text_content(value.as_node().unwrap()), "abcd");
}

#[test]
fn test_component_may_return_list() {
    let pair = Factory::new("Pair", |api| {
        let a = api.h(Markup::element("dt").child("term"))?;
        let b = api.h(Markup::element("dd").child("definition"))?;
        Ok(Value::List(vec![a, b]))
    });
    let mut doc = Document::default();
    let body = doc.body();

    let value = doc.h(Markup::component(&pair)).unwrap();
    assert!(value.is_list());

    doc.add(body, value, None).unwrap();
    assert_eq!(doc.tree.children(body).count(), 2);
    assert_eq!(doc.text_content(body), "termdefinition");
}

#[test]
fn test_add_inserts_before_end_mark() {
    let mut doc = Document::default();
    let body = doc.body();
    let tail = doc.add(body, "tail".into(), None).unwrap().unwrap();

    let start = doc.add(body, "head ".into(), Some(tail)).unwrap();

    assert_eq!(start, doc.tree.first_child(body));
    assert_eq!(doc.text_content(body), "head tail");
}

#[test]
fn test_add_under_text_fails() {
    let mut doc = Document::default();
    let text = doc.tree.create_text("leaf");
    let p = doc.tree.create_element("p");
    assert_eq!(doc.add(text, p.into(), None), Err(DomError::InvalidNodeType(text)));
}

#[test]
fn test_untraced_host_ignores_hooks() {
    let ran = Rc::new(Cell::new(false));
    let flag = ran.clone();
    let noisy = Factory::new("Noisy", move |api| {
        let flag = flag.clone();
        api.on_attach(Rc::new(move || flag.set(true)));
        api.h(Markup::element("div"))
    });
    let mut doc = Document::default();
    let body = doc.body();

    let value = doc.h(Markup::component(&noisy)).unwrap();
    doc.add(body, value, None).unwrap();
    assert!(!ran.get());
}

#[test]
fn test_factories_share_render_fn() {
    let a = Factory::new("A", |api| api.h(Markup::element("i")));
    let b = a.clone();
    let c = Factory::new("A", |api| api.h(Markup::element("i")));
    assert!(a.ptr_eq(&b));
    assert!(!a.ptr_eq(&c));
}

#[test]
fn test_attributes_on_fragment_are_ignored() {
    let mut doc = Document::default();
    let value = doc.h(Markup::fragment(vec!["x".into()]).attr("id", "nope")).unwrap();
    let frag = value.as_node().unwrap();
    assert!(matches!(doc.tree.get(frag).map(|n| &n.data), Some(NodeData::Fragment)));
    assert_eq!(doc.text_content(frag), "x");
}
