//! Hyperscript API
//!
//! Markup is built through three live bindings: `h` builds nodes, `add`
//! inserts a value under a parent and `rm` removes a sibling range. The
//! composite primitives below (`create`, `attach`, `detach`) never call each
//! other directly; nested work goes back through the `Api` they are handed,
//! so a wrapper installed in front of the document sees every nested call.

use std::fmt;
use std::rc::Rc;

use crate::{Attribute, DomError, DomResult, Document, NodeId};

/// Lifecycle callback registered by a component while it renders
pub type Hook = Rc<dyn Fn()>;

type RenderFn = dyn Fn(&mut dyn Api) -> DomResult<Value>;

/// Named component factory
#[derive(Clone)]
pub struct Factory {
    name: Rc<str>,
    render: Rc<RenderFn>,
}

impl Factory {
    pub fn new(
        name: &str,
        render: impl Fn(&mut dyn Api) -> DomResult<Value> + 'static,
    ) -> Self {
        Self { name: Rc::from(name), render: Rc::new(render) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the render function against the live api
    pub fn render(&self, api: &mut dyn Api) -> DomResult<Value> {
        (self.render)(api)
    }

    /// Same render function (not just the same name)
    pub fn ptr_eq(&self, other: &Factory) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory").field("name", &self.name).finish_non_exhaustive()
    }
}

/// What markup evaluates to and what `add` accepts
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    Node(NodeId),
    Text(String),
    List(Vec<Value>),
    #[default]
    Empty,
}

impl Value {
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Value::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Value::Node(id)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// First argument of `h`
#[derive(Debug, Clone)]
pub enum Markup {
    Element {
        tag: String,
        attrs: Vec<Attribute>,
        children: Vec<Value>,
    },
    Fragment(Vec<Value>),
    Component(Factory),
}

impl Markup {
    pub fn element(tag: &str) -> Self {
        Markup::Element { tag: tag.to_string(), attrs: Vec::new(), children: Vec::new() }
    }

    pub fn fragment(children: Vec<Value>) -> Self {
        Markup::Fragment(children)
    }

    pub fn component(factory: &Factory) -> Self {
        Markup::Component(factory.clone())
    }

    /// Set an attribute (elements only)
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        if let Markup::Element { attrs, .. } = &mut self {
            attrs.push(Attribute { name: name.to_string(), value: value.into() });
        }
        self
    }

    /// Append a child value (elements and fragments)
    pub fn child(mut self, value: impl Into<Value>) -> Self {
        match &mut self {
            Markup::Element { children, .. } | Markup::Fragment(children) => {
                children.push(value.into());
            }
            Markup::Component(_) => {}
        }
        self
    }
}

/// Live bindings of the hyperscript library
pub trait Api {
    /// Build markup
    fn h(&mut self, markup: Markup) -> DomResult<Value>;

    /// Insert `value` under `parent` before `end_mark` (append when None).
    /// Returns the first inserted node.
    fn add(&mut self, parent: NodeId, value: Value, end_mark: Option<NodeId>) -> DomResult<Option<NodeId>>;

    /// Remove `start` and its following siblings up to `end_mark` (exclusive)
    fn rm(&mut self, parent: NodeId, start: NodeId, end_mark: Option<NodeId>) -> DomResult<()>;

    fn document(&self) -> &Document;

    fn document_mut(&mut self) -> &mut Document;

    /// Run `hook` once the component being rendered is attached to the page.
    /// Hosts without lifecycle tracking ignore it.
    fn on_attach(&mut self, hook: Hook) {
        let _ = hook;
    }

    /// Run `hook` once the component being rendered is removed from the page
    fn on_detach(&mut self, hook: Hook) {
        let _ = hook;
    }
}

/// Host `h`: element and fragment children are added through `api.add`;
/// components render against `api`.
pub fn create(api: &mut dyn Api, markup: Markup) -> DomResult<Value> {
    match markup {
        Markup::Element { tag, attrs, children } => {
            let el = api.document_mut().tree.create_element(&tag);
            if let Some(data) = api.document_mut().tree.get_mut(el).and_then(|n| n.as_element_mut()) {
                for attr in attrs {
                    data.set_attr(&attr.name, attr.value);
                }
            }
            for child in children {
                api.add(el, child, None)?;
            }
            Ok(Value::Node(el))
        }
        Markup::Fragment(children) => {
            let frag = api.document_mut().tree.create_fragment();
            for child in children {
                api.add(frag, child, None)?;
            }
            Ok(Value::Node(frag))
        }
        Markup::Component(factory) => factory.render(api),
    }
}

/// Host `add`. Lists are first turned into a fragment via `api.h`; that
/// fragment is emptied by the insertion and never handed back.
pub fn attach(
    api: &mut dyn Api,
    parent: NodeId,
    value: Value,
    end_mark: Option<NodeId>,
) -> DomResult<Option<NodeId>> {
    let node = match value {
        Value::Empty => return Ok(None),
        Value::Text(text) => api.document_mut().tree.create_text(&text),
        Value::Node(id) => id,
        Value::List(items) => match api.h(Markup::Fragment(items))? {
            Value::Node(frag) => frag,
            _ => return Ok(None),
        },
    };
    let tree = &mut api.document_mut().tree;
    let start = if tree.is_fragment(node) { tree.first_child(node) } else { Some(node) };
    tree.insert_before(parent, node, end_mark)?;
    Ok(start)
}

/// Host `rm`
pub fn detach(
    api: &mut dyn Api,
    parent: NodeId,
    start: NodeId,
    end_mark: Option<NodeId>,
) -> DomResult<()> {
    let tree = &mut api.document_mut().tree;
    if tree.parent(start) != Some(parent) {
        return Err(DomError::NotAChild { parent, child: start });
    }
    let range = sibling_range(tree, start, end_mark);
    for node in range {
        tree.remove_child(parent, node)?;
    }
    Ok(())
}

/// `start` and its following siblings, stopping before `end_mark`
pub fn sibling_range(tree: &crate::DomTree, start: NodeId, end_mark: Option<NodeId>) -> Vec<NodeId> {
    let mut range = Vec::new();
    let mut cursor = Some(start);
    while let Some(node) = cursor {
        if Some(node) == end_mark {
            break;
        }
        range.push(node);
        cursor = tree.next_sibling(node);
    }
    range
}

impl Api for Document {
    fn h(&mut self, markup: Markup) -> DomResult<Value> {
        create(self, markup)
    }

    fn add(&mut self, parent: NodeId, value: Value, end_mark: Option<NodeId>) -> DomResult<Option<NodeId>> {
        attach(self, parent, value, end_mark)
    }

    fn rm(&mut self, parent: NodeId, start: NodeId, end_mark: Option<NodeId>) -> DomResult<()> {
        detach(self, parent, start, end_mark)
    }

    fn document(&self) -> &Document {
        self
    }

    fn document_mut(&mut self) -> &mut Document {
        self
    }
}
