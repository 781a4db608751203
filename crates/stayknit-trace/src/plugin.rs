//! Tracer plugins
//!
//! A plugin receives one call per qualifying event, synchronously, from
//! inside the wrapped `h`/`add`/`rm` call and in the order events happen.
//! Plugins run in installation order and see the tracker state read-only.

use stayknit_dom::{Document, Factory, NodeId};

use crate::store::{BoundarySet, DataStore, InstanceMeta};

/// Read-only view handed to plugins
#[derive(Clone, Copy)]
pub struct TraceContext<'a> {
    pub document: &'a Document,
    pub store: &'a DataStore,
}

impl<'a> TraceContext<'a> {
    pub fn new(document: &'a Document, store: &'a DataStore) -> Self {
        Self { document, store }
    }

    pub fn is_component(&self, node: NodeId) -> bool {
        self.store.is_component(node)
    }

    pub fn is_guard(&self, node: NodeId) -> bool {
        self.store.is_guard(node)
    }

    pub fn meta(&self, node: NodeId) -> Option<&'a InstanceMeta> {
        self.store.meta(node)
    }

    pub fn boundary(&self, node: NodeId) -> Option<&'a BoundarySet> {
        self.store.boundary(node)
    }

    /// Node is the body or inside it
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.document.is_connected(node)
    }
}

/// Observer of tracked tree mutations. Every method defaults to a no-op.
pub trait Plugin {
    /// Name used in logs
    fn name(&self) -> &str {
        "plugin"
    }

    /// A factory produced `node`, now registered as a component
    fn on_create(&mut self, ctx: &TraceContext<'_>, factory: &Factory, node: NodeId) {
        let _ = (ctx, factory, node);
    }

    /// A tracked `value` (component or guard) was attached under `parent`.
    /// For guards the entry is still readable here and dropped right after.
    fn on_attach(&mut self, ctx: &TraceContext<'_>, parent: NodeId, value: NodeId) {
        let _ = (ctx, parent, value);
    }

    /// `node` left the boundary set of `parent`
    fn on_detach(&mut self, ctx: &TraceContext<'_>, parent: NodeId, node: NodeId) {
        let _ = (ctx, parent, node);
    }
}

type CreateFn = Box<dyn FnMut(&TraceContext<'_>, &Factory, NodeId)>;
type EdgeFn = Box<dyn FnMut(&TraceContext<'_>, NodeId, NodeId)>;

/// Plugin assembled from closures, one optional slot per event
#[derive(Default)]
pub struct Callbacks {
    on_create: Option<CreateFn>,
    on_attach: Option<EdgeFn>,
    on_detach: Option<EdgeFn>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_create(mut self, f: impl FnMut(&TraceContext<'_>, &Factory, NodeId) + 'static) -> Self {
        self.on_create = Some(Box::new(f));
        self
    }

    pub fn on_attach(mut self, f: impl FnMut(&TraceContext<'_>, NodeId, NodeId) + 'static) -> Self {
        self.on_attach = Some(Box::new(f));
        self
    }

    pub fn on_detach(mut self, f: impl FnMut(&TraceContext<'_>, NodeId, NodeId) + 'static) -> Self {
        self.on_detach = Some(Box::new(f));
        self
    }
}

impl Plugin for Callbacks {
    fn name(&self) -> &str {
        "callbacks"
    }

    fn on_create(&mut self, ctx: &TraceContext<'_>, factory: &Factory, node: NodeId) {
        if let Some(f) = &mut self.on_create {
            f(ctx, factory, node);
        }
    }

    fn on_attach(&mut self, ctx: &TraceContext<'_>, parent: NodeId, value: NodeId) {
        if let Some(f) = &mut self.on_attach {
            f(ctx, parent, value);
        }
    }

    fn on_detach(&mut self, ctx: &TraceContext<'_>, parent: NodeId, node: NodeId) {
        if let Some(f) = &mut self.on_detach {
            f(ctx, parent, node);
        }
    }
}
