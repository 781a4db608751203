//! Traced hyperscript api
//!
//! `Traced` sits in front of a `Document` as the live `Api`. Every `h`,
//! `add` and `rm` is delegated to the host primitives first, with `self`
//! passed as the live api so nested calls come back through here; the
//! shadow table is only updated once the host call has succeeded.

use std::fmt;

use stayknit_dom::hyperscript::{self, sibling_range};
use stayknit_dom::{Api, Document, DomResult, Factory, Hook, Markup, NodeId, Value};

use crate::config::TraceConfig;
use crate::error::InvariantViolation;
use crate::plugin::{Plugin, TraceContext};
use crate::store::{BoundarySet, DataStore, RenderFrame};

type CreateFn = fn(&mut dyn Api, Markup) -> DomResult<Value>;
type AttachFn = fn(&mut dyn Api, NodeId, Value, Option<NodeId>) -> DomResult<Option<NodeId>>;
type DetachFn = fn(&mut dyn Api, NodeId, NodeId, Option<NodeId>) -> DomResult<()>;

/// The host primitives the tracer delegates to
#[derive(Clone, Copy)]
pub struct Primitives {
    pub create: CreateFn,
    pub attach: AttachFn,
    pub detach: DetachFn,
}

impl Default for Primitives {
    fn default() -> Self {
        Self {
            create: hyperscript::create,
            attach: hyperscript::attach,
            detach: hyperscript::detach,
        }
    }
}

impl fmt::Debug for Primitives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Primitives").finish_non_exhaustive()
    }
}

/// Counters kept by the tracer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceStats {
    pub components: usize,
    pub attached: usize,
    pub detached: usize,
    pub violations: usize,
    pub sweeps: usize,
    pub swept_entries: usize,
}

#[derive(Clone, Copy)]
enum Event<'f> {
    Create(&'f Factory, NodeId),
    Attach(NodeId, NodeId),
    Detach(NodeId, NodeId),
}

/// Document wrapped with component boundary tracking
pub struct Traced {
    document: Document,
    primitives: Primitives,
    store: DataStore,
    plugins: Vec<Box<dyn Plugin>>,
    config: TraceConfig,
    /// Fragment built by the most recent untracked `h`; lets `add` find the
    /// fragment the host makes out of a list and then throws away
    last_fragment: Option<NodeId>,
    stats: TraceStats,
    since_sweep: usize,
}

impl Traced {
    /// Wrap a document with the default host primitives and configuration
    pub fn new(document: Document) -> Self {
        Self::setup(document, Primitives::default(), TraceConfig::default())
    }

    /// Install the tracer in front of `document`, keeping `primitives` as
    /// the originals to delegate to
    pub fn setup(document: Document, primitives: Primitives, config: TraceConfig) -> Self {
        tracing::debug!(?config, "tracer installed");
        Self {
            document,
            primitives,
            store: DataStore::new(),
            plugins: Vec::new(),
            config,
            last_fragment: None,
            stats: TraceStats::default(),
            since_sweep: 0,
        }
    }

    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.add_plugin(plugin);
        self
    }

    pub fn add_plugin(&mut self, plugin: impl Plugin + 'static) {
        tracing::debug!(plugin = plugin.name(), "plugin added");
        self.plugins.push(Box::new(plugin));
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn stats(&self) -> TraceStats {
        self.stats
    }

    pub fn context(&self) -> TraceContext<'_> {
        TraceContext::new(&self.document, &self.store)
    }

    pub fn body(&self) -> NodeId {
        self.document.body()
    }

    /// Node has a shadow table entry
    pub fn has(&self, node: NodeId) -> bool {
        self.document.tree.is_alive(node) && self.store.has_boundary(node)
    }

    pub fn boundary(&self, node: NodeId) -> Option<&BoundarySet> {
        self.store.boundary(node).filter(|_| self.document.tree.is_alive(node))
    }

    /// Boundary set as a vector, empty when untracked
    pub fn boundary_of(&self, node: NodeId) -> Vec<NodeId> {
        self.boundary(node).map(|set| set.iter().copied().collect()).unwrap_or_default()
    }

    pub fn is_component(&self, node: NodeId) -> bool {
        self.store.is_component(node)
    }

    pub fn is_guard(&self, node: NodeId) -> bool {
        self.store.is_guard(node)
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Free a detached subtree in the host and forget it here
    pub fn release(&mut self, node: NodeId) -> DomResult<usize> {
        let released = self.document.tree.release(node)?;
        self.collect_garbage();
        Ok(released)
    }

    /// Drop table entries of released nodes. Returns entries removed.
    pub fn collect_garbage(&mut self) -> usize {
        let removed = self.store.sweep(&self.document.tree);
        self.stats.sweeps += 1;
        self.stats.swept_entries += removed;
        self.since_sweep = 0;
        if removed > 0 {
            tracing::debug!(removed, "swept shadow table");
        }
        removed
    }

    fn mutated(&mut self) {
        self.since_sweep += 1;
        if self.config.sweep_interval > 0 && self.since_sweep >= self.config.sweep_interval {
            self.collect_garbage();
        }
    }

    fn notify(&mut self, event: Event<'_>) {
        let ctx = TraceContext::new(&self.document, &self.store);
        for plugin in &mut self.plugins {
            match event {
                Event::Create(factory, node) => plugin.on_create(&ctx, factory, node),
                Event::Attach(parent, value) => plugin.on_attach(&ctx, parent, value),
                Event::Detach(parent, node) => plugin.on_detach(&ctx, parent, node),
            }
        }
    }

    fn fault(&mut self, violation: InvariantViolation) {
        self.stats.violations += 1;
        if self.config.strict {
            panic!("shadow table invariant violated: {violation}");
        }
        tracing::warn!(%violation, "shadow table invariant violated, repairing");
    }

    fn is_root_like(&self, node: NodeId) -> bool {
        node == self.document.body() || self.document.tree.parent(node).is_none()
    }

    /// Nearest tracked ancestor strictly above `node`, falling back to the body
    fn adoptive_parent(&self, node: NodeId) -> NodeId {
        let tree = &self.document.tree;
        let mut cursor = tree.parent(node);
        while let Some(ancestor) = cursor {
            if self.store.has_boundary(ancestor) {
                return ancestor;
            }
            cursor = tree.parent(ancestor);
        }
        self.document.body()
    }

    /// Members `value` brings along on attach: itself for a component, its
    /// boundary set for a guard
    fn members_of(&self, value: NodeId) -> Option<(bool, Vec<NodeId>)> {
        let set = self.store.boundary(value)?;
        let is_component = self.store.is_component(value);
        let members = if is_component { vec![value] } else { set.iter().copied().collect() };
        Some((is_component, members))
    }

    /// Members of `value` whose recorded owner still holds them in the tree.
    /// Must run before the host moves anything.
    fn held_members(&self, value: NodeId) -> Vec<NodeId> {
        let Some((_, members)) = self.members_of(value) else {
            return Vec::new();
        };
        let tree = &self.document.tree;
        members
            .into_iter()
            .filter(|&member| {
                self.store
                    .owner(member)
                    .is_some_and(|owner| owner != value && tree.contains(owner, member))
            })
            .collect()
    }

    /// Put `member` into the set of `target`. `dissolving` is the guard being
    /// merged away, the one other place the member may legitimately sit.
    /// `held` says the previous owner still contained the member before the
    /// host attach ran.
    fn adopt(&mut self, target: NodeId, member: NodeId, dissolving: Option<NodeId>, held: bool) {
        let Some(owner) = self.store.insert_member(target, member) else {
            return;
        };
        if Some(owner) == dissolving || !self.document.tree.is_alive(owner) {
            return;
        }
        let still_listed = self.store.boundary(owner).is_some_and(|set| set.contains(&member));
        if !still_listed {
            return;
        }
        if held {
            self.fault(InvariantViolation::AlreadyTracked { node: member, owner, target });
        } else {
            // Left `owner` inside a removed plain subtree
            tracing::trace!(?member, ?owner, ?target, "dropping stale membership");
        }
        // The owner index already points at `target`
        self.store.remove_member(owner, member);
    }

    fn track_attach(&mut self, parent: NodeId, value: NodeId, held: &[NodeId]) {
        let Some((is_component, members)) = self.members_of(value) else {
            return;
        };

        let target = if self.store.has_boundary(parent) || self.is_root_like(parent) {
            parent
        } else {
            // Inserted under an untracked element that is already in a tree:
            // responsibility moves to the nearest tracked ancestor
            self.adoptive_parent(parent)
        };
        tracing::trace!(?parent, ?value, ?target, is_component, members = members.len(), "attach");

        self.store.ensure_boundary(target);
        let dissolving = (!is_component).then_some(value);
        for member in members {
            self.adopt(target, member, dissolving, held.contains(&member));
        }

        self.stats.attached += 1;
        self.notify(Event::Attach(parent, value));

        if !is_component {
            self.store.delete_boundary(value);
        }
    }

    /// Check the shadow table against the rendered part of the document
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        crate::verify::verify(&self.document, &self.store)
    }

    /// Total number of boundary set memberships
    pub fn memberships(&self) -> usize {
        crate::verify::membership_count(&self.store)
    }
}

impl Api for Traced {
    fn h(&mut self, markup: Markup) -> DomResult<Value> {
        let create = self.primitives.create;
        let factory = match markup {
            Markup::Component(factory) => factory,
            markup => {
                let value = create(self, markup)?;
                if let Value::Node(node) = value {
                    if self.document.tree.is_fragment(node) {
                        self.last_fragment = Some(node);
                    }
                }
                return Ok(value);
            }
        };

        self.store.push_frame(RenderFrame::new(factory.name()));
        let rendered = create(self, Markup::Component(factory.clone()));
        let frame = self
            .store
            .pop_frame()
            .unwrap_or_else(|| RenderFrame::new(factory.name()));
        let value = rendered?;

        let Some(node) = value.as_node() else {
            return Ok(value);
        };
        // Elements are already in the table if components were added to them
        self.store.ensure_boundary(node);
        self.store.set_meta(node, frame);
        self.stats.components += 1;
        tracing::debug!(component = factory.name(), ?node, "created");

        self.notify(Event::Create(&factory, node));
        Ok(value)
    }

    fn add(&mut self, parent: NodeId, value: Value, end_mark: Option<NodeId>) -> DomResult<Option<NodeId>> {
        let attach = self.primitives.attach;
        let was_list = value.is_list();
        let direct = value.as_node();
        let held = direct.map(|node| self.held_members(node)).unwrap_or_default();

        let outer_fragment = self.last_fragment.take();
        let result = attach(self, parent, value, end_mark);
        let recovered = self.last_fragment.take();
        self.last_fragment = outer_fragment;
        let start = result?;

        let tracked = if was_list { recovered } else { direct };
        if let Some(node) = tracked {
            self.track_attach(parent, node, &held);
        }
        self.mutated();
        Ok(start)
    }

    fn rm(&mut self, parent: NodeId, start: NodeId, end_mark: Option<NodeId>) -> DomResult<()> {
        let detach = self.primitives.detach;
        let removed = sibling_range(&self.document.tree, start, end_mark);
        detach(self, parent, start, end_mark)?;

        if self.store.has_boundary(parent) {
            for node in removed {
                if self.store.remove_member(parent, node) {
                    tracing::trace!(?parent, ?node, "detach");
                    self.stats.detached += 1;
                    self.notify(Event::Detach(parent, node));
                }
            }
        }
        self.mutated();
        Ok(())
    }

    fn document(&self) -> &Document {
        &self.document
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn on_attach(&mut self, hook: Hook) {
        match self.store.current_frame_mut() {
            Some(frame) => frame.on_attach.push(hook),
            None => tracing::warn!("on_attach called outside of a component render; ignored"),
        }
    }

    fn on_detach(&mut self, hook: Hook) {
        match self.store.current_frame_mut() {
            Some(frame) => frame.on_detach.push(hook),
            None => tracing::warn!("on_detach called outside of a component render; ignored"),
        }
    }
}

impl fmt::Debug for Traced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traced")
            .field("entries", &self.store.len())
            .field("plugins", &self.plugins.len())
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::plugin::Callbacks;

    fn comp(name: &str, tag: &'static str) -> Factory {
        Factory::new(name, move |api| api.h(Markup::element(tag)))
    }

    #[test]
    fn test_create_registers_component() {
        let mut t = Traced::new(Document::default());
        let x = t.h(Markup::component(&comp("X", "div"))).unwrap().as_node().unwrap();

        assert!(t.is_component(x));
        assert!(t.has(x));
        assert!(t.boundary_of(x).is_empty());
        assert_eq!(t.store().meta(x).unwrap().name, "X");
        assert_eq!(t.stats().components, 1);
    }

    #[test]
    fn test_plain_markup_is_untracked() {
        let mut t = Traced::new(Document::default());
        let div = t.h(Markup::element("div").child("text")).unwrap().as_node().unwrap();
        assert!(!t.has(div));
        assert!(!t.is_component(div));
    }

    #[test]
    fn test_factory_returning_text_is_untouched() {
        let label = Factory::new("Label", |_| Ok(Value::from("just text")));
        let mut t = Traced::new(Document::default());
        assert_eq!(t.h(Markup::component(&label)).unwrap(), Value::from("just text"));
        assert_eq!(t.stats().components, 0);
        assert_eq!(t.store().render_depth(), 0);
    }

    #[test]
    fn test_render_error_still_pops_frame() {
        let broken = Factory::new("Broken", |api| {
            let body = api.document().body();
            let stray = api.document_mut().tree.create_element("p");
            api.rm(body, stray, None)?;
            Ok(Value::Empty)
        });
        let mut t = Traced::new(Document::default());
        assert!(t.h(Markup::component(&broken)).is_err());
        assert_eq!(t.store().render_depth(), 0);
    }

    #[test]
    fn test_create_callback_receives_factory() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut t = Traced::new(Document::default()).with_plugin(
            Callbacks::new().on_create(move |_, factory, node| {
                sink.borrow_mut().push((factory.name().to_string(), node));
            }),
        );
        let x = t.h(Markup::component(&comp("X", "div"))).unwrap().as_node().unwrap();
        assert_eq!(*seen.borrow(), vec![("X".to_string(), x)]);
    }

    #[test]
    fn test_attach_untracked_value_is_noop() {
        let mut t = Traced::new(Document::default());
        let body = t.body();
        let p = t.h(Markup::element("p")).unwrap();
        t.add(body, p, None).unwrap();
        assert!(!t.has(body));
        assert_eq!(t.stats().attached, 0);
    }

    #[test]
    fn test_host_error_skips_bookkeeping() {
        let mut t = Traced::new(Document::default());
        let x = t.h(Markup::component(&comp("X", "div"))).unwrap().as_node().unwrap();
        let text = t.document_mut().tree.create_text("leaf");

        assert!(t.add(text, Value::Node(x), None).is_err());
        assert!(!t.has(text));
        assert_eq!(t.stats().attached, 0);
    }

    #[test]
    fn test_hooks_outside_render_are_ignored() {
        let mut t = Traced::new(Document::default());
        t.on_attach(Rc::new(|| {}));
        assert_eq!(t.store().render_depth(), 0);
    }

    #[test]
    fn test_hooks_land_on_rendering_component() {
        let outer = Factory::new("Outer", |api| {
            api.on_attach(Rc::new(|| {}));
            let inner = Factory::new("Inner", |api| {
                api.on_detach(Rc::new(|| {}));
                api.h(Markup::element("span"))
            });
            let child = api.h(Markup::component(&inner))?;
            api.h(Markup::element("div").child(child))
        });
        let mut t = Traced::new(Document::default());
        let node = t.h(Markup::component(&outer)).unwrap().as_node().unwrap();
        let inner = t.boundary_of(node)[0];

        let outer_meta = t.store().meta(node).unwrap();
        assert_eq!((outer_meta.on_attach.len(), outer_meta.on_detach.len()), (1, 0));
        let inner_meta = t.store().meta(inner).unwrap();
        assert_eq!(inner_meta.name, "Inner");
        assert_eq!((inner_meta.on_attach.len(), inner_meta.on_detach.len()), (0, 1));
    }

    #[test]
    fn test_release_forgets_entries() {
        let mut t = Traced::new(Document::default());
        let x = t.h(Markup::component(&comp("X", "div"))).unwrap().as_node().unwrap();
        assert!(t.has(x));

        t.release(x).unwrap();
        assert!(!t.has(x));
        assert!(t.store().is_empty());
        assert!(!t.is_component(x));
    }

    #[test]
    fn test_periodic_sweep() {
        let config = TraceConfig { sweep_interval: 2, ..TraceConfig::default() };
        let mut t = Traced::setup(Document::default(), Primitives::default(), config);
        let body = t.body();
        let x = t.h(Markup::component(&comp("X", "div"))).unwrap().as_node().unwrap();
        t.document_mut().tree.release(x).unwrap();
        assert_eq!(t.store().len(), 1);

        let p = t.h(Markup::element("p")).unwrap();
        t.add(body, p.clone(), None).unwrap();
        t.add(body, "tail".into(), None).unwrap();

        assert_eq!(t.stats().sweeps, 1);
        assert!(t.store().is_empty());
    }
}
