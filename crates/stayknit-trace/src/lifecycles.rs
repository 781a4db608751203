//! Component lifecycles
//!
//! Components register `on_attach` / `on_detach` hooks through the api while
//! they render. The hooks fire when the component (or a guard holding it)
//! is attached to or detached from a parent that is part of the page, which
//! can be long after the component was created.

use stayknit_dom::NodeId;

use crate::plugin::{Plugin, TraceContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Attach,
    Detach,
}

/// Plugin that runs lifecycle hooks
#[derive(Debug, Default, Clone, Copy)]
pub struct Lifecycles;

impl Lifecycles {
    /// Run `phase` hooks for `node` and every component below it in the
    /// shadow table, parents before children
    fn call_tree(&self, ctx: &TraceContext<'_>, node: NodeId, phase: Phase) {
        if let Some(meta) = ctx.meta(node) {
            let hooks = match phase {
                Phase::Attach => &meta.on_attach,
                Phase::Detach => &meta.on_detach,
            };
            for hook in hooks {
                hook();
            }
        }
        if let Some(children) = ctx.boundary(node) {
            for &child in children {
                self.call_tree(ctx, child, phase);
            }
        }
    }
}

impl Plugin for Lifecycles {
    fn name(&self) -> &str {
        "lifecycles"
    }

    fn on_attach(&mut self, ctx: &TraceContext<'_>, parent: NodeId, value: NodeId) {
        if ctx.is_connected(parent) {
            tracing::trace!(?value, "running attach hooks");
            self.call_tree(ctx, value, Phase::Attach);
        }
    }

    fn on_detach(&mut self, ctx: &TraceContext<'_>, parent: NodeId, node: NodeId) {
        if ctx.is_connected(parent) {
            tracing::trace!(?node, "running detach hooks");
            self.call_tree(ctx, node, Phase::Detach);
        }
    }
}
