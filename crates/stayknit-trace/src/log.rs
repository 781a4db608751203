//! Console pretty-printing of traced values
//!
//! One-line summaries for the log: components as `<Name/>`, guards as
//! `Guard<tag>`, a `📶` prefix on nodes that are on the page, at most three
//! children per level and text cut down to ten characters.

use stayknit_dom::{Factory, NodeData, NodeId, Value};

use crate::plugin::{Plugin, TraceContext};

const MAX_ITEMS: usize = 3;
const MAX_TEXT: usize = 10;

/// Pretty-print a value
pub fn describe(ctx: &TraceContext<'_>, value: &Value) -> String {
    describe_value(ctx, value, false)
}

/// Pretty-print a node and its first few children
pub fn describe_node(ctx: &TraceContext<'_>, node: NodeId) -> String {
    node_str(ctx, node, false)
}

fn describe_value(ctx: &TraceContext<'_>, value: &Value, subcall: bool) -> String {
    match value {
        Value::List(items) => {
            if subcall {
                return "Array[...]".to_string();
            }
            let parts: Vec<String> = items.iter().map(|v| describe_value(ctx, v, true)).collect();
            format!("Array[{}]", truncated(parts))
        }
        Value::Node(node) => node_str(ctx, *node, subcall),
        Value::Text(text) => quote(text),
        Value::Empty => "∅".to_string(),
    }
}

fn node_str(ctx: &TraceContext<'_>, node: NodeId, subcall: bool) -> String {
    let tree = &ctx.document.tree;
    let Some(data) = tree.get(node).map(|n| &n.data) else {
        return "[Released]".to_string();
    };
    let mut out = match data {
        NodeData::Text(text) => {
            return if text.is_empty() { String::new() } else { quote(text) };
        }
        NodeData::Document => "[Document]".to_string(),
        NodeData::Element(el) => format!("<{}>", el.tag),
        NodeData::Fragment => "[Fragment]".to_string(),
    };
    if let Some(meta) = ctx.meta(node) {
        out = format!("<{}/>", meta.name);
    } else if ctx.is_guard(node) {
        out = format!("Guard{out}");
    }
    if !subcall && ctx.is_connected(node) {
        out = format!("📶{out}");
    }

    if subcall || tree.first_child(node).is_none() {
        return out;
    }
    let parts: Vec<String> = tree.children(node).map(|c| node_str(ctx, c, true)).collect();
    format!("{out}[{}]", truncated(parts))
}

fn truncated(mut parts: Vec<String>) -> String {
    if parts.len() <= MAX_ITEMS {
        return parts.join(",");
    }
    let rest = parts.len() - MAX_ITEMS;
    parts.truncate(MAX_ITEMS);
    format!("{},+{rest}", parts.join(","))
}

fn quote(text: &str) -> String {
    let text = text.trim();
    let len = text.chars().count();
    if len <= MAX_TEXT {
        return format!("\"{text}\"");
    }
    let head: String = text.chars().take(MAX_TEXT).collect();
    format!("\"{head}\"+{}", len - MAX_TEXT)
}

/// Plugin that logs every tracked event
#[derive(Debug, Default, Clone, Copy)]
pub struct Logs;

impl Plugin for Logs {
    fn name(&self) -> &str {
        "logs"
    }

    fn on_create(&mut self, ctx: &TraceContext<'_>, factory: &Factory, node: NodeId) {
        tracing::debug!(target: "stayknit::trace", "create {}: {}", factory.name(), describe_node(ctx, node));
    }

    fn on_attach(&mut self, ctx: &TraceContext<'_>, parent: NodeId, value: NodeId) {
        tracing::debug!(
            target: "stayknit::trace",
            "attach {} to {}",
            describe_node(ctx, value),
            describe_node(ctx, parent)
        );
    }

    fn on_detach(&mut self, ctx: &TraceContext<'_>, parent: NodeId, node: NodeId) {
        tracing::debug!(
            target: "stayknit::trace",
            "detach {} from {}",
            describe_node(ctx, node),
            describe_node(ctx, parent)
        );
    }
}
