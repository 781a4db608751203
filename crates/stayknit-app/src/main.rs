//! stayknit - Demo Entry Point
//!
//! Renders the demo page through the tracer, then plays a short script of
//! page mutations. Every component create / attach / detach is logged;
//! run with `RUST_LOG=debug` to see the shadow table bookkeeping too.

mod components;
mod config;

use std::rc::Rc;

use anyhow::Context;
use stayknit_dom::{Api, Document, Markup, NodeId};
use stayknit_trace::{describe, describe_node, Lifecycles, Logs, Primitives, TraceConfig, Traced};
use tracing_subscriber::EnvFilter;

use components::PageParts;
use config::AppConfig;

const SOURCE: &str = "https://gitlab.com/nthm/stayknit";

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_args(std::env::args().skip(1));
    tracing::info!(url = %config.url, messages = config.messages.len(), "starting stayknit");

    let mut traced = Traced::setup(Document::new(&config.url), Primitives::default(), TraceConfig::default())
        .with_plugin(Lifecycles)
        .with_plugin(Logs);

    let parts = Rc::new(PageParts::default());
    let page = render_page(&mut traced, &parts)?;

    for shown in 1..=config.messages.len() {
        show_messages(&mut traced, &parts, &config.messages[..shown])?;
    }
    remove_section(&mut traced, &parts)?;
    remove_page(&mut traced, page)?;

    traced.verify().context("shadow table out of step with the document")?;
    let freed = traced.release(page)?;
    let stats = traced.stats();
    tracing::info!(
        freed,
        components = stats.components,
        attached = stats.attached,
        detached = stats.detached,
        violations = stats.violations,
        entries = traced.store().len(),
        memory = traced.document().memory_usage(),
        "done"
    );
    Ok(())
}

/// Build `<Page/>` and put it at the top of the body
fn render_page(traced: &mut Traced, parts: &Rc<PageParts>) -> anyhow::Result<NodeId> {
    let body = traced.body();
    let page = traced.h(Markup::component(&components::page(parts.clone(), SOURCE)))?;
    let first = traced.document().tree.first_child(body);
    traced.add(body, page.clone(), first)?;

    tracing::info!("page rendered: {}", describe(&traced.context(), &page));
    page.as_node().context("Page did not render an element")
}

/// Replace the message list with one `HelloMessage` per message.
/// Old components leave the page before the new ones arrive.
fn show_messages(traced: &mut Traced, parts: &PageParts, messages: &[String]) -> anyhow::Result<()> {
    let container = parts.messages.get().context("message box missing")?;
    if let Some(first) = traced.document().tree.first_child(container) {
        traced.rm(container, first, None)?;
    }
    let list = components::message_list(traced, messages)?;
    traced.add(container, list, None)?;

    let count = messages.len();
    tracing::info!(
        "{count} message{}: {}",
        if count == 1 { "" } else { "s" },
        describe_node(&traced.context(), container)
    );
    Ok(())
}

/// Swap `<section>` for a note. The section is a plain element, so the
/// components inside it are not reported as detached here.
fn remove_section(traced: &mut Traced, parts: &PageParts) -> anyhow::Result<()> {
    let section = parts.section.get().context("section missing")?;
    let tree = &traced.document().tree;
    let parent = tree.parent(section).context("section is not on the page")?;
    let next = tree.next_sibling(section);

    traced.rm(parent, section, next)?;
    let note = traced.h(Markup::element("p").child("Gone via <section> parent removal"))?;
    traced.add(parent, note, next)?;
    tracing::info!("section removed: {}", describe_node(&traced.context(), parent));
    Ok(())
}

/// Take `<Page/>` off the body; every component below it gets its detach hook
fn remove_page(traced: &mut Traced, page: NodeId) -> anyhow::Result<()> {
    let body = traced.body();
    let next = traced.document().tree.next_sibling(page);
    traced.rm(body, page, next)?;
    tracing::info!(
        memberships = traced.memberships(),
        "page removed: {}",
        describe_node(&traced.context(), body)
    );
    Ok(())
}
