//! Demo page components

use std::cell::Cell;
use std::rc::Rc;

use stayknit_dom::{Api, DomResult, Factory, Markup, NodeId, Value};

/// Nodes of the page the demo script mutates later
#[derive(Debug, Default)]
pub struct PageParts {
    pub section: Cell<Option<NodeId>>,
    pub messages: Cell<Option<NodeId>>,
}

fn paragraph(text: &str) -> Markup {
    Markup::element("p").attr("class", "mb-4").child(text)
}

pub fn link(to: &str, name: Option<&str>) -> Factory {
    let href = to.to_string();
    let label = name.unwrap_or(to).to_string();
    Factory::new("Link", move |api| {
        api.h(Markup::element("a")
            .attr("class", "text-blue-400 underline")
            .attr("href", href.as_str())
            .child(label.as_str()))
    })
}

pub fn hello_message(name: &str) -> Factory {
    let name = name.to_string();
    Factory::new("HelloMessage", move |api| {
        let label = name.clone();
        api.on_attach(Rc::new(move || tracing::info!(name = %label, "HelloMessage on the page")));
        let label = name.clone();
        api.on_detach(Rc::new(move || tracing::info!(name = %label, "HelloMessage left the page")));
        api.h(Markup::element("span").child(format!("Hello {name}")))
    })
}

pub fn nav_bar(items: &[&str]) -> Factory {
    let items: Vec<String> = items.iter().map(|item| item.to_string()).collect();
    Factory::new("NavBar", move |api| {
        let mut entries = Vec::with_capacity(items.len());
        for item in &items {
            let target = link(&format!("#{item}"), Some(item.as_str()));
            let anchor = api.h(Markup::component(&target))?;
            entries.push(api.h(Markup::element("li").attr("class", "mr-3").child(anchor))?);
        }
        let ul = entries
            .into_iter()
            .fold(Markup::element("ul").attr("class", "flex"), |ul, entry| ul.child(entry));
        let list = api.h(ul)?;
        api.h(Markup::element("nav").child(list))
    })
}

pub fn login_form() -> Factory {
    Factory::new("LoginForm", |api| {
        let user = api.h(Markup::element("input").attr("name", "user").attr("placeholder", "Username"))?;
        let pass = api.h(Markup::element("input").attr("name", "password").attr("type", "password"))?;
        let submit = api.h(Markup::element("button").attr("type", "submit").child("Log in"))?;
        api.h(Markup::element("form").attr("class", "my-4").child(user).child(pass).child(submit))
    })
}

/// Logs its lifecycle
pub fn attach_test() -> Factory {
    Factory::new("AttachTest", |api| {
        api.on_attach(Rc::new(|| tracing::info!("AttachTest: on the page")));
        api.on_detach(Rc::new(|| tracing::info!("AttachTest: removed")));
        api.h(Markup::element("p").child("I log when I'm attached and detached"))
    })
}

/// Container the message list is rendered into
pub fn message_box() -> Factory {
    Factory::new("MessageBox", |api| api.h(Markup::element("div").attr("class", "my-5")))
}

/// One `HelloMessage` per message
pub fn message_list(api: &mut dyn Api, messages: &[String]) -> DomResult<Value> {
    messages
        .iter()
        .map(|text| api.h(Markup::component(&hello_message(text))))
        .collect::<DomResult<Vec<_>>>()
        .map(Value::List)
}

pub fn page(parts: Rc<PageParts>, source: &str) -> Factory {
    let source = source.to_string();
    Factory::new("Page", move |api| {
        let sinuous = api.h(Markup::component(&link("https://sinuous.dev", Some("Sinuous"))))?;
        let repo = api.h(Markup::component(&link(&source, None)))?;
        let nav = api.h(Markup::component(&nav_bar(&["A", "B", "C", "D", "E"])))?;

        let intro = api.h(paragraph("This is a testing page for ").child(sinuous).child("."))?;
        let hooks = api.h(paragraph(
            "Components get onAttach/onDetach lifecycles, so they can run code once they're \
             added to the page, even if that's long after they're created.",
        ))?;
        let source_line = api.h(paragraph("The source code is here: ").child(repo))?;

        let plugin_items: Vec<Value> = [
            "Lifecycles: adds onAttach/onDetach hooks",
            "Logs: provides all the tracing output",
        ]
        .into_iter()
        .map(|text| api.h(Markup::element("li").child(text)))
        .collect::<DomResult<_>>()?;
        let plugins = api.h(Markup::element("ul").attr("class", "list-disc m-4").child(Value::List(plugin_items)))?;

        let login = api.h(Markup::component(&login_form()))?;
        let attach = api.h(Markup::component(&attach_test()))?;
        let slot = api.h(Markup::element("span").child(attach))?;
        let notice = api.h(paragraph("This component below logs when it is attached and detached"))?;
        let heart = api.h(Markup::element("div").attr("class", "flex justify-center").child("♥"))?;
        let section = api.h(Markup::element("section")
            .child(heart)
            .child(login)
            .child(notice)
            .child(slot))?;
        parts.section.set(section.as_node());

        let greeting = api.h(Markup::component(&hello_message("This is a <HelloMessage/> component")))?;
        let messages = api.h(Markup::component(&message_box()))?;
        parts.messages.set(messages.as_node());

        let title = api.h(Markup::element("h1").attr("class", "text-4xl mb-2").child("Hi"))?;
        api.h(Markup::element("main")
            .attr("class", "bg-purple-100 antialiased justify-center p-8")
            .child(title)
            .child(intro)
            .child(hooks)
            .child(source_line)
            .child(plugins)
            .child(nav)
            .child(section)
            .child(greeting)
            .child(messages))
    })
}
