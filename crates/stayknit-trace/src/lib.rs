//! stayknit trace - component boundary tracking
//!
//! Wraps the hyperscript primitives of a `Document` and keeps a shadow table
//! of component boundaries: for every component, the components nearest
//! below it in the rendered tree. Lifecycle hooks, logging and consistency
//! checks are built on that table.
//!
//! # Example
//!
//! ```
//! use stayknit_dom::{Api, Document, Factory, Markup};
//! use stayknit_trace::{Lifecycles, Traced};
//!
//! let hello = Factory::new("Hello", |api| api.h(Markup::element("div").child("hi")));
//! let mut traced = Traced::new(Document::default()).with_plugin(Lifecycles);
//! let body = traced.body();
//!
//! let node = traced.h(Markup::component(&hello)).unwrap();
//! traced.add(body, node.clone(), None).unwrap();
//! assert_eq!(traced.boundary_of(body), vec![node.as_node().unwrap()]);
//! ```

mod config;
mod error;
mod weak;
mod store;
mod plugin;
mod tracer;
mod verify;
mod lifecycles;
pub mod log;

pub use config::TraceConfig;
pub use error::InvariantViolation;
pub use weak::{Liveness, WeakMap};
pub use store::{BoundarySet, DataStore, InstanceMeta, RenderFrame};
pub use plugin::{Callbacks, Plugin, TraceContext};
pub use tracer::{Primitives, TraceStats, Traced};
pub use lifecycles::Lifecycles;
pub use log::{Logs, describe, describe_node};
