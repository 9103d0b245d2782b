//! Lens Sandbox - the runtime living inside the sandboxed preview document
//!
//! Provides:
//! - A document model on html5ever's tree builder, with CSS selector lookup and
//!   bounded `innerHTML` serialization ([`dom`])
//! - Computed style resolution behind the [`StyleResolver`] seam
//! - The inspector state machine: click capture, single selection, hover affordance
//! - An isolated tokio task per document, reachable only through its inbox
//!
//! # Example
//!
//! ```rust
//! use lens_sandbox::dom::{Document, ElementExt};
//!
//! let doc = Document::parse(r#"<section id="hero" class="card primary"><h1>Hi</h1></section>"#);
//! let hero = doc.query_selector("#hero").unwrap().unwrap();
//! assert_eq!(doc.element(hero).unwrap().tag_name(), "SECTION");
//! assert_eq!(doc.inner_html(hero), "<h1>Hi</h1>");
//! ```

#![warn(unreachable_pub)]

pub mod dom;
pub mod error;
pub mod runtime;
pub mod style;
pub mod task;

pub use dom::{Document, Element, ElementExt, Namespace, NodeId, SelectorError};
pub use error::{CaptureError, SandboxGone};
pub use runtime::{ClickEvent, ClickOutcome, InboundOutcome, SandboxConfig, SandboxRuntime, SandboxState};
pub use style::{CascadeResolver, StyleResolver};
pub use task::{spawn_sandbox, spawn_sandbox_with, ClickTarget, SandboxEvent, SandboxHandle};
