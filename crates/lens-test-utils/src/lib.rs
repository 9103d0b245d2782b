//! Testing utilities for the Lens workspace
//!
//! Shared markup fixtures, envelopes and a sink that can be observed after it
//! has been moved into a controller.

#![allow(missing_docs)]

use indexmap::IndexMap;
use lens_protocol::{ComputedStyles, Envelope, FrameId, InspectedElement, InspectionSink, TrustedOrigin};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, PoisonError};

/// Origin every fixture context runs under
pub const ORIGIN: &str = "http://localhost";

/// A small page with one styled hero section, a link and a form
pub const HERO_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Fixture</title><style>.card { padding: 24px; }</style></head>
<body>
  <section id="hero" class="card primary" data-role="banner" style="padding: 24px; border-radius: 8px">
    <h1 class="title">Welcome</h1>
    <p>Intro <a id="more" href="/more">read more</a></p>
  </section>
  <form id="signup" action="/signup"><button id="submit" type="submit">Join</button></form>
  <svg id="logo" viewBox="0 0 10 10"><foreignObject width="10" height="10"></foreignObject></svg>
</body>
</html>"#;

/// Another page, distinguishable from [`HERO_PAGE`]
pub const SECOND_PAGE: &str = r#"<body><article id="post" class="entry"><h2>Second</h2></article></body>"#;

/// Page whose `#long` element holds exactly `inner_len` characters of text
#[must_use]
pub fn long_page(inner_len: usize) -> String {
    format!(r#"<body><div id="long">{}</div></body>"#, "x".repeat(inner_len))
}

/// Selectors that each match one element of [`HERO_PAGE`]
pub const HERO_TARGETS: [&str; 7] = ["#hero", "h1", "p", "#more", "#signup", "#submit", "body"];

/// Envelope as the host would post it
#[must_use]
pub fn host_envelope(payload: Value) -> Envelope {
    Envelope {
        source: FrameId(0),
        origin: ORIGIN.to_string(),
        target_origin: TrustedOrigin::Any,
        payload,
    }
}

/// `toggleInspector` payload
#[must_use]
pub fn toggle_payload(enabled: bool) -> Value {
    json!({ "type": "toggleInspector", "enabled": enabled })
}

/// A hand-built snapshot
#[must_use]
pub fn sample_element(tag: &str, id: &str, class: &str) -> InspectedElement {
    let mut attributes = IndexMap::new();
    if !id.is_empty() {
        attributes.insert("id".to_string(), id.to_string());
    }
    if !class.is_empty() {
        attributes.insert("class".to_string(), class.to_string());
    }
    let styles = ComputedStyles::from_fn(|prop| match prop {
        "display" => "block".to_string(),
        "font-size" => "16px".to_string(),
        _ => String::new(),
    });
    InspectedElement::new(tag, attributes, styles, "<span>inner</span>")
}

/// Sink that records into shared storage
#[derive(Debug, Clone, Default)]
pub struct SharedSink {
    seen: Arc<Mutex<Vec<InspectedElement>>>,
}

impl SharedSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far
    #[must_use]
    pub fn seen(&self) -> Vec<InspectedElement> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InspectionSink for SharedSink {
    fn on_element_inspect(&mut self, element: InspectedElement) {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).push(element);
    }
}
