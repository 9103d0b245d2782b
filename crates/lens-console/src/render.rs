//! Human-readable rendering of log entries
//!
//! Output is light markdown: bold labels, inline code for identifiers.

use crate::log::{EntryBody, LogEntry};
use lens_protocol::InspectedElement;
use std::fmt::Write;

/// Computed styles shown per inspection
pub const STYLES_SHOWN: usize = 10;

/// Render one inspected element as a record
#[must_use]
pub fn render_inspection(element: &InspectedElement) -> String {
    let mut out = String::from("🔍 **Inspected Element**\n\n");
    // writing to a String cannot fail
    let _ = writeln!(out, "**Tag:** `{}`", element.tag_name());
    if let Some(id) = element.id() {
        let _ = writeln!(out, "**ID:** `{id}`");
    }
    if let Some(classes) = element.class_name() {
        let _ = writeln!(out, "**Classes:** `{classes}`");
    }

    if !element.attributes().is_empty() {
        out.push_str("\n**Attributes:**\n");
        for (name, value) in element.attributes() {
            let _ = writeln!(out, "- {name}: \"{value}\"");
        }
    }

    out.push_str("\n**Computed Styles:**\n");
    for (name, value) in element.styles().iter().take(STYLES_SHOWN) {
        let _ = writeln!(out, "- {name}: {value}");
    }
    out
}

/// Render any entry with its header line
#[must_use]
pub fn render_entry(entry: &LogEntry) -> String {
    let mut out = format!("[{}] {}:\n", entry.timestamp.format("%H:%M:%S"), entry.author.label());
    match &entry.body {
        EntryBody::Text(text) => {
            out.push_str(text);
            out.push('\n');
        }
        EntryBody::Inspection(element) => out.push_str(&render_inspection(element)),
    }
    for attachment in &entry.attachments {
        let _ = writeln!(out, "📎 {} ({})", attachment.name, attachment.display_size());
    }
    out
}
