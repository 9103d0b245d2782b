//! Append-only conversation log
//!
//! Inspected elements, user turns and assistant replies share one timeline.
//! Entries are never edited or removed once appended.

use crate::attachment::Attachment;
use crate::error::ConsoleError;
use chrono::{DateTime, Utc};
use lens_protocol::{ElementKey, InspectedElement, InspectionSink};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// First entry of every log
pub const WELCOME: &str =
    "Welcome to the preview console! Toggle the inspector and click any element in the preview to inspect it.";

/// Body used when a turn carries attachments and no text
pub const ATTACHMENTS_ONLY: &str = "(Attachments only)";

/// Callback invoked for every user turn with the raw text and attachments
pub type SendHook = Box<dyn FnMut(&str, &[Attachment]) + Send>;

/// Unique, time-ordered entry id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Ulid);

impl EntryId {
    fn new() -> Self {
        Self(Ulid::new())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Who wrote an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    /// The person at the keyboard
    User,
    /// The assistant
    Assistant,
    /// The console itself
    System,
}

impl Author {
    /// Display name
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "Assistant",
            Self::System => "System",
        }
    }
}

/// Entry content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum EntryBody {
    /// Free text
    Text(String),
    /// One inspected element
    Inspection(InspectedElement),
}

/// One log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique id
    pub id: EntryId,
    /// When the entry was appended
    pub timestamp: DateTime<Utc>,
    /// Author
    pub author: Author,
    /// Content
    pub body: EntryBody,
    /// Attached files, user turns only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl LogEntry {
    fn new(author: Author, body: EntryBody, attachments: Vec<Attachment>) -> Self {
        Self {
            id: EntryId::new(),
            timestamp: Utc::now(),
            author,
            body,
            attachments,
        }
    }

    /// The snapshot, for inspection entries
    #[must_use]
    pub fn inspection(&self) -> Option<&InspectedElement> {
        match &self.body {
            EntryBody::Inspection(element) => Some(element),
            EntryBody::Text(_) => None,
        }
    }
}

/// The conversation log
pub struct ConversationLog {
    entries: Vec<LogEntry>,
    on_send: Option<SendHook>,
}

impl fmt::Debug for ConversationLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationLog")
            .field("entries", &self.entries)
            .field("on_send", &self.on_send.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationLog {
    /// A log holding only the welcome entry
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: vec![LogEntry::new(Author::System, EntryBody::Text(WELCOME.to_string()), Vec::new())],
            on_send: None,
        }
    }

    /// With a hook called for every user turn
    #[must_use]
    pub fn on_send_message(mut self, hook: impl FnMut(&str, &[Attachment]) + Send + 'static) -> Self {
        self.on_send = Some(Box::new(hook));
        self
    }

    /// Append a user turn
    ///
    /// The hook receives the raw text, even when the stored body is the
    /// attachments-only placeholder.
    ///
    /// # Errors
    /// - [`ConsoleError::EmptyMessage`] if the text is blank and nothing is attached
    /// - [`ConsoleError::UnsupportedAttachment`] for a file the picker would refuse
    pub fn send(&mut self, text: &str, attachments: Vec<Attachment>) -> Result<EntryId, ConsoleError> {
        if text.trim().is_empty() && attachments.is_empty() {
            return Err(ConsoleError::EmptyMessage);
        }
        if let Some(bad) = attachments.iter().find(|a| !a.is_accepted()) {
            return Err(ConsoleError::UnsupportedAttachment {
                name: bad.name.clone(),
                mime: bad.mime.clone(),
            });
        }

        let body = if text.is_empty() { ATTACHMENTS_ONLY } else { text };
        if let Some(hook) = self.on_send.as_mut() {
            hook(text, &attachments);
        }
        Ok(self.append(Author::User, EntryBody::Text(body.to_string()), attachments))
    }

    /// Append an assistant reply
    pub fn reply(&mut self, text: impl Into<String>) -> EntryId {
        self.append(Author::Assistant, EntryBody::Text(text.into()), Vec::new())
    }

    /// Append a system note
    pub fn note(&mut self, text: impl Into<String>) -> EntryId {
        self.append(Author::System, EntryBody::Text(text.into()), Vec::new())
    }

    /// Every entry, oldest first
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the welcome entry is never removed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry
    #[must_use]
    pub fn get(&self, id: EntryId) -> Option<&LogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Most recent entry
    #[must_use]
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// Inspected elements in arrival order
    pub fn inspections(&self) -> impl Iterator<Item = &InspectedElement> {
        self.entries.iter().filter_map(LogEntry::inspection)
    }

    /// How often an element with this identity was inspected
    #[must_use]
    pub fn inspection_count(&self, key: &ElementKey) -> usize {
        self.inspections().filter(|element| element.key() == *key).count()
    }

    fn append(&mut self, author: Author, body: EntryBody, attachments: Vec<Attachment>) -> EntryId {
        let entry = LogEntry::new(author, body, attachments);
        let id = entry.id;
        self.entries.push(entry);
        id
    }
}

impl InspectionSink for ConversationLog {
    fn on_element_inspect(&mut self, element: InspectedElement) {
        tracing::debug!(key = %element.key(), "logging inspected element");
        self.append(Author::System, EntryBody::Inspection(element), Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_test_utils::sample_element;
    use std::sync::{Arc, Mutex};

    #[test]
    fn starts_with_welcome() {
        let log = ConversationLog::new();
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].author, Author::System);
        assert_eq!(log.entries()[0].body, EntryBody::Text(WELCOME.to_string()));
    }

    #[test]
    fn blank_message_is_rejected() {
        let mut log = ConversationLog::new();
        assert_eq!(log.send("   ", Vec::new()), Err(ConsoleError::EmptyMessage));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn attachments_only_gets_placeholder_body() {
        let mut log = ConversationLog::new();
        let id = log.send("", vec![Attachment::new("shot.png", 10, "image/png")]).unwrap();
        let entry = log.get(id).unwrap();
        assert_eq!(entry.body, EntryBody::Text(ATTACHMENTS_ONLY.to_string()));
        assert_eq!(entry.attachments.len(), 1);
    }

    #[test]
    fn unsupported_attachment_is_rejected() {
        let mut log = ConversationLog::new();
        let err = log.send("hi", vec![Attachment::new("run.exe", 10, "application/x-msdownload")]);
        assert!(matches!(err, Err(ConsoleError::UnsupportedAttachment { .. })));
    }

    #[test]
    fn hook_sees_raw_text() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut log = ConversationLog::new().on_send_message(move |text, attachments| {
            sink.lock().unwrap().push((text.to_string(), attachments.len()));
        });
        log.send("make it blue", Vec::new()).unwrap();
        log.send("", vec![Attachment::new("a.pdf", 1, "application/pdf")]).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![("make it blue".to_string(), 0), (String::new(), 1)]);
    }

    #[test]
    fn inspections_are_appended_and_counted() {
        let mut log = ConversationLog::new();
        let hero = sample_element("SECTION", "hero", "card primary");
        let key = hero.key();
        log.on_element_inspect(hero.clone());
        log.reply("noted");
        log.on_element_inspect(hero);
        log.on_element_inspect(sample_element("P", "", ""));

        assert_eq!(log.len(), 5);
        assert_eq!(log.inspections().count(), 3);
        assert_eq!(log.inspection_count(&key), 2);
        assert_eq!(log.last().unwrap().author, Author::System);
    }

    #[test]
    fn entries_serialize_with_tagged_body() {
        let mut log = ConversationLog::new();
        log.note("hello");
        let json = serde_json::to_value(log.last().unwrap()).unwrap();
        assert_eq!(json["author"], "system");
        assert_eq!(json["body"]["kind"], "text");
        assert_eq!(json["body"]["value"], "hello");
        assert!(json.get("attachments").is_none());
    }
}
