//! Lens Console - the consumer side of element inspection
//!
//! Provides:
//! - [`ConversationLog`]: append-only timeline of inspections and user turns
//! - Attachments with type checks and size formatting
//! - Markdown-ish rendering of inspection records
//! - Scripted sessions driving a host end to end
//!
//! # Example
//!
//! ```rust
//! use lens_console::ConversationLog;
//!
//! let mut log = ConversationLog::new();
//! log.send("make the hero bigger", Vec::new()).unwrap();
//! assert_eq!(log.len(), 2);
//! ```

#![warn(unreachable_pub)]

pub mod attachment;
pub mod demo;
pub mod error;
pub mod log;
pub mod render;
pub mod session;

pub use attachment::{format_size, Attachment, AttachmentKind};
pub use demo::DEMO_PAGE;
pub use error::{ConsoleError, SessionError};
pub use log::{Author, ConversationLog, EntryBody, EntryId, LogEntry, SendHook, ATTACHMENTS_ONLY, WELCOME};
pub use render::{render_entry, render_inspection, STYLES_SHOWN};
pub use session::{Session, SessionOutcome, READY_TIMEOUT};
