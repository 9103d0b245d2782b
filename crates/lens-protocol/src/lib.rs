//! Lens Protocol - the wire format between the preview host and its sandbox
//!
//! The host page and the sandboxed document share no memory. Everything that
//! crosses between them is an [`Envelope`] carrying one [`Message`]:
//! - `iframeReady` (sandbox → host): the document finished its initial load
//! - `toggleInspector` (host → sandbox): switch inspector mode on or off
//! - `elementInspected` (sandbox → host): a by-value [`InspectedElement`] snapshot
//!
//! Delivery is fire-and-forget. Receivers ignore anything they cannot decode.
//!
//! # Example
//!
//! ```rust
//! use lens_protocol::{Message, decode};
//!
//! let raw = serde_json::json!({ "type": "toggleInspector", "enabled": true });
//! assert_eq!(decode(&raw).unwrap(), Message::ToggleInspector { enabled: true });
//!
//! let unknown = serde_json::json!({ "type": "somethingElse" });
//! assert!(decode(&unknown).unwrap_err().is_ignorable_unknown());
//! ```

#![warn(unreachable_pub)]

pub mod element;
pub mod envelope;
pub mod error;
pub mod message;
pub mod sink;

pub use element::{
    truncate_excerpt, ComputedStyles, ElementKey, InspectedElement, INNER_HTML_EXCERPT_LIMIT,
    STYLE_PROPERTIES,
};
pub use envelope::{Envelope, FrameId, Inbox, Port, TrustedOrigin};
pub use error::{DecodeError, PostError, Rejection};
pub use message::{decode, Message, MessageKind};
pub use sink::InspectionSink;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
