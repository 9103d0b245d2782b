//! Tagged messages crossing the isolation boundary

use crate::element::InspectedElement;
use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One cross-boundary message
///
/// Serialized with an internal `type` tag using the wire names the embedded
/// document script has always used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// Sandbox finished its initial load
    #[serde(rename = "iframeReady")]
    Ready,

    /// Host asks the sandbox to switch inspector mode
    #[serde(rename = "toggleInspector")]
    ToggleInspector {
        /// New inspector state
        enabled: bool,
    },

    /// Sandbox reports a clicked element
    #[serde(rename = "elementInspected")]
    ElementInspected {
        /// Snapshot of the element
        #[serde(rename = "data")]
        element: InspectedElement,
    },
}

/// Discriminant of a [`Message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// `iframeReady`
    Ready,
    /// `toggleInspector`
    ToggleInspector,
    /// `elementInspected`
    ElementInspected,
}

impl MessageKind {
    /// All known kinds
    pub const ALL: [MessageKind; 3] = [Self::Ready, Self::ToggleInspector, Self::ElementInspected];

    /// Wire tag
    #[inline]
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Ready => "iframeReady",
            Self::ToggleInspector => "toggleInspector",
            Self::ElementInspected => "elementInspected",
        }
    }

    /// Look up a kind by wire tag
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl Message {
    /// Discriminant of this message
    #[inline]
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Ready => MessageKind::Ready,
            Self::ToggleInspector { .. } => MessageKind::ToggleInspector,
            Self::ElementInspected { .. } => MessageKind::ElementInspected,
        }
    }

    /// Encode to the raw JSON payload
    ///
    /// # Errors
    /// Only if a field fails to serialize, which the shipped types never do.
    pub fn to_payload(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Decode a raw payload
///
/// Unknown or missing tags are reported separately from malformed payloads of
/// a known tag, so receivers can fail open on the former and log the latter.
///
/// # Errors
/// - [`DecodeError::Untagged`] if there is no string `type` field
/// - [`DecodeError::UnknownTag`] if the tag is not recognised
/// - [`DecodeError::Malformed`] if the payload does not fit the tag
pub fn decode(payload: &Value) -> Result<Message, DecodeError> {
    let tag = payload
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::Untagged)?;

    let kind = MessageKind::from_tag(tag).ok_or_else(|| DecodeError::UnknownTag(tag.to_string()))?;

    Message::deserialize(payload).map_err(|source| DecodeError::Malformed {
        tag: kind.tag(),
        source,
    })
}
