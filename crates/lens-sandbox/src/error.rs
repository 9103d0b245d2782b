//! Error types for the sandbox runtime

use crate::dom::NodeId;

/// Snapshot capture failed for the clicked node
///
/// The runtime treats every variant the same way: the click becomes a no-op.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// Node id does not belong to this document
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// Node is no longer attached to the document
    #[error("node {0:?} is detached")]
    Detached(NodeId),

    /// Click landed on something that is not an element
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    /// A custom resolver could not read styles
    #[error("style read failed: {0}")]
    StyleRead(String),
}

/// The sandbox task is gone (document replaced or shut down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("sandboxed document has been torn down")]
pub struct SandboxGone;
