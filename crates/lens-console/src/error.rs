//! Error types for the console

/// Console errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    /// Nothing to send: blank text and no attachments
    #[error("message is empty and has no attachments")]
    EmptyMessage,

    /// Attachment type outside the accepted list
    #[error("unsupported attachment `{name}` ({mime})")]
    UnsupportedAttachment {
        /// File name
        name: String,
        /// Reported MIME type
        mime: String,
    },
}

impl ConsoleError {
    /// Whether the user can fix this by editing the draft
    #[inline]
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::EmptyMessage | Self::UnsupportedAttachment { .. })
    }
}

/// A scripted inspection session failed
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The document never posted `iframeReady`
    #[error("preview document did not become ready within {0:?}")]
    NotReady(std::time::Duration),

    /// The sandbox went away mid-session
    #[error(transparent)]
    Sandbox(#[from] lens_sandbox::SandboxGone),
}
