//! Error types for the wire protocol
//!
//! None of these are fatal. Receivers log them and drop the offending
//! envelope; posters log them and carry on.

/// Why a raw payload could not be turned into a [`Message`](crate::Message)
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Payload is not an object or has no string `type` field
    #[error("payload carries no message tag")]
    Untagged,

    /// Tag is not one this build understands (newer peer, foreign sender)
    #[error("unknown message tag: {0}")]
    UnknownTag(String),

    /// Tag is known but the payload has the wrong shape
    #[error("malformed {tag} payload: {source}")]
    Malformed {
        /// The recognised tag
        tag: &'static str,
        /// Underlying shape error
        #[source]
        source: serde_json::Error,
    },
}

impl DecodeError {
    /// True for payloads that are silently ignorable for forward compatibility
    ///
    /// Malformed payloads of a known tag are still ignored, but they are
    /// worth a diagnostic log line.
    #[inline]
    #[must_use]
    pub fn is_ignorable_unknown(&self) -> bool {
        matches!(self, Self::Untagged | Self::UnknownTag(_))
    }
}

/// Why a receiver refused an inbound envelope
#[derive(Debug, thiserror::Error)]
pub enum Rejection {
    /// The poster addressed a different origin than the receiver's
    #[error("envelope targets {target}, receiver is {receiver}")]
    TargetMismatch {
        /// Origin the poster asked for
        target: String,
        /// Origin of the receiving context
        receiver: String,
    },

    /// The receiver does not accept messages from the sending origin
    #[error("untrusted sender origin: {0}")]
    UntrustedOrigin(String),

    /// Payload failed to decode
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Failure to hand an envelope to the other context
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    /// The receiving context has been torn down
    #[error("receiving context is gone")]
    Closed,

    /// Message could not be encoded
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tags_are_ignorable() {
        assert!(DecodeError::Untagged.is_ignorable_unknown());
        assert!(DecodeError::UnknownTag("x".to_string()).is_ignorable_unknown());
    }

    #[test]
    fn malformed_is_not_ignorable_unknown() {
        let source = serde_json::from_str::<bool>("\"nope\"").unwrap_err();
        let err = DecodeError::Malformed {
            tag: "toggleInspector",
            source,
        };
        assert!(!err.is_ignorable_unknown());
        assert!(err.to_string().contains("malformed toggleInspector"));
    }

    #[test]
    fn rejection_display() {
        let err = Rejection::UntrustedOrigin("https://evil.test".to_string());
        assert!(err.to_string().contains("evil.test"));
    }
}
