//! Envelopes, origins and the posting side of the channel
//!
//! The channel is modelled on `postMessage`: a poster names the origin it is
//! willing to deliver to, a receiver decides which sender origins it trusts.
//! Both are [`TrustedOrigin`] values so the trust model can be tightened by
//! configuration alone.

use crate::error::{PostError, Rejection};
use crate::message::{decode, Message};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use tokio::sync::mpsc;

/// Receiving end of a cross-boundary channel
pub type Inbox = mpsc::UnboundedReceiver<Envelope>;

/// Identity of one loaded document (its load generation)
///
/// Every replacement of the sandboxed document gets a fresh id, so envelopes
/// from a torn-down document can be told apart from the current one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameId(pub u64);

impl FrameId {
    /// The id of the document that replaces this one
    #[inline]
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame-{}", self.0)
    }
}

/// Origin filter: `"*"` or one exact origin
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrustedOrigin {
    /// Any origin (the permissive default)
    #[default]
    Any,
    /// Exactly this origin, compared without a trailing slash
    Exact(String),
}

impl TrustedOrigin {
    /// Restrict to one origin
    #[must_use]
    pub fn exact(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self::Exact(origin.trim_end_matches('/').to_string())
    }

    /// Whether `origin` passes this filter
    #[must_use]
    pub fn permits(&self, origin: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => expected == origin.trim_end_matches('/'),
        }
    }

    /// True for `"*"`
    #[inline]
    #[must_use]
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl From<String> for TrustedOrigin {
    fn from(value: String) -> Self {
        if value.trim() == "*" {
            Self::Any
        } else {
            Self::exact(value.trim())
        }
    }
}

impl From<TrustedOrigin> for String {
    fn from(value: TrustedOrigin) -> Self {
        value.to_string()
    }
}

impl FromStr for TrustedOrigin {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for TrustedOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Exact(origin) => f.write_str(origin),
        }
    }
}

/// One posted message in transit
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Document the envelope belongs to
    pub source: FrameId,
    /// Origin of the posting context
    pub origin: String,
    /// Origin the poster is willing to deliver to
    pub target_origin: TrustedOrigin,
    /// Raw payload, validated by the receiver
    pub payload: Value,
}

impl Envelope {
    /// Check delivery rules and decode the payload
    ///
    /// # Arguments
    /// * `receiver_origin` - origin of the receiving context
    /// * `accepted` - sender origins the receiver trusts
    ///
    /// # Errors
    /// - [`Rejection::TargetMismatch`] if the poster targeted another origin
    /// - [`Rejection::UntrustedOrigin`] if the sender is not trusted
    /// - [`Rejection::Decode`] if the payload is unknown or malformed
    pub fn open(&self, receiver_origin: &str, accepted: &TrustedOrigin) -> Result<Message, Rejection> {
        if !self.target_origin.permits(receiver_origin) {
            return Err(Rejection::TargetMismatch {
                target: self.target_origin.to_string(),
                receiver: receiver_origin.to_string(),
            });
        }
        if !accepted.permits(&self.origin) {
            return Err(Rejection::UntrustedOrigin(self.origin.clone()));
        }
        Ok(decode(&self.payload)?)
    }
}

/// Posting side of a channel into another context
///
/// `T` is whatever the receiving event loop queues; it only has to be
/// constructible from an [`Envelope`].
#[derive(Debug)]
pub struct Port<T = Envelope> {
    source: FrameId,
    origin: String,
    target_origin: TrustedOrigin,
    tx: mpsc::UnboundedSender<T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Port<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            origin: self.origin.clone(),
            target_origin: self.target_origin.clone(),
            tx: self.tx.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: From<Envelope>> Port<T> {
    /// Wrap a channel sender
    #[must_use]
    pub fn new(
        tx: mpsc::UnboundedSender<T>,
        source: FrameId,
        origin: impl Into<String>,
        target_origin: TrustedOrigin,
    ) -> Self {
        Self {
            source,
            origin: origin.into(),
            target_origin,
            tx,
            _marker: PhantomData,
        }
    }

    /// Post a message without waiting
    ///
    /// # Errors
    /// [`PostError::Closed`] if the other context is gone. Callers treat this
    /// as a lost message, never as a fatal condition.
    pub fn post(&self, message: &Message) -> Result<(), PostError> {
        let payload = message.to_payload()?;
        self.post_raw(payload)
    }

    /// Post an arbitrary payload, bypassing message encoding
    ///
    /// # Errors
    /// [`PostError::Closed`] if the other context is gone.
    pub fn post_raw(&self, payload: Value) -> Result<(), PostError> {
        let envelope = Envelope {
            source: self.source,
            origin: self.origin.clone(),
            target_origin: self.target_origin.clone(),
            payload,
        };
        tracing::trace!(source = %self.source, "posting envelope");
        self.tx
            .send(T::from(envelope))
            .map_err(|_| PostError::Closed)
    }

    /// Document this port posts on behalf of
    #[inline]
    #[must_use]
    pub fn source(&self) -> FrameId {
        self.source
    }

    /// Whether the receiving context has gone away
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(origin: &str, target: TrustedOrigin, payload: Value) -> Envelope {
        Envelope {
            source: FrameId(1),
            origin: origin.to_string(),
            target_origin: target,
            payload,
        }
    }

    #[test]
    fn trusted_origin_parses_star() {
        assert_eq!("*".parse::<TrustedOrigin>().unwrap(), TrustedOrigin::Any);
        assert_eq!(
            "https://app.test/".parse::<TrustedOrigin>().unwrap(),
            TrustedOrigin::Exact("https://app.test".to_string())
        );
    }

    #[test]
    fn trusted_origin_serde_is_a_plain_string() {
        let json = serde_json::to_value(TrustedOrigin::exact("https://a.test")).unwrap();
        assert_eq!(json, json!("https://a.test"));
        let any: TrustedOrigin = serde_json::from_value(json!("*")).unwrap();
        assert!(any.is_any());
    }

    #[test]
    fn exact_origin_filters() {
        let origin = TrustedOrigin::exact("https://app.test");
        assert!(origin.permits("https://app.test"));
        assert!(origin.permits("https://app.test/"));
        assert!(!origin.permits("https://evil.test"));
        assert!(TrustedOrigin::Any.permits("null"));
    }

    #[test]
    fn open_checks_target_then_sender() {
        let payload = json!({ "type": "iframeReady" });

        let env = envelope("https://a.test", TrustedOrigin::exact("https://b.test"), payload.clone());
        assert!(matches!(
            env.open("https://c.test", &TrustedOrigin::Any),
            Err(Rejection::TargetMismatch { .. })
        ));

        let env = envelope("https://a.test", TrustedOrigin::Any, payload.clone());
        assert!(matches!(
            env.open("https://b.test", &TrustedOrigin::exact("https://z.test")),
            Err(Rejection::UntrustedOrigin(_))
        ));

        let env = envelope("https://a.test", TrustedOrigin::Any, payload);
        assert_eq!(env.open("https://b.test", &TrustedOrigin::Any).unwrap(), Message::Ready);
    }

    #[test]
    fn open_surfaces_decode_errors() {
        let env = envelope("x", TrustedOrigin::Any, json!({ "type": "somethingElse" }));
        assert!(matches!(
            env.open("y", &TrustedOrigin::Any),
            Err(Rejection::Decode(crate::DecodeError::UnknownTag(_)))
        ));
    }

    #[tokio::test]
    async fn port_posts_and_reports_closed() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();
        let port = Port::new(tx, FrameId(3), "https://a.test", TrustedOrigin::Any);

        port.post(&Message::ToggleInspector { enabled: true }).unwrap();
        let env = rx.recv().await.unwrap();
        assert_eq!(env.source, FrameId(3));
        assert_eq!(env.payload["enabled"], true);

        drop(rx);
        assert!(port.is_closed());
        assert!(matches!(port.post(&Message::Ready), Err(PostError::Closed)));
    }

    #[test]
    fn frame_ids_advance() {
        assert_eq!(FrameId(0).next(), FrameId(1));
        assert_eq!(FrameId(7).to_string(), "frame-7");
    }
}
