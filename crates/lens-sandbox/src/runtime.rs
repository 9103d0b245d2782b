//! The script that runs inside the sandboxed document
//!
//! Owns the inspector flag, the single selection and click capture. It talks
//! to the host only through its outbound [`Port`].

use crate::dom::{Document, ElementExt, NodeId};
use crate::error::CaptureError;
use crate::style::{CascadeResolver, StyleResolver};
use lens_protocol::{
    Envelope, FrameId, InspectedElement, Message, Port, PostError, Rejection, TrustedOrigin,
    INNER_HTML_EXCERPT_LIMIT,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Sandbox-side configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Origin of the sandboxed document
    pub origin: String,
    /// Sender origins whose commands are honoured
    pub accepted_origin: TrustedOrigin,
    /// Origin outbound messages are addressed to
    pub target_origin: TrustedOrigin,
    /// Characters of inner markup kept in snapshots
    pub excerpt_limit: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost".to_string(),
            accepted_origin: TrustedOrigin::Any,
            target_origin: TrustedOrigin::Any,
            excerpt_limit: INNER_HTML_EXCERPT_LIMIT,
        }
    }
}

impl SandboxConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With document origin
    #[inline]
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// With accepted sender origin
    #[inline]
    #[must_use]
    pub fn with_accepted_origin(mut self, origin: TrustedOrigin) -> Self {
        self.accepted_origin = origin;
        self
    }

    /// With outbound target origin
    #[inline]
    #[must_use]
    pub fn with_target_origin(mut self, origin: TrustedOrigin) -> Self {
        self.target_origin = origin;
        self
    }

    /// With excerpt limit
    #[inline]
    #[must_use]
    pub fn with_excerpt_limit(mut self, limit: usize) -> Self {
        self.excerpt_limit = limit;
        self
    }

    /// Outbound port for document `frame`, stamped with this origin and
    /// addressed to [`SandboxConfig::target_origin`]
    #[must_use]
    pub fn outbox(&self, frame: FrameId, tx: mpsc::UnboundedSender<Envelope>) -> Port {
        Port::new(tx, frame, self.origin.clone(), self.target_origin.clone())
    }
}

/// What a click ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Inspector off: the click behaves normally
    PassedThrough,
    /// Snapshot captured, selection moved, result posted
    Inspected,
    /// Capture failed; nothing posted, selection untouched
    CaptureFailed(CaptureError),
}

/// The click as the document's event system saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    /// Element the click landed on
    pub target: NodeId,
    /// Default action (link navigation, form submit) was suppressed
    pub default_prevented: bool,
    /// Propagation to the document's own handlers was stopped
    pub propagation_stopped: bool,
    /// Outcome
    pub outcome: ClickOutcome,
}

/// How an inbound envelope was handled
#[derive(Debug)]
pub enum InboundOutcome {
    /// Inspector flag applied
    Applied {
        /// Flag after the command
        enabled: bool,
    },
    /// Decoded fine but not a command for this side
    NotForSandbox,
    /// Refused or undecodable
    Rejected(Rejection),
}

/// By-value view of runtime state, for diagnostics and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxState {
    /// Document this runtime belongs to
    pub frame: FrameId,
    /// Whether `iframeReady` has been posted
    pub booted: bool,
    /// Inspector flag
    pub inspector_enabled: bool,
    /// Hover styling active
    pub hover_affordance: bool,
    /// Current selection
    pub selection: Option<NodeId>,
    /// Every node carrying the selection highlight
    pub highlighted: Vec<NodeId>,
}

/// Runtime state machine of one sandboxed document
#[derive(Debug)]
pub struct SandboxRuntime<R = CascadeResolver> {
    document: Document,
    resolver: R,
    config: SandboxConfig,
    outbox: Port,
    inspector_enabled: bool,
    selection: Option<NodeId>,
    booted: bool,
}

impl SandboxRuntime<CascadeResolver> {
    /// Runtime with the built-in style resolver
    #[must_use]
    pub fn new(document: Document, config: SandboxConfig, outbox: Port) -> Self {
        Self::with_resolver(document, CascadeResolver, config, outbox)
    }
}

impl<R: StyleResolver> SandboxRuntime<R> {
    /// Runtime with a custom style resolver
    ///
    /// Inspector mode starts disabled and nothing is selected.
    #[must_use]
    pub fn with_resolver(document: Document, resolver: R, config: SandboxConfig, outbox: Port) -> Self {
        Self {
            document,
            resolver,
            config,
            outbox,
            inspector_enabled: false,
            selection: None,
            booted: false,
        }
    }

    /// Initial script execution: posts `iframeReady` exactly once
    ///
    /// Returns false if the runtime had already booted.
    pub fn boot(&mut self) -> bool {
        if self.booted {
            return false;
        }
        self.booted = true;
        self.apply_inspector(self.inspector_enabled);
        self.post(&Message::Ready);
        true
    }

    /// Handle one envelope from the host
    ///
    /// Unknown, malformed and untrusted envelopes leave state untouched.
    pub fn handle_envelope(&mut self, envelope: &Envelope) -> InboundOutcome {
        match envelope.open(&self.config.origin, &self.config.accepted_origin) {
            Ok(Message::ToggleInspector { enabled }) => {
                tracing::debug!(frame = %self.outbox.source(), enabled, "inspector toggled");
                self.apply_inspector(enabled);
                InboundOutcome::Applied { enabled }
            }
            Ok(other) => {
                tracing::trace!(kind = ?other.kind(), "message not addressed to sandbox");
                InboundOutcome::NotForSandbox
            }
            Err(Rejection::Decode(err)) if err.is_ignorable_unknown() => {
                tracing::trace!(error = %err, "ignoring unknown message");
                InboundOutcome::Rejected(Rejection::Decode(err))
            }
            Err(rejection) => {
                tracing::debug!(error = %rejection, "dropping inbound envelope");
                InboundOutcome::Rejected(rejection)
            }
        }
    }

    /// A pointer click landed on `target`
    pub fn click(&mut self, target: NodeId) -> ClickEvent {
        if !self.inspector_enabled {
            return ClickEvent {
                target,
                default_prevented: false,
                propagation_stopped: false,
                outcome: ClickOutcome::PassedThrough,
            };
        }

        // snapshot first: a failed read must leave the old selection in place
        let outcome = match self.capture(target) {
            Ok(element) => {
                self.clear_selection();
                self.document.set_selected(target, true);
                self.selection = Some(target);
                tracing::debug!(tag = element.tag_name(), "element inspected");
                self.post(&Message::ElementInspected { element });
                ClickOutcome::Inspected
            }
            Err(err) => {
                tracing::debug!(error = %err, "capture failed, click ignored");
                ClickOutcome::CaptureFailed(err)
            }
        };

        ClickEvent {
            target,
            default_prevented: true,
            propagation_stopped: true,
            outcome,
        }
    }

    /// Take a by-value snapshot of `node`
    ///
    /// # Errors
    /// [`CaptureError`] if the node is unknown, detached, not an element, or
    /// the resolver fails.
    pub fn capture(&self, node: NodeId) -> Result<InspectedElement, CaptureError> {
        let styles = self.resolver.computed(&self.document, node)?;
        let element = self
            .document
            .element(node)
            .ok_or(CaptureError::NotAnElement(node))?;
        let markup = self.document.inner_html_prefix(node, self.config.excerpt_limit);
        Ok(InspectedElement::with_excerpt_limit(
            element.tag_name(),
            element.attribute_map(),
            styles,
            &markup,
            self.config.excerpt_limit,
        ))
    }

    /// Inspector flag
    #[inline]
    #[must_use]
    pub fn inspector_enabled(&self) -> bool {
        self.inspector_enabled
    }

    /// Current selection
    #[inline]
    #[must_use]
    pub fn selection(&self) -> Option<NodeId> {
        self.selection
    }

    /// The document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable document, for the document's own scripts
    #[inline]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Snapshot of runtime state
    #[must_use]
    pub fn state(&self) -> SandboxState {
        SandboxState {
            frame: self.outbox.source(),
            booted: self.booted,
            inspector_enabled: self.inspector_enabled,
            hover_affordance: self.document.hover_affordance(),
            selection: self.selection,
            highlighted: self.document.highlighted(),
        }
    }

    fn apply_inspector(&mut self, enabled: bool) {
        self.inspector_enabled = enabled;
        self.document.set_hover_affordance(enabled);
        if !enabled {
            self.clear_selection();
        }
    }

    fn clear_selection(&mut self) {
        if let Some(previous) = self.selection.take() {
            self.document.set_selected(previous, false);
        }
    }

    fn post(&self, message: &Message) {
        match self.outbox.post(message) {
            Ok(()) => {}
            Err(PostError::Closed) => {
                tracing::warn!(kind = ?message.kind(), frame = %self.outbox.source(), "host is gone, message lost");
            }
            Err(err) => {
                tracing::warn!(kind = ?message.kind(), error = %err, "failed to post message");
            }
        }
    }
}
