//! Host controller
//!
//! Owns the sandboxed document's lifecycle and is the only thing that talks
//! to it. Inspector state exists twice: the host's flag here and the
//! runtime's flag inside the sandbox. Messages are the only link between them.

use crate::config::{HostConfig, ToggleDelivery};
use crate::error::HostError;
use crate::viewport::{FrameWidth, ViewportMode};
use lens_protocol::{
    Envelope, FrameId, Inbox, InspectionSink, Message, MessageKind, Port, PostError, Rejection,
};
use lens_sandbox::{spawn_sandbox, SandboxEvent, SandboxHandle};
use tokio::sync::mpsc;

/// Load state of the current document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FrameStatus {
    /// Nothing loaded yet
    #[default]
    Empty,
    /// Document replaced, `iframeReady` not yet seen
    Loading,
    /// Document reported ready
    Ready,
}

/// Fate of one inspector command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delivery {
    /// Posted into the current document
    Sent,
    /// Not delivered and not kept
    Dropped,
    /// Held until the document reports ready
    Deferred,
}

/// Why an inbound envelope had no effect
#[derive(Debug)]
pub enum IgnoreReason {
    /// Posted by a document that has since been replaced
    StaleFrame {
        /// Generation the envelope came from
        from: FrameId,
        /// Current generation
        current: FrameId,
    },
    /// Failed origin checks or decoding
    Rejected(Rejection),
    /// A valid message that only the sandbox acts on
    NotForHost(MessageKind),
}

/// Result of handling one inbound envelope
#[derive(Debug)]
pub enum HostEvent {
    /// The document finished loading
    Ready(FrameId),
    /// A snapshot was forwarded to the sink
    Inspected(FrameId),
    /// Dropped without effect
    Ignored(IgnoreReason),
}

/// Presentation summary of the preview container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameChrome {
    /// Container width
    pub width: FrameWidth,
    /// Drawn inside a device bezel
    pub device_frame: bool,
    /// Inspector badge shown over the preview
    pub inspector_badge: bool,
    /// Status bar text
    pub status_label: &'static str,
    /// Size text under the preview
    pub size_label: &'static str,
    /// Fullscreen overlay active
    pub fullscreen: bool,
    /// Raw source panel visible
    pub source_visible: bool,
    /// Document load state
    pub status: FrameStatus,
}

/// Controller of one preview surface, forwarding snapshots to `C`
#[derive(Debug)]
pub struct HostController<C> {
    config: HostConfig,
    sink: C,
    inbox: Inbox,
    outbox: mpsc::UnboundedSender<Envelope>,
    frame: Option<SandboxHandle>,
    commands: Option<Port<SandboxEvent>>,
    generation: FrameId,
    status: FrameStatus,
    markup: Option<String>,
    inspector_enabled: bool,
    pending_toggle: Option<bool>,
    viewport: ViewportMode,
    fullscreen: bool,
    source_visible: bool,
}

impl<C: InspectionSink> HostController<C> {
    /// Create a controller with nothing loaded
    #[must_use]
    pub fn new(config: HostConfig, sink: C) -> Self {
        let (outbox, inbox) = mpsc::unbounded_channel();
        let inspector_enabled = config.initial_inspector;
        Self {
            config,
            sink,
            inbox,
            outbox,
            frame: None,
            commands: None,
            generation: FrameId::default(),
            status: FrameStatus::Empty,
            markup: None,
            inspector_enabled,
            pending_toggle: None,
            viewport: ViewportMode::default(),
            fullscreen: false,
            source_visible: false,
        }
    }

    /// Replace the sandboxed document with `markup`
    ///
    /// The old document is torn down first; anything it still had queued is
    /// lost and anything it already posted is ignored as stale. Under
    /// [`ToggleDelivery::ReadyGate`] an enabled host flag is queued for the
    /// new document's `iframeReady`. Must be called from within a tokio runtime.
    pub fn load_content(&mut self, markup: impl Into<String>) -> FrameId {
        let markup = markup.into();
        self.teardown();

        self.generation = self.generation.next();
        let frame = self.generation;
        let handle = spawn_sandbox(markup.clone(), self.config.sandbox_config(), frame, self.outbox.clone());
        self.commands = Some(handle.port(self.config.host_origin.clone(), self.config.command_target()));
        self.frame = Some(handle);
        self.status = FrameStatus::Loading;
        if self.config.toggle_delivery == ToggleDelivery::ReadyGate {
            // the new document starts disabled
            self.pending_toggle = self.inspector_enabled.then_some(true);
        }
        tracing::info!(%frame, bytes = markup.len(), "loading preview document");
        self.markup = Some(markup);
        frame
    }

    /// Reload the last markup, resetting all sandbox state
    ///
    /// # Errors
    /// [`HostError::NothingLoaded`] if nothing was ever loaded.
    pub fn refresh(&mut self) -> Result<FrameId, HostError> {
        let markup = self.markup.clone().ok_or(HostError::NothingLoaded)?;
        Ok(self.load_content(markup))
    }

    /// Set the inspector flag and send one command into the document
    pub fn set_inspector_enabled(&mut self, enabled: bool) -> Delivery {
        self.inspector_enabled = enabled;
        match (self.status, self.config.toggle_delivery) {
            (FrameStatus::Ready, _) => self.send_toggle(enabled),
            (_, ToggleDelivery::ReadyGate) => {
                tracing::debug!(frame = %self.generation, enabled, "deferring inspector command until ready");
                self.pending_toggle = Some(enabled);
                Delivery::Deferred
            }
            (status, ToggleDelivery::FireAndForget) => {
                tracing::debug!(frame = %self.generation, ?status, enabled, "inspector command lost, document not ready");
                Delivery::Dropped
            }
        }
    }

    /// Flip the host inspector flag
    pub fn toggle_inspector(&mut self) -> Delivery {
        self.set_inspector_enabled(!self.inspector_enabled)
    }

    /// Change the container width; never reaches the sandbox
    pub fn set_viewport_mode(&mut self, mode: ViewportMode) {
        self.viewport = mode;
    }

    /// Toggle fullscreen, returning the new state
    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }

    /// Toggle the raw source panel, returning the new state
    pub fn toggle_source_view(&mut self) -> bool {
        self.source_visible = !self.source_visible;
        self.source_visible
    }

    /// Handle the next inbound envelope, waiting for one
    ///
    /// Returns `None` when nothing is loaded.
    pub async fn process_next(&mut self) -> Option<HostEvent> {
        if self.frame.is_none() {
            return None;
        }
        let envelope = self.inbox.recv().await?;
        Some(self.dispatch(envelope))
    }

    /// Handle everything already queued without waiting
    pub fn pump(&mut self) -> Vec<HostEvent> {
        let mut events = Vec::new();
        while let Ok(envelope) = self.inbox.try_recv() {
            events.push(self.dispatch(envelope));
        }
        events
    }

    /// Process envelopes until the current document reports ready
    ///
    /// Snapshots arriving meanwhile are forwarded as usual. Returns `None`
    /// when nothing is loaded.
    pub async fn wait_ready(&mut self) -> Option<FrameId> {
        loop {
            if self.status == FrameStatus::Ready {
                return Some(self.generation);
            }
            self.process_next().await?;
        }
    }

    /// Handle one envelope from the sandbox side
    pub fn dispatch(&mut self, envelope: Envelope) -> HostEvent {
        if envelope.source != self.generation {
            tracing::debug!(from = %envelope.source, current = %self.generation, "ignoring envelope from replaced document");
            return HostEvent::Ignored(IgnoreReason::StaleFrame {
                from: envelope.source,
                current: self.generation,
            });
        }

        match envelope.open(&self.config.host_origin, &self.config.trusted_origin) {
            Ok(Message::Ready) => {
                self.status = FrameStatus::Ready;
                tracing::debug!(frame = %self.generation, "preview document ready");
                if let Some(enabled) = self.pending_toggle.take() {
                    self.send_toggle(enabled);
                }
                HostEvent::Ready(self.generation)
            }
            Ok(Message::ElementInspected { element }) => {
                tracing::debug!(frame = %self.generation, key = %element.key(), "forwarding inspected element");
                self.sink.on_element_inspect(element);
                HostEvent::Inspected(self.generation)
            }
            Ok(other) => {
                tracing::trace!(kind = ?other.kind(), "message not addressed to host");
                HostEvent::Ignored(IgnoreReason::NotForHost(other.kind()))
            }
            Err(Rejection::Decode(err)) if err.is_ignorable_unknown() => {
                tracing::trace!(error = %err, "ignoring unknown message");
                HostEvent::Ignored(IgnoreReason::Rejected(Rejection::Decode(err)))
            }
            Err(rejection) => {
                tracing::debug!(error = %rejection, "dropping inbound envelope");
                HostEvent::Ignored(IgnoreReason::Rejected(rejection))
            }
        }
    }

    /// Host inspector flag
    #[inline]
    #[must_use]
    pub fn inspector_enabled(&self) -> bool {
        self.inspector_enabled
    }

    /// Command held for the next `iframeReady`
    #[inline]
    #[must_use]
    pub fn pending_toggle(&self) -> Option<bool> {
        self.pending_toggle
    }

    /// Load state of the current document
    #[inline]
    #[must_use]
    pub fn status(&self) -> FrameStatus {
        self.status
    }

    /// Current document generation
    #[inline]
    #[must_use]
    pub fn generation(&self) -> FrameId {
        self.generation
    }

    /// Active viewport mode
    #[inline]
    #[must_use]
    pub fn viewport_mode(&self) -> ViewportMode {
        self.viewport
    }

    /// Last loaded markup, for the source view and copy button
    #[inline]
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.markup.as_deref()
    }

    /// The current sandbox, for delivering end-user clicks
    #[inline]
    #[must_use]
    pub fn frame(&self) -> Option<&SandboxHandle> {
        self.frame.as_ref()
    }

    /// Configuration in effect
    #[inline]
    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// The consumer snapshots are forwarded to
    #[inline]
    #[must_use]
    pub fn sink(&self) -> &C {
        &self.sink
    }

    /// Mutable access to the consumer
    #[inline]
    pub fn sink_mut(&mut self) -> &mut C {
        &mut self.sink
    }

    /// Tear down and hand back the consumer
    #[must_use]
    pub fn into_sink(mut self) -> C {
        self.teardown();
        self.sink
    }

    /// Presentation summary of the container
    #[must_use]
    pub fn chrome(&self) -> FrameChrome {
        FrameChrome {
            width: self.viewport.width(),
            device_frame: self.viewport.has_device_frame(),
            inspector_badge: self.inspector_enabled,
            status_label: if self.inspector_enabled {
                "Inspector Active"
            } else {
                "Inspector Disabled"
            },
            size_label: self.viewport.label(),
            fullscreen: self.fullscreen,
            source_visible: self.source_visible,
            status: self.status,
        }
    }

    fn send_toggle(&self, enabled: bool) -> Delivery {
        let Some(port) = &self.commands else {
            return Delivery::Dropped;
        };
        match port.post(&Message::ToggleInspector { enabled }) {
            Ok(()) => Delivery::Sent,
            Err(PostError::Closed) => {
                tracing::warn!(frame = %self.generation, "sandbox is gone, inspector command lost");
                Delivery::Dropped
            }
            Err(err) => {
                tracing::warn!(frame = %self.generation, error = %err, "failed to post inspector command");
                Delivery::Dropped
            }
        }
    }

    fn teardown(&mut self) {
        self.commands = None;
        if let Some(handle) = self.frame.take() {
            handle.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_protocol::{InspectedElement, TrustedOrigin};
    use serde_json::json;

    fn controller(config: HostConfig) -> HostController<Vec<InspectedElement>> {
        HostController::new(config, Vec::new())
    }

    fn from_frame(frame: FrameId, payload: serde_json::Value) -> Envelope {
        Envelope {
            source: frame,
            origin: "http://localhost".to_string(),
            target_origin: TrustedOrigin::Any,
            payload,
        }
    }

    #[test]
    fn starts_empty_and_disabled() {
        let host = controller(HostConfig::default());
        assert_eq!(host.status(), FrameStatus::Empty);
        assert!(!host.inspector_enabled());
        assert_eq!(host.chrome().status_label, "Inspector Disabled");
        assert!(host.source().is_none());
    }

    #[test]
    fn refresh_without_content_fails() {
        let mut host = controller(HostConfig::default());
        assert!(matches!(host.refresh(), Err(HostError::NothingLoaded)));
    }

    #[test]
    fn fire_and_forget_drops_before_load() {
        let mut host = controller(HostConfig::default());
        assert_eq!(host.set_inspector_enabled(true), Delivery::Dropped);
        assert!(host.inspector_enabled());
        assert_eq!(host.pending_toggle(), None);
    }

    #[test]
    fn ready_gate_keeps_latest_command() {
        let mut host = controller(HostConfig::default().with_toggle_delivery(ToggleDelivery::ReadyGate));
        assert_eq!(host.set_inspector_enabled(true), Delivery::Deferred);
        assert_eq!(host.set_inspector_enabled(false), Delivery::Deferred);
        assert_eq!(host.pending_toggle(), Some(false));
    }

    #[test]
    fn chrome_follows_local_toggles() {
        let mut host = controller(HostConfig::default());
        host.set_viewport_mode(ViewportMode::Mobile);
        assert!(host.toggle_fullscreen());
        assert!(host.toggle_source_view());
        host.toggle_inspector();

        let chrome = host.chrome();
        assert_eq!(chrome.width, FrameWidth::Fixed(375));
        assert!(chrome.device_frame);
        assert!(chrome.inspector_badge);
        assert_eq!(chrome.status_label, "Inspector Active");
        assert_eq!(chrome.size_label, "375px × Viewport");
        assert!(chrome.fullscreen && chrome.source_visible);
    }

    #[test]
    fn stale_and_foreign_envelopes_are_ignored() {
        let mut host = controller(HostConfig::default());
        let event = host.dispatch(from_frame(FrameId(9), json!({ "type": "iframeReady" })));
        assert!(matches!(event, HostEvent::Ignored(IgnoreReason::StaleFrame { .. })));

        let event = host.dispatch(from_frame(FrameId(0), json!({ "type": "toggleInspector", "enabled": true })));
        assert!(matches!(event, HostEvent::Ignored(IgnoreReason::NotForHost(MessageKind::ToggleInspector))));

        let event = host.dispatch(from_frame(FrameId(0), json!({ "type": "somethingElse" })));
        assert!(matches!(event, HostEvent::Ignored(IgnoreReason::Rejected(_))));
        assert_eq!(host.status(), FrameStatus::Empty);
        assert!(host.sink().is_empty());
    }

    #[test]
    fn untrusted_origin_is_rejected_when_tightened() {
        let mut host = controller(HostConfig::default().with_trusted_origin(TrustedOrigin::exact("https://preview.example")));
        let event = host.dispatch(from_frame(FrameId(0), json!({ "type": "iframeReady" })));
        assert!(matches!(
            event,
            HostEvent::Ignored(IgnoreReason::Rejected(Rejection::UntrustedOrigin(_)))
        ));
    }
}
