//! The sandboxed document as an isolated tokio task
//!
//! The task owns the document and its runtime. Everything reaches it through
//! one inbox, so host commands and end-user clicks are handled in arrival
//! order.

use crate::dom::{Document, NodeId};
use crate::error::SandboxGone;
use crate::runtime::{SandboxConfig, SandboxRuntime, SandboxState};
use crate::style::{CascadeResolver, StyleResolver};
use lens_protocol::{Envelope, FrameId, Port, TrustedOrigin};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Where an end-user click lands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    /// A known node
    Node(NodeId),
    /// First element matching a CSS selector
    Selector(String),
}

/// Events queued for the sandbox task
#[derive(Debug)]
pub enum SandboxEvent {
    /// Envelope posted from the host
    Deliver(Envelope),
    /// End-user click
    Click(ClickTarget),
    /// Report current state
    Inspect(oneshot::Sender<SandboxState>),
}

impl From<Envelope> for SandboxEvent {
    fn from(envelope: Envelope) -> Self {
        Self::Deliver(envelope)
    }
}

/// Owner's handle on a running sandbox
///
/// Dropping the handle tears the document down.
#[derive(Debug)]
pub struct SandboxHandle {
    frame: FrameId,
    tx: mpsc::UnboundedSender<SandboxEvent>,
    task: JoinHandle<()>,
}

impl SandboxHandle {
    /// Document generation this sandbox belongs to
    #[inline]
    #[must_use]
    pub fn frame(&self) -> FrameId {
        self.frame
    }

    /// A posting port into this sandbox
    #[must_use]
    pub fn port(&self, origin: impl Into<String>, target_origin: TrustedOrigin) -> Port<SandboxEvent> {
        Port::new(self.tx.clone(), self.frame, origin, target_origin)
    }

    /// Queue a raw envelope
    ///
    /// # Errors
    /// [`SandboxGone`] if the task has stopped.
    pub fn post(&self, envelope: Envelope) -> Result<(), SandboxGone> {
        self.send(SandboxEvent::Deliver(envelope))
    }

    /// Click the first element matching `selector`
    ///
    /// # Errors
    /// [`SandboxGone`] if the task has stopped.
    pub fn click_selector(&self, selector: impl Into<String>) -> Result<(), SandboxGone> {
        self.send(SandboxEvent::Click(ClickTarget::Selector(selector.into())))
    }

    /// Click a node by id
    ///
    /// # Errors
    /// [`SandboxGone`] if the task has stopped.
    pub fn click_node(&self, node: NodeId) -> Result<(), SandboxGone> {
        self.send(SandboxEvent::Click(ClickTarget::Node(node)))
    }

    /// Current runtime state, after everything queued before this call
    ///
    /// # Errors
    /// [`SandboxGone`] if the task has stopped.
    pub async fn state(&self) -> Result<SandboxState, SandboxGone> {
        let (reply, rx) = oneshot::channel();
        self.send(SandboxEvent::Inspect(reply))?;
        rx.await.map_err(|_| SandboxGone)
    }

    /// Tear the document down; queued events are lost
    pub fn shutdown(&self) {
        tracing::debug!(frame = %self.frame, "tearing down sandbox");
        self.task.abort();
    }

    fn send(&self, event: SandboxEvent) -> Result<(), SandboxGone> {
        self.tx.send(event).map_err(|_| SandboxGone)
    }
}

impl Drop for SandboxHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a sandbox for `markup` with the built-in style resolver
///
/// Envelopes go back through `host`, stamped with `frame` and addressed as
/// `config` says. The new document posts `iframeReady` as soon as it has
/// parsed.
#[must_use]
pub fn spawn_sandbox(
    markup: String,
    config: SandboxConfig,
    frame: FrameId,
    host: mpsc::UnboundedSender<Envelope>,
) -> SandboxHandle {
    spawn_sandbox_with(markup, CascadeResolver, config, frame, host)
}

/// Spawn a sandbox with a custom style resolver
#[must_use]
pub fn spawn_sandbox_with<R>(
    markup: String,
    resolver: R,
    config: SandboxConfig,
    frame: FrameId,
    host: mpsc::UnboundedSender<Envelope>,
) -> SandboxHandle
where
    R: StyleResolver + 'static,
{
    let outbox = config.outbox(frame, host);
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(sandbox_task(markup, resolver, config, outbox, rx));
    SandboxHandle { frame, tx, task }
}

/// Sandbox task (runs in its own tokio task)
async fn sandbox_task<R: StyleResolver>(
    markup: String,
    resolver: R,
    config: SandboxConfig,
    outbox: Port,
    mut inbox: mpsc::UnboundedReceiver<SandboxEvent>,
) {
    let frame = outbox.source();
    let document = Document::parse(&markup);
    tracing::debug!(%frame, bytes = markup.len(), "sandbox document parsed");

    let mut runtime = SandboxRuntime::with_resolver(document, resolver, config, outbox);
    runtime.boot();

    while let Some(event) = inbox.recv().await {
        match event {
            SandboxEvent::Deliver(envelope) => {
                runtime.handle_envelope(&envelope);
            }
            SandboxEvent::Click(ClickTarget::Node(node)) => {
                runtime.click(node);
            }
            SandboxEvent::Click(ClickTarget::Selector(selector)) => {
                match runtime.document().query_selector(&selector) {
                    Ok(Some(node)) => {
                        runtime.click(node);
                    }
                    Ok(None) => tracing::debug!(%frame, %selector, "click matched nothing"),
                    Err(err) => tracing::debug!(%frame, error = %err, "bad click selector"),
                }
            }
            SandboxEvent::Inspect(reply) => {
                // requester may have given up
                let _ = reply.send(runtime.state());
            }
        }
    }
    tracing::debug!(%frame, "sandbox inbox closed");
}
