//! Scripted inspection sessions
//!
//! Drives a host and its sandbox the way a person would: load, turn the
//! inspector on, click a list of targets. Used by `lens-inspect`.

use crate::error::SessionError;
use crate::log::ConversationLog;
use lens_host::{Delivery, FrameChrome, HostConfig, HostController, HostEvent, ViewportMode};
use std::time::Duration;
use tokio::time::timeout;

/// Default wait for `iframeReady`
pub const READY_TIMEOUT: Duration = Duration::from_secs(5);

/// What one session produced
#[derive(Debug)]
pub struct SessionOutcome {
    /// Log with one entry per successful inspection
    pub log: ConversationLog,
    /// Container state at the end of the session
    pub chrome: FrameChrome,
    /// Click targets that produced no snapshot
    pub unmatched: Vec<String>,
}

/// Scripted session parameters
#[derive(Debug, Clone)]
pub struct Session {
    config: HostConfig,
    viewport: ViewportMode,
    clicks: Vec<String>,
    ready_timeout: Duration,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

impl Session {
    /// Session with the given host configuration
    #[must_use]
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            viewport: ViewportMode::default(),
            clicks: Vec::new(),
            ready_timeout: READY_TIMEOUT,
        }
    }

    /// With viewport mode
    #[inline]
    #[must_use]
    pub fn with_viewport(mut self, viewport: ViewportMode) -> Self {
        self.viewport = viewport;
        self
    }

    /// With a different wait for `iframeReady`
    #[inline]
    #[must_use]
    pub fn with_ready_timeout(mut self, wait: Duration) -> Self {
        self.ready_timeout = wait;
        self
    }

    /// With click targets, in order
    #[must_use]
    pub fn with_clicks(mut self, clicks: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.clicks.extend(clicks.into_iter().map(Into::into));
        self
    }

    /// Run against `markup`
    ///
    /// # Errors
    /// - [`SessionError::NotReady`] if the document never reports ready
    /// - [`SessionError::Sandbox`] if the sandbox dies mid-session
    pub async fn run(self, markup: &str) -> Result<SessionOutcome, SessionError> {
        let mut host = HostController::new(self.config, ConversationLog::new());
        host.set_viewport_mode(self.viewport);
        host.load_content(markup);

        match timeout(self.ready_timeout, host.wait_ready()).await {
            Ok(Some(frame)) => tracing::info!(%frame, "preview ready"),
            Ok(None) | Err(_) => return Err(SessionError::NotReady(self.ready_timeout)),
        }
        if host.set_inspector_enabled(true) != Delivery::Sent {
            tracing::warn!("inspector command was not delivered");
        }

        let mut unmatched = Vec::new();
        for selector in self.clicks {
            let frame = host.frame().ok_or(lens_sandbox::SandboxGone)?;
            frame.click_selector(selector.as_str())?;
            // the reply is queued behind the click, so the snapshot is already posted
            frame.state().await?;

            let inspected = host
                .pump()
                .iter()
                .filter(|event| matches!(event, HostEvent::Inspected(_)))
                .count();
            if inspected == 0 {
                tracing::warn!(%selector, "click produced no snapshot");
                unmatched.push(selector);
            }
        }

        let chrome = host.chrome();
        Ok(SessionOutcome {
            log: host.into_sink(),
            chrome,
            unmatched,
        })
    }
}
