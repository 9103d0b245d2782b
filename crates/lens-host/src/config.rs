//! Host configuration
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! host_origin = "https://studio.example"
//! trusted_origin = "https://studio.example"
//! toggle_delivery = "ready_gate"
//! ```

use crate::error::ConfigError;
use lens_protocol::{TrustedOrigin, INNER_HTML_EXCERPT_LIMIT};
use lens_sandbox::SandboxConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What happens to an inspector command sent before the document is ready
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleDelivery {
    /// Send immediately; lost if the document is still loading
    #[default]
    FireAndForget,
    /// Hold the latest command until the document reports ready
    ReadyGate,
}

/// Host controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Origin of the embedding page
    pub host_origin: String,
    /// Origin of the sandboxed document; same as the host when unset
    pub sandbox_origin: Option<String>,
    /// Sender origin the host accepts; when exact, the sandbox in turn only
    /// accepts the host origin
    pub trusted_origin: TrustedOrigin,
    /// `*` or an exact origin; when exact, each side addresses the other
    /// side's origin
    pub target_origin: TrustedOrigin,
    /// Handling of commands sent during a load
    pub toggle_delivery: ToggleDelivery,
    /// Host inspector flag before any toggle
    pub initial_inspector: bool,
    /// Characters of inner markup kept per snapshot
    pub excerpt_limit: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            host_origin: "http://localhost".to_string(),
            sandbox_origin: None,
            trusted_origin: TrustedOrigin::Any,
            target_origin: TrustedOrigin::Any,
            toggle_delivery: ToggleDelivery::FireAndForget,
            initial_inspector: false,
            excerpt_limit: INNER_HTML_EXCERPT_LIMIT,
        }
    }
}

impl HostConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With host origin
    #[inline]
    #[must_use]
    pub fn with_host_origin(mut self, origin: impl Into<String>) -> Self {
        self.host_origin = origin.into();
        self
    }

    /// With a sandbox origin distinct from the host
    #[inline]
    #[must_use]
    pub fn with_sandbox_origin(mut self, origin: impl Into<String>) -> Self {
        self.sandbox_origin = Some(origin.into());
        self
    }

    /// With accepted sender origin
    #[inline]
    #[must_use]
    pub fn with_trusted_origin(mut self, origin: TrustedOrigin) -> Self {
        self.trusted_origin = origin;
        self
    }

    /// With outbound target origin
    #[inline]
    #[must_use]
    pub fn with_target_origin(mut self, origin: TrustedOrigin) -> Self {
        self.target_origin = origin;
        self
    }

    /// With toggle delivery policy
    #[inline]
    #[must_use]
    pub fn with_toggle_delivery(mut self, delivery: ToggleDelivery) -> Self {
        self.toggle_delivery = delivery;
        self
    }

    /// With initial host inspector flag
    #[inline]
    #[must_use]
    pub fn with_initial_inspector(mut self, enabled: bool) -> Self {
        self.initial_inspector = enabled;
        self
    }

    /// With excerpt limit
    #[inline]
    #[must_use]
    pub fn with_excerpt_limit(mut self, limit: usize) -> Self {
        self.excerpt_limit = limit;
        self
    }

    /// Effective origin of the sandboxed document
    #[must_use]
    pub fn sandbox_origin(&self) -> &str {
        self.sandbox_origin.as_deref().unwrap_or(&self.host_origin)
    }

    /// Target for host to sandbox posts
    #[must_use]
    pub fn command_target(&self) -> TrustedOrigin {
        Self::narrowed(&self.target_origin, self.sandbox_origin())
    }

    /// Configuration handed to each new sandbox
    ///
    /// The sandbox sees the channel from the other end: it accepts and
    /// addresses the host origin.
    #[must_use]
    pub fn sandbox_config(&self) -> SandboxConfig {
        SandboxConfig::new()
            .with_origin(self.sandbox_origin())
            .with_accepted_origin(Self::narrowed(&self.trusted_origin, &self.host_origin))
            .with_target_origin(Self::narrowed(&self.target_origin, &self.host_origin))
            .with_excerpt_limit(self.excerpt_limit)
    }

    /// `*` stays `*`; anything exact becomes exactly `origin`
    fn narrowed(policy: &TrustedOrigin, origin: &str) -> TrustedOrigin {
        if policy.is_any() {
            TrustedOrigin::Any
        } else {
            TrustedOrigin::exact(origin)
        }
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// [`ConfigError::Parse`] for bad TOML, [`ConfigError::Invalid`] for
    /// values that parse but cannot work.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Read`] if the file cannot be read, otherwise as
    /// [`HostConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), "loaded host configuration");
        Ok(config)
    }

    /// Check values that serde cannot
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host_origin.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "host_origin",
                reason: "must not be empty".to_string(),
            });
        }
        if self.sandbox_origin.as_deref().is_some_and(|o| o.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "sandbox_origin",
                reason: "must not be empty when set".to_string(),
            });
        }
        if self.excerpt_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "excerpt_limit",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
