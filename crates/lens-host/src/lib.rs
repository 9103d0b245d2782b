//! Lens Host - the controlling side of the sandboxed preview
//!
//! Provides:
//! - Document lifecycle: load, refresh, teardown of stale generations
//! - The host half of the inspector state machine and its delivery policy
//! - Viewport, fullscreen and source-view presentation state
//! - Forwarding of inspected elements to an [`InspectionSink`]
//!
//! # Example
//!
//! ```rust,no_run
//! use lens_host::{HostConfig, HostController};
//! use lens_protocol::InspectedElement;
//!
//! # async fn demo() {
//! let mut host = HostController::new(HostConfig::default(), Vec::<InspectedElement>::new());
//! host.load_content("<section id=\"hero\">Hi</section>");
//! host.wait_ready().await;
//! host.set_inspector_enabled(true);
//! # }
//! ```
//!
//! [`InspectionSink`]: lens_protocol::InspectionSink

#![warn(unreachable_pub)]

pub mod config;
pub mod controller;
pub mod error;
pub mod viewport;

pub use config::{HostConfig, ToggleDelivery};
pub use controller::{Delivery, FrameChrome, FrameStatus, HostController, HostEvent, IgnoreReason};
pub use error::{ConfigError, HostError};
pub use viewport::{FrameWidth, ParseViewportError, ViewportMode};
