//! Viewport presentation modes
//!
//! Purely host-side: the sandbox never learns which mode is active.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width the preview container is rendered at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameWidth {
    /// All available width
    Full,
    /// Fixed pixel width
    Fixed(u32),
}

impl fmt::Display for FrameWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("100%"),
            Self::Fixed(px) => write!(f, "{px}px"),
        }
    }
}

/// Preview viewport mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportMode {
    /// Full width
    #[default]
    Desktop,
    /// 768px
    Tablet,
    /// 375px
    Mobile,
}

impl ViewportMode {
    /// All modes in toolbar order
    pub const ALL: [ViewportMode; 3] = [Self::Desktop, Self::Tablet, Self::Mobile];

    /// Rendered container width
    #[inline]
    #[must_use]
    pub const fn width(self) -> FrameWidth {
        match self {
            Self::Desktop => FrameWidth::Full,
            Self::Tablet => FrameWidth::Fixed(768),
            Self::Mobile => FrameWidth::Fixed(375),
        }
    }

    /// Size label shown under the preview
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Desktop => "Full Width",
            Self::Tablet => "768px × Viewport",
            Self::Mobile => "375px × Viewport",
        }
    }

    /// Whether the preview is drawn inside a device bezel
    #[inline]
    #[must_use]
    pub const fn has_device_frame(self) -> bool {
        !matches!(self, Self::Desktop)
    }

    /// Lowercase mode name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Tablet => "tablet",
            Self::Mobile => "mobile",
        }
    }
}

impl fmt::Display for ViewportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised viewport mode name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown viewport mode `{0}` (expected desktop, tablet or mobile)")]
pub struct ParseViewportError(String);

impl FromStr for ViewportMode {
    type Err = ParseViewportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseViewportError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_match_presentation_table() {
        assert_eq!(ViewportMode::Desktop.width(), FrameWidth::Full);
        assert_eq!(ViewportMode::Tablet.width(), FrameWidth::Fixed(768));
        assert_eq!(ViewportMode::Mobile.width(), FrameWidth::Fixed(375));
        assert_eq!(ViewportMode::Mobile.width().to_string(), "375px");
    }

    #[test]
    fn labels_and_frames() {
        assert_eq!(ViewportMode::Desktop.label(), "Full Width");
        assert_eq!(ViewportMode::Tablet.label(), "768px × Viewport");
        assert!(!ViewportMode::Desktop.has_device_frame());
        assert!(ViewportMode::Mobile.has_device_frame());
    }

    #[test]
    fn parses_names() {
        assert_eq!("Tablet".parse(), Ok(ViewportMode::Tablet));
        assert_eq!(" mobile ".parse(), Ok(ViewportMode::Mobile));
        assert!("watch".parse::<ViewportMode>().is_err());
        for mode in ViewportMode::ALL {
            assert_eq!(mode.to_string().parse(), Ok(mode));
        }
    }
}
