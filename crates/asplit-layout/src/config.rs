#![forbid(unsafe_code)]

//! Container-level configuration.
//!
//! [`SplitConfig`] captures every option a split container recognizes. All
//! fields have defaults, and invalid numbers never error: they fall back to
//! the documented default when the config is [sanitized](SplitConfig::sanitized).
//!
//! # Loading
//!
//! With the `config` feature enabled a config can be read from TOML or JSON:
//!
//! ```toml
//! direction = "vertical"
//! unit = "pixel"
//! gutter_size = 8
//! wildcard_policy = "last"
//! ```
//!
//! ```rust,ignore
//! let cfg = SplitConfig::from_toml_file("split.toml")?;
//! ```

#[cfg(feature = "config")]
use std::path::Path;
use std::time::Duration;

use asplit_core::geometry::{Direction, WritingDirection};
use serde::{Deserialize, Serialize};

#[cfg(feature = "config")]
use crate::error::ConfigError;

/// Default gutter thickness in pixels.
pub const DEFAULT_GUTTER_SIZE: f64 = 11.0;
/// Default drag quantization in pixels.
pub const DEFAULT_GUTTER_STEP: f64 = 1.0;
/// Default quiet window before `layoutSettled` fires.
pub const DEFAULT_SETTLE_WINDOW_MS: u64 = 20;
/// Tolerance used when checking that percent sizes sum to 100.
pub const PERCENT_SUM_TOLERANCE: f64 = 0.1;

/// Unit in which area sizes are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeUnit {
    /// Share of the usable container extent; displayed sizes sum to 100.
    #[default]
    Percent,
    /// Absolute pixels, with one wildcard area absorbing the rest.
    Pixel,
}

impl SizeUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percent => "percent",
            Self::Pixel => "pixel",
        }
    }
}

/// Which area keeps (or receives) the wildcard marker when the pixel-unit
/// configuration does not name exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildcardPolicy {
    /// First displayed candidate in layout order.
    #[default]
    First,
    /// Last displayed candidate in layout order.
    Last,
}

impl WildcardPolicy {
    /// Pick one index out of `candidates` (already in layout order).
    pub(crate) fn pick(self, candidates: &[usize]) -> Option<usize> {
        match self {
            Self::First => candidates.first().copied(),
            Self::Last => candidates.last().copied(),
        }
    }
}

/// Options recognized by a split container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub direction: Direction,
    pub unit: SizeUnit,
    /// Gutter thickness in pixels (>= 0).
    pub gutter_size: f64,
    /// Drag offsets snap to multiples of this many pixels (>= 1).
    pub gutter_step: f64,
    /// Rendering hint; also enables the `layoutSettled` pathway.
    pub use_transition: bool,
    /// Gutters cannot be dragged (clicks are still reported).
    pub disabled: bool,
    pub writing_direction: WritingDirection,
    pub wildcard_policy: WildcardPolicy,
    /// Quiet window for coalescing transition completions.
    pub settle_window_ms: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            direction: Direction::Horizontal,
            unit: SizeUnit::Percent,
            gutter_size: DEFAULT_GUTTER_SIZE,
            gutter_step: DEFAULT_GUTTER_STEP,
            use_transition: false,
            disabled: false,
            writing_direction: WritingDirection::Ltr,
            wildcard_policy: WildcardPolicy::First,
            settle_window_ms: DEFAULT_SETTLE_WINDOW_MS,
        }
    }
}

impl SplitConfig {
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn unit(mut self, unit: SizeUnit) -> Self {
        self.unit = unit;
        self
    }

    #[must_use]
    pub fn gutter_size(mut self, px: f64) -> Self {
        self.gutter_size = px;
        self
    }

    #[must_use]
    pub fn gutter_step(mut self, px: f64) -> Self {
        self.gutter_step = px;
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn use_transition(mut self, enabled: bool) -> Self {
        self.use_transition = enabled;
        self
    }

    #[must_use]
    pub fn writing_direction(mut self, dir: WritingDirection) -> Self {
        self.writing_direction = dir;
        self
    }

    #[must_use]
    pub fn wildcard_policy(mut self, policy: WildcardPolicy) -> Self {
        self.wildcard_policy = policy;
        self
    }

    /// Replace invalid numbers with their defaults.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let gutter_size = if self.gutter_size.is_finite() && self.gutter_size >= 0.0 {
            self.gutter_size
        } else {
            DEFAULT_GUTTER_SIZE
        };
        let gutter_step = if self.gutter_step.is_finite() && self.gutter_step >= 1.0 {
            self.gutter_step
        } else {
            DEFAULT_GUTTER_STEP
        };
        Self {
            gutter_size,
            gutter_step,
            ..self
        }
    }

    /// Quiet window as a [`Duration`].
    #[must_use]
    pub const fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_window_ms)
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s)?;
        Ok(cfg.sanitized())
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(s)?;
        Ok(cfg.sanitized())
    }
}
