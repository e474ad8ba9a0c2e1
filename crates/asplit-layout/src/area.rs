#![forbid(unsafe_code)]

//! Area identity, per-area configuration, and live sizing state.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stable identifier for an area within one split container.
///
/// Identifiers are allocated by the registry, start at 1, and are never
/// reused for the lifetime of the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaId(u64);

impl AreaId {
    /// Lowest identifier handed out.
    pub const MIN: Self = Self(1);

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "area#{}", self.0)
    }
}

/// Size of an area in the container's active unit.
///
/// `Wildcard` is only meaningful in pixel unit, where it marks the single
/// area that fills whatever the fixed areas leave over. It serializes as
/// `"*"`; `null` also deserializes to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaSize {
    Fixed(f64),
    Wildcard,
}

impl AreaSize {
    /// Fixed value, or `None` for the wildcard.
    #[must_use]
    pub const fn fixed(self) -> Option<f64> {
        match self {
            Self::Fixed(v) => Some(v),
            Self::Wildcard => None,
        }
    }

    #[must_use]
    pub const fn is_wildcard(self) -> bool {
        matches!(self, Self::Wildcard)
    }

    /// Map a user-facing optional size; `None` is the wildcard.
    #[must_use]
    pub const fn from_option(size: Option<f64>) -> Self {
        match size {
            Some(v) => Self::Fixed(v),
            None => Self::Wildcard,
        }
    }
}

impl Default for AreaSize {
    fn default() -> Self {
        Self::Fixed(0.0)
    }
}

impl fmt::Display for AreaSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(v) => write!(f, "{v}"),
            Self::Wildcard => f.write_str("*"),
        }
    }
}

impl Serialize for AreaSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Fixed(v) => serializer.serialize_f64(*v),
            Self::Wildcard => serializer.serialize_str("*"),
        }
    }
}

impl<'de> Deserialize<'de> for AreaSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AreaSizeVisitor;

        impl<'de> Visitor<'de> for AreaSizeVisitor {
            type Value = AreaSize;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number, \"*\", or null")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<AreaSize, E> {
                Ok(AreaSize::Fixed(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<AreaSize, E> {
                Ok(AreaSize::Fixed(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<AreaSize, E> {
                Ok(AreaSize::Fixed(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<AreaSize, E> {
                if v == "*" {
                    Ok(AreaSize::Wildcard)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }

            fn visit_unit<E: de::Error>(self) -> Result<AreaSize, E> {
                Ok(AreaSize::Wildcard)
            }

            fn visit_none<E: de::Error>(self) -> Result<AreaSize, E> {
                Ok(AreaSize::Wildcard)
            }
        }

        deserializer.deserialize_any(AreaSizeVisitor)
    }
}

/// User-supplied configuration for one area.
///
/// Numbers that are NaN or negative are treated as unset (see
/// [`AreaConfig::sanitized`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaConfig {
    /// Explicit position among displayed areas. Only honored when every
    /// displayed area has one.
    pub order: Option<u32>,
    /// Size in the active unit. `None` means "not given" in percent unit and
    /// "wildcard" in pixel unit.
    pub size: Option<f64>,
    pub min_size: Option<f64>,
    pub max_size: Option<f64>,
    pub visible: bool,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            order: None,
            size: None,
            min_size: None,
            max_size: None,
            visible: true,
        }
    }
}

impl AreaConfig {
    #[must_use]
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    #[must_use]
    pub fn with_min_size(mut self, min: f64) -> Self {
        self.min_size = Some(min);
        self
    }

    #[must_use]
    pub fn with_max_size(mut self, max: f64) -> Self {
        self.max_size = Some(max);
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Drop numeric values that cannot be sizes.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            size: self.size.and_then(non_negative),
            min_size: self.min_size.and_then(non_negative),
            max_size: self.max_size.and_then(non_negative),
            ..self
        }
    }

    /// Whether switching from `self` to `next` requires re-ordering.
    pub(crate) fn order_changed(&self, next: &Self) -> bool {
        self.order != next.order
    }

    /// Whether switching from `self` to `next` requires re-sizing.
    pub(crate) fn sizing_changed(&self, next: &Self) -> bool {
        self.size != next.size || self.min_size != next.min_size || self.max_size != next.max_size
    }
}

/// Accept finite, non-negative numbers only.
pub(crate) fn non_negative(v: f64) -> Option<f64> {
    (v.is_finite() && v >= 0.0).then_some(v)
}

/// Live state of one area, owned by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub(crate) id: AreaId,
    pub(crate) config: AreaConfig,
    pub(crate) order: u32,
    pub(crate) size: AreaSize,
    pub(crate) min_size: Option<f64>,
    pub(crate) max_size: Option<f64>,
}

impl Area {
    pub(crate) fn new(id: AreaId, config: AreaConfig) -> Self {
        Self {
            id,
            config,
            order: 0,
            size: AreaSize::Fixed(0.0),
            min_size: None,
            max_size: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> AreaId {
        self.id
    }

    /// Configuration as last supplied by the host.
    #[must_use]
    pub const fn config(&self) -> &AreaConfig {
        &self.config
    }

    /// Layout order: `0, 2, 4, …` for displayed areas, `0` when hidden.
    #[must_use]
    pub const fn order(&self) -> u32 {
        self.order
    }

    /// Current size in the container's unit.
    #[must_use]
    pub const fn size(&self) -> AreaSize {
        self.size
    }

    /// Effective lower bound (may be widened to admit the assigned size).
    #[must_use]
    pub const fn min_size(&self) -> Option<f64> {
        self.min_size
    }

    /// Effective upper bound (may be widened to admit the assigned size).
    #[must_use]
    pub const fn max_size(&self) -> Option<f64> {
        self.max_size
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.config.visible
    }

    pub(crate) fn reset_layout(&mut self) {
        self.order = 0;
        self.size = AreaSize::Fixed(0.0);
    }
}
