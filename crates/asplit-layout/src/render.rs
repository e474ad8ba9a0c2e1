#![forbid(unsafe_code)]

//! Rendering collaborator contract.
//!
//! The solver never touches a DOM or a terminal. It tells a
//! [`SplitRenderer`] which order and flex value each area should get, and it
//! asks the renderer how large the container is along the layout axis.
//!
//! [`HeadlessRenderer`] records every call and reports a fixed container
//! extent. Hosts without a real surface (tests, server-side layout) can use
//! it directly.

use std::fmt;

use asplit_core::geometry::Direction;
use rustc_hash::FxHashMap;

use crate::area::AreaId;

/// Flex shorthand applied to one area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlexBasis {
    /// Sole displayed area: `0 0 100%`.
    Full,
    /// Percent unit: `0 0 calc(P% - P/100 * G px)` where `G` is the total
    /// gutter footprint.
    Percent { percent: f64, gutter_total: f64 },
    /// Pixel unit, fixed area: `0 0 Npx`.
    Pixel(f64),
    /// Pixel unit, wildcard area: `1 1 auto`.
    Auto,
}

impl fmt::Display for FlexBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Full => f.write_str("0 0 100%"),
            Self::Percent {
                percent,
                gutter_total,
            } => write!(
                f,
                "0 0 calc( {percent}% - {}px )",
                percent / 100.0 * gutter_total
            ),
            Self::Pixel(px) => write!(f, "0 0 {px}px"),
            Self::Auto => f.write_str("1 1 auto"),
        }
    }
}

/// Surface that applies computed layout and measures the container.
pub trait SplitRenderer {
    /// Set the CSS `order` (or equivalent) of an area.
    fn set_area_order(&mut self, area: AreaId, order: u32);

    /// Set the flex shorthand of an area.
    fn set_area_flex(&mut self, area: AreaId, flex: FlexBasis);

    /// Set the container's direction class.
    fn set_direction(&mut self, direction: Direction);

    /// Container extent in pixels along `direction`, gutters included.
    fn container_extent(&self, direction: Direction) -> f64;

    /// A drag started or stopped on the container.
    fn set_dragging(&mut self, _dragging: bool) {}

    /// Gutter `gutter` (1-based) is or is no longer the dragged one.
    fn set_gutter_dragged(&mut self, _gutter: usize, _dragged: bool) {}

    /// Layout changed; the host should repaint at its own cadence.
    fn mark_dirty(&mut self) {}
}

/// Renderer with no surface: stores styles, reports a fixed extent.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    extent: f64,
    direction: Direction,
    orders: FxHashMap<AreaId, u32>,
    flex: FxHashMap<AreaId, FlexBasis>,
    dragging: bool,
    dragged_gutter: Option<usize>,
    dirty_count: u64,
}

impl HeadlessRenderer {
    /// Container of `extent` pixels along whichever axis is active.
    #[must_use]
    pub fn new(extent: f64) -> Self {
        Self {
            extent,
            ..Self::default()
        }
    }

    /// Change the reported container extent (simulates a resize).
    pub fn set_extent(&mut self, extent: f64) {
        self.extent = extent;
    }

    #[must_use]
    pub fn order_of(&self, area: AreaId) -> Option<u32> {
        self.orders.get(&area).copied()
    }

    #[must_use]
    pub fn flex_of(&self, area: AreaId) -> Option<FlexBasis> {
        self.flex.get(&area).copied()
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.dragging
    }

    #[must_use]
    pub const fn dragged_gutter(&self) -> Option<usize> {
        self.dragged_gutter
    }

    /// How many times the layout was marked dirty.
    #[must_use]
    pub const fn dirty_count(&self) -> u64 {
        self.dirty_count
    }
}

impl SplitRenderer for HeadlessRenderer {
    fn set_area_order(&mut self, area: AreaId, order: u32) {
        self.orders.insert(area, order);
    }

    fn set_area_flex(&mut self, area: AreaId, flex: FlexBasis) {
        self.flex.insert(area, flex);
    }

    fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    fn container_extent(&self, _direction: Direction) -> f64 {
        self.extent
    }

    fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    fn set_gutter_dragged(&mut self, gutter: usize, dragged: bool) {
        self.dragged_gutter = dragged.then_some(gutter);
    }

    fn mark_dirty(&mut self) {
        self.dirty_count += 1;
    }
}
