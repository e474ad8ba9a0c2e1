#![forbid(unsafe_code)]

//! Area registry: the single indexed store of areas plus the ordered
//! displayed list and the unordered hidden list.
//!
//! # Invariants
//!
//! 1. Every stored area is in exactly one of `displayed` / `hidden`.
//! 2. `displayed` order is layout order; `hidden` order carries no meaning.
//! 3. Hidden areas have `order == 0` and `size == 0`.
//!
//! Every mutation reports the [`Rebuild`] it requires. The owning container
//! applies the mutation and then runs a single rebuild, so a batch of config
//! changes never produces a storm of partial rebuilds.

use std::ops::{BitOr, BitOrAssign};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::area::{Area, AreaConfig, AreaId};

/// Which parts of the layout a mutation invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rebuild {
    pub reset_orders: bool,
    pub reset_sizes: bool,
}

impl Rebuild {
    /// Nothing to recompute.
    pub const NONE: Self = Self {
        reset_orders: false,
        reset_sizes: false,
    };
    /// Recompute orders and sizes.
    pub const FULL: Self = Self {
        reset_orders: true,
        reset_sizes: true,
    };
    /// Recompute sizes only.
    pub const SIZES: Self = Self {
        reset_orders: false,
        reset_sizes: true,
    };
    /// Recompute orders only.
    pub const ORDERS: Self = Self {
        reset_orders: true,
        reset_sizes: false,
    };

    #[must_use]
    pub const fn is_needed(self) -> bool {
        self.reset_orders || self.reset_sizes
    }
}

impl BitOr for Rebuild {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            reset_orders: self.reset_orders || rhs.reset_orders,
            reset_sizes: self.reset_sizes || rhs.reset_sizes,
        }
    }
}

impl BitOrAssign for Rebuild {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

/// Owns every area of one container.
#[derive(Debug, Clone)]
pub struct AreaRegistry {
    areas: FxHashMap<AreaId, Area>,
    displayed: Vec<AreaId>,
    hidden: Vec<AreaId>,
    next_id: AreaId,
}

impl Default for AreaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AreaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            areas: FxHashMap::default(),
            displayed: Vec::new(),
            hidden: Vec::new(),
            next_id: AreaId::MIN,
        }
    }

    /// Register a new area. Visible areas join the end of the displayed list.
    pub fn add_area(&mut self, config: AreaConfig) -> (AreaId, Rebuild) {
        let id = self.next_id;
        self.next_id = id.next();
        let config = config.sanitized();
        let visible = config.visible;
        self.areas.insert(id, Area::new(id, config));

        if visible {
            self.displayed.push(id);
            debug!(area = id.get(), "area added (displayed)");
            (id, Rebuild::FULL)
        } else {
            self.hidden.push(id);
            debug!(area = id.get(), "area added (hidden)");
            (id, Rebuild::NONE)
        }
    }

    /// Remove an area. Returns `None` for unknown ids.
    pub fn remove_area(&mut self, id: AreaId) -> Option<Rebuild> {
        self.areas.remove(&id)?;
        if let Some(pos) = self.displayed.iter().position(|a| *a == id) {
            self.displayed.remove(pos);
            debug!(area = id.get(), "displayed area removed");
            Some(Rebuild::FULL)
        } else {
            self.hidden.retain(|a| *a != id);
            debug!(area = id.get(), "hidden area removed");
            Some(Rebuild::NONE)
        }
    }

    /// Replace an area's configuration atomically.
    ///
    /// A visibility flip is handled as show/hide. Otherwise a displayed area
    /// requests re-ordering when its `order` changed and re-sizing when any
    /// of its size fields changed; hidden areas just store the new values.
    pub fn update_area(&mut self, id: AreaId, config: AreaConfig) -> Option<Rebuild> {
        let config = config.sanitized();
        let area = self.areas.get_mut(&id)?;
        let previous = std::mem::replace(&mut area.config, config.clone());

        if previous.visible != config.visible {
            return if config.visible {
                self.show_area(id)
            } else {
                self.hide_area(id)
            };
        }
        if !config.visible {
            return Some(Rebuild::NONE);
        }
        Some(Rebuild {
            reset_orders: previous.order_changed(&config),
            reset_sizes: previous.sizing_changed(&config),
        })
    }

    /// Move a hidden area to the end of the displayed list.
    pub fn show_area(&mut self, id: AreaId) -> Option<Rebuild> {
        let area = self.areas.get_mut(&id)?;
        area.config.visible = true;
        let Some(pos) = self.hidden.iter().position(|a| *a == id) else {
            return Some(Rebuild::NONE);
        };
        self.hidden.swap_remove(pos);
        self.displayed.push(id);
        debug!(area = id.get(), "area shown");
        Some(Rebuild::FULL)
    }

    /// Move a displayed area to the hidden list, zeroing its order and size.
    pub fn hide_area(&mut self, id: AreaId) -> Option<Rebuild> {
        let area = self.areas.get_mut(&id)?;
        area.config.visible = false;
        let Some(pos) = self.displayed.iter().position(|a| *a == id) else {
            return Some(Rebuild::NONE);
        };
        self.displayed.remove(pos);
        area.reset_layout();
        self.hidden.push(id);
        debug!(area = id.get(), "area hidden");
        Some(Rebuild::FULL)
    }

    #[must_use]
    pub fn get(&self, id: AreaId) -> Option<&Area> {
        self.areas.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: AreaId) -> Option<&mut Area> {
        self.areas.get_mut(&id)
    }

    /// Displayed area ids in layout order.
    #[must_use]
    pub fn displayed(&self) -> &[AreaId] {
        &self.displayed
    }

    pub(crate) fn displayed_mut(&mut self) -> &mut Vec<AreaId> {
        &mut self.displayed
    }

    /// Hidden area ids (unordered).
    #[must_use]
    pub fn hidden(&self) -> &[AreaId] {
        &self.hidden
    }

    /// Displayed areas in layout order.
    pub fn displayed_areas(&self) -> impl Iterator<Item = &Area> + '_ {
        self.displayed.iter().filter_map(|id| self.areas.get(id))
    }

    /// Number of gutters between displayed areas.
    #[must_use]
    pub fn gutter_count(&self) -> usize {
        self.displayed.len().saturating_sub(1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Check the structural invariants listed in the module docs.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let total = self.displayed.len() + self.hidden.len();
        if total != self.areas.len() {
            return false;
        }
        let disjoint = self.displayed.iter().all(|id| !self.hidden.contains(id));
        let known = self
            .displayed
            .iter()
            .chain(&self.hidden)
            .all(|id| self.areas.contains_key(id));
        let hidden_zeroed = self.hidden.iter().filter_map(|id| self.areas.get(id)).all(|a| {
            a.order == 0 && a.size == crate::area::AreaSize::Fixed(0.0)
        });
        disjoint && known && hidden_zeroed
    }
}
