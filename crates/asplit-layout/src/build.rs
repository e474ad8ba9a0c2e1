#![forbid(unsafe_code)]

//! Layout builder: recomputes order and size of every displayed area.
//!
//! # Orders
//!
//! When *every* displayed area carries an explicit `order`, areas are sorted
//! by it (stable, so ties keep their current relative order). Then each area
//! gets `index * 2`; odd values are left for the gutters between them.
//!
//! # Sizes
//!
//! - **Percent**: explicit sizes are used only when every area has one and
//!   they sum to 100 (±[`PERCENT_SUM_TOLERANCE`]). Otherwise every area gets
//!   `100 / n`.
//! - **Pixel**: explicit sizes are used when exactly one area is the
//!   wildcard. Otherwise the container's [`WildcardPolicy`] picks which area
//!   is (or becomes) the wildcard; extra wildcards are fixed to an equal
//!   share of the space left by the fixed areas.
//!
//! In both units a configured bound that would make the assigned size
//! infeasible is widened to the size, so a user-given size is never
//! overridden by its own bounds.

use tracing::debug;

use crate::area::{AreaConfig, AreaSize};
use crate::config::{PERCENT_SUM_TOLERANCE, SizeUnit, SplitConfig, WildcardPolicy};
use crate::registry::{AreaRegistry, Rebuild};
use crate::render::{FlexBasis, SplitRenderer};

/// Whether a full set of user sizes can be used as-is for `unit`.
///
/// `None` entries are wildcards (pixel) or missing values (percent).
#[must_use]
pub fn user_sizes_valid(unit: SizeUnit, sizes: &[Option<f64>]) -> bool {
    match unit {
        SizeUnit::Percent => {
            if sizes.is_empty() || sizes.iter().any(Option::is_none) {
                return false;
            }
            let total: f64 = sizes.iter().flatten().sum();
            (total - 100.0).abs() < PERCENT_SUM_TOLERANCE
        }
        SizeUnit::Pixel => sizes.iter().filter(|s| s.is_none()).count() == 1,
    }
}

/// Recomputes layout for one container configuration.
#[derive(Debug, Clone, Copy)]
pub struct LayoutBuilder<'a> {
    config: &'a SplitConfig,
}

impl<'a> LayoutBuilder<'a> {
    #[must_use]
    pub const fn new(config: &'a SplitConfig) -> Self {
        Self { config }
    }

    /// Recompute what `rebuild` asks for, then push styles to `renderer`.
    ///
    /// `usable_px` is the container extent minus every gutter; pixel-unit
    /// tie-breaks use it to size demoted wildcards.
    pub fn build<R: SplitRenderer + ?Sized>(
        &self,
        registry: &mut AreaRegistry,
        renderer: &mut R,
        rebuild: Rebuild,
        usable_px: f64,
    ) {
        debug!(
            reset_orders = rebuild.reset_orders,
            reset_sizes = rebuild.reset_sizes,
            unit = self.config.unit.as_str(),
            displayed = registry.displayed().len(),
            "rebuild"
        );

        if rebuild.reset_orders {
            self.reset_orders(registry, renderer);
        }
        if rebuild.reset_sizes {
            match self.config.unit {
                SizeUnit::Percent => Self::reset_percent_sizes(registry),
                SizeUnit::Pixel => self.reset_pixel_sizes(registry, usable_px),
            }
        }
        self.refresh_styles(registry, renderer);
        renderer.mark_dirty();
    }

    fn reset_orders<R: SplitRenderer + ?Sized>(
        &self,
        registry: &mut AreaRegistry,
        renderer: &mut R,
    ) {
        let user_orders: Option<Vec<u32>> = registry
            .displayed()
            .iter()
            .map(|id| registry.get(*id).and_then(|a| a.config.order))
            .collect();

        if let Some(orders) = user_orders {
            let mut keyed: Vec<_> = registry.displayed().iter().copied().zip(orders).collect();
            keyed.sort_by_key(|(_, order)| *order);
            *registry.displayed_mut() = keyed.into_iter().map(|(id, _)| id).collect();
        }

        let displayed = registry.displayed().to_vec();
        for (i, id) in displayed.into_iter().enumerate() {
            let order = (i * 2) as u32;
            if let Some(area) = registry.get_mut(id) {
                area.order = order;
            }
            renderer.set_area_order(id, order);
        }
    }

    fn reset_percent_sizes(registry: &mut AreaRegistry) {
        let configs = displayed_configs(registry);
        let sizes: Vec<Option<f64>> = configs.iter().map(|c| c.size).collect();
        let use_user = user_sizes_valid(SizeUnit::Percent, &sizes);
        let share = 100.0 / configs.len().max(1) as f64;
        let mut assigned: Vec<f64> = sizes
            .iter()
            .map(|s| match (use_user, s) {
                (true, Some(v)) => *v,
                _ => share,
            })
            .collect();
        if use_user {
            snap_percent_total(&mut assigned);
        }

        let displayed = registry.displayed().to_vec();
        for ((id, cfg), size) in displayed.into_iter().zip(configs).zip(assigned) {
            if let Some(area) = registry.get_mut(id) {
                area.size = AreaSize::Fixed(size);
                area.min_size = widen_min(cfg.min_size, Some(size));
                area.max_size = widen_max(cfg.max_size, Some(size));
            }
        }
    }

    fn reset_pixel_sizes(&self, registry: &mut AreaRegistry, usable_px: f64) {
        let configs = displayed_configs(registry);
        let sizes: Vec<Option<f64>> = configs.iter().map(|c| c.size).collect();
        let resolved = if user_sizes_valid(SizeUnit::Pixel, &sizes) {
            sizes.iter().map(|s| AreaSize::from_option(*s)).collect()
        } else {
            resolve_wildcards(&sizes, self.config.wildcard_policy, usable_px)
        };

        let displayed = registry.displayed().to_vec();
        for ((id, cfg), size) in displayed.into_iter().zip(configs).zip(resolved) {
            if let Some(area) = registry.get_mut(id) {
                area.size = size;
                area.min_size = widen_min(cfg.min_size, size.fixed());
                area.max_size = widen_max(cfg.max_size, size.fixed());
            }
        }
    }

    /// Push the flex value of every displayed area.
    pub fn refresh_styles<R: SplitRenderer + ?Sized>(
        &self,
        registry: &AreaRegistry,
        renderer: &mut R,
    ) {
        let count = registry.displayed().len();
        let gutter_total = registry.gutter_count() as f64 * self.config.gutter_size;

        for area in registry.displayed_areas() {
            let flex = if count == 1 {
                FlexBasis::Full
            } else {
                match (self.config.unit, area.size) {
                    (SizeUnit::Percent, size) => FlexBasis::Percent {
                        percent: size.fixed().unwrap_or(0.0),
                        gutter_total,
                    },
                    (SizeUnit::Pixel, AreaSize::Fixed(px)) => FlexBasis::Pixel(px),
                    (SizeUnit::Pixel, AreaSize::Wildcard) => FlexBasis::Auto,
                }
            };
            renderer.set_area_flex(area.id, flex);
        }
    }
}

/// Pixel extent of every displayed area, in layout order.
///
/// Percent areas take their share of `usable_px`; in pixel unit wildcard
/// areas split whatever the fixed areas leave (never below zero).
#[must_use]
pub fn pixel_extents(registry: &AreaRegistry, unit: SizeUnit, usable_px: f64) -> Vec<f64> {
    let sizes: Vec<AreaSize> = registry.displayed_areas().map(|a| a.size).collect();
    match unit {
        SizeUnit::Percent => sizes
            .iter()
            .map(|s| s.fixed().unwrap_or(0.0) / 100.0 * usable_px)
            .collect(),
        SizeUnit::Pixel => {
            let fixed: f64 = sizes.iter().filter_map(|s| s.fixed()).sum();
            let wildcards = sizes.iter().filter(|s| s.is_wildcard()).count().max(1);
            let each = (usable_px - fixed).max(0.0) / wildcards as f64;
            sizes.iter().map(|s| s.fixed().unwrap_or(each)).collect()
        }
    }
}

fn displayed_configs(registry: &AreaRegistry) -> Vec<AreaConfig> {
    registry.displayed_areas().map(|a| a.config.clone()).collect()
}

/// Pick exactly one wildcard when the configuration names zero or several.
fn resolve_wildcards(sizes: &[Option<f64>], policy: WildcardPolicy, usable_px: f64) -> Vec<AreaSize> {
    let candidates: Vec<usize> = (0..sizes.len()).filter(|i| sizes[*i].is_none()).collect();
    let all: Vec<usize> = (0..sizes.len()).collect();
    let pool = if candidates.is_empty() { &all } else { &candidates };
    let Some(chosen) = policy.pick(pool) else {
        return Vec::new();
    };

    let fixed_total: f64 = sizes
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != chosen)
        .filter_map(|(_, s)| *s)
        .sum();
    let share = (usable_px - fixed_total).max(0.0) / candidates.len().max(1) as f64;

    debug!(
        wildcards = candidates.len(),
        chosen,
        ?policy,
        "pixel unit wildcard tie-break"
    );

    sizes
        .iter()
        .enumerate()
        .map(|(i, s)| match s {
            _ if i == chosen => AreaSize::Wildcard,
            Some(v) => AreaSize::Fixed(*v),
            None => AreaSize::Fixed(share),
        })
        .collect()
}

/// Move the tolerated drift from 100 onto the largest area.
fn snap_percent_total(sizes: &mut [f64]) {
    let Some(largest) = sizes
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1).then(b.0.cmp(&a.0)))
        .map(|(i, _)| i)
    else {
        return;
    };
    let others: f64 = sizes
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != largest)
        .map(|(_, s)| s)
        .sum();
    sizes[largest] = 100.0 - others;
}

/// Effective minimum: never above the assigned size.
fn widen_min(min: Option<f64>, size: Option<f64>) -> Option<f64> {
    match (min, size) {
        (Some(m), Some(s)) if m > s => Some(s),
        (m, _) => m,
    }
}

/// Effective maximum: never below the assigned size.
fn widen_max(max: Option<f64>, size: Option<f64>) -> Option<f64> {
    match (max, size) {
        (Some(m), Some(s)) if m < s => Some(s),
        (m, _) => m,
    }
}
