#![forbid(unsafe_code)]

//! Absorption: how much of a pixel delta each area on one side of a gutter
//! can take on (positive) or give up (negative) without crossing its bounds.
//!
//! The walk is side-greedy: areas are consulted in the given order (nearest
//! to the gutter first), each one absorbs as much as it can, and whatever is
//! left moves on to the next area. The result is deterministic for a given
//! input order; it is not a fair-share distribution.
//!
//! Every computation is relative to the drag snapshot, never to the previous
//! tick, so rounding cannot accumulate across ticks.

use crate::area::AreaId;
use crate::config::SizeUnit;

/// Frozen state of one area at drag start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaSnapshot {
    pub id: AreaId,
    /// Pixel extent at drag start.
    pub pixel_at_start: f64,
    /// Percent size at drag start (percent unit only).
    pub percent_at_start: f64,
    /// Effective bounds, in the active unit.
    pub min_size: Option<f64>,
    pub max_size: Option<f64>,
    /// Pixel-unit wildcard: its size follows the others implicitly.
    pub wildcard: bool,
}

/// Where an area ended up relative to its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clamp {
    Free,
    AtMin,
    AtMax,
    /// Shrunk to nothing with no explicit minimum.
    AtZero,
}

/// Result for one area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Absorption {
    pub id: AreaId,
    /// Signed pixels applied to this area.
    pub pixel_absorb: f64,
    /// Pixel extent after absorption.
    pub pixel_after: f64,
    /// Percent size after absorption (snapshot percent in pixel unit).
    pub percent_after: f64,
    pub clamp: Clamp,
    pub wildcard: bool,
}

impl Absorption {
    /// Whether this area sits exactly on one of its bounds (or at zero).
    #[must_use]
    pub const fn is_pinned(&self) -> bool {
        !matches!(self.clamp, Clamp::Free)
    }
}

/// Result for one side of a gutter.
#[derive(Debug, Clone, PartialEq)]
pub struct SideAbsorption {
    pub items: Vec<Absorption>,
    /// Portion of the requested delta no area could take (same sign as the
    /// request, or zero).
    pub remainder: f64,
}

impl SideAbsorption {
    /// Total signed pixels actually applied.
    #[must_use]
    pub fn absorbed(&self) -> f64 {
        self.items.iter().map(|a| a.pixel_absorb).sum()
    }

    #[must_use]
    pub fn has_remainder(&self) -> bool {
        self.remainder != 0.0
    }
}

/// Distribute `delta` pixels over `side`, nearest area first.
///
/// `container_px` is the usable container extent (gutters excluded); it
/// converts percent bounds to pixels.
#[must_use]
pub fn absorb(unit: SizeUnit, side: &[AreaSnapshot], delta: f64, container_px: f64) -> SideAbsorption {
    let mut remaining = delta;
    let items = side
        .iter()
        .map(|snap| {
            let item = absorb_area(unit, snap, remaining, container_px);
            remaining -= item.pixel_absorb;
            item
        })
        .collect();
    SideAbsorption {
        items,
        remainder: remaining,
    }
}

fn absorb_area(unit: SizeUnit, snap: &AreaSnapshot, pixels: f64, container_px: f64) -> Absorption {
    let start = snap.pixel_at_start;
    let unchanged = Absorption {
        id: snap.id,
        pixel_absorb: 0.0,
        pixel_after: start,
        percent_after: snap.percent_at_start,
        clamp: Clamp::Free,
        wildcard: snap.wildcard,
    };
    if pixels == 0.0 {
        return unchanged;
    }

    let to_px = |v: f64| match unit {
        SizeUnit::Percent => v / 100.0 * container_px,
        SizeUnit::Pixel => v,
    };
    let min_px = snap.min_size.map(to_px);
    let max_px = match unit {
        SizeUnit::Percent => Some(snap.max_size.map_or(container_px, |m| to_px(m).min(container_px))),
        SizeUnit::Pixel => snap.max_size,
    };

    let target = start + pixels;
    // `None` means the whole request fits.
    let (bound, clamp) = if pixels > 0.0 {
        match max_px {
            Some(hi) if target >= hi => {
                let clamp = if snap.max_size.is_some() {
                    Clamp::AtMax
                } else {
                    Clamp::Free
                };
                (Some(hi.max(start)), clamp)
            }
            _ => (None, Clamp::Free),
        }
    } else {
        let lo = min_px.unwrap_or(0.0).max(0.0);
        if target <= lo {
            let clamp = if min_px.is_some() { Clamp::AtMin } else { Clamp::AtZero };
            (Some(lo.min(start)), clamp)
        } else {
            (None, Clamp::Free)
        }
    };
    let (pixel_after, pixel_absorb) = match bound {
        Some(edge) => (edge, edge - start),
        None => (target, pixels),
    };

    let percent_after = match unit {
        SizeUnit::Pixel => snap.percent_at_start,
        SizeUnit::Percent => match (clamp, snap.min_size, snap.max_size) {
            _ if pixel_after == start => snap.percent_at_start,
            (Clamp::AtMin, Some(min), _) if pixel_after == to_px(min) => min,
            (Clamp::AtMax, _, Some(max)) if pixel_after == to_px(max) => max,
            (Clamp::AtZero, _, _) => 0.0,
            _ if container_px > 0.0 => pixel_after / container_px * 100.0,
            _ => snap.percent_at_start,
        },
    };

    Absorption {
        pixel_absorb,
        pixel_after,
        percent_after,
        clamp,
        ..unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(id: u64, px: f64, pct: f64) -> AreaSnapshot {
        AreaSnapshot {
            id: id_of(id),
            pixel_at_start: px,
            percent_at_start: pct,
            min_size: None,
            max_size: None,
            wildcard: false,
        }
    }

    fn id_of(n: u64) -> AreaId {
        let mut id = AreaId::MIN;
        for _ in 1..n {
            id = id.next();
        }
        id
    }

    #[test]
    fn zero_delta_is_identity() {
        let side = [snap(1, 500.0, 50.0)];
        let res = absorb(SizeUnit::Percent, &side, 0.0, 1000.0);
        assert_eq!(res.remainder, 0.0);
        assert_eq!(res.items[0].pixel_absorb, 0.0);
        assert_eq!(res.items[0].percent_after, 50.0);
    }

    #[test]
    fn nearest_area_absorbs_first() {
        let side = [snap(1, 300.0, 30.0), snap(2, 200.0, 20.0)];
        let res = absorb(SizeUnit::Percent, &side, -100.0, 1000.0);
        assert_eq!(res.items[0].pixel_absorb, -100.0);
        assert_eq!(res.items[1].pixel_absorb, 0.0);
        assert_eq!(res.remainder, 0.0);
        assert!((res.items[0].percent_after - 20.0).abs() < 1e-9);
    }

    #[test]
    fn overflow_moves_to_next_area() {
        let side = [snap(1, 100.0, 10.0), snap(2, 200.0, 20.0)];
        let res = absorb(SizeUnit::Percent, &side, -150.0, 1000.0);
        assert_eq!(res.items[0].pixel_after, 0.0);
        assert_eq!(res.items[0].clamp, Clamp::AtZero);
        assert_eq!(res.items[0].percent_after, 0.0);
        assert_eq!(res.items[1].pixel_absorb, -50.0);
        assert_eq!(res.remainder, 0.0);
    }

    #[test]
    fn percent_min_bound_stops_shrink() {
        let mut a = snap(1, 500.0, 50.0);
        a.min_size = Some(20.0);
        let res = absorb(SizeUnit::Percent, &[a], -400.0, 1000.0);
        assert_eq!(res.items[0].pixel_after, 200.0);
        assert_eq!(res.items[0].percent_after, 20.0);
        assert_eq!(res.items[0].clamp, Clamp::AtMin);
        assert_eq!(res.remainder, -100.0);
    }

    #[test]
    fn percent_max_bound_stops_growth() {
        let mut a = snap(1, 500.0, 50.0);
        a.max_size = Some(60.0);
        let res = absorb(SizeUnit::Percent, &[a], 300.0, 1000.0);
        assert_eq!(res.items[0].pixel_after, 600.0);
        assert_eq!(res.items[0].percent_after, 60.0);
        assert_eq!(res.items[0].clamp, Clamp::AtMax);
        assert_eq!(res.remainder, 200.0);
    }

    #[test]
    fn percent_growth_capped_at_container() {
        let res = absorb(SizeUnit::Percent, &[snap(1, 900.0, 90.0)], 300.0, 1000.0);
        assert_eq!(res.items[0].pixel_after, 1000.0);
        assert_eq!(res.items[0].percent_after, 100.0);
        assert_eq!(res.remainder, 200.0);
    }

    #[test]
    fn pixel_bounds_in_pixels() {
        let mut a = snap(1, 120.0, 0.0);
        a.min_size = Some(100.0);
        a.max_size = Some(150.0);
        let shrink = absorb(SizeUnit::Pixel, &[a], -50.0, 800.0);
        assert_eq!(shrink.items[0].pixel_after, 100.0);
        assert_eq!(shrink.remainder, -30.0);
        let grow = absorb(SizeUnit::Pixel, &[a], 50.0, 800.0);
        assert_eq!(grow.items[0].pixel_after, 150.0);
        assert_eq!(grow.remainder, 20.0);
        let free = absorb(SizeUnit::Pixel, &[snap(2, 120.0, 0.0)], 500.0, 800.0);
        assert_eq!(free.items[0].pixel_after, 620.0);
        assert_eq!(free.remainder, 0.0);
    }

    #[test]
    fn empty_area_cannot_shrink() {
        let res = absorb(SizeUnit::Percent, &[snap(1, 0.0, 0.0)], -40.0, 1000.0);
        assert_eq!(res.items[0].pixel_absorb, 0.0);
        assert_eq!(res.remainder, -40.0);
        assert!(res.has_remainder());
    }

    #[test]
    fn absorbed_plus_remainder_is_request() {
        let side = [snap(1, 50.0, 5.0), snap(2, 70.0, 7.0), snap(3, 10.0, 1.0)];
        let res = absorb(SizeUnit::Percent, &side, -200.0, 1000.0);
        assert!((res.absorbed() + res.remainder - -200.0).abs() < 1e-9);
        assert_eq!(res.remainder, -70.0);
    }
}
