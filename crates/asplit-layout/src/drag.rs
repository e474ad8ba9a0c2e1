#![forbid(unsafe_code)]

//! Gutter drag lifecycle.
//!
//! ```text
//! Idle --start--> Dragging --move*--> Dragging --end/cancel/lost--> Idle
//!   \--start refused (disabled, boundary)--> Idle (press still recorded)
//! ```
//!
//! A [`DragSnapshot`] freezes the container and every displayed area at
//! drag start. Each tick recomputes sizes from the snapshot, never from the
//! previous tick, so ticks are order-independent and drift-free.
//!
//! # Invariants
//!
//! 1. At most one gesture is active; `start` while dragging is a no-op.
//! 2. A tick whose quantized offset equals the previous tick's mutates
//!    nothing.
//! 3. The pixels given up on one side equal the pixels taken on the other.
//! 4. A gesture that ends where it started is a click, never a drag end.
//! 5. Non-finite pointer coordinates never reach the sizes: a press there
//!    is ignored, a move there is dropped, and a release there counts as
//!    a release at the last finite position.

use asplit_core::geometry::Point;
use tracing::{debug, trace};

use crate::absorb::{Absorption, AreaSnapshot, SideAbsorption, absorb};
use crate::area::AreaSize;
use crate::build::pixel_extents;
use crate::config::{SizeUnit, SplitConfig};
use crate::registry::AreaRegistry;

/// Frozen starting state of one gutter drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSnapshot {
    /// Dragged gutter, 1-based.
    pub gutter: usize,
    /// Usable container pixels (gutters excluded).
    pub container_px: f64,
    /// Areas before the gutter, nearest first.
    pub before: Vec<AreaSnapshot>,
    /// Areas after the gutter, nearest first.
    pub after: Vec<AreaSnapshot>,
    /// Quantized offset applied by the last effective tick.
    pub last_stepped_offset: f64,
    pub start_point: Point,
}

impl DragSnapshot {
    /// Capture the snapshot for `gutter`, or `None` if either side is empty.
    #[must_use]
    pub fn capture(
        registry: &AreaRegistry,
        unit: SizeUnit,
        gutter: usize,
        container_px: f64,
        start_point: Point,
    ) -> Option<Self> {
        let gutter_order = (gutter * 2).checked_sub(1)?;
        let extents = pixel_extents(registry, unit, container_px);
        let mut before = Vec::new();
        let mut after = Vec::new();

        for (area, px) in registry.displayed_areas().zip(extents) {
            let snap = AreaSnapshot {
                id: area.id(),
                pixel_at_start: px,
                percent_at_start: area.size().fixed().unwrap_or(0.0),
                min_size: area.min_size(),
                max_size: area.max_size(),
                wildcard: area.size().is_wildcard(),
            };
            if (area.order() as usize) < gutter_order {
                before.insert(0, snap);
            } else {
                after.push(snap);
            }
        }

        if before.is_empty() || after.is_empty() {
            return None;
        }
        Some(Self {
            gutter,
            container_px,
            before,
            after,
            last_stepped_offset: 0.0,
            start_point,
        })
    }

    fn snapshots(&self) -> impl Iterator<Item = &AreaSnapshot> + '_ {
        self.before.iter().chain(&self.after)
    }
}

/// What one effective drag tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct DragTick {
    pub gutter: usize,
    pub stepped_offset: f64,
    /// Net signed pixels applied before / after the gutter.
    pub before_delta: f64,
    pub after_delta: f64,
    /// Both sides hit their bounds; the move was limited to what both can
    /// absorb.
    pub saturated: bool,
}

/// How a gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEnd {
    /// The pointer moved between press and release.
    Dragged { gutter: usize },
    /// Released exactly where it was pressed.
    Clicked { gutter: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    gutter: usize,
    point: Point,
    /// Last finite pointer position seen during the gesture.
    last: Point,
}

/// Stateful controller for gutter drags on one container.
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    snapshot: Option<DragSnapshot>,
    press: Option<Press>,
}

impl DragSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.snapshot.is_some()
    }

    #[must_use]
    pub const fn snapshot(&self) -> Option<&DragSnapshot> {
        self.snapshot.as_ref()
    }

    /// Try to start dragging `gutter` (1-based).
    ///
    /// The press point is remembered even when the drag is refused, so a
    /// release at the same spot still reports a click. Returns whether the
    /// session is now dragging.
    pub fn start(
        &mut self,
        registry: &AreaRegistry,
        config: &SplitConfig,
        gutter: usize,
        point: Point,
        container_px: f64,
    ) -> bool {
        if self.is_dragging() {
            debug!(gutter, "drag start ignored: gesture already active");
            return false;
        }
        if gutter == 0 || gutter > registry.gutter_count() {
            return false;
        }
        if !point.is_finite() {
            debug!(gutter, ?point, "drag start ignored: non-finite pointer");
            return false;
        }
        self.press = Some(Press {
            gutter,
            point,
            last: point,
        });
        if config.disabled {
            debug!(gutter, "drag start refused: container disabled");
            return false;
        }
        let Some(snapshot) = DragSnapshot::capture(registry, config.unit, gutter, container_px, point)
        else {
            debug!(gutter, "drag start refused: gutter has no area on one side");
            return false;
        };
        debug!(
            gutter,
            container_px,
            before = snapshot.before.len(),
            after = snapshot.after.len(),
            "drag started"
        );
        self.snapshot = Some(snapshot);
        true
    }

    /// Apply a pointer move. Commits new sizes to `registry` and returns the
    /// tick, or `None` when idle or when the quantized offset did not change.
    pub fn drag_to(
        &mut self,
        registry: &mut AreaRegistry,
        config: &SplitConfig,
        point: Point,
    ) -> Option<DragTick> {
        let snapshot = self.snapshot.as_mut()?;
        if !point.is_finite() {
            trace!(gutter = snapshot.gutter, ?point, "non-finite move dropped");
            return None;
        }
        if let Some(press) = self.press.as_mut() {
            press.last = point;
        }

        let raw = (snapshot.start_point.along(config.direction) - point.along(config.direction))
            * config.writing_direction.sign();
        let step = config.gutter_step;
        let stepped = (raw / step).round() * step;
        if stepped == snapshot.last_stepped_offset {
            return None;
        }
        snapshot.last_stepped_offset = stepped;

        let unit = config.unit;
        let px = snapshot.container_px;
        let mut before = absorb(unit, &snapshot.before, -stepped, px);
        let mut after = absorb(unit, &snapshot.after, stepped, px);
        let mut saturated = false;

        match (before.has_remainder(), after.has_remainder()) {
            (true, true) => {
                // Only the smaller absorbable magnitude keeps both sides
                // within bounds and the total unchanged.
                let limit = before.absorbed().abs().min(after.absorbed().abs());
                let signed = limit.copysign(stepped);
                before = absorb(unit, &snapshot.before, -signed, px);
                after = absorb(unit, &snapshot.after, signed, px);
                saturated = true;
                debug!(gutter = snapshot.gutter, stepped, limit, "both gutter sides saturated");
            }
            (true, false) => {
                after = absorb(unit, &snapshot.after, stepped + before.remainder, px);
            }
            (false, true) => {
                before = absorb(unit, &snapshot.before, -stepped + after.remainder, px);
            }
            (false, false) => {}
        }

        let tick = DragTick {
            gutter: snapshot.gutter,
            stepped_offset: stepped,
            before_delta: before.absorbed(),
            after_delta: after.absorbed(),
            saturated,
        };
        trace!(
            gutter = tick.gutter,
            stepped,
            before_delta = tick.before_delta,
            after_delta = tick.after_delta,
            "drag tick"
        );

        let mut items = merge_sides(before, after);
        if unit == SizeUnit::Percent {
            renormalize(&mut items, snapshot);
        }
        commit(registry, unit, &items);
        Some(tick)
    }

    /// Finish the gesture at `point`.
    ///
    /// Returns `Dragged` when the pointer moved since the press, `Clicked`
    /// when it did not, and `None` when no press is pending. A non-finite
    /// `point` is replaced by the last finite position of the gesture.
    pub fn end(&mut self, point: Point) -> Option<GestureEnd> {
        self.snapshot = None;
        let press = self.press.take()?;
        let gutter = press.gutter;
        let point = if point.is_finite() { point } else { press.last };
        let outcome = if press.point == point {
            GestureEnd::Clicked { gutter }
        } else {
            GestureEnd::Dragged { gutter }
        };
        debug!(?outcome, "gesture ended");
        Some(outcome)
    }

    /// Drop the gesture without an outcome (layout rebuilt underneath it).
    /// Returns the gutter that was being dragged.
    pub fn abort(&mut self) -> Option<usize> {
        self.press = None;
        let snapshot = self.snapshot.take()?;
        debug!(gutter = snapshot.gutter, "drag aborted");
        Some(snapshot.gutter)
    }
}

fn merge_sides(before: SideAbsorption, after: SideAbsorption) -> Vec<Absorption> {
    let mut items = before.items;
    items.extend(after.items);
    items
}

/// Reset one free, non-empty area so the percent sizes sum to exactly 100.
fn renormalize(items: &mut [Absorption], snapshot: &DragSnapshot) {
    let candidate = items.iter().zip(snapshot.snapshots()).position(|(item, snap)| {
        !item.is_pinned()
            && item.percent_after != 0.0
            && Some(item.percent_after) != snap.min_size
            && Some(item.percent_after) != snap.max_size
    });
    let Some(idx) = candidate else {
        return;
    };
    let others: f64 = items
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != idx)
        .map(|(_, a)| a.percent_after)
        .sum();
    items[idx].percent_after = 100.0 - others;
}

fn commit(registry: &mut AreaRegistry, unit: SizeUnit, items: &[Absorption]) {
    for item in items {
        let Some(area) = registry.get_mut(item.id) else {
            continue;
        };
        match unit {
            SizeUnit::Percent => area.size = AreaSize::Fixed(item.percent_after),
            SizeUnit::Pixel if !item.wildcard => area.size = AreaSize::Fixed(item.pixel_after),
            SizeUnit::Pixel => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::AreaConfig;
    use crate::build::LayoutBuilder;
    use crate::registry::Rebuild;
    use crate::render::HeadlessRenderer;

    /// Percent registry over a 1000px usable extent.
    fn percent_setup(configs: &[AreaConfig]) -> (AreaRegistry, SplitConfig) {
        let mut reg = AreaRegistry::new();
        for cfg in configs {
            reg.add_area(cfg.clone());
        }
        let config = SplitConfig::default();
        let mut renderer = HeadlessRenderer::new(1000.0);
        LayoutBuilder::new(&config).build(&mut reg, &mut renderer, Rebuild::FULL, 1000.0);
        (reg, config)
    }

    fn percents(reg: &AreaRegistry) -> Vec<f64> {
        reg.displayed_areas()
            .map(|a| a.size().fixed().unwrap_or(f64::NAN))
            .collect()
    }

    #[test]
    fn snapshot_lists_are_nearest_first() {
        let (reg, _) = percent_setup(&[
            AreaConfig::default(),
            AreaConfig::default(),
            AreaConfig::default(),
            AreaConfig::default(),
        ]);
        let ids = reg.displayed().to_vec();
        let snap = DragSnapshot::capture(&reg, SizeUnit::Percent, 2, 1000.0, Point::default()).unwrap();
        let before: Vec<_> = snap.before.iter().map(|s| s.id).collect();
        let after: Vec<_> = snap.after.iter().map(|s| s.id).collect();
        assert_eq!(before, vec![ids[1], ids[0]]);
        assert_eq!(after, vec![ids[2], ids[3]]);
        assert_eq!(snap.before[0].pixel_at_start, 250.0);
    }

    #[test]
    fn boundary_gutter_cannot_start() {
        let (reg, config) = percent_setup(&[AreaConfig::default(), AreaConfig::default()]);
        let mut session = DragSession::new();
        assert!(!session.start(&reg, &config, 0, Point::default(), 1000.0));
        assert!(!session.start(&reg, &config, 2, Point::default(), 1000.0));
        assert!(DragSnapshot::capture(&reg, SizeUnit::Percent, 2, 1000.0, Point::default()).is_none());
        assert!(session.start(&reg, &config, 1, Point::default(), 1000.0));
    }

    #[test]
    fn move_shifts_size_across_gutter() {
        let (mut reg, config) = percent_setup(&[AreaConfig::default(), AreaConfig::default()]);
        let mut session = DragSession::new();
        assert!(session.start(&reg, &config, 1, Point::new(500.0, 0.0), 1000.0));
        // Pointer moves right by 100px: the area before the gutter grows.
        let tick = session.drag_to(&mut reg, &config, Point::new(600.0, 0.0)).unwrap();
        assert_eq!(tick.stepped_offset, -100.0);
        assert_eq!(tick.before_delta, 100.0);
        assert_eq!(tick.after_delta, -100.0);
        let p = percents(&reg);
        assert!((p[0] - 60.0).abs() < 1e-9);
        assert!((p[1] - 40.0).abs() < 1e-9);
        assert_eq!(p.iter().sum::<f64>(), 100.0);
    }

    #[test]
    fn repeated_offset_is_suppressed() {
        let (mut reg, config) = percent_setup(&[AreaConfig::default(), AreaConfig::default()]);
        let config = SplitConfig {
            gutter_step: 10.0,
            ..config
        };
        let mut session = DragSession::new();
        session.start(&reg, &config, 1, Point::new(500.0, 0.0), 1000.0);
        assert!(session.drag_to(&mut reg, &config, Point::new(520.0, 0.0)).is_some());
        // 523 quantizes to the same 20px step.
        assert!(session.drag_to(&mut reg, &config, Point::new(523.0, 0.0)).is_none());
        // Back to the origin quantizes to 0, which differs from 20.
        assert!(session.drag_to(&mut reg, &config, Point::new(500.0, 0.0)).is_some());
        assert_eq!(percents(&reg), vec![50.0, 50.0]);
    }

    #[test]
    fn rtl_inverts_offset() {
        let (mut reg, config) = percent_setup(&[AreaConfig::default(), AreaConfig::default()]);
        let config = config.writing_direction(asplit_core::WritingDirection::Rtl);
        let mut session = DragSession::new();
        session.start(&reg, &config, 1, Point::new(500.0, 0.0), 1000.0);
        let tick = session.drag_to(&mut reg, &config, Point::new(600.0, 0.0)).unwrap();
        assert_eq!(tick.stepped_offset, 100.0);
        let p = percents(&reg);
        assert!((p[0] - 40.0).abs() < 1e-9);
    }

    #[test]
    fn before_remainder_limits_after_side() {
        let (mut reg, config) = percent_setup(&[
            AreaConfig::default().with_size(50.0).with_min_size(20.0),
            AreaConfig::default().with_size(50.0),
        ]);
        let mut session = DragSession::new();
        session.start(&reg, &config, 1, Point::new(500.0, 0.0), 1000.0);
        let tick = session.drag_to(&mut reg, &config, Point::new(100.0, 0.0)).unwrap();
        assert_eq!(tick.before_delta, -300.0);
        assert_eq!(tick.after_delta, 300.0);
        assert!(!tick.saturated);
        assert_eq!(percents(&reg), vec![20.0, 80.0]);
    }

    #[test]
    fn after_remainder_limits_before_side() {
        let (mut reg, config) = percent_setup(&[
            AreaConfig::default().with_size(50.0),
            AreaConfig::default().with_size(50.0).with_max_size(70.0),
        ]);
        let mut session = DragSession::new();
        session.start(&reg, &config, 1, Point::new(500.0, 0.0), 1000.0);
        let tick = session.drag_to(&mut reg, &config, Point::new(0.0, 0.0)).unwrap();
        assert_eq!(tick.after_delta, 200.0);
        assert_eq!(tick.before_delta, -200.0);
        assert_eq!(percents(&reg), vec![30.0, 70.0]);
    }

    #[test]
    fn both_sides_saturated_takes_smaller_capacity() {
        let (mut reg, config) = percent_setup(&[
            AreaConfig::default().with_size(50.0).with_min_size(40.0),
            AreaConfig::default().with_size(50.0).with_max_size(55.0),
        ]);
        let mut session = DragSession::new();
        session.start(&reg, &config, 1, Point::new(500.0, 0.0), 1000.0);
        let tick = session.drag_to(&mut reg, &config, Point::new(300.0, 0.0)).unwrap();
        assert!(tick.saturated);
        assert_eq!(tick.before_delta, -50.0);
        assert_eq!(tick.after_delta, 50.0);
        let p = percents(&reg);
        assert!((p[0] - 45.0).abs() < 1e-9);
        assert_eq!(p[1], 55.0);
    }

    #[test]
    fn pixel_wildcard_is_not_committed() {
        let mut reg = AreaRegistry::new();
        reg.add_area(AreaConfig::default().with_size(200.0));
        reg.add_area(AreaConfig::default());
        let config = SplitConfig::default().unit(SizeUnit::Pixel);
        let mut renderer = HeadlessRenderer::new(800.0);
        LayoutBuilder::new(&config).build(&mut reg, &mut renderer, Rebuild::FULL, 789.0);

        let mut session = DragSession::new();
        session.start(&reg, &config, 1, Point::new(200.0, 0.0), 789.0);
        session.drag_to(&mut reg, &config, Point::new(250.0, 0.0)).unwrap();
        let sizes: Vec<_> = reg.displayed_areas().map(|a| a.size()).collect();
        assert_eq!(sizes, vec![AreaSize::Fixed(250.0), AreaSize::Wildcard]);
    }

    #[test]
    fn end_classifies_click_and_drag() {
        let (mut reg, config) = percent_setup(&[AreaConfig::default(), AreaConfig::default()]);
        let mut session = DragSession::new();
        session.start(&reg, &config, 1, Point::new(10.0, 10.0), 1000.0);
        assert_eq!(
            session.end(Point::new(10.0, 10.0)),
            Some(GestureEnd::Clicked { gutter: 1 })
        );
        assert!(!session.is_dragging());

        session.start(&reg, &config, 1, Point::new(10.0, 10.0), 1000.0);
        session.drag_to(&mut reg, &config, Point::new(30.0, 10.0));
        assert_eq!(
            session.end(Point::new(30.0, 10.0)),
            Some(GestureEnd::Dragged { gutter: 1 })
        );
        assert_eq!(session.end(Point::new(30.0, 10.0)), None);
    }

    #[test]
    fn disabled_records_press_for_click() {
        let (reg, config) = percent_setup(&[AreaConfig::default(), AreaConfig::default()]);
        let config = config.disabled(true);
        let mut session = DragSession::new();
        assert!(!session.start(&reg, &config, 1, Point::new(5.0, 5.0), 1000.0));
        assert!(!session.is_dragging());
        assert_eq!(
            session.end(Point::new(5.0, 5.0)),
            Some(GestureEnd::Clicked { gutter: 1 })
        );
    }

    #[test]
    fn abort_clears_press_and_snapshot() {
        let (reg, config) = percent_setup(&[AreaConfig::default(), AreaConfig::default()]);
        let mut session = DragSession::new();
        session.start(&reg, &config, 1, Point::new(5.0, 5.0), 1000.0);
        assert!(session.is_dragging());
        assert_eq!(session.abort(), Some(1));
        assert_eq!(session.end(Point::new(5.0, 5.0)), None);
        assert!(session.snapshot().is_none());
    }

    #[test]
    fn non_finite_move_is_dropped() {
        let (mut reg, config) = percent_setup(&[AreaConfig::default(), AreaConfig::default()]);
        let mut session = DragSession::new();
        session.start(&reg, &config, 1, Point::new(500.0, 0.0), 1000.0);
        assert!(session.drag_to(&mut reg, &config, Point::new(f64::NAN, 0.0)).is_none());
        assert!(session.drag_to(&mut reg, &config, Point::new(f64::INFINITY, 0.0)).is_none());
        assert_eq!(percents(&reg), vec![50.0, 50.0]);
        // Later finite moves still apply relative to the press.
        let tick = session.drag_to(&mut reg, &config, Point::new(600.0, 0.0)).unwrap();
        assert_eq!(tick.stepped_offset, -100.0);
    }

    #[test]
    fn non_finite_press_is_ignored() {
        let (reg, config) = percent_setup(&[AreaConfig::default(), AreaConfig::default()]);
        let mut session = DragSession::new();
        assert!(!session.start(&reg, &config, 1, Point::new(f64::NAN, 0.0), 1000.0));
        assert!(!session.is_dragging());
        assert_eq!(session.end(Point::new(f64::NAN, 0.0)), None);
    }

    #[test]
    fn non_finite_release_uses_last_finite_point() {
        let (mut reg, config) = percent_setup(&[AreaConfig::default(), AreaConfig::default()]);
        let mut session = DragSession::new();
        session.start(&reg, &config, 1, Point::new(500.0, 0.0), 1000.0);
        assert_eq!(
            session.end(Point::new(f64::NAN, f64::NAN)),
            Some(GestureEnd::Clicked { gutter: 1 })
        );

        session.start(&reg, &config, 1, Point::new(500.0, 0.0), 1000.0);
        session.drag_to(&mut reg, &config, Point::new(520.0, 0.0));
        assert_eq!(
            session.end(Point::new(f64::NAN, 0.0)),
            Some(GestureEnd::Dragged { gutter: 1 })
        );
    }
}
