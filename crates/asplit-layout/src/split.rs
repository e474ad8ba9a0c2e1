#![forbid(unsafe_code)]

//! Split container facade.
//!
//! [`Split`] owns the area registry, the drag session, the notifier and a
//! [`SplitRenderer`]. Every mutation goes through it so that each logical
//! change produces at most one rebuild, and so that a rebuild always ends a
//! drag that was in flight.
//!
//! # Example
//!
//! ```
//! use asplit_layout::{AreaConfig, AreaSize, HeadlessRenderer, Split, SplitConfig};
//!
//! let mut split = Split::new(SplitConfig::default(), HeadlessRenderer::new(1011.0));
//! split.add_area(AreaConfig::default());
//! split.add_area(AreaConfig::default());
//! assert_eq!(split.visible_area_sizes(), vec![AreaSize::Fixed(50.0); 2]);
//! assert_eq!(split.usable_px(), 1000.0);
//! ```

use std::fmt;

use asplit_core::geometry::Point;
use asplit_core::pointer::{NoCapture, PointerCapture, PointerEvent, PointerEventKind};
use tracing::debug;
use web_time::Instant;

use crate::area::{Area, AreaConfig, AreaId, AreaSize, non_negative};
use crate::build::{LayoutBuilder, pixel_extents, user_sizes_valid};
use crate::config::SplitConfig;
use crate::drag::{DragSession, DragSnapshot, GestureEnd};
use crate::error::SizesError;
use crate::notify::{GutterEvent, GutterEventKind, Notifier, Subscription};
use crate::registry::{AreaRegistry, Rebuild};
use crate::render::SplitRenderer;
use crate::toggle::{CollapseMemory, CollapseSide};

/// One split container.
pub struct Split<R: SplitRenderer> {
    config: SplitConfig,
    registry: AreaRegistry,
    renderer: R,
    drag: DragSession,
    notifier: Notifier,
    collapse: CollapseMemory,
    capture: Box<dyn PointerCapture>,
    captured: bool,
}

impl<R: SplitRenderer + fmt::Debug> fmt::Debug for Split<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Split")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("renderer", &self.renderer)
            .field("drag", &self.drag)
            .field("notifier", &self.notifier)
            .field("captured", &self.captured)
            .finish_non_exhaustive()
    }
}

impl<R: SplitRenderer> Split<R> {
    /// Create an empty container. `config` is sanitized first.
    pub fn new(config: SplitConfig, mut renderer: R) -> Self {
        let config = config.sanitized();
        renderer.set_direction(config.direction);
        Self {
            notifier: Notifier::new(config.settle_window()),
            config,
            registry: AreaRegistry::new(),
            renderer,
            drag: DragSession::new(),
            collapse: CollapseMemory::new(),
            capture: Box::new(NoCapture),
            captured: false,
        }
    }

    /// Use `capture` to route pointer events while a drag is active.
    #[must_use]
    pub fn with_capture(mut self, capture: impl PointerCapture + 'static) -> Self {
        self.capture = Box::new(capture);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &SplitConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &AreaRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable renderer access (resize, host-side state). Call
    /// [`relayout`](Self::relayout) afterwards if the extent changed.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Register a callback for a gutter event.
    pub fn subscribe(
        &self,
        kind: GutterEventKind,
        callback: impl Fn(&GutterEvent) + 'static,
    ) -> Subscription {
        self.notifier.subscribe(kind, callback)
    }

    /// Register a callback for `layoutSettled`.
    pub fn on_layout_settled(&self, callback: impl Fn(&Vec<AreaSize>) + 'static) -> Subscription {
        self.notifier.on_layout_settled(callback)
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    #[must_use]
    pub const fn drag_snapshot(&self) -> Option<&DragSnapshot> {
        self.drag.snapshot()
    }

    /// Container extent along the layout axis minus every gutter.
    #[must_use]
    pub fn usable_px(&self) -> f64 {
        let extent = self.renderer.container_extent(self.config.direction);
        let gutters = self.registry.gutter_count() as f64 * self.config.gutter_size;
        (extent - gutters).max(0.0)
    }

    // --- configuration -------------------------------------------------

    /// Replace the container configuration, rebuilding at most once.
    ///
    /// Returns whether a rebuild ran.
    pub fn set_config(&mut self, config: SplitConfig) -> bool {
        let next = config.sanitized();
        let prev = std::mem::replace(&mut self.config, next);
        let mut pending: Option<Rebuild> = None;

        if prev.direction != self.config.direction {
            self.renderer.set_direction(self.config.direction);
            pending.get_or_insert(Rebuild::NONE);
        }
        if prev.unit != self.config.unit {
            self.collapse.clear();
            *pending.get_or_insert(Rebuild::NONE) |= Rebuild::SIZES;
        }
        if prev.gutter_size != self.config.gutter_size {
            pending.get_or_insert(Rebuild::NONE);
        }
        if prev.settle_window_ms != self.config.settle_window_ms {
            self.notifier.set_settle_window(self.config.settle_window());
        }
        if prev.use_transition && !self.config.use_transition {
            self.notifier.cancel_settle();
        }

        match pending {
            Some(flags) => {
                self.rebuild(flags);
                true
            }
            None => false,
        }
    }

    /// Recompute styles against the current container extent.
    pub fn relayout(&mut self) {
        self.rebuild(Rebuild::NONE);
    }

    // --- areas ---------------------------------------------------------

    /// Register an area; visible areas are appended to the layout.
    pub fn add_area(&mut self, config: AreaConfig) -> AreaId {
        let (id, flags) = self.registry.add_area(config);
        self.apply(Some(flags));
        id
    }

    /// Returns `false` for unknown ids.
    pub fn remove_area(&mut self, id: AreaId) -> bool {
        let flags = self.registry.remove_area(id);
        if flags.is_some() {
            self.collapse.forget(id);
        }
        self.apply(flags)
    }

    /// Replace an area's configuration atomically. Returns `false` for
    /// unknown ids.
    pub fn update_area(&mut self, id: AreaId, config: AreaConfig) -> bool {
        let flags = self.registry.update_area(id, config);
        self.apply(flags)
    }

    pub fn show_area(&mut self, id: AreaId) -> bool {
        let flags = self.registry.show_area(id);
        self.apply(flags)
    }

    pub fn hide_area(&mut self, id: AreaId) -> bool {
        let flags = self.registry.hide_area(id);
        self.apply(flags)
    }

    #[must_use]
    pub fn area(&self, id: AreaId) -> Option<&Area> {
        self.registry.get(id)
    }

    fn apply(&mut self, flags: Option<Rebuild>) -> bool {
        let Some(flags) = flags else {
            return false;
        };
        if flags.is_needed() {
            self.rebuild(flags);
        }
        true
    }

    fn rebuild(&mut self, flags: Rebuild) {
        self.stop_drag();
        let usable = self.usable_px();
        LayoutBuilder::new(&self.config).build(&mut self.registry, &mut self.renderer, flags, usable);
    }

    // --- sizes ---------------------------------------------------------

    /// Current sizes of the displayed areas, in layout order.
    #[must_use]
    pub fn visible_area_sizes(&self) -> Vec<AreaSize> {
        self.registry.displayed_areas().map(Area::size).collect()
    }

    /// Pixel extent of each displayed area, in layout order.
    #[must_use]
    pub fn visible_area_pixel_sizes(&self) -> Vec<f64> {
        pixel_extents(&self.registry, self.config.unit, self.usable_px())
    }

    /// Assign new sizes to the displayed areas and rebuild sizes.
    ///
    /// Non-finite or negative numbers count as missing. On error nothing is
    /// changed.
    pub fn try_set_visible_area_sizes(&mut self, sizes: &[AreaSize]) -> Result<(), SizesError> {
        let expected = self.registry.displayed().len();
        if sizes.len() != expected {
            return Err(SizesError::CountMismatch {
                expected,
                actual: sizes.len(),
            });
        }
        let values: Vec<Option<f64>> = sizes
            .iter()
            .map(|s| s.fixed().and_then(non_negative))
            .collect();
        if !user_sizes_valid(self.config.unit, &values) {
            return Err(SizesError::InvalidForUnit {
                unit: self.config.unit,
            });
        }

        let ids = self.registry.displayed().to_vec();
        for (id, value) in ids.into_iter().zip(values) {
            if let Some(area) = self.registry.get_mut(id) {
                area.config.size = value;
            }
        }
        self.rebuild(Rebuild::SIZES);
        Ok(())
    }

    /// Boolean form of [`try_set_visible_area_sizes`](Self::try_set_visible_area_sizes).
    pub fn set_visible_area_sizes(&mut self, sizes: &[AreaSize]) -> bool {
        match self.try_set_visible_area_sizes(sizes) {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, "visible area sizes rejected");
                false
            }
        }
    }

    /// Collapse or restore the area on `side` of `gutter` (1-based).
    pub fn toggle_collapse(&mut self, gutter: usize, side: CollapseSide) -> bool {
        let ids = self.registry.displayed().to_vec();
        let sizes = self.visible_area_sizes();
        let extents = self.visible_area_pixel_sizes();
        let mut memory = self.collapse.clone();
        let Some(next) = memory.plan(&ids, &sizes, &extents, gutter, side) else {
            return false;
        };
        if !self.set_visible_area_sizes(&next) {
            return false;
        }
        self.collapse = memory;
        debug!(gutter, ?side, "gutter collapse toggled");
        true
    }

    // --- gestures ------------------------------------------------------

    /// Press on `gutter` (1-based). Returns whether a drag started.
    pub fn start_drag(&mut self, gutter: usize, point: Point) -> bool {
        let usable = self.usable_px();
        if !self.drag.start(&self.registry, &self.config, gutter, point, usable) {
            return false;
        }
        if !self.captured {
            self.capture.acquire();
            self.captured = true;
        }
        self.renderer.set_dragging(true);
        self.renderer.set_gutter_dragged(gutter, true);
        self.emit(GutterEventKind::DragStart, gutter);
        true
    }

    /// Pointer moved. Returns whether sizes changed.
    pub fn drag_to(&mut self, point: Point) -> bool {
        let Some(tick) = self.drag.drag_to(&mut self.registry, &self.config, point) else {
            return false;
        };
        LayoutBuilder::new(&self.config).refresh_styles(&self.registry, &mut self.renderer);
        self.renderer.mark_dirty();
        self.emit(GutterEventKind::DragProgress, tick.gutter);
        true
    }

    /// Pointer released, cancelled or lost at `point`.
    ///
    /// Emits `dragEnd` when a drag moved, `gutterClick` when the release is
    /// at the press point, and nothing otherwise.
    pub fn end_drag(&mut self, point: Point) -> Option<GestureEnd> {
        let dragged = self.drag.snapshot().map(|s| s.gutter);
        let outcome = self.drag.end(point);
        if let Some(gutter) = dragged {
            self.finish_drag(gutter);
        }
        match outcome? {
            GestureEnd::Dragged { gutter } if dragged.is_some() => {
                self.emit(GutterEventKind::DragEnd, gutter);
                outcome
            }
            GestureEnd::Dragged { .. } => None,
            GestureEnd::Clicked { gutter } => {
                self.emit(GutterEventKind::GutterClick, gutter);
                outcome
            }
        }
    }

    /// Route a normalized pointer event. `gutter` is the gutter under a
    /// `Down` event and is ignored for other kinds.
    pub fn handle_pointer(&mut self, event: PointerEvent, gutter: Option<usize>) -> bool {
        match event.kind {
            PointerEventKind::Down => gutter.is_some_and(|g| self.start_drag(g, event.position)),
            PointerEventKind::Move => self.drag_to(event.position),
            kind if kind.is_terminating() => self.end_drag(event.position).is_some(),
            _ => false,
        }
    }

    fn stop_drag(&mut self) {
        if let Some(gutter) = self.drag.abort() {
            self.finish_drag(gutter);
        }
    }

    fn finish_drag(&mut self, gutter: usize) {
        if self.captured {
            self.capture.release();
            self.captured = false;
        }
        self.renderer.set_dragging(false);
        self.renderer.set_gutter_dragged(gutter, false);
    }

    fn emit(&self, kind: GutterEventKind, gutter: usize) {
        let event = GutterEvent {
            gutter,
            sizes: self.visible_area_sizes(),
        };
        self.notifier.emit(kind, &event);
    }

    // --- transitions ---------------------------------------------------

    /// A flex-basis transition finished at `now`. Ignored unless
    /// `use_transition` is on.
    pub fn transition_end(&mut self, now: Instant) {
        if self.config.use_transition {
            self.notifier.transition_end(now);
        }
    }

    /// Fire `layoutSettled` if its quiet window has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let registry = &self.registry;
        self.notifier
            .poll_settled(now, || registry.displayed_areas().map(Area::size).collect())
    }

    /// When the host should call [`poll`](Self::poll) next.
    #[must_use]
    pub const fn settle_deadline(&self) -> Option<Instant> {
        self.notifier.settle_deadline()
    }
}

impl<R: SplitRenderer> Drop for Split<R> {
    fn drop(&mut self) {
        if self.captured {
            self.capture.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SizeUnit;
    use crate::render::{FlexBasis, HeadlessRenderer};
    use asplit_core::geometry::Direction;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Default)]
    struct CountingCapture {
        acquired: Rc<Cell<u32>>,
        released: Rc<Cell<u32>>,
    }

    impl PointerCapture for CountingCapture {
        fn acquire(&mut self) {
            self.acquired.set(self.acquired.get() + 1);
        }

        fn release(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    fn two_areas() -> Split<HeadlessRenderer> {
        let mut split = Split::new(SplitConfig::default(), HeadlessRenderer::new(1011.0));
        split.add_area(AreaConfig::default());
        split.add_area(AreaConfig::default());
        split
    }

    #[test]
    fn set_sizes_rejects_without_mutation() {
        let mut split = two_areas();
        let before = split.visible_area_sizes();
        assert_eq!(
            split.try_set_visible_area_sizes(&[AreaSize::Fixed(100.0)]),
            Err(SizesError::CountMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            split.try_set_visible_area_sizes(&[AreaSize::Fixed(30.0), AreaSize::Fixed(30.0)]),
            Err(SizesError::InvalidForUnit {
                unit: SizeUnit::Percent
            })
        );
        assert!(!split.set_visible_area_sizes(&[AreaSize::Fixed(f64::NAN), AreaSize::Fixed(100.0)]));
        assert_eq!(split.visible_area_sizes(), before);
        assert!(split.set_visible_area_sizes(&[AreaSize::Fixed(30.0), AreaSize::Fixed(70.0)]));
        assert_eq!(
            split.visible_area_sizes(),
            vec![AreaSize::Fixed(30.0), AreaSize::Fixed(70.0)]
        );
    }

    #[test]
    fn set_config_rebuild_rules() {
        let mut split = two_areas();
        let dirty = split.renderer().dirty_count();
        assert!(!split.set_config(SplitConfig::default().disabled(true).gutter_step(4.0)));
        assert_eq!(split.renderer().dirty_count(), dirty);

        assert!(split.set_config(split.config().clone().direction(Direction::Vertical)));
        assert_eq!(split.renderer().direction(), Direction::Vertical);
        assert_eq!(split.renderer().dirty_count(), dirty + 1);

        assert!(split.set_config(split.config().clone().gutter_size(20.0)));
        let first = split.registry().displayed()[0];
        assert_eq!(
            split.renderer().flex_of(first),
            Some(FlexBasis::Percent {
                percent: 50.0,
                gutter_total: 20.0
            })
        );

        // No wildcard configured: the first area takes the marker and the
        // other gets an equal share of the 991 usable pixels.
        assert!(split.set_config(split.config().clone().unit(SizeUnit::Pixel)));
        assert_eq!(
            split.visible_area_sizes(),
            vec![AreaSize::Wildcard, AreaSize::Fixed(495.5)]
        );
        assert_eq!(split.visible_area_pixel_sizes(), vec![495.5, 495.5]);
    }

    #[test]
    fn capture_is_scoped_to_the_drag() {
        let capture = CountingCapture::default();
        let acquired = Rc::clone(&capture.acquired);
        let released = Rc::clone(&capture.released);
        let mut split = two_areas().with_capture(capture);

        assert!(split.start_drag(1, Point::new(500.0, 0.0)));
        assert!(split.renderer().is_dragging());
        assert_eq!(split.renderer().dragged_gutter(), Some(1));
        assert_eq!(acquired.get(), 1);
        assert!(split.drag_to(Point::new(450.0, 0.0)));
        split.end_drag(Point::new(450.0, 0.0));
        assert_eq!(released.get(), 1);
        assert!(!split.renderer().is_dragging());
        assert_eq!(split.renderer().dragged_gutter(), None);

        split.start_drag(1, Point::new(500.0, 0.0));
        drop(split);
        assert_eq!(released.get(), 2);
    }

    #[test]
    fn rebuild_stops_active_drag_silently() {
        let mut split = two_areas();
        let ends = Rc::new(Cell::new(0));
        let e = Rc::clone(&ends);
        let _sub = split.subscribe(GutterEventKind::DragEnd, move |_| e.set(e.get() + 1));
        split.start_drag(1, Point::new(500.0, 0.0));
        split.add_area(AreaConfig::default());
        assert!(!split.is_dragging());
        assert_eq!(split.end_drag(Point::new(400.0, 0.0)), None);
        assert_eq!(ends.get(), 0);
    }

    #[test]
    fn unknown_ids_are_noops() {
        let mut split = two_areas();
        let id = split.add_area(AreaConfig::default());
        assert!(split.remove_area(id));
        assert!(!split.remove_area(id));
        assert!(!split.hide_area(id));
        assert!(!split.show_area(id));
        assert!(!split.update_area(id, AreaConfig::default()));
    }

    #[test]
    fn transition_end_needs_use_transition() {
        let mut split = two_areas();
        let t0 = Instant::now();
        split.transition_end(t0);
        assert_eq!(split.settle_deadline(), None);

        split.set_config(split.config().clone().use_transition(true));
        split.transition_end(t0);
        assert!(split.settle_deadline().is_some());
        assert!(split.poll(t0 + std::time::Duration::from_millis(20)));
    }

    #[test]
    fn pixel_sizes_follow_model() {
        let split = two_areas();
        assert_eq!(split.visible_area_pixel_sizes(), vec![500.0, 500.0]);
    }
}
