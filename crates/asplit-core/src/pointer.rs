#![forbid(unsafe_code)]

//! Normalized pointer input and the capture capability used by gutter drags.
//!
//! Hosts translate their native mouse/touch/pen events into [`PointerEvent`]s
//! before handing them to a split container. Normalization (touch point
//! selection, coordinate scaling) happens on the host side.
//!
//! # Termination
//!
//! `Up`, `Cancel` and `LostCapture` are all *terminating* kinds: a consumer
//! must treat them identically so that no gesture can be left dangling when
//! the platform aborts a pointer stream.

use crate::geometry::Point;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What happened to the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PointerEventKind {
    /// Primary button pressed / touch started.
    Down,
    /// Pointer moved while captured.
    Move,
    /// Primary button released / touch ended.
    Up,
    /// Platform aborted the stream (touchcancel, pointercancel).
    Cancel,
    /// Capture was taken away (window blur, element removed).
    LostCapture,
}

impl PointerEventKind {
    /// Whether this kind ends an active gesture.
    #[must_use]
    pub const fn is_terminating(self) -> bool {
        matches!(self, Self::Up | Self::Cancel | Self::LostCapture)
    }
}

/// A single normalized pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub position: Point,
}

impl PointerEvent {
    #[must_use]
    pub const fn new(kind: PointerEventKind, position: Point) -> Self {
        Self { kind, position }
    }

    #[must_use]
    pub const fn down(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Down, Point::new(x, y))
    }

    #[must_use]
    pub const fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Move, Point::new(x, y))
    }

    #[must_use]
    pub const fn up(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Up, Point::new(x, y))
    }

    #[must_use]
    pub const fn cancel(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Cancel, Point::new(x, y))
    }
}

/// Host capability that routes document-wide pointer events to a gesture.
///
/// A drag acquires capture when it starts and releases it exactly once when
/// it terminates. Implementations should make both calls idempotent.
pub trait PointerCapture {
    /// Start delivering move and terminating events to the active gesture.
    fn acquire(&mut self);

    /// Stop delivering events. Called on every gesture exit path.
    fn release(&mut self);
}

/// Capture that does nothing; suitable when the host already routes every
/// pointer event to the container.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn acquire(&mut self) {}

    fn release(&mut self) {}
}
