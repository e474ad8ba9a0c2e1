#![forbid(unsafe_code)]

//! Core: geometry, normalized pointer input, and signal coalescing.
//!
//! # Role in asplit
//! `asplit-core` is the input layer. It owns the host-agnostic types the
//! layout solver (`asplit-layout`) consumes: pointer coordinates, layout
//! direction, pointer events with unified termination, the capture
//! capability a drag acquires, and the debouncer behind `layoutSettled`.
//!
//! # How it fits in the system
//! Hosts (DOM bindings, terminal frontends, test harnesses) translate their
//! native input into [`pointer::PointerEvent`] values. The solver never talks
//! to a windowing system directly.

pub mod debounce;
pub mod geometry;
pub mod pointer;

pub use debounce::Debouncer;
pub use geometry::{Direction, Point, WritingDirection};
pub use pointer::{NoCapture, PointerCapture, PointerEvent, PointerEventKind};
