#![forbid(unsafe_code)]

//! Resizable split-area layout.
//!
//! # Role in asplit
//! `asplit-layout` is the solver. It keeps an ordered set of areas separated
//! by draggable gutters, computes each area's order and size in percent or
//! pixel units, and turns gutter drags into bounded size changes.
//!
//! # Layers
//! - [`registry`]: the single indexed store of areas.
//! - [`build`]: order and size recomputation, style output.
//! - [`absorb`]: how much of a pixel delta one side of a gutter can take.
//! - [`drag`]: the gutter drag state machine over a frozen snapshot.
//! - [`notify`]: subscriber lists and the `layoutSettled` window.
//! - [`split`]: the [`Split`] container tying everything together.
//!
//! Rendering is delegated to a [`SplitRenderer`]; [`HeadlessRenderer`] needs
//! no surface at all.

pub mod absorb;
pub mod area;
pub mod build;
pub mod config;
pub mod drag;
pub mod error;
pub mod notify;
pub mod registry;
pub mod render;
pub mod split;
pub mod toggle;

pub use asplit_core::geometry::{Direction, Point, WritingDirection};
pub use asplit_core::pointer::{PointerCapture, PointerEvent, PointerEventKind};

pub use area::{Area, AreaConfig, AreaId, AreaSize};
pub use config::{SizeUnit, SplitConfig, WildcardPolicy};
pub use drag::{DragSession, DragSnapshot, DragTick, GestureEnd};
pub use error::{ConfigError, SizesError};
pub use notify::{GutterEvent, GutterEventKind, Notifier, Subscription};
pub use registry::{AreaRegistry, Rebuild};
pub use render::{FlexBasis, HeadlessRenderer, SplitRenderer};
pub use split::Split;
pub use toggle::{CollapseMemory, CollapseSide};
