#![forbid(unsafe_code)]

//! Outbound notifications.
//!
//! Each event kind has its own subscriber list. Callbacks are stored as
//! `Rc<dyn Fn>` held by a [`Subscription`] guard; the notifier keeps only
//! `Weak` handles, so dropping the guard unsubscribes. Dead entries are
//! pruned lazily on the next emit.
//!
//! Delivery is synchronous and in registration order. `DragProgress` fires on
//! every effective drag tick; batching is left to the subscriber.
//!
//! `layoutSettled` is not driven by an internal timer. The host reports
//! transition completions with a timestamp and polls; a burst of completions
//! inside the quiet window yields one notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use asplit_core::debounce::Debouncer;
use tracing::debug;
use web_time::Instant;

use crate::area::AreaSize;

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

/// Gutter-scoped event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GutterEventKind {
    DragStart,
    DragProgress,
    DragEnd,
    GutterClick,
}

impl GutterEventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DragStart => "dragStart",
            Self::DragProgress => "dragProgress",
            Self::DragEnd => "dragEnd",
            Self::GutterClick => "gutterClick",
        }
    }
}

/// Payload of every gutter-scoped event.
#[derive(Debug, Clone, PartialEq)]
pub struct GutterEvent {
    /// 1-based gutter index.
    pub gutter: usize,
    /// Displayed area sizes in layout order.
    pub sizes: Vec<AreaSize>,
}

struct Channel<T> {
    subscribers: RefCell<Vec<CallbackWeak<T>>>,
}

impl<T: 'static> Channel<T> {
    fn new() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
        }
    }

    fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.subscribers.borrow_mut().push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Returns how many callbacks ran.
    fn emit(&self, payload: &T) -> usize {
        // Upgrade first so a callback may subscribe without a borrow panic.
        let callbacks: Vec<CallbackRc<T>> = {
            let mut subs = self.subscribers.borrow_mut();
            subs.retain(|w| w.strong_count() > 0);
            subs.iter().filter_map(Weak::upgrade).collect()
        };
        for cb in &callbacks {
            cb(payload);
        }
        callbacks.len()
    }

    fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

/// RAII guard for a registered callback. Dropping it unsubscribes.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Subscriber lists for one container plus the `layoutSettled` window.
pub struct Notifier {
    drag_start: Channel<GutterEvent>,
    drag_progress: Channel<GutterEvent>,
    drag_end: Channel<GutterEvent>,
    gutter_click: Channel<GutterEvent>,
    layout_settled: Channel<Vec<AreaSize>>,
    settle: Debouncer,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("drag_start", &self.drag_start.len())
            .field("drag_progress", &self.drag_progress.len())
            .field("drag_end", &self.drag_end.len())
            .field("gutter_click", &self.gutter_click.len())
            .field("layout_settled", &self.layout_settled.len())
            .field("settle", &self.settle)
            .finish()
    }
}

impl Notifier {
    /// Notifier whose `layoutSettled` quiet window is `settle_window`.
    #[must_use]
    pub fn new(settle_window: Duration) -> Self {
        Self {
            drag_start: Channel::new(),
            drag_progress: Channel::new(),
            drag_end: Channel::new(),
            gutter_click: Channel::new(),
            layout_settled: Channel::new(),
            settle: Debouncer::new(settle_window),
        }
    }

    fn channel(&self, kind: GutterEventKind) -> &Channel<GutterEvent> {
        match kind {
            GutterEventKind::DragStart => &self.drag_start,
            GutterEventKind::DragProgress => &self.drag_progress,
            GutterEventKind::DragEnd => &self.drag_end,
            GutterEventKind::GutterClick => &self.gutter_click,
        }
    }

    /// Register a callback for one gutter event kind.
    pub fn subscribe(
        &self,
        kind: GutterEventKind,
        callback: impl Fn(&GutterEvent) + 'static,
    ) -> Subscription {
        self.channel(kind).subscribe(callback)
    }

    pub fn on_layout_settled(&self, callback: impl Fn(&Vec<AreaSize>) + 'static) -> Subscription {
        self.layout_settled.subscribe(callback)
    }

    /// Deliver `event` to every live subscriber of `kind`.
    pub fn emit(&self, kind: GutterEventKind, event: &GutterEvent) {
        let delivered = self.channel(kind).emit(event);
        if kind != GutterEventKind::DragProgress {
            debug!(
                event = kind.as_str(),
                gutter = event.gutter,
                subscribers = delivered,
                "notify"
            );
        }
    }

    /// Subscribers registered for `kind`, dead ones included until pruned.
    #[must_use]
    pub fn subscriber_count(&self, kind: GutterEventKind) -> usize {
        self.channel(kind).len()
    }

    /// Record one transition completion at `now`.
    pub fn transition_end(&mut self, now: Instant) {
        self.settle.push(now);
    }

    /// Emit `layoutSettled` with `sizes` if the quiet window has elapsed.
    ///
    /// `sizes` is only evaluated when the notification actually fires.
    pub fn poll_settled(&mut self, now: Instant, sizes: impl FnOnce() -> Vec<AreaSize>) -> bool {
        let Some(coalesced) = self.settle.poll(now) else {
            return false;
        };
        let sizes = sizes();
        let delivered = self.layout_settled.emit(&sizes);
        debug!(coalesced, subscribers = delivered, "layout settled");
        true
    }

    /// When the pending `layoutSettled` is due, if any.
    #[must_use]
    pub const fn settle_deadline(&self) -> Option<Instant> {
        self.settle.deadline()
    }

    pub fn set_settle_window(&mut self, window: Duration) {
        self.settle.set_window(window);
    }

    /// Drop any pending `layoutSettled`.
    pub fn cancel_settle(&mut self) {
        self.settle.reset();
    }
}
