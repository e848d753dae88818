//! Document-level pointer-down dispatch.
//!
//! Open pickers close when the user presses outside them, which needs a
//! document-wide listener rather than one per control. [`PointerEvents`]
//! plays that role: subscribers get a queue-backed [`PointerSubscription`]
//! and drain it in the same turn the event was dispatched. Dropping the
//! subscription deregisters it, so a surface that unmounts cannot leak a
//! listener across remounts.
//!
//! Everything here is single-threaded; dispatch fans out synchronously.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// A pointer-down at document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDown {
    pub x: f64,
    pub y: f64,
}

impl PointerDown {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in document coordinates.
///
/// The default is the empty rectangle at the origin, which contains
/// nothing; a picker that never reported its bounds treats every press as
/// outside.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: PointerDown) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

type Queue = Rc<RefCell<Vec<PointerDown>>>;

/// Process-wide pointer-down fan-out.
#[derive(Debug, Default)]
pub struct PointerEvents {
    subscribers: RefCell<Vec<Weak<RefCell<Vec<PointerDown>>>>>,
}

impl PointerEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. The subscription stays live until dropped.
    pub fn subscribe(&self) -> PointerSubscription {
        let queue: Queue = Rc::new(RefCell::new(Vec::new()));
        self.subscribers.borrow_mut().push(Rc::downgrade(&queue));
        PointerSubscription { queue }
    }

    /// Deliver one event to every live subscriber, pruning dead ones.
    pub fn dispatch(&self, event: PointerDown) {
        self.subscribers.borrow_mut().retain(|weak| {
            if let Some(queue) = weak.upgrade() {
                queue.borrow_mut().push(event);
                true
            } else {
                false
            }
        });
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|weak| weak.strong_count() > 0);
        subscribers.len()
    }
}

/// A live registration with [`PointerEvents`].
///
/// Dropping it deregisters the subscriber; the dispatcher prunes the dead
/// entry on its next pass.
#[derive(Debug)]
pub struct PointerSubscription {
    queue: Queue,
}

impl PointerSubscription {
    /// Take every event delivered since the last drain.
    pub fn drain(&self) -> Vec<PointerDown> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }
}
