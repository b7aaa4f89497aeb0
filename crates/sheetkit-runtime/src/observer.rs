#![forbid(unsafe_code)]

//! Sheet events and observer fan-out.
//!
//! # Design
//!
//! The sheet never calls observers directly. It appends [`SheetEvent`]s to
//! an outbox, and the controller drains the outbox through an
//! [`ObserverSet`] after each operation. Observers therefore only ever see
//! `&self` and cannot re-enter the sheet mid-update. A handler that needs to
//! act on an event queues a command through
//! [`SheetCommands`](crate::SheetCommands); it runs once the current event
//! has reached every observer.
//!
//! # Invariants
//!
//! 1. An observer is registered at most once (by pointer identity).
//! 2. Observers are notified in registration order.
//! 3. An observer only receives events whose kind is in its `interests()`.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use sheetkit_core::state::{SheetState, StateChangeReason};

use crate::content::ContentId;

/// Notifications emitted by the sheet and the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetEvent {
    /// The sheet rose above its peek offset.
    Opened { reason: StateChangeReason },
    /// The sheet came back down to (or below) its peek offset.
    Closed { reason: StateChangeReason },
    /// The current state changed.
    StateChanged {
        state: SheetState,
        reason: StateChangeReason,
    },
    /// The offset changed. `fraction` is the peek→full progress.
    OffsetChanged { fraction: f32, offset: f32 },
    /// Peek→half progress, clamped to [0, 1].
    TransitionPeekToHalf { fraction: f32 },
    /// The displayed content changed (`None` when nothing is displayed).
    ContentChanged { content: Option<ContentId> },
}

impl SheetEvent {
    /// The kind flag for this event.
    #[must_use]
    pub const fn kind(&self) -> EventKinds {
        match self {
            Self::Opened { .. } => EventKinds::OPENED,
            Self::Closed { .. } => EventKinds::CLOSED,
            Self::StateChanged { .. } => EventKinds::STATE_CHANGED,
            Self::OffsetChanged { .. } => EventKinds::OFFSET_CHANGED,
            Self::TransitionPeekToHalf { .. } => EventKinds::PEEK_TO_HALF,
            Self::ContentChanged { .. } => EventKinds::CONTENT_CHANGED,
        }
    }
}

bitflags! {
    /// Event kinds an observer can subscribe to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventKinds: u8 {
        const OPENED          = 0b0000_0001;
        const CLOSED          = 0b0000_0010;
        const STATE_CHANGED   = 0b0000_0100;
        const OFFSET_CHANGED  = 0b0000_1000;
        const PEEK_TO_HALF    = 0b0001_0000;
        const CONTENT_CHANGED = 0b0010_0000;
        /// Events that fire at most a few times per interaction.
        const DISCRETE = Self::OPENED.bits()
            | Self::CLOSED.bits()
            | Self::STATE_CHANGED.bits()
            | Self::CONTENT_CHANGED.bits();
    }
}

/// Receives sheet notifications.
pub trait SheetObserver {
    fn on_event(&self, event: &SheetEvent);

    /// Kinds this observer wants. Defaults to everything.
    fn interests(&self) -> EventKinds {
        EventKinds::all()
    }
}

/// Ordered, de-duplicated observer registry.
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Rc<dyn SheetObserver>>,
}

impl ObserverSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Returns false if it was already registered.
    pub fn add(&mut self, observer: Rc<dyn SheetObserver>) -> bool {
        if self.contains(&observer) {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Unregister an observer. Returns false if it was not registered.
    pub fn remove(&mut self, observer: &Rc<dyn SheetObserver>) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| !same_observer(o, observer));
        self.observers.len() != before
    }

    #[must_use]
    pub fn contains(&self, observer: &Rc<dyn SheetObserver>) -> bool {
        self.observers.iter().any(|o| same_observer(o, observer))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver one event to every interested observer.
    pub fn notify(&self, event: &SheetEvent) {
        let kind = event.kind();
        for observer in &self.observers {
            if observer.interests().intersects(kind) {
                observer.on_event(event);
            }
        }
    }
}

impl fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverSet")
            .field("observer_count", &self.observers.len())
            .finish()
    }
}

// Compare data addresses only; vtable pointers for the same object can differ
// across codegen units.
fn same_observer(a: &Rc<dyn SheetObserver>, b: &Rc<dyn SheetObserver>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}
