#![forbid(unsafe_code)]

//! Canonical pointer event types.
//!
//! # Design Notes
//!
//! - Coordinates are raw container-space pixels, never sheet-local. The
//!   sheet translates while it is dragged, so sheet-local positions would
//!   feed back into the drag distance.
//! - The y axis grows downward, so an upward drag has a negative `dy`.
//! - Timestamps are supplied by the caller so interpretation is
//!   deterministic under test.

use web_time::Instant;

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// First contact.
    Down,
    /// Contact moved.
    Move,
    /// Contact lifted.
    Up,
    /// The host took the stream away (e.g. a parent intercepted it).
    Cancel,
}

/// A single pointer sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
    pub time: Instant,
}

impl PointerEvent {
    #[must_use]
    pub const fn new(kind: PointerKind, x: f32, y: f32, time: Instant) -> Self {
        Self { kind, x, y, time }
    }

    #[must_use]
    pub const fn down(x: f32, y: f32, time: Instant) -> Self {
        Self::new(PointerKind::Down, x, y, time)
    }

    #[must_use]
    pub const fn moved(x: f32, y: f32, time: Instant) -> Self {
        Self::new(PointerKind::Move, x, y, time)
    }

    #[must_use]
    pub const fn up(x: f32, y: f32, time: Instant) -> Self {
        Self::new(PointerKind::Up, x, y, time)
    }

    #[must_use]
    pub const fn cancel(x: f32, y: f32, time: Instant) -> Self {
        Self::new(PointerKind::Cancel, x, y, time)
    }
}
