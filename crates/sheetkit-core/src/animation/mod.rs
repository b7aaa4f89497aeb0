#![forbid(unsafe_code)]

//! Frame-driven animation primitives.
//!
//! Animations never sleep or own a timer. The owner advances them with
//! [`Animation::tick`] from its frame callback and cancels them by dropping
//! the value.

mod offset;

pub use offset::OffsetAnimation;

use web_time::Duration;

/// An easing curve mapping linear progress in [0, 1] to eased progress.
pub type EasingFn = fn(f32) -> f32;

/// A value that advances with time.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Eased progress in [0.0, 1.0].
    fn value(&self) -> f32;

    /// Rewind to the start.
    fn reset(&mut self);

    /// Time consumed past the end by the last tick.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

/// Identity curve.
#[inline]
#[must_use]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic deceleration: fast start, gentle landing.
#[inline]
#[must_use]
pub fn decelerate(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    1.0 - inv * inv
}

/// Cubic deceleration, for stronger landings.
#[inline]
#[must_use]
pub fn decelerate_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}
