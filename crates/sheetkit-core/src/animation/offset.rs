#![forbid(unsafe_code)]

//! Offset animation: interpolates a pixel offset between two values.
//!
//! # Invariants
//!
//! 1. `value()` is in [0.0, 1.0]; `offset()` lies between start and end.
//! 2. Elapsed time never exceeds the duration; the excess is reported by
//!    `overshoot()`.
//! 3. A zero duration is complete immediately and reports the end offset.

use web_time::Duration;

use super::{Animation, EasingFn, decelerate};

/// An interruptible transition of the sheet offset.
#[derive(Debug, Clone, Copy)]
pub struct OffsetAnimation {
    start: f32,
    end: f32,
    duration: Duration,
    elapsed: Duration,
    overshoot: Duration,
    easing: EasingFn,
}

impl OffsetAnimation {
    /// Animate from `start` to `end` over `duration` with a decelerating curve.
    #[must_use]
    pub fn new(start: f32, end: f32, duration: Duration) -> Self {
        Self {
            start,
            end,
            duration,
            elapsed: Duration::ZERO,
            overshoot: Duration::ZERO,
            easing: decelerate,
        }
    }

    /// Replace the easing curve (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> f32 {
        self.start
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> f32 {
        self.end
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Current interpolated offset.
    #[must_use]
    pub fn offset(&self) -> f32 {
        if self.is_complete() {
            return self.end;
        }
        self.start + (self.end - self.start) * self.value()
    }

    fn linear_progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0) as f32
    }
}

impl Animation for OffsetAnimation {
    fn tick(&mut self, dt: Duration) {
        let next = self.elapsed.saturating_add(dt);
        if next > self.duration {
            self.overshoot = next - self.duration;
            self.elapsed = self.duration;
        } else {
            self.overshoot = Duration::ZERO;
            self.elapsed = next;
        }
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        (self.easing)(self.linear_progress())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.overshoot = Duration::ZERO;
    }

    fn overshoot(&self) -> Duration {
        self.overshoot
    }
}
