#![forbid(unsafe_code)]

//! Pointer velocity estimation.
//!
//! Keeps a short ring of recent samples and estimates velocity from the
//! oldest and newest samples inside a trailing window. Samples outside the
//! window are dropped on insertion, so a pause before release reads as zero
//! velocity.

use std::collections::VecDeque;

use web_time::{Duration, Instant};

/// Trailing window used for the estimate.
pub const DEFAULT_VELOCITY_WINDOW: Duration = Duration::from_millis(100);

const MAX_SAMPLES: usize = 20;

#[derive(Debug, Clone, Copy)]
struct Sample {
    x: f32,
    y: f32,
    time: Instant,
}

/// Screen-space velocity in px/s. Positive `y` is downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone)]
pub struct VelocityTracker {
    samples: VecDeque<Sample>,
    window: Duration,
}

impl VelocityTracker {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            samples: VecDeque::with_capacity(MAX_SAMPLES),
            window,
        }
    }

    /// Record a sample. Samples older than the window are discarded.
    pub fn add(&mut self, x: f32, y: f32, time: Instant) {
        if self.samples.len() == MAX_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back(Sample { x, y, time });
        while let Some(front) = self.samples.front() {
            if time.saturating_duration_since(front.time) > self.window {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Current estimate, or zero with fewer than two samples.
    #[must_use]
    pub fn velocity(&self) -> Velocity {
        let (Some(first), Some(last)) = (self.samples.front(), self.samples.back()) else {
            return Velocity::default();
        };
        let dt = last.time.saturating_duration_since(first.time).as_secs_f32();
        if dt <= 0.0 {
            return Velocity::default();
        }
        Velocity {
            x: (last.x - first.x) / dt,
            y: (last.y - first.y) / dt,
        }
    }
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::new(DEFAULT_VELOCITY_WINDOW)
    }
}
