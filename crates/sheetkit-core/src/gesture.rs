#![forbid(unsafe_code)]

//! Gesture interpretation: turns raw pointer events into sheet motion.
//!
//! [`GestureInterpreter`] is a stateful processor. Each [`PointerEvent`] is
//! interpreted against a [`GestureContext`] snapshot of the sheet and yields
//! at most one [`SheetGesture`].
//!
//! # State Machine
//!
//! ```text
//! Idle ──down──▶ Pending ──vertical move past slop──▶ Scrolling ◀──move (Drag)
//!                   │                                     │
//!                   ├──horizontal move──▶ (delegated)     ├──up (fast)──▶ Fling
//!                   └──boundary rule──▶ (delegated)       └──up / cancel──▶ Release
//! ```
//!
//! # Invariants
//!
//! 1. Once a gesture is claimed it stays claimed for the rest of the
//!    gesture; the slope test is not repeated.
//! 2. `Drag` offsets are always within `[peek_offset, full_offset]`.
//! 3. `Fling` and `Release` are emitted only on up or cancel of a claimed
//!    gesture, and `is_scrolling()` is already false when they are returned.
//! 4. After `reset()`, the interpreter is idle.
//!
//! # Failure Modes
//!
//! - A gesture that starts outside the sheet, or while the sheet does not
//!   accept input, is ignored until the next down.
//! - A claimed drag pushed past either end is pinned there until the pointer
//!   lifts; the boundary and content-scroll rules only apply before the claim.

use web_time::Duration;

use crate::event::{PointerEvent, PointerKind};
use crate::geometry::{SheetGeometry, offsets_equal};
use crate::settle::{BASE_ANIMATION_DURATION, projected_height};
use crate::velocity::{DEFAULT_VELOCITY_WINDOW, VelocityTracker};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Minimum `|dy| / |dx|` for a move to count as vertical.
pub const MIN_VERTICAL_SLOPE: f32 = 2.0;

/// Thresholds for gesture interpretation.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Minimum `|dy| / |dx|` before the sheet claims a gesture (default: 2.0).
    pub min_vertical_slope: f32,
    /// Distance in px a pointer travels before it is classified (default: 8).
    pub touch_slop: f32,
    /// Release speed in px/s at or above which a release is a fling (default: 50).
    pub min_fling_velocity: f32,
    /// Trailing window for velocity estimation (default: 100ms).
    pub velocity_window: Duration,
    /// Horizon of the fling projection (default: 218ms).
    pub fling_duration: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_vertical_slope: MIN_VERTICAL_SLOPE,
            touch_slop: 8.0,
            min_fling_velocity: 50.0,
            velocity_window: DEFAULT_VELOCITY_WINDOW,
            fling_duration: BASE_ANIMATION_DURATION,
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// What the interpreter needs to know about the sheet for one event.
#[derive(Debug, Clone, Copy)]
pub struct GestureContext<'a> {
    pub geometry: &'a SheetGeometry,
    /// Current sheet offset in px.
    pub offset: f32,
    /// Scroll offset of the displayed content; > 0 means it can scroll up.
    pub content_scroll_offset: f32,
    /// False while the sheet is hidden or heading there.
    pub accepts_input: bool,
}

/// Sheet motion produced from a pointer event.
///
/// Velocities are height velocities in px/s (positive = growing).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetGesture {
    /// The move belongs to the content under the pointer.
    Delegated,
    /// Move the sheet to `offset`.
    Drag { offset: f32 },
    /// Settle based on where a fling would come to rest.
    Fling { projected: f32, velocity: f32 },
    /// Settle from the current offset.
    Release { offset: f32, velocity: f32 },
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct DownState {
    x: f32,
    y: f32,
    in_toolbar: bool,
}

// ---------------------------------------------------------------------------
// GestureInterpreter
// ---------------------------------------------------------------------------

/// Stateful pointer-to-sheet interpreter.
#[derive(Debug)]
pub struct GestureInterpreter {
    config: GestureConfig,
    tracker: VelocityTracker,
    down: Option<DownState>,
    last_y: f32,
    scrolling: bool,
}

impl GestureInterpreter {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        let tracker = VelocityTracker::new(config.velocity_window);
        Self {
            config,
            tracker,
            down: None,
            last_y: 0.0,
            scrolling: false,
        }
    }

    /// Interpret one pointer event.
    pub fn process(
        &mut self,
        event: &PointerEvent,
        ctx: &GestureContext<'_>,
    ) -> Option<SheetGesture> {
        match event.kind {
            PointerKind::Down => {
                self.on_down(event, ctx);
                None
            }
            PointerKind::Move => self.on_move(event, ctx),
            PointerKind::Up => self.on_up(event, ctx),
            PointerKind::Cancel => self.on_cancel(ctx),
        }
    }

    /// Whether the sheet currently owns the gesture.
    #[inline]
    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// Whether a gesture is being tracked at all.
    #[inline]
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.down.is_some()
    }

    /// Drop any gesture in progress.
    pub fn reset(&mut self) {
        self.down = None;
        self.scrolling = false;
        self.tracker.clear();
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GestureConfig) {
        self.tracker = VelocityTracker::new(config.velocity_window);
        self.config = config;
    }
}

// ---------------------------------------------------------------------------
// Internal event handlers
// ---------------------------------------------------------------------------

impl GestureInterpreter {
    fn on_down(&mut self, event: &PointerEvent, ctx: &GestureContext<'_>) {
        self.reset();
        if !ctx.accepts_input || event.y < ctx.geometry.sheet_top(ctx.offset) {
            return;
        }
        self.down = Some(DownState {
            x: event.x,
            y: event.y,
            in_toolbar: ctx.geometry.is_in_toolbar(ctx.offset, event.y),
        });
        self.last_y = event.y;
        self.tracker.add(event.x, event.y, event.time);
    }

    fn on_move(&mut self, event: &PointerEvent, ctx: &GestureContext<'_>) -> Option<SheetGesture> {
        let down = self.down?;
        self.tracker.add(event.x, event.y, event.time);
        let geometry = ctx.geometry;

        if self.scrolling {
            // Claimed: follow the finger, pinned to [peek, full].
            let height_delta = self.last_y - event.y;
            self.last_y = event.y;
            return Some(self.drag(geometry.clamp_offset(ctx.offset + height_delta)));
        }

        let dx = event.x - down.x;
        let dy = event.y - down.y;
        if dx.hypot(dy) < self.config.touch_slop {
            return None;
        }
        // Screen y grows downward; the sheet grows upward. Measured from the
        // last point the content saw, so the slop distance is not lost.
        let height_delta = self.last_y - event.y;
        self.last_y = event.y;
        if !self.is_vertical(dx, dy) {
            self.tracker.clear();
            return Some(SheetGesture::Delegated);
        }

        let at_max = offsets_equal(ctx.offset, geometry.full_offset());
        let at_min = offsets_equal(ctx.offset, geometry.peek_offset());
        let content_wants_scroll =
            at_max && !down.in_toolbar && ctx.content_scroll_offset > 0.0;
        let pushing_past_max = at_max && height_delta > 0.0;
        let pushing_past_min = at_min && height_delta < 0.0;
        if content_wants_scroll || pushing_past_max || pushing_past_min {
            return Some(SheetGesture::Delegated);
        }

        self.scrolling = true;
        Some(self.drag(geometry.clamp_offset(ctx.offset + height_delta)))
    }

    fn on_up(&mut self, event: &PointerEvent, ctx: &GestureContext<'_>) -> Option<SheetGesture> {
        if self.down.is_none() {
            return None;
        }
        self.tracker.add(event.x, event.y, event.time);
        let was_scrolling = self.scrolling;
        let velocity = -self.tracker.velocity().y;
        self.reset();
        if !was_scrolling {
            return None;
        }

        if velocity.abs() >= self.config.min_fling_velocity {
            let projected = projected_height(ctx.offset, velocity, self.config.fling_duration);
            tracing::debug!(
                target: "sheetkit.gesture",
                velocity,
                projected,
                "sheet fling"
            );
            Some(SheetGesture::Fling {
                projected,
                velocity,
            })
        } else {
            Some(SheetGesture::Release {
                offset: ctx.offset,
                velocity,
            })
        }
    }

    fn on_cancel(&mut self, ctx: &GestureContext<'_>) -> Option<SheetGesture> {
        let was_scrolling = self.scrolling;
        let velocity = -self.tracker.velocity().y;
        self.reset();
        was_scrolling.then_some(SheetGesture::Release {
            offset: ctx.offset,
            velocity,
        })
    }

    fn is_vertical(&self, dx: f32, dy: f32) -> bool {
        let dx = dx.abs();
        if dx == 0.0 {
            return dy != 0.0;
        }
        dy.abs() / dx >= self.config.min_vertical_slope
    }

    fn drag(&self, offset: f32) -> SheetGesture {
        tracing::trace!(target: "sheetkit.gesture", offset, "sheet drag");
        SheetGesture::Drag { offset }
    }
}

impl Default for GestureInterpreter {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
