#![forbid(unsafe_code)]

//! The bottom sheet state machine.
//!
//! [`BottomSheet`] owns the geometry, the current offset, the settle
//! animation, and the gesture interpreter. It is driven by three inputs:
//!
//! - **Commands**: [`BottomSheet::set_sheet_state`] and friends.
//! - **Pointer events**: [`BottomSheet::handle_pointer`].
//! - **Frames**: [`BottomSheet::tick`] advances the settle animation.
//!
//! Every observable change is appended to an outbox as a [`SheetEvent`];
//! the owner drains it with [`BottomSheet::pop_event`] or
//! [`BottomSheet::take_events`].
//!
//! # Invariants
//!
//! 1. Exactly one current state. `target_sheet_state()` is `Some` only while
//!    a settle animation is running, and the current state is then
//!    `Scrolling`.
//! 2. `Scrolling` is never accepted as a target.
//! 3. Requesting the state the sheet already rests in is a no-op.
//! 4. `Opened` and `Closed` alternate, starting with `Opened`.
//! 5. After a `TransitionPeekToHalf` of 1.0, no further 1.0 is sent until
//!    the fraction drops below 1.0.
//!
//! # Failure Modes
//!
//! - Invalid layouts are rejected and logged; the previous geometry stays.
//! - Before the first valid layout, state requests only update the logical
//!   state. The offset follows on the next valid layout.
//! - A request made while a drag is claimed is deferred and replaces the
//!   drag's own settle target on release.

use std::collections::VecDeque;

use sheetkit_core::animation::{Animation, OffsetAnimation};
use sheetkit_core::event::{PointerEvent, PointerKind};
use sheetkit_core::geometry::{DEFAULT_HALF_RATIO, GeometryConfig, SheetGeometry, offsets_equal};
use sheetkit_core::gesture::{GestureConfig, GestureContext, GestureInterpreter, SheetGesture};
use sheetkit_core::settle::{BASE_ANIMATION_DURATION, SettleThresholds, resolve_target_state};
use sheetkit_core::state::{SheetState, StateChangeReason};
use tracing::{debug, trace, warn};
use web_time::Duration;

use crate::error::SheetError;
use crate::observer::SheetEvent;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunables for a [`BottomSheet`].
#[derive(Debug, Clone)]
pub struct SheetConfig {
    /// Half state as a ratio of the container height (default: 0.55).
    pub half_ratio: f32,
    /// Settle thresholds (default: 0.5 / 0.3).
    pub thresholds: SettleThresholds,
    /// Settle animation length (default: 218ms).
    pub animation_duration: Duration,
    /// Gesture interpretation thresholds.
    pub gesture: GestureConfig,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            half_ratio: DEFAULT_HALF_RATIO,
            thresholds: SettleThresholds::default(),
            animation_duration: BASE_ANIMATION_DURATION,
            gesture: GestureConfig::default(),
        }
    }
}

impl SheetConfig {
    #[must_use]
    pub fn half_ratio(mut self, ratio: f32) -> Self {
        self.half_ratio = ratio;
        self
    }

    #[must_use]
    pub fn thresholds(mut self, thresholds: SettleThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    #[must_use]
    pub fn animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    #[must_use]
    pub fn gesture(mut self, gesture: GestureConfig) -> Self {
        self.gesture = gesture;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct DeferredRequest {
    state: SheetState,
    animate: bool,
    reason: StateChangeReason,
}

// ---------------------------------------------------------------------------
// BottomSheet
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct BottomSheet {
    config: SheetConfig,
    layout: GeometryConfig,
    geometry: Option<SheetGeometry>,
    current: SheetState,
    target: Option<SheetState>,
    offset: f32,
    animation: Option<OffsetAnimation>,
    animation_reason: StateChangeReason,
    deferred: Option<DeferredRequest>,
    gesture: GestureInterpreter,
    content_scroll_offset: f32,
    opened: bool,
    last_peek_to_half: f32,
    outbox: VecDeque<SheetEvent>,
}

impl BottomSheet {
    /// Create a hidden sheet with no layout yet.
    #[must_use]
    pub fn new(config: SheetConfig) -> Self {
        let gesture = GestureInterpreter::new(config.gesture.clone());
        Self {
            config,
            layout: GeometryConfig::default(),
            geometry: None,
            current: SheetState::Hidden,
            target: None,
            offset: 0.0,
            animation: None,
            animation_reason: StateChangeReason::None,
            deferred: None,
            gesture,
            content_scroll_offset: 0.0,
            opened: false,
            last_peek_to_half: 0.0,
            outbox: VecDeque::new(),
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn sheet_state(&self) -> SheetState {
        self.current
    }

    /// State the running settle animation is heading for.
    #[inline]
    #[must_use]
    pub fn target_sheet_state(&self) -> Option<SheetState> {
        self.target
    }

    /// Current offset from the container bottom, in px.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Whether the sheet is above its peek offset.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.opened
    }

    #[inline]
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Whether a drag currently owns the sheet.
    #[inline]
    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.gesture.is_scrolling()
    }

    #[inline]
    #[must_use]
    pub fn geometry(&self) -> Option<&SheetGeometry> {
        self.geometry.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> &GeometryConfig {
        &self.layout
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    // -- Layout -------------------------------------------------------------

    /// Apply a new layout.
    ///
    /// A valid layout cancels any animation and re-homes the offset to the
    /// logical state. During a drag the offset is only clamped.
    pub fn set_layout(&mut self, layout: GeometryConfig) -> Result<(), SheetError> {
        let geometry = match SheetGeometry::new(layout, self.config.half_ratio) {
            Ok(geometry) => geometry,
            Err(err) => {
                warn!(
                    target: "sheetkit.sheet",
                    error = %err,
                    container_height = layout.container_height,
                    "ignoring invalid sheet layout"
                );
                return Err(err.into());
            }
        };
        self.layout = layout;
        self.geometry = Some(geometry);
        debug!(
            target: "sheetkit.sheet",
            peek = geometry.peek_offset(),
            half = geometry.half_offset(),
            full = geometry.full_offset(),
            "sheet layout applied"
        );

        if self.gesture.is_scrolling() {
            let offset = geometry.clamp_offset(self.offset);
            self.set_offset(offset, StateChangeReason::None);
            return Ok(());
        }

        let logical = self.target.unwrap_or(self.current);
        self.stop_animation();
        let logical = if logical.is_stable() {
            logical
        } else {
            resolve_target_state(&geometry, self.offset, 0.0, &self.config.thresholds)
        };
        self.jump_to(logical, StateChangeReason::None);
        Ok(())
    }

    pub fn on_container_resized(&mut self, width: f32, height: f32) -> Result<(), SheetError> {
        let layout = GeometryConfig {
            container_width: width,
            container_height: height,
            ..self.layout
        };
        self.set_layout(layout)
    }

    pub fn on_toolbar_resized(&mut self, toolbar_height: f32) -> Result<(), SheetError> {
        let layout = GeometryConfig {
            toolbar_height,
            ..self.layout
        };
        self.set_layout(layout)
    }

    /// Scroll offset of the displayed content, consulted by gestures at full.
    pub fn set_content_scroll_offset(&mut self, scroll_offset: f32) {
        self.content_scroll_offset = scroll_offset;
    }

    // -- Commands -----------------------------------------------------------

    /// Move the sheet to `target`, optionally animated.
    pub fn set_sheet_state(
        &mut self,
        target: SheetState,
        animate: bool,
        reason: StateChangeReason,
    ) -> Result<(), SheetError> {
        if !target.is_stable() {
            warn!(target: "sheetkit.sheet", state = %target, "rejected sheet state request");
            return Err(SheetError::NotATargetState(target));
        }

        if self.gesture.is_scrolling() {
            debug!(
                target: "sheetkit.sheet",
                state = %target,
                reason = reason.as_str(),
                "deferring sheet state request until drag ends"
            );
            self.deferred = Some(DeferredRequest {
                state: target,
                animate,
                reason,
            });
            return Ok(());
        }

        // A non-animated request for the running target snaps to it.
        let already_there = match self.animation {
            Some(_) => animate && self.target == Some(target),
            None => self.current == target,
        };
        if already_there {
            return Ok(());
        }

        self.stop_animation();
        let Some(geometry) = self.geometry else {
            self.set_state(target, reason);
            return Ok(());
        };

        let end = geometry.state_offset(target).unwrap_or_default();
        if !animate || self.config.animation_duration.is_zero() || offsets_equal(self.offset, end)
        {
            self.jump_to(target, reason);
            return Ok(());
        }

        debug!(
            target: "sheetkit.sheet",
            from = self.offset,
            to = end,
            state = %target,
            reason = reason.as_str(),
            "sheet settle started"
        );
        self.target = Some(target);
        self.animation_reason = reason;
        self.animation = Some(OffsetAnimation::new(
            self.offset,
            end,
            self.config.animation_duration,
        ));
        self.set_state(SheetState::Scrolling, reason);
        Ok(())
    }

    /// Open to half, or to full when half is too close to full to be useful.
    pub fn expand(&mut self) -> Result<(), SheetError> {
        let target = match self.geometry {
            Some(geometry) if geometry.is_small_screen() => SheetState::Full,
            _ => SheetState::Half,
        };
        self.set_sheet_state(target, true, StateChangeReason::None)
    }

    pub fn collapse(&mut self, animate: bool) -> Result<(), SheetError> {
        self.set_sheet_state(SheetState::Peek, animate, StateChangeReason::None)
    }

    /// Collapse an open sheet. Returns whether the press was consumed.
    pub fn handle_back_press(&mut self) -> bool {
        if !self.opened {
            return false;
        }
        self.set_sheet_state(SheetState::Peek, true, StateChangeReason::BackPress)
            .is_ok()
    }

    /// Drop any gesture or animation and jump to `Hidden`.
    pub fn force_hidden(&mut self, reason: StateChangeReason) {
        self.gesture.reset();
        self.deferred = None;
        if self.current == SheetState::Hidden && self.animation.is_none() {
            return;
        }
        self.stop_animation();
        self.jump_to(SheetState::Hidden, reason);
    }

    /// Stop the settle animation and snap to its target. No-op when idle.
    pub fn cancel_animation(&mut self) {
        let reason = self.animation_reason;
        if let Some(target) = self.stop_animation() {
            self.jump_to(target, reason);
        }
    }

    /// Advance the settle animation. Returns whether another frame is needed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        animation.tick(dt);
        let offset = animation.offset();
        let complete = animation.is_complete();
        let reason = self.animation_reason;

        self.set_offset(offset, reason);
        if !complete {
            return true;
        }

        self.animation = None;
        if let Some(target) = self.target.take() {
            debug!(target: "sheetkit.sheet", state = %target, "sheet settle finished");
            self.set_state(target, reason);
        }
        false
    }

    // -- Input --------------------------------------------------------------

    /// Feed a pointer event. Returns whether the sheet consumed it.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        let Some(geometry) = self.geometry else {
            return false;
        };
        let ctx = GestureContext {
            geometry: &geometry,
            offset: self.offset,
            content_scroll_offset: self.content_scroll_offset,
            accepts_input: self.accepts_input(),
        };

        match self.gesture.process(event, &ctx) {
            None => event.kind == PointerKind::Down && self.gesture.is_tracking(),
            Some(SheetGesture::Delegated) => false,
            Some(SheetGesture::Drag { offset }) => {
                self.stop_animation();
                self.set_state(SheetState::Scrolling, StateChangeReason::Swipe);
                if offset != self.offset {
                    self.set_offset(offset, StateChangeReason::Swipe);
                }
                true
            }
            Some(SheetGesture::Fling {
                projected,
                velocity,
            }) => {
                self.settle(projected, velocity);
                true
            }
            Some(SheetGesture::Release { offset, velocity }) => {
                self.settle(offset, velocity);
                true
            }
        }
    }

    // -- Outbox -------------------------------------------------------------

    /// Pop the oldest pending event.
    pub fn pop_event(&mut self) -> Option<SheetEvent> {
        self.outbox.pop_front()
    }

    /// Drain all pending events.
    pub fn take_events(&mut self) -> Vec<SheetEvent> {
        self.outbox.drain(..).collect()
    }

    #[inline]
    #[must_use]
    pub fn has_pending_events(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Queue an event raised on the sheet's behalf, keeping causal order.
    pub(crate) fn emit(&mut self, event: SheetEvent) {
        self.outbox.push_back(event);
    }
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

impl BottomSheet {
    fn accepts_input(&self) -> bool {
        self.current != SheetState::Hidden && self.target != Some(SheetState::Hidden)
    }

    /// Drop the animation and return the target it was heading for.
    fn stop_animation(&mut self) -> Option<SheetState> {
        self.animation = None;
        self.target.take()
    }

    fn settle(&mut self, height: f32, velocity: f32) {
        let request = match self.deferred.take() {
            Some(request) => request,
            None => {
                let Some(geometry) = self.geometry else {
                    return;
                };
                DeferredRequest {
                    state: resolve_target_state(
                        &geometry,
                        height,
                        velocity,
                        &self.config.thresholds,
                    ),
                    animate: true,
                    reason: StateChangeReason::Swipe,
                }
            }
        };
        debug!(
            target: "sheetkit.sheet",
            height,
            velocity,
            state = %request.state,
            "sheet released"
        );
        if let Err(err) = self.set_sheet_state(request.state, request.animate, request.reason) {
            warn!(target: "sheetkit.sheet", error = %err, "settle request failed");
        }
    }

    fn jump_to(&mut self, state: SheetState, reason: StateChangeReason) {
        if let Some(offset) = self.geometry.and_then(|g| g.state_offset(state)) {
            self.set_offset(offset, reason);
        }
        self.set_state(state, reason);
    }

    fn set_state(&mut self, state: SheetState, reason: StateChangeReason) {
        if self.current == state {
            return;
        }
        debug!(
            target: "sheetkit.sheet",
            from = %self.current,
            to = %state,
            reason = reason.as_str(),
            "sheet state changed"
        );
        self.current = state;
        self.outbox.push_back(SheetEvent::StateChanged { state, reason });
    }

    fn set_offset(&mut self, offset: f32, reason: StateChangeReason) {
        self.offset = offset;
        let Some(geometry) = self.geometry else {
            return;
        };

        let peek = geometry.peek_offset();
        let above_peek = offset > peek && !offsets_equal(offset, peek);
        if above_peek && !self.opened {
            self.opened = true;
            debug!(target: "sheetkit.sheet", reason = reason.as_str(), "sheet opened");
            self.outbox.push_back(SheetEvent::Opened { reason });
        } else if !above_peek && self.opened {
            self.opened = false;
            debug!(target: "sheetkit.sheet", reason = reason.as_str(), "sheet closed");
            self.outbox.push_back(SheetEvent::Closed { reason });
        }

        let fraction = geometry.peek_to_full_fraction(offset);
        trace!(target: "sheetkit.sheet", offset, fraction, "sheet offset");
        self.outbox
            .push_back(SheetEvent::OffsetChanged { fraction, offset });

        let peek_to_half = geometry.peek_to_half_fraction(offset);
        if self.last_peek_to_half < 1.0 || peek_to_half < 1.0 {
            self.last_peek_to_half = peek_to_half;
            self.outbox.push_back(SheetEvent::TransitionPeekToHalf {
                fraction: peek_to_half,
            });
        }
    }
}

impl Default for BottomSheet {
    fn default() -> Self {
        Self::new(SheetConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
