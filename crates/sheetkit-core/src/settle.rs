#![forbid(unsafe_code)]

//! Settle physics: fling projection and target-state resolution.
//!
//! Velocities in this module are *height* velocities in px/s: positive
//! means the sheet is growing (the pointer moves up the screen). Callers
//! holding a screen-space velocity negate it first.
//!
//! # Fling model
//!
//! A released sheet decelerates quadratically over the base animation
//! duration, so the extra distance travelled is `v * duration / 2`.
//!
//! # Resolution
//!
//! 1. Heights at or below peek resolve to `Peek`; at or above full to `Full`.
//! 2. `Half` is skipped when moving down or on small screens.
//! 3. The active states are walked to find the pair bracketing the height.
//! 4. The fraction travelled between the pair is compared with a threshold
//!    of 0.5 (three states) or 0.3 (two states), inverted when moving down.
//!
//! The two thresholds are tuned values and are kept as-is.

use web_time::Duration;

use crate::geometry::SheetGeometry;
use crate::state::SheetState;

/// Duration of a settle animation and the horizon of a fling projection.
pub const BASE_ANIMATION_DURATION: Duration = Duration::from_millis(218);

/// Threshold to advance when all three open states are active.
pub const THRESHOLD_TO_NEXT_STATE_3: f32 = 0.5;

/// Threshold to advance when half is skipped.
pub const THRESHOLD_TO_NEXT_STATE_2: f32 = 0.3;

/// Fractions past which a released sheet advances to the next state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleThresholds {
    /// Used when peek, half and full are all active.
    pub three_states: f32,
    /// Used when half is skipped.
    pub two_states: f32,
}

impl Default for SettleThresholds {
    fn default() -> Self {
        Self {
            three_states: THRESHOLD_TO_NEXT_STATE_3,
            two_states: THRESHOLD_TO_NEXT_STATE_2,
        }
    }
}

/// Extra distance a fling travels before coming to rest.
#[inline]
#[must_use]
pub fn fling_distance(velocity: f32, base_duration: Duration) -> f32 {
    velocity * base_duration.as_secs_f32() / 2.0
}

/// Height at which a fling starting at `offset` comes to rest.
#[inline]
#[must_use]
pub fn projected_height(offset: f32, velocity: f32, base_duration: Duration) -> f32 {
    offset + fling_distance(velocity, base_duration)
}

/// Whether the half state takes part in resolution for this velocity.
#[inline]
#[must_use]
pub fn should_skip_half(geometry: &SheetGeometry, velocity: f32) -> bool {
    velocity < 0.0 || geometry.is_small_screen()
}

/// Resolve the state a sheet at `height` moving at `velocity` settles into.
#[must_use]
pub fn resolve_target_state(
    geometry: &SheetGeometry,
    height: f32,
    velocity: f32,
    thresholds: &SettleThresholds,
) -> SheetState {
    if height <= geometry.peek_offset() {
        return SheetState::Peek;
    }
    if height >= geometry.full_offset() {
        return SheetState::Full;
    }

    let skip_half = should_skip_half(geometry, velocity);

    let mut prev = SheetState::Peek;
    let mut next = SheetState::Peek;
    for state in SheetState::OPEN_STATES {
        if skip_half && state == SheetState::Half {
            continue;
        }
        prev = next;
        next = state;
        if height >= offset_of(geometry, prev) && height < offset_of(geometry, next) {
            break;
        }
    }

    let lower = offset_of(geometry, prev);
    let distance = offset_of(geometry, next) - lower;
    if distance <= 0.0 {
        return prev;
    }

    let threshold = if skip_half {
        thresholds.two_states
    } else {
        thresholds.three_states
    };
    let threshold_to_next = if velocity < 0.0 {
        1.0 - threshold
    } else {
        threshold
    };

    if (height - lower) / distance > threshold_to_next {
        next
    } else {
        prev
    }
}

fn offset_of(geometry: &SheetGeometry, state: SheetState) -> f32 {
    geometry.state_offset(state).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{DEFAULT_HALF_RATIO, GeometryConfig};

    fn geometry() -> SheetGeometry {
        let config = GeometryConfig::new(600.0, 1000.0, 100.0).full_height_inset(50.0);
        SheetGeometry::new(config, DEFAULT_HALF_RATIO).unwrap()
    }

    fn small_screen() -> SheetGeometry {
        let config = GeometryConfig::new(600.0, 1000.0, 100.0)
            .full_height_inset(50.0)
            .min_half_full_distance(500.0);
        SheetGeometry::new(config, DEFAULT_HALF_RATIO).unwrap()
    }

    fn resolve(geo: &SheetGeometry, height: f32, velocity: f32) -> SheetState {
        resolve_target_state(geo, height, velocity, &SettleThresholds::default())
    }

    #[test]
    fn fling_distance_matches_quadratic_model() {
        let d = fling_distance(2000.0, BASE_ANIMATION_DURATION);
        assert!((d - 218.0).abs() < 1e-3);
        assert!((fling_distance(-2000.0, BASE_ANIMATION_DURATION) + 218.0).abs() < 1e-3);
    }

    #[test]
    fn upward_fling_from_half_reaches_full() {
        let geo = geometry();
        let height = projected_height(geo.half_offset(), 2000.0, BASE_ANIMATION_DURATION);
        assert!((height - 768.0).abs() < 1e-2);
        // (768 - 550) / 400 = 0.545 > 0.5
        assert_eq!(resolve(&geo, height, 2000.0), SheetState::Full);
    }

    #[test]
    fn at_or_below_peek_is_peek() {
        let geo = geometry();
        assert_eq!(resolve(&geo, 0.0, 5000.0), SheetState::Peek);
        assert_eq!(resolve(&geo, geo.peek_offset(), -5000.0), SheetState::Peek);
    }

    #[test]
    fn at_or_above_full_is_full() {
        let geo = geometry();
        assert_eq!(resolve(&geo, geo.full_offset(), -5000.0), SheetState::Full);
        assert_eq!(resolve(&geo, 2000.0, 0.0), SheetState::Full);
    }

    #[test]
    fn stationary_release_snaps_to_nearest_half_bracket() {
        let geo = geometry();
        // Between peek (100) and half (550): 0.889 > 0.5.
        assert_eq!(resolve(&geo, 500.0, 0.0), SheetState::Half);
        // 0.222 < 0.5.
        assert_eq!(resolve(&geo, 200.0, 0.0), SheetState::Peek);
        // Between half and full: (700 - 550) / 400 = 0.375 < 0.5.
        assert_eq!(resolve(&geo, 700.0, 0.0), SheetState::Half);
    }

    #[test]
    fn downward_motion_skips_half_with_inverted_threshold() {
        let geo = geometry();
        // Half skipped: bracket is (peek 100, full 950), threshold 1 - 0.3 = 0.7.
        // (700 - 100) / 850 = 0.706 > 0.7.
        assert_eq!(resolve(&geo, 700.0, -500.0), SheetState::Full);
        // (600 - 100) / 850 = 0.588 < 0.7.
        assert_eq!(resolve(&geo, 600.0, -500.0), SheetState::Peek);
        // Right at half while moving down never lands on half.
        assert_ne!(resolve(&geo, geo.half_offset(), -10.0), SheetState::Half);
    }

    #[test]
    fn small_screen_skips_half_moving_up() {
        let geo = small_screen();
        // (400 - 100) / 850 = 0.353 > 0.3
        assert_eq!(resolve(&geo, 400.0, 0.0), SheetState::Full);
        // (300 - 100) / 850 = 0.235 < 0.3
        assert_eq!(resolve(&geo, 300.0, 0.0), SheetState::Peek);
    }

    #[test]
    fn custom_thresholds_are_respected() {
        let geo = geometry();
        let strict = SettleThresholds {
            three_states: 0.95,
            two_states: 0.95,
        };
        assert_eq!(
            resolve_target_state(&geo, 500.0, 0.0, &strict),
            SheetState::Peek
        );
    }
}
