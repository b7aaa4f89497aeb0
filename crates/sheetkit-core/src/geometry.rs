#![forbid(unsafe_code)]

//! Geometry and ratio model.
//!
//! Maps container height, toolbar height and configured inset to the pixel
//! offset of each resting state. Offsets are measured from the bottom of the
//! container: `0` is fully hidden, `container_height` would be flush with the
//! top edge.
//!
//! # Invariants
//!
//! 1. A [`SheetGeometry`] only exists for a valid [`GeometryConfig`].
//! 2. Ratios are strictly ordered: `0 < peek < half < full <= 1`.
//! 3. Construction is pure; nothing is cached across layouts.
//!
//! # Failure Modes
//!
//! - Non-positive or non-finite container height: [`GeometryError::InvalidContainerHeight`].
//! - Toolbar taller than the half ratio, or inset eating past half: the
//!   ratios are not ordered and [`GeometryError::UnorderedRatios`] is returned.

use crate::state::SheetState;

/// Fixed ratio of the half state.
pub const DEFAULT_HALF_RATIO: f32 = 0.55;

/// Tolerance used when comparing pixel offsets.
pub const OFFSET_EPSILON: f32 = 0.001;

/// Tolerance-based float comparison for offsets.
#[inline]
#[must_use]
pub fn offsets_equal(a: f32, b: f32) -> bool {
    (a - b).abs() < OFFSET_EPSILON
}

/// Raw layout inputs, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeometryConfig {
    /// Height of the container the sheet is anchored in.
    pub container_height: f32,
    /// Width of the container.
    pub container_width: f32,
    /// Height of the sheet toolbar; also the peek height.
    pub toolbar_height: f32,
    /// Gap kept between the fully expanded sheet and the container top.
    pub full_height_inset: f32,
    /// Below this half→full distance the half state is skipped.
    pub min_half_full_distance: f32,
}

impl GeometryConfig {
    /// Create a config with the given container and toolbar heights.
    #[must_use]
    pub const fn new(container_width: f32, container_height: f32, toolbar_height: f32) -> Self {
        Self {
            container_height,
            container_width,
            toolbar_height,
            full_height_inset: 0.0,
            min_half_full_distance: 0.0,
        }
    }

    /// Set the top inset (builder pattern).
    #[must_use]
    pub const fn full_height_inset(mut self, inset: f32) -> Self {
        self.full_height_inset = inset;
        self
    }

    /// Set the small-screen threshold (builder pattern).
    #[must_use]
    pub const fn min_half_full_distance(mut self, distance: f32) -> Self {
        self.min_half_full_distance = distance;
        self
    }
}

/// Errors produced while validating a [`GeometryConfig`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("container height must be positive and finite, got {0}")]
    InvalidContainerHeight(f32),
    #[error("toolbar height must be non-negative and finite, got {0}")]
    InvalidToolbarHeight(f32),
    #[error("full height inset must be non-negative and finite, got {0}")]
    InvalidInset(f32),
    #[error("half ratio must be in (0, 1), got {0}")]
    InvalidHalfRatio(f32),
    #[error("state ratios must satisfy 0 < peek < half < full <= 1, got peek={peek} half={half} full={full}")]
    UnorderedRatios { peek: f32, half: f32, full: f32 },
}

/// Ratios of the container height for each open state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateRatios {
    pub peek: f32,
    pub half: f32,
    pub full: f32,
}

impl StateRatios {
    /// Compute the ratios for a config. Does not validate ordering.
    #[must_use]
    pub fn compute(config: &GeometryConfig, half_ratio: f32) -> Self {
        let height = config.container_height;
        Self {
            peek: config.toolbar_height / height,
            half: half_ratio,
            full: (height - config.full_height_inset) / height,
        }
    }

    /// Ratio for a state. `Hidden` is 0; `Scrolling` has no ratio.
    #[must_use]
    pub const fn get(&self, state: SheetState) -> Option<f32> {
        match state {
            SheetState::Hidden => Some(0.0),
            SheetState::Peek => Some(self.peek),
            SheetState::Half => Some(self.half),
            SheetState::Full => Some(self.full),
            SheetState::Scrolling => None,
        }
    }

    fn is_ordered(&self) -> bool {
        0.0 < self.peek && self.peek < self.half && self.half < self.full && self.full <= 1.0
    }
}

/// Validated geometry: ratios plus derived pixel offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetGeometry {
    config: GeometryConfig,
    ratios: StateRatios,
}

impl SheetGeometry {
    /// Validate a config and derive its state offsets.
    pub fn new(config: GeometryConfig, half_ratio: f32) -> Result<Self, GeometryError> {
        if !config.container_height.is_finite() || config.container_height <= 0.0 {
            return Err(GeometryError::InvalidContainerHeight(config.container_height));
        }
        if !config.toolbar_height.is_finite() || config.toolbar_height < 0.0 {
            return Err(GeometryError::InvalidToolbarHeight(config.toolbar_height));
        }
        if !config.full_height_inset.is_finite() || config.full_height_inset < 0.0 {
            return Err(GeometryError::InvalidInset(config.full_height_inset));
        }
        if !(half_ratio > 0.0 && half_ratio < 1.0) {
            return Err(GeometryError::InvalidHalfRatio(half_ratio));
        }

        let ratios = StateRatios::compute(&config, half_ratio);
        if !ratios.is_ordered() {
            return Err(GeometryError::UnorderedRatios {
                peek: ratios.peek,
                half: ratios.half,
                full: ratios.full,
            });
        }

        Ok(Self { config, ratios })
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &GeometryConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub const fn ratios(&self) -> &StateRatios {
        &self.ratios
    }

    #[inline]
    #[must_use]
    pub const fn container_height(&self) -> f32 {
        self.config.container_height
    }

    /// Pixel offset of a state, or `None` for `Scrolling`.
    #[must_use]
    pub fn state_offset(&self, state: SheetState) -> Option<f32> {
        self.ratios
            .get(state)
            .map(|ratio| ratio * self.config.container_height)
    }

    /// Offset of the peek state; the lowest offset a drag can reach.
    #[inline]
    #[must_use]
    pub fn peek_offset(&self) -> f32 {
        self.ratios.peek * self.config.container_height
    }

    #[inline]
    #[must_use]
    pub fn half_offset(&self) -> f32 {
        self.ratios.half * self.config.container_height
    }

    /// Offset of the full state; the highest offset a drag can reach.
    #[inline]
    #[must_use]
    pub fn full_offset(&self) -> f32 {
        self.ratios.full * self.config.container_height
    }

    /// Whether the half state is too close to full to be worth stopping at.
    #[must_use]
    pub fn is_small_screen(&self) -> bool {
        self.full_offset() - self.half_offset() < self.config.min_half_full_distance
    }

    /// Clamp an offset into the draggable range.
    #[must_use]
    pub fn clamp_offset(&self, offset: f32) -> f32 {
        offset.clamp(self.peek_offset(), self.full_offset())
    }

    /// Y coordinate of the sheet's top edge, in container space.
    #[inline]
    #[must_use]
    pub fn sheet_top(&self, offset: f32) -> f32 {
        self.config.container_height - offset
    }

    /// Whether a container-space y coordinate lies on the sheet toolbar.
    #[must_use]
    pub fn is_in_toolbar(&self, offset: f32, y: f32) -> bool {
        let top = self.sheet_top(offset);
        y >= top && y < top + self.config.toolbar_height
    }

    /// Fraction of the way from peek to full, clamped to [0, 1].
    #[must_use]
    pub fn peek_to_full_fraction(&self, offset: f32) -> f32 {
        fraction_between(offset, self.peek_offset(), self.full_offset())
    }

    /// Fraction of the way from peek to half, clamped to [0, 1].
    #[must_use]
    pub fn peek_to_half_fraction(&self, offset: f32) -> f32 {
        fraction_between(offset, self.peek_offset(), self.half_offset())
    }
}

fn fraction_between(value: f32, low: f32, high: f32) -> f32 {
    let span = high - low;
    if span <= 0.0 {
        return 0.0;
    }
    ((value - low) / span).clamp(0.0, 1.0)
}
