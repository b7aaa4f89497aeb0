#![forbid(unsafe_code)]

//! Policy-as-data configuration for sheet behavior.
//!
//! Captures every tunable of the sheet (geometry ratios, settle thresholds,
//! gesture thresholds) as a single [`SheetPolicy`] that can be loaded from
//! TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # sheetkit-policy.toml
//! [geometry]
//! half_ratio = 0.6
//!
//! [gesture]
//! touch_slop = 12.0
//! ```
//!
//! ```rust,ignore
//! let policy = SheetPolicy::from_toml_file("sheetkit-policy.toml")?;
//! let policy = SheetPolicy::from_json_str(json)?;
//! let controller = SheetController::new(policy.to_sheet_config());
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the value the corresponding config type uses, so
//! `SheetPolicy::default().to_sheet_config()` behaves like
//! `SheetConfig::default()`.

#[cfg(feature = "policy-config")]
use std::path::Path;

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};

use sheetkit_core::geometry::{DEFAULT_HALF_RATIO, GeometryConfig};
use sheetkit_core::gesture::{GestureConfig, MIN_VERTICAL_SLOPE};
use sheetkit_core::settle::{
    BASE_ANIMATION_DURATION, SettleThresholds, THRESHOLD_TO_NEXT_STATE_2,
    THRESHOLD_TO_NEXT_STATE_3,
};
use sheetkit_core::velocity::DEFAULT_VELOCITY_WINDOW;
use web_time::Duration;

use crate::sheet::SheetConfig;

// ---------------------------------------------------------------------------
// Top-level SheetPolicy
// ---------------------------------------------------------------------------

/// Top-level policy for a sheet.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct SheetPolicy {
    /// Geometry ratios and layout thresholds.
    pub geometry: GeometryPolicyConfig,

    /// Settle thresholds and animation timing.
    pub settle: SettlePolicyConfig,

    /// Pointer interpretation thresholds.
    pub gesture: GesturePolicyConfig,
}

impl SheetPolicy {
    /// Load from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyConfigError> {
        toml::from_str(s).map_err(PolicyConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, PolicyConfigError> {
        serde_json::from_str(s).map_err(PolicyConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the policy
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.geometry.half_ratio > 0.0 && self.geometry.half_ratio < 1.0) {
            errors.push(format!(
                "geometry.half_ratio must be in (0, 1), got {}",
                self.geometry.half_ratio
            ));
        }
        if self.geometry.full_height_inset < 0.0 {
            errors.push(format!(
                "geometry.full_height_inset must be >= 0, got {}",
                self.geometry.full_height_inset
            ));
        }
        if self.geometry.min_half_full_distance < 0.0 {
            errors.push(format!(
                "geometry.min_half_full_distance must be >= 0, got {}",
                self.geometry.min_half_full_distance
            ));
        }

        for (name, value) in [
            ("settle.threshold_three_states", self.settle.threshold_three_states),
            ("settle.threshold_two_states", self.settle.threshold_two_states),
        ] {
            if !(value > 0.0 && value < 1.0) {
                errors.push(format!("{name} must be in (0, 1), got {value}"));
            }
        }

        if self.gesture.min_vertical_slope <= 0.0 {
            errors.push(format!(
                "gesture.min_vertical_slope must be > 0, got {}",
                self.gesture.min_vertical_slope
            ));
        }
        if self.gesture.touch_slop < 0.0 {
            errors.push(format!(
                "gesture.touch_slop must be >= 0, got {}",
                self.gesture.touch_slop
            ));
        }
        if self.gesture.min_fling_velocity < 0.0 {
            errors.push(format!(
                "gesture.min_fling_velocity must be >= 0, got {}",
                self.gesture.min_fling_velocity
            ));
        }
        if self.gesture.velocity_window_ms == 0 {
            errors.push("gesture.velocity_window_ms must be > 0".into());
        }

        errors
    }

    /// Validate, returning the policy or every problem found.
    pub fn validated(self) -> Result<Self, PolicyConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(PolicyConfigError::Validation(errors))
        }
    }

    /// Build a [`SettleThresholds`] from this policy.
    #[must_use]
    pub fn to_thresholds(&self) -> SettleThresholds {
        SettleThresholds {
            three_states: self.settle.threshold_three_states,
            two_states: self.settle.threshold_two_states,
        }
    }

    /// Build a [`GestureConfig`] from this policy.
    #[must_use]
    pub fn to_gesture_config(&self) -> GestureConfig {
        GestureConfig {
            min_vertical_slope: self.gesture.min_vertical_slope,
            touch_slop: self.gesture.touch_slop,
            min_fling_velocity: self.gesture.min_fling_velocity,
            velocity_window: Duration::from_millis(self.gesture.velocity_window_ms),
            fling_duration: Duration::from_millis(self.settle.animation_duration_ms),
        }
    }

    /// Build a [`SheetConfig`] from this policy.
    #[must_use]
    pub fn to_sheet_config(&self) -> SheetConfig {
        SheetConfig {
            half_ratio: self.geometry.half_ratio,
            thresholds: self.to_thresholds(),
            animation_duration: Duration::from_millis(self.settle.animation_duration_ms),
            gesture: self.to_gesture_config(),
        }
    }

    /// Apply the layout-level fields to a measured layout.
    #[must_use]
    pub fn apply_to_layout(&self, layout: GeometryConfig) -> GeometryConfig {
        layout
            .full_height_inset(self.geometry.full_height_inset)
            .min_half_full_distance(self.geometry.min_half_full_distance)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Geometry policy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct GeometryPolicyConfig {
    /// Half state as a ratio of the container height.
    pub half_ratio: f32,
    /// Gap in px between the full sheet and the container top.
    pub full_height_inset: f32,
    /// Below this half→full distance in px, half is skipped.
    pub min_half_full_distance: f32,
}

impl Default for GeometryPolicyConfig {
    fn default() -> Self {
        Self {
            half_ratio: DEFAULT_HALF_RATIO,
            full_height_inset: 0.0,
            min_half_full_distance: 0.0,
        }
    }
}

/// Settle policy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct SettlePolicyConfig {
    /// Advance threshold with peek, half, and full all active.
    pub threshold_three_states: f32,
    /// Advance threshold with half skipped.
    pub threshold_two_states: f32,
    /// Settle animation length and fling horizon, in ms.
    pub animation_duration_ms: u64,
}

impl Default for SettlePolicyConfig {
    fn default() -> Self {
        Self {
            threshold_three_states: THRESHOLD_TO_NEXT_STATE_3,
            threshold_two_states: THRESHOLD_TO_NEXT_STATE_2,
            animation_duration_ms: BASE_ANIMATION_DURATION.as_millis() as u64,
        }
    }
}

/// Gesture policy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct GesturePolicyConfig {
    pub min_vertical_slope: f32,
    /// Travel in px before a pointer is classified.
    pub touch_slop: f32,
    /// Release speed in px/s at or above which a release is a fling.
    pub min_fling_velocity: f32,
    /// Velocity estimation window, in ms.
    pub velocity_window_ms: u64,
}

impl Default for GesturePolicyConfig {
    fn default() -> Self {
        let gesture = GestureConfig::default();
        Self {
            min_vertical_slope: MIN_VERTICAL_SLOPE,
            touch_slop: gesture.touch_slop,
            min_fling_velocity: gesture.min_fling_velocity,
            velocity_window_ms: DEFAULT_VELOCITY_WINDOW.as_millis() as u64,
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a sheet policy.
#[derive(Debug, thiserror::Error)]
pub enum PolicyConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "policy-config")]
    #[error("TOML parse error: {0}")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "policy-config")]
    #[error("JSON parse error: {0}")]
    Json(serde_json::Error),
    /// Validation errors.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}
