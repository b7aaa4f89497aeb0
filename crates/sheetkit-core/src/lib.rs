#![forbid(unsafe_code)]

//! Core: sheet geometry, settle rules, pointer interpretation, and animation.
//!
//! # Role in sheetkit
//! `sheetkit-core` holds the pure, host-independent parts of a draggable
//! bottom sheet. Nothing here owns content, observers, or a clock; callers
//! feed pointer events and frame deltas in and read offsets and targets out.
//!
//! # Primary responsibilities
//! - **SheetGeometry**: state ratios and pixel offsets for a container.
//! - **Settle rules**: fling projection and target-state resolution.
//! - **GestureInterpreter**: claims, delegates, and classifies pointer input.
//! - **OffsetAnimation**: frame-ticked offset transitions.
//!
//! # How it fits in the system
//! The runtime (`sheetkit-runtime`) wraps these pieces in the sheet state
//! machine and the content controller, and fans their events out to
//! observers.

pub mod animation;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod settle;
pub mod state;
pub mod velocity;

pub use event::{PointerEvent, PointerKind};
pub use geometry::{GeometryConfig, GeometryError, SheetGeometry, StateRatios};
pub use gesture::{GestureConfig, GestureContext, GestureInterpreter, SheetGesture};
pub use settle::{SettleThresholds, resolve_target_state};
pub use state::{SheetState, StateChangeReason};
