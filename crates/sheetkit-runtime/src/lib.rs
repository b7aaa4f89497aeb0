#![forbid(unsafe_code)]

//! sheetkit Runtime
//!
//! This crate ties the pure pieces of `sheetkit-core` into a working bottom
//! sheet: a state machine with animated, interruptible transitions and a
//! controller that decides which content occupies it.
//!
//! # Key Components
//!
//! - [`BottomSheet`] - State machine: offsets, settle animation, gestures
//! - [`SheetController`] - Priority scheduling, preemption, suppression
//! - [`SheetContent`] - Trait content is consumed through
//! - [`SheetObserver`] - Receives [`SheetEvent`] notifications
//! - [`SheetCommands`] - Queue observers use to drive the controller
//! - [`SheetMetrics`] - Counting observer
//! - [`SheetPolicy`] - Policy-as-data configuration
//!
//! # Threading
//! Everything here is single-threaded and `Rc`-based. The host drives the
//! controller from its UI thread: pointer events in, `tick(dt)` per frame.

pub mod command;
pub mod content;
pub mod content_queue;
pub mod controller;
pub mod error;
pub mod metrics;
pub mod observer;
pub mod policy_config;
pub mod sheet;
pub mod suppression;

pub use command::{SheetCommand, SheetCommands};
pub use content::{ContentId, ContentRef, SheetContent, SurfaceId};
pub use controller::{AnchorId, SheetController};
pub use error::SheetError;
pub use metrics::{SheetMetrics, SheetStats};
pub use observer::{EventKinds, ObserverSet, SheetEvent, SheetObserver};
pub use policy_config::{PolicyConfigError, SheetPolicy};
pub use sheet::{BottomSheet, SheetConfig};
pub use suppression::{SuppressionSignal, SuppressionToken};

pub use sheetkit_core::state::{SheetState, StateChangeReason};
