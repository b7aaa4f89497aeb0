#![forbid(unsafe_code)]

//! Error types for sheet operations.

use sheetkit_core::geometry::GeometryError;
use sheetkit_core::state::SheetState;

/// Errors returned by the sheet state machine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SheetError {
    /// `Scrolling` (and only `Scrolling`) cannot be requested as a target.
    #[error("{0} is not a valid target state")]
    NotATargetState(SheetState),
    /// A layout change produced geometry that cannot be applied.
    #[error("invalid sheet geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),
}
