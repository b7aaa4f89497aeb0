#![forbid(unsafe_code)]

//! Sheet state tags.
//!
//! # State Machine
//!
//! ```text
//!            ┌──────── Hidden ────────┐
//!            │   (from any state)     │
//!   Peek  ⇄  Half  ⇄  Full
//! ```
//!
//! `Scrolling` is the transient label used while a drag or a settle
//! animation is active. It is never a valid target and never the stable
//! state once interaction ends.

use std::fmt;

/// Resting and transient states of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SheetState {
    /// Fully below the container; nothing visible.
    #[default]
    Hidden,
    /// Only the toolbar strip is visible.
    Peek,
    /// Roughly half of the container.
    Half,
    /// Expanded to the top inset.
    Full,
    /// Dragging or settling. Transient.
    Scrolling,
}

impl SheetState {
    /// The open states, in ascending height order.
    pub const OPEN_STATES: [SheetState; 3] = [SheetState::Peek, SheetState::Half, SheetState::Full];

    /// Whether this state may be requested as a target.
    #[inline]
    #[must_use]
    pub const fn is_stable(self) -> bool {
        !matches!(self, Self::Scrolling)
    }

    /// Short lowercase label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Peek => "peek",
            Self::Half => "half",
            Self::Full => "full",
            Self::Scrolling => "scrolling",
        }
    }
}

impl fmt::Display for SheetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the sheet changed state. Forwarded to observers for instrumentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StateChangeReason {
    #[default]
    None,
    /// A drag or fling settled the sheet.
    Swipe,
    /// The host's back action collapsed the sheet.
    BackPress,
    /// The scrim behind the sheet was tapped.
    TapScrim,
    /// The anchoring context navigated or changed.
    Navigation,
    /// A higher-precedence UI suppressed the sheet.
    Suppressed,
    /// The displayed content was swapped.
    ContentChanged,
    /// The content finished its interaction and asked to close.
    InteractionComplete,
}

impl StateChangeReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Swipe => "swipe",
            Self::BackPress => "back_press",
            Self::TapScrim => "tap_scrim",
            Self::Navigation => "navigation",
            Self::Suppressed => "suppressed",
            Self::ContentChanged => "content_changed",
            Self::InteractionComplete => "interaction_complete",
        }
    }
}
