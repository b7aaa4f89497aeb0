#![forbid(unsafe_code)]

//! Counting observer for sheet instrumentation.
//!
//! [`SheetMetrics`] registers like any other observer and tallies discrete
//! events. Read a copy with [`SheetMetrics::stats`].

use std::cell::RefCell;

use sheetkit_core::state::SheetState;
use tracing::debug;

use crate::observer::{EventKinds, SheetEvent, SheetObserver};

/// Event totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetStats {
    /// Times the sheet rose above peek.
    pub opened: u64,
    /// Times the sheet came back down to peek or below.
    pub closed: u64,
    /// Entries into each state, indexed by [`state_index`].
    pub state_entries: [u64; 5],
    /// Displayed-content changes, including changes to nothing.
    pub content_changes: u64,
}

impl SheetStats {
    /// Times `state` was entered.
    #[must_use]
    pub fn entries(&self, state: SheetState) -> u64 {
        self.state_entries[state_index(state)]
    }

    /// Total state changes observed.
    #[must_use]
    pub fn total_state_changes(&self) -> u64 {
        self.state_entries.iter().sum()
    }
}

/// Stable index of a state in [`SheetStats::state_entries`].
#[must_use]
pub const fn state_index(state: SheetState) -> usize {
    match state {
        SheetState::Hidden => 0,
        SheetState::Peek => 1,
        SheetState::Half => 2,
        SheetState::Full => 3,
        SheetState::Scrolling => 4,
    }
}

#[derive(Debug, Default)]
pub struct SheetMetrics {
    stats: RefCell<SheetStats>,
}

impl SheetMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stats(&self) -> SheetStats {
        self.stats.borrow().clone()
    }

    pub fn reset(&self) {
        *self.stats.borrow_mut() = SheetStats::default();
    }
}

impl SheetObserver for SheetMetrics {
    fn on_event(&self, event: &SheetEvent) {
        let mut stats = self.stats.borrow_mut();
        match *event {
            SheetEvent::Opened { reason } => {
                stats.opened += 1;
                debug!(
                    target: "sheetkit.metrics",
                    opened_total = stats.opened,
                    reason = reason.as_str(),
                    "sheet opened"
                );
            }
            SheetEvent::Closed { reason } => {
                stats.closed += 1;
                debug!(
                    target: "sheetkit.metrics",
                    closed_total = stats.closed,
                    reason = reason.as_str(),
                    "sheet closed"
                );
            }
            SheetEvent::StateChanged { state, .. } => {
                stats.state_entries[state_index(state)] += 1;
            }
            SheetEvent::ContentChanged { .. } => {
                stats.content_changes += 1;
            }
            SheetEvent::OffsetChanged { .. } | SheetEvent::TransitionPeekToHalf { .. } => {}
        }
    }

    fn interests(&self) -> EventKinds {
        EventKinds::DISCRETE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetkit_core::state::StateChangeReason;

    #[test]
    fn counts_discrete_events() {
        let metrics = SheetMetrics::new();
        metrics.on_event(&SheetEvent::Opened {
            reason: StateChangeReason::Swipe,
        });
        metrics.on_event(&SheetEvent::StateChanged {
            state: SheetState::Half,
            reason: StateChangeReason::Swipe,
        });
        metrics.on_event(&SheetEvent::StateChanged {
            state: SheetState::Half,
            reason: StateChangeReason::None,
        });
        metrics.on_event(&SheetEvent::ContentChanged { content: None });

        let stats = metrics.stats();
        assert_eq!(stats.opened, 1);
        assert_eq!(stats.closed, 0);
        assert_eq!(stats.entries(SheetState::Half), 2);
        assert_eq!(stats.total_state_changes(), 2);
        assert_eq!(stats.content_changes, 1);

        metrics.reset();
        assert_eq!(metrics.stats(), SheetStats::default());
    }

    #[test]
    fn ignores_continuous_events() {
        let metrics = SheetMetrics::new();
        assert!(!metrics.interests().contains(EventKinds::OFFSET_CHANGED));
        metrics.on_event(&SheetEvent::OffsetChanged {
            fraction: 0.5,
            offset: 10.0,
        });
        assert_eq!(metrics.stats(), SheetStats::default());
    }
}
