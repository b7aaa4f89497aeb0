#![forbid(unsafe_code)]

//! Commands queued against the controller from inside observers.
//!
//! Observers only see `&self` while an event is being delivered, so they
//! cannot call the controller directly. A [`SheetCommands`] handle taken
//! from [`SheetController::commands`](crate::SheetController::commands)
//! lets a handler queue work instead. The controller runs queued commands
//! once the current fan-out has finished; events they raise start a fresh
//! fan-out.
//!
//! # Invariants
//!
//! 1. Commands run in the order they were queued.
//! 2. A command never runs while an event is being delivered.
//!
//! # Failure Modes
//!
//! - Commands queued outside an operation wait for the next controller call.
//! - A failing command is logged at `warn` and dropped.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use sheetkit_core::state::{SheetState, StateChangeReason};

use crate::content::{ContentId, ContentRef};

/// A deferred controller operation.
pub enum SheetCommand {
    ShowContent {
        content: ContentRef,
        animate: bool,
    },
    HideContent {
        id: ContentId,
        animate: bool,
    },
    SetSheetState {
        state: SheetState,
        animate: bool,
        reason: StateChangeReason,
    },
    ExpandSheet,
}

impl SheetCommand {
    /// Short name for log fields.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ShowContent { .. } => "show_content",
            Self::HideContent { .. } => "hide_content",
            Self::SetSheetState { .. } => "set_sheet_state",
            Self::ExpandSheet => "expand_sheet",
        }
    }
}

impl fmt::Debug for SheetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShowContent { content, animate } => f
                .debug_struct("ShowContent")
                .field("id", &content.id())
                .field("animate", animate)
                .finish(),
            Self::HideContent { id, animate } => f
                .debug_struct("HideContent")
                .field("id", id)
                .field("animate", animate)
                .finish(),
            Self::SetSheetState {
                state,
                animate,
                reason,
            } => f
                .debug_struct("SetSheetState")
                .field("state", state)
                .field("animate", animate)
                .field("reason", reason)
                .finish(),
            Self::ExpandSheet => f.write_str("ExpandSheet"),
        }
    }
}

/// Shared handle to the controller's command queue.
///
/// Cloning is cheap; every clone feeds the same queue.
#[derive(Clone, Default)]
pub struct SheetCommands {
    queue: Rc<RefCell<VecDeque<SheetCommand>>>,
}

impl SheetCommands {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, command: SheetCommand) {
        self.queue.borrow_mut().push_back(command);
    }

    pub fn show_content(&self, content: ContentRef, animate: bool) {
        self.push(SheetCommand::ShowContent { content, animate });
    }

    pub fn hide_content(&self, id: ContentId, animate: bool) {
        self.push(SheetCommand::HideContent { id, animate });
    }

    pub fn set_sheet_state(&self, state: SheetState, animate: bool, reason: StateChangeReason) {
        self.push(SheetCommand::SetSheetState {
            state,
            animate,
            reason,
        });
    }

    pub fn expand_sheet(&self) {
        self.push(SheetCommand::ExpandSheet);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    pub(crate) fn pop(&self) -> Option<SheetCommand> {
        self.queue.borrow_mut().pop_front()
    }
}

impl fmt::Debug for SheetCommands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetCommands")
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_queue_in_order() {
        let commands = SheetCommands::new();
        let handle = commands.clone();
        handle.expand_sheet();
        commands.set_sheet_state(SheetState::Full, false, StateChangeReason::None);
        assert_eq!(commands.len(), 2);

        let names: Vec<&str> = std::iter::from_fn(|| commands.pop())
            .map(|c| c.name())
            .collect();
        assert_eq!(names, vec!["expand_sheet", "set_sheet_state"]);
        assert!(handle.is_empty());
    }

    #[test]
    fn debug_reports_pending_count() {
        let commands = SheetCommands::new();
        commands.hide_content(ContentId::new(), true);
        assert!(format!("{commands:?}").contains("pending: 1"));
    }
}
