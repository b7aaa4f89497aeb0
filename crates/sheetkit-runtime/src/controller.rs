#![forbid(unsafe_code)]

//! Content scheduler: decides which content unit occupies the sheet.
//!
//! [`SheetController`] owns the [`BottomSheet`], the pending queue, the
//! suppression tokens, and the observer set. Feature code talks to the
//! controller only; the controller turns requests into sheet commands.
//!
//! # Event pump
//!
//! Every public operation ends by pumping the sheet outbox. Each event is
//! first delivered to observers, then the controller reacts to it:
//!
//! - `StateChanged(Hidden)` completes an in-flight hide and shows the next
//!   queued unit.
//! - `StateChanged(Peek)` lets a higher-priority queued unit preempt the
//!   displayed one.
//!
//! - A stable state other than `Hidden` while a hide is in flight resumes
//!   the hide.
//!
//! Reactions may queue further events; the pump runs until the outbox is
//! empty. Observers are never called while the controller is mid-update.
//! They queue follow-up work through [`SheetCommands`], which the pump runs
//! after the current fan-out, so each command starts a fresh fan-out.
//!
//! # Invariants
//!
//! 1. At most one unit is displayed; a unit is never both displayed and
//!    queued.
//! 2. At most one hide is in flight, and it always reaches `Hidden`: while
//!    it runs, requests for other states are ignored.
//! 3. While any suppression token is held the sheet is not reopened.
//! 4. `ContentChanged` fires only when the displayed unit changes.
//!
//! # Failure Modes
//!
//! - Requests with no anchor attached return `false` and are dropped.
//! - Hiding an unknown id returns `false` and logs at `warn`.

use std::rc::Rc;

use ahash::AHashSet;
use sheetkit_core::event::PointerEvent;
use sheetkit_core::geometry::GeometryConfig;
use sheetkit_core::state::{SheetState, StateChangeReason};
use tracing::{debug, warn};
use web_time::Duration;

use crate::command::{SheetCommand, SheetCommands};
use crate::content::{ContentId, ContentRef};
use crate::content_queue::ContentQueue;
use crate::error::SheetError;
use crate::observer::{ObserverSet, SheetEvent, SheetObserver};
use crate::sheet::{BottomSheet, SheetConfig};
use crate::suppression::{SuppressionKey, SuppressionSignal, SuppressionToken, SuppressionTokens};

/// Identity of the context (page, tab, window) the sheet is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorId(pub u64);

struct Displayed {
    content: ContentRef,
    seq: u64,
}

pub struct SheetController {
    sheet: BottomSheet,
    observers: ObserverSet,
    queue: ContentQueue,
    displayed: Option<Displayed>,
    full_show: AHashSet<ContentId>,
    hide_in_flight: Option<ContentId>,
    suppression: SuppressionTokens,
    anchor: Option<AnchorId>,
    commands: SheetCommands,
    pumping: bool,
}

impl SheetController {
    #[must_use]
    pub fn new(config: SheetConfig) -> Self {
        Self {
            sheet: BottomSheet::new(config),
            observers: ObserverSet::new(),
            queue: ContentQueue::new(),
            displayed: None,
            full_show: AHashSet::new(),
            hide_in_flight: None,
            suppression: SuppressionTokens::new(),
            anchor: None,
            commands: SheetCommands::new(),
            pumping: false,
        }
    }

    // -- Observers ------------------------------------------------------------

    pub fn add_observer(&mut self, observer: Rc<dyn SheetObserver>) -> bool {
        self.observers.add(observer)
    }

    pub fn remove_observer(&mut self, observer: &Rc<dyn SheetObserver>) -> bool {
        self.observers.remove(observer)
    }

    /// Handle for queueing operations from inside an observer.
    #[must_use]
    pub fn commands(&self) -> SheetCommands {
        self.commands.clone()
    }

    // -- Accessors ------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn sheet(&self) -> &BottomSheet {
        &self.sheet
    }

    #[inline]
    #[must_use]
    pub fn sheet_state(&self) -> SheetState {
        self.sheet.sheet_state()
    }

    #[inline]
    #[must_use]
    pub fn target_sheet_state(&self) -> Option<SheetState> {
        self.sheet.target_sheet_state()
    }

    #[must_use]
    pub fn displayed_content(&self) -> Option<&ContentRef> {
        self.displayed.as_ref().map(|d| &d.content)
    }

    #[must_use]
    pub fn displayed_id(&self) -> Option<ContentId> {
        self.displayed.as_ref().map(|d| d.content.id())
    }

    #[inline]
    #[must_use]
    pub fn queue(&self) -> &ContentQueue {
        &self.queue
    }

    #[inline]
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.suppression.is_suppressed()
    }

    #[inline]
    #[must_use]
    pub fn is_hiding(&self) -> bool {
        self.hide_in_flight.is_some()
    }

    #[inline]
    #[must_use]
    pub fn anchor(&self) -> Option<AnchorId> {
        self.anchor
    }

    /// Whether an anchor is set and not currently detached.
    #[must_use]
    pub fn is_anchor_attached(&self) -> bool {
        self.anchor.is_some() && !self.suppression.holds(SuppressionKey::AnchorDetached)
    }

    // -- Content requests -----------------------------------------------------

    /// Ask for `content` to be shown.
    ///
    /// Returns `true` if the unit is displayed when the call returns, and
    /// `false` if it was queued or the request was dropped.
    pub fn request_show_content(&mut self, content: ContentRef, animate: bool) -> bool {
        if self.anchor.is_none() {
            debug!(
                target: "sheetkit.controller",
                id = %content.id(),
                "show request without anchor dropped"
            );
            return false;
        }
        let id = content.id();
        self.full_show.insert(id);

        if self.displayed_id() == Some(id) {
            return true;
        }
        if self.queue.contains(id) {
            return false;
        }

        let seq = self.queue.next_seq();
        let idle = self.hide_in_flight.is_none();
        let shown = match self.displayed.as_ref().map(|d| d.content.priority()) {
            None => idle,
            Some(current_priority) => {
                let preempt =
                    idle && !self.sheet.is_open() && content.priority() > current_priority;
                if preempt && let Some(previous) = self.displayed.take() {
                    debug!(
                        target: "sheetkit.controller",
                        %id,
                        preempted = %previous.content.id(),
                        "content preempted"
                    );
                    self.queue.push(previous.content, previous.seq);
                }
                preempt
            }
        };

        if shown {
            self.show(content, seq, animate);
        } else {
            debug!(
                target: "sheetkit.controller",
                %id,
                priority = content.priority(),
                queued = self.queue.len() + 1,
                "content queued"
            );
            self.queue.push(content, seq);
        }
        self.pump();
        shown
    }

    /// Withdraw `id`, whether queued or displayed.
    ///
    /// Hiding the displayed unit drives the sheet to `Hidden`; the next
    /// queued unit is shown once it gets there.
    pub fn hide_content(&mut self, id: ContentId, animate: bool) -> bool {
        if self.anchor.is_none() {
            debug!(target: "sheetkit.controller", %id, "hide request without anchor dropped");
            return false;
        }

        if self.displayed_id() != Some(id) {
            if self.queue.remove(id).is_some() {
                self.full_show.remove(&id);
                debug!(target: "sheetkit.controller", %id, "queued content withdrawn");
                return true;
            }
            warn!(target: "sheetkit.controller", %id, "hide requested for unknown content");
            return false;
        }

        self.full_show.remove(&id);
        if self.hide_in_flight.is_some() {
            return true;
        }

        debug!(target: "sheetkit.controller", %id, animate, "hiding content");
        self.hide_in_flight = Some(id);
        let at_rest_hidden =
            self.sheet.sheet_state() == SheetState::Hidden && !self.sheet.is_animating();
        if at_rest_hidden {
            self.finish_hide();
        } else if let Err(err) =
            self.sheet
                .set_sheet_state(SheetState::Hidden, animate, StateChangeReason::None)
        {
            warn!(target: "sheetkit.controller", error = %err, "hide failed");
        }
        self.pump();
        true
    }

    // -- Suppression ----------------------------------------------------------

    /// Hide the sheet until the returned token is released.
    pub fn suppress(&mut self, reason: StateChangeReason) -> SuppressionToken {
        let first = !self.suppression.is_suppressed();
        let token = self.suppression.acquire();
        if first {
            self.enter_suppression(reason);
        }
        self.pump();
        token
    }

    /// Release a suppression token. Returns whether it was active.
    pub fn unsuppress(&mut self, token: SuppressionToken) -> bool {
        if !self.suppression.release(token) {
            return false;
        }
        self.restore_after_suppression();
        self.pump();
        true
    }

    /// Apply a host signal.
    pub fn signal(&mut self, signal: SuppressionSignal) {
        let (key, acquire) = signal.key();
        if acquire {
            let first = !self.suppression.is_suppressed();
            let (_, issued) = self.suppression.acquire_keyed(key);
            if issued && first {
                self.enter_suppression(StateChangeReason::Suppressed);
            }
        } else if self.suppression.release_keyed(key).is_some() {
            self.restore_after_suppression();
        }
        self.pump();
    }

    /// Attach the sheet to `anchor`.
    ///
    /// A different anchor is a context change: all content is destroyed and
    /// the sheet hides. Re-attaching the current anchor releases a detach.
    pub fn set_anchor(&mut self, anchor: AnchorId) {
        if self.anchor.is_some_and(|current| current != anchor) {
            debug!(target: "sheetkit.controller", anchor = anchor.0, "sheet context changed");
            self.reset_content(StateChangeReason::Navigation);
        }
        self.anchor = Some(anchor);
        if self.suppression.release_keyed(SuppressionKey::AnchorDetached).is_some() {
            self.restore_after_suppression();
        }
        self.pump();
    }

    /// Detach from the current anchor. The sheet hides until re-attached.
    pub fn detach_anchor(&mut self) {
        self.signal(SuppressionSignal::AnchorDetached);
    }

    // -- Sheet passthrough ----------------------------------------------------

    pub fn set_sheet_state(
        &mut self,
        state: SheetState,
        animate: bool,
        reason: StateChangeReason,
    ) -> Result<(), SheetError> {
        if self.hide_in_flight.is_some() && state.is_stable() && state != SheetState::Hidden {
            debug!(
                target: "sheetkit.controller",
                state = %state,
                "sheet state request ignored during hide"
            );
            return Ok(());
        }
        let result = self.sheet.set_sheet_state(state, animate, reason);
        self.pump();
        result
    }

    /// Open the sheet past peek if content is displayed.
    pub fn expand_sheet(&mut self) -> Result<(), SheetError> {
        if self.displayed.is_none()
            || self.suppression.is_suppressed()
            || self.hide_in_flight.is_some()
        {
            return Ok(());
        }
        let result = self.sheet.expand();
        self.pump();
        result
    }

    pub fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        if let Some(displayed) = &self.displayed {
            self.sheet
                .set_content_scroll_offset(displayed.content.scroll_offset());
        }
        let consumed = self.sheet.handle_pointer(event);
        self.pump();
        consumed
    }

    /// Advance animations. Returns whether another frame is needed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let running = self.sheet.tick(dt);
        self.pump();
        running
    }

    pub fn set_layout(&mut self, layout: GeometryConfig) -> Result<(), SheetError> {
        let result = self.sheet.set_layout(layout);
        self.pump();
        result
    }

    pub fn on_container_resized(&mut self, width: f32, height: f32) -> Result<(), SheetError> {
        let result = self.sheet.on_container_resized(width, height);
        self.pump();
        result
    }

    pub fn on_toolbar_resized(&mut self, toolbar_height: f32) -> Result<(), SheetError> {
        let result = self.sheet.on_toolbar_resized(toolbar_height);
        self.pump();
        result
    }

    /// Offer a back press to the displayed content, then to the sheet.
    pub fn handle_back_press(&mut self) -> bool {
        if self
            .displayed
            .as_ref()
            .is_some_and(|d| d.content.handle_back_press())
        {
            return true;
        }
        if self.hide_in_flight.is_some() {
            return false;
        }
        let consumed = self.sheet.handle_back_press();
        self.pump();
        consumed
    }
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

impl SheetController {
    fn pump(&mut self) {
        // Commands call back into public operations; the outer pump drains.
        if self.pumping {
            return;
        }
        self.pumping = true;
        loop {
            while let Some(event) = self.sheet.pop_event() {
                self.observers.notify(&event);
                self.react(&event);
            }
            let Some(command) = self.commands.pop() else {
                break;
            };
            self.run_command(command);
        }
        self.pumping = false;
    }

    fn run_command(&mut self, command: SheetCommand) {
        debug!(target: "sheetkit.controller", command = command.name(), "running queued command");
        let result = match command {
            SheetCommand::ShowContent { content, animate } => {
                self.request_show_content(content, animate);
                Ok(())
            }
            SheetCommand::HideContent { id, animate } => {
                self.hide_content(id, animate);
                Ok(())
            }
            SheetCommand::SetSheetState {
                state,
                animate,
                reason,
            } => self.set_sheet_state(state, animate, reason),
            SheetCommand::ExpandSheet => self.expand_sheet(),
        };
        if let Err(err) = result {
            warn!(target: "sheetkit.controller", error = %err, "queued command failed");
        }
    }

    fn react(&mut self, event: &SheetEvent) {
        match event {
            SheetEvent::StateChanged {
                state: SheetState::Hidden,
                ..
            } => {
                if self.hide_in_flight.is_some() {
                    self.finish_hide();
                }
            }
            SheetEvent::StateChanged { state, .. }
                if state.is_stable() && self.hide_in_flight.is_some() =>
            {
                self.resume_hide(*state);
            }
            SheetEvent::StateChanged {
                state: SheetState::Peek,
                ..
            } => self.preempt_on_close(),
            _ => {}
        }
    }

    fn show(&mut self, content: ContentRef, seq: u64, animate: bool) {
        let id = content.id();
        debug!(target: "sheetkit.controller", %id, "content shown");
        self.sheet.set_content_scroll_offset(content.scroll_offset());
        self.displayed = Some(Displayed { content, seq });
        self.sheet
            .emit(SheetEvent::ContentChanged { content: Some(id) });

        if self.full_show.contains(&id) && !self.suppression.is_suppressed() {
            if let Err(err) =
                self.sheet
                    .set_sheet_state(SheetState::Peek, animate, StateChangeReason::ContentChanged)
            {
                warn!(target: "sheetkit.controller", error = %err, "failed to open sheet");
            }
        }
    }

    /// The sheet came to rest somewhere other than `Hidden` mid-hide.
    fn resume_hide(&mut self, state: SheetState) {
        warn!(
            target: "sheetkit.controller",
            id = ?self.hide_in_flight,
            state = %state,
            "hide interrupted, resuming"
        );
        if let Err(err) =
            self.sheet
                .set_sheet_state(SheetState::Hidden, true, StateChangeReason::None)
        {
            warn!(target: "sheetkit.controller", error = %err, "hide failed");
        }
    }

    fn finish_hide(&mut self) {
        self.hide_in_flight = None;
        let hidden = self.displayed.take().map(|d| d.content.id());
        debug!(target: "sheetkit.controller", hidden = ?hidden, "hide complete");
        match self.queue.pop() {
            Some(next) => self.show(next.content, next.seq, true),
            None => self.sheet.emit(SheetEvent::ContentChanged { content: None }),
        }
    }

    fn preempt_on_close(&mut self) {
        if self.hide_in_flight.is_some() || self.suppression.is_suppressed() {
            return;
        }
        let (Some(current), Some(head)) = (&self.displayed, self.queue.peek()) else {
            return;
        };
        if head.priority() <= current.content.priority() {
            return;
        }
        let Some(next) = self.queue.pop() else {
            return;
        };
        if let Some(previous) = self.displayed.take() {
            debug!(
                target: "sheetkit.controller",
                id = %next.id(),
                preempted = %previous.content.id(),
                "deferred preemption on close"
            );
            self.queue.push(previous.content, previous.seq);
        }
        self.show(next.content, next.seq, true);
    }

    fn enter_suppression(&mut self, reason: StateChangeReason) {
        debug!(target: "sheetkit.controller", reason = reason.as_str(), "sheet suppressed");
        self.sheet.force_hidden(reason);
    }

    fn restore_after_suppression(&mut self) {
        let can_restore = !self.suppression.is_suppressed()
            && self.anchor.is_some()
            && self.displayed.is_some()
            && self.hide_in_flight.is_none();
        if !can_restore {
            return;
        }
        debug!(
            target: "sheetkit.controller",
            displayed = ?self.displayed_id(),
            "sheet suppression lifted"
        );
        if let Err(err) =
            self.sheet
                .set_sheet_state(SheetState::Peek, false, StateChangeReason::None)
        {
            warn!(target: "sheetkit.controller", error = %err, "failed to restore sheet");
        }
    }

    fn reset_content(&mut self, reason: StateChangeReason) {
        let had_content = self.displayed.is_some();
        self.hide_in_flight = None;
        self.full_show.clear();
        self.sheet.force_hidden(reason);
        if let Some(displayed) = self.displayed.take() {
            displayed.content.destroy();
        }
        for content in self.queue.drain() {
            content.destroy();
        }
        if had_content {
            self.sheet.emit(SheetEvent::ContentChanged { content: None });
        }
    }
}

impl Default for SheetController {
    fn default() -> Self {
        Self::new(SheetConfig::default())
    }
}

impl std::fmt::Debug for SheetController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetController")
            .field("sheet_state", &self.sheet.sheet_state())
            .field("displayed", &self.displayed_id())
            .field("queued", &self.queue.len())
            .field("hide_in_flight", &self.hide_in_flight)
            .field("suppressed", &self.suppression.is_suppressed())
            .field("anchor", &self.anchor)
            .field("observers", &self.observers.len())
            .field("pending_commands", &self.commands.len())
            .finish()
    }
}
