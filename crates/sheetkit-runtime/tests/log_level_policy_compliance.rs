#![forbid(unsafe_code)]

//! Log level policy compliance tests.
//!
//! Verify that the sheet and controller log the way operators expect:
//! - State changes, settles, and scheduling decisions at DEBUG
//! - Per-frame offset updates at TRACE only
//! - Rejected requests and invalid layouts at WARN, with context fields
//! - Every event at DEBUG and above carries structured fields
//! - Nothing at ERROR: every failure here is recoverable
//!
//! Run:
//!   cargo test -p sheetkit-runtime --test log_level_policy_compliance

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use sheetkit_core::geometry::GeometryConfig;
use sheetkit_runtime::{
    AnchorId, BottomSheet, ContentId, SheetContent, SheetController, SheetMetrics, SheetState,
    StateChangeReason, SurfaceId,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use web_time::Duration;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A captured log event with its metadata and fields.
#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    fields: HashMap<String, String>,
    message: Option<String>,
}

impl CapturedEvent {
    /// Returns true if this event has at least one structured field
    /// (beyond just the message itself).
    fn has_structured_fields(&self) -> bool {
        self.fields.keys().any(|k| k != "message")
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn is(&self, target: &str, message: &str) -> bool {
        self.target == target && self.message.as_deref() == Some(message)
    }
}

/// Layer that captures events.
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl EventCapture {
    fn new() -> (Self, EventCaptureHandle) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let handle = EventCaptureHandle {
            events: events.clone(),
        };
        (Self { events }, handle)
    }
}

/// Handle to read captured events.
struct EventCaptureHandle {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl EventCaptureHandle {
    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn events_at_level(&self, level: tracing::Level) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }

    fn find(&self, target: &str, message: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.is(target, message))
            .collect()
    }
}

/// Visitor for extracting event fields.
struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);

        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.get("message").cloned();

        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields,
            message,
        });
    }
}

/// Set up a tracing subscriber with event capture and run a closure.
fn with_captured_events<F>(f: F) -> EventCaptureHandle
where
    F: FnOnce(),
{
    let (layer, handle) = EventCapture::new();
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(layer);
    tracing::subscriber::with_default(subscriber, f);
    handle
}

fn layout() -> GeometryConfig {
    GeometryConfig::new(600.0, 1000.0, 100.0).full_height_inset(50.0)
}

struct Content(ContentId);

impl SheetContent for Content {
    fn id(&self) -> ContentId {
        self.0
    }

    fn render_surface(&self) -> SurfaceId {
        SurfaceId(self.0.get())
    }

    fn destroy(&self) {}
}

fn content() -> Rc<Content> {
    Rc::new(Content(ContentId::new()))
}

/// A full lifecycle: show, expand, drag-free settle, suppress, restore, hide.
fn lifecycle() {
    let mut controller = SheetController::default();
    controller.add_observer(Rc::new(SheetMetrics::new()));
    controller.set_layout(layout()).unwrap();
    controller.set_anchor(AnchorId(1));

    let a = content();
    controller.request_show_content(a.clone(), true);
    while controller.tick(Duration::from_millis(16)) {}
    controller.expand_sheet().unwrap();
    while controller.tick(Duration::from_millis(16)) {}

    let token = controller.suppress(StateChangeReason::Suppressed);
    controller.unsuppress(token);
    controller.hide_content(a.id(), true);
    while controller.tick(Duration::from_millis(16)) {}
}

// ============================================================================
// Log Level Categorization Tests
// ============================================================================

/// State changes are DEBUG on the sheet target with from/to/reason.
#[test]
fn debug_level_for_state_changes() {
    let handle = with_captured_events(|| {
        let mut sheet = BottomSheet::default();
        sheet.set_layout(layout()).unwrap();
        sheet
            .set_sheet_state(SheetState::Full, false, StateChangeReason::BackPress)
            .unwrap();
    });

    let changes = handle.find("sheetkit.sheet", "sheet state changed");
    let last = changes.last().expect("state change logged");
    assert_eq!(last.level, tracing::Level::DEBUG);
    assert_eq!(last.field("from"), Some("hidden"));
    assert_eq!(last.field("to"), Some("full"));
    assert_eq!(last.field("reason"), Some("back_press"));

    let opened = handle.find("sheetkit.sheet", "sheet opened");
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].level, tracing::Level::DEBUG);
}

/// Per-frame offset updates never reach DEBUG.
#[test]
fn trace_level_for_per_frame_offsets() {
    let mut sheet = BottomSheet::default();
    sheet.set_layout(layout()).unwrap();
    sheet
        .set_sheet_state(SheetState::Peek, false, StateChangeReason::None)
        .unwrap();
    sheet
        .set_sheet_state(SheetState::Full, true, StateChangeReason::None)
        .unwrap();

    let handle = with_captured_events(|| {
        for _ in 0..5 {
            sheet.tick(Duration::from_millis(10));
        }
    });

    let offsets = handle.find("sheetkit.sheet", "sheet offset");
    assert_eq!(offsets.len(), 5);
    for event in &offsets {
        assert_eq!(event.level, tracing::Level::TRACE);
        assert!(event.field("offset").is_some());
        assert!(event.field("fraction").is_some());
    }
    assert!(
        handle.events_at_level(tracing::Level::DEBUG).is_empty(),
        "mid-animation frames must not log at DEBUG"
    );
}

/// Rejected requests are WARN with the offending value attached.
#[test]
fn warn_level_for_rejected_requests() {
    let handle = with_captured_events(|| {
        let mut controller = SheetController::default();
        controller.set_layout(layout()).unwrap();
        controller.set_anchor(AnchorId(1));

        let _ = controller.set_sheet_state(SheetState::Scrolling, true, StateChangeReason::None);
        controller.hide_content(ContentId::new(), true);
        let _ = controller.on_container_resized(600.0, -5.0);
    });

    let scrolling = handle.find("sheetkit.sheet", "rejected sheet state request");
    assert_eq!(scrolling.len(), 1);
    assert_eq!(scrolling[0].level, tracing::Level::WARN);
    assert_eq!(scrolling[0].field("state"), Some("scrolling"));

    let unknown = handle.find("sheetkit.controller", "hide requested for unknown content");
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].level, tracing::Level::WARN);
    assert!(unknown[0].field("id").is_some_and(|id| id.starts_with("content#")));

    let layout = handle.find("sheetkit.sheet", "ignoring invalid sheet layout");
    assert_eq!(layout.len(), 1);
    assert_eq!(layout[0].level, tracing::Level::WARN);
    assert!(layout[0].field("error").is_some());
}

/// Scheduling decisions are DEBUG on the controller target.
#[test]
fn debug_level_for_scheduling_decisions() {
    let handle = with_captured_events(|| {
        let mut controller = SheetController::default();
        controller.set_layout(layout()).unwrap();
        controller.set_anchor(AnchorId(1));
        controller.request_show_content(content(), false);
        controller.request_show_content(content(), false);
    });

    for message in ["content shown", "content queued"] {
        let events = handle.find("sheetkit.controller", message);
        assert_eq!(events.len(), 1, "{message}");
        assert_eq!(events[0].level, tracing::Level::DEBUG);
        assert!(events[0].field("id").is_some());
    }
    let queued = &handle.find("sheetkit.controller", "content queued")[0];
    assert_eq!(queued.field("queued"), Some("1"));
}

/// The metrics observer logs discrete transitions on its own target.
#[test]
fn metrics_log_on_dedicated_target() {
    let handle = with_captured_events(lifecycle);

    let opened = handle.find("sheetkit.metrics", "sheet opened");
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].field("opened_total"), Some("1"));
    assert!(
        !handle
            .find("sheetkit.metrics", "sheet closed")
            .is_empty()
    );
}

// ============================================================================
// Structured Logging Policy Tests
// ============================================================================

/// Policy: every event at DEBUG and above uses structured fields.
#[test]
fn policy_debug_and_above_use_structured_fields() {
    let handle = with_captured_events(lifecycle);

    let events = handle.events();
    assert!(!events.is_empty());
    for event in &events {
        if event.level <= tracing::Level::DEBUG && event.target.starts_with("sheetkit.") {
            assert!(
                event.has_structured_fields(),
                "Event '{}' at {} on {} should have structured fields. Got: {:?}",
                event.message.as_deref().unwrap_or("<none>"),
                event.level,
                event.target,
                event.fields.keys().collect::<Vec<_>>()
            );
        }
    }
}

/// Policy: a normal lifecycle produces no WARN or ERROR events.
#[test]
fn policy_clean_lifecycle_is_quiet() {
    let handle = with_captured_events(lifecycle);
    assert!(handle.events_at_level(tracing::Level::WARN).is_empty());
    assert!(handle.events_at_level(tracing::Level::ERROR).is_empty());
}

/// Policy: all sheetkit events use one of the documented targets.
#[test]
fn policy_targets_are_documented() {
    const TARGETS: [&str; 4] = [
        "sheetkit.sheet",
        "sheetkit.controller",
        "sheetkit.gesture",
        "sheetkit.metrics",
    ];
    let handle = with_captured_events(lifecycle);
    for event in handle.events() {
        if event.target.starts_with("sheetkit") {
            assert!(
                TARGETS.contains(&event.target.as_str()),
                "undocumented target {}",
                event.target
            );
        }
    }
}
