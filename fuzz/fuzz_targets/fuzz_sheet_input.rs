#![no_main]

use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sheetkit_core::event::PointerEvent;
use sheetkit_core::geometry::{GeometryConfig, OFFSET_EPSILON};
use sheetkit_runtime::{
    AnchorId, ContentId, SheetContent, SheetController, SheetState, StateChangeReason,
    SuppressionSignal, SuppressionToken, SurfaceId,
};
use web_time::{Duration, Instant};

#[derive(Debug, Arbitrary)]
enum Op {
    Down { x: u16, y: u16 },
    Move { dx: i16, dy: i16, dt_ms: u8 },
    Up { dt_ms: u8 },
    Cancel,
    Tick { ms: u8 },
    SetState { state: u8, animate: bool },
    Show { slot: u8, priority: i8, animate: bool },
    Hide { slot: u8, animate: bool },
    Suppress,
    Unsuppress,
    Signal { which: u8 },
    Anchor { id: u8 },
    Detach,
    Resize { height: u16, toolbar: u8 },
    BackPress,
    Expand,
}

struct Content {
    id: ContentId,
    priority: i32,
}

impl SheetContent for Content {
    fn id(&self) -> ContentId {
        self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn render_surface(&self) -> SurfaceId {
        SurfaceId(self.id.get())
    }

    fn destroy(&self) {}
}

const STATES: [SheetState; 5] = [
    SheetState::Hidden,
    SheetState::Peek,
    SheetState::Half,
    SheetState::Full,
    SheetState::Scrolling,
];

const SIGNALS: [SuppressionSignal; 5] = [
    SuppressionSignal::ImmersiveModeEntered,
    SuppressionSignal::ImmersiveModeExited,
    SuppressionSignal::OverlayShown,
    SuppressionSignal::OverlayHidden,
    SuppressionSignal::AnchorDetached,
];

fuzz_target!(|ops: Vec<Op>| {
    if ops.len() > 512 {
        return;
    }

    let mut controller = SheetController::default();
    let _ = controller.set_layout(GeometryConfig::new(400.0, 800.0, 64.0).full_height_inset(32.0));
    controller.set_anchor(AnchorId(0));

    let contents: Vec<Rc<Content>> = (0..4)
        .map(|i| {
            Rc::new(Content {
                id: ContentId::new(),
                priority: i,
            })
        })
        .collect();
    let mut tokens: Vec<SuppressionToken> = Vec::new();
    let mut now = Instant::now();
    let (mut x, mut y) = (0.0f32, 0.0f32);

    for op in ops {
        match op {
            Op::Down { x: px, y: py } => {
                x = f32::from(px % 2048);
                y = f32::from(py % 2048);
                controller.handle_pointer(&PointerEvent::down(x, y, now));
            }
            Op::Move { dx, dy, dt_ms } => {
                x += f32::from(dx % 512);
                y += f32::from(dy % 512);
                now += Duration::from_millis(u64::from(dt_ms));
                controller.handle_pointer(&PointerEvent::moved(x, y, now));
            }
            Op::Up { dt_ms } => {
                now += Duration::from_millis(u64::from(dt_ms));
                controller.handle_pointer(&PointerEvent::up(x, y, now));
            }
            Op::Cancel => {
                controller.handle_pointer(&PointerEvent::cancel(x, y, now));
            }
            Op::Tick { ms } => {
                let dt = Duration::from_millis(u64::from(ms));
                now += dt;
                controller.tick(dt);
            }
            Op::SetState { state, animate } => {
                let state = STATES[usize::from(state) % STATES.len()];
                let result = controller.set_sheet_state(state, animate, StateChangeReason::None);
                assert_eq!(result.is_err(), state == SheetState::Scrolling);
            }
            Op::Show {
                slot,
                priority,
                animate,
            } => {
                let slot = usize::from(slot) % contents.len();
                let content = if priority < 0 {
                    Rc::new(Content {
                        id: ContentId::new(),
                        priority: i32::from(priority),
                    })
                } else {
                    Rc::clone(&contents[slot])
                };
                controller.request_show_content(content, animate);
            }
            Op::Hide { slot, animate } => {
                let id = contents[usize::from(slot) % contents.len()].id;
                controller.hide_content(id, animate);
            }
            Op::Suppress => tokens.push(controller.suppress(StateChangeReason::Suppressed)),
            Op::Unsuppress => {
                if let Some(token) = tokens.pop() {
                    assert!(controller.unsuppress(token));
                }
            }
            Op::Signal { which } => {
                controller.signal(SIGNALS[usize::from(which) % SIGNALS.len()]);
            }
            Op::Anchor { id } => controller.set_anchor(AnchorId(u64::from(id % 3))),
            Op::Detach => controller.detach_anchor(),
            Op::Resize { height, toolbar } => {
                let _ = controller.on_container_resized(400.0, f32::from(height));
                let _ = controller.on_toolbar_resized(f32::from(toolbar));
            }
            Op::BackPress => {
                controller.handle_back_press();
            }
            Op::Expand => {
                let _ = controller.expand_sheet();
            }
        }

        // Post-conditions that must always hold:
        let sheet = controller.sheet();
        assert_eq!(
            sheet.target_sheet_state().is_some(),
            sheet.is_animating(),
            "target without animation"
        );
        if sheet.is_animating() {
            assert_eq!(sheet.sheet_state(), SheetState::Scrolling);
        }
        if let Some(geometry) = sheet.geometry() {
            assert!(sheet.offset() >= -OFFSET_EPSILON, "negative offset");
            assert!(
                sheet.offset() <= geometry.full_offset() + OFFSET_EPSILON,
                "offset above full"
            );
        }
        if let Some(id) = controller.displayed_id() {
            assert!(!controller.queue().contains(id), "displayed unit also queued");
        }
    }
});
