//! Integration tests: pointer streams through the interpreter into settle
//! resolution.

use sheetkit_core::event::PointerEvent;
use sheetkit_core::geometry::{DEFAULT_HALF_RATIO, GeometryConfig, SheetGeometry};
use sheetkit_core::gesture::{GestureContext, GestureInterpreter, SheetGesture};
use sheetkit_core::settle::{
    BASE_ANIMATION_DURATION, SettleThresholds, fling_distance, resolve_target_state,
};
use sheetkit_core::state::SheetState;
use web_time::{Duration, Instant};

const MS_10: Duration = Duration::from_millis(10);

fn geometry() -> SheetGeometry {
    let config = GeometryConfig::new(600.0, 1000.0, 100.0).full_height_inset(50.0);
    SheetGeometry::new(config, DEFAULT_HALF_RATIO).unwrap()
}

/// Feed a vertical drag and return the final gesture and offset.
fn drag(geo: &SheetGeometry, start_offset: f32, ys: &[f32], step: Duration) -> (Option<SheetGesture>, f32) {
    let mut gi = GestureInterpreter::default();
    let t = Instant::now();
    let mut offset = start_offset;
    let ctx = |offset| GestureContext {
        geometry: geo,
        offset,
        content_scroll_offset: 0.0,
        accepts_input: true,
    };
    gi.process(&PointerEvent::down(300.0, ys[0], t), &ctx(offset));
    let mut at = t;
    for &y in &ys[1..ys.len() - 1] {
        at += step;
        if let Some(SheetGesture::Drag { offset: next }) =
            gi.process(&PointerEvent::moved(300.0, y, at), &ctx(offset))
        {
            offset = next;
        }
    }
    at += step;
    let last = gi.process(&PointerEvent::up(300.0, ys[ys.len() - 1], at), &ctx(offset));
    (last, offset)
}

#[test]
fn fling_from_half_lands_on_full() {
    let geo = geometry();
    let projected = geo.half_offset() + fling_distance(2000.0, BASE_ANIMATION_DURATION);
    assert!((projected - 768.0).abs() < 0.01);
    assert_eq!(
        resolve_target_state(&geo, projected, 2000.0, &SettleThresholds::default()),
        SheetState::Full
    );
}

#[test]
fn quick_upward_flick_from_half_settles_full() {
    let geo = geometry();
    // Sheet top at half is y = 450.
    let (gesture, _) = drag(&geo, 550.0, &[500.0, 480.0, 460.0, 440.0], MS_10);
    let Some(SheetGesture::Fling { projected, velocity }) = gesture else {
        panic!("expected fling, got {gesture:?}");
    };
    assert!(velocity > 0.0);
    assert_eq!(
        resolve_target_state(&geo, projected, velocity, &SettleThresholds::default()),
        SheetState::Full
    );
}

#[test]
fn quick_downward_flick_from_half_skips_to_peek() {
    let geo = geometry();
    let (gesture, _) = drag(&geo, 550.0, &[500.0, 520.0, 540.0, 560.0], MS_10);
    let Some(SheetGesture::Fling { projected, velocity }) = gesture else {
        panic!("expected fling, got {gesture:?}");
    };
    assert!(velocity < 0.0);
    assert_eq!(
        resolve_target_state(&geo, projected, velocity, &SettleThresholds::default()),
        SheetState::Peek
    );
}

#[test]
fn slow_drag_release_settles_by_position() {
    let geo = geometry();
    // Drag from half up by 300 px slowly, then hold.
    let ys: Vec<f32> = (0..=30).map(|i| 500.0 - 10.0 * i as f32).chain([200.0]).collect();
    let (gesture, offset) = drag(&geo, 550.0, &ys, Duration::from_millis(200));
    let Some(SheetGesture::Release { offset: released, velocity }) = gesture else {
        panic!("expected release, got {gesture:?}");
    };
    assert_eq!(released, offset);
    assert_eq!(velocity, 0.0);
    // 850 is past the half→full midpoint.
    assert!((offset - 850.0).abs() < 0.5, "offset = {offset}");
    assert_eq!(
        resolve_target_state(&geo, released, velocity, &SettleThresholds::default()),
        SheetState::Full
    );
}
