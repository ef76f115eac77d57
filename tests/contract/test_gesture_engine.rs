//! Contract tests for the pointer gesture engine
//!
//! These validate the externally observable state machine behaviour:
//! Idle -> Armed -> Tracking -> (Dropped | Cancelled) -> Idle, including
//! cooldown suppression and candidate validation.

use std::sync::Arc;
use std::time::{Duration, Instant};
use zoners::config::{DenyList, DenylistPrefs};
use zoners::macos::event_source::PointerEvent;
use zoners::macos::windowing::{InMemoryWindowingProvider, SimulatedWindow};
use zoners::models::{Point, Rect, ResolvedZone};
use zoners::services::gesture_engine::{
    GestureConfig, GestureEngine, GestureOutcome, GestureStateKind,
};
use zoners::ui::overlay::InMemoryOverlayProvider;

fn zones() -> Vec<ResolvedZone> {
    vec![
        ResolvedZone {
            number: 1,
            rect: Rect::new(0, 0, 960, 540),
            monitor: 1,
            name: "Top Left Quarter".to_string(),
        },
        ResolvedZone {
            number: 2,
            rect: Rect::new(960, 0, 960, 540),
            monitor: 1,
            name: "Top Right Quarter".to_string(),
        },
        ResolvedZone {
            number: 3,
            rect: Rect::new(0, 540, 1920, 540),
            monitor: 1,
            name: "Bottom Half".to_string(),
        },
    ]
}

fn engine() -> (Arc<InMemoryWindowingProvider>, Arc<InMemoryOverlayProvider>, GestureEngine) {
    let windowing = Arc::new(InMemoryWindowingProvider::new_with(vec![
        SimulatedWindow::new(42, Rect::new(100, 100, 800, 600)),
    ]));
    let overlay = Arc::new(InMemoryOverlayProvider::new());
    let engine = GestureEngine::new(
        windowing.clone(),
        overlay.clone(),
        DenyList::compile(&DenylistPrefs::default()).unwrap(),
        GestureConfig::default(),
    );
    (windowing, overlay, engine)
}

#[test]
fn press_without_modifier_never_leaves_idle() {
    let (_, overlay, mut engine) = engine();

    for position in [Point::new(10, 10), Point::new(500, 500), Point::new(1500, 200)] {
        engine.handle_event(&PointerEvent::press(position, false), &zones());
        assert_eq!(engine.state_kind(), GestureStateKind::Idle);
    }

    // Movement and release without a qualifying press are inert too.
    engine.handle_event(&PointerEvent::moved(Point::new(500, 500), false), &zones());
    engine.handle_event(&PointerEvent::release(Point::new(500, 500), false), &zones());
    assert_eq!(engine.state_kind(), GestureStateKind::Idle);
    assert_eq!(overlay.show_calls(), 0);
}

#[test]
fn one_press_tracks_at_most_once() {
    let (_, overlay, mut engine) = engine();

    engine.handle_event(&PointerEvent::press(Point::new(200, 200), true), &zones());
    for x in (200..800).step_by(50) {
        engine.handle_event(&PointerEvent::moved(Point::new(x, 300), true), &zones());
        assert_eq!(engine.state_kind(), GestureStateKind::Tracking);
    }

    assert_eq!(overlay.show_calls(), 1);
    assert_eq!(engine.metrics().gestures_tracked, 1);
}

#[test]
fn drop_carries_the_press_time_candidate() {
    let (windowing, _, mut engine) = engine();

    engine.handle_event(&PointerEvent::press(Point::new(200, 200), true), &zones());
    engine.handle_event(&PointerEvent::moved(Point::new(400, 300), true), &zones());

    // Another window appears under the cursor mid-drag; the candidate
    // captured at press time still wins.
    windowing.insert(SimulatedWindow::new(77, Rect::new(0, 0, 1920, 1080)));
    engine.handle_event(&PointerEvent::moved(Point::new(1200, 200), true), &zones());

    let outcome = engine.handle_event(&PointerEvent::release(Point::new(1200, 200), true), &zones());
    assert_eq!(
        outcome,
        Some(GestureOutcome::Dropped {
            window: 42,
            zone_index: 1,
        })
    );
}

#[test]
fn release_outside_every_zone_cancels() {
    let (_, overlay, mut engine) = engine();

    engine.handle_event(&PointerEvent::press(Point::new(200, 200), true), &zones());
    engine.handle_event(&PointerEvent::moved(Point::new(400, 300), true), &zones());

    let outcome = engine.handle_event(
        &PointerEvent::release(Point::new(5000, 5000), true),
        &zones(),
    );

    assert_eq!(outcome, Some(GestureOutcome::Cancelled));
    assert_eq!(engine.state_kind(), GestureStateKind::Idle);
    assert!(overlay.visible_zones().is_empty());
}

#[test]
fn cooldown_swallows_the_synthesized_click() {
    let (_, _, mut engine) = engine();
    let start = Instant::now();

    engine.handle_event(
        &PointerEvent::press(Point::new(200, 200), true).at(start),
        &zones(),
    );
    engine.handle_event(
        &PointerEvent::moved(Point::new(400, 300), true).at(start + Duration::from_millis(20)),
        &zones(),
    );
    engine.handle_event(
        &PointerEvent::release(Point::new(400, 300), true).at(start + Duration::from_millis(40)),
        &zones(),
    );

    // The window manager synthesizes a click shortly after release.
    engine.handle_event(
        &PointerEvent::press(Point::new(400, 300), true).at(start + Duration::from_millis(140)),
        &zones(),
    );
    assert_eq!(engine.state_kind(), GestureStateKind::Idle);

    engine.handle_event(
        &PointerEvent::press(Point::new(400, 300), true).at(start + Duration::from_millis(900)),
        &zones(),
    );
    assert_eq!(engine.state_kind(), GestureStateKind::Armed);
    assert_eq!(engine.metrics().cooldown_suppressed, 1);
}

#[test]
fn highlight_follows_the_pointer_across_zones() {
    let (_, overlay, mut engine) = engine();

    engine.handle_event(&PointerEvent::press(Point::new(200, 200), true), &zones());
    engine.handle_event(&PointerEvent::moved(Point::new(200, 200), true), &zones());
    assert_eq!(overlay.highlighted(), Some(0));

    engine.handle_event(&PointerEvent::moved(Point::new(1000, 200), true), &zones());
    assert_eq!(overlay.highlighted(), Some(1));

    engine.handle_event(&PointerEvent::moved(Point::new(1000, 800), true), &zones());
    assert_eq!(overlay.highlighted(), Some(2));
}

#[test]
fn minimized_candidate_cancels_instead_of_tracking() {
    let windowing = Arc::new(InMemoryWindowingProvider::new_with(vec![
        SimulatedWindow::new(9, Rect::new(0, 0, 800, 600)).minimized(),
    ]));
    windowing.set_foreground(Some(9));
    let overlay = Arc::new(InMemoryOverlayProvider::new());
    let mut engine = GestureEngine::new(
        windowing,
        overlay.clone(),
        DenyList::compile(&DenylistPrefs::default()).unwrap(),
        GestureConfig::default(),
    );

    engine.handle_event(&PointerEvent::press(Point::new(100, 100), true), &zones());
    assert_eq!(engine.state_kind(), GestureStateKind::Armed);

    let outcome = engine.handle_event(&PointerEvent::moved(Point::new(200, 200), true), &zones());
    assert_eq!(outcome, Some(GestureOutcome::Cancelled));
    assert_eq!(overlay.show_calls(), 0);
}

#[test]
fn shell_windows_are_refused_by_the_denylist() {
    let windowing = Arc::new(InMemoryWindowingProvider::new_with(vec![
        SimulatedWindow::new(5, Rect::new(0, 0, 1920, 1080)).with_class("com.apple.dock"),
    ]));
    let overlay = Arc::new(InMemoryOverlayProvider::new());
    let mut engine = GestureEngine::new(
        windowing,
        overlay,
        DenyList::compile(&DenylistPrefs::default()).unwrap(),
        GestureConfig::default(),
    );

    engine.handle_event(&PointerEvent::press(Point::new(500, 500), true), &zones());
    let outcome = engine.handle_event(&PointerEvent::moved(Point::new(600, 500), true), &zones());
    assert_eq!(outcome, Some(GestureOutcome::Cancelled));
}

#[test]
fn empty_zone_list_tracks_but_never_drops() {
    let (_, _, mut engine) = engine();
    let no_zones: Vec<ResolvedZone> = Vec::new();

    engine.handle_event(&PointerEvent::press(Point::new(200, 200), true), &no_zones);
    engine.handle_event(&PointerEvent::moved(Point::new(400, 300), true), &no_zones);
    assert_eq!(engine.state_kind(), GestureStateKind::Tracking);

    let outcome = engine.handle_event(
        &PointerEvent::release(Point::new(400, 300), true),
        &no_zones,
    );
    assert_eq!(outcome, Some(GestureOutcome::Cancelled));
}
