//! Contract tests for the window placement executor
//!
//! These validate the placement API contract: precondition short-circuits
//! make no OS calls, reported success is never trusted without a verified
//! frame change, and the strategy order is honoured.

use mockall::mock;
use mockall::predicate::eq;
use std::sync::Arc;
use std::time::Duration;
use zoners::macos::windowing::{
    InMemoryWindowingProvider, PlacementStrategy, SimulatedWindow, WindowId, WindowingProvider,
};
use zoners::models::{Point, Rect};
use zoners::services::placement::{PlacementConfig, PlacementExecutor};
use zoners::ui::overlay::InMemoryOverlayProvider;

mock! {
    pub Windowing {}

    impl WindowingProvider for Windowing {
        fn foreground_window(&self) -> zoners::Result<Option<WindowId>>;
        fn window_at(&self, point: Point) -> zoners::Result<Option<WindowId>>;
        fn is_window(&self, id: WindowId) -> bool;
        fn is_visible(&self, id: WindowId) -> bool;
        fn is_minimized(&self, id: WindowId) -> bool;
        fn window_class(&self, id: WindowId) -> Option<String>;
        fn restore(&self, id: WindowId) -> zoners::Result<()>;
        fn window_frame(&self, id: WindowId) -> zoners::Result<Rect>;
        fn apply_placement(
            &self,
            id: WindowId,
            frame: Rect,
            strategy: PlacementStrategy,
        ) -> zoners::Result<bool>;
    }
}

fn instant_config() -> PlacementConfig {
    PlacementConfig {
        pre_move_delay: Duration::ZERO,
        restore_settle: Duration::ZERO,
        retry_delay: Duration::ZERO,
        verify_tolerance: 5,
        retry_on_failed_verify: true,
    }
}

fn no_retry_config() -> PlacementConfig {
    PlacementConfig {
        retry_on_failed_verify: false,
        ..instant_config()
    }
}

#[tokio::test]
async fn dead_window_makes_no_placement_calls() {
    let mut mock = MockWindowing::new();
    mock.expect_is_window().with(eq(7)).return_const(false);
    mock.expect_window_frame().never();
    mock.expect_apply_placement().never();

    let executor = PlacementExecutor::new(
        Arc::new(mock),
        Arc::new(InMemoryOverlayProvider::new()),
        instant_config(),
    );

    let placed = executor.place(7, Rect::new(0, 0, 100, 100)).await.unwrap();
    assert!(!placed);
}

#[tokio::test]
async fn reported_success_is_not_trusted_without_movement() {
    // The OS says yes to the first strategy but the frame never changes;
    // the contract requires a false result.
    let frame = Rect::new(100, 100, 800, 600);

    let mut mock = MockWindowing::new();
    mock.expect_is_window().return_const(true);
    mock.expect_is_minimized().return_const(false);
    mock.expect_window_frame().returning(move |_| Ok(frame));
    mock.expect_apply_placement()
        .with(eq(3), eq(Rect::new(0, 0, 960, 540)), eq(PlacementStrategy::SetFrame))
        .times(1)
        .returning(|_, _, _| Ok(true));

    let executor = PlacementExecutor::new(
        Arc::new(mock),
        Arc::new(InMemoryOverlayProvider::new()),
        no_retry_config(),
    );

    let placed = executor.place(3, Rect::new(0, 0, 960, 540)).await.unwrap();
    assert!(!placed);
}

#[tokio::test]
async fn strategies_are_tried_in_order_until_one_is_reported() {
    let windowing = Arc::new(InMemoryWindowingProvider::new_with(vec![
        SimulatedWindow::new(1, Rect::new(100, 100, 800, 600)),
    ]));
    windowing.set_failing_strategies(&[PlacementStrategy::SetFrame, PlacementStrategy::MoveOnly]);

    let executor = PlacementExecutor::new(
        windowing.clone(),
        Arc::new(InMemoryOverlayProvider::new()),
        no_retry_config(),
    );

    let target = Rect::new(0, 0, 960, 540);
    let placed = executor.place(1, target).await.unwrap();

    assert!(placed);
    assert_eq!(windowing.frame_of(1).unwrap(), target);
    assert_eq!(executor.metrics().await.attempts, 3);
}

#[tokio::test]
async fn five_pixel_tolerance_is_the_boundary() {
    // A move of exactly the tolerance on every field does not count.
    let windowing = Arc::new(InMemoryWindowingProvider::new_with(vec![
        SimulatedWindow::new(1, Rect::new(100, 100, 800, 600)),
    ]));
    let executor = PlacementExecutor::new(
        windowing.clone(),
        Arc::new(InMemoryOverlayProvider::new()),
        no_retry_config(),
    );

    let within = Rect::new(105, 95, 805, 595);
    assert!(!executor.place(1, within).await.unwrap());

    // One field beyond the tolerance is a verified move.
    let windowing = Arc::new(InMemoryWindowingProvider::new_with(vec![
        SimulatedWindow::new(2, Rect::new(100, 100, 800, 600)),
    ]));
    let executor = PlacementExecutor::new(
        windowing,
        Arc::new(InMemoryOverlayProvider::new()),
        no_retry_config(),
    );
    let beyond = Rect::new(106, 100, 800, 600);
    assert!(executor.place(2, beyond).await.unwrap());
}

#[tokio::test]
async fn failed_verification_retries_exactly_once() {
    let windowing = Arc::new(InMemoryWindowingProvider::new_with(vec![
        SimulatedWindow::new(4, Rect::new(100, 100, 800, 600)).frozen(),
    ]));
    let executor = PlacementExecutor::new(
        windowing,
        Arc::new(InMemoryOverlayProvider::new()),
        instant_config(),
    );

    let placed = executor.place(4, Rect::new(0, 0, 960, 540)).await.unwrap();
    assert!(!placed);

    let metrics = executor.metrics().await;
    assert_eq!(metrics.retries, 1);
    assert_eq!(metrics.refusals, 1);
}

#[tokio::test]
async fn overlay_windows_are_never_placement_targets() {
    let windowing = Arc::new(InMemoryWindowingProvider::new_with(vec![
        SimulatedWindow::new(900, Rect::new(0, 0, 960, 540)),
    ]));
    let overlay = Arc::new(InMemoryOverlayProvider::new());
    overlay.register_overlay_window(900);

    let executor = PlacementExecutor::new(windowing.clone(), overlay, instant_config());

    let placed = executor.place(900, Rect::new(0, 0, 100, 100)).await.unwrap();
    assert!(!placed);
    assert_eq!(windowing.frame_of(900).unwrap(), Rect::new(0, 0, 960, 540));
}

#[tokio::test]
async fn minimized_target_is_restored_then_moved() {
    let windowing = Arc::new(InMemoryWindowingProvider::new_with(vec![
        SimulatedWindow::new(6, Rect::new(300, 300, 640, 480)).minimized(),
    ]));
    let executor = PlacementExecutor::new(
        windowing.clone(),
        Arc::new(InMemoryOverlayProvider::new()),
        instant_config(),
    );

    let target = Rect::new(960, 540, 960, 540);
    assert!(executor.place(6, target).await.unwrap());
    assert!(!windowing.is_minimized(6));
    assert_eq!(windowing.frame_of(6).unwrap(), target);
}
