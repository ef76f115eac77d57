use crate::config::preferences::PlacementPrefs;
use crate::macos::windowing::{PlacementStrategy, WindowId, WindowingProvider};
use crate::models::Rect;
use crate::ui::overlay::OverlayProvider;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Timing and verification tunables for window placement
#[derive(Debug, Clone)]
pub struct PlacementConfig {
    /// Delay between a drop and the first move attempt. The host window
    /// manager may still be repositioning the window for a brief interval
    /// after the button release is observed.
    pub pre_move_delay: Duration,
    /// Delay after restoring a minimized window before moving it
    pub restore_settle: Duration,
    /// Delay before the single retry when verification fails
    pub retry_delay: Duration,
    /// Per-field pixel tolerance when comparing pre/post frames
    pub verify_tolerance: i32,
    pub retry_on_failed_verify: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            pre_move_delay: Duration::from_millis(150),
            restore_settle: Duration::from_millis(100),
            retry_delay: Duration::from_millis(250),
            verify_tolerance: 5,
            retry_on_failed_verify: true,
        }
    }
}

impl From<&PlacementPrefs> for PlacementConfig {
    fn from(prefs: &PlacementPrefs) -> Self {
        Self {
            pre_move_delay: Duration::from_millis(prefs.pre_move_delay_ms),
            restore_settle: Duration::from_millis(prefs.restore_settle_ms),
            retry_delay: Duration::from_millis(prefs.retry_delay_ms),
            verify_tolerance: prefs.verify_tolerance_px,
            retry_on_failed_verify: prefs.retry_on_failed_verify,
        }
    }
}

/// Telemetry for placement operations
#[derive(Debug, Default, Clone)]
pub struct PlacementMetrics {
    /// Individual strategy attempts, across retries
    pub attempts: u64,
    /// Placements verified by re-read
    pub placements: u64,
    /// Placements where no strategy produced a verified move
    pub refusals: u64,
    pub retries: u64,
    pub precondition_failures: u64,
}

/// Performs and verifies OS-level window moves
///
/// `place` returning `false` is a normal outcome: the window type does not
/// support repositioning or the process lacks the needed privilege. The OS
/// reporting success is never trusted on its own; the frame is re-read
/// after every attempt and compared against the pre-attempt frame with a
/// small per-field tolerance.
pub struct PlacementExecutor {
    windowing: Arc<dyn WindowingProvider>,
    overlay: Arc<dyn OverlayProvider>,
    config: PlacementConfig,
    metrics: Arc<RwLock<PlacementMetrics>>,
}

impl PlacementExecutor {
    pub fn new(
        windowing: Arc<dyn WindowingProvider>,
        overlay: Arc<dyn OverlayProvider>,
        config: PlacementConfig,
    ) -> Self {
        Self {
            windowing,
            overlay,
            config,
            metrics: Arc::new(RwLock::new(PlacementMetrics::default())),
        }
    }

    /// Move `window` into `target`, returning whether a verified move
    /// happened.
    pub async fn place(&self, window: WindowId, target: Rect) -> Result<bool> {
        if !self.preconditions_hold(window) {
            self.metrics.write().await.precondition_failures += 1;
            return Ok(false);
        }

        if self.windowing.is_minimized(window) {
            if let Err(err) = self.windowing.restore(window) {
                warn!(window, error = %err, "Failed to restore minimized window");
                self.metrics.write().await.refusals += 1;
                return Ok(false);
            }
            sleep(self.config.restore_settle).await;
        }

        sleep(self.config.pre_move_delay).await;

        let before = match self.windowing.window_frame(window) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(window, error = %err, "Could not read window frame before placement");
                self.metrics.write().await.refusals += 1;
                return Ok(false);
            }
        };

        let mut verified = self.attempt_strategies(window, target, before).await;

        if !verified && self.config.retry_on_failed_verify {
            self.metrics.write().await.retries += 1;
            sleep(self.config.retry_delay).await;
            verified = self.attempt_strategies(window, target, before).await;
        }

        let mut metrics = self.metrics.write().await;
        if verified {
            metrics.placements += 1;
            debug!(window, ?target, "Window placed");
        } else {
            metrics.refusals += 1;
            debug!(window, ?target, "Window refused repositioning");
        }

        Ok(verified)
    }

    pub async fn metrics(&self) -> PlacementMetrics {
        self.metrics.read().await.clone()
    }

    /// Handle must be non-null, still a live window, and not one of our
    /// own overlays. Failing any of these skips every OS call.
    fn preconditions_hold(&self, window: WindowId) -> bool {
        if window == 0 {
            return false;
        }
        if !self.windowing.is_window(window) {
            return false;
        }
        if self.overlay.owns_window(window) {
            warn!(window, "Refusing to place one of our own overlay windows");
            return false;
        }
        true
    }

    /// Try each strategy in order, stopping at the first one the OS
    /// reports successful. The frame is re-read after every attempt; the
    /// returned verdict is whether any field moved beyond tolerance
    /// relative to the pre-attempt frame.
    async fn attempt_strategies(&self, window: WindowId, target: Rect, before: Rect) -> bool {
        for strategy in PlacementStrategy::ordered() {
            self.metrics.write().await.attempts += 1;

            let reported = self
                .windowing
                .apply_placement(window, target, strategy)
                .unwrap_or(false);

            let after = self.windowing.window_frame(window).unwrap_or(before);
            let moved = !after.within_tolerance(&before, self.config.verify_tolerance);

            if reported || moved {
                if reported && !moved {
                    debug!(
                        window,
                        ?strategy,
                        "OS reported success but the frame did not change"
                    );
                }
                return moved;
            }
        }

        false
    }
}
