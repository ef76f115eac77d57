use crate::config::preferences::DenyList;
use crate::macos::event_source::{PointerEvent, PointerEventKind};
use crate::macos::windowing::{WindowId, WindowingProvider};
use crate::models::ResolvedZone;
use crate::services::zone_resolver::zone_at;
use crate::ui::overlay::OverlayProvider;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

/// Tunables for the gesture recognizer
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Presses within this window after the previous release are ignored.
    /// Suppresses re-arming on the synthesized click some window managers
    /// emit right after a drag ends.
    pub cooldown: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(500),
        }
    }
}

/// Transient state of one drag interaction
///
/// Created when a qualifying press is observed, destroyed on release or
/// cancellation. Owned by the engine value; never global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    /// Correlation id for log lines belonging to this gesture
    pub id: Uuid,
    /// Window captured at press time; never re-acquired while tracking
    pub candidate: WindowId,
    /// Resolved-zone index currently highlighted, if any
    pub highlighted: Option<usize>,
}

impl DragSession {
    fn new(candidate: WindowId) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate,
            highlighted: None,
        }
    }
}

enum GestureState {
    Idle,
    Armed(DragSession),
    Tracking(DragSession),
}

/// Observable state of the recognizer, exposed for tests and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureStateKind {
    Idle,
    Armed,
    Tracking,
}

/// Terminal result of a gesture, handed to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Release landed inside a zone; `zone_index` indexes the resolved
    /// zone list passed to `handle_event`.
    Dropped {
        window: WindowId,
        zone_index: usize,
    },
    Cancelled,
}

/// Telemetry for gesture processing
#[derive(Debug, Default, Clone)]
pub struct GestureMetrics {
    pub gestures_armed: u64,
    pub gestures_tracked: u64,
    pub drops: u64,
    pub cancellations: u64,
    pub cooldown_suppressed: u64,
}

/// Recognizes the modifier-held drag gesture from the global pointer stream
///
/// States: Idle -> Armed -> Tracking -> (Dropped | Cancelled) -> Idle. The
/// engine drives overlay visibility and highlighting but never moves a
/// window itself; the host window manager's own drag loop runs concurrently
/// and a move only happens downstream of a `Dropped` outcome. All methods
/// are called from the single engine context; per-event work is O(zones).
pub struct GestureEngine {
    windowing: Arc<dyn WindowingProvider>,
    overlay: Arc<dyn OverlayProvider>,
    denylist: DenyList,
    config: GestureConfig,
    state: GestureState,
    last_release: Option<Instant>,
    metrics: GestureMetrics,
}

impl GestureEngine {
    pub fn new(
        windowing: Arc<dyn WindowingProvider>,
        overlay: Arc<dyn OverlayProvider>,
        denylist: DenyList,
        config: GestureConfig,
    ) -> Self {
        Self {
            windowing,
            overlay,
            denylist,
            config,
            state: GestureState::Idle,
            last_release: None,
            metrics: GestureMetrics::default(),
        }
    }

    pub fn state_kind(&self) -> GestureStateKind {
        match self.state {
            GestureState::Idle => GestureStateKind::Idle,
            GestureState::Armed(_) => GestureStateKind::Armed,
            GestureState::Tracking(_) => GestureStateKind::Tracking,
        }
    }

    pub fn metrics(&self) -> GestureMetrics {
        self.metrics.clone()
    }

    /// Abort any in-flight gesture and tear down overlays
    pub fn reset(&mut self) {
        if matches!(self.state, GestureState::Tracking(_)) {
            self.hide_overlays();
        }
        self.state = GestureState::Idle;
    }

    /// Feed one pointer event through the state machine.
    ///
    /// `zones` is the current resolved zone list; the returned outcome is
    /// only present on a terminal transition.
    pub fn handle_event(
        &mut self,
        event: &PointerEvent,
        zones: &[ResolvedZone],
    ) -> Option<GestureOutcome> {
        match event.kind {
            PointerEventKind::Press => self.on_press(event),
            PointerEventKind::Move => self.on_move(event, zones),
            PointerEventKind::Release => self.on_release(event, zones),
        }
    }

    fn on_press(&mut self, event: &PointerEvent) -> Option<GestureOutcome> {
        // A new press always supersedes stale gesture state.
        if !matches!(self.state, GestureState::Idle) {
            warn!("Press observed with a gesture in flight; resetting");
            self.reset();
            self.metrics.cancellations += 1;
        }

        if !event.modifier_held {
            return None;
        }

        if let Some(last_release) = self.last_release {
            if event.at.saturating_duration_since(last_release) < self.config.cooldown {
                self.metrics.cooldown_suppressed += 1;
                debug!("Press within release cooldown; ignoring");
                return None;
            }
        }

        let candidate = self
            .windowing
            .window_at(event.position)
            .ok()
            .flatten()
            .or_else(|| self.windowing.foreground_window().ok().flatten());

        match candidate {
            Some(window) => {
                let session = DragSession::new(window);
                debug!(gesture = %session.id, window, "Gesture armed");
                self.state = GestureState::Armed(session);
                self.metrics.gestures_armed += 1;
            }
            None => {
                debug!("Press with modifier but no candidate window");
            }
        }

        None
    }

    fn on_move(&mut self, event: &PointerEvent, zones: &[ResolvedZone]) -> Option<GestureOutcome> {
        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Idle => None,

            GestureState::Armed(session) => {
                if !event.modifier_held {
                    debug!(gesture = %session.id, "Modifier released before tracking; cancelled");
                    self.metrics.cancellations += 1;
                    return Some(GestureOutcome::Cancelled);
                }

                if !self.candidate_is_draggable(session.candidate) {
                    debug!(gesture = %session.id, window = session.candidate, "Candidate not draggable; cancelled");
                    self.metrics.cancellations += 1;
                    return Some(GestureOutcome::Cancelled);
                }

                if let Err(err) = self.overlay.show_zones(zones) {
                    warn!(error = %err, "Failed to show zone overlays");
                }

                let mut session = session;
                let hit = zone_at(zones, event.position);
                self.apply_highlight(&mut session, hit);

                debug!(gesture = %session.id, zones = zones.len(), "Gesture tracking");
                self.state = GestureState::Tracking(session);
                self.metrics.gestures_tracked += 1;
                None
            }

            GestureState::Tracking(mut session) => {
                let hit = zone_at(zones, event.position);
                self.apply_highlight(&mut session, hit);
                self.state = GestureState::Tracking(session);
                None
            }
        }
    }

    fn on_release(
        &mut self,
        event: &PointerEvent,
        zones: &[ResolvedZone],
    ) -> Option<GestureOutcome> {
        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Idle => None,

            GestureState::Armed(session) => {
                // Never entered tracking, so no overlays to tear down.
                debug!(gesture = %session.id, "Released while armed; cancelled");
                self.last_release = Some(event.at);
                self.metrics.cancellations += 1;
                Some(GestureOutcome::Cancelled)
            }

            GestureState::Tracking(session) => {
                let hit = zone_at(zones, event.position);
                self.hide_overlays();
                self.last_release = Some(event.at);

                match hit {
                    Some(zone_index) => {
                        debug!(
                            gesture = %session.id,
                            window = session.candidate,
                            zone = zones[zone_index].number,
                            "Gesture dropped"
                        );
                        self.metrics.drops += 1;
                        Some(GestureOutcome::Dropped {
                            window: session.candidate,
                            zone_index,
                        })
                    }
                    None => {
                        debug!(gesture = %session.id, "Released outside every zone; cancelled");
                        self.metrics.cancellations += 1;
                        Some(GestureOutcome::Cancelled)
                    }
                }
            }
        }
    }

    /// Checks run when a gesture tries to enter tracking: the candidate
    /// must still be a live, visible, non-minimized window that is neither
    /// one of our overlays nor a denylisted shell window.
    fn candidate_is_draggable(&self, window: WindowId) -> bool {
        if !self.windowing.is_window(window) {
            return false;
        }
        if !self.windowing.is_visible(window) || self.windowing.is_minimized(window) {
            return false;
        }
        if self.overlay.owns_window(window) {
            return false;
        }
        if let Some(class) = self.windowing.window_class(window) {
            if self.denylist.matches(&class) {
                return false;
            }
        }
        true
    }

    fn apply_highlight(&self, session: &mut DragSession, hit: Option<usize>) {
        if session.highlighted != hit {
            if let Err(err) = self.overlay.set_highlight(hit) {
                warn!(error = %err, "Failed to update zone highlight");
            }
            session.highlighted = hit;
        }
    }

    fn hide_overlays(&self) {
        if let Err(err) = self.overlay.hide_all() {
            warn!(error = %err, "Failed to hide zone overlays");
        }
    }
}
