use crate::config::preferences::{DenyList, Preferences};
use crate::config::store::{SettingsError, ZoneSettingsStore};
use crate::macos::displays::DisplayProvider;
use crate::macos::event_source::PointerEvent;
use crate::macos::windowing::WindowingProvider;
use crate::models::{
    describe_change, fingerprint, has_changed, MonitorDescriptor, Rect, ResolvedZone, ZoneDescriptor,
    ZoneSettings,
};
use crate::services::gesture_engine::{GestureConfig, GestureEngine, GestureOutcome};
use crate::services::placement::{PlacementConfig, PlacementExecutor, PlacementMetrics};
use crate::services::zone_resolver::{missing_monitor_zone_count, resolve};
use crate::ui::overlay::OverlayProvider;
use crate::{Result, ZoneRSError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Commands consumed from the menu / hotkey layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneCommand {
    ShowZones,
    HideZones,
    ToggleZones,
    EnterEditMode,
    ExitEditMode,
    SaveLayout,
    ReloadConfiguration,
    ResetToDefaults,
    /// Snap the foreground window into zone N (1-9)
    SnapActiveWindow(u8),
}

/// A transient, non-blocking message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotificationLevel {
    Info,
    Warning,
}

impl Notification {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Info,
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Warning,
        }
    }
}

/// Telemetry for the orchestrator
#[derive(Debug, Default, Clone, Serialize)]
pub struct ZoneManagerMetrics {
    pub commands: u64,
    pub snaps: u64,
    pub snap_failures: u64,
    pub reloads: u64,
    pub topology_refreshes: u64,
}

/// Diagnostics snapshot surfaced by the CLI
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub monitor_count: usize,
    pub fingerprint: String,
    pub saved_fingerprint: String,
    pub zone_count: usize,
    pub resolved_count: usize,
    pub orphan_count: usize,
    pub zones_visible: bool,
    pub edit_mode: bool,
    pub metrics: ZoneManagerMetrics,
    pub placement: PlacementSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementSnapshot {
    pub attempts: u64,
    pub placements: u64,
    pub refusals: u64,
}

impl From<PlacementMetrics> for PlacementSnapshot {
    fn from(metrics: PlacementMetrics) -> Self {
        Self {
            attempts: metrics.attempts,
            placements: metrics.placements,
            refusals: metrics.refusals,
        }
    }
}

/// Wires topology, configuration, resolution, gesture recognition, and
/// placement together
///
/// All mutation happens on the single engine context that feeds pointer
/// events and commands in; nothing here is locked or shared.
pub struct ZoneManager {
    displays: Arc<dyn DisplayProvider>,
    windowing: Arc<dyn WindowingProvider>,
    overlay: Arc<dyn OverlayProvider>,
    store: ZoneSettingsStore,
    settings: ZoneSettings,
    topology: Vec<MonitorDescriptor>,
    resolved: Vec<ResolvedZone>,
    gesture: GestureEngine,
    executor: PlacementExecutor,
    zones_visible: bool,
    edit_mode: bool,
    metrics: ZoneManagerMetrics,
}

impl ZoneManager {
    /// Load configuration (falling back to generated defaults), read the
    /// topology, reconcile the two, and resolve the initial zone list.
    pub fn bootstrap(
        displays: Arc<dyn DisplayProvider>,
        windowing: Arc<dyn WindowingProvider>,
        overlay: Arc<dyn OverlayProvider>,
        store: ZoneSettingsStore,
        preferences: &Preferences,
    ) -> Result<Self> {
        let topology = match displays.list_monitors() {
            Ok(monitors) => monitors,
            Err(err) => {
                warn!(error = %err, "Monitor enumeration failed; starting with zero monitors");
                Vec::new()
            }
        };

        let settings = Self::load_or_default(&store, topology.len());

        let denylist = DenyList::compile(&preferences.denylist)
            .map_err(|err| ZoneRSError::ConfigurationError(err.to_string()))?;

        let gesture = GestureEngine::new(
            windowing.clone(),
            overlay.clone(),
            denylist,
            GestureConfig {
                cooldown: Duration::from_millis(preferences.gesture.cooldown_ms),
            },
        );

        let executor = PlacementExecutor::new(
            windowing.clone(),
            overlay.clone(),
            PlacementConfig::from(&preferences.placement),
        );

        let mut manager = Self {
            displays,
            windowing,
            overlay,
            store,
            settings,
            topology,
            resolved: Vec::new(),
            gesture,
            executor,
            zones_visible: false,
            edit_mode: false,
            metrics: ZoneManagerMetrics::default(),
        };

        manager.reconcile_topology();
        manager.resolve_zones();
        Ok(manager)
    }

    /// Load the persisted record; any failure degrades to generated
    /// defaults and never aborts startup. An empty zone list is treated
    /// the same as an absent record.
    fn load_or_default(store: &ZoneSettingsStore, monitor_count: usize) -> ZoneSettings {
        match store.load() {
            Ok(Some(settings)) if !settings.zones.is_empty() => {
                info!(zones = settings.zones.len(), "Loaded zone configuration");
                settings
            }
            Ok(_) => {
                info!(monitors = monitor_count, "Generating default zone layout");
                ZoneSettings::generate_defaults(monitor_count)
            }
            Err(SettingsError::CorruptConfiguration { reason }) => {
                warn!(reason = %reason, "Zone configuration was corrupt; using defaults");
                ZoneSettings::generate_defaults(monitor_count)
            }
            Err(err) => {
                warn!(error = %err, "Could not read zone configuration; using defaults");
                ZoneSettings::generate_defaults(monitor_count)
            }
        }
    }

    /// Feed one pointer event through the gesture engine and execute any
    /// resulting drop.
    pub async fn handle_pointer_event(
        &mut self,
        event: PointerEvent,
    ) -> Result<Option<Notification>> {
        let outcome = self.gesture.handle_event(&event, &self.resolved);

        match outcome {
            Some(GestureOutcome::Dropped { window, zone_index }) => {
                let zone = match self.resolved.get(zone_index) {
                    Some(zone) => zone.clone(),
                    None => return Ok(None),
                };

                let placed = self.executor.place(window, zone.rect).await?;
                Ok(Some(self.report_placement(placed, &zone.name)))
            }
            Some(GestureOutcome::Cancelled) | None => Ok(None),
        }
    }

    /// Execute one user command
    pub async fn handle_command(&mut self, command: ZoneCommand) -> Result<Option<Notification>> {
        self.metrics.commands += 1;
        debug!(?command, "Handling zone command");

        match command {
            ZoneCommand::ShowZones => {
                self.show_zones();
                Ok(None)
            }
            ZoneCommand::HideZones => {
                self.hide_zones();
                Ok(None)
            }
            ZoneCommand::ToggleZones => {
                if self.zones_visible {
                    self.hide_zones();
                } else {
                    self.show_zones();
                }
                Ok(None)
            }
            ZoneCommand::EnterEditMode => {
                self.refresh_topology();
                self.edit_mode = true;
                self.show_zones();
                Ok(Some(Notification::info(format!(
                    "Editing {} zones",
                    self.resolved.len()
                ))))
            }
            ZoneCommand::ExitEditMode => {
                self.edit_mode = false;
                self.hide_zones();
                Ok(None)
            }
            ZoneCommand::SaveLayout => Ok(Some(self.save_layout())),
            ZoneCommand::ReloadConfiguration => {
                self.metrics.reloads += 1;
                self.settings = Self::load_or_default(&self.store, self.topology.len());
                self.refresh_topology();
                Ok(self.orphan_notification())
            }
            ZoneCommand::ResetToDefaults => {
                self.settings = ZoneSettings::generate_defaults(self.topology.len());
                self.resolve_zones();
                if self.zones_visible {
                    self.show_zones();
                }
                let save_result = self.save_layout();
                Ok(Some(Notification {
                    message: format!("Layout reset to defaults ({})", save_result.message),
                    level: save_result.level,
                }))
            }
            ZoneCommand::SnapActiveWindow(number) => self.snap_active_window(number).await,
        }
    }

    /// Snap the foreground window into zone `number`. The number refers to
    /// the original descriptor list position, so a currently-orphaned zone
    /// reports unavailability instead of silently renumbering.
    async fn snap_active_window(&mut self, number: u8) -> Result<Option<Notification>> {
        if number == 0 || number > 9 {
            return Ok(Some(Notification::warning(format!(
                "Zone hotkeys cover 1-9, got {}",
                number
            ))));
        }

        let zone = self
            .resolved
            .iter()
            .find(|z| z.number == number as usize)
            .cloned();

        let zone = match zone {
            Some(zone) => zone,
            None => {
                self.metrics.snap_failures += 1;
                return Ok(Some(Notification::warning(format!(
                    "Zone {} is not available on the current monitors",
                    number
                ))));
            }
        };

        let window = self.windowing.foreground_window().ok().flatten();
        let window = match window {
            Some(window) => window,
            None => {
                self.metrics.snap_failures += 1;
                return Ok(Some(Notification::warning("No active window to snap")));
            }
        };

        let placed = self.executor.place(window, zone.rect).await?;
        Ok(Some(self.report_placement(placed, &zone.name)))
    }

    fn report_placement(&mut self, placed: bool, zone_name: &str) -> Notification {
        if placed {
            self.metrics.snaps += 1;
            Notification::info(format!("Snapped window into {}", zone_name))
        } else {
            self.metrics.snap_failures += 1;
            Notification::warning("Window does not support repositioning")
        }
    }

    /// Re-enumerate monitors, log what changed, and re-resolve zones.
    pub fn refresh_topology(&mut self) {
        let old_fingerprint = fingerprint(&self.topology);

        match self.displays.list_monitors() {
            Ok(monitors) => self.topology = monitors,
            Err(err) => {
                warn!(error = %err, "Monitor enumeration failed; keeping previous topology");
            }
        }

        let new_fingerprint = fingerprint(&self.topology);
        if has_changed(&old_fingerprint, &new_fingerprint) {
            info!(
                change = %describe_change(&old_fingerprint, &new_fingerprint),
                "Monitor topology changed"
            );
        }

        self.metrics.topology_refreshes += 1;
        self.reconcile_topology();
        self.resolve_zones();
        if self.zones_visible {
            self.show_zones();
        }
    }

    /// Compare the live topology against the fingerprint captured at the
    /// last save and warn about zones the current monitors cannot host.
    fn reconcile_topology(&mut self) {
        let live = fingerprint(&self.topology);
        if has_changed(&self.settings.monitor_fingerprint, &live) {
            info!(
                change = %describe_change(&self.settings.monitor_fingerprint, &live),
                "Monitors differ from the saved layout"
            );
        }

        let orphans = missing_monitor_zone_count(&self.settings.zones, &self.topology);
        if orphans > 0 {
            warn!(
                orphans,
                "Some zones reference monitors that are not connected"
            );
        }
    }

    fn resolve_zones(&mut self) {
        self.resolved = resolve(&self.settings.zones, &self.topology);
        debug!(
            zones = self.settings.zones.len(),
            resolved = self.resolved.len(),
            "Resolved zone geometry"
        );
    }

    fn show_zones(&mut self) {
        if let Err(err) = self.overlay.show_zones(&self.resolved) {
            warn!(error = %err, "Failed to show zone overlays");
            return;
        }
        self.zones_visible = true;
    }

    fn hide_zones(&mut self) {
        if let Err(err) = self.overlay.hide_all() {
            warn!(error = %err, "Failed to hide zone overlays");
        }
        self.zones_visible = false;
    }

    /// Persist the current layout with the live topology fingerprint.
    /// A failed save leaves the in-memory zones fully usable.
    fn save_layout(&mut self) -> Notification {
        self.settings.monitor_fingerprint = fingerprint(&self.topology);

        match self.store.save(&self.settings) {
            Ok(()) => Notification::info("Zone layout saved"),
            Err(err) => {
                warn!(error = %err, "Failed to save zone layout");
                Notification::warning(format!("Could not save zone layout: {}", err))
            }
        }
    }

    fn orphan_notification(&self) -> Option<Notification> {
        let orphans = missing_monitor_zone_count(&self.settings.zones, &self.topology);
        if orphans > 0 {
            Some(Notification::warning(format!(
                "{} zone(s) reference disconnected monitors and are hidden",
                orphans
            )))
        } else {
            None
        }
    }

    /// Write an edited pixel rectangle back into the zone's percentages.
    /// `zone_number` is the 1-based descriptor list position.
    pub fn update_zone_rect(&mut self, zone_number: usize, rect: Rect) -> Result<()> {
        let descriptor = self
            .settings
            .zones
            .get_mut(zone_number.wrapping_sub(1))
            .ok_or(ZoneRSError::ZoneNotFound(zone_number))?;

        let monitor = (descriptor.monitor as usize)
            .checked_sub(1)
            .and_then(|index| self.topology.get(index))
            .ok_or_else(|| {
                ZoneRSError::ValidationError(format!(
                    "zone {} references monitor {} which is not connected",
                    zone_number, descriptor.monitor
                ))
            })?;

        descriptor
            .set_from_rect(rect, monitor.work_area)
            .map_err(|err| ZoneRSError::ValidationError(err.to_string()))?;

        self.resolve_zones();
        if self.zones_visible {
            self.show_zones();
        }
        Ok(())
    }

    /// Append a new zone during editing
    pub fn add_zone(&mut self, descriptor: ZoneDescriptor) -> Result<()> {
        self.settings
            .add_zone(descriptor)
            .map_err(|err| ZoneRSError::ValidationError(err.to_string()))?;
        self.resolve_zones();
        Ok(())
    }

    /// Remove the zone at the 1-based list position
    pub fn remove_zone(&mut self, zone_number: usize) -> Result<ZoneDescriptor> {
        let removed = self
            .settings
            .remove_zone(zone_number.wrapping_sub(1))
            .map_err(|_| ZoneRSError::ZoneNotFound(zone_number))?;
        self.resolve_zones();
        Ok(removed)
    }

    pub fn rename_zone(&mut self, zone_number: usize, name: impl Into<String>) -> Result<()> {
        self.settings
            .rename_zone(zone_number.wrapping_sub(1), name)
            .map_err(|_| ZoneRSError::ZoneNotFound(zone_number))?;
        self.resolve_zones();
        Ok(())
    }

    pub async fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            monitor_count: self.topology.len(),
            fingerprint: fingerprint(&self.topology),
            saved_fingerprint: self.settings.monitor_fingerprint.clone(),
            zone_count: self.settings.zones.len(),
            resolved_count: self.resolved.len(),
            orphan_count: missing_monitor_zone_count(&self.settings.zones, &self.topology),
            zones_visible: self.zones_visible,
            edit_mode: self.edit_mode,
            metrics: self.metrics.clone(),
            placement: self.executor.metrics().await.into(),
        }
    }

    pub fn resolved_zones(&self) -> &[ResolvedZone] {
        &self.resolved
    }

    pub fn settings_path(&self) -> std::path::PathBuf {
        self.store.settings_path()
    }

    pub fn settings(&self) -> &ZoneSettings {
        &self.settings
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn zones_visible(&self) -> bool {
        self.zones_visible
    }
}
