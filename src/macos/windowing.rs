use crate::models::{Point, Rect};
use crate::{Result, ZoneRSError};
use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

/// Opaque window identifier handed out by the windowing provider
pub type WindowId = u32;

/// OS-level placement strategies, tried in order until one is reported
/// successful. Windows that refuse one call shape sometimes accept another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementStrategy {
    /// Set position and size in one call
    SetFrame,
    /// Move without touching the size
    MoveOnly,
    /// Two-step move then resize
    MoveThenResize,
}

impl PlacementStrategy {
    /// The order in which the placement executor tries strategies
    pub fn ordered() -> [PlacementStrategy; 3] {
        [
            PlacementStrategy::SetFrame,
            PlacementStrategy::MoveOnly,
            PlacementStrategy::MoveThenResize,
        ]
    }
}

/// Abstraction over the OS windowing API
///
/// The zone engine only consumes this surface: window discovery, state
/// queries, and frame manipulation. Reported success from
/// `apply_placement` is advisory; callers verify by re-reading the frame.
pub trait WindowingProvider: Send + Sync {
    /// The currently focused top-level window
    fn foreground_window(&self) -> Result<Option<WindowId>>;

    /// The topmost window under a screen point
    fn window_at(&self, point: Point) -> Result<Option<WindowId>>;

    /// Whether the id still names a live window
    fn is_window(&self, id: WindowId) -> bool;

    fn is_visible(&self, id: WindowId) -> bool;

    fn is_minimized(&self, id: WindowId) -> bool;

    /// Window class / bundle identifier used for denylist checks
    fn window_class(&self, id: WindowId) -> Option<String>;

    /// Restore a minimized window
    fn restore(&self, id: WindowId) -> Result<()>;

    /// Current frame in global pixel coordinates
    fn window_frame(&self, id: WindowId) -> Result<Rect>;

    /// Attempt one placement strategy; the returned bool is what the OS
    /// reported, not whether the window actually moved.
    fn apply_placement(&self, id: WindowId, frame: Rect, strategy: PlacementStrategy)
        -> Result<bool>;
}

/// System-backed windowing provider
///
/// The Accessibility bridge populates this; on hosts without the bridge
/// every call surfaces a friendly error so higher layers can fall back.
#[derive(Debug, Default)]
pub struct SystemWindowingProvider;

impl SystemWindowingProvider {
    pub fn new() -> Self {
        Self
    }

    fn unavailable<T>(&self) -> Result<T> {
        Err(ZoneRSError::MacOSAPIError(
            "SystemWindowingProvider is not available in this environment".into(),
        )
        .into())
    }
}

impl WindowingProvider for SystemWindowingProvider {
    fn foreground_window(&self) -> Result<Option<WindowId>> {
        self.unavailable()
    }

    fn window_at(&self, _point: Point) -> Result<Option<WindowId>> {
        self.unavailable()
    }

    fn is_window(&self, _id: WindowId) -> bool {
        false
    }

    fn is_visible(&self, _id: WindowId) -> bool {
        false
    }

    fn is_minimized(&self, _id: WindowId) -> bool {
        false
    }

    fn window_class(&self, _id: WindowId) -> Option<String> {
        None
    }

    fn restore(&self, _id: WindowId) -> Result<()> {
        self.unavailable()
    }

    fn window_frame(&self, _id: WindowId) -> Result<Rect> {
        self.unavailable()
    }

    fn apply_placement(
        &self,
        _id: WindowId,
        _frame: Rect,
        _strategy: PlacementStrategy,
    ) -> Result<bool> {
        self.unavailable()
    }
}

/// A window simulated by [`InMemoryWindowingProvider`]
#[derive(Debug, Clone)]
pub struct SimulatedWindow {
    pub id: WindowId,
    pub frame: Rect,
    pub class: String,
    pub visible: bool,
    pub minimized: bool,
    /// Whether placement calls may change the position
    pub movable: bool,
    /// Whether placement calls may change the size
    pub resizable: bool,
}

impl SimulatedWindow {
    pub fn new(id: WindowId, frame: Rect) -> Self {
        Self {
            id,
            frame,
            class: "com.example.app".to_string(),
            visible: true,
            minimized: false,
            movable: true,
            resizable: true,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    pub fn minimized(mut self) -> Self {
        self.minimized = true;
        self
    }

    /// A window that accepts placement calls but never actually moves or
    /// resizes, the way fixed-size dialogs and elevated windows behave.
    pub fn frozen(mut self) -> Self {
        self.movable = false;
        self.resizable = false;
        self
    }
}

/// In-memory windowing provider for tests
///
/// `window_at` resolves to the highest id containing the point (later
/// windows sit above earlier ones). Strategies listed in
/// `failing_strategies` are reported unsuccessful without touching the
/// frame, which exercises the executor's fallback order.
#[derive(Debug, Default)]
pub struct InMemoryWindowingProvider {
    windows: RwLock<BTreeMap<WindowId, SimulatedWindow>>,
    foreground: RwLock<Option<WindowId>>,
    failing_strategies: RwLock<HashSet<PlacementStrategy>>,
}

impl InMemoryWindowingProvider {
    pub fn new_with(windows: Vec<SimulatedWindow>) -> Self {
        let mut map = BTreeMap::new();
        for window in windows {
            map.insert(window.id, window);
        }
        Self {
            windows: RwLock::new(map),
            foreground: RwLock::new(None),
            failing_strategies: RwLock::new(HashSet::new()),
        }
    }

    pub fn insert(&self, window: SimulatedWindow) {
        self.windows.write().unwrap().insert(window.id, window);
    }

    pub fn remove(&self, id: WindowId) {
        self.windows.write().unwrap().remove(&id);
    }

    pub fn set_foreground(&self, id: Option<WindowId>) {
        *self.foreground.write().unwrap() = id;
    }

    pub fn set_failing_strategies(&self, strategies: &[PlacementStrategy]) {
        *self.failing_strategies.write().unwrap() = strategies.iter().copied().collect();
    }

    pub fn frame_of(&self, id: WindowId) -> Option<Rect> {
        self.windows.read().unwrap().get(&id).map(|w| w.frame)
    }
}

impl WindowingProvider for InMemoryWindowingProvider {
    fn foreground_window(&self) -> Result<Option<WindowId>> {
        Ok(*self.foreground.read().unwrap())
    }

    fn window_at(&self, point: Point) -> Result<Option<WindowId>> {
        let windows = self.windows.read().unwrap();
        Ok(windows
            .values()
            .rev()
            .find(|w| w.visible && !w.minimized && w.frame.contains(point))
            .map(|w| w.id))
    }

    fn is_window(&self, id: WindowId) -> bool {
        self.windows.read().unwrap().contains_key(&id)
    }

    fn is_visible(&self, id: WindowId) -> bool {
        self.windows
            .read()
            .unwrap()
            .get(&id)
            .map(|w| w.visible)
            .unwrap_or(false)
    }

    fn is_minimized(&self, id: WindowId) -> bool {
        self.windows
            .read()
            .unwrap()
            .get(&id)
            .map(|w| w.minimized)
            .unwrap_or(false)
    }

    fn window_class(&self, id: WindowId) -> Option<String> {
        self.windows.read().unwrap().get(&id).map(|w| w.class.clone())
    }

    fn restore(&self, id: WindowId) -> Result<()> {
        let mut windows = self.windows.write().unwrap();
        match windows.get_mut(&id) {
            Some(window) => {
                window.minimized = false;
                Ok(())
            }
            None => Err(ZoneRSError::WindowNotFound(id).into()),
        }
    }

    fn window_frame(&self, id: WindowId) -> Result<Rect> {
        self.windows
            .read()
            .unwrap()
            .get(&id)
            .map(|w| w.frame)
            .ok_or_else(|| ZoneRSError::WindowNotFound(id).into())
    }

    fn apply_placement(
        &self,
        id: WindowId,
        frame: Rect,
        strategy: PlacementStrategy,
    ) -> Result<bool> {
        if self.failing_strategies.read().unwrap().contains(&strategy) {
            return Ok(false);
        }

        let mut windows = self.windows.write().unwrap();
        let window = windows
            .get_mut(&id)
            .ok_or(ZoneRSError::WindowNotFound(id))?;

        match strategy {
            PlacementStrategy::SetFrame | PlacementStrategy::MoveThenResize => {
                if window.movable {
                    window.frame.x = frame.x;
                    window.frame.y = frame.y;
                }
                if window.resizable {
                    window.frame.width = frame.width;
                    window.frame.height = frame.height;
                }
            }
            PlacementStrategy::MoveOnly => {
                if window.movable {
                    window.frame.x = frame.x;
                    window.frame.y = frame.y;
                }
            }
        }

        // The simulated OS reports success whenever the call was accepted,
        // even for windows that silently refused to move.
        Ok(true)
    }
}
