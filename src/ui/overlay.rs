use crate::macos::windowing::WindowId;
use crate::models::ResolvedZone;
use crate::Result;
use std::collections::HashSet;
use std::sync::RwLock;

/// Collaborator that renders zone overlays on screen
///
/// The gesture engine creates, highlights, and tears down overlays through
/// this surface but never specifies their visuals. `owns_window` lets the
/// engine and the placement executor refuse to treat an overlay as a drag
/// candidate or placement target.
pub trait OverlayProvider: Send + Sync {
    /// Show one overlay per resolved zone, numbered for the user
    fn show_zones(&self, zones: &[ResolvedZone]) -> Result<()>;

    /// Mark exactly one zone highlighted (or none); all others are cleared
    fn set_highlight(&self, index: Option<usize>) -> Result<()>;

    /// Tear down every overlay
    fn hide_all(&self) -> Result<()>;

    /// Whether the window id belongs to one of our own overlays
    fn owns_window(&self, id: WindowId) -> bool;
}

/// In-memory overlay provider for tests
///
/// Records the visible zone set and the highlighted index so tests can
/// assert on overlay behaviour without a display server.
#[derive(Debug, Default)]
pub struct InMemoryOverlayProvider {
    visible: RwLock<Vec<ResolvedZone>>,
    highlighted: RwLock<Option<usize>>,
    overlay_window_ids: RwLock<HashSet<WindowId>>,
    show_calls: RwLock<u64>,
    hide_calls: RwLock<u64>,
}

impl InMemoryOverlayProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a window id that should be treated as one of our overlays
    pub fn register_overlay_window(&self, id: WindowId) {
        self.overlay_window_ids.write().unwrap().insert(id);
    }

    pub fn visible_zones(&self) -> Vec<ResolvedZone> {
        self.visible.read().unwrap().clone()
    }

    pub fn highlighted(&self) -> Option<usize> {
        *self.highlighted.read().unwrap()
    }

    pub fn show_calls(&self) -> u64 {
        *self.show_calls.read().unwrap()
    }

    pub fn hide_calls(&self) -> u64 {
        *self.hide_calls.read().unwrap()
    }
}

impl OverlayProvider for InMemoryOverlayProvider {
    fn show_zones(&self, zones: &[ResolvedZone]) -> Result<()> {
        *self.visible.write().unwrap() = zones.to_vec();
        *self.highlighted.write().unwrap() = None;
        *self.show_calls.write().unwrap() += 1;
        Ok(())
    }

    fn set_highlight(&self, index: Option<usize>) -> Result<()> {
        *self.highlighted.write().unwrap() = index;
        Ok(())
    }

    fn hide_all(&self) -> Result<()> {
        self.visible.write().unwrap().clear();
        *self.highlighted.write().unwrap() = None;
        *self.hide_calls.write().unwrap() += 1;
        Ok(())
    }

    fn owns_window(&self, id: WindowId) -> bool {
        self.overlay_window_ids.read().unwrap().contains(&id)
    }
}

/// System overlay provider backed by borderless windows
#[derive(Debug, Default)]
pub struct SystemOverlayProvider {
    state: RwLock<platform::OverlayState>,
}

impl SystemOverlayProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverlayProvider for SystemOverlayProvider {
    fn show_zones(&self, zones: &[ResolvedZone]) -> Result<()> {
        let mut state = self.state.write().unwrap();
        platform::show_zones(&mut state, zones)
    }

    fn set_highlight(&self, index: Option<usize>) -> Result<()> {
        let state = self.state.read().unwrap();
        platform::set_highlight(&state, index)
    }

    fn hide_all(&self) -> Result<()> {
        let mut state = self.state.write().unwrap();
        platform::hide_all(&mut state)
    }

    fn owns_window(&self, id: WindowId) -> bool {
        let state = self.state.read().unwrap();
        platform::owns_window(&state, id)
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use super::*;
    use cocoa::base::{id, nil, NO, YES};
    use cocoa::foundation::{NSAutoreleasePool, NSPoint, NSRect, NSSize, NSString};
    use core_graphics::display::CGDisplay;
    use objc::{class, msg_send, sel, sel_impl};

    const NS_BACKING_STORE_BUFFERED: u64 = 2;
    /// Just above the normal window layer so overlays cover the dragged window
    const OVERLAY_WINDOW_LEVEL: i64 = 3;

    /// One borderless overlay window, held as a raw pointer value.
    ///
    /// All overlay calls happen on the single engine thread; the usize
    /// handle is never dereferenced anywhere else.
    #[derive(Debug)]
    struct OverlayWindow {
        handle: usize,
        window_number: WindowId,
    }

    #[derive(Debug, Default)]
    pub struct OverlayState {
        windows: Vec<OverlayWindow>,
    }

    pub fn show_zones(state: &mut OverlayState, zones: &[ResolvedZone]) -> Result<()> {
        hide_all(state)?;

        let primary_height = CGDisplay::main().bounds().size.height;

        unsafe {
            let _pool = NSAutoreleasePool::new(nil);

            for zone in zones {
                let frame = flipped_frame(zone, primary_height);

                let window: id = msg_send![class!(NSWindow), alloc];
                let window: id = msg_send![window,
                    initWithContentRect:frame
                    styleMask:0u64
                    backing:NS_BACKING_STORE_BUFFERED
                    defer:NO];
                if window == nil {
                    continue;
                }

                let title = NSString::alloc(nil).init_str(&format!("{}", zone.number));
                let _: () = msg_send![window, setTitle: title];
                let _: () = msg_send![window, setLevel: OVERLAY_WINDOW_LEVEL];
                let _: () = msg_send![window, setOpaque: NO];
                let _: () = msg_send![window, setIgnoresMouseEvents: YES];
                let _: () = msg_send![window, setAlphaValue: 0.4f64];
                let _: () = msg_send![window, orderFrontRegardless];

                let window_number: i64 = msg_send![window, windowNumber];
                state.windows.push(OverlayWindow {
                    handle: window as usize,
                    window_number: window_number as WindowId,
                });
            }
        }

        Ok(())
    }

    pub fn set_highlight(state: &OverlayState, index: Option<usize>) -> Result<()> {
        unsafe {
            for (position, overlay) in state.windows.iter().enumerate() {
                let window = overlay.handle as id;
                let alpha: f64 = if Some(position) == index { 0.8 } else { 0.4 };
                let _: () = msg_send![window, setAlphaValue: alpha];
            }
        }
        Ok(())
    }

    pub fn hide_all(state: &mut OverlayState) -> Result<()> {
        unsafe {
            for overlay in state.windows.drain(..) {
                let window = overlay.handle as id;
                let _: () = msg_send![window, orderOut: nil];
                let _: () = msg_send![window, close];
            }
        }
        Ok(())
    }

    pub fn owns_window(state: &OverlayState, id: WindowId) -> bool {
        state.windows.iter().any(|w| w.window_number == id)
    }

    /// AppKit frames use a bottom-left origin; zones are in top-left
    /// global coordinates.
    fn flipped_frame(zone: &ResolvedZone, primary_height: f64) -> NSRect {
        let y = primary_height - (zone.rect.y + zone.rect.height) as f64;
        NSRect::new(
            NSPoint::new(zone.rect.x as f64, y),
            NSSize::new(zone.rect.width as f64, zone.rect.height as f64),
        )
    }
}

#[cfg(not(target_os = "macos"))]
mod platform {
    use super::*;
    use crate::ZoneRSError;

    #[derive(Debug, Default)]
    pub struct OverlayState;

    pub fn show_zones(_state: &mut OverlayState, _zones: &[ResolvedZone]) -> Result<()> {
        Err(ZoneRSError::MacOSAPIError(
            "overlay windows are not supported on this platform".into(),
        )
        .into())
    }

    pub fn set_highlight(_state: &OverlayState, _index: Option<usize>) -> Result<()> {
        Ok(())
    }

    pub fn hide_all(_state: &mut OverlayState) -> Result<()> {
        Ok(())
    }

    pub fn owns_window(_state: &OverlayState, _id: WindowId) -> bool {
        false
    }
}
