use crate::models::{MonitorDescriptor, Rect};
use crate::{Result, ZoneRSError};
use std::sync::RwLock;

/// Abstraction over monitor enumeration
///
/// Implementations return descriptors ordered primary-first; ordinals are
/// assigned by position and are stable only within a session.
pub trait DisplayProvider: Send + Sync {
    /// Snapshot all connected monitors
    fn list_monitors(&self) -> Result<Vec<MonitorDescriptor>>;

    /// Query a monitor by its 1-based ordinal
    fn monitor(&self, ordinal: u32) -> Result<Option<MonitorDescriptor>> {
        Ok(self
            .list_monitors()?
            .into_iter()
            .find(|m| m.ordinal == ordinal))
    }
}

/// System-backed display provider
#[derive(Debug, Default)]
pub struct SystemDisplayProvider;

impl SystemDisplayProvider {
    pub fn new() -> Self {
        Self
    }
}

impl DisplayProvider for SystemDisplayProvider {
    fn list_monitors(&self) -> Result<Vec<MonitorDescriptor>> {
        platform::list_monitors()
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use super::*;
    use cocoa::appkit::NSScreen;
    use cocoa::base::{id, nil};
    use cocoa::foundation::{NSArray, NSRect};
    use core_graphics::display::CGDisplay;

    pub fn list_monitors() -> Result<Vec<MonitorDescriptor>> {
        let main_id = CGDisplay::main().id;
        let mut ids = CGDisplay::active_displays().map_err(|err| {
            ZoneRSError::MacOSAPIError(format!("CGGetActiveDisplayList failed: {:?}", err))
        })?;

        // Primary display gets ordinal 1; the rest keep enumeration order.
        ids.sort_by_key(|display_id| if *display_id == main_id { 0 } else { 1 });

        let primary_height = CGDisplay::new(main_id).bounds().size.height;
        let visible_frames = visible_frames_by_screen();

        let mut monitors = Vec::with_capacity(ids.len());
        for (index, display_id) in ids.iter().enumerate() {
            let cg_bounds = CGDisplay::new(*display_id).bounds();
            let bounds = Rect::new(
                cg_bounds.origin.x as i32,
                cg_bounds.origin.y as i32,
                cg_bounds.size.width as i32,
                cg_bounds.size.height as i32,
            );

            // NSScreen order is assumed to match the active display list;
            // fall back to the full bounds when it does not.
            let work_area = visible_frames
                .get(index)
                .map(|frame| flip_to_global(*frame, primary_height))
                .unwrap_or(bounds);

            monitors.push(MonitorDescriptor::new(
                index as u32 + 1,
                bounds,
                work_area,
                *display_id == main_id,
            ));
        }

        Ok(monitors)
    }

    fn visible_frames_by_screen() -> Vec<NSRect> {
        unsafe {
            let screens: id = NSScreen::screens(nil);
            if screens == nil {
                return Vec::new();
            }

            let count = NSArray::count(screens);
            let mut frames = Vec::with_capacity(count as usize);
            for index in 0..count {
                let screen: id = NSArray::objectAtIndex(screens, index);
                frames.push(NSScreen::visibleFrame(screen));
            }
            frames
        }
    }

    /// AppKit reports frames with a bottom-left origin; the zone engine
    /// works in the top-left global space Core Graphics reports.
    fn flip_to_global(frame: NSRect, primary_height: f64) -> Rect {
        let y = primary_height - (frame.origin.y + frame.size.height);
        Rect::new(
            frame.origin.x as i32,
            y as i32,
            frame.size.width as i32,
            frame.size.height as i32,
        )
    }
}

#[cfg(not(target_os = "macos"))]
mod platform {
    use super::*;

    pub fn list_monitors() -> Result<Vec<MonitorDescriptor>> {
        Err(ZoneRSError::MacOSAPIError(
            "display enumeration is not supported on this platform".into(),
        )
        .into())
    }
}

/// In-memory display provider for tests and headless runs
///
/// The monitor list can be swapped at runtime to simulate topology changes.
#[derive(Debug, Default)]
pub struct InMemoryDisplayProvider {
    monitors: RwLock<Vec<MonitorDescriptor>>,
}

impl InMemoryDisplayProvider {
    pub fn new_with(monitors: Vec<MonitorDescriptor>) -> Self {
        Self {
            monitors: RwLock::new(monitors),
        }
    }

    /// Replace the simulated topology wholesale
    pub fn set_monitors(&self, monitors: Vec<MonitorDescriptor>) {
        *self.monitors.write().unwrap() = monitors;
    }
}

impl DisplayProvider for InMemoryDisplayProvider {
    fn list_monitors(&self) -> Result<Vec<MonitorDescriptor>> {
        Ok(self.monitors.read().unwrap().clone())
    }
}
