use crate::models::geometry::Rect;
use serde::{Deserialize, Serialize};

/// Current on-disk format version for [`ZoneSettings`]
pub const SETTINGS_VERSION: i32 = 2;

/// A zone layout entry: a named rectangle expressed as percentages of one
/// monitor's working area
///
/// Percentages are resolution-independent; the descriptor survives monitor
/// resolution changes unchanged. The list position of a descriptor inside
/// [`ZoneSettings`] is significant: it defines the 1-based zone number shown
/// to the user, the hotkey binding for zones 1-9, and the z-order of
/// overlapping zones (last-listed is topmost).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ZoneDescriptor {
    /// 1-based monitor ordinal at the time the layout was saved
    pub monitor: u32,
    /// Left edge as a percentage (0-100) of the monitor working area width
    pub x: f64,
    /// Top edge as a percentage (0-100) of the monitor working area height
    pub y: f64,
    /// Width as a percentage (0-100) of the monitor working area width
    pub width: f64,
    /// Height as a percentage (0-100) of the monitor working area height
    pub height: f64,
    /// Human-readable zone name
    pub name: String,
}

impl ZoneDescriptor {
    pub fn new(
        monitor: u32,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        name: impl Into<String>,
    ) -> Self {
        Self {
            monitor,
            x,
            y,
            width,
            height,
            name: name.into(),
        }
    }

    /// A descriptor is orphaned when its monitor ordinal exceeds the number
    /// of currently connected monitors.
    pub fn is_orphaned(&self, monitor_count: usize) -> bool {
        self.monitor == 0 || self.monitor as usize > monitor_count
    }

    /// Validate percentage ranges and the monitor reference
    pub fn validate(&self) -> Result<(), ZoneConfigError> {
        if self.monitor == 0 {
            return Err(ZoneConfigError::InvalidMonitor(self.monitor));
        }

        for (field, value) in [("X", self.x), ("Y", self.y)] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ZoneConfigError::InvalidPercentage { field, value });
            }
        }

        for (field, value) in [("Width", self.width), ("Height", self.height)] {
            if value <= 0.0 || value > 100.0 {
                return Err(ZoneConfigError::InvalidPercentage { field, value });
            }
        }

        Ok(())
    }

    /// Overwrite this descriptor's percentages from an absolute pixel
    /// rectangle measured against the given monitor working area.
    ///
    /// Re-resolving the updated percentages against the same working area
    /// reproduces `rect` within one pixel.
    pub fn set_from_rect(&mut self, rect: Rect, work_area: Rect) -> Result<(), ZoneConfigError> {
        let (x, y, width, height) = percentages_from_rect(rect, work_area)?;
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        Ok(())
    }
}

/// Convert an absolute pixel rectangle into working-area percentages
pub fn percentages_from_rect(
    rect: Rect,
    work_area: Rect,
) -> Result<(f64, f64, f64, f64), ZoneConfigError> {
    if work_area.width <= 0 || work_area.height <= 0 {
        return Err(ZoneConfigError::DegenerateWorkArea);
    }

    let x = (rect.x - work_area.x) as f64 * 100.0 / work_area.width as f64;
    let y = (rect.y - work_area.y) as f64 * 100.0 / work_area.height as f64;
    let width = rect.width as f64 * 100.0 / work_area.width as f64;
    let height = rect.height as f64 * 100.0 / work_area.height as f64;

    Ok((x, y, width, height))
}

/// A zone resolved to absolute pixels against the current topology
///
/// Ephemeral: recomputed whenever the configuration or topology changes,
/// never persisted. The resolved list is index-aligned with the subset of
/// non-orphaned descriptors in their original relative order, while
/// `number` keeps the original 1-based list position so zone numbering and
/// hotkey bindings survive orphan skips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedZone {
    /// 1-based position in the descriptor list, orphans included
    pub number: usize,
    /// Absolute pixel rectangle on the mapped monitor
    pub rect: Rect,
    /// Monitor ordinal the zone resolved against
    pub monitor: u32,
    pub name: String,
}

/// The persisted zone configuration record
///
/// Created with generated defaults on first run, loaded at startup,
/// replaced wholesale on reset, mutated field-by-field during interactive
/// editing, and persisted only on explicit save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ZoneSettings {
    pub zones: Vec<ZoneDescriptor>,
    pub version: i32,
    /// Topology fingerprint captured at the last successful save. Absent in
    /// records written by older versions; treated as first run, not as a
    /// topology mismatch.
    #[serde(default)]
    pub monitor_fingerprint: String,
}

impl ZoneSettings {
    /// Generate the default layout for `monitor_count` connected monitors.
    ///
    /// Monitor 1 gets four quarters plus a left and right half; the halves
    /// deliberately overlap the quarters and sit above them in z-order.
    /// Every monitor beyond the first gets a top half, a bottom half, and a
    /// full-screen zone.
    pub fn generate_defaults(monitor_count: usize) -> Self {
        let mut zones = Vec::new();

        if monitor_count >= 1 {
            zones.push(ZoneDescriptor::new(1, 0.0, 0.0, 50.0, 50.0, "Top Left Quarter"));
            zones.push(ZoneDescriptor::new(1, 50.0, 0.0, 50.0, 50.0, "Top Right Quarter"));
            zones.push(ZoneDescriptor::new(1, 0.0, 50.0, 50.0, 50.0, "Bottom Left Quarter"));
            zones.push(ZoneDescriptor::new(1, 50.0, 50.0, 50.0, 50.0, "Bottom Right Quarter"));
            zones.push(ZoneDescriptor::new(1, 0.0, 0.0, 50.0, 100.0, "Left Half"));
            zones.push(ZoneDescriptor::new(1, 50.0, 0.0, 50.0, 100.0, "Right Half"));
        }

        for ordinal in 2..=monitor_count as u32 {
            zones.push(ZoneDescriptor::new(
                ordinal,
                0.0,
                0.0,
                100.0,
                50.0,
                format!("Monitor {} Top Half", ordinal),
            ));
            zones.push(ZoneDescriptor::new(
                ordinal,
                0.0,
                50.0,
                100.0,
                50.0,
                format!("Monitor {} Bottom Half", ordinal),
            ));
            zones.push(ZoneDescriptor::new(
                ordinal,
                0.0,
                0.0,
                100.0,
                100.0,
                format!("Monitor {} Full", ordinal),
            ));
        }

        Self {
            zones,
            version: SETTINGS_VERSION,
            monitor_fingerprint: String::new(),
        }
    }

    /// Append a zone after validating it
    pub fn add_zone(&mut self, zone: ZoneDescriptor) -> Result<(), ZoneConfigError> {
        zone.validate()?;
        self.zones.push(zone);
        Ok(())
    }

    /// Remove the zone at `index` (0-based list position)
    pub fn remove_zone(&mut self, index: usize) -> Result<ZoneDescriptor, ZoneConfigError> {
        if index >= self.zones.len() {
            return Err(ZoneConfigError::ZoneIndexOutOfRange(index));
        }
        Ok(self.zones.remove(index))
    }

    /// Rename the zone at `index`
    pub fn rename_zone(
        &mut self,
        index: usize,
        name: impl Into<String>,
    ) -> Result<(), ZoneConfigError> {
        let zone = self
            .zones
            .get_mut(index)
            .ok_or(ZoneConfigError::ZoneIndexOutOfRange(index))?;
        zone.name = name.into();
        Ok(())
    }

    /// Validate every descriptor in the record
    pub fn validate(&self) -> Result<(), ZoneConfigError> {
        for zone in &self.zones {
            zone.validate()?;
        }
        Ok(())
    }
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self {
            zones: Vec::new(),
            version: SETTINGS_VERSION,
            monitor_fingerprint: String::new(),
        }
    }
}

/// Errors for zone descriptor and record validation
#[derive(Debug, thiserror::Error)]
pub enum ZoneConfigError {
    #[error("{field} percentage out of range: {value}")]
    InvalidPercentage { field: &'static str, value: f64 },

    #[error("Invalid monitor ordinal: {0}")]
    InvalidMonitor(u32),

    #[error("Zone index out of range: {0}")]
    ZoneIndexOutOfRange(usize),

    #[error("Working area has no usable size")]
    DegenerateWorkArea,
}
