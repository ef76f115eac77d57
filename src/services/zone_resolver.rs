use crate::models::{MonitorDescriptor, Point, Rect, ResolvedZone, ZoneDescriptor};
use tracing::debug;

/// Resolve percentage descriptors into absolute pixel zones against the
/// current topology.
///
/// Descriptors whose monitor ordinal falls outside the topology are
/// orphaned: skipped, counted, and excluded from the result. Skips never
/// shift zone numbering; `ResolvedZone::number` is always the original
/// 1-based list position, so hotkeys keep referring to the same descriptor
/// even while it is hidden.
pub fn resolve(descriptors: &[ZoneDescriptor], topology: &[MonitorDescriptor]) -> Vec<ResolvedZone> {
    let mut resolved = Vec::with_capacity(descriptors.len());
    let mut skipped = 0usize;

    for (index, descriptor) in descriptors.iter().enumerate() {
        if descriptor.is_orphaned(topology.len()) {
            skipped += 1;
            continue;
        }

        let monitor = &topology[descriptor.monitor as usize - 1];
        resolved.push(ResolvedZone {
            number: index + 1,
            rect: resolve_rect(descriptor, monitor.work_area),
            monitor: descriptor.monitor,
            name: descriptor.name.clone(),
        });
    }

    if skipped > 0 {
        debug!(skipped, "Skipped orphaned zone descriptors during resolution");
    }

    resolved
}

/// Pixel rectangle for one descriptor against a working area.
///
/// Each axis is computed independently and truncated to integer pixels.
pub fn resolve_rect(descriptor: &ZoneDescriptor, work_area: Rect) -> Rect {
    let x = work_area.x + (work_area.width as f64 * descriptor.x / 100.0) as i32;
    let y = work_area.y + (work_area.height as f64 * descriptor.y / 100.0) as i32;
    let width = (work_area.width as f64 * descriptor.width / 100.0) as i32;
    let height = (work_area.height as f64 * descriptor.height / 100.0) as i32;
    Rect::new(x, y, width, height)
}

/// Number of descriptors orphaned by the current topology
pub fn missing_monitor_zone_count(
    descriptors: &[ZoneDescriptor],
    topology: &[MonitorDescriptor],
) -> usize {
    descriptors
        .iter()
        .filter(|d| d.is_orphaned(topology.len()))
        .count()
}

pub fn has_orphans(descriptors: &[ZoneDescriptor], topology: &[MonitorDescriptor]) -> bool {
    missing_monitor_zone_count(descriptors, topology) > 0
}

/// Index of the zone containing `point`, if any.
///
/// Overlapping zones are a supported authoring pattern; the last-listed
/// zone is rendered topmost and is what the user perceives as the target,
/// so the scan runs in reverse index order and returns the first match.
/// Both the drag highlight and the drop-target queries go through this
/// single function.
pub fn zone_at(zones: &[ResolvedZone], point: Point) -> Option<usize> {
    zones
        .iter()
        .enumerate()
        .rev()
        .find(|(_, zone)| zone.rect.contains(point))
        .map(|(index, _)| index)
}
