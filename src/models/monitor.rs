use crate::models::geometry::Rect;
use serde::{Deserialize, Serialize};

/// A connected display as reported by the display provider
///
/// Descriptors are recomputed on demand and replaced wholesale; the ordinal
/// is stable only within a session and is what zone descriptors reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorDescriptor {
    /// 1-based position in the enumeration order
    pub ordinal: u32,
    /// Full bounding rectangle in the global coordinate space
    pub bounds: Rect,
    /// Usable rectangle excluding OS-reserved chrome (menu bar, Dock)
    pub work_area: Rect,
    /// Whether this is the primary display
    pub is_primary: bool,
}

impl MonitorDescriptor {
    pub fn new(ordinal: u32, bounds: Rect, work_area: Rect, is_primary: bool) -> Self {
        Self {
            ordinal,
            bounds,
            work_area,
            is_primary,
        }
    }
}

/// Deterministic summary of a monitor topology: `<count>:<w>x<h>@<x>,<y>;...`
///
/// Equal fingerprints mean the topologies are interaction-equivalent. The
/// converse does not hold; a repositioned monitor with unchanged resolution
/// still produces a different fingerprint.
pub fn fingerprint(monitors: &[MonitorDescriptor]) -> String {
    let rects: Vec<String> = monitors
        .iter()
        .map(|m| {
            format!(
                "{}x{}@{},{}",
                m.bounds.width, m.bounds.height, m.bounds.x, m.bounds.y
            )
        })
        .collect();
    format!("{}:{}", monitors.len(), rects.join(";"))
}

/// Returns true when the topology behind `new` differs from the one behind
/// `old`. An empty `old` fingerprint means first run and never counts as a
/// change.
pub fn has_changed(old: &str, new: &str) -> bool {
    !old.is_empty() && old != new
}

fn monitor_count(fp: &str) -> usize {
    fp.split_once(':')
        .and_then(|(count, _)| count.parse().ok())
        .unwrap_or(0)
}

/// Human-readable summary of what changed between two fingerprints,
/// distinguishing count changes from same-count rearrangement or
/// resolution changes.
pub fn describe_change(old: &str, new: &str) -> String {
    let old_count = monitor_count(old);
    let new_count = monitor_count(new);

    if old_count < new_count {
        format!(
            "monitor count changed from {} to {} ({} added)",
            old_count,
            new_count,
            new_count - old_count
        )
    } else if old_count > new_count {
        format!(
            "monitor count changed from {} to {} ({} removed)",
            old_count,
            new_count,
            old_count - new_count
        )
    } else {
        format!(
            "monitor arrangement or resolution changed ({} monitors)",
            new_count
        )
    }
}
