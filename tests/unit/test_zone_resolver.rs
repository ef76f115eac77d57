//! Unit tests for zone geometry resolution, hit-testing, and the monitor
//! topology fingerprint.

use zoners::models::{
    describe_change, fingerprint, has_changed, MonitorDescriptor, Point, Rect, ResolvedZone,
    ZoneDescriptor,
};
use zoners::services::zone_resolver::{
    has_orphans, missing_monitor_zone_count, resolve, zone_at,
};

fn monitor(ordinal: u32, bounds: Rect, work_area: Rect) -> MonitorDescriptor {
    MonitorDescriptor::new(ordinal, bounds, work_area, ordinal == 1)
}

fn full_hd() -> Vec<MonitorDescriptor> {
    let bounds = Rect::new(0, 0, 1920, 1080);
    vec![monitor(1, bounds, bounds)]
}

#[test]
fn half_percentages_resolve_to_half_pixels() {
    let descriptor = ZoneDescriptor::new(1, 0.0, 0.0, 50.0, 50.0, "Quarter");
    let resolved = resolve(&[descriptor], &full_hd());

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].rect, Rect::new(0, 0, 960, 540));
}

#[test]
fn resolution_is_per_monitor_working_area() {
    // Secondary monitor to the right, with a 25px reserved strip at the top.
    let topology = vec![
        monitor(1, Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1080)),
        monitor(
            2,
            Rect::new(1920, 0, 2560, 1440),
            Rect::new(1920, 25, 2560, 1415),
        ),
    ];
    let descriptor = ZoneDescriptor::new(2, 0.0, 0.0, 100.0, 50.0, "Monitor 2 Top Half");

    let resolved = resolve(&[descriptor], &topology);
    assert_eq!(resolved[0].rect, Rect::new(1920, 25, 2560, 707));
}

#[test]
fn orphaned_descriptor_is_skipped_and_counted() {
    let topology = vec![
        monitor(1, Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1080)),
        monitor(
            2,
            Rect::new(1920, 0, 1920, 1080),
            Rect::new(1920, 0, 1920, 1080),
        ),
    ];
    let descriptors = vec![ZoneDescriptor::new(3, 0.0, 0.0, 50.0, 50.0, "Stale")];

    assert!(resolve(&descriptors, &topology).is_empty());
    assert_eq!(missing_monitor_zone_count(&descriptors, &topology), 1);
    assert!(has_orphans(&descriptors, &topology));
}

#[test]
fn hotkey_numbering_survives_orphan_skips() {
    let descriptors = vec![
        ZoneDescriptor::new(2, 0.0, 0.0, 100.0, 100.0, "Orphan"),
        ZoneDescriptor::new(1, 0.0, 0.0, 50.0, 100.0, "Left Half"),
        ZoneDescriptor::new(1, 50.0, 0.0, 50.0, 100.0, "Right Half"),
    ];

    let resolved = resolve(&descriptors, &full_hd());
    let numbers: Vec<_> = resolved.iter().map(|z| z.number).collect();
    assert_eq!(numbers, vec![2, 3]);
}

#[test]
fn overlapping_zones_resolve_to_the_last_listed() {
    let zone = |number: usize, rect: Rect| ResolvedZone {
        number,
        rect,
        monitor: 1,
        name: format!("Zone {}", number),
    };

    let zones = vec![
        zone(1, Rect::new(0, 0, 50, 50)),
        zone(2, Rect::new(100, 100, 400, 400)),
        zone(3, Rect::new(600, 0, 50, 50)),
        zone(4, Rect::new(700, 0, 50, 50)),
        zone(5, Rect::new(800, 0, 50, 50)),
        zone(6, Rect::new(200, 200, 400, 400)),
    ];

    // Point inside both index 1 and index 5; the later one wins because it
    // is rendered topmost.
    let point = Point::new(300, 300);
    assert!(zones[1].rect.contains(point));
    assert!(zones[5].rect.contains(point));
    assert_eq!(zone_at(&zones, point), Some(5));
}

#[test]
fn highlight_and_drop_share_one_hit_test() {
    // The same function answers both queries, so the drop target always
    // matches what was highlighted at the same position.
    let zones = vec![
        ResolvedZone {
            number: 1,
            rect: Rect::new(0, 0, 960, 1080),
            monitor: 1,
            name: "Left Half".to_string(),
        },
        ResolvedZone {
            number: 2,
            rect: Rect::new(960, 0, 960, 1080),
            monitor: 1,
            name: "Right Half".to_string(),
        },
    ];

    for point in [Point::new(10, 10), Point::new(1000, 500), Point::new(1919, 1079)] {
        assert_eq!(zone_at(&zones, point), zone_at(&zones, point));
    }
}

#[test]
fn fingerprint_is_stable_for_identical_topologies() {
    let topology = full_hd();
    let fp = fingerprint(&topology);
    assert!(!has_changed(&fp, &fp));
    assert!(!has_changed("", &fp));
}

#[test]
fn fingerprint_detects_resolution_changes() {
    let before = fingerprint(&full_hd());
    let after = fingerprint(&[monitor(
        1,
        Rect::new(0, 0, 2560, 1440),
        Rect::new(0, 0, 2560, 1440),
    )]);

    assert!(has_changed(&before, &after));
    assert!(describe_change(&before, &after).contains("arrangement or resolution"));
}

#[test]
fn fingerprint_detects_count_changes() {
    let one = fingerprint(&full_hd());
    let two = fingerprint(&[
        monitor(1, Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1080)),
        monitor(
            2,
            Rect::new(1920, 0, 1920, 1080),
            Rect::new(1920, 0, 1920, 1080),
        ),
    ]);

    assert!(describe_change(&one, &two).contains("1 added"));
    assert!(describe_change(&two, &one).contains("1 removed"));
}

#[test]
fn edit_percentages_round_trip_within_one_pixel() {
    let work_area = Rect::new(0, 25, 1920, 1055);
    let original = Rect::new(240, 132, 1440, 790);

    let mut descriptor = ZoneDescriptor::new(1, 0.0, 0.0, 10.0, 10.0, "Edited");
    descriptor.set_from_rect(original, work_area).unwrap();

    let topology = vec![monitor(1, Rect::new(0, 0, 1920, 1080), work_area)];
    let resolved = resolve(&[descriptor], &topology);
    let rect = resolved[0].rect;

    assert!((rect.x - original.x).abs() <= 1);
    assert!((rect.y - original.y).abs() <= 1);
    assert!((rect.width - original.width).abs() <= 1);
    assert!((rect.height - original.height).abs() <= 1);
}
