//! Unit tests for the zone configuration store: persistence, corruption
//! recovery, and default layout generation.

use std::fs;
use tempfile::TempDir;
use zoners::config::{SettingsError, SettingsStoreConfig, ZoneSettingsStore};
use zoners::models::{ZoneDescriptor, ZoneSettings, SETTINGS_VERSION};

fn store_in(dir: &TempDir) -> ZoneSettingsStore {
    ZoneSettingsStore::new(SettingsStoreConfig {
        config_dir: dir.path().to_path_buf(),
        file_name: "zones.json".to_string(),
    })
}

#[test]
fn default_zone_counts_follow_monitor_count() {
    // 6 zones for the first monitor, 3 for every additional one.
    for monitors in 0..=5usize {
        let expected = if monitors == 0 { 0 } else { 6 + 3 * (monitors - 1) };
        assert_eq!(
            ZoneSettings::generate_defaults(monitors).zones.len(),
            expected,
            "monitor count {}",
            monitors
        );
    }
}

#[test]
fn defaults_use_the_current_format_version() {
    let defaults = ZoneSettings::generate_defaults(1);
    assert_eq!(defaults.version, SETTINGS_VERSION);
    assert!(defaults.monitor_fingerprint.is_empty());
}

#[test]
fn first_monitor_defaults_are_quarters_then_halves() {
    let defaults = ZoneSettings::generate_defaults(1);
    let names: Vec<_> = defaults.zones.iter().map(|z| z.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Top Left Quarter",
            "Top Right Quarter",
            "Bottom Left Quarter",
            "Bottom Right Quarter",
            "Left Half",
            "Right Half",
        ]
    );
}

#[test]
fn absent_record_loads_as_none() {
    let dir = TempDir::new().unwrap();
    assert!(store_in(&dir).load().unwrap().is_none());
}

#[test]
fn save_load_round_trip_preserves_the_record() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let mut settings = ZoneSettings::generate_defaults(3);
    settings.monitor_fingerprint =
        "3:1920x1080@0,0;1920x1080@1920,0;1920x1080@3840,0".to_string();
    settings
        .add_zone(ZoneDescriptor::new(1, 25.0, 25.0, 50.0, 50.0, "Center Stage"))
        .unwrap();

    store.save(&settings).unwrap();
    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn persisted_record_uses_pascal_case_schema() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save(&ZoneSettings::generate_defaults(1)).unwrap();

    let raw = fs::read_to_string(store.settings_path()).unwrap();
    for field in ["\"Zones\"", "\"Version\"", "\"MonitorFingerprint\"", "\"Monitor\"", "\"Width\""] {
        assert!(raw.contains(field), "missing {} in {}", field, raw);
    }
}

#[test]
fn record_without_fingerprint_is_accepted() {
    // Records written before the fingerprint field existed load cleanly
    // and read as first-run.
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    fs::write(
        store.settings_path(),
        r#"{"Zones":[{"Monitor":1,"X":0.0,"Y":0.0,"Width":50.0,"Height":100.0,"Name":"Left Half"}],"Version":1}"#,
    )
    .unwrap();

    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded.zones.len(), 1);
    assert!(loaded.monitor_fingerprint.is_empty());
}

#[test]
fn corrupt_record_raises_after_backing_up() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    fs::write(store.settings_path(), "{\"Zones\": [{\"Monitor\": oops").unwrap();

    match store.load() {
        Err(SettingsError::CorruptConfiguration { .. }) => {}
        other => panic!("expected corrupt configuration, got {:?}", other),
    }

    let backup_count = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".corrupt-"))
        .count();
    assert_eq!(backup_count, 1);

    // The corrupt original stays in place for inspection; a subsequent
    // save replaces it.
    store.save(&ZoneSettings::generate_defaults(1)).unwrap();
    assert_eq!(store.load().unwrap().unwrap().zones.len(), 6);
}

#[test]
fn tiny_file_is_corrupt_rather_than_parsed() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    fs::write(store.settings_path(), "[]").unwrap();
    assert!(matches!(
        store.load(),
        Err(SettingsError::CorruptConfiguration { .. })
    ));
}

#[test]
fn save_into_missing_directory_creates_it() {
    let dir = TempDir::new().unwrap();
    let store = ZoneSettingsStore::new(SettingsStoreConfig {
        config_dir: dir.path().join("nested").join("zoners"),
        file_name: "zones.json".to_string(),
    });

    store.save(&ZoneSettings::generate_defaults(1)).unwrap();
    assert!(store.load().unwrap().is_some());
}
