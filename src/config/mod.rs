//! Configuration management for ZoneRS

pub mod preferences;
pub mod store;

pub use preferences::{
    DenyList, DenylistPrefs, GesturePrefs, ModifierKey, PlacementPrefs, Preferences,
    PreferencesError,
};
pub use store::{SettingsError, SettingsStoreConfig, ZoneSettingsStore};
