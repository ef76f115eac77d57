use crate::models::zone::ZoneSettings;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Smallest byte length a structurally valid record can have; anything
/// shorter is treated as corrupt rather than parsed.
const MIN_RECORD_BYTES: usize = 8;

#[derive(Error, Debug)]
pub enum SettingsError {
    /// The backing file exists but is too small or fails structural
    /// parsing. The corrupt content has already been copied to a
    /// timestamped backup (best-effort) when this is raised.
    #[error("Corrupt zone configuration: {reason}")]
    CorruptConfiguration { reason: String },

    #[error("Failed to persist zone configuration: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct SettingsStoreConfig {
    pub config_dir: PathBuf,
    pub file_name: String,
}

impl Default for SettingsStoreConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            config_dir: home_dir.join(".config").join("zoners"),
            file_name: "zones.json".to_string(),
        }
    }
}

/// Owns the persisted [`ZoneSettings`] record on disk
///
/// Loading distinguishes "no record yet" (`Ok(None)`) from a corrupt record
/// (`CorruptConfiguration`); saving is atomic so a partial write is never
/// visible to a subsequent load.
pub struct ZoneSettingsStore {
    config: SettingsStoreConfig,
}

impl ZoneSettingsStore {
    pub fn new(config: SettingsStoreConfig) -> Self {
        Self { config }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config.config_dir.join(&self.config.file_name)
    }

    /// Load the persisted record. `Ok(None)` only when no file exists;
    /// a file that exists but cannot be parsed raises
    /// [`SettingsError::CorruptConfiguration`] after the corrupt content
    /// has been backed up.
    pub fn load(&self) -> Result<Option<ZoneSettings>, SettingsError> {
        let path = self.settings_path();
        if !path.exists() {
            debug!(path = %path.display(), "No zone configuration on disk");
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;

        if content.len() < MIN_RECORD_BYTES {
            self.backup_corrupt_file(&path);
            return Err(SettingsError::CorruptConfiguration {
                reason: format!("record is {} bytes, too small to be valid", content.len()),
            });
        }

        match serde_json::from_str::<ZoneSettings>(&content) {
            Ok(settings) => Ok(Some(settings)),
            Err(err) => {
                self.backup_corrupt_file(&path);
                Err(SettingsError::CorruptConfiguration {
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Persist the record atomically (temp file + rename)
    pub fn save(&self, settings: &ZoneSettings) -> Result<(), SettingsError> {
        fs::create_dir_all(&self.config.config_dir)?;

        let path = self.settings_path();
        let json = serde_json::to_string_pretty(settings)?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)?;

        debug!(path = %path.display(), zones = settings.zones.len(), "Saved zone configuration");
        Ok(())
    }

    /// Copy corrupt content to a timestamped sibling file. Best-effort: a
    /// failed backup is logged, never escalated.
    fn backup_corrupt_file(&self, path: &Path) {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let backup_name = format!("{}.corrupt-{}", self.config.file_name, timestamp);
        let backup_path = self.config.config_dir.join(backup_name);

        match fs::copy(path, &backup_path) {
            Ok(_) => warn!(
                backup = %backup_path.display(),
                "Backed up corrupt zone configuration"
            ),
            Err(err) => warn!(
                path = %path.display(),
                error = %err,
                "Failed to back up corrupt zone configuration"
            ),
        }
    }
}
