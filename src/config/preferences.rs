use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("File IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid denylist pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// The modifier key that must be held for the drag gesture to arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKey {
    Control,
    Option,
    Command,
    Shift,
}

impl Default for ModifierKey {
    fn default() -> Self {
        ModifierKey::Control
    }
}

/// Tunables for the pointer gesture engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GesturePrefs {
    /// Presses within this many milliseconds of the previous release are
    /// ignored; suppresses re-arming on synthesized release clicks.
    pub cooldown_ms: u64,
}

impl Default for GesturePrefs {
    fn default() -> Self {
        Self { cooldown_ms: 500 }
    }
}

/// Tunables for the window placement executor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementPrefs {
    /// Delay between a drop and the first move attempt, letting the host
    /// window manager finish its own drag-loop teardown.
    pub pre_move_delay_ms: u64,
    /// Delay after restoring a minimized window before moving it
    pub restore_settle_ms: u64,
    /// Delay before the single retry when verification fails
    pub retry_delay_ms: u64,
    /// Per-field pixel tolerance when verifying a move by re-reading
    pub verify_tolerance_px: i32,
    /// Whether to retry once after a failed verification
    pub retry_on_failed_verify: bool,
}

impl Default for PlacementPrefs {
    fn default() -> Self {
        Self {
            pre_move_delay_ms: 150,
            restore_settle_ms: 100,
            retry_delay_ms: 250,
            verify_tolerance_px: 5,
            retry_on_failed_verify: true,
        }
    }
}

/// Window classes the gesture engine refuses to drag
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DenylistPrefs {
    /// Exact window class / bundle identifiers
    pub classes: Vec<String>,
    /// Regex patterns matched against the window class
    pub patterns: Vec<String>,
}

impl Default for DenylistPrefs {
    fn default() -> Self {
        Self {
            classes: vec![
                "com.apple.dock".to_string(),
                "com.apple.finder.desktop".to_string(),
                "com.apple.systemuiserver".to_string(),
            ],
            patterns: Vec::new(),
        }
    }
}

/// User-editable application preferences (`preferences.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub modifier: ModifierKey,
    pub gesture: GesturePrefs,
    pub placement: PlacementPrefs,
    pub denylist: DenylistPrefs,
}

impl Preferences {
    /// Load preferences from `path`; an absent file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, PreferencesError> {
        if !path.exists() {
            debug!(path = %path.display(), "No preferences file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let prefs: Preferences = toml::from_str(&content)?;
        Ok(prefs)
    }
}

/// Compiled form of [`DenylistPrefs`] used per gesture event
#[derive(Debug, Default)]
pub struct DenyList {
    classes: HashSet<String>,
    patterns: Vec<Regex>,
}

impl DenyList {
    pub fn compile(prefs: &DenylistPrefs) -> Result<Self, PreferencesError> {
        let mut patterns = Vec::with_capacity(prefs.patterns.len());
        for pattern in &prefs.patterns {
            let regex = Regex::new(pattern).map_err(|source| PreferencesError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            patterns.push(regex);
        }

        Ok(Self {
            classes: prefs.classes.iter().cloned().collect(),
            patterns,
        })
    }

    /// Returns true when the window class must not be dragged
    pub fn matches(&self, window_class: &str) -> bool {
        self.classes.contains(window_class)
            || self.patterns.iter().any(|p| p.is_match(window_class))
    }
}
