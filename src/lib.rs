//! ZoneRS - Drag-and-Snap Window Zones for macOS
//!
//! ZoneRS organizes on-screen windows into named rectangular zones spread
//! across one or more displays. A window is snapped into a zone either by a
//! modifier-held drag gesture or by a numbered hotkey, with zone layouts
//! persisted as resolution-independent percentages per monitor.

pub mod cli;
pub mod config;
pub mod logging;
pub mod macos;
pub mod models;
pub mod services;
pub mod ui;

pub use models::*;
pub use services::*;

/// Result type alias for ZoneRS operations
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to ZoneRS operations
#[derive(thiserror::Error, Debug)]
pub enum ZoneRSError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Window not found: {0}")]
    WindowNotFound(u32),

    #[error("Zone not found: {0}")]
    ZoneNotFound(usize),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("macOS API error: {0}")]
    MacOSAPIError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Input hook unavailable: {0}")]
    NoHookAvailable(String),
}
