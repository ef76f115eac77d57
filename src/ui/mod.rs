//! On-screen UI surfaces owned by the engine

pub mod overlay;

pub use overlay::{InMemoryOverlayProvider, OverlayProvider, SystemOverlayProvider};
