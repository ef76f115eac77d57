//! Data models for the ZoneRS zone engine

pub mod geometry;
pub mod monitor;
pub mod zone;

pub use geometry::*;
pub use monitor::*;
pub use zone::*;
