//! macOS platform boundary: display enumeration, windowing, input events,
//! and permission handling

pub mod displays;
pub mod event_source;
pub mod permissions;
pub mod windowing;

pub use displays::*;
pub use event_source::*;
pub use windowing::*;
