//! overlay-clock library
//!
//! A clock drawn into a borderless window at the bottom of the X11 stacking
//! order, showing a copy of the wallpaper behind it. The crate is split
//! into the pieces the render loop is made of: configuration, clock state,
//! update scheduling, geometry and the display backend.

pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod geometry;
pub mod position;
pub mod render;
pub mod schedule;
pub mod signal;
pub mod stats;

// Re-export commonly used types
pub use clock::{ClockState, ManualClock, SystemClock, TimeFormat, TimeSource};
pub use config::{CliArgs, Config, Overrides};
pub use display::{Backend, DisplayEvent, FontMetrics, Wakeup, XftBackend};
pub use error::{ClockError, ConfigError};
pub use geometry::Rect;
pub use position::{Anchor, Placement};
pub use render::RenderLoop;
pub use schedule::{DirtyFlags, Tick, UpdateScheduler};
pub use stats::RenderStats;
