//! Display server access used by the render loop
//!
//! The loop only needs a handful of primitives: read events without blocking,
//! move the drawing surface, clear and draw into a region, measure text and
//! wait on the connection. All coordinates are screen coordinates.
//! [`xft::XftBackend`] implements them with Xlib and Xft.

pub mod xft;

use std::time::Duration;

use crate::error::Result;
use crate::geometry::Rect;

pub use self::xft::XftBackend;

/// Event read from the display connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    /// A region of the drawing surface became visible again
    Expose(Rect),
    /// Anything the clock does not care about
    Other,
}

/// Vertical metrics of the loaded font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontMetrics {
    pub ascent: i32,
    pub descent: i32,
}

impl FontMetrics {
    /// Line height of the font
    pub fn height(&self) -> u32 {
        (self.ascent + self.descent).max(0) as u32
    }
}

/// Why a blocking wait returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// New data is available on the connection
    Readable,
    /// The timeout expired
    Timeout,
    /// A signal arrived during the wait
    Interrupted,
}

/// Drawing and event primitives of a display connection
pub trait Backend {
    /// Size of the screen being drawn on, in pixels
    fn screen_size(&self) -> (u32, u32);

    fn font_metrics(&self) -> FontMetrics;

    /// Horizontal advance of `text` in the configured font
    fn text_advance(&mut self, text: &str) -> Result<u32>;

    /// Next queued event, or `None` when the queue is empty. Never blocks.
    fn next_event(&mut self) -> Result<Option<DisplayEvent>>;

    /// Move and resize the drawing surface to cover `area`, refreshing the
    /// background it shows
    fn place(&mut self, area: Rect) -> Result<()>;

    /// Restore the background over `area`
    fn clear(&mut self, area: Rect) -> Result<()>;

    /// Draw `text` with its baseline origin at `(x, baseline)`
    fn draw_text(&mut self, text: &str, x: i32, baseline: i32) -> Result<()>;

    /// Push buffered requests to the server
    fn flush(&mut self) -> Result<()>;

    /// Block until the connection is readable or `timeout` passes
    fn wait(&mut self, timeout: Duration) -> Result<Wakeup>;
}
