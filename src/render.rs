//! The render loop: drain events, repaint, recompute, wait
//!
//! Each pass of [`RenderLoop::run`]:
//!
//! 1. drains queued display events, marking a repaint only for exposures that
//!    touch the painted rectangle, so a burst of them costs one draw;
//! 2. runs a draw pass if anything is dirty;
//! 3. recomputes the time string if the update interval has elapsed and
//!    starts over without blocking;
//! 4. otherwise blocks on the display connection for the time left until the
//!    next update.
//!
//! Dropping the loop erases the painted rectangle, so the text never outlives
//! the process, whichever way it exits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::clock::{ClockState, TimeFormat, TimeSource};
use crate::display::{Backend, DisplayEvent, Wakeup};
use crate::error::Result;
use crate::geometry::Rect;
use crate::position::Placement;
use crate::schedule::{DirtyFlags, Tick, UpdateScheduler};
use crate::stats::{RenderStats, Timer};

/// Owns every piece of mutable state the widget has
pub struct RenderLoop<B: Backend, T: TimeSource> {
    backend: B,
    time: T,
    clock: ClockState,
    scheduler: UpdateScheduler,
    placement: Placement,
    /// What is on screen right now, `None` before the first draw
    painted: Option<Rect>,
    flags: DirtyFlags,
    stats: RenderStats,
}

impl<B: Backend, T: TimeSource> RenderLoop<B, T> {
    /// Format the first time string and schedule the initial draw
    pub fn new(
        backend: B,
        time: T,
        format: TimeFormat,
        placement: Placement,
        interval: Duration,
    ) -> Result<Self> {
        let clock = ClockState::new(format, &time)?;

        let mut flags = DirtyFlags::new();
        flags.mark_text();

        Ok(Self {
            backend,
            time,
            clock,
            scheduler: UpdateScheduler::new(interval),
            placement,
            painted: None,
            flags,
            stats: RenderStats::new(),
        })
    }

    /// Run until `stop` becomes true
    ///
    /// The flag is only read here; it is meant to be written from a signal
    /// handler.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<()> {
        info!(
            format = self.clock.format().pattern(),
            interval_secs = self.scheduler.interval().as_secs(),
            position = %self.placement,
            "Render loop starting"
        );

        while !stop.load(Ordering::Relaxed) {
            self.step()?;
        }

        info!("Stop requested, leaving render loop");
        self.stats.log_summary();
        Ok(())
    }

    /// One pass of the loop; blocks at most one update interval
    pub fn step(&mut self) -> Result<()> {
        self.drain_events()?;

        if self.flags.needs_redraw() {
            self.draw()?;
        }

        match self.scheduler.check(self.clock.last_update(), self.time.now()) {
            Tick::Due => self.tick(),
            Tick::Wait(remaining) => {
                self.stats.record_wait();
                let wakeup = self.backend.wait(remaining)?;
                trace!(?wakeup, remaining_ms = remaining.as_millis() as u64, "Woke up");
                Ok(())
            }
        }
    }

    fn drain_events(&mut self) -> Result<()> {
        while let Some(event) = self.backend.next_event()? {
            let DisplayEvent::Expose(area) = event else {
                continue;
            };

            let touches = self.painted.map_or(false, |painted| painted.overlaps(&area));
            if touches {
                self.stats.record_exposure();
                self.flags.mark_repaint();
            }
        }

        Ok(())
    }

    fn tick(&mut self) -> Result<()> {
        let changed = self.clock.update(&self.time)?;
        self.stats.record_recompute();
        self.flags.mark_text();

        trace!(text = self.clock.text(), changed, "Recomputed time string");
        Ok(())
    }

    /// Where the current text goes, measured from scratch
    fn measure(&mut self) -> Result<Rect> {
        let width = self.backend.text_advance(self.clock.text())?;
        let height = self.backend.font_metrics().height();
        let (x, y) = self
            .placement
            .origin(self.backend.screen_size(), (width, height));

        Ok(Rect::new(x, y, width, height))
    }

    fn draw(&mut self) -> Result<()> {
        let timer = Timer::start();

        // Exposure-only repaints reuse the stored geometry
        let target = match (self.flags.text, self.painted) {
            (false, Some(painted)) => painted,
            _ => self.measure()?,
        };

        if self.painted != Some(target) {
            self.backend.place(target)?;
        }

        // Erase what was painted before, not what is about to be
        if let Some(previous) = self.painted {
            self.backend.clear(previous)?;
        }

        let baseline = target.y + self.backend.font_metrics().ascent;
        self.backend.draw_text(self.clock.text(), target.x, baseline)?;
        self.backend.flush()?;

        if self.painted != Some(target) {
            debug!(?target, previous = ?self.painted, "Painted rectangle moved");
            self.stats.record_resize();
            self.painted = Some(target);
        }
        self.flags.clear();

        self.stats.record_draw(timer.stop());
        if self.stats.is_slow() {
            warn!(
                draw_ms = %self.stats.last_draw_time().as_secs_f64() * 1000.0,
                "Draw pass was slow"
            );
        }

        Ok(())
    }

    pub fn text(&self) -> &str {
        self.clock.text()
    }

    pub fn painted(&self) -> Option<Rect> {
        self.painted
    }

    pub fn flags(&self) -> DirtyFlags {
        self.flags
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn teardown(&mut self) -> Result<()> {
        if let Some(painted) = self.painted.take() {
            self.backend.clear(painted)?;
            self.backend.flush()?;
        }

        Ok(())
    }
}

impl<B: Backend, T: TimeSource> Drop for RenderLoop<B, T> {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            warn!(error = %e, "Failed to erase the clock on shutdown");
        }
    }
}
