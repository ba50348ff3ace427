//! Render loop statistics
//!
//! Counts what the loop did so the behaviour can be checked in tests and
//! summarised in the logs on shutdown.

use std::time::{Duration, Instant};

/// Draw passes slower than this are logged
pub const SLOW_DRAW_MS: u64 = 16;

/// Tracks render loop activity
#[derive(Debug, Default, Clone)]
pub struct RenderStats {
    draws: u64,
    recomputes: u64,
    resizes: u64,
    exposures: u64,
    waits: u64,
    last_draw_time: Duration,
    max_draw_time: Duration,
}

impl RenderStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a draw pass duration
    pub fn record_draw(&mut self, duration: Duration) {
        self.draws += 1;
        self.last_draw_time = duration;

        if duration > self.max_draw_time {
            self.max_draw_time = duration;
        }
    }

    pub fn record_recompute(&mut self) {
        self.recomputes += 1;
    }

    pub fn record_resize(&mut self) {
        self.resizes += 1;
    }

    /// Record an exposure that touched the painted rectangle
    pub fn record_exposure(&mut self) {
        self.exposures += 1;
    }

    pub fn record_wait(&mut self) {
        self.waits += 1;
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }

    pub fn resizes(&self) -> u64 {
        self.resizes
    }

    pub fn exposures(&self) -> u64 {
        self.exposures
    }

    pub fn waits(&self) -> u64 {
        self.waits
    }

    pub fn last_draw_time(&self) -> Duration {
        self.last_draw_time
    }

    pub fn max_draw_time(&self) -> Duration {
        self.max_draw_time
    }

    /// Check if the last draw pass was slow
    pub fn is_slow(&self) -> bool {
        self.last_draw_time.as_millis() > SLOW_DRAW_MS as u128
    }

    pub fn log_summary(&self) {
        tracing::debug!(
            draws = self.draws,
            recomputes = self.recomputes,
            resizes = self.resizes,
            exposures = self.exposures,
            waits = self.waits,
            max_draw_ms = %self.max_draw_time.as_secs_f64() * 1000.0,
            "Render loop summary"
        );
    }
}

/// A simple timer for measuring operation duration
#[derive(Debug)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Stop timer and return elapsed duration
    pub fn stop(self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_draw_tracks_max() {
        let mut stats = RenderStats::new();
        stats.record_draw(Duration::from_millis(3));
        stats.record_draw(Duration::from_millis(9));
        stats.record_draw(Duration::from_millis(1));

        assert_eq!(stats.draws(), 3);
        assert_eq!(stats.last_draw_time(), Duration::from_millis(1));
        assert_eq!(stats.max_draw_time(), Duration::from_millis(9));
    }

    #[test]
    fn test_slow_draw() {
        let mut stats = RenderStats::new();
        stats.record_draw(Duration::from_millis(2));
        assert!(!stats.is_slow());

        stats.record_draw(Duration::from_millis(40));
        assert!(stats.is_slow());
    }

    #[test]
    fn test_counters() {
        let mut stats = RenderStats::new();
        stats.record_recompute();
        stats.record_recompute();
        stats.record_resize();
        stats.record_exposure();
        stats.record_wait();

        assert_eq!(stats.recomputes(), 2);
        assert_eq!(stats.resizes(), 1);
        assert_eq!(stats.exposures(), 1);
        assert_eq!(stats.waits(), 1);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::start();
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.stop() >= Duration::from_millis(5));
    }
}
