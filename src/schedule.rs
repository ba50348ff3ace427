//! Redraw bookkeeping and update timing

use std::time::{Duration, Instant};

/// Work owed before the loop may block again
///
/// The two flags are independent: an exposure needs a repaint of unchanged
/// text, while a tick needs the text re-measured as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyFlags {
    /// Text was recomputed, geometry must be measured again
    pub text: bool,
    /// Screen content must be repainted
    pub repaint: bool,
}

impl DirtyFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// New text always implies a repaint
    pub fn mark_text(&mut self) {
        self.text = true;
        self.repaint = true;
    }

    pub fn mark_repaint(&mut self) {
        self.repaint = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.repaint
    }

    pub fn clear(&mut self) {
        self.text = false;
        self.repaint = false;
    }
}

/// Result of checking the update timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The interval has elapsed, recompute the text now
    Due,
    /// Nothing due yet; block for at most this long
    Wait(Duration),
}

/// Fixed-interval update timer
#[derive(Debug, Clone, Copy)]
pub struct UpdateScheduler {
    interval: Duration,
}

impl UpdateScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Decide whether an update is due given the last update time
    ///
    /// A returned wait is always within `(0, interval]`. `now` earlier than
    /// `last_update` counts as no time elapsed.
    pub fn check(&self, last_update: Instant, now: Instant) -> Tick {
        let elapsed = now.saturating_duration_since(last_update);

        if elapsed >= self.interval {
            Tick::Due
        } else {
            Tick::Wait(self.interval - elapsed)
        }
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_flags() {
        let mut flags = DirtyFlags::new();
        assert!(!flags.needs_redraw());

        flags.mark_repaint();
        assert!(flags.needs_redraw());
        assert!(!flags.text);

        flags.clear();
        assert!(!flags.needs_redraw());
    }

    #[test]
    fn test_mark_text_sets_both() {
        let mut flags = DirtyFlags::new();
        flags.mark_text();

        assert!(flags.text);
        assert!(flags.repaint);
    }

    #[test]
    fn test_scheduler_due_at_interval() {
        let scheduler = UpdateScheduler::default();
        let start = Instant::now();

        assert_eq!(scheduler.check(start, start + Duration::from_secs(1)), Tick::Due);
        assert_eq!(scheduler.check(start, start + Duration::from_secs(5)), Tick::Due);
    }

    #[test]
    fn test_scheduler_wait_is_remaining_time() {
        let scheduler = UpdateScheduler::new(Duration::from_secs(5));
        let start = Instant::now();

        assert_eq!(
            scheduler.check(start, start + Duration::from_millis(1500)),
            Tick::Wait(Duration::from_millis(3500))
        );
        assert_eq!(
            scheduler.check(start, start),
            Tick::Wait(Duration::from_secs(5))
        );
    }

    #[test]
    fn test_scheduler_clock_behind_last_update() {
        let scheduler = UpdateScheduler::default();
        let start = Instant::now() + Duration::from_secs(10);

        assert_eq!(
            scheduler.check(start, start - Duration::from_secs(3)),
            Tick::Wait(Duration::from_secs(1))
        );
    }

    #[test]
    fn test_wait_never_exceeds_interval() {
        let scheduler = UpdateScheduler::new(Duration::from_secs(2));
        let start = Instant::now();

        for ms in (0..2000).step_by(125) {
            match scheduler.check(start, start + Duration::from_millis(ms)) {
                Tick::Wait(wait) => {
                    assert!(wait > Duration::ZERO);
                    assert!(wait <= scheduler.interval());
                }
                Tick::Due => panic!("not due after {}ms", ms),
            }
        }
    }
}
