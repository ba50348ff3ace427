//! Clock state: the formatted time string and when it was last refreshed

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, Locale};
use std::cell::Cell;
use std::fmt::Write;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::error::{ClockError, Result};

/// Source of both monotonic and wall-clock time
///
/// Scheduling runs on the monotonic clock so that wall-clock jumps cannot
/// stall or spin the loop; the wall clock is only used for the text itself.
pub trait TimeSource {
    /// Monotonic now, used for update scheduling
    fn now(&self) -> Instant;

    /// Local wall-clock time, used for formatting
    fn wall(&self) -> DateTime<FixedOffset>;
}

/// The real clocks of the running system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall(&self) -> DateTime<FixedOffset> {
        let now = Local::now();
        now.with_timezone(now.offset())
    }
}

/// A time source that only moves when told to
///
/// Clones share the same position, so a fake display can advance the time
/// seen by the render loop while it "waits".
#[derive(Debug, Clone)]
pub struct ManualClock {
    start: Instant,
    wall_start: DateTime<FixedOffset>,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new(wall_start: DateTime<FixedOffset>) -> Self {
        Self {
            start: Instant::now(),
            wall_start,
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    /// Total time advanced since creation
    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.offset.get()
    }

    fn wall(&self) -> DateTime<FixedOffset> {
        // Offsets stay far below chrono's range in practice
        self.wall_start
            + chrono::Duration::from_std(self.offset.get()).unwrap_or(chrono::Duration::zero())
    }
}

/// Pick the time locale from `LC_ALL`, `LC_TIME` or `LANG`
///
/// The first non-empty variable wins, as with `setlocale(LC_TIME, "")`.
/// Encoding and modifier suffixes ("de_DE.UTF-8@euro") are ignored; names
/// chrono does not know fall back to POSIX.
pub fn locale_from_env() -> Locale {
    let name = ["LC_ALL", "LC_TIME", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty());

    match name {
        Some(name) => parse_locale(&name),
        None => Locale::POSIX,
    }
}

/// Map a locale name such as "fr_BE.UTF-8" onto a chrono locale
pub fn parse_locale(name: &str) -> Locale {
    let base = name.split(['.', '@']).next().unwrap_or_default();

    match base {
        "" | "C" | "POSIX" => Locale::POSIX,
        _ => Locale::try_from(base).unwrap_or_else(|_| {
            tracing::debug!(locale = %name, "Unknown locale, using POSIX names");
            Locale::POSIX
        }),
    }
}

/// A strftime-style pattern that has been checked for unknown specifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFormat {
    pattern: String,
    locale: Locale,
}

impl TimeFormat {
    /// Validate a pattern such as `%T` or `%a %H:%M`
    ///
    /// Day and month names use the POSIX locale until
    /// [`TimeFormat::with_locale`] picks another one.
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() || StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(ClockError::InvalidFormat(pattern.to_string()));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            locale: Locale::POSIX,
        })
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Render `time` with this pattern
    ///
    /// An empty result is treated as a failure, there would be nothing to
    /// draw.
    pub fn format(&self, time: &DateTime<FixedOffset>) -> Result<String> {
        let mut out = String::new();
        write!(
            out,
            "{}",
            time.format_localized_with_items(
                StrftimeItems::new_with_locale(&self.pattern, self.locale),
                self.locale
            )
        )
        .map_err(|_| ClockError::TimeFormat)?;

        if out.is_empty() {
            return Err(ClockError::TimeFormat);
        }

        Ok(out)
    }
}

impl Default for TimeFormat {
    fn default() -> Self {
        Self {
            pattern: "%T".to_string(),
            locale: Locale::POSIX,
        }
    }
}

/// Current time string and the instant it was produced
#[derive(Debug)]
pub struct ClockState {
    format: TimeFormat,
    text: String,
    last_update: Instant,
}

impl ClockState {
    /// Format the initial time string; failing here is fatal for the caller
    pub fn new(format: TimeFormat, time: &impl TimeSource) -> Result<Self> {
        let text = format.format(&time.wall())?;

        Ok(Self {
            format,
            text,
            last_update: time.now(),
        })
    }

    /// Re-format "now", returning whether the visible text changed
    ///
    /// On error the previous text is kept intact.
    pub fn update(&mut self, time: &impl TimeSource) -> Result<bool> {
        let text = self.format.format(&time.wall())?;
        self.last_update = time.now();

        if text == self.text {
            return Ok(false);
        }

        self.text = text;
        Ok(true)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn last_update(&self) -> Instant {
        self.last_update
    }

    pub fn format(&self) -> &TimeFormat {
        &self.format
    }
}
