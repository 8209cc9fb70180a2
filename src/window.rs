use crate::error::{Error, Result};
use std::fmt;
use std::time::Duration;

/// Default queries aim for at most this many points per series.
const TARGET_POINTS: u64 = 1000;

/// Prometheus rejects range queries that would return more points than this
/// per series.
const MAX_POINTS: f64 = 11_000.0;

const MIN_STEP: Duration = Duration::from_secs(1);

/// A query window in Unix-epoch seconds. `start < end` always holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    start: i64,
    end: i64,
}

impl TimeWindow {
    /// A window of `duration` ending at `end`.
    pub fn lookback(end: i64, duration: Duration) -> Result<Self> {
        let secs = i64::try_from(duration.as_secs()).unwrap_or(i64::MAX);
        Self::range(end.saturating_sub(secs), end)
    }

    /// A window of `duration` ending now.
    pub fn lookback_from_now(duration: Duration) -> Result<Self> {
        Self::lookback(now(), duration)
    }

    pub fn range(start: i64, end: i64) -> Result<Self> {
        if start >= end {
            return Err(Error::InvalidTimeWindow { start, end });
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn span(&self) -> Duration {
        Duration::from_secs(self.end.abs_diff(self.start))
    }

    /// The step used when none is configured: one second, or coarser for
    /// windows long enough to produce more than `TARGET_POINTS` samples.
    pub fn step(&self) -> Duration {
        let secs = self.span().as_secs().div_ceil(TARGET_POINTS);
        Duration::from_secs(secs).max(MIN_STEP)
    }

    /// Validates a configured step against this window.
    pub fn check_step(&self, step: Duration) -> Result<Duration> {
        if step.is_zero() {
            return Err(Error::InvalidStep("step must be positive".into()));
        }

        let points = self.span().as_secs_f64() / step.as_secs_f64();
        if points > MAX_POINTS {
            return Err(Error::InvalidStep(format!(
                "{} over {} would exceed {MAX_POINTS} points per series",
                humantime::format_duration(step),
                humantime::format_duration(self.span()),
            )));
        }

        Ok(step)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (
            chrono::DateTime::from_timestamp(self.start, 0),
            chrono::DateTime::from_timestamp(self.end, 0),
        ) {
            (Some(start), Some(end)) => write!(f, "{} .. {}", start.to_rfc3339(), end.to_rfc3339()),
            _ => write!(f, "{} .. {}", self.start, self.end),
        }
    }
}

/// Current Unix time in seconds.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
