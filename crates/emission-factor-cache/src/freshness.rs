//! Time-based staleness policy

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit of a freshness window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub fn as_secs(&self) -> i64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 60 * 60,
            Self::Days => 24 * 60 * 60,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(Self::Seconds),
            "m" | "min" | "mins" | "minute" | "minutes" => Ok(Self::Minutes),
            "h" | "hour" | "hours" => Ok(Self::Hours),
            "d" | "day" | "days" => Ok(Self::Days),
            other => Err(WindowError::UnknownUnit(other.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
        };
        f.write_str(name)
    }
}

/// Invalid freshness window configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    ZeroInterval,
    UnknownUnit(String),
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroInterval => write!(f, "Freshness interval must be greater than zero"),
            Self::UnknownUnit(unit) => write!(f, "Unknown freshness unit: {unit}"),
        }
    }
}

impl std::error::Error for WindowError {}

/// Maximum age of a snapshot before it must be refreshed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FreshnessWindow {
    interval: u32,
    unit: TimeUnit,
}

impl FreshnessWindow {
    pub fn new(interval: u32, unit: TimeUnit) -> Result<Self, WindowError> {
        if interval == 0 {
            return Err(WindowError::ZeroInterval);
        }
        Ok(Self { interval, unit })
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn duration(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.interval) * self.unit.as_secs())
    }
}

impl Default for FreshnessWindow {
    fn default() -> Self {
        Self {
            interval: 15,
            unit: TimeUnit::Minutes,
        }
    }
}

impl fmt::Display for FreshnessWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.interval, self.unit)
    }
}

/// Decide whether a snapshot captured at `captured_at` may still be served.
///
/// Stale once its age reaches the window. Snapshots dated in the future
/// (clock skew between writers) count as fresh.
pub fn is_fresh(captured_at: DateTime<Utc>, now: DateTime<Utc>, window: &FreshnessWindow) -> bool {
    let elapsed = now - captured_at;
    if elapsed < TimeDelta::zero() {
        return true;
    }
    elapsed < window.duration()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes(n: u32) -> FreshnessWindow {
        FreshnessWindow::new(n, TimeUnit::Minutes).unwrap()
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert_eq!(
            FreshnessWindow::new(0, TimeUnit::Hours),
            Err(WindowError::ZeroInterval)
        );
    }

    #[test]
    fn test_window_duration() {
        assert_eq!(minutes(15).duration(), TimeDelta::minutes(15));
        let days = FreshnessWindow::new(2, TimeUnit::Days).unwrap();
        assert_eq!(days.duration(), TimeDelta::hours(48));
    }

    #[test]
    fn test_default_window() {
        let window = FreshnessWindow::default();
        assert_eq!(window.interval(), 15);
        assert_eq!(window.unit(), TimeUnit::Minutes);
        assert_eq!(window.to_string(), "15 minutes");
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("minutes".parse::<TimeUnit>().unwrap(), TimeUnit::Minutes);
        assert_eq!("H".parse::<TimeUnit>().unwrap(), TimeUnit::Hours);
        assert_eq!(" days ".parse::<TimeUnit>().unwrap(), TimeUnit::Days);
        assert_eq!("s".parse::<TimeUnit>().unwrap(), TimeUnit::Seconds);
        assert!("fortnights".parse::<TimeUnit>().is_err());
    }

    #[test]
    fn test_recent_snapshot_is_fresh() {
        let now = Utc::now();
        assert!(is_fresh(now - TimeDelta::minutes(5), now, &minutes(15)));
    }

    #[test]
    fn test_boundary_is_stale() {
        let now = Utc::now();
        let window = minutes(15);
        assert!(!is_fresh(now - window.duration(), now, &window));
    }

    #[test]
    fn test_just_inside_boundary_is_fresh() {
        let now = Utc::now();
        let window = minutes(15);
        let captured = now - window.duration() + TimeDelta::milliseconds(1);
        assert!(is_fresh(captured, now, &window));
    }

    #[test]
    fn test_old_snapshot_is_stale() {
        let now = Utc::now();
        assert!(!is_fresh(now - TimeDelta::hours(3), now, &minutes(15)));
    }

    #[test]
    fn test_future_snapshot_is_fresh() {
        let now = Utc::now();
        assert!(is_fresh(now + TimeDelta::hours(1), now, &minutes(15)));
    }
}
