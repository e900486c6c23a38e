//! Timestamp formatting and request clock.
//!
//! All timestamps in core are epoch milliseconds (`i64`).

use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const MEDIUM_FORMAT: &str = "%a, %m/%d/%Y - %H:%M";
const SHORT_FORMAT: &str = "%m/%d/%Y - %H:%M";

/// Named date presentation styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// `Tue, 03/05/2024 - 14:30`. Used in questions, titles and log messages.
    Medium,
    /// `03/05/2024 - 14:30`. Used in revision history rows.
    Short,
}

/// Formats epoch-ms timestamps for user-facing text.
pub trait DateFormatter {
    fn format(&self, epoch_ms: i64, style: DateStyle) -> String;
}

/// `chrono` backed formatter rendering at a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct ChronoDateFormatter {
    offset: FixedOffset,
}

impl ChronoDateFormatter {
    /// Formatter rendering in UTC.
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Formatter rendering at `offset_seconds` east of UTC.
    ///
    /// Returns `None` when the offset is outside +/- 24h.
    pub fn with_offset_seconds(offset_seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(offset_seconds).map(|offset| Self { offset })
    }
}

impl Default for ChronoDateFormatter {
    fn default() -> Self {
        Self::utc()
    }
}

impl DateFormatter for ChronoDateFormatter {
    fn format(&self, epoch_ms: i64, style: DateStyle) -> String {
        let pattern = match style {
            DateStyle::Medium => MEDIUM_FORMAT,
            DateStyle::Short => SHORT_FORMAT,
        };
        match DateTime::<Utc>::from_timestamp_millis(epoch_ms) {
            Some(utc) => utc.with_timezone(&self.offset).format(pattern).to_string(),
            None => epoch_ms.to_string(),
        }
    }
}

/// Source of the current request time.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(saturating_millis)
            .unwrap_or(0)
    }
}

// Saturates instead of wrapping for durations past i64::MAX ms.
fn saturating_millis(elapsed: Duration) -> i64 {
    i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
}

/// Clock frozen at one instant; every call in one request sees the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}
