//! Common types used across the platform

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Default offset of the farm's local time from UTC, in hours
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = -3;

/// Largest offset accepted in either direction, in hours
pub const MAX_UTC_OFFSET_HOURS: i32 = 23;

/// Wall clock for the farm.
///
/// Every "now" and "today" in the lifecycle model is local time, obtained by
/// shifting UTC by a fixed number of hours (no DST handling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
    offset: FixedOffset,
}

impl LocalClock {
    /// Build a clock from an hour offset east of UTC (negative is west)
    pub fn new(offset_hours: i32) -> Result<Self, &'static str> {
        if !(-MAX_UTC_OFFSET_HOURS..=MAX_UTC_OFFSET_HOURS).contains(&offset_hours) {
            return Err("UTC offset must be between -23 and 23 hours");
        }
        let offset = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or("UTC offset must be between -23 and 23 hours")?;
        Ok(Self { offset })
    }

    /// Clock on UTC itself
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn offset_hours(&self) -> i32 {
        self.offset.local_minus_utc() / 3600
    }

    /// Local time for a given UTC instant
    pub fn at(&self, utc: DateTime<Utc>) -> NaiveDateTime {
        utc.with_timezone(&self.offset).naive_local()
    }

    /// Current local time
    pub fn now(&self) -> NaiveDateTime {
        self.at(Utc::now())
    }

    /// Current local calendar date
    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

impl Default for LocalClock {
    fn default() -> Self {
        Self::new(DEFAULT_UTC_OFFSET_HOURS).unwrap_or_else(|_| Self::utc())
    }
}

/// Inclusive date range for queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting a start after the end
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, &'static str> {
        if start > end {
            return Err("Start date must not be after end date");
        }
        Ok(Self { start, end })
    }

    /// Monday..=Sunday of the week containing `date`
    pub fn week_of(date: NaiveDate) -> Self {
        let (start, end) = week_bounds(date);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// First (Monday) and last (Sunday) day of the week containing `date`
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let from_monday = i64::from(date.weekday().num_days_from_monday());
    let start = date - Duration::days(from_monday);
    (start, start + Duration::days(6))
}

/// `YYYY-MM` key used for monthly grouping
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
