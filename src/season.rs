//! Season windows and year-less calendar days.
//!
//! A [`Season`] is an inclusive month/day window that repeats every year.
//! Catches are compared against it by month and day only, so a single
//! season definition filters every year of data.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{CatchLogError, Result};

/// Leap year used to materialise year-less days, so `02.29` is representable.
const REFERENCE_YEAR: i32 = 2024;

// ---------------------------------------------------------------------------
// DayKey
// ---------------------------------------------------------------------------

/// A calendar day without a year, displayed as `MM.dd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey {
    month: u32,
    day: u32,
}

impl DayKey {
    pub fn new(month: u32, day: u32) -> Result<Self> {
        if NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, day).is_none() {
            return Err(CatchLogError::InvalidDate(format!(
                "{:02}.{:02} is not a calendar day",
                month, day
            )));
        }
        Ok(DayKey { month, day })
    }

    pub fn of(date: NaiveDate) -> Self {
        DayKey {
            month: date.month(),
            day: date.day(),
        }
    }

    /// Parse `MM.dd`, `MM-dd` or `MM/dd`.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.trim().splitn(2, ['.', '-', '/']);
        let month = parts.next().and_then(|m| m.parse::<u32>().ok());
        let day = parts.next().and_then(|d| d.parse::<u32>().ok());
        match (month, day) {
            (Some(m), Some(d)) => DayKey::new(m, d),
            _ => Err(CatchLogError::InvalidDate(format!(
                "expected MM.dd, got {:?}",
                s
            ))),
        }
    }

    fn reference_date(&self) -> NaiveDate {
        // Validated on construction.
        NaiveDate::from_ymd_opt(REFERENCE_YEAR, self.month, self.day)
            .unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{:02}", self.month, self.day)
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DayKey::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

/// Inclusive in-season window. Seasons never wrap the new year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Season {
    pub start: DayKey,
    pub end: DayKey,
}

impl Default for Season {
    /// The salmon season: June 15 through August 31.
    fn default() -> Self {
        Season {
            start: DayKey { month: 6, day: 15 },
            end: DayKey { month: 8, day: 31 },
        }
    }
}

impl Season {
    pub fn new(start: DayKey, end: DayKey) -> Result<Self> {
        if start > end {
            return Err(CatchLogError::InvalidSeason(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Season { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = DayKey::parse(start).map_err(|e| CatchLogError::InvalidSeason(e.to_string()))?;
        let end = DayKey::parse(end).map_err(|e| CatchLogError::InvalidSeason(e.to_string()))?;
        Season::new(start, end)
    }

    /// Whether the catch date falls inside the window, ignoring the year.
    pub fn contains(&self, date: NaiveDate) -> bool {
        let key = DayKey::of(date);
        key >= self.start && key <= self.end
    }

    /// Every day of the season in calendar order.
    pub fn calendar(&self) -> Vec<DayKey> {
        let end = self.end.reference_date();
        self.start
            .reference_date()
            .iter_days()
            .take_while(|d| *d <= end)
            .map(DayKey::of)
            .collect()
    }
}
