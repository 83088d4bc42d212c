//! Calendar handling for policy validity windows
//!
//! Policies are written against calendar dates in the agency's local
//! timezone, so "today" must be computed there rather than in UTC.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Timezone wrapper for the agency's jurisdiction
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| TemporalError::UnknownTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Returns the calendar date of `instant` in this timezone
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }

    /// Returns the current calendar date in this timezone
    pub fn today(&self) -> NaiveDate {
        self.date_of(Utc::now())
    }

    /// Returns the IANA name of the timezone
    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::America::Caracas)
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: end {end} precedes start {start}")]
    InvalidPeriod {
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Date out of range: {0}")]
    OutOfRange(NaiveDate),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Adds whole calendar years to a date
///
/// February 29th maps to February 28th when the target year is not a leap year.
pub fn add_years(date: NaiveDate, years: u32) -> Result<NaiveDate, TemporalError> {
    date.checked_add_months(Months::new(years * 12))
        .ok_or(TemporalError::OutOfRange(date))
}

/// The validity window of a policy, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ValidityPeriod {
    /// Creates a validity window, rejecting an end before the start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if end < start {
            return Err(TemporalError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// A one calendar year term starting on `start`
    pub fn annual(start: NaiveDate) -> Result<Self, TemporalError> {
        Ok(Self {
            start,
            end: add_years(start, 1)?,
        })
    }

    /// Returns true if `date` falls inside the window
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns true once the window has ended relative to `today`
    pub fn has_lapsed(&self, today: NaiveDate) -> bool {
        today > self.end
    }

    /// Number of days between start and end
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// The year in which the term starts
    pub fn start_year(&self) -> i32 {
        self.start.year()
    }
}
