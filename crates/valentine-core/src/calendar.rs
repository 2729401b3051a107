//! Calendar dates, the unlock gate and the session clock.
//!
//! Dates are restricted to the `YYYY-MM-DD` form with a four-digit year, so
//! chronological order and the lexicographic order of the rendered strings
//! coincide. Unlock comparisons rely on that.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
const ISO_DATE_LEN: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("malformed date {0:?}: expected YYYY-MM-DD")]
    Malformed(String),
    #[error("year out of range in {0:?}: expected 0000-9999")]
    YearOutOfRange(String),
}

/// A calendar day in ISO-8601 `YYYY-MM-DD` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        if !(0..=9999).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The viewer's local date.
    pub fn today() -> Self {
        Self(chrono::Local::now().date_naive())
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    /// Short human label, e.g. "Feb 7".
    pub fn short_label(&self) -> String {
        format!("{} {}", self.0.format("%b"), self.0.day())
    }
}

impl FromStr for CalendarDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == ISO_DATE_LEN
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !well_formed {
            return Err(DateError::Malformed(s.to_string()));
        }

        let date = NaiveDate::parse_from_str(s, ISO_DATE_FORMAT)
            .map_err(|_| DateError::Malformed(s.to_string()))?;
        if !(0..=9999).contains(&date.year()) {
            return Err(DateError::YearOutOfRange(s.to_string()));
        }
        Ok(Self(date))
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_DATE_FORMAT))
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// True once `current` has reached `unlock`.
pub fn is_unlocked(current: CalendarDate, unlock: CalendarDate) -> bool {
    current >= unlock
}

/// Where the session clock takes its initial value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    LocalToday,
    Fixed(CalendarDate),
}

impl ClockSource {
    pub fn resolve(&self) -> CalendarDate {
        match self {
            ClockSource::LocalToday => CalendarDate::today(),
            ClockSource::Fixed(date) => *date,
        }
    }
}

/// The single mutable "current date" of a session.
#[derive(Debug, Clone)]
pub struct SessionClock {
    current: CalendarDate,
}

impl SessionClock {
    pub fn new(source: ClockSource) -> Self {
        Self {
            current: source.resolve(),
        }
    }

    pub fn current(&self) -> CalendarDate {
        self.current
    }

    pub fn set(&mut self, date: CalendarDate) {
        self.current = date;
    }

    /// Replace the current date from user input. Malformed input leaves the
    /// clock unchanged.
    pub fn set_from_str(&mut self, input: &str) -> Result<(), DateError> {
        let date = input.trim().parse()?;
        self.current = date;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_roundtrips_display() {
        assert_eq!(date("2026-02-09").to_string(), "2026-02-09");
        assert_eq!(date("0999-12-31").to_string(), "0999-12-31");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "2026-2-9", "2026/02/09", "20260209", "2026-02-30", "2026-13-01", "abcd-ef-gh", " 2026-02-09"] {
            assert!(bad.parse::<CalendarDate>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_order_matches_lexicographic_order() {
        let samples = ["2025-12-31", "2026-01-01", "2026-02-07", "2026-02-14", "2026-10-01", "0001-01-01"];
        for a in samples {
            for b in samples {
                assert_eq!(date(a).cmp(&date(b)), a.cmp(b), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_is_unlocked_inclusive() {
        let unlock = date("2026-02-09");
        assert!(is_unlocked(date("2026-02-09"), unlock));
        assert!(is_unlocked(date("2026-02-10"), unlock));
        assert!(!is_unlocked(date("2026-02-08"), unlock));
    }

    #[test]
    fn test_clock_ignores_malformed_input() {
        let mut clock = SessionClock::new(ClockSource::Fixed(date("2026-02-09")));
        assert!(clock.set_from_str("not a date").is_err());
        assert_eq!(clock.current(), date("2026-02-09"));

        clock.set_from_str("2026-02-14").unwrap();
        assert_eq!(clock.current(), date("2026-02-14"));
    }

    #[test]
    fn test_short_label() {
        assert_eq!(date("2026-02-07").short_label(), "Feb 7");
    }

    #[test]
    fn test_from_ymd_rejects_five_digit_years() {
        assert!(CalendarDate::from_ymd(10000, 1, 1).is_none());
        assert!(CalendarDate::from_ymd(2026, 2, 14).is_some());
    }
}
