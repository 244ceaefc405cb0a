//! Date-only keys for per-day aggregation.
//!
//! Grouping by a truncated timestamp invites timezone and precision bugs, so
//! every per-date map in this crate is keyed by [`UtcDay`]: the number of
//! whole UTC days since the Unix epoch.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SECONDS_PER_DAY: i64 = 86_400;

/// A UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDay(i64);

impl UtcDay {
    /// Creates a day from its offset to 1970-01-01.
    #[must_use]
    pub const fn from_days_since_epoch(days: i64) -> Self {
        Self(days)
    }

    #[must_use]
    pub const fn days_since_epoch(self) -> i64 {
        self.0
    }

    /// The day a timestamp falls on.
    #[must_use]
    pub fn containing(timestamp: DateTime<Utc>) -> Self {
        Self(timestamp.timestamp().div_euclid(SECONDS_PER_DAY))
    }

    /// Midnight at the start of this day, if chrono can represent it.
    #[must_use]
    pub fn start(self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::UNIX_EPOCH.checked_add_signed(TimeDelta::try_days(self.0)?)
    }

    /// Midnight at the start of the following day, if representable.
    #[must_use]
    pub fn end(self) -> Option<DateTime<Utc>> {
        self.0.checked_add(1).map(Self).and_then(Self::start)
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    #[must_use]
    pub fn date_naive(self) -> Option<NaiveDate> {
        self.start().map(|start| start.date_naive())
    }
}

impl From<NaiveDate> for UtcDay {
    fn from(date: NaiveDate) -> Self {
        Self(
            date.signed_duration_since(DateTime::<Utc>::UNIX_EPOCH.date_naive())
                .num_days(),
        )
    }
}

impl fmt::Display for UtcDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date_naive() {
            Some(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            None => write!(f, "day {}", self.0),
        }
    }
}

impl FromStr for UtcDay {
    type Err = InvalidDay;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self::from)
            .map_err(|source| InvalidDay {
                value: s.to_string(),
                source,
            })
    }
}

impl Serialize for UtcDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for UtcDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error for strings that are not `YYYY-MM-DD` dates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid day {value:?}, expected YYYY-MM-DD")]
pub struct InvalidDay {
    value: String,
    #[source]
    source: chrono::ParseError,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_epoch_is_day_zero() {
        assert_eq!(UtcDay::containing(DateTime::<Utc>::UNIX_EPOCH).days_since_epoch(), 0);
        assert_eq!(UtcDay::from_days_since_epoch(0).to_string(), "1970-01-01");
    }

    #[test]
    fn test_last_second_belongs_to_same_day() {
        let late = Utc.with_ymd_and_hms(2021, 4, 20, 23, 59, 59).unwrap();
        let midnight = Utc.with_ymd_and_hms(2021, 4, 21, 0, 0, 0).unwrap();
        assert_eq!(UtcDay::containing(late).next(), UtcDay::containing(midnight));
        assert_eq!(UtcDay::containing(late).end(), Some(midnight));
        assert_eq!(UtcDay::containing(midnight).start(), Some(midnight));
    }

    #[test]
    fn test_last_representable_day_has_no_end() {
        let last = UtcDay::containing(DateTime::<Utc>::MAX_UTC);
        assert!(last.start().is_some());
        assert_eq!(last.end(), None);
    }

    #[test]
    fn test_out_of_range_day_displays_offset() {
        let day = UtcDay::from_days_since_epoch(i64::MAX);
        assert_eq!(day.start(), None);
        assert_eq!(day.next(), day);
        assert_eq!(day.to_string(), format!("day {}", i64::MAX));
    }

    #[test]
    fn test_before_epoch_rounds_down() {
        let ts = Utc.with_ymd_and_hms(1969, 12, 31, 12, 0, 0).unwrap();
        assert_eq!(UtcDay::containing(ts).days_since_epoch(), -1);
        assert_eq!(UtcDay::containing(ts).to_string(), "1969-12-31");
    }

    #[test]
    fn test_parses_iso_date() {
        let day: UtcDay = "2021-04-20".parse().unwrap();
        let ts = Utc.with_ymd_and_hms(2021, 4, 20, 8, 0, 0).unwrap();
        assert_eq!(day, UtcDay::containing(ts));
        assert!("20.04.2021".parse::<UtcDay>().is_err());
    }

    #[test]
    fn test_keys_json_objects_as_dates() {
        let mut map = BTreeMap::new();
        map.insert(UtcDay::from_days_since_epoch(1), 3);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"1970-01-02":3}"#);
        let parsed: BTreeMap<UtcDay, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }
}
