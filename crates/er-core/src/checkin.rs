//! Check-ins and their per-day splits.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::UtcDay;

/// A presence event at a trace location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkin {
    pub id: i64,

    /// Hex-encoded hash of the trace location id.
    pub trace_location_id_hash: String,

    pub start: DateTime<Utc>,

    pub end: DateTime<Utc>,

    /// Set once the user has shared this check-in to warn others.
    /// Submitted check-ins are never matched against the user themself.
    #[serde(default)]
    pub submitted: bool,
}

/// A check-in's interval truncated to a single UTC day.
///
/// Splits keep the parent's id; matches are associated through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitCheckin {
    pub checkin_id: i64,
    pub trace_location_id_hash: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SplitCheckin {
    /// The UTC day this split belongs to, taken from its start.
    pub fn day(&self) -> UtcDay {
        UtcDay::containing(self.start)
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl Checkin {
    /// Splits the check-in at every UTC midnight it crosses.
    ///
    /// The splits are contiguous and reconstruct the original interval.
    /// An end exactly at midnight stays with the preceding day, and an
    /// empty or inverted interval yields itself as the only split. The last
    /// day chrono can represent has no following midnight and ends the walk.
    pub fn split_by_utc_day(&self) -> Vec<SplitCheckin> {
        let mut splits = Vec::new();
        let mut cursor = self.start;
        loop {
            let Some(midnight) = UtcDay::containing(cursor).end() else {
                splits.push(self.split(cursor, self.end));
                break;
            };
            if self.end <= midnight {
                splits.push(self.split(cursor, self.end));
                break;
            }
            splits.push(self.split(cursor, midnight));
            cursor = midnight;
        }
        splits
    }

    fn split(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> SplitCheckin {
        SplitCheckin {
            checkin_id: self.id,
            trace_location_id_hash: self.trace_location_id_hash.clone(),
            start,
            end,
        }
    }
}
