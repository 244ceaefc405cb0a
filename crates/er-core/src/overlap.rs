//! Overlap between a check-in and a trace time interval match.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::SplitCheckin;

/// Length of one trace time interval in seconds.
pub const INTERVAL_LENGTH_SECONDS: i64 = 600;

/// A warning from the download pipeline matched against a local check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceTimeIntervalMatch {
    pub id: i64,
    pub checkin_id: i64,
    #[serde(default)]
    pub trace_warning_package_id: i64,
    pub trace_location_id_hash: String,
    pub transmission_risk_level: u8,
    /// Start of the warning window in 10-minute intervals since the epoch.
    pub start_interval_number: i64,
    /// End of the warning window (exclusive) in 10-minute intervals.
    pub end_interval_number: i64,
}

impl TraceTimeIntervalMatch {
    /// Start of the warning window, `None` if outside chrono's range.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        interval_start(self.start_interval_number)
    }

    /// End of the warning window, `None` if outside chrono's range.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        interval_start(self.end_interval_number)
    }
}

fn interval_start(interval_number: i64) -> Option<DateTime<Utc>> {
    let seconds = interval_number.checked_mul(INTERVAL_LENGTH_SECONDS)?;
    DateTime::<Utc>::UNIX_EPOCH.checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

/// Overlap of a split check-in and a match, in whole minutes.
///
/// Seconds are rounded to the nearest minute, half up. Different trace
/// locations never overlap, and windows that only touch yield zero. A
/// window whose interval numbers cannot be represented as timestamps
/// overlaps nothing.
pub fn overlap_minutes(checkin: &SplitCheckin, warning: &TraceTimeIntervalMatch) -> i64 {
    if checkin.trace_location_id_hash != warning.trace_location_id_hash {
        return 0;
    }

    let (Some(warning_start), Some(warning_end)) = (warning.start(), warning.end()) else {
        tracing::warn!(
            match_id = warning.id,
            start_interval_number = warning.start_interval_number,
            end_interval_number = warning.end_interval_number,
            "match window out of range, ignoring"
        );
        return 0;
    };

    let start = checkin.start.max(warning_start);
    let end = checkin.end.min(warning_end);
    let overlap_seconds = (end - start).num_seconds().max(0);

    (overlap_seconds + 30) / 60
}
