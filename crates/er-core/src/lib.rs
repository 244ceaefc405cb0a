//! Risk aggregation for exposure notification.
//!
//! This crate contains the fundamental types and logic for:
//! - Range tables: config-driven mapping of scores to risk levels
//! - Check-in risk: scoring check-ins against trace time interval matches
//!   and aggregating the scores per UTC day
//! - Risk merging: combining check-in risk with exposure window risk
//!
//! Everything here is synchronous and free of I/O. Callers supply the
//! check-ins, matches, configuration and calculation timestamp.

mod calculation;
mod checkin;
pub mod config;
mod daily;
mod date;
mod merge;
mod overlap;
mod range;
mod risk_level;

pub use calculation::{
    CheckinIdWithRisk, CheckinRiskCalculationResult, NormalizedCheckin, calculate_checkin_risk,
    normalize_checkins,
};
pub use checkin::{Checkin, SplitCheckin};
pub use config::{CheckinRiskConfiguration, TransmissionRiskValueMapping};
pub use daily::DailyRisk;
pub use date::{InvalidDay, UtcDay};
pub use merge::{
    ExposureWindowRiskResult, MergedRisk, Risk, RiskDetails, RiskSource, SourceTransition,
    merge_risk, merge_risk_levels_per_date,
};
pub use overlap::{INTERVAL_LENGTH_SECONDS, TraceTimeIntervalMatch, overlap_minutes};
pub use range::{RangeTable, RiskLevelRange};
pub use risk_level::{RiskLevel, UnknownRiskLevel};
