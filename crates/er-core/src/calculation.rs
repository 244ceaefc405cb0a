//! Check-in risk calculation.
//!
//! Turns local check-ins and the trace time interval matches found for them
//! into per-day risk levels.
//!
//! # Algorithm Summary
//!
//! 1. Drop check-ins the user already submitted
//! 2. Split the remaining check-ins at every UTC midnight
//! 3. Score each split: the sum of `transmission risk value × overlap minutes`
//!    over the matches of its parent check-in
//! 4. Map each split's score through the per-check-in range table
//! 5. Sum the scores of all matched splits per day and map each sum through
//!    the per-day range table
//!
//! Steps 4 and 5 are independent: a day can list risky check-ins without
//! reaching a day-level risk.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Checkin, CheckinRiskConfiguration, DailyRisk, RiskLevel, SplitCheckin,
    TraceTimeIntervalMatch, UtcDay, overlap_minutes,
};

/// A split check-in with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedCheckin {
    pub split: SplitCheckin,

    /// Sum of `transmission risk value × overlap minutes` over its matches.
    pub normalized_time: f64,

    /// Level from the per-check-in range table, if any range contains the score.
    pub risk_level: Option<RiskLevel>,
}

/// A check-in that reached a risk level on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinIdWithRisk {
    pub checkin_id: i64,
    pub risk_level: RiskLevel,
}

/// Output of one check-in risk calculation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinRiskCalculationResult {
    pub calculation_date: DateTime<Utc>,

    /// Check-ins whose own score reached a risk level, by day.
    #[serde(default)]
    pub checkin_ids_with_risk_per_date: BTreeMap<UtcDay, BTreeSet<CheckinIdWithRisk>>,

    /// Day-level risk. Days whose summed score matches no range are absent.
    #[serde(default)]
    pub risk_level_per_date: BTreeMap<UtcDay, RiskLevel>,
}

impl CheckinRiskCalculationResult {
    /// A result with no risk on any day.
    pub const fn empty(calculation_date: DateTime<Utc>) -> Self {
        Self {
            calculation_date,
            checkin_ids_with_risk_per_date: BTreeMap::new(),
            risk_level_per_date: BTreeMap::new(),
        }
    }
}

impl DailyRisk for CheckinRiskCalculationResult {
    fn risk_level_per_date(&self) -> &BTreeMap<UtcDay, RiskLevel> {
        &self.risk_level_per_date
    }
}

/// Scores every split of every unsubmitted check-in that has at least one
/// overlapping match.
///
/// Splits come out in check-in order, each check-in's splits in time order.
pub fn normalize_checkins(
    checkins: &[Checkin],
    matches: &[TraceTimeIntervalMatch],
    config: &CheckinRiskConfiguration,
) -> Vec<NormalizedCheckin> {
    let mut matches_by_checkin: HashMap<i64, Vec<&TraceTimeIntervalMatch>> = HashMap::new();
    for warning in matches {
        matches_by_checkin
            .entry(warning.checkin_id)
            .or_default()
            .push(warning);
    }

    checkins
        .iter()
        .filter(|checkin| !checkin.submitted)
        .filter(|checkin| matches_by_checkin.contains_key(&checkin.id))
        .flat_map(Checkin::split_by_utc_day)
        .filter_map(|split| {
            let warnings = matches_by_checkin.get(&split.checkin_id)?;
            let normalized_time = normalized_time(&split, warnings, config)?;
            let risk_level = config
                .normalized_time_per_check_in_to_risk_level_mapping
                .risk_level(normalized_time);

            tracing::trace!(
                checkin_id = split.checkin_id,
                day = %split.day(),
                normalized_time,
                ?risk_level,
                "scored split check-in"
            );

            Some(NormalizedCheckin {
                split,
                normalized_time,
                risk_level,
            })
        })
        .collect()
}

/// Sums the weighted overlap of all matches with a split.
///
/// Returns `None` when no match overlaps the split at all. A match whose
/// transmission risk level is unmapped still overlaps but weighs zero.
#[expect(
    clippy::cast_precision_loss,
    reason = "overlap minutes stay far below 2^52"
)]
fn normalized_time(
    split: &SplitCheckin,
    warnings: &[&TraceTimeIntervalMatch],
    config: &CheckinRiskConfiguration,
) -> Option<f64> {
    let mut total: Option<f64> = None;

    for warning in warnings {
        let overlap = overlap_minutes(split, warning);
        if overlap <= 0 {
            continue;
        }

        let value = config
            .transmission_risk_value(warning.transmission_risk_level)
            .unwrap_or_else(|| {
                tracing::warn!(
                    match_id = warning.id,
                    transmission_risk_level = warning.transmission_risk_level,
                    "no transmission risk value configured, match weighs zero"
                );
                0.0
            });

        *total.get_or_insert(0.0) += value * overlap as f64;
    }

    total
}

/// Calculates per-day check-in risk.
///
/// `calculation_date` is stamped onto the result; the calculation itself
/// reads no clock and performs no I/O.
pub fn calculate_checkin_risk(
    checkins: &[Checkin],
    matches: &[TraceTimeIntervalMatch],
    config: &CheckinRiskConfiguration,
    calculation_date: DateTime<Utc>,
) -> CheckinRiskCalculationResult {
    let normalized = normalize_checkins(checkins, matches, config);

    let mut checkin_ids_with_risk_per_date: BTreeMap<UtcDay, BTreeSet<CheckinIdWithRisk>> =
        BTreeMap::new();
    let mut normalized_time_per_date: BTreeMap<UtcDay, f64> = BTreeMap::new();

    for checkin in &normalized {
        let day = checkin.split.day();

        // Every matched split counts towards the day, risky or not
        *normalized_time_per_date.entry(day).or_insert(0.0) += checkin.normalized_time;

        if let Some(risk_level) = checkin.risk_level {
            checkin_ids_with_risk_per_date
                .entry(day)
                .or_default()
                .insert(CheckinIdWithRisk {
                    checkin_id: checkin.split.checkin_id,
                    risk_level,
                });
        }
    }

    let risk_level_per_date: BTreeMap<UtcDay, RiskLevel> = normalized_time_per_date
        .iter()
        .filter_map(|(day, normalized_time)| {
            config
                .normalized_time_per_day_to_risk_level_mapping
                .risk_level(*normalized_time)
                .map(|level| (*day, level))
        })
        .collect();

    tracing::debug!(
        checkins = checkins.len(),
        matches = matches.len(),
        scored_splits = normalized.len(),
        days_with_risk = risk_level_per_date.len(),
        "check-in risk calculation complete"
    );

    CheckinRiskCalculationResult {
        calculation_date,
        checkin_ids_with_risk_per_date,
        risk_level_per_date,
    }
}
