//! Merging check-in risk with exposure window risk.
//!
//! Both sources assign risk levels to days. The merged risk takes the higher
//! level per day and derives one overall level from the merged days.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CheckinRiskCalculationResult, DailyRisk, RiskLevel, UtcDay};

/// Result of the Bluetooth exposure window risk calculation.
///
/// Computed elsewhere; only its per-day levels and encounter counts matter here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureWindowRiskResult {
    pub calculation_date: DateTime<Utc>,

    #[serde(default)]
    pub risk_level_per_date: BTreeMap<UtcDay, RiskLevel>,

    #[serde(default)]
    pub minimum_distinct_encounters_with_low_risk: u32,

    #[serde(default)]
    pub minimum_distinct_encounters_with_high_risk: u32,
}

impl ExposureWindowRiskResult {
    /// A result with no exposure on any day.
    pub const fn empty(calculation_date: DateTime<Utc>) -> Self {
        Self {
            calculation_date,
            risk_level_per_date: BTreeMap::new(),
            minimum_distinct_encounters_with_low_risk: 0,
            minimum_distinct_encounters_with_high_risk: 0,
        }
    }

    /// Minimum distinct encounters behind the given level.
    pub const fn minimum_distinct_encounters_with_risk_level(&self, level: RiskLevel) -> u32 {
        match level {
            RiskLevel::Low => self.minimum_distinct_encounters_with_low_risk,
            RiskLevel::High => self.minimum_distinct_encounters_with_high_risk,
        }
    }
}

impl DailyRisk for ExposureWindowRiskResult {
    fn risk_level_per_date(&self) -> &BTreeMap<UtcDay, RiskLevel> {
        &self.risk_level_per_date
    }
}

/// Which calculation produced a risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskSource {
    Checkin,
    ExposureWindow,
}

impl RiskSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Checkin => "checkin",
            Self::ExposureWindow => "exposure_window",
        }
    }
}

/// A source whose own risk level rose from `Low` to `High` since its
/// previous calculation. Reported to analytics by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceTransition {
    pub source: RiskSource,
    pub changed_at: DateTime<Utc>,
}

/// Details of the merged risk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskDetails {
    /// Latest day at the overall level, if any day is at it.
    pub most_recent_date_with_risk_level: Option<UtcDay>,
    pub number_of_days_with_risk_level: usize,
    /// Later of the two sources' calculation dates.
    pub calculation_date: DateTime<Utc>,
    /// Taken from the exposure window source only.
    pub minimum_distinct_encounters_with_risk_level: u32,
    pub risk_level_per_date: BTreeMap<UtcDay, RiskLevel>,
}

/// The user-facing risk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub level: RiskLevel,
    pub risk_level_has_changed: bool,
    pub details: RiskDetails,
}

/// Merged risk plus the per-source transitions observed while merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedRisk {
    pub risk: Risk,
    pub transitions: Vec<SourceTransition>,
}

/// Union of two per-day mappings, keeping the higher level where both
/// have a day.
pub fn merge_risk_levels_per_date(
    first: &BTreeMap<UtcDay, RiskLevel>,
    second: &BTreeMap<UtcDay, RiskLevel>,
) -> BTreeMap<UtcDay, RiskLevel> {
    let mut merged = first.clone();
    for (day, level) in second {
        merged
            .entry(*day)
            .and_modify(|existing| *existing = (*existing).max(*level))
            .or_insert(*level);
    }
    merged
}

/// Combines both sources into a single [`Risk`].
///
/// `risk_level_has_changed` compares each source with its own previous
/// result, not the merged levels. A source without a previous result never
/// counts as changed.
pub fn merge_risk(
    exposure_window: &ExposureWindowRiskResult,
    previous_exposure_window: Option<&ExposureWindowRiskResult>,
    checkin: &CheckinRiskCalculationResult,
    previous_checkin: Option<&CheckinRiskCalculationResult>,
) -> MergedRisk {
    let risk_level_per_date =
        merge_risk_levels_per_date(&exposure_window.risk_level_per_date, &checkin.risk_level_per_date);
    let level = risk_level_per_date.risk_level();

    let exposure_window_changed = source_changed(exposure_window, previous_exposure_window);
    let checkin_changed = source_changed(checkin, previous_checkin);

    let transitions: Vec<SourceTransition> = [
        transition(
            RiskSource::ExposureWindow,
            exposure_window,
            previous_exposure_window,
        ),
        transition(RiskSource::Checkin, checkin, previous_checkin),
    ]
    .into_iter()
    .flatten()
    .collect();

    for t in &transitions {
        tracing::info!(source = t.source.as_str(), changed_at = %t.changed_at, "risk rose from low to high");
    }

    let details = RiskDetails {
        most_recent_date_with_risk_level: risk_level_per_date.most_recent_date_with_risk_level(level),
        number_of_days_with_risk_level: risk_level_per_date.number_of_days_with_risk_level(level),
        calculation_date: exposure_window.calculation_date.max(checkin.calculation_date),
        minimum_distinct_encounters_with_risk_level: exposure_window
            .minimum_distinct_encounters_with_risk_level(level),
        risk_level_per_date,
    };

    tracing::debug!(
        %level,
        exposure_window_changed,
        checkin_changed,
        days = details.risk_level_per_date.len(),
        "merged risk"
    );

    MergedRisk {
        risk: Risk {
            level,
            risk_level_has_changed: exposure_window_changed || checkin_changed,
            details,
        },
        transitions,
    }
}

fn source_changed<R: DailyRisk>(current: &R, previous: Option<&R>) -> bool {
    previous.is_some_and(|previous| previous.risk_level() != current.risk_level())
}

fn transition<R: DailyRisk + HasCalculationDate>(
    source: RiskSource,
    current: &R,
    previous: Option<&R>,
) -> Option<SourceTransition> {
    let previous = previous?;
    (previous.risk_level() == RiskLevel::Low && current.risk_level() == RiskLevel::High).then(|| {
        SourceTransition {
            source,
            changed_at: current.calculation_date(),
        }
    })
}

trait HasCalculationDate {
    fn calculation_date(&self) -> DateTime<Utc>;
}

impl HasCalculationDate for ExposureWindowRiskResult {
    fn calculation_date(&self) -> DateTime<Utc> {
        self.calculation_date
    }
}

impl HasCalculationDate for CheckinRiskCalculationResult {
    fn calculation_date(&self) -> DateTime<Utc> {
        self.calculation_date
    }
}
