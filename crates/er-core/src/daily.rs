//! Queries shared by every per-date risk mapping.

use std::collections::BTreeMap;

use crate::{RiskLevel, UtcDay};

/// A result that assigns risk levels to calendar days.
///
/// Days missing from the mapping carry no risk; they are not `Low`.
pub trait DailyRisk {
    fn risk_level_per_date(&self) -> &BTreeMap<UtcDay, RiskLevel>;

    /// `High` if any day is `High`, otherwise `Low`.
    fn risk_level(&self) -> RiskLevel {
        overall_risk_level(self.risk_level_per_date())
    }

    /// Latest day at exactly `level`.
    fn most_recent_date_with_risk_level(&self, level: RiskLevel) -> Option<UtcDay> {
        self.risk_level_per_date()
            .iter()
            .rev()
            .find(|(_, day_level)| **day_level == level)
            .map(|(day, _)| *day)
    }

    fn number_of_days_with_risk_level(&self, level: RiskLevel) -> usize {
        self.risk_level_per_date()
            .values()
            .filter(|day_level| **day_level == level)
            .count()
    }
}

impl DailyRisk for BTreeMap<UtcDay, RiskLevel> {
    fn risk_level_per_date(&self) -> &BTreeMap<UtcDay, RiskLevel> {
        self
    }
}

pub(crate) fn overall_risk_level(per_date: &BTreeMap<UtcDay, RiskLevel>) -> RiskLevel {
    if per_date.values().any(|level| *level == RiskLevel::High) {
        RiskLevel::High
    } else {
        RiskLevel::Low
    }
}
