//! Config-driven range tables mapping a score to a risk level.

use serde::{Deserialize, Serialize};

use crate::RiskLevel;

/// One entry of a range table.
///
/// Bounds default to the half-open interval `[min, max)`. An absent `max`
/// leaves the range unbounded above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskLevelRange {
    pub min: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default)]
    pub min_exclusive: bool,

    #[serde(default = "default_max_exclusive")]
    pub max_exclusive: bool,

    pub risk_level: RiskLevel,
}

const fn default_max_exclusive() -> bool {
    true
}

impl RiskLevelRange {
    /// Creates the half-open range `[min, max)`.
    #[must_use]
    pub const fn new(min: f64, max: Option<f64>, risk_level: RiskLevel) -> Self {
        Self {
            min,
            max,
            min_exclusive: false,
            max_exclusive: true,
            risk_level,
        }
    }

    /// Returns true if `value` lies within the range. NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        let above_min = if self.min_exclusive {
            value > self.min
        } else {
            value >= self.min
        };
        let below_max = match self.max {
            None => !value.is_nan(),
            Some(max) if self.max_exclusive => value < max,
            Some(max) => value <= max,
        };
        above_min && below_max
    }
}

/// An ordered list of ranges.
///
/// Lookups scan in configuration order and the first containing range wins,
/// even when ranges overlap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeTable {
    ranges: Vec<RiskLevelRange>,
}

impl RangeTable {
    #[must_use]
    pub const fn new(ranges: Vec<RiskLevelRange>) -> Self {
        Self { ranges }
    }

    pub fn ranges(&self) -> &[RiskLevelRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Risk level of the first range containing `value`.
    ///
    /// `None` means the value contributes no risk at all, which is distinct
    /// from matching a `Low` range.
    pub fn risk_level(&self, value: f64) -> Option<RiskLevel> {
        self.ranges
            .iter()
            .find(|range| range.contains(value))
            .map(|range| range.risk_level)
    }
}

impl FromIterator<RiskLevelRange> for RangeTable {
    fn from_iter<I: IntoIterator<Item = RiskLevelRange>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn low_high(threshold: f64) -> RangeTable {
        RangeTable::new(vec![
            RiskLevelRange::new(0.0, Some(threshold), RiskLevel::Low),
            RiskLevelRange::new(threshold, None, RiskLevel::High),
        ])
    }

    #[test]
    fn test_lower_bound_inclusive_upper_exclusive() {
        let table = low_high(20.0);
        assert_eq!(table.risk_level(0.0), Some(RiskLevel::Low));
        assert_eq!(table.risk_level(19.999), Some(RiskLevel::Low));
        assert_eq!(table.risk_level(20.0), Some(RiskLevel::High));
        assert_eq!(table.risk_level(1e9), Some(RiskLevel::High));
    }

    #[test]
    fn test_no_match_is_none_not_low() {
        let table = RangeTable::new(vec![RiskLevelRange::new(
            25.0,
            None,
            RiskLevel::High,
        )]);
        assert_eq!(table.risk_level(10.0), None);
        assert_eq!(table.risk_level(-1.0), None);
        assert_eq!(RangeTable::default().risk_level(10.0), None);
    }

    #[test]
    fn test_first_match_wins_for_overlapping_ranges() {
        let table = RangeTable::new(vec![
            RiskLevelRange::new(10.0, Some(30.0), RiskLevel::High),
            RiskLevelRange::new(0.0, Some(50.0), RiskLevel::Low),
        ]);
        assert_eq!(table.risk_level(15.0), Some(RiskLevel::High));
        assert_eq!(table.risk_level(5.0), Some(RiskLevel::Low));
        assert_eq!(table.risk_level(40.0), Some(RiskLevel::Low));

        let reversed: RangeTable = table.ranges().iter().rev().cloned().collect();
        assert_eq!(reversed.risk_level(15.0), Some(RiskLevel::Low));
    }

    #[test]
    fn test_exclusivity_flags() {
        let range = RiskLevelRange {
            min: 0.0,
            max: Some(10.0),
            min_exclusive: true,
            max_exclusive: false,
            risk_level: RiskLevel::Low,
        };
        assert!(!range.contains(0.0));
        assert!(range.contains(0.1));
        assert!(range.contains(10.0));
        assert!(!range.contains(10.1));
    }

    #[test]
    fn test_nan_never_matches() {
        assert_eq!(low_high(20.0).risk_level(f64::NAN), None);
    }

    #[test]
    fn test_deserializes_remote_config_shape() {
        let json = r#"[
            {"min": 0, "max": 9, "riskLevel": "LOW"},
            {"min": 9, "riskLevel": "HIGH", "minExclusive": true}
        ]"#;
        let table: RangeTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.ranges().len(), 2);
        assert!(table.ranges()[0].max_exclusive);
        assert_eq!(table.risk_level(9.0), None);
        assert_eq!(table.risk_level(9.5), Some(RiskLevel::High));
    }
}
