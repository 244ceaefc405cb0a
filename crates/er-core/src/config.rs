//! Remote risk calculation configuration.
//!
//! The configuration blob is fetched and cached elsewhere; this crate only
//! reads it. Missing entries degrade to "no contribution" rather than errors.

use serde::{Deserialize, Serialize};

use crate::RangeTable;

/// Maps a match's transmission risk level to a numeric weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransmissionRiskValueMapping {
    pub transmission_risk_level: u8,
    pub transmission_risk_value: f64,
}

/// Parameters of the check-in risk calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinRiskConfiguration {
    #[serde(default)]
    pub transmission_risk_value_mapping: Vec<TransmissionRiskValueMapping>,

    /// Maps the normalized time of one split check-in to a risk level.
    #[serde(default)]
    pub normalized_time_per_check_in_to_risk_level_mapping: RangeTable,

    /// Maps the summed normalized time of one day to a risk level.
    #[serde(default)]
    pub normalized_time_per_day_to_risk_level_mapping: RangeTable,
}

impl CheckinRiskConfiguration {
    /// Weight for a transmission risk level; unmapped levels weigh nothing.
    pub fn transmission_risk_value(&self, transmission_risk_level: u8) -> Option<f64> {
        self.transmission_risk_value_mapping
            .iter()
            .find(|m| m.transmission_risk_level == transmission_risk_level)
            .map(|m| m.transmission_risk_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RiskLevel;

    #[test]
    fn test_parses_camel_case_blob() {
        let json = r#"{
            "transmissionRiskValueMapping": [
                {"transmissionRiskLevel": 5, "transmissionRiskValue": 1.0},
                {"transmissionRiskLevel": 3, "transmissionRiskValue": 0.5}
            ],
            "normalizedTimePerCheckInToRiskLevelMapping": [
                {"min": 0, "max": 20, "riskLevel": "low"},
                {"min": 20, "max": 100, "riskLevel": "high"}
            ]
        }"#;
        let config: CheckinRiskConfiguration = serde_json::from_str(json).unwrap();
        assert_eq!(config.transmission_risk_value(3), Some(0.5));
        assert_eq!(config.transmission_risk_value(7), None);
        assert_eq!(
            config
                .normalized_time_per_check_in_to_risk_level_mapping
                .risk_level(30.0),
            Some(RiskLevel::High)
        );
        assert!(config.normalized_time_per_day_to_risk_level_mapping.is_empty());
    }

    #[test]
    fn test_first_mapping_entry_wins() {
        let config = CheckinRiskConfiguration {
            transmission_risk_value_mapping: vec![
                TransmissionRiskValueMapping {
                    transmission_risk_level: 2,
                    transmission_risk_value: 0.8,
                },
                TransmissionRiskValueMapping {
                    transmission_risk_level: 2,
                    transmission_risk_value: 0.1,
                },
            ],
            ..CheckinRiskConfiguration::default()
        };
        assert_eq!(config.transmission_risk_value(2), Some(0.8));
    }
}
