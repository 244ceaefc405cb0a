//! Lists stored check-in risk results.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use clap::Args;

use er_core::{DailyRisk, RiskLevel};

use crate::state::StateStore;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,

    /// Show at most this many results, newest first.
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn run<W: Write>(writer: &mut W, args: &HistoryArgs, store: &StateStore) -> Result<()> {
    let history = store.load_history()?;
    let limit = args.limit.unwrap_or(history.len());
    let newest_first: Vec<_> = history.iter().rev().take(limit).collect();

    if args.json {
        let json =
            serde_json::to_string_pretty(&newest_first).context("failed to serialize history")?;
        writeln!(writer, "{json}")?;
        return Ok(());
    }

    if newest_first.is_empty() {
        writeln!(writer, "No check-in risk calculations recorded.")?;
        return Ok(());
    }

    for result in newest_first {
        let level = result.risk_level();
        writeln!(
            writer,
            "{}  {:<4}  {} high day(s), {} low day(s)",
            result
                .calculation_date
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            level.as_str(),
            result.number_of_days_with_risk_level(RiskLevel::High),
            result.number_of_days_with_risk_level(RiskLevel::Low),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};
    use er_core::{CheckinRiskCalculationResult, UtcDay};
    use insta::assert_snapshot;

    use super::*;

    fn result(day: u32, levels: &[(u32, RiskLevel)]) -> CheckinRiskCalculationResult {
        CheckinRiskCalculationResult {
            calculation_date: Utc.with_ymd_and_hms(2021, 4, day, 8, 0, 0).unwrap(),
            checkin_ids_with_risk_per_date: BTreeMap::new(),
            risk_level_per_date: levels
                .iter()
                .map(|(d, level)| {
                    let day = UtcDay::containing(Utc.with_ymd_and_hms(2021, 4, *d, 0, 0, 0).unwrap());
                    (day, *level)
                })
                .collect(),
        }
    }

    fn store_with_history() -> (tempfile::TempDir, StateStore) {
        let temp = tempfile::tempdir().unwrap();
        let store = StateStore::new(temp.path());
        store.append_history(&result(20, &[(18, RiskLevel::Low)]), 14).unwrap();
        store
            .append_history(
                &result(22, &[(18, RiskLevel::Low), (20, RiskLevel::High), (21, RiskLevel::Low)]),
                14,
            )
            .unwrap();
        (temp, store)
    }

    #[test]
    fn test_history_lists_newest_first() {
        let (_temp, store) = store_with_history();
        let mut output = Vec::new();
        let args = HistoryArgs {
            json: false,
            limit: None,
        };

        run(&mut output, &args, &store).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        2021-04-22T08:00:00Z  high  1 high day(s), 2 low day(s)
        2021-04-20T08:00:00Z  low   0 high day(s), 1 low day(s)
        ");
    }

    #[test]
    fn test_history_limit_and_json() {
        let (_temp, store) = store_with_history();
        let mut output = Vec::new();
        let args = HistoryArgs {
            json: true,
            limit: Some(1),
        };

        run(&mut output, &args, &store).unwrap();

        let parsed: Vec<CheckinRiskCalculationResult> = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(
            parsed[0].calculation_date,
            Utc.with_ymd_and_hms(2021, 4, 22, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_empty_history() {
        let temp = tempfile::tempdir().unwrap();
        let mut output = Vec::new();
        let args = HistoryArgs {
            json: false,
            limit: None,
        };

        run(&mut output, &args, &StateStore::new(temp.path())).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "No check-in risk calculations recorded.\n"
        );
    }
}
