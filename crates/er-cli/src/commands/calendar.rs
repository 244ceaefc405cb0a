//! Calendar view of the latest check-in risk result.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use clap::Args;

use crate::state::StateStore;

#[derive(Debug, Args)]
pub struct CalendarArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &CalendarArgs, store: &StateStore) -> Result<()> {
    let Some(result) = store.load_previous()?.checkin else {
        writeln!(writer, "No check-in risk calculated yet.")?;
        return Ok(());
    };

    if args.json {
        let json = serde_json::to_string_pretty(&result).context("failed to serialize result")?;
        writeln!(writer, "{json}")?;
        return Ok(());
    }

    writeln!(
        writer,
        "Check-in risk calculated {}",
        result
            .calculation_date
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    )?;

    let days: BTreeSet<_> = result
        .risk_level_per_date
        .keys()
        .chain(result.checkin_ids_with_risk_per_date.keys())
        .copied()
        .collect();

    if days.is_empty() {
        writeln!(writer, "No days with risk.")?;
        return Ok(());
    }

    for day in days {
        let level = result
            .risk_level_per_date
            .get(&day)
            .map_or("-", |level| level.as_str());

        let mut checkins = String::new();
        for (i, checkin) in result
            .checkin_ids_with_risk_per_date
            .get(&day)
            .into_iter()
            .flatten()
            .enumerate()
        {
            if i > 0 {
                checkins.push_str(", ");
            }
            write!(checkins, "{}:{}", checkin.checkin_id, checkin.risk_level)?;
        }
        if checkins.is_empty() {
            checkins.push('-');
        }

        writeln!(writer, "{day}  {level:<4}  check-ins {checkins}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};
    use er_core::{CheckinIdWithRisk, CheckinRiskCalculationResult, RiskLevel, UtcDay};
    use insta::assert_snapshot;

    use super::*;
    use crate::state::PreviousResults;

    fn day(d: u32) -> UtcDay {
        UtcDay::containing(Utc.with_ymd_and_hms(2021, 4, d, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_calendar_shows_both_tracks() {
        let temp = tempfile::tempdir().unwrap();
        let store = StateStore::new(temp.path());
        let result = CheckinRiskCalculationResult {
            calculation_date: Utc.with_ymd_and_hms(2021, 4, 22, 8, 0, 0).unwrap(),
            checkin_ids_with_risk_per_date: BTreeMap::from([
                (
                    day(20),
                    BTreeSet::from([
                        CheckinIdWithRisk {
                            checkin_id: 1,
                            risk_level: RiskLevel::High,
                        },
                        CheckinIdWithRisk {
                            checkin_id: 4,
                            risk_level: RiskLevel::Low,
                        },
                    ]),
                ),
                (
                    day(21),
                    BTreeSet::from([CheckinIdWithRisk {
                        checkin_id: 1,
                        risk_level: RiskLevel::Low,
                    }]),
                ),
            ]),
            risk_level_per_date: BTreeMap::from([
                (day(19), RiskLevel::Low),
                (day(20), RiskLevel::High),
            ]),
        };
        store
            .save_previous(&PreviousResults {
                checkin: Some(result),
                exposure_window: None,
            })
            .unwrap();

        let mut output = Vec::new();
        run(&mut output, &CalendarArgs { json: false }, &store).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Check-in risk calculated 2021-04-22T08:00:00Z
        2021-04-19  low   check-ins -
        2021-04-20  high  check-ins 1:high, 4:low
        2021-04-21  -     check-ins 1:low
        ");
    }

    #[test]
    fn test_calendar_without_state() {
        let temp = tempfile::tempdir().unwrap();
        let mut output = Vec::new();

        run(&mut output, &CalendarArgs { json: false }, &StateStore::new(temp.path())).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "No check-in risk calculated yet.\n"
        );
    }
}
