//! Risk detection run: check-in risk, merge with exposure windows, persist.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::Args;
use serde::{Deserialize, Serialize};

use er_core::{
    Checkin, CheckinRiskCalculationResult, CheckinRiskConfiguration, ExposureWindowRiskResult,
    NormalizedCheckin, Risk, SourceTransition, TraceTimeIntervalMatch, calculate_checkin_risk,
    merge_risk, normalize_checkins,
};

use crate::Config;
use crate::state::{PreviousResults, StateStore};

#[derive(Debug, Args)]
pub struct CalculateArgs {
    /// JSON snapshot with `checkins`, `matches` and an optional `exposureWindowResult`.
    pub input: PathBuf,

    /// Remote risk configuration (JSON). Overrides `risk_configuration_path`.
    #[arg(long)]
    pub risk_config: Option<PathBuf>,

    /// Calculation timestamp (RFC 3339). Defaults to now.
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,

    /// Include every scored split check-in in the output.
    #[arg(long)]
    pub explain: bool,

    /// Do not store the results for the next run.
    #[arg(long)]
    pub dry_run: bool,
}

/// Inputs supplied by the check-in store and the exposure window engine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationInput {
    #[serde(default)]
    pub checkins: Vec<Checkin>,

    #[serde(default)]
    pub matches: Vec<TraceTimeIntervalMatch>,

    #[serde(default)]
    pub exposure_window_result: Option<ExposureWindowRiskResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculationReport<'a> {
    risk: &'a Risk,
    transitions: &'a [SourceTransition],
    checkin_result: &'a CheckinRiskCalculationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    normalized_checkins: Option<&'a [NormalizedCheckin]>,
}

pub fn run<W: Write>(writer: &mut W, args: &CalculateArgs, config: &Config) -> Result<()> {
    let risk_config_path = args
        .risk_config
        .as_deref()
        .or(config.risk_configuration_path.as_deref());
    let Some(risk_config_path) = risk_config_path else {
        bail!("no risk configuration: pass --risk-config or set risk_configuration_path");
    };
    let risk_config = load_risk_configuration(risk_config_path)?;
    let input = load_input(&args.input)?;
    let calculation_date = args.at.unwrap_or_else(Utc::now);

    tracing::debug!(
        checkins = input.checkins.len(),
        matches = input.matches.len(),
        %calculation_date,
        "starting risk detection run"
    );

    let store = StateStore::new(&config.state_dir);
    let _lock = store.lock()?;
    let previous = store.load_previous()?;

    let checkin_result =
        calculate_checkin_risk(&input.checkins, &input.matches, &risk_config, calculation_date);
    let exposure_window_result = input
        .exposure_window_result
        .unwrap_or_else(|| ExposureWindowRiskResult::empty(calculation_date));

    let merged = merge_risk(
        &exposure_window_result,
        previous.exposure_window.as_ref(),
        &checkin_result,
        previous.checkin.as_ref(),
    );

    let normalized = args
        .explain
        .then(|| normalize_checkins(&input.checkins, &input.matches, &risk_config));

    if args.json {
        let report = CalculationReport {
            risk: &merged.risk,
            transitions: &merged.transitions,
            checkin_result: &checkin_result,
            normalized_checkins: normalized.as_deref(),
        };
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        writeln!(writer, "{json}")?;
    } else {
        if let Some(normalized) = &normalized {
            write_normalized(writer, normalized)?;
        }
        write_risk(writer, &merged.risk, &merged.transitions)?;
    }

    if args.dry_run {
        tracing::debug!("dry run, state left untouched");
        return Ok(());
    }

    store.append_history(&checkin_result, config.history_retention_days)?;
    store.save_previous(&PreviousResults {
        checkin: Some(checkin_result),
        exposure_window: Some(exposure_window_result),
    })?;

    Ok(())
}

/// Reads the cached remote risk configuration.
pub fn load_risk_configuration(path: &Path) -> Result<CheckinRiskConfiguration> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read risk configuration {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse risk configuration {}", path.display()))
}

fn load_input(path: &Path) -> Result<CalculationInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse input {}", path.display()))
}

fn write_normalized<W: Write>(writer: &mut W, normalized: &[NormalizedCheckin]) -> Result<()> {
    writeln!(writer, "Check-ins:")?;
    if normalized.is_empty() {
        writeln!(writer, "- none with overlapping matches")?;
    }
    for checkin in normalized {
        let level = checkin.risk_level.map_or("-", |level| level.as_str());
        writeln!(
            writer,
            "- {} on {}: normalized time {:.2}, level {}",
            checkin.split.checkin_id,
            checkin.split.day(),
            checkin.normalized_time,
            level
        )?;
    }
    writeln!(writer)?;
    Ok(())
}

fn write_risk<W: Write>(writer: &mut W, risk: &Risk, transitions: &[SourceTransition]) -> Result<()> {
    let changed = if risk.risk_level_has_changed {
        " (changed)"
    } else {
        ""
    };
    writeln!(writer, "Risk: {}{changed}", risk.level)?;

    let details = &risk.details;
    match details.most_recent_date_with_risk_level {
        Some(day) => writeln!(writer, "Most recent day at this level: {day}")?,
        None => writeln!(writer, "Most recent day at this level: none")?,
    }
    writeln!(
        writer,
        "Days at this level: {}",
        details.number_of_days_with_risk_level
    )?;
    writeln!(
        writer,
        "Minimum distinct encounters: {}",
        details.minimum_distinct_encounters_with_risk_level
    )?;
    writeln!(
        writer,
        "Calculated: {}",
        details
            .calculation_date
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    )?;

    if !details.risk_level_per_date.is_empty() {
        writeln!(writer, "Per day:")?;
        for (day, level) in &details.risk_level_per_date {
            writeln!(writer, "- {day}: {level}")?;
        }
    }

    for transition in transitions {
        writeln!(
            writer,
            "Transition: {} risk rose to high at {}",
            transition.source.as_str(),
            transition
                .changed_at
                .to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
    }

    Ok(())
}
