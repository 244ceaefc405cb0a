//! Persistent state between risk detection runs.
//!
//! The state directory holds:
//! - `previous.json`: the last result of each source, used to detect changes
//! - `history.json`: past check-in results ordered by calculation date
//! - `state.lock`: exclusive lock held for the duration of a run

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::TimeDelta;
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use er_core::{CheckinRiskCalculationResult, ExposureWindowRiskResult};

/// Results of the previous run, per source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousResults {
    pub checkin: Option<CheckinRiskCalculationResult>,
    pub exposure_window: Option<ExposureWindowRiskResult>,
}

/// File-backed store rooted at the configured state directory.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

/// Guard for the state directory lock. Released on drop.
#[derive(Debug)]
pub struct StateLock {
    _file: File,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn previous_path(&self) -> PathBuf {
        self.dir.join("previous.json")
    }

    fn history_path(&self) -> PathBuf {
        self.dir.join("history.json")
    }

    /// Blocks until no other run holds the state directory.
    pub fn lock(&self) -> Result<StateLock> {
        fs::create_dir_all(&self.dir).context("failed to create state directory")?;
        let file = File::create(self.dir.join("state.lock")).context("failed to create lock file")?;
        file.lock_exclusive().context("failed to acquire lock")?;
        Ok(StateLock { _file: file })
    }

    pub fn load_previous(&self) -> Result<PreviousResults> {
        Ok(read_json(&self.previous_path())?.unwrap_or_default())
    }

    pub fn save_previous(&self, previous: &PreviousResults) -> Result<()> {
        write_json(&self.previous_path(), previous)
    }

    /// Stored check-in results, oldest first.
    pub fn load_history(&self) -> Result<Vec<CheckinRiskCalculationResult>> {
        Ok(read_json(&self.history_path())?.unwrap_or_default())
    }

    /// Adds a result to the history and prunes entries more than
    /// `retention_days` older than the newest one. A retention too long to
    /// represent keeps everything; a negative one is rejected.
    pub fn append_history(
        &self,
        result: &CheckinRiskCalculationResult,
        retention_days: i64,
    ) -> Result<usize> {
        if retention_days < 0 {
            bail!("history retention must not be negative, got {retention_days} days");
        }

        let mut history = self.load_history()?;
        history.retain(|entry| entry.calculation_date != result.calculation_date);
        history.push(result.clone());
        history.sort_by_key(|entry| entry.calculation_date);

        let cutoff = history.last().and_then(|newest| {
            TimeDelta::try_days(retention_days)
                .and_then(|retention| newest.calculation_date.checked_sub_signed(retention))
        });
        if let Some(cutoff) = cutoff {
            let before = history.len();
            history.retain(|entry| entry.calculation_date >= cutoff);
            let pruned = before - history.len();
            if pruned > 0 {
                tracing::debug!(pruned, "pruned expired history entries");
            }
        }

        write_json(&self.history_path(), &history)?;
        Ok(history.len())
    }

    /// Removes stored results. Returns false if there was nothing to remove.
    pub fn clear(&self) -> Result<bool> {
        let mut removed = false;
        for path in [self.previous_path(), self.history_path()] {
            match fs::remove_file(&path) {
                Ok(()) => removed = true,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e).with_context(|| format!("failed to remove {}", path.display()));
                }
            }
        }
        Ok(removed)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let value = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Writes through a temporary file so readers never see a partial document.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create state directory")?;
    }
    let json = serde_json::to_string_pretty(value).context("failed to serialize state")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}
