//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding previous results and calculation history.
    pub state_dir: PathBuf,

    /// Cached remote risk configuration (JSON).
    pub risk_configuration_path: Option<PathBuf>,

    /// History entries older than this, relative to the newest, are pruned.
    pub history_retention_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: dirs_data_path().unwrap_or_else(|| PathBuf::from(".")),
            risk_configuration_path: None,
            history_retention_days: 14,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // ER_STATE_DIR, ER_RISK_CONFIGURATION_PATH, ...
        figment = figment.merge(Env::prefixed("ER_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for er.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("er"))
}

/// Returns the platform-specific data directory for er.
///
/// On Linux: `~/.local/share/er`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("er"))
}
