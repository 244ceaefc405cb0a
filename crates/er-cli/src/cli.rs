//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::calculate::CalculateArgs;
use crate::commands::calendar::CalendarArgs;
use crate::commands::history::HistoryArgs;

/// Exposure risk detection.
///
/// Aggregates check-in warnings into per-day risk and merges it with
/// exposure window risk.
#[derive(Debug, Parser)]
#[command(name = "er", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a risk detection cycle on a snapshot of check-ins and matches.
    Calculate(CalculateArgs),

    /// List stored check-in risk results.
    History(HistoryArgs),

    /// Show per-day risk of the latest check-in calculation.
    Calendar(CalendarArgs),

    /// Delete stored results.
    Reset,
}
