//! CLI subcommand implementations.

pub mod calculate;
pub mod calendar;
pub mod history;
pub mod reset;
