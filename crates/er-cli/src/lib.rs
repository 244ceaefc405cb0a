//! Exposure risk CLI library.
//!
//! This crate provides the CLI interface and the file-backed state that
//! carries results from one risk detection run to the next.

mod cli;
pub mod commands;
mod config;
pub mod state;

pub use cli::{Cli, Commands};
pub use config::Config;
