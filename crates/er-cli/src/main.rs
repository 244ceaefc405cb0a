use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use er_cli::commands::{calculate, calendar, history, reset};
use er_cli::state::StateStore;
use er_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    let store = StateStore::new(&config.state_dir);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Calculate(args) => calculate::run(&mut out, args, &config)?,
        Commands::History(args) => history::run(&mut out, args, &store)?,
        Commands::Calendar(args) => calendar::run(&mut out, args, &store)?,
        Commands::Reset => reset::run(&mut out, &store)?,
    }

    out.flush()?;
    Ok(())
}
