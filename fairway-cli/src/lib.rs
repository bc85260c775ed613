//! Command-line interface for the Fairway leaderboard harvester.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod harvest;

pub use error::CliError;

use harvest::{HarvestArgs, run_harvest};

/// Run the Fairway CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when argument parsing, configuration layering or the
/// harvest run fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Harvest(args) => {
            let summary = run_harvest(args)?;
            log::info!(
                "done: {} events ({} new, {} skipped), {} rows exported",
                summary.discovered,
                summary.scraped,
                summary.skipped,
                summary.exported
            );
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "fairway",
    about = "Resumable tournament leaderboard harvester",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Discover, scrape and export tournament results.
    Harvest(HarvestArgs),
}

#[cfg(test)]
mod tests;
