//! `postersync`: sync Mediux artwork sets to Plex and Jellyfin.

mod cli_types;
mod commands;
mod error;
mod logging;
mod spinner;

use std::process::ExitCode;

use clap::Parser;

use crate::cli_types::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("Failed to initialize logging: {err}");
        return ExitCode::from(1);
    }

    let result = match &cli.command {
        Commands::Sync(args) => commands::sync::run(&cli, args),
        Commands::Set(args) => commands::set::run(&cli, args),
        Commands::Media(args) => commands::media::run(&cli, args),
        Commands::Settings { action } => commands::settings::run(action),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err}");
            ExitCode::from(1)
        }
    }
}
