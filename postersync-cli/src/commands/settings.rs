//! The `settings` subcommand.

use std::process::ExitCode;

use postersync_core::Settings;

use crate::cli_types::SettingsAction;
use crate::error::CliError;

pub(crate) fn run(action: &SettingsAction) -> Result<ExitCode, CliError> {
    let path = Settings::path().map_err(|err| CliError::config(err.to_string()))?;
    match action {
        SettingsAction::Locate => {
            println!("{}", path.display());
        }
        SettingsAction::View => {
            // creates the file with defaults on first use
            Settings::load().map_err(|err| CliError::config(err.to_string()))?;
            let contents = std::fs::read_to_string(&path)?;
            println!("{}", path.display());
            println!();
            print!("{contents}");
        }
    }
    Ok(ExitCode::SUCCESS)
}
