//! The `media` subcommand: show one item's fulfillment state.

use std::process::ExitCode;

use owo_colors::{OwoColorize, Stream};
use postersync_core::{FulfillmentState, MediaServer, Settings};
use postersync_engine::find_target;
use postersync_server::{JellyfinServer, PlexServer};

use crate::cli_types::{Cli, MediaArgs};
use crate::commands::{build_runtime, load_settings};
use crate::error::CliError;

pub(crate) fn run(_cli: &Cli, args: &MediaArgs) -> Result<ExitCode, CliError> {
    let settings = load_settings()?;
    if !settings.jellyfin.is_configured() && !settings.plex.is_configured() {
        return Err(CliError::config(
            "no media server configured; set a Jellyfin API key or a Plex token",
        ));
    }

    let runtime = build_runtime()?;
    runtime.block_on(async {
        let mut found = 0usize;
        if settings.jellyfin.is_configured() {
            let server =
                JellyfinServer::new(&settings.jellyfin.base_url, &settings.jellyfin.api_key)
                    .map_err(|err| CliError::service(err.to_string()))?;
            found += usize::from(inspect_on_server(&server, args, &settings).await?);
        }
        if settings.plex.is_configured() {
            let server = PlexServer::new(&settings.plex.base_url, &settings.plex.token)
                .map_err(|err| CliError::service(err.to_string()))?;
            found += usize::from(inspect_on_server(&server, args, &settings).await?);
        }

        if found == 0 {
            log::warn!("No configured server has {} {}", args.kind, args.tmdb_id);
            return Ok(ExitCode::from(2));
        }
        Ok(ExitCode::SUCCESS)
    })
}

async fn inspect_on_server<S: MediaServer>(
    server: &S,
    args: &MediaArgs,
    settings: &Settings,
) -> Result<bool, CliError> {
    let target = match find_target(server, args.tmdb_id, args.kind, &settings.skip_libraries).await
    {
        Ok(Some(target)) => target,
        Ok(None) => return Ok(false),
        Err(err) if err.is_auth() => {
            return Err(CliError::service(format!("{}: {err}", server.name())));
        }
        Err(err) => {
            log::error!("Failed to search {}: {err}", server.name());
            return Ok(false);
        }
    };

    let state = FulfillmentState::for_target(&target);
    println!(
        "{} '{}' on {} (TMDB {})",
        target.kind(),
        target.title(),
        server.name(),
        target.tmdb_id()
    );
    for (_key, slot) in state.slots() {
        for (kind, fulfilled) in slot.kinds() {
            let symbol = if fulfilled {
                "✔".if_supports_color(Stream::Stdout, |t| t.green()).to_string()
            } else {
                "✘".if_supports_color(Stream::Stdout, |t| t.red()).to_string()
            };
            println!("  {symbol} {} {kind}", slot.label());
        }
    }
    if state.is_complete() {
        println!("  all required artwork is present");
    } else {
        println!("  {} images missing", state.missing().len());
    }
    Ok(true)
}
