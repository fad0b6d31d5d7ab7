//! The `set` subcommand: apply one Mediux set directly.

use std::process::ExitCode;

use postersync_core::{CandidateSet, MediaServer, SetSource, Settings};
use postersync_engine::{apply_set, find_target, run_with_events};
use postersync_mediux::{MediuxClient, parse_set_reference};
use postersync_server::{JellyfinServer, PlexServer};
use tokio::sync::mpsc;

use crate::cli_types::{Cli, SetArgs};
use crate::commands::{
    build_runtime, handle_event, load_settings, mediux_client, print_report, print_target_error,
};
use crate::error::CliError;
use crate::spinner::SpinnerPool;

enum ApplyStatus {
    Applied,
    Failed,
    NotFound,
}

pub(crate) fn run(cli: &Cli, args: &SetArgs) -> Result<ExitCode, CliError> {
    let settings = load_settings()?;
    let Some(set_id) = parse_set_reference(&args.set) else {
        return Err(CliError::config(format!(
            "'{}' is not a set id or a mediux.pro set URL",
            args.set
        )));
    };
    if !settings.jellyfin.is_configured() && !settings.plex.is_configured() {
        return Err(CliError::config(
            "no media server configured; set a Jellyfin API key or a Plex token",
        ));
    }
    let mediux = mediux_client(&settings)?;

    let runtime = build_runtime()?;
    runtime.block_on(async {
        let set = mediux
            .get_set(set_id)
            .await
            .map_err(|err| CliError::service(err.to_string()))?;
        println!(
            "Set '{}' by {} ({} TMDB {})",
            set.title, set.username, set.media_kind, set.tmdb_id
        );

        let mut failed = 0usize;
        let mut found = 0usize;
        if settings.jellyfin.is_configured() {
            let server =
                JellyfinServer::new(&settings.jellyfin.base_url, &settings.jellyfin.api_key)
                    .map_err(|err| CliError::service(err.to_string()))?;
            tally(
                apply_on_server(&server, &mediux, &set, &settings, cli.quiet).await?,
                &mut failed,
                &mut found,
            );
        }
        if settings.plex.is_configured() {
            let server = PlexServer::new(&settings.plex.base_url, &settings.plex.token)
                .map_err(|err| CliError::service(err.to_string()))?;
            tally(
                apply_on_server(&server, &mediux, &set, &settings, cli.quiet).await?,
                &mut failed,
                &mut found,
            );
        }

        if found == 0 {
            log::warn!(
                "No configured server has {} {}",
                set.media_kind,
                set.tmdb_id
            );
            return Ok(ExitCode::from(2));
        }
        if failed > 0 {
            return Ok(ExitCode::from(2));
        }
        Ok(ExitCode::SUCCESS)
    })
}

fn tally(status: ApplyStatus, failed: &mut usize, found: &mut usize) {
    match status {
        ApplyStatus::Applied => *found += 1,
        ApplyStatus::Failed => {
            *failed += 1;
            *found += 1;
        }
        ApplyStatus::NotFound => {}
    }
}

async fn apply_on_server<S: MediaServer>(
    server: &S,
    mediux: &MediuxClient,
    set: &CandidateSet,
    settings: &Settings,
    quiet: bool,
) -> Result<ApplyStatus, CliError> {
    let target = match find_target(server, set.tmdb_id, set.media_kind, &settings.skip_libraries)
        .await
    {
        Ok(Some(target)) => target,
        Ok(None) => {
            log::info!(
                "{} does not have {} {}",
                server.name(),
                set.media_kind,
                set.tmdb_id
            );
            return Ok(ApplyStatus::NotFound);
        }
        Err(err) if err.is_auth() => {
            return Err(CliError::service(format!("{}: {err}", server.name())));
        }
        Err(err) => {
            log::error!("Failed to search {}: {err}", server.name());
            return Ok(ApplyStatus::Failed);
        }
    };

    let mut pool = SpinnerPool::new(1, quiet);
    let (tx, rx) = mpsc::unbounded_channel();
    let task = apply_set(
        server,
        mediux,
        set,
        &target,
        settings.kometa_integration,
        tx,
    );
    match run_with_events(task, rx, |event| handle_event(&mut pool, event)).await {
        Ok(report) => {
            print_report(&report);
            Ok(if report.failed > 0 {
                ApplyStatus::Failed
            } else {
                ApplyStatus::Applied
            })
        }
        Err(err) if err.is_fatal() => Err(CliError::service(format!("{}: {err}", server.name()))),
        Err(err) => {
            print_target_error(target.title(), &err);
            Ok(ApplyStatus::Failed)
        }
    }
}
