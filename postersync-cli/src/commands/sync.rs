//! The `sync` subcommand: sweep every configured server.

use std::process::ExitCode;

use owo_colors::{OwoColorize, Stream};
use postersync_core::{MediaServer, Settings};
use postersync_engine::{
    SweepOptions, SyncLog, SyncPolicy, gather_targets, reconcile, run_with_events,
};
use postersync_mediux::MediuxClient;
use postersync_server::{JellyfinServer, PlexServer};
use tokio::sync::mpsc;

use crate::cli_types::{Cli, SyncArgs};
use crate::commands::{
    build_runtime, handle_event, load_settings, mediux_client, print_report, print_target_error,
};
use crate::error::CliError;
use crate::spinner::SpinnerPool;

pub(crate) fn run(cli: &Cli, args: &SyncArgs) -> Result<ExitCode, CliError> {
    let settings = load_settings()?;
    if !settings.jellyfin.is_configured() && !settings.plex.is_configured() {
        return Err(CliError::config(
            "no media server configured; set a Jellyfin API key or a Plex token",
        ));
    }
    let mediux = mediux_client(&settings)?;
    let policy = SyncPolicy::from_settings(&settings);
    let options = SweepOptions {
        skip_shows: args.skip_shows,
        skip_movies: args.skip_movies,
        skip_collections: args.skip_collections,
        skip_libraries: settings.skip_libraries.clone(),
    };

    let runtime = build_runtime()?;
    let mut sync_log = SyncLog::new();
    let mut connection_errors = 0usize;

    runtime.block_on(async {
        if settings.jellyfin.is_configured() {
            let server = JellyfinServer::new(&settings.jellyfin.base_url, &settings.jellyfin.api_key)
                .map_err(|err| CliError::service(err.to_string()))?;
            sweep_server(
                &server,
                &mediux,
                &policy,
                &options,
                &settings,
                cli.quiet,
                &mut sync_log,
                &mut connection_errors,
            )
            .await?;
        }
        if settings.plex.is_configured() {
            let server = PlexServer::new(&settings.plex.base_url, &settings.plex.token)
                .map_err(|err| CliError::service(err.to_string()))?;
            sweep_server(
                &server,
                &mediux,
                &policy,
                &options,
                &settings,
                cli.quiet,
                &mut sync_log,
                &mut connection_errors,
            )
            .await?;
        }
        Ok::<(), CliError>(())
    })?;

    if let Some(cache_dir) = dirs::cache_dir() {
        match sync_log.write_to_file(&cache_dir.join("postersync")) {
            Ok(path) => log::info!("Sync log written to {}", path.display()),
            Err(err) => log::warn!("Failed to write sync log: {err}"),
        }
    }

    let summary = sync_log.summary();
    println!(
        "\n{} complete, {} already complete, {} partial, {} without candidates, {} errors",
        summary.complete,
        summary.already_complete,
        summary.partial,
        summary.no_candidates,
        summary.errors + connection_errors,
    );
    println!(
        "{} images uploaded, {} failed",
        summary.uploaded, summary.failed
    );

    if summary.had_errors() || connection_errors > 0 {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Sweep one server. Auth failures bubble up as fatal; connection
/// problems count as errors but let the other server proceed.
#[allow(clippy::too_many_arguments)]
async fn sweep_server<S: MediaServer>(
    server: &S,
    mediux: &MediuxClient,
    policy: &SyncPolicy,
    options: &SweepOptions,
    settings: &Settings,
    quiet: bool,
    sync_log: &mut SyncLog,
    connection_errors: &mut usize,
) -> Result<(), CliError> {
    if let Err(err) = server.validate().await {
        if err.is_auth() {
            return Err(CliError::service(format!("{}: {err}", server.name())));
        }
        log::error!("Unable to reach {}: {err}", server.name());
        *connection_errors += 1;
        return Ok(());
    }
    println!(
        "{} Connected to {}",
        "✔".if_supports_color(Stream::Stdout, |t| t.green()),
        server.name()
    );

    let targets = match gather_targets(server, options).await {
        Ok(targets) => targets,
        Err(err) if err.is_auth() => {
            return Err(CliError::service(format!("{}: {err}", server.name())));
        }
        Err(err) => {
            log::error!("Failed to list {} libraries: {err}", server.name());
            *connection_errors += 1;
            return Ok(());
        }
    };
    if targets.is_empty() {
        log::info!("No matching media found on {}", server.name());
        return Ok(());
    }
    println!("Syncing {} items on {}", targets.len(), server.name());

    let mut pool = SpinnerPool::new(1, quiet);
    for target in targets {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = reconcile(
            server,
            mediux,
            policy,
            &target,
            settings.kometa_integration,
            tx,
        );
        let result = run_with_events(task, rx, |event| handle_event(&mut pool, event)).await;
        match result {
            Ok(report) => {
                print_report(&report);
                sync_log.record(server.name(), report);
            }
            Err(err) if err.is_fatal() => {
                return Err(CliError::service(format!("{}: {err}", server.name())));
            }
            Err(err) => {
                print_target_error(target.title(), &err);
                sync_log.record_error(server.name(), target.title(), target.kind(), &err);
            }
        }
    }
    Ok(())
}
