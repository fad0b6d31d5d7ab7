//! Subcommand implementations and the helpers they share.

pub(crate) mod media;
pub(crate) mod set;
pub(crate) mod settings;
pub(crate) mod sync;

use owo_colors::{OwoColorize, Stream};
use postersync_core::Settings;
use postersync_engine::{SyncEvent, SyncOutcome, SyncReport};
use postersync_mediux::MediuxClient;
use tokio::runtime::Runtime;

use crate::error::CliError;
use crate::spinner::SpinnerPool;

pub(crate) fn load_settings() -> Result<Settings, CliError> {
    Settings::load().map_err(|err| CliError::config(err.to_string()))
}

pub(crate) fn build_runtime() -> Result<Runtime, CliError> {
    Runtime::new().map_err(|err| CliError::runtime(format!("failed to create async runtime: {err}")))
}

pub(crate) fn mediux_client(settings: &Settings) -> Result<MediuxClient, CliError> {
    if settings.mediux.token.is_empty() {
        return Err(CliError::config(format!(
            "Mediux token is not set; edit {}",
            Settings::path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "the settings file".to_owned())
        )));
    }
    MediuxClient::new(&settings.mediux.base_url, &settings.mediux.token)
        .map_err(|err| CliError::service(err.to_string()))
}

/// Feed engine events into the spinner pool. Failures are already
/// logged by the engine itself.
pub(crate) fn handle_event(pool: &mut SpinnerPool, event: SyncEvent) {
    match event {
        SyncEvent::TargetStarted { title } => {
            let msg = format!("{title}: inspecting");
            pool.claim(&title, msg);
        }
        SyncEvent::FetchingSets { title } => {
            let msg = format!("{title}: fetching candidate sets");
            pool.update(&title, msg);
        }
        SyncEvent::UsingSet {
            title,
            set_title,
            username,
        } => {
            let msg = format!("{title}: using '{set_title}' by {username}");
            pool.update(&title, msg);
        }
        SyncEvent::Uploading { title, label, kind } => {
            let msg = format!("{title}: uploading {kind} for {label}");
            pool.update(&title, msg);
        }
        SyncEvent::ImageFailed { .. } => {}
        SyncEvent::TargetFinished { title, .. } => pool.release(&title),
    }
}

pub(crate) fn print_report(report: &SyncReport) {
    match &report.outcome {
        SyncOutcome::Complete => println!(
            "{} {} ({} uploaded)",
            "✔".if_supports_color(Stream::Stdout, |t| t.green()),
            report.title,
            report.uploaded
        ),
        SyncOutcome::AlreadyComplete => println!(
            "{} {} (already complete)",
            "✔".if_supports_color(Stream::Stdout, |t| t.green()),
            report.title
        ),
        SyncOutcome::Partial { missing } => println!(
            "{} {} ({} uploaded, {} still missing)",
            "?".if_supports_color(Stream::Stdout, |t| t.yellow()),
            report.title,
            report.uploaded,
            missing.len()
        ),
        SyncOutcome::NoCandidates => println!(
            "{} {} (no candidate sets)",
            "?".if_supports_color(Stream::Stdout, |t| t.yellow()),
            report.title
        ),
    }
}

pub(crate) fn print_target_error(title: &str, err: &impl std::fmt::Display) {
    println!(
        "{} {}: {err}",
        "✘".if_supports_color(Stream::Stdout, |t| t.red()),
        title
    );
}
