use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use postersync_core::{MediaKind, TmdbId};

const EXIT_CODES_HELP: &str = "Exit codes:
  0  everything synced
  1  fatal error (configuration or authentication)
  2  one or more targets ended in an error state";

#[derive(Debug, Parser)]
#[command(
    name = "postersync",
    version,
    about = "Sync Mediux artwork sets to Plex and Jellyfin libraries",
    after_help = EXIT_CODES_HELP
)]
pub(crate) struct Cli {
    /// Suppress progress output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Also write log output to this file, with colors stripped
    #[arg(long, global = true, value_name = "PATH")]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Sweep every configured server and fill in missing artwork
    Sync(SyncArgs),

    /// Apply one Mediux set by URL or id, bypassing the usual policy
    Set(SetArgs),

    /// Inspect one library item and its artwork state
    Media(MediaArgs),

    /// Inspect the settings file
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Debug, Args)]
pub(crate) struct SyncArgs {
    /// Leave show libraries alone
    #[arg(long)]
    pub skip_shows: bool,

    /// Leave movie libraries alone
    #[arg(long)]
    pub skip_movies: bool,

    /// Leave collections alone
    #[arg(long)]
    pub skip_collections: bool,
}

#[derive(Debug, Args)]
pub(crate) struct SetArgs {
    /// Set id or a https://mediux.pro/sets/<id> URL
    pub set: String,
}

#[derive(Debug, Args)]
pub(crate) struct MediaArgs {
    /// TMDB id of the item
    pub tmdb_id: TmdbId,

    /// Kind of item to look for
    #[arg(long, default_value = "show")]
    pub kind: MediaKind,
}

#[derive(Debug, Subcommand)]
pub(crate) enum SettingsAction {
    /// Print the settings file contents
    View,
    /// Print the settings file location
    Locate,
}
