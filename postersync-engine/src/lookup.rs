//! Turning a server's libraries into sync targets.

use postersync_core::{Library, LibraryKind, LibraryTarget, MediaKind, MediaServer, ServiceError, TmdbId};

/// What a sweep should cover.
#[derive(Debug, Clone, Default)]
pub struct SweepOptions {
    pub skip_shows: bool,
    pub skip_movies: bool,
    pub skip_collections: bool,
    /// Library names (case-insensitive) to leave alone.
    pub skip_libraries: Vec<String>,
}

impl SweepOptions {
    fn skips_library(&self, library: &Library) -> bool {
        self.skip_libraries
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&library.title))
    }
}

/// Every target on the server, in library order: shows, then movies,
/// then collections per movie library.
pub async fn gather_targets<S: MediaServer>(
    server: &S,
    options: &SweepOptions,
) -> Result<Vec<LibraryTarget>, ServiceError> {
    let mut targets = Vec::new();
    for library in server.libraries().await? {
        if options.skips_library(&library) {
            log::debug!("Skipping library '{}'", library.title);
            continue;
        }
        match library.kind {
            LibraryKind::Shows if !options.skip_shows => {
                targets.extend(
                    server
                        .shows(&library)
                        .await?
                        .into_iter()
                        .map(LibraryTarget::Show),
                );
            }
            LibraryKind::Movies => {
                if !options.skip_movies {
                    targets.extend(
                        server
                            .movies(&library)
                            .await?
                            .into_iter()
                            .map(LibraryTarget::Movie),
                    );
                }
                if !options.skip_collections {
                    targets.extend(
                        server
                            .collections(&library)
                            .await?
                            .into_iter()
                            .map(LibraryTarget::Collection),
                    );
                }
            }
            _ => {}
        }
    }
    Ok(targets)
}

/// Find one target by TMDB id and kind, or None if the server does not
/// have it.
pub async fn find_target<S: MediaServer>(
    server: &S,
    tmdb_id: TmdbId,
    kind: MediaKind,
    skip_libraries: &[String],
) -> Result<Option<LibraryTarget>, ServiceError> {
    let options = SweepOptions {
        skip_libraries: skip_libraries.to_vec(),
        ..SweepOptions::default()
    };
    for library in server.libraries().await? {
        if options.skips_library(&library) {
            continue;
        }
        match (kind, library.kind) {
            (MediaKind::Show, LibraryKind::Shows) => {
                if let Some(show) = server
                    .shows(&library)
                    .await?
                    .into_iter()
                    .find(|s| s.tmdb_id == tmdb_id)
                {
                    return Ok(Some(LibraryTarget::Show(show)));
                }
            }
            (MediaKind::Movie, LibraryKind::Movies) => {
                if let Some(movie) = server
                    .movies(&library)
                    .await?
                    .into_iter()
                    .find(|m| m.tmdb_id == tmdb_id)
                {
                    return Ok(Some(LibraryTarget::Movie(movie)));
                }
            }
            (MediaKind::Collection, LibraryKind::Movies) => {
                if let Some(collection) = server
                    .collections(&library)
                    .await?
                    .into_iter()
                    .find(|c| c.tmdb_id == tmdb_id)
                {
                    return Ok(Some(LibraryTarget::Collection(collection)));
                }
            }
            _ => {}
        }
    }
    Ok(None)
}
