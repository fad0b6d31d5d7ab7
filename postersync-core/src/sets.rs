//! Candidate artwork sets as the engine sees them.
//!
//! The set source resolves its own internal season/episode identifiers
//! into number-addressed scopes before handing a set over, so nothing
//! downstream needs to know about source internals.

use chrono::{DateTime, Utc};

use crate::types::{ImageKind, MediaKind, TmdbId};

/// Which part of a target an artwork entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtworkScope {
    /// The show itself (poster/backdrop).
    Show,
    /// One season, by season number.
    Season { number: u32 },
    /// One episode, by season and episode number.
    Episode { season: u32, episode: u32 },
    /// A movie, standalone or as a collection member.
    Movie { tmdb_id: TmdbId },
    /// The collection itself.
    Collection,
}

/// One downloadable artwork file within a set.
#[derive(Debug, Clone)]
pub struct ArtworkEntry {
    /// Asset id understood by `SetSource::download_asset`.
    pub asset_id: String,
    pub kind: ImageKind,
    pub scope: ArtworkScope,
}

/// A published artwork set, immutable once fetched.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    pub id: u64,
    pub title: String,
    /// Username of the publisher, as reported by the source.
    pub username: String,
    /// Media this set was published for.
    pub media_kind: MediaKind,
    pub tmdb_id: TmdbId,
    pub updated: Option<DateTime<Utc>>,
    /// Entries in the set's own order.
    pub entries: Vec<ArtworkEntry>,
}

impl CandidateSet {
    /// Entries matching the given scope and kind.
    pub fn entries_for(&self, scope: ArtworkScope, kind: ImageKind) -> Vec<&ArtworkEntry> {
        self.entries
            .iter()
            .filter(|e| e.scope == scope && e.kind == kind)
            .collect()
    }
}
