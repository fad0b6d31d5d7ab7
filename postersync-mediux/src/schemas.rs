//! Serde models for Mediux GraphQL payloads and their conversion into
//! domain candidate sets.
//!
//! The API is loose about scalar types (ids arrive as strings or
//! numbers, timestamps with or without an offset), so the deserializers
//! here are deliberately lenient.

use chrono::{DateTime, NaiveDateTime, Utc};
use postersync_core::{ArtworkEntry, ArtworkScope, CandidateSet, ImageKind, MediaKind, TmdbId};
use serde::de::{Deserializer, Error as DeError};
use serde::Deserialize;

/// Accept a numeric id serialized as either a number or a string.
fn de_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.parse().map_err(DeError::custom),
    }
}

/// Accept RFC 3339 timestamps with or without an offset; anything else
/// becomes None rather than failing the whole payload.
fn de_datetime<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else { return Ok(None) };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Some(naive.and_utc()));
    }
    Ok(None)
}

/// A nested object carrying only an id.
#[derive(Debug, Clone, Deserialize)]
pub struct IdRef {
    #[serde(deserialize_with = "de_u64")]
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRef {
    pub username: String,
}

/// File kinds Mediux publishes. Only a subset maps onto artwork we
/// manage; the rest are parsed and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Album,
    Backdrop,
    Logo,
    Misc,
    Poster,
    Titlecard,
    #[serde(other)]
    Unknown,
}

impl FileType {
    pub fn image_kind(self) -> Option<ImageKind> {
        match self {
            FileType::Poster => Some(ImageKind::Poster),
            FileType::Backdrop => Some(ImageKind::Backdrop),
            FileType::Titlecard => Some(ImageKind::TitleCard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetFile {
    pub id: String,
    pub file_type: FileType,
    #[serde(default)]
    pub show: Option<IdRef>,
    #[serde(default)]
    pub season: Option<IdRef>,
    #[serde(default)]
    pub episode: Option<IdRef>,
    #[serde(default)]
    pub movie: Option<IdRef>,
    #[serde(default)]
    pub collection: Option<IdRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpisodeRef {
    #[serde(deserialize_with = "de_u64")]
    pub id: u64,
    pub episode_number: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonRef {
    #[serde(deserialize_with = "de_u64")]
    pub id: u64,
    pub season_number: u32,
    #[serde(default)]
    pub episodes: Vec<EpisodeRef>,
}

/// The show a set belongs to. `id` is the TMDB id; season and episode
/// ids are Mediux-internal and only used to resolve file scopes.
#[derive(Debug, Clone, Deserialize)]
pub struct ShowRef {
    #[serde(deserialize_with = "de_u64")]
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub seasons: Vec<SeasonRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieRef {
    #[serde(deserialize_with = "de_u64")]
    pub id: u64,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionRef {
    #[serde(deserialize_with = "de_u64")]
    pub id: u64,
    pub collection_name: String,
    #[serde(default)]
    pub movies: Vec<MovieRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShowSet {
    #[serde(deserialize_with = "de_u64")]
    pub id: u64,
    pub set_title: String,
    #[serde(default, deserialize_with = "de_datetime")]
    pub date_updated: Option<DateTime<Utc>>,
    pub user_created: UserRef,
    #[serde(default)]
    pub files: Vec<SetFile>,
    #[serde(rename = "show_id")]
    pub show: ShowRef,
}

impl ShowSet {
    /// Resolve internal season/episode ids through the embedded show
    /// tree; files that point at nothing we can address are dropped.
    pub fn into_candidate(self) -> CandidateSet {
        let entries = self
            .files
            .iter()
            .filter_map(|file| {
                let kind = file.file_type.image_kind()?;
                let scope = if let Some(episode) = &file.episode {
                    let (season, ep) = self.find_episode(episode.id)?;
                    ArtworkScope::Episode {
                        season,
                        episode: ep,
                    }
                } else if let Some(season) = &file.season {
                    ArtworkScope::Season {
                        number: self.find_season(season.id)?,
                    }
                } else if file.show.is_some() {
                    ArtworkScope::Show
                } else {
                    return None;
                };
                Some(ArtworkEntry {
                    asset_id: file.id.clone(),
                    kind,
                    scope,
                })
            })
            .collect();
        CandidateSet {
            id: self.id,
            title: self.set_title,
            username: self.user_created.username,
            media_kind: MediaKind::Show,
            tmdb_id: TmdbId(self.show.id),
            updated: self.date_updated,
            entries,
        }
    }

    fn find_season(&self, season_id: u64) -> Option<u32> {
        self.show
            .seasons
            .iter()
            .find(|s| s.id == season_id)
            .map(|s| s.season_number)
    }

    fn find_episode(&self, episode_id: u64) -> Option<(u32, u32)> {
        for season in &self.show.seasons {
            if let Some(episode) = season.episodes.iter().find(|e| e.id == episode_id) {
                return Some((season.season_number, episode.episode_number));
            }
        }
        None
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieSet {
    #[serde(deserialize_with = "de_u64")]
    pub id: u64,
    pub set_title: String,
    #[serde(default, deserialize_with = "de_datetime")]
    pub date_updated: Option<DateTime<Utc>>,
    pub user_created: UserRef,
    #[serde(default)]
    pub files: Vec<SetFile>,
    #[serde(rename = "movie_id")]
    pub movie: MovieRef,
}

impl MovieSet {
    pub fn into_candidate(self) -> CandidateSet {
        let entries = self
            .files
            .iter()
            .filter_map(|file| {
                let kind = file.file_type.image_kind()?;
                let movie = file.movie.as_ref()?;
                Some(ArtworkEntry {
                    asset_id: file.id.clone(),
                    kind,
                    scope: ArtworkScope::Movie {
                        tmdb_id: TmdbId(movie.id),
                    },
                })
            })
            .collect();
        CandidateSet {
            id: self.id,
            title: self.set_title,
            username: self.user_created.username,
            media_kind: MediaKind::Movie,
            tmdb_id: TmdbId(self.movie.id),
            updated: self.date_updated,
            entries,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSet {
    #[serde(deserialize_with = "de_u64")]
    pub id: u64,
    pub set_title: String,
    #[serde(default, deserialize_with = "de_datetime")]
    pub date_updated: Option<DateTime<Utc>>,
    pub user_created: UserRef,
    #[serde(default)]
    pub files: Vec<SetFile>,
    #[serde(rename = "collection_id")]
    pub collection: CollectionRef,
}

impl CollectionSet {
    pub fn into_candidate(self) -> CandidateSet {
        let entries = self
            .files
            .iter()
            .filter_map(|file| {
                let kind = file.file_type.image_kind()?;
                let scope = if let Some(movie) = &file.movie {
                    ArtworkScope::Movie {
                        tmdb_id: TmdbId(movie.id),
                    }
                } else if file.collection.is_some() {
                    ArtworkScope::Collection
                } else {
                    return None;
                };
                Some(ArtworkEntry {
                    asset_id: file.id.clone(),
                    kind,
                    scope,
                })
            })
            .collect();
        CandidateSet {
            id: self.id,
            title: self.set_title,
            username: self.user_created.username,
            media_kind: MediaKind::Collection,
            tmdb_id: TmdbId(self.collection.id),
            updated: self.date_updated,
            entries,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct GraphqlResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ShowSetsData {
    #[serde(default)]
    pub show_sets: Vec<ShowSet>,
}

#[derive(Debug, Deserialize)]
pub struct ShowSetByIdData {
    pub show_sets_by_id: Option<ShowSet>,
}

#[derive(Debug, Deserialize)]
pub struct MovieSetsData {
    #[serde(default)]
    pub movie_sets: Vec<MovieSet>,
}

#[derive(Debug, Deserialize)]
pub struct MovieSetByIdData {
    pub movie_sets_by_id: Option<MovieSet>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionSetsData {
    #[serde(default)]
    pub collection_sets: Vec<CollectionSet>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionSetByIdData {
    pub collection_sets_by_id: Option<CollectionSet>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_SET_JSON: &str = r#"{
        "id": "5150",
        "set_title": "Example Minimal",
        "date_updated": "2024-03-01T10:00:00.000Z",
        "user_created": { "username": "alice" },
        "files": [
            { "id": "file-show-poster", "file_type": "poster", "show": { "id": 100 } },
            { "id": "file-show-backdrop", "file_type": "backdrop", "show": { "id": 100 } },
            { "id": "file-season-poster", "file_type": "poster", "season": { "id": 7001 } },
            { "id": "file-episode-card", "file_type": "titlecard", "episode": { "id": 8001 } },
            { "id": "file-logo", "file_type": "logo", "show": { "id": 100 } },
            { "id": "file-orphan", "file_type": "poster" }
        ],
        "show_id": {
            "id": "100",
            "title": "Example",
            "seasons": [
                {
                    "id": 7001,
                    "season_number": 1,
                    "episodes": [
                        { "id": 8001, "episode_number": 3, "episode_title": "Third" }
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn show_set_resolves_scopes_through_the_show_tree() {
        let set: ShowSet = serde_json::from_str(SHOW_SET_JSON).unwrap();
        let candidate = set.into_candidate();

        assert_eq!(candidate.id, 5150);
        assert_eq!(candidate.username, "alice");
        assert_eq!(candidate.tmdb_id, TmdbId(100));
        assert_eq!(candidate.media_kind, MediaKind::Show);
        // logo and the file with no parent reference are dropped
        assert_eq!(candidate.entries.len(), 4);
        assert_eq!(candidate.entries[0].scope, ArtworkScope::Show);
        assert_eq!(
            candidate.entries[2].scope,
            ArtworkScope::Season { number: 1 }
        );
        assert_eq!(
            candidate.entries[3].scope,
            ArtworkScope::Episode {
                season: 1,
                episode: 3
            }
        );
        assert_eq!(candidate.entries[3].kind, ImageKind::TitleCard);
    }

    #[test]
    fn unknown_file_types_do_not_fail_parsing() {
        let json = r#"{ "id": "x", "file_type": "something_new" }"#;
        let file: SetFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.file_type, FileType::Unknown);
        assert!(file.file_type.image_kind().is_none());
    }

    #[test]
    fn collection_set_maps_members_and_the_collection_itself() {
        let json = r#"{
            "id": 77,
            "set_title": "Trilogy",
            "date_updated": null,
            "user_created": { "username": "bob" },
            "files": [
                { "id": "col-poster", "file_type": "poster", "collection": { "id": 10 } },
                { "id": "movie-poster", "file_type": "poster", "movie": { "id": "11" } }
            ],
            "collection_id": {
                "id": 10,
                "collection_name": "Trilogy",
                "movies": [ { "id": 11, "title": "Part One" } ]
            }
        }"#;
        let set: CollectionSet = serde_json::from_str(json).unwrap();
        let candidate = set.into_candidate();
        assert_eq!(candidate.tmdb_id, TmdbId(10));
        assert_eq!(candidate.entries[0].scope, ArtworkScope::Collection);
        assert_eq!(
            candidate.entries[1].scope,
            ArtworkScope::Movie {
                tmdb_id: TmdbId(11)
            }
        );
    }

    #[test]
    fn timestamps_without_an_offset_still_parse() {
        let json = r#"{
            "id": 1,
            "set_title": "S",
            "date_updated": "2024-03-01T10:00:00",
            "user_created": { "username": "alice" },
            "files": [],
            "movie_id": { "id": 5, "title": "M" }
        }"#;
        let set: MovieSet = serde_json::from_str(json).unwrap();
        assert!(set.date_updated.is_some());
    }

    #[test]
    fn graphql_errors_deserialize_alongside_missing_data() {
        let json = r#"{ "errors": [ { "message": "denied" } ] }"#;
        let response: GraphqlResponse<ShowSetsData> = serde_json::from_str(json).unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.errors[0].message, "denied");
    }
}
