//! Plex client. Shows and movies are matched through `tmdb://` entries
//! in their Guid list; collections through a `tmdb-<id>` label, which is
//! how Kometa tags them.

use std::sync::Arc;
use std::time::Duration;

use postersync_core::{
    Collection, Episode, ImageKind, ItemImages, Library, LibraryKind, MediaServer, Movie, Season,
    ServiceError, Show, TmdbId,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::{check_status, map_reqwest};

/// Plex handles 30 calls per minute comfortably; stay at one per two
/// seconds.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(2000);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const GUID_PREFIX: &str = "tmdb://";
const LABEL_PREFIX: &str = "tmdb-";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    container: T,
}

#[derive(Debug, Deserialize, Default)]
struct SectionsContainer {
    #[serde(rename = "Directory", default)]
    directory: Vec<SectionEntry>,
}

#[derive(Debug, Deserialize)]
struct SectionEntry {
    key: String,
    title: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize, Default)]
struct MetadataContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<MetadataEntry>,
}

/// One Plex metadata record; serves sections' items, seasons, episodes,
/// and collections alike.
#[derive(Debug, Deserialize)]
struct MetadataEntry {
    #[serde(rename = "ratingKey")]
    rating_key: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    index: Option<u32>,
    #[serde(default)]
    thumb: Option<String>,
    #[serde(default)]
    art: Option<String>,
    #[serde(rename = "Guid", default)]
    guids: Vec<GuidEntry>,
    #[serde(rename = "Label", default)]
    labels: Vec<LabelEntry>,
}

#[derive(Debug, Deserialize)]
struct GuidEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
struct LabelEntry {
    tag: String,
}

impl MetadataEntry {
    fn tmdb_from_guids(&self) -> Option<TmdbId> {
        self.guids
            .iter()
            .find_map(|g| g.id.strip_prefix(GUID_PREFIX))
            .and_then(|id| id.parse().ok())
    }

    fn tmdb_from_labels(&self) -> Option<TmdbId> {
        self.labels.iter().find_map(|l| {
            let tag = l.tag.to_lowercase();
            tag.strip_prefix(LABEL_PREFIX)
                .and_then(|id| id.parse().ok())
        })
    }

    /// For an episode the thumb is its title card.
    fn images(&self) -> ItemImages {
        ItemImages {
            poster: self.thumb.is_some(),
            backdrop: self.art.is_some(),
            title_card: self.thumb.is_some(),
        }
    }
}

pub struct PlexServer {
    client: reqwest::Client,
    base_url: String,
    last_request: Arc<Mutex<Instant>>,
}

impl PlexServer {
    pub fn new(base_url: &str, token: &str) -> Result<Self, ServiceError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let token = reqwest::header::HeaderValue::from_str(token)
            .map_err(|err| ServiceError::api(format!("invalid token: {err}")))?;
        headers.insert("X-Plex-Token", token);

        let client = reqwest::Client::builder()
            .user_agent(concat!("postersync/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ServiceError::api(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            last_request: Arc::new(Mutex::new(
                Instant::now()
                    .checked_sub(MIN_REQUEST_INTERVAL)
                    .unwrap_or_else(Instant::now),
            )),
        })
    }

    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < MIN_REQUEST_INTERVAL {
            tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
        }
        *last = Instant::now();
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ServiceError> {
        self.throttle().await;
        log::trace!("GET {}{endpoint}", self.base_url);
        let response = self
            .client
            .get(format!("{}{endpoint}", self.base_url))
            .query(params)
            .send()
            .await
            .map_err(map_reqwest)?;
        check_status(response.status(), "Plex")?;
        let envelope: Envelope<T> = response.json().await.map_err(map_reqwest)?;
        Ok(envelope.container)
    }

    async fn children(&self, rating_key: &str) -> Result<Vec<MetadataEntry>, ServiceError> {
        let container: MetadataContainer = self
            .get(
                &format!("/library/metadata/{rating_key}/children"),
                &[("includeGuids", "1")],
            )
            .await?;
        Ok(container.metadata)
    }

    async fn section_items(
        &self,
        section_key: &str,
        path: &str,
    ) -> Result<Vec<MetadataEntry>, ServiceError> {
        let container: MetadataContainer = self
            .get(
                &format!("/library/sections/{section_key}/{path}"),
                &[("includeGuids", "1")],
            )
            .await?;
        Ok(container.metadata)
    }

    fn movie_from(entry: MetadataEntry, tmdb_id: TmdbId) -> Movie {
        Movie {
            tmdb_id,
            title: entry.title.clone(),
            year: entry.year,
            images: entry.images(),
            item_id: entry.rating_key,
        }
    }
}

impl MediaServer for PlexServer {
    fn name(&self) -> &'static str {
        "Plex"
    }

    async fn validate(&self) -> Result<(), ServiceError> {
        let _: SectionsContainer = self.get("/library/sections", &[]).await?;
        Ok(())
    }

    async fn libraries(&self) -> Result<Vec<Library>, ServiceError> {
        let container: SectionsContainer = self.get("/library/sections", &[]).await?;
        Ok(container
            .directory
            .into_iter()
            .map(|section| Library {
                kind: match section.kind.as_str() {
                    "show" => LibraryKind::Shows,
                    "movie" => LibraryKind::Movies,
                    _ => LibraryKind::Other,
                },
                id: section.key,
                title: section.title,
            })
            .collect())
    }

    async fn shows(&self, library: &Library) -> Result<Vec<Show>, ServiceError> {
        let mut shows = Vec::new();
        for entry in self.section_items(&library.id, "all").await? {
            let Some(tmdb_id) = entry.tmdb_from_guids() else {
                continue;
            };
            let mut seasons = Vec::new();
            for season in self.children(&entry.rating_key).await? {
                let Some(number) = season.index else {
                    continue;
                };
                let episodes = self
                    .children(&season.rating_key)
                    .await?
                    .into_iter()
                    .filter_map(|episode| {
                        episode.index.map(|n| Episode {
                            item_id: episode.rating_key.clone(),
                            number: n,
                            title: episode.title.clone(),
                            images: episode.images(),
                        })
                    })
                    .collect();
                seasons.push(Season {
                    images: season.images(),
                    item_id: season.rating_key,
                    number,
                    episodes,
                });
            }
            shows.push(Show {
                tmdb_id,
                title: entry.title.clone(),
                year: entry.year,
                images: entry.images(),
                item_id: entry.rating_key,
                seasons,
            });
        }
        Ok(shows)
    }

    async fn movies(&self, library: &Library) -> Result<Vec<Movie>, ServiceError> {
        Ok(self
            .section_items(&library.id, "all")
            .await?
            .into_iter()
            .filter_map(|entry| {
                entry
                    .tmdb_from_guids()
                    .map(|tmdb_id| Self::movie_from(entry, tmdb_id))
            })
            .collect())
    }

    async fn collections(&self, library: &Library) -> Result<Vec<Collection>, ServiceError> {
        let mut collections = Vec::new();
        for entry in self.section_items(&library.id, "collections").await? {
            // collections without a tmdb-<id> label cannot be matched
            let Some(tmdb_id) = entry.tmdb_from_labels() else {
                continue;
            };
            let movies = self
                .children(&entry.rating_key)
                .await?
                .into_iter()
                .filter_map(|movie| {
                    movie
                        .tmdb_from_guids()
                        .map(|movie_tmdb| Self::movie_from(movie, movie_tmdb))
                })
                .collect();
            collections.push(Collection {
                tmdb_id,
                title: entry.title.clone(),
                images: entry.images(),
                item_id: entry.rating_key,
                movies,
            });
        }
        Ok(collections)
    }

    async fn upload_image(
        &self,
        item_id: &str,
        kind: ImageKind,
        bytes: &[u8],
    ) -> Result<(), ServiceError> {
        // episode title cards go through the poster endpoint too
        let path = match kind {
            ImageKind::Backdrop => "arts",
            ImageKind::Poster | ImageKind::TitleCard => "posters",
        };
        self.throttle().await;
        let response = self
            .client
            .post(format!("{}/library/metadata/{item_id}/{path}", self.base_url))
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(map_reqwest)?;
        check_status(response.status(), "Plex")
    }

    async fn remove_label(&self, item_id: &str, label: &str) -> Result<(), ServiceError> {
        self.throttle().await;
        let response = self
            .client
            .put(format!("{}/library/metadata/{item_id}", self.base_url))
            .query(&[("label[].tag.tag-", label)])
            .send()
            .await
            .map_err(map_reqwest)?;
        check_status(response.status(), "Plex")
    }
}
