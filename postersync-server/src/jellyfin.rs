//! Jellyfin client. Authenticates with an API key via `X-Emby-Token`
//! and identifies media through the TMDB entry in `ProviderIds`.

use std::collections::HashMap;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use postersync_core::{
    Collection, Episode, ImageKind, ItemImages, Library, LibraryKind, MediaServer, Movie, Season,
    ServiceError, Show, TmdbId,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{check_status, map_reqwest};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
struct ItemsPage {
    #[serde(default)]
    items: Vec<JellyfinItem>,
}

/// The slice of Jellyfin's BaseItemDto we care about. Works for media
/// folders, series, seasons, episodes, and movies alike.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JellyfinItem {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    collection_type: Option<String>,
    #[serde(default)]
    production_year: Option<i32>,
    #[serde(default)]
    index_number: Option<u32>,
    #[serde(default)]
    provider_ids: HashMap<String, String>,
    #[serde(default)]
    image_tags: HashMap<String, String>,
    #[serde(default)]
    backdrop_image_tags: Vec<String>,
}

impl JellyfinItem {
    fn tmdb_id(&self) -> Option<TmdbId> {
        self.provider_ids.get("Tmdb")?.parse().ok()
    }

    /// An episode's "Primary" image is its title card.
    fn images(&self) -> ItemImages {
        let primary = self.image_tags.contains_key("Primary");
        ItemImages {
            poster: primary,
            backdrop: !self.backdrop_image_tags.is_empty(),
            title_card: primary,
        }
    }

    fn library_kind(&self) -> LibraryKind {
        match self.collection_type.as_deref() {
            Some("tvshows") => LibraryKind::Shows,
            Some("movies") => LibraryKind::Movies,
            _ => LibraryKind::Other,
        }
    }
}

pub struct JellyfinServer {
    client: reqwest::Client,
    base_url: String,
}

impl JellyfinServer {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ServiceError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let token = reqwest::header::HeaderValue::from_str(api_key)
            .map_err(|err| ServiceError::api(format!("invalid API key: {err}")))?;
        headers.insert("X-Emby-Token", token);

        let client = reqwest::Client::builder()
            .user_agent(concat!("postersync/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ServiceError::api(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ServiceError> {
        log::trace!("GET {}{endpoint}", self.base_url);
        let response = self
            .client
            .get(format!("{}{endpoint}", self.base_url))
            .query(params)
            .send()
            .await
            .map_err(map_reqwest)?;
        check_status(response.status(), "Jellyfin")?;
        response.json().await.map_err(map_reqwest)
    }

    async fn item_children(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<JellyfinItem>, ServiceError> {
        let page: ItemsPage = self.get(endpoint, params).await?;
        Ok(page.items)
    }

    async fn seasons(&self, show: &JellyfinItem) -> Result<Vec<Season>, ServiceError> {
        let mut seasons = Vec::new();
        for season in self
            .item_children(&format!("/Shows/{}/Seasons", show.id), &[])
            .await?
        {
            let Some(number) = season.index_number else {
                continue;
            };
            let episodes = self
                .item_children(
                    &format!("/Shows/{}/Episodes", show.id),
                    &[("seasonId", season.id.as_str())],
                )
                .await?
                .into_iter()
                .filter_map(|episode| {
                    episode.index_number.map(|n| Episode {
                        item_id: episode.id.clone(),
                        number: n,
                        title: episode.name.clone(),
                        images: episode.images(),
                    })
                })
                .collect();
            seasons.push(Season {
                images: season.images(),
                item_id: season.id,
                number,
                episodes,
            });
        }
        Ok(seasons)
    }
}

impl MediaServer for JellyfinServer {
    fn name(&self) -> &'static str {
        "Jellyfin"
    }

    async fn validate(&self) -> Result<(), ServiceError> {
        let _: ItemsPage = self.get("/Library/MediaFolders", &[]).await?;
        Ok(())
    }

    async fn libraries(&self) -> Result<Vec<Library>, ServiceError> {
        let folders = self.item_children("/Library/MediaFolders", &[]).await?;
        Ok(folders
            .into_iter()
            .map(|folder| Library {
                kind: folder.library_kind(),
                id: folder.id,
                title: folder.name,
            })
            .collect())
    }

    async fn shows(&self, library: &Library) -> Result<Vec<Show>, ServiceError> {
        let items = self
            .item_children(
                "/Items",
                &[
                    ("ParentId", library.id.as_str()),
                    ("Recursive", "true"),
                    ("IncludeItemTypes", "Series"),
                    ("fields", "ProviderIds"),
                    ("hasTmdbId", "true"),
                ],
            )
            .await?;
        let mut shows = Vec::new();
        for item in items {
            let Some(tmdb_id) = item.tmdb_id() else {
                continue;
            };
            let seasons = self.seasons(&item).await?;
            shows.push(Show {
                tmdb_id,
                title: item.name.clone(),
                year: item.production_year,
                images: item.images(),
                item_id: item.id,
                seasons,
            });
        }
        Ok(shows)
    }

    async fn movies(&self, library: &Library) -> Result<Vec<Movie>, ServiceError> {
        let items = self
            .item_children(
                "/Items",
                &[
                    ("ParentId", library.id.as_str()),
                    ("Recursive", "true"),
                    ("IncludeItemTypes", "Movie"),
                    ("fields", "ProviderIds"),
                    ("hasTmdbId", "true"),
                ],
            )
            .await?;
        Ok(items
            .into_iter()
            .filter_map(|item| {
                item.tmdb_id().map(|tmdb_id| Movie {
                    tmdb_id,
                    title: item.name.clone(),
                    year: item.production_year,
                    images: item.images(),
                    item_id: item.id,
                })
            })
            .collect())
    }

    /// Jellyfin box sets are not addressable by TMDB id, so sweeps
    /// over collections only cover Plex.
    async fn collections(&self, _library: &Library) -> Result<Vec<Collection>, ServiceError> {
        Ok(Vec::new())
    }

    async fn upload_image(
        &self,
        item_id: &str,
        kind: ImageKind,
        bytes: &[u8],
    ) -> Result<(), ServiceError> {
        let image_type = match kind {
            ImageKind::Backdrop => "Backdrop",
            ImageKind::Poster | ImageKind::TitleCard => "Primary",
        };
        // Jellyfin expects the image body base64 encoded
        let body = BASE64.encode(bytes);
        let response = self
            .client
            .post(format!(
                "{}/Items/{item_id}/Images/{image_type}",
                self.base_url
            ))
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest)?;
        check_status(response.status(), "Jellyfin")
    }

    /// Jellyfin has no label concept.
    async fn remove_label(&self, _item_id: &str, _label: &str) -> Result<(), ServiceError> {
        Ok(())
    }
}
