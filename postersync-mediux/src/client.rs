//! Rate-limited HTTP client for the Mediux GraphQL API.

use std::sync::Arc;
use std::time::Duration;

use postersync_core::{CandidateSet, ServiceError, SetSource, TmdbId};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::query;
use crate::schemas::{
    CollectionSetByIdData, CollectionSetsData, GraphqlResponse, MovieSetByIdData, MovieSetsData,
    ShowSetByIdData, ShowSetsData,
};

/// Mediux allows 60 calls per minute; one second between requests keeps
/// us under it.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(1000);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A movie with a reliably non-empty set listing, used to validate the
/// token.
const VALIDATION_TMDB_ID: TmdbId = TmdbId(324857);

pub struct MediuxClient {
    client: reqwest::Client,
    base_url: String,
    /// Timestamp of the last request, shared across clones of the
    /// inner client.
    last_request: Arc<Mutex<Instant>>,
}

impl MediuxClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self, ServiceError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|err| ServiceError::api(format!("invalid token: {err}")))?;
        headers.insert(AUTHORIZATION, auth);

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

    /// Wait until at least `MIN_REQUEST_INTERVAL` has passed since the
    /// previous request. Holding the lock across the sleep serializes
    /// concurrent callers.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < MIN_REQUEST_INTERVAL {
            tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
        }
        *last = Instant::now();
    }

    async fn graphql<T: DeserializeOwned>(&self, query: String) -> Result<T, ServiceError> {
        self.throttle().await;
        log::trace!("POST {}/graphql", self.base_url);

        let response = self
            .client
            .post(format!("{}/graphql", self.base_url))
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ServiceError::auth(format!("{status} from Mediux")));
        }
        if !status.is_success() {
            return Err(ServiceError::api(format!("{status} from Mediux")));
        }

        let envelope: GraphqlResponse<T> = response.json().await.map_err(map_reqwest)?;
        if !envelope.errors.is_empty() {
            let messages: Vec<String> =
                envelope.errors.into_iter().map(|e| e.message).collect();
            return Err(ServiceError::api(messages.join("; ")));
        }
        envelope
            .data
            .ok_or_else(|| ServiceError::api("response carried no data"))
    }

    pub async fn get_show_set(&self, set_id: u64) -> Result<Option<CandidateSet>, ServiceError> {
        let data: ShowSetByIdData = self.graphql(query::show_set_by_id(set_id)).await?;
        Ok(data.show_sets_by_id.map(|s| s.into_candidate()))
    }

    pub async fn get_movie_set(&self, set_id: u64) -> Result<Option<CandidateSet>, ServiceError> {
        let data: MovieSetByIdData = self.graphql(query::movie_set_by_id(set_id)).await?;
        Ok(data.movie_sets_by_id.map(|s| s.into_candidate()))
    }

    pub async fn get_collection_set(
        &self,
        set_id: u64,
    ) -> Result<Option<CandidateSet>, ServiceError> {
        let data: CollectionSetByIdData =
            self.graphql(query::collection_set_by_id(set_id)).await?;
        Ok(data.collection_sets_by_id.map(|s| s.into_candidate()))
    }
}

impl SetSource for MediuxClient {
    async fn validate(&self) -> Result<(), ServiceError> {
        let sets = self.movie_sets(VALIDATION_TMDB_ID).await?;
        if sets.is_empty() {
            return Err(ServiceError::api("validation query returned no sets"));
        }
        Ok(())
    }

    async fn show_sets(&self, tmdb_id: TmdbId) -> Result<Vec<CandidateSet>, ServiceError> {
        let data: ShowSetsData = self.graphql(query::show_sets(tmdb_id)).await?;
        Ok(data
            .show_sets
            .into_iter()
            .map(|s| s.into_candidate())
            .collect())
    }

    async fn movie_sets(&self, tmdb_id: TmdbId) -> Result<Vec<CandidateSet>, ServiceError> {
        let data: MovieSetsData = self.graphql(query::movie_sets(tmdb_id)).await?;
        Ok(data
            .movie_sets
            .into_iter()
            .map(|s| s.into_candidate())
            .collect())
    }

    async fn collection_sets(&self, tmdb_id: TmdbId) -> Result<Vec<CandidateSet>, ServiceError> {
        let data: CollectionSetsData = self.graphql(query::collection_sets(tmdb_id)).await?;
        Ok(data
            .collection_sets
            .into_iter()
            .map(|s| s.into_candidate())
            .collect())
    }

    /// The URL gives no hint which flavor a set is, so try each by-id
    /// query in turn.
    async fn get_set(&self, set_id: u64) -> Result<CandidateSet, ServiceError> {
        if let Some(set) = self.get_show_set(set_id).await? {
            return Ok(set);
        }
        if let Some(set) = self.get_movie_set(set_id).await? {
            return Ok(set);
        }
        if let Some(set) = self.get_collection_set(set_id).await? {
            return Ok(set);
        }
        Err(ServiceError::not_found(format!("set {set_id}")))
    }

    async fn download_asset(&self, asset_id: &str) -> Result<Vec<u8>, ServiceError> {
        self.throttle().await;
        log::trace!("GET {}/assets/{asset_id}", self.base_url);

        let response = self
            .client
            .get(format!("{}/assets/{asset_id}", self.base_url))
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ServiceError::auth(format!("{status} from Mediux")));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ServiceError::not_found(format!("asset {asset_id}")));
        }
        if !status.is_success() {
            return Err(ServiceError::api(format!("{status} from Mediux")));
        }

        let bytes = response.bytes().await.map_err(map_reqwest)?;
        Ok(bytes.to_vec())
    }
}

pub(crate) fn map_reqwest(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout(err.to_string())
    } else if err.is_decode() {
        ServiceError::api(format!("unable to parse response: {err}"))
    } else {
        ServiceError::network(err.to_string())
    }
}
