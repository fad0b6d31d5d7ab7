//! Shared domain types for postersync.
//!
//! Everything the engine and the client crates agree on lives here: the
//! library item tree, artwork set types, fulfillment tracking, settings,
//! and the two collaborator traits (`MediaServer`, `SetSource`).

pub mod error;
pub mod fulfillment;
pub mod settings;
pub mod sets;
pub mod types;

pub use error::ServiceError;
pub use fulfillment::{FulfillmentState, MissingImage, SlotKey};
pub use settings::{Settings, SettingsError};
pub use sets::{ArtworkEntry, ArtworkScope, CandidateSet};
pub use types::{
    Collection, Episode, ImageKind, ItemImages, Library, LibraryKind, LibraryTarget, MediaKind,
    Movie, Season, Show, TmdbId,
};

/// A media server that holds a library of shows, movies, and collections
/// and accepts artwork uploads.
///
/// Implemented by the Jellyfin and Plex clients; the engine and its tests
/// are generic over this trait.
#[allow(async_fn_in_trait)]
pub trait MediaServer {
    /// Short display name, e.g. "Jellyfin".
    fn name(&self) -> &'static str;

    /// Cheap call that confirms the base URL and token are usable.
    async fn validate(&self) -> Result<(), ServiceError>;

    /// Top-level libraries on the server.
    async fn libraries(&self) -> Result<Vec<Library>, ServiceError>;

    /// Shows in a show library, with seasons and episodes resolved and
    /// entries without a TMDB id dropped.
    async fn shows(&self, library: &Library) -> Result<Vec<Show>, ServiceError>;

    /// Movies in a movie library, entries without a TMDB id dropped.
    async fn movies(&self, library: &Library) -> Result<Vec<Movie>, ServiceError>;

    /// Collections in a movie library. Servers without addressable
    /// collections return an empty list.
    async fn collections(&self, library: &Library) -> Result<Vec<Collection>, ServiceError>;

    /// Upload raw image bytes to the given item.
    async fn upload_image(
        &self,
        item_id: &str,
        kind: ImageKind,
        bytes: &[u8],
    ) -> Result<(), ServiceError>;

    /// Remove a label from an item. Servers without labels return Ok.
    async fn remove_label(&self, item_id: &str, label: &str) -> Result<(), ServiceError>;
}

/// A source of published artwork sets, addressed by TMDB id.
#[allow(async_fn_in_trait)]
pub trait SetSource {
    /// Confirm the token is usable.
    async fn validate(&self) -> Result<(), ServiceError>;

    /// Published sets for a show, in the source's publish order.
    async fn show_sets(&self, tmdb_id: TmdbId) -> Result<Vec<CandidateSet>, ServiceError>;

    /// Published sets for a movie, in the source's publish order.
    async fn movie_sets(&self, tmdb_id: TmdbId) -> Result<Vec<CandidateSet>, ServiceError>;

    /// Published sets for a collection, in the source's publish order.
    async fn collection_sets(&self, tmdb_id: TmdbId) -> Result<Vec<CandidateSet>, ServiceError>;

    /// Fetch one set by its id.
    async fn get_set(&self, set_id: u64) -> Result<CandidateSet, ServiceError>;

    /// Download the raw bytes of one asset.
    async fn download_asset(&self, asset_id: &str) -> Result<Vec<u8>, ServiceError>;
}
