//! Fulfillment tracking for a sync target.
//!
//! A target expands into slots (the item itself, each season, each
//! episode, each collection member), and each slot tracks which required
//! image kinds are satisfied. State is rebuilt from live server inventory
//! on every run, so a re-run over a complete target does no work.

use std::collections::BTreeMap;

use crate::sets::ArtworkScope;
use crate::types::{ImageKind, ItemImages, LibraryTarget, MediaKind, TmdbId};

/// Addresses one slot within a target's fulfillment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SlotKey {
    /// The show, movie, or collection itself.
    Target,
    Season { number: u32 },
    Episode { season: u32, episode: u32 },
    /// A member movie of a collection target.
    Member { tmdb_id: TmdbId },
}

/// One slot: a server item and the image kinds it still needs.
#[derive(Debug, Clone)]
pub struct Slot {
    item_id: String,
    label: String,
    kinds: BTreeMap<ImageKind, bool>,
}

impl Slot {
    fn new(item_id: &str, label: String, required: &[ImageKind], images: &ItemImages) -> Self {
        let kinds = required.iter().map(|&k| (k, images.has(k))).collect();
        Self {
            item_id: item_id.to_owned(),
            label,
            kinds,
        }
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_complete(&self) -> bool {
        self.kinds.values().all(|&done| done)
    }

    /// True when `kind` is required here and not yet fulfilled.
    pub fn needs(&self, kind: ImageKind) -> bool {
        self.kinds.get(&kind).is_some_and(|&done| !done)
    }

    /// Required kinds with their fulfilled flag, in a stable order.
    pub fn kinds(&self) -> impl Iterator<Item = (ImageKind, bool)> + '_ {
        self.kinds.iter().map(|(&k, &done)| (k, done))
    }
}

/// A still-missing image, for reports and summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingImage {
    pub label: String,
    pub kind: ImageKind,
}

impl std::fmt::Display for MissingImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.label, self.kind)
    }
}

const TARGET_KINDS: &[ImageKind] = &[ImageKind::Poster, ImageKind::Backdrop];
const SEASON_KINDS: &[ImageKind] = &[ImageKind::Poster];
const EPISODE_KINDS: &[ImageKind] = &[ImageKind::TitleCard];

/// Per-target fulfillment state. Monotonic: kinds only move from missing
/// to fulfilled.
#[derive(Debug, Clone)]
pub struct FulfillmentState {
    media_kind: MediaKind,
    target_tmdb: TmdbId,
    slots: BTreeMap<SlotKey, Slot>,
}

impl FulfillmentState {
    /// Derive the state from a target's current server inventory.
    pub fn for_target(target: &LibraryTarget) -> Self {
        let mut slots = BTreeMap::new();
        match target {
            LibraryTarget::Show(show) => {
                slots.insert(
                    SlotKey::Target,
                    Slot::new(&show.item_id, show.title.clone(), TARGET_KINDS, &show.images),
                );
                for season in &show.seasons {
                    slots.insert(
                        SlotKey::Season {
                            number: season.number,
                        },
                        Slot::new(
                            &season.item_id,
                            format!("{} Season {}", show.title, season.number),
                            SEASON_KINDS,
                            &season.images,
                        ),
                    );
                    for episode in &season.episodes {
                        slots.insert(
                            SlotKey::Episode {
                                season: season.number,
                                episode: episode.number,
                            },
                            Slot::new(
                                &episode.item_id,
                                format!("{} S{:02}E{:02}", show.title, season.number, episode.number),
                                EPISODE_KINDS,
                                &episode.images,
                            ),
                        );
                    }
                }
            }
            LibraryTarget::Movie(movie) => {
                slots.insert(
                    SlotKey::Target,
                    Slot::new(
                        &movie.item_id,
                        movie.title.clone(),
                        TARGET_KINDS,
                        &movie.images,
                    ),
                );
            }
            LibraryTarget::Collection(collection) => {
                slots.insert(
                    SlotKey::Target,
                    Slot::new(
                        &collection.item_id,
                        collection.title.clone(),
                        TARGET_KINDS,
                        &collection.images,
                    ),
                );
                for movie in &collection.movies {
                    slots.insert(
                        SlotKey::Member {
                            tmdb_id: movie.tmdb_id,
                        },
                        Slot::new(&movie.item_id, movie.title.clone(), TARGET_KINDS, &movie.images),
                    );
                }
            }
        }
        Self {
            media_kind: target.kind(),
            target_tmdb: target.tmdb_id(),
            slots,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.slots.values().all(Slot::is_complete)
    }

    /// Map an artwork scope onto a slot of this target, if it addresses one.
    pub fn resolve(&self, scope: ArtworkScope) -> Option<SlotKey> {
        let key = match (self.media_kind, scope) {
            (MediaKind::Show, ArtworkScope::Show) => SlotKey::Target,
            (MediaKind::Show, ArtworkScope::Season { number }) => SlotKey::Season { number },
            (MediaKind::Show, ArtworkScope::Episode { season, episode }) => {
                SlotKey::Episode { season, episode }
            }
            (MediaKind::Movie, ArtworkScope::Movie { tmdb_id }) if tmdb_id == self.target_tmdb => {
                SlotKey::Target
            }
            (MediaKind::Collection, ArtworkScope::Collection) => SlotKey::Target,
            (MediaKind::Collection, ArtworkScope::Movie { tmdb_id }) => SlotKey::Member { tmdb_id },
            _ => return None,
        };
        self.slots.contains_key(&key).then_some(key)
    }

    pub fn slot(&self, key: SlotKey) -> Option<&Slot> {
        self.slots.get(&key)
    }

    pub fn needs(&self, key: SlotKey, kind: ImageKind) -> bool {
        self.slots.get(&key).is_some_and(|s| s.needs(kind))
    }

    /// Mark a kind fulfilled. Never un-fulfills.
    pub fn fulfill(&mut self, key: SlotKey, kind: ImageKind) {
        if let Some(slot) = self.slots.get_mut(&key)
            && let Some(done) = slot.kinds.get_mut(&kind)
        {
            *done = true;
        }
    }

    /// Everything still missing, in slot order.
    pub fn missing(&self) -> Vec<MissingImage> {
        self.slots
            .values()
            .flat_map(|slot| {
                slot.kinds().filter_map(|(kind, done)| {
                    (!done).then(|| MissingImage {
                        label: slot.label().to_owned(),
                        kind,
                    })
                })
            })
            .collect()
    }

    /// Slots in key order, for inspection output.
    pub fn slots(&self) -> impl Iterator<Item = (SlotKey, &Slot)> {
        self.slots.iter().map(|(&k, s)| (k, s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Collection, Episode, Movie, Season, Show};

    fn show_with_one_episode(images: ItemImages) -> LibraryTarget {
        LibraryTarget::Show(Show {
            item_id: "show-1".into(),
            tmdb_id: TmdbId(100),
            title: "Example".into(),
            year: Some(2020),
            images,
            seasons: vec![Season {
                item_id: "season-1".into(),
                number: 1,
                images,
                episodes: vec![Episode {
                    item_id: "ep-1".into(),
                    number: 1,
                    title: "Pilot".into(),
                    images,
                }],
            }],
        })
    }

    fn all_present() -> ItemImages {
        ItemImages {
            poster: true,
            backdrop: true,
            title_card: true,
        }
    }

    #[test]
    fn fully_stocked_show_is_complete() {
        let state = FulfillmentState::for_target(&show_with_one_episode(all_present()));
        assert!(state.is_complete());
        assert!(state.missing().is_empty());
    }

    #[test]
    fn empty_show_reports_all_missing() {
        let state = FulfillmentState::for_target(&show_with_one_episode(ItemImages::default()));
        assert!(!state.is_complete());
        // show poster + backdrop, season poster, episode title card
        assert_eq!(state.missing().len(), 4);
    }

    #[test]
    fn fulfill_is_monotonic_and_completes() {
        let mut state = FulfillmentState::for_target(&show_with_one_episode(ItemImages::default()));
        state.fulfill(SlotKey::Target, ImageKind::Poster);
        state.fulfill(SlotKey::Target, ImageKind::Poster);
        state.fulfill(SlotKey::Target, ImageKind::Backdrop);
        state.fulfill(SlotKey::Season { number: 1 }, ImageKind::Poster);
        assert!(!state.is_complete());
        state.fulfill(
            SlotKey::Episode {
                season: 1,
                episode: 1,
            },
            ImageKind::TitleCard,
        );
        assert!(state.is_complete());
    }

    #[test]
    fn resolve_maps_scopes_for_shows() {
        let state = FulfillmentState::for_target(&show_with_one_episode(ItemImages::default()));
        assert_eq!(state.resolve(ArtworkScope::Show), Some(SlotKey::Target));
        assert_eq!(
            state.resolve(ArtworkScope::Season { number: 1 }),
            Some(SlotKey::Season { number: 1 })
        );
        // unknown season, unknown scope kind
        assert_eq!(state.resolve(ArtworkScope::Season { number: 9 }), None);
        assert_eq!(
            state.resolve(ArtworkScope::Movie {
                tmdb_id: TmdbId(100)
            }),
            None
        );
    }

    #[test]
    fn resolve_maps_collection_members() {
        let target = LibraryTarget::Collection(Collection {
            item_id: "col-1".into(),
            tmdb_id: TmdbId(10),
            title: "Trilogy".into(),
            images: ItemImages::default(),
            movies: vec![Movie {
                item_id: "movie-1".into(),
                tmdb_id: TmdbId(11),
                title: "Part One".into(),
                year: None,
                images: ItemImages::default(),
            }],
        });
        let state = FulfillmentState::for_target(&target);
        assert_eq!(
            state.resolve(ArtworkScope::Collection),
            Some(SlotKey::Target)
        );
        assert_eq!(
            state.resolve(ArtworkScope::Movie {
                tmdb_id: TmdbId(11)
            }),
            Some(SlotKey::Member {
                tmdb_id: TmdbId(11)
            })
        );
        assert_eq!(
            state.resolve(ArtworkScope::Movie {
                tmdb_id: TmdbId(99)
            }),
            None
        );
    }

    #[test]
    fn movie_target_only_accepts_its_own_tmdb_id() {
        let target = LibraryTarget::Movie(Movie {
            item_id: "movie-1".into(),
            tmdb_id: TmdbId(42),
            title: "Feature".into(),
            year: Some(1999),
            images: ItemImages::default(),
        });
        let state = FulfillmentState::for_target(&target);
        assert_eq!(
            state.resolve(ArtworkScope::Movie {
                tmdb_id: TmdbId(42)
            }),
            Some(SlotKey::Target)
        );
        assert_eq!(
            state.resolve(ArtworkScope::Movie {
                tmdb_id: TmdbId(43)
            }),
            None
        );
    }
}
