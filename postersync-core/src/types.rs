//! Library item tree and the small enums everything else hangs off.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A TMDB identifier. Both servers and the set source key media by this.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct TmdbId(pub u64);

impl fmt::Display for TmdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TmdbId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(TmdbId)
    }
}

/// The artwork kinds postersync manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageKind {
    Poster,
    Backdrop,
    TitleCard,
}

impl ImageKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ImageKind::Poster => "poster",
            ImageKind::Backdrop => "backdrop",
            ImageKind::TitleCard => "title card",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Top-level media kinds a sync target can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Show,
    Movie,
    Collection,
}

impl MediaKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            MediaKind::Show => "show",
            MediaKind::Movie => "movie",
            MediaKind::Collection => "collection",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "show" | "series" | "tv" => Ok(MediaKind::Show),
            "movie" | "film" => Ok(MediaKind::Movie),
            "collection" => Ok(MediaKind::Collection),
            other => Err(format!("unknown media kind: {other}")),
        }
    }
}

/// Which artwork an item already carries on the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemImages {
    pub poster: bool,
    pub backdrop: bool,
    pub title_card: bool,
}

impl ItemImages {
    pub fn has(&self, kind: ImageKind) -> bool {
        match kind {
            ImageKind::Poster => self.poster,
            ImageKind::Backdrop => self.backdrop,
            ImageKind::TitleCard => self.title_card,
        }
    }
}

/// What a server library holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryKind {
    Shows,
    Movies,
    Other,
}

/// A top-level server library (Jellyfin media folder / Plex section).
#[derive(Debug, Clone)]
pub struct Library {
    pub id: String,
    pub title: String,
    pub kind: LibraryKind,
}

#[derive(Debug, Clone)]
pub struct Episode {
    pub item_id: String,
    pub number: u32,
    pub title: String,
    pub images: ItemImages,
}

#[derive(Debug, Clone)]
pub struct Season {
    pub item_id: String,
    pub number: u32,
    pub images: ItemImages,
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone)]
pub struct Show {
    pub item_id: String,
    pub tmdb_id: TmdbId,
    pub title: String,
    pub year: Option<i32>,
    pub images: ItemImages,
    pub seasons: Vec<Season>,
}

#[derive(Debug, Clone)]
pub struct Movie {
    pub item_id: String,
    pub tmdb_id: TmdbId,
    pub title: String,
    pub year: Option<i32>,
    pub images: ItemImages,
}

#[derive(Debug, Clone)]
pub struct Collection {
    pub item_id: String,
    pub tmdb_id: TmdbId,
    pub title: String,
    pub images: ItemImages,
    pub movies: Vec<Movie>,
}

/// One thing the engine can be asked to reconcile.
#[derive(Debug, Clone)]
pub enum LibraryTarget {
    Show(Show),
    Movie(Movie),
    Collection(Collection),
}

impl LibraryTarget {
    pub fn kind(&self) -> MediaKind {
        match self {
            LibraryTarget::Show(_) => MediaKind::Show,
            LibraryTarget::Movie(_) => MediaKind::Movie,
            LibraryTarget::Collection(_) => MediaKind::Collection,
        }
    }

    pub fn tmdb_id(&self) -> TmdbId {
        match self {
            LibraryTarget::Show(s) => s.tmdb_id,
            LibraryTarget::Movie(m) => m.tmdb_id,
            LibraryTarget::Collection(c) => c.tmdb_id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            LibraryTarget::Show(s) => &s.title,
            LibraryTarget::Movie(m) => &m.title,
            LibraryTarget::Collection(c) => &c.title,
        }
    }

    /// Server item id of the target itself.
    pub fn item_id(&self) -> &str {
        match self {
            LibraryTarget::Show(s) => &s.item_id,
            LibraryTarget::Movie(m) => &m.item_id,
            LibraryTarget::Collection(c) => &c.item_id,
        }
    }
}
