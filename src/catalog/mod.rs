// src/catalog/mod.rs

//! Media catalog boundary
//!
//! The reconciliation engine only sees the catalog through the [`Catalog`]
//! trait: a list of libraries, a one-pass item listing per library, and three
//! write operations. Two implementations ship with the crate:
//!
//! - [`PlexClient`]: blocking HTTP client for a Plex Media Server
//! - `MemoryCatalog`: in-memory catalog for tests, behind the `testing` feature
//!
//! A [`CatalogItem`] is a read snapshot. Nothing here caches state between
//! runs; the marker strings written into the catalog's own fields are the
//! only persisted record of what was hidden.

#[cfg(any(test, feature = "testing"))]
mod memory;
mod plex;

#[cfg(any(test, feature = "testing"))]
pub use memory::{AgentMetadata, CatalogWrite, MemoryCatalog};
pub use plex::PlexClient;

use std::fmt;

use strum_macros::{Display, EnumIter, EnumString};

use crate::error::Result;

/// A metadata field that can carry spoilers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum FieldKind {
    Title,
    Summary,
    Thumbnail,
}

impl FieldKind {
    /// Field name used by the Plex edit API
    pub fn plex_field(self) -> &'static str {
        match self {
            FieldKind::Title => "title",
            FieldKind::Summary => "summary",
            FieldKind::Thumbnail => "thumb",
        }
    }
}

/// Kind of playable item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ItemKind {
    Episode,
    Movie,
}

/// Per-field lock flags as reported by the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldLocks {
    pub title: bool,
    pub summary: bool,
    pub thumbnail: bool,
}

impl FieldLocks {
    pub fn get(&self, kind: FieldKind) -> bool {
        match kind {
            FieldKind::Title => self.title,
            FieldKind::Summary => self.summary,
            FieldKind::Thumbnail => self.thumbnail,
        }
    }

    pub fn set(&mut self, kind: FieldKind, locked: bool) {
        match kind {
            FieldKind::Title => self.title = locked,
            FieldKind::Summary => self.summary = locked,
            FieldKind::Thumbnail => self.thumbnail = locked,
        }
    }
}

/// Snapshot of one episode or movie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    /// Stable identifier (`plex://episode/...`, `plex://movie/...`)
    pub guid: String,
    /// Server-local key used to address edits (Plex rating key)
    pub key: String,
    pub kind: ItemKind,
    /// Parent show name (episodes only)
    pub show_title: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    /// Release year (movies only)
    pub year: Option<u32>,
    pub watched: bool,
    pub title: String,
    pub summary: String,
    pub thumbnail: String,
    pub locks: FieldLocks,
    /// Show poster, used as the replacement thumbnail (episodes only)
    pub fallback_thumbnail: Option<String>,
}

impl CatalogItem {
    /// Create an unwatched episode with empty fields
    pub fn episode(guid: impl Into<String>, key: impl Into<String>, show: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            key: key.into(),
            kind: ItemKind::Episode,
            show_title: Some(show.into()),
            season: None,
            episode: None,
            year: None,
            watched: false,
            title: String::new(),
            summary: String::new(),
            thumbnail: String::new(),
            locks: FieldLocks::default(),
            fallback_thumbnail: None,
        }
    }

    /// Create an unwatched movie with empty fields
    pub fn movie(guid: impl Into<String>, key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            key: key.into(),
            kind: ItemKind::Movie,
            show_title: None,
            season: None,
            episode: None,
            year: None,
            watched: false,
            title: title.into(),
            summary: String::new(),
            thumbnail: String::new(),
            locks: FieldLocks::default(),
            fallback_thumbnail: None,
        }
    }

    /// Current value of a field
    pub fn value(&self, kind: FieldKind) -> &str {
        match kind {
            FieldKind::Title => &self.title,
            FieldKind::Summary => &self.summary,
            FieldKind::Thumbnail => &self.thumbnail,
        }
    }

    pub fn set_value(&mut self, kind: FieldKind, value: impl Into<String>) {
        let value = value.into();
        match kind {
            FieldKind::Title => self.title = value,
            FieldKind::Summary => self.summary = value,
            FieldKind::Thumbnail => self.thumbnail = value,
        }
    }

    pub fn is_locked(&self, kind: FieldKind) -> bool {
        self.locks.get(kind)
    }

    /// The name matched against the ignore list: show name for episodes,
    /// the movie's own title for movies
    pub fn ignore_name(&self) -> &str {
        match self.kind {
            ItemKind::Episode => self.show_title.as_deref().unwrap_or_default(),
            ItemKind::Movie => &self.title,
        }
    }
}

impl fmt::Display for CatalogItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ItemKind::Episode => {
                write!(f, "{}", self.show_title.as_deref().unwrap_or("Unknown show"))?;
                if let Some(season) = self.season {
                    write!(f, " season {}", season)?;
                }
                if let Some(episode) = self.episode {
                    write!(f, " episode {}", episode)?;
                }
                // The title may be the hidden marker, which is still what the server shows
                write!(f, " \"{}\"", self.title)
            }
            ItemKind::Movie => match self.year {
                Some(year) => write!(f, "{} ({})", self.title, year),
                None => write!(f, "{}", self.title),
            },
        }
    }
}

/// Library type as reported by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryKind {
    Show,
    Movie,
    Other(String),
}

impl LibraryKind {
    pub fn from_plex(kind: &str) -> Self {
        match kind {
            "show" => LibraryKind::Show,
            "movie" => LibraryKind::Movie,
            other => LibraryKind::Other(other.to_string()),
        }
    }
}

/// A library (Plex section) on the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRef {
    pub key: String,
    pub title: String,
    pub kind: LibraryKind,
}

/// One-pass item listing for a library
pub type ItemIter<'a> = Box<dyn Iterator<Item = Result<CatalogItem>> + 'a>;

/// Read/write access to a media catalog
pub trait Catalog {
    /// List every library on the server
    fn list_libraries(&self) -> Result<Vec<LibraryRef>>;

    /// Lazily list the episodes or movies of a library
    fn items<'a>(&'a self, library: &LibraryRef) -> Result<ItemIter<'a>>;

    /// Replace a field's value and set its lock flag. An empty value with
    /// `lock == false` clears the field for the next refresh.
    fn write_field(&mut self, key: &str, kind: FieldKind, value: &str, lock: bool) -> Result<()>;

    /// Release a field's lock without touching its value
    fn unlock_field(&mut self, key: &str, kind: FieldKind) -> Result<()>;

    /// Ask the catalog to re-fetch the item's metadata
    fn refresh_item(&mut self, key: &str) -> Result<()>;
}
