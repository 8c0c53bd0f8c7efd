// src/catalog/memory.rs

//! In-memory catalog
//!
//! Behaves like a Plex server for the purposes of reconciliation: a refresh
//! repopulates every unlocked field from the metadata agent (when agent data
//! was registered for the item) and leaves locked fields alone. Every
//! mutating call is recorded so tests can assert on the exact write traffic.

use std::collections::{HashMap, HashSet};

use strum::IntoEnumIterator;

use super::{Catalog, CatalogItem, FieldKind, ItemIter, ItemKind, LibraryKind, LibraryRef};
use crate::error::{Error, Result};

/// Metadata a refresh would restore for an item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentMetadata {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub thumbnail: Option<String>,
}

impl AgentMetadata {
    fn value(&self, kind: FieldKind) -> Option<&str> {
        match kind {
            FieldKind::Title => self.title.as_deref(),
            FieldKind::Summary => self.summary.as_deref(),
            FieldKind::Thumbnail => self.thumbnail.as_deref(),
        }
    }
}

/// A recorded mutating call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogWrite {
    Write {
        key: String,
        kind: FieldKind,
        value: String,
        lock: bool,
    },
    Unlock {
        key: String,
        kind: FieldKind,
    },
    Refresh {
        key: String,
    },
}

#[derive(Debug, Clone)]
struct MemoryLibrary {
    library: LibraryRef,
    keys: Vec<String>,
}

/// Catalog held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    libraries: Vec<MemoryLibrary>,
    items: HashMap<String, CatalogItem>,
    agent: HashMap<String, AgentMetadata>,
    vanished: HashSet<String>,
    failing: HashSet<(String, FieldKind)>,
    unreachable: bool,
    writes: Vec<CatalogWrite>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty library
    pub fn add_library(&mut self, title: &str, kind: LibraryKind) {
        let key = (self.libraries.len() + 1).to_string();
        self.libraries.push(MemoryLibrary {
            library: LibraryRef {
                key,
                title: title.to_string(),
                kind,
            },
            keys: Vec::new(),
        });
    }

    /// Add an item to a library, creating the library if needed
    pub fn insert(&mut self, library: &str, item: CatalogItem) {
        if !self.libraries.iter().any(|l| l.library.title == library) {
            let kind = match item.kind {
                ItemKind::Episode => LibraryKind::Show,
                ItemKind::Movie => LibraryKind::Movie,
            };
            self.add_library(library, kind);
        }
        if let Some(lib) = self.libraries.iter_mut().find(|l| l.library.title == library) {
            lib.keys.push(item.key.clone());
        }
        self.items.insert(item.key.clone(), item);
    }

    /// Register what a metadata refresh restores for an item
    pub fn set_agent_metadata(&mut self, key: &str, metadata: AgentMetadata) {
        self.agent.insert(key.to_string(), metadata);
    }

    /// Keep the item in listings but make every write report it as deleted,
    /// as if it was removed after the listing was taken
    pub fn vanish(&mut self, key: &str) {
        self.vanished.insert(key.to_string());
    }

    /// Make writes to one field of one item fail
    pub fn fail_writes(&mut self, key: &str, kind: FieldKind) {
        self.failing.insert((key.to_string(), kind));
    }

    /// Make every call fail as if the server was down
    pub fn set_unreachable(&mut self, unreachable: bool) {
        self.unreachable = unreachable;
    }

    pub fn set_watched(&mut self, key: &str, watched: bool) {
        if let Some(item) = self.items.get_mut(key) {
            item.watched = watched;
        }
    }

    pub fn item(&self, key: &str) -> Option<&CatalogItem> {
        self.items.get(key)
    }

    pub fn item_mut(&mut self, key: &str) -> Option<&mut CatalogItem> {
        self.items.get_mut(key)
    }

    /// All mutating calls received so far
    pub fn writes(&self) -> &[CatalogWrite] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable {
            return Err(Error::ConnectivityError("connection refused".to_string()));
        }
        Ok(())
    }

    fn writable_item(&mut self, key: &str, kind: Option<FieldKind>) -> Result<&mut CatalogItem> {
        self.check_reachable()?;
        if self.vanished.contains(key) {
            return Err(Error::ItemVanished(key.to_string()));
        }
        if let Some(kind) = kind {
            if self.failing.contains(&(key.to_string(), kind)) {
                return Err(Error::ItemWriteError {
                    item: key.to_string(),
                    action: format!("edit {}", kind),
                    reason: "HTTP 500 Internal Server Error".to_string(),
                });
            }
        }
        self.items
            .get_mut(key)
            .ok_or_else(|| Error::ItemVanished(key.to_string()))
    }
}

impl Catalog for MemoryCatalog {
    fn list_libraries(&self) -> Result<Vec<LibraryRef>> {
        self.check_reachable()?;
        Ok(self.libraries.iter().map(|l| l.library.clone()).collect())
    }

    fn items<'a>(&'a self, library: &LibraryRef) -> Result<ItemIter<'a>> {
        self.check_reachable()?;
        let lib = self
            .libraries
            .iter()
            .find(|l| l.library.key == library.key)
            .ok_or_else(|| Error::LibraryNotFound(library.title.clone()))?;

        Ok(Box::new(
            lib.keys
                .iter()
                .filter_map(move |key| self.items.get(key))
                .cloned()
                .map(Ok),
        ))
    }

    fn write_field(&mut self, key: &str, kind: FieldKind, value: &str, lock: bool) -> Result<()> {
        let item = self.writable_item(key, Some(kind))?;
        item.set_value(kind, value);
        item.locks.set(kind, lock);
        self.writes.push(CatalogWrite::Write {
            key: key.to_string(),
            kind,
            value: value.to_string(),
            lock,
        });
        Ok(())
    }

    fn unlock_field(&mut self, key: &str, kind: FieldKind) -> Result<()> {
        let item = self.writable_item(key, Some(kind))?;
        item.locks.set(kind, false);
        self.writes.push(CatalogWrite::Unlock {
            key: key.to_string(),
            kind,
        });
        Ok(())
    }

    fn refresh_item(&mut self, key: &str) -> Result<()> {
        let agent = self.agent.get(key).cloned().unwrap_or_default();
        let item = self.writable_item(key, None)?;
        for kind in FieldKind::iter() {
            if item.is_locked(kind) {
                continue;
            }
            if let Some(value) = agent.value(kind) {
                item.set_value(kind, value);
            }
        }
        self.writes.push(CatalogWrite::Refresh {
            key: key.to_string(),
        });
        Ok(())
    }
}
