// src/sync/classify.rs

//! Item classification: ignored or not, watched or not.

use std::collections::HashSet;

use crate::catalog::{CatalogItem, ItemKind};

/// Show and movie names excluded from hiding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    entries: HashSet<String>,
}

impl IgnoreList {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|e| e.as_ref().trim().to_string())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Exact, case-sensitive match after trimming surrounding whitespace
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Eligibility class of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemClass {
    pub kind: ItemKind,
    /// False when the item's show (or the movie itself) is ignored
    pub eligible: bool,
    pub watched: bool,
}

pub fn classify(item: &CatalogItem, ignore: &IgnoreList) -> ItemClass {
    ItemClass {
        kind: item.kind,
        eligible: !ignore.contains(item.ignore_name()),
        watched: item.watched,
    }
}
