// src/sync/policy.rs

//! Field policy: which fields of an item should be hidden right now.
//!
//! Rules, per field kind:
//! - ignored items hide nothing
//! - titles and thumbnails are only ever hidden on episodes
//! - a kind is hidden only when its `hide_*` flag is on (thumbnails also need
//!   `process_thumbnails`)
//! - watched items hide nothing
//!
//! Tracked kinds that are not hidden resolve to visible, so a field hidden in
//! an earlier run is restored once the item is watched, ignored, or its flag
//! is switched off.

use std::collections::{BTreeMap, BTreeSet};

use strum::IntoEnumIterator;

use crate::catalog::{CatalogItem, FieldKind, ItemKind};
use crate::config::Config;

use super::classify::{IgnoreList, ItemClass, classify};
use super::marker::MarkerSet;

/// Target visibility of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Desired state of one field of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesiredState {
    pub kind: FieldKind,
    pub visibility: Visibility,
    /// Lock the field when hiding it
    pub lock: bool,
    /// Set by an override rather than by watched-state policy
    pub forced: bool,
}

impl DesiredState {
    pub fn visible(kind: FieldKind) -> Self {
        Self {
            kind,
            visibility: Visibility::Visible,
            lock: false,
            forced: false,
        }
    }

    pub fn hidden(kind: FieldKind, lock: bool) -> Self {
        Self {
            kind,
            visibility: Visibility::Hidden,
            lock,
            forced: false,
        }
    }

    pub fn forced(mut self) -> Self {
        self.forced = true;
        self
    }
}

/// Desired state per tracked field kind
pub type DesiredFields = BTreeMap<FieldKind, DesiredState>;

/// Policy derived from the configuration
#[derive(Debug, Clone)]
pub struct Policy {
    hide_summaries: bool,
    hide_titles: bool,
    hide_thumbnails: bool,
    process_thumbnails: bool,
    lock_edited_fields: bool,
    markers: MarkerSet,
    ignore: IgnoreList,
}

impl Policy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            hide_summaries: config.hide_summaries,
            hide_titles: config.hide_titles,
            hide_thumbnails: config.hide_thumbnails,
            process_thumbnails: config.process_thumbnails,
            lock_edited_fields: config.lock_edited_fields,
            markers: MarkerSet::from_config(config),
            ignore: IgnoreList::new(&config.ignored_items),
        }
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn lock_edited_fields(&self) -> bool {
        self.lock_edited_fields
    }

    pub fn classify(&self, item: &CatalogItem) -> ItemClass {
        classify(item, &self.ignore)
    }

    fn kind_allows(item_kind: ItemKind, field: FieldKind) -> bool {
        match field {
            FieldKind::Summary => true,
            FieldKind::Title | FieldKind::Thumbnail => item_kind == ItemKind::Episode,
        }
    }

    fn flag_enabled(&self, field: FieldKind) -> bool {
        match field {
            FieldKind::Summary => self.hide_summaries,
            FieldKind::Title => self.hide_titles,
            FieldKind::Thumbnail => self.hide_thumbnails && self.process_thumbnails,
        }
    }

    /// Field kinds read and written for items of this kind
    pub fn tracked_fields(&self, item_kind: ItemKind) -> Vec<FieldKind> {
        FieldKind::iter()
            .filter(|&field| Self::kind_allows(item_kind, field))
            .filter(|&field| match field {
                FieldKind::Thumbnail => self.process_thumbnails,
                _ => self.markers.has_marker(field),
            })
            .collect()
    }

    /// Field kinds the configuration hides on unwatched items of this kind
    pub fn configured_hidden(&self, item_kind: ItemKind) -> BTreeSet<FieldKind> {
        self.tracked_fields(item_kind)
            .into_iter()
            .filter(|&field| self.flag_enabled(field))
            .collect()
    }

    /// Field kinds that should currently be hidden for an item
    pub fn hidden_fields(&self, class: &ItemClass) -> BTreeSet<FieldKind> {
        if !class.eligible || class.watched {
            return BTreeSet::new();
        }
        self.configured_hidden(class.kind)
    }

    /// Desired state of every tracked field of an item
    pub fn desired(&self, class: &ItemClass) -> DesiredFields {
        let hidden = self.hidden_fields(class);
        self.tracked_fields(class.kind)
            .into_iter()
            .map(|field| {
                let state = if hidden.contains(&field) {
                    DesiredState::hidden(field, self.lock_edited_fields)
                } else {
                    DesiredState::visible(field)
                };
                (field, state)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_all_on() -> Config {
        let mut config = Config::new("http://127.0.0.1:32400", "t", &["TV"], "S");
        config.hide_titles = true;
        config.hidden_title_string = Some("T".to_string());
        config.hide_thumbnails = true;
        config.process_thumbnails = true;
        config
    }

    fn class(kind: ItemKind, eligible: bool, watched: bool) -> ItemClass {
        ItemClass {
            kind,
            eligible,
            watched,
        }
    }

    #[test]
    fn test_unwatched_episode_hides_everything_enabled() {
        let policy = Policy::from_config(&config_all_on());
        let hidden = policy.hidden_fields(&class(ItemKind::Episode, true, false));
        assert_eq!(
            hidden.into_iter().collect::<Vec<_>>(),
            vec![FieldKind::Title, FieldKind::Summary, FieldKind::Thumbnail]
        );
    }

    #[test]
    fn test_movie_only_hides_summary() {
        let policy = Policy::from_config(&config_all_on());
        let hidden = policy.hidden_fields(&class(ItemKind::Movie, true, false));
        assert_eq!(hidden.into_iter().collect::<Vec<_>>(), vec![FieldKind::Summary]);
        assert_eq!(policy.tracked_fields(ItemKind::Movie), vec![FieldKind::Summary]);
    }

    #[test]
    fn test_watched_and_ignored_hide_nothing() {
        let policy = Policy::from_config(&config_all_on());
        assert!(policy.hidden_fields(&class(ItemKind::Episode, true, true)).is_empty());
        assert!(policy.hidden_fields(&class(ItemKind::Episode, false, false)).is_empty());
        assert!(policy.hidden_fields(&class(ItemKind::Movie, false, false)).is_empty());
    }

    #[test]
    fn test_thumbnails_need_process_flag() {
        let mut config = config_all_on();
        config.process_thumbnails = false;
        let policy = Policy::from_config(&config);
        let ep = class(ItemKind::Episode, true, false);
        assert!(!policy.hidden_fields(&ep).contains(&FieldKind::Thumbnail));
        assert!(!policy.tracked_fields(ItemKind::Episode).contains(&FieldKind::Thumbnail));
    }

    #[test]
    fn test_thumbnails_tracked_without_hide_flag() {
        let mut config = config_all_on();
        config.hide_thumbnails = false;
        let policy = Policy::from_config(&config);
        let desired = policy.desired(&class(ItemKind::Episode, true, false));
        assert_eq!(
            desired[&FieldKind::Thumbnail].visibility,
            Visibility::Visible
        );
    }

    #[test]
    fn test_desired_states_carry_lock_setting() {
        let mut config = config_all_on();
        config.lock_edited_fields = false;
        let policy = Policy::from_config(&config);
        let desired = policy.desired(&class(ItemKind::Episode, true, false));
        let summary = desired[&FieldKind::Summary];
        assert_eq!(summary.visibility, Visibility::Hidden);
        assert!(!summary.lock);
        assert!(!summary.forced);
    }

    #[test]
    fn test_title_untracked_without_marker() {
        let config = Config::new("http://127.0.0.1:32400", "t", &["TV"], "S");
        let policy = Policy::from_config(&config);
        assert_eq!(policy.tracked_fields(ItemKind::Episode), vec![FieldKind::Summary]);
    }
}
