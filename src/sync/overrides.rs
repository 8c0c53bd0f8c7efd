// src/sync/overrides.rs

//! Explicit overrides of the watched-state policy
//!
//! Overrides are resolved in their own pass over a library snapshot. The
//! result replaces the policy's desired state for the fields it names, so an
//! override always wins over the normal computation:
//!
//! - `--also-unhide <uri>`: every tracked field of that item becomes visible
//!   and unlocked, whatever its watched flag says. This covers the window in
//!   which a watch-event trigger fires before the server records the play.
//! - `--also-hide <uri>`: every field the configuration hides becomes hidden
//!   on that item, even if watched or ignored. Unhide beats hide.
//! - `--restore-all`: every tracked field of every item becomes visible and
//!   unlocked, ignoring the ignore list.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::catalog::{CatalogItem, ItemKind};

use super::policy::{DesiredFields, DesiredState, Policy};

/// Rejected `plex://` item reference
#[derive(Debug, Clone, Error)]
#[error("Invalid item URI \"{0}\": expected plex://episode/<id> or plex://movie/<id>")]
pub struct InvalidItemUri(String);

/// A reference to one item by its stable identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemUri {
    pub kind: ItemKind,
    guid: String,
}

impl ItemUri {
    /// The full `plex://kind/id` identifier
    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        self.kind == item.kind && self.guid == item.guid
    }
}

impl FromStr for ItemUri {
    type Err = InvalidItemUri;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidItemUri(s.to_string());
        let rest = s.strip_prefix("plex://").ok_or_else(invalid)?;
        let (kind, id) = rest.split_once('/').ok_or_else(invalid)?;
        let kind = ItemKind::from_str(kind).map_err(|_| invalid())?;
        if id.is_empty() || id.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            kind,
            guid: s.to_string(),
        })
    }
}

impl fmt::Display for ItemUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.guid)
    }
}

/// Overrides requested for a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub restore_all: bool,
    pub also_unhide: Vec<ItemUri>,
    pub also_hide: Vec<ItemUri>,
}

impl Overrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn restore_all() -> Self {
        Self {
            restore_all: true,
            ..Self::default()
        }
    }

    /// Targeted references, for reporting the ones never found
    pub fn targets(&self) -> impl Iterator<Item = &ItemUri> {
        self.also_hide.iter().chain(self.also_unhide.iter())
    }

    /// Resolve against a library snapshot
    pub fn resolve(&self, items: &[CatalogItem], policy: &Policy) -> ForcedStates {
        let mut forced = ForcedStates::default();

        if self.restore_all {
            for item in items {
                forced.insert(item, forced_visible(item, policy));
            }
            return forced;
        }

        for item in items {
            let mut fields = DesiredFields::new();

            if self.also_hide.iter().any(|uri| uri.matches(item)) {
                for field in policy.configured_hidden(item.kind) {
                    let state = DesiredState::hidden(field, policy.lock_edited_fields()).forced();
                    fields.insert(field, state);
                }
                forced.matched.insert(item.guid.clone());
            }

            if self.also_unhide.iter().any(|uri| uri.matches(item)) {
                fields.extend(forced_visible(item, policy));
                forced.matched.insert(item.guid.clone());
            }

            if !fields.is_empty() {
                forced.insert(item, fields);
            }
        }

        forced
    }
}

fn forced_visible(item: &CatalogItem, policy: &Policy) -> DesiredFields {
    policy
        .tracked_fields(item.kind)
        .into_iter()
        .map(|field| (field, DesiredState::visible(field).forced()))
        .collect()
}

/// Forced field states per item GUID
#[derive(Debug, Clone, Default)]
pub struct ForcedStates {
    by_guid: HashMap<String, DesiredFields>,
    /// GUIDs matched by a targeted override
    pub matched: HashSet<String>,
}

impl ForcedStates {
    fn insert(&mut self, item: &CatalogItem, fields: DesiredFields) {
        self.by_guid.insert(item.guid.clone(), fields);
    }

    pub fn for_item(&self, item: &CatalogItem) -> Option<&DesiredFields> {
        self.by_guid.get(&item.guid)
    }

    /// Policy result with any forced fields laid over it
    pub fn apply(&self, item: &CatalogItem, mut desired: DesiredFields) -> DesiredFields {
        if let Some(forced) = self.for_item(item) {
            desired.extend(forced.iter().map(|(kind, state)| (*kind, *state)));
        }
        desired
    }

    pub fn len(&self) -> usize {
        self.by_guid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_guid.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldKind;
    use crate::config::Config;
    use crate::sync::policy::Visibility;

    fn policy() -> Policy {
        let mut config = Config::new("http://127.0.0.1:32400", "t", &["TV"], "S");
        config.hide_titles = true;
        config.hidden_title_string = Some("T".to_string());
        config.ignored_items = vec!["Ignored Show".to_string()];
        Policy::from_config(&config)
    }

    fn episode(id: &str, show: &str) -> CatalogItem {
        CatalogItem::episode(format!("plex://episode/{id}"), id, show)
    }

    #[test]
    fn test_parse_item_uri() {
        let uri: ItemUri = "plex://episode/5d9c086c46115600200aa2fe".parse().unwrap();
        assert_eq!(uri.kind, ItemKind::Episode);
        assert_eq!(uri.guid(), "plex://episode/5d9c086c46115600200aa2fe");

        let uri: ItemUri = "plex://movie/abc".parse().unwrap();
        assert_eq!(uri.kind, ItemKind::Movie);
    }

    #[test]
    fn test_reject_bad_uris() {
        for bad in [
            "episode/1",
            "plex://show/1",
            "plex://episode/",
            "plex://episode",
            "plex://episode/1/2",
            "http://episode/1",
        ] {
            assert!(bad.parse::<ItemUri>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_unhide_forces_visible() {
        let items = vec![episode("1", "Show"), episode("2", "Show")];
        let overrides = Overrides {
            also_unhide: vec!["plex://episode/1".parse().unwrap()],
            ..Overrides::default()
        };
        let forced = overrides.resolve(&items, &policy());

        assert_eq!(forced.len(), 1);
        assert!(forced.matched.contains("plex://episode/1"));
        let fields = forced.for_item(&items[0]).unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields.values().all(|s| s.visibility == Visibility::Visible && s.forced));
        assert!(forced.for_item(&items[1]).is_none());
    }

    #[test]
    fn test_unhide_beats_hide() {
        let items = vec![episode("1", "Show")];
        let uri: ItemUri = "plex://episode/1".parse().unwrap();
        let overrides = Overrides {
            also_unhide: vec![uri.clone()],
            also_hide: vec![uri],
            ..Overrides::default()
        };
        let forced = overrides.resolve(&items, &policy());
        let fields = forced.for_item(&items[0]).unwrap();
        assert!(fields.values().all(|s| s.visibility == Visibility::Visible));
    }

    #[test]
    fn test_hide_ignores_ignore_list() {
        let mut item = episode("1", "Ignored Show");
        item.watched = true;
        let overrides = Overrides {
            also_hide: vec!["plex://episode/1".parse().unwrap()],
            ..Overrides::default()
        };
        let forced = overrides.resolve(std::slice::from_ref(&item), &policy());
        let fields = forced.for_item(&item).unwrap();
        assert_eq!(fields[&FieldKind::Summary].visibility, Visibility::Hidden);
        assert_eq!(fields[&FieldKind::Title].visibility, Visibility::Hidden);
    }

    #[test]
    fn test_restore_all_covers_every_item() {
        let items = vec![episode("1", "Show"), episode("2", "Ignored Show")];
        let forced = Overrides::restore_all().resolve(&items, &policy());
        assert_eq!(forced.len(), 2);
        assert!(forced.matched.is_empty());
    }

    #[test]
    fn test_kind_mismatch_does_not_match() {
        let items = vec![episode("1", "Show")];
        let overrides = Overrides {
            also_unhide: vec!["plex://movie/1".parse().unwrap()],
            ..Overrides::default()
        };
        assert!(overrides.resolve(&items, &policy()).is_empty());
    }

    #[test]
    fn test_apply_overlays_policy() {
        let item = episode("1", "Show");
        let policy = policy();
        let overrides = Overrides {
            also_unhide: vec!["plex://episode/1".parse().unwrap()],
            ..Overrides::default()
        };
        let forced = overrides.resolve(std::slice::from_ref(&item), &policy);
        let desired = forced.apply(&item, policy.desired(&policy.classify(&item)));
        assert!(desired.values().all(|s| s.visibility == Visibility::Visible));
    }
}
