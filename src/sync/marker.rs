// src/sync/marker.rs

//! Hidden-marker codec
//!
//! A field counts as hidden by us exactly when its current value equals the
//! marker for that field kind. The comparison is byte-exact: no trimming, no
//! case folding. Text markers come from the configuration; the thumbnail
//! marker is the item's own fallback (show poster) reference.

use crate::catalog::{CatalogItem, FieldKind};
use crate::config::Config;

/// True when `current` is the marker
pub fn is_hidden_marker(current: &str, marker: &str) -> bool {
    current == marker
}

/// Configured text markers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerSet {
    summary: Option<String>,
    title: Option<String>,
}

impl MarkerSet {
    pub fn new(summary: Option<&str>, title: Option<&str>) -> Self {
        Self {
            summary: summary.map(str::to_string),
            title: title.map(str::to_string),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            summary: config.hidden_summary_string.clone(),
            title: config.hidden_title_string.clone(),
        }
    }

    /// Whether a text kind has a marker at all; thumbnails always do
    pub fn has_marker(&self, kind: FieldKind) -> bool {
        match kind {
            FieldKind::Summary => self.summary.is_some(),
            FieldKind::Title => self.title.is_some(),
            FieldKind::Thumbnail => true,
        }
    }

    /// The value written to hide `kind` on `item`
    pub fn hidden_value<'a>(&'a self, kind: FieldKind, item: &'a CatalogItem) -> Option<&'a str> {
        match kind {
            FieldKind::Summary => self.summary.as_deref(),
            FieldKind::Title => self.title.as_deref(),
            FieldKind::Thumbnail => item.fallback_thumbnail.as_deref(),
        }
    }

    /// Whether `item`'s current value of `kind` is our marker
    pub fn is_hidden(&self, kind: FieldKind, item: &CatalogItem) -> bool {
        self.hidden_value(kind, item)
            .is_some_and(|marker| is_hidden_marker(item.value(kind), marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_only() {
        assert!(is_hidden_marker("Summary hidden", "Summary hidden"));
        assert!(!is_hidden_marker("summary hidden", "Summary hidden"));
        assert!(!is_hidden_marker("Summary hidden ", "Summary hidden"));
        assert!(!is_hidden_marker("Summary hidden. Then more", "Summary hidden"));
    }

    #[test]
    fn test_whitespace_marker_verbatim() {
        assert!(is_hidden_marker(" ", " "));
        assert!(!is_hidden_marker("", " "));
        assert!(is_hidden_marker("", ""));
    }

    #[test]
    fn test_thumbnail_marker_is_fallback() {
        let markers = MarkerSet::new(Some("S"), None);
        let mut ep = CatalogItem::episode("plex://episode/1", "1", "Show");
        ep.thumbnail = "/library/metadata/1/thumb/1".to_string();
        assert!(!markers.is_hidden(FieldKind::Thumbnail, &ep));
        assert_eq!(markers.hidden_value(FieldKind::Thumbnail, &ep), None);

        ep.fallback_thumbnail = Some("/library/metadata/9/thumb/1".to_string());
        assert_eq!(
            markers.hidden_value(FieldKind::Thumbnail, &ep),
            Some("/library/metadata/9/thumb/1")
        );
        ep.thumbnail = "/library/metadata/9/thumb/1".to_string();
        assert!(markers.is_hidden(FieldKind::Thumbnail, &ep));
    }

    #[test]
    fn test_untracked_text_kind() {
        let markers = MarkerSet::new(Some("S"), None);
        assert!(markers.has_marker(FieldKind::Summary));
        assert!(!markers.has_marker(FieldKind::Title));

        let ep = CatalogItem::episode("plex://episode/1", "1", "Show");
        assert!(!markers.is_hidden(FieldKind::Title, &ep));
    }
}
