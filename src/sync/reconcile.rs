// src/sync/reconcile.rs

//! Reconciliation engine
//!
//! Compares the desired state of each field against what the catalog shows and
//! produces the minimal list of writes. Each field is in one of two observed
//! states, decided only by the marker codec:
//!
//! | Desired | Observed      | Action                                      |
//! |---------|---------------|---------------------------------------------|
//! | hidden  | unmarked      | write the marker (locked if configured)     |
//! | hidden  | marked        | nothing                                     |
//! | visible | marked        | reveal: clear and unlock for a refresh      |
//! | visible | unmarked      | nothing, or unlock when forced and locked   |
//!
//! An unmarked field that is empty is never hidden: there is nothing to spoil
//! yet, and a later run will hide it once the catalog fills it in.

use std::fmt;

use crate::catalog::{CatalogItem, FieldKind};

use super::marker::MarkerSet;
use super::policy::{DesiredState, Visibility};

/// Observed state of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    /// Showing real (or no) content
    VisibleUnmarked,
    /// Holding our marker
    HiddenMarked,
}

/// What to do to one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOp {
    /// Replace the value with the marker
    Hide { value: String, lock: bool },
    /// Clear and unlock so the next refresh restores real content
    Reveal,
    /// Release a lock without touching the value
    Unlock,
}

/// A single field write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteAction {
    pub kind: FieldKind,
    pub op: FieldOp,
}

impl WriteAction {
    pub fn is_hide(&self) -> bool {
        matches!(self.op, FieldOp::Hide { .. })
    }

    /// Past-tense description for log lines
    pub fn done_description(&self) -> String {
        match self.op {
            FieldOp::Hide { .. } => format!("Hid {}", self.kind),
            FieldOp::Reveal => format!("Restored {}", self.kind),
            FieldOp::Unlock => format!("Unlocked {}", self.kind),
        }
    }
}

impl fmt::Display for WriteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            FieldOp::Hide { lock: true, .. } => write!(f, "hide {} (locked)", self.kind),
            FieldOp::Hide { lock: false, .. } => write!(f, "hide {}", self.kind),
            FieldOp::Reveal => write!(f, "restore {}", self.kind),
            FieldOp::Unlock => write!(f, "unlock {}", self.kind),
        }
    }
}

/// Writes planned for one item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WritePlan {
    pub actions: Vec<WriteAction>,
}

impl WritePlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn hides(&self) -> usize {
        self.actions.iter().filter(|a| a.is_hide()).count()
    }

    pub fn reveals(&self) -> usize {
        self.actions.len() - self.hides()
    }
}

/// Observed state of `kind` on `item`
pub fn observe(item: &CatalogItem, kind: FieldKind, markers: &MarkerSet) -> FieldState {
    if markers.is_hidden(kind, item) {
        FieldState::HiddenMarked
    } else {
        FieldState::VisibleUnmarked
    }
}

/// The transition table for one field
pub fn decide(desired: &DesiredState, item: &CatalogItem, markers: &MarkerSet) -> Option<FieldOp> {
    let kind = desired.kind;
    match (desired.visibility, observe(item, kind, markers)) {
        (Visibility::Hidden, FieldState::HiddenMarked) => None,
        (Visibility::Hidden, FieldState::VisibleUnmarked) => {
            if item.value(kind).trim().is_empty() {
                return None;
            }
            markers.hidden_value(kind, item).map(|value| FieldOp::Hide {
                value: value.to_string(),
                lock: desired.lock,
            })
        }
        (Visibility::Visible, FieldState::HiddenMarked) => Some(FieldOp::Reveal),
        (Visibility::Visible, FieldState::VisibleUnmarked) => {
            (desired.forced && item.is_locked(kind)).then_some(FieldOp::Unlock)
        }
    }
}

/// Plan the writes that bring `item` to its desired state
pub fn plan_item<'a>(
    item: &CatalogItem,
    desired: impl IntoIterator<Item = &'a DesiredState>,
    markers: &MarkerSet,
) -> WritePlan {
    let actions = desired
        .into_iter()
        .filter_map(|state| {
            decide(state, item, markers).map(|op| WriteAction {
                kind: state.kind,
                op,
            })
        })
        .collect();
    WritePlan { actions }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "Summary hidden";

    fn markers() -> MarkerSet {
        MarkerSet::new(Some(MARKER), Some("Title hidden"))
    }

    fn episode(summary: &str) -> CatalogItem {
        let mut ep = CatalogItem::episode("plex://episode/1", "101", "Show");
        ep.summary = summary.to_string();
        ep.title = "Pilot".to_string();
        ep
    }

    #[test]
    fn test_hide_unmarked() {
        let ep = episode("A spoiler-filled recap.");
        let op = decide(&DesiredState::hidden(FieldKind::Summary, true), &ep, &markers());
        assert_eq!(
            op,
            Some(FieldOp::Hide {
                value: MARKER.to_string(),
                lock: true
            })
        );
    }

    #[test]
    fn test_already_hidden_is_noop() {
        let ep = episode(MARKER);
        let op = decide(&DesiredState::hidden(FieldKind::Summary, true), &ep, &markers());
        assert_eq!(op, None);
    }

    #[test]
    fn test_reveal_marked() {
        let mut ep = episode(MARKER);
        ep.locks.summary = true;
        let op = decide(&DesiredState::visible(FieldKind::Summary), &ep, &markers());
        assert_eq!(op, Some(FieldOp::Reveal));
    }

    #[test]
    fn test_visible_unmarked_is_noop_even_if_locked() {
        let mut ep = episode("User's own summary");
        ep.locks.summary = true;
        let op = decide(&DesiredState::visible(FieldKind::Summary), &ep, &markers());
        assert_eq!(op, None);
    }

    #[test]
    fn test_forced_visible_unlocks_locked_field() {
        let mut ep = episode("Real summary");
        ep.locks.summary = true;
        let desired = DesiredState::visible(FieldKind::Summary).forced();
        assert_eq!(decide(&desired, &ep, &markers()), Some(FieldOp::Unlock));

        ep.locks.summary = false;
        assert_eq!(decide(&desired, &ep, &markers()), None);
    }

    #[test]
    fn test_empty_field_not_hidden() {
        let ep = episode("   ");
        let op = decide(&DesiredState::hidden(FieldKind::Summary, true), &ep, &markers());
        assert_eq!(op, None);
    }

    #[test]
    fn test_thumbnail_without_fallback_not_hidden() {
        let mut ep = episode("x");
        ep.thumbnail = "/library/metadata/101/thumb/1".to_string();
        let desired = DesiredState::hidden(FieldKind::Thumbnail, true);
        assert_eq!(decide(&desired, &ep, &markers()), None);

        ep.fallback_thumbnail = Some("/library/metadata/100/thumb/1".to_string());
        assert_eq!(
            decide(&desired, &ep, &markers()),
            Some(FieldOp::Hide {
                value: "/library/metadata/100/thumb/1".to_string(),
                lock: true
            })
        );
    }

    #[test]
    fn test_plan_item_collects_per_field() {
        let mut ep = episode("Recap");
        ep.title = "Title hidden".to_string();
        let desired = [
            DesiredState::hidden(FieldKind::Summary, false),
            DesiredState::visible(FieldKind::Title),
        ];
        let plan = plan_item(&ep, &desired, &markers());
        assert_eq!(plan.actions.len(), 2);
        assert_eq!(plan.hides(), 1);
        assert_eq!(plan.reveals(), 1);
        assert!(matches!(plan.actions[0].op, FieldOp::Hide { lock: false, .. }));
        assert_eq!(plan.actions[1].to_string(), "restore title");
    }

    #[test]
    fn test_plan_is_idempotent_after_apply() {
        let mut ep = episode("Recap");
        let desired = [DesiredState::hidden(FieldKind::Summary, true)];
        let plan = plan_item(&ep, &desired, &markers());
        assert_eq!(plan.hides(), 1);

        // Apply the plan by hand, as the catalog would
        ep.summary = MARKER.to_string();
        ep.locks.summary = true;
        assert!(plan_item(&ep, &desired, &markers()).is_empty());
    }
}
