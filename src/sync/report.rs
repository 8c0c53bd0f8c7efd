// src/sync/report.rs

//! Run report: what one reconciliation pass did

use std::fmt;

use chrono::{DateTime, Utc};

use crate::catalog::FieldKind;
use crate::error::Error;

/// A per-item failure recorded during a run
#[derive(Debug)]
pub struct ItemFailure {
    /// Human-readable item name
    pub item: String,
    pub guid: String,
    /// The field being written, `None` for item-level calls such as refresh
    pub field: Option<FieldKind>,
    pub error: Error,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(f, "{} [{}] ({}): {}", self.item, field, self.guid, self.error),
            None => write!(f, "{} ({}): {}", self.item, self.guid, self.error),
        }
    }
}

/// Outcome of a run
///
/// Item counts overlap: an item whose plan both hid and revealed fields is
/// counted as hidden and as unhidden. An item with any failure is counted as
/// failed. In a dry run the counts describe the planned writes.
#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    /// Libraries that were enumerated
    pub libraries: Vec<String>,
    pub items_seen: usize,
    pub hidden: usize,
    pub unhidden: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub failures: Vec<ItemFailure>,
    pub warnings: Vec<String>,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            dry_run,
            libraries: Vec::new(),
            items_seen: 0,
            hidden: 0,
            unhidden: 0,
            unchanged: 0,
            failed: 0,
            failures: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hid, unhid) = if self.dry_run {
            ("would hide", "would unhide")
        } else {
            ("hidden", "unhidden")
        };
        write!(
            f,
            "{} items in {} libraries: {} {}, {} {}, {} unchanged, {} failed",
            self.items_seen,
            self.libraries.len(),
            self.hidden,
            hid,
            self.unhidden,
            unhid,
            self.unchanged,
            self.failed
        )?;
        if let Some(finished) = self.finished_at {
            let elapsed = finished - self.started_at;
            write!(f, " ({:.1}s)", elapsed.num_milliseconds() as f64 / 1000.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        let mut report = RunReport::new(false);
        report.libraries = vec!["TV".to_string(), "Movies".to_string()];
        report.items_seen = 10;
        report.hidden = 3;
        report.unhidden = 1;
        report.unchanged = 6;
        assert_eq!(
            report.to_string(),
            "10 items in 2 libraries: 3 hidden, 1 unhidden, 6 unchanged, 0 failed"
        );
    }

    #[test]
    fn test_dry_run_wording() {
        let report = RunReport::new(true);
        assert!(report.to_string().contains("would hide"));
    }

    #[test]
    fn test_failure_display() {
        let failure = ItemFailure {
            item: "Lost season 1 episode 1 \"Pilot\"".to_string(),
            guid: "plex://episode/1".to_string(),
            field: Some(FieldKind::Summary),
            error: Error::ItemVanished("101".to_string()),
        };
        let line = failure.to_string();
        assert!(line.starts_with("Lost season 1 episode 1 \"Pilot\" [summary]"));
        assert!(line.contains("no longer exists"));
    }
}
