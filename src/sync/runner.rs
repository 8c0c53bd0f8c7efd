// src/sync/runner.rs

//! Batch runner
//!
//! One pass over every configured library: snapshot the items, resolve
//! overrides against the snapshot, then plan and apply each item in turn.
//! Fatal errors (the catalog going away) end the run; per-item write
//! failures are recorded in the report and the run moves on.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use crate::catalog::{Catalog, CatalogItem, ItemKind, LibraryKind, LibraryRef};
use crate::config::Config;
use crate::error::{Error, Result};

use super::overrides::Overrides;
use super::policy::Policy;
use super::reconcile::{FieldOp, WriteAction, plan_item};
use super::report::{ItemFailure, RunReport};

/// Options that change how a run applies its plan
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Log the plan without writing anything
    pub dry_run: bool,
}

/// Reconcile every configured library
pub fn run<C: Catalog>(
    catalog: &mut C,
    config: &Config,
    overrides: &Overrides,
    options: RunOptions,
) -> Result<RunReport> {
    let mut report = RunReport::new(options.dry_run);
    let policy = Policy::from_config(config);

    let libraries = resolve_libraries(catalog, config, &mut report)?;
    if libraries.is_empty() {
        return Err(Error::NoLibraries(config.libraries.join(", ")));
    }

    let mut items = Vec::new();
    let mut seen = HashSet::new();
    for library in &libraries {
        let before = items.len();
        for item in catalog.items(library)? {
            let item = item?;
            // Each item is planned and written once per run
            if seen.insert(item.guid.clone()) {
                items.push(item);
            } else {
                debug!("Skipping {} ({}), already listed", item, item.guid);
            }
        }
        debug!("Library {} has {} items", library.title, items.len() - before);
        report.libraries.push(library.title.clone());
    }
    items.sort_by(compare_items);
    report.items_seen = items.len();

    let forced = overrides.resolve(&items, &policy);
    let mut reported = HashSet::new();
    for uri in overrides.targets() {
        if !forced.matched.contains(uri.guid()) && reported.insert(uri.guid()) {
            let message = format!("Failed to locate item with GUID {}; ignoring", uri);
            warn!("{}", message);
            report.warn(message);
        }
    }

    for item in &items {
        let desired = forced.apply(item, policy.desired(&policy.classify(item)));
        let plan = plan_item(item, desired.values(), policy.markers());

        if plan.is_empty() {
            report.unchanged += 1;
            continue;
        }

        let outcome = apply_plan(catalog, item, &plan.actions, options, &mut report)?;
        if outcome.hid {
            report.hidden += 1;
        }
        if outcome.revealed {
            report.unhidden += 1;
        }
        if outcome.failed {
            report.failed += 1;
        }
    }

    report.finish();
    debug!("Run finished: {}", report);
    Ok(report)
}

/// Map configured library names onto the catalog's libraries
fn resolve_libraries<C: Catalog>(
    catalog: &C,
    config: &Config,
    report: &mut RunReport,
) -> Result<Vec<LibraryRef>> {
    let available = catalog.list_libraries()?;
    let mut resolved = Vec::new();

    for name in &config.libraries {
        let Some(library) = available.iter().find(|l| &l.title == name) else {
            let message = Error::LibraryNotFound(name.clone()).to_string();
            warn!("{}", message);
            report.warn(message);
            continue;
        };

        if let LibraryKind::Other(kind) = &library.kind {
            let message = format!(
                "Library {} is a {} library, not a movie or show library; skipping",
                name, kind
            );
            warn!("{}", message);
            report.warn(message);
            continue;
        }

        if resolved.iter().any(|r: &LibraryRef| r.key == library.key) {
            let message = format!("Library {} is listed more than once; processing it once", name);
            warn!("{}", message);
            report.warn(message);
            continue;
        }

        resolved.push(library.clone());
    }

    Ok(resolved)
}

/// Display order: episodes by show, season and episode, then movies by title and year
fn compare_items(a: &CatalogItem, b: &CatalogItem) -> Ordering {
    let rank = |item: &CatalogItem| match item.kind {
        ItemKind::Episode => 0,
        ItemKind::Movie => 1,
    };
    rank(a)
        .cmp(&rank(b))
        .then_with(|| a.show_title.cmp(&b.show_title))
        .then_with(|| a.season.cmp(&b.season))
        .then_with(|| a.episode.cmp(&b.episode))
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.year.cmp(&b.year))
        .then_with(|| a.guid.cmp(&b.guid))
}

#[derive(Debug, Default)]
struct ItemOutcome {
    hid: bool,
    revealed: bool,
    failed: bool,
}

fn apply_plan<C: Catalog>(
    catalog: &mut C,
    item: &CatalogItem,
    actions: &[WriteAction],
    options: RunOptions,
    report: &mut RunReport,
) -> Result<ItemOutcome> {
    let mut outcome = ItemOutcome::default();

    for action in actions {
        if options.dry_run {
            info!("Would {} for {}", action, item);
        } else {
            match apply_action(catalog, item, action) {
                Ok(()) => info!("{} for {}", action.done_description(), item),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!("Failed to {} for {}: {}", action, item, e);
                    let vanished = matches!(e, Error::ItemVanished(_));
                    record_failure(report, item, Some(action), e);
                    outcome.failed = true;
                    if vanished {
                        // Nothing left to write to, and nothing to refresh
                        return Ok(outcome);
                    }
                    continue;
                }
            }
        }

        if action.is_hide() {
            outcome.hid = true;
        } else {
            outcome.revealed = true;
        }
    }

    if outcome.revealed && !options.dry_run {
        match catalog.refresh_item(&item.key) {
            Ok(()) => debug!("Refreshed metadata for {}", item),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                error!("Failed to refresh metadata for {}: {}", item, e);
                record_failure(report, item, None, e);
                outcome.failed = true;
            }
        }
    }

    Ok(outcome)
}

fn apply_action<C: Catalog>(catalog: &mut C, item: &CatalogItem, action: &WriteAction) -> Result<()> {
    match &action.op {
        FieldOp::Hide { value, lock } => catalog.write_field(&item.key, action.kind, value, *lock),
        FieldOp::Reveal => catalog.write_field(&item.key, action.kind, "", false),
        FieldOp::Unlock => catalog.unlock_field(&item.key, action.kind),
    }
}

fn record_failure(report: &mut RunReport, item: &CatalogItem, action: Option<&WriteAction>, error: Error) {
    report.failures.push(ItemFailure {
        item: item.to_string(),
        guid: item.guid.clone(),
        field: action.map(|a| a.kind),
        error,
    });
}
