// src/commands/sync.rs

//! Reconciliation command
//!
//! Loads the configuration, connects to the server, runs one pass and prints
//! the summary. The summary goes to stdout so it survives `--quiet`.

use anyhow::Result;
use tracing::{debug, info};

use hide_spoilers::catalog::PlexClient;
use hide_spoilers::config::load_config;
use hide_spoilers::sync::{RunOptions, RunReport, run};

use crate::cli::Cli;

/// Run one reconciliation pass
pub fn cmd_sync(cli: &Cli) -> Result<()> {
    let (_, config) = load_config(cli.config_path.as_deref())?;
    debug!("{:?}", config);

    let overrides = cli.overrides();
    if overrides.restore_all {
        info!("Restoring all hidden fields");
    }

    let mut client = PlexClient::connect(&config.plex_url, &config.plex_token)?;
    let options = RunOptions {
        dry_run: cli.dry_run,
    };
    let report = run(&mut client, &config, &overrides, options)?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    if report.dry_run {
        println!("Dry run - no changes were made");
    }
    println!("{}", report);

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  ! {}", warning);
        }
    }

    if report.has_failures() {
        println!();
        println!("Failures ({}):", report.failures.len());
        for failure in &report.failures {
            println!("  - {}", failure);
        }
    }
}
