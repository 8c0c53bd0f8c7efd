// src/cli/mod.rs
//! CLI definitions for hide-spoilers
//!
//! With no arguments the tool reconciles every configured library. The
//! override flags adjust that run rather than selecting a different command:
//! - `--also-unhide` / `--also-hide` - force specific items visible or hidden
//! - `--restore-all` - put back every field ever hidden
//!
//! The implementation lives in the `commands` module.

use std::path::PathBuf;

use clap::Parser;

use hide_spoilers::sync::{ItemUri, Overrides};

#[derive(Parser, Debug)]
#[command(name = "hide-spoilers")]
#[command(version)]
#[command(about = "Hide spoilers for unwatched episodes and movies on a Plex server")]
#[command(long_about = "Hide summaries, titles and thumbnails of unwatched episodes and \
    movies on a Plex Media Server, and restore them once watched.\n\n\
    Run it on a schedule, or from a Tautulli trigger on play/watched events.")]
pub struct Cli {
    /// Print debug messages
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print warnings, errors and the final summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Print trace-level messages, including HTTP traffic
    #[arg(long, hide = true)]
    pub debug: bool,

    /// Show what would change without editing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Path to config.toml (default: next to the executable, then its parent)
    #[arg(long, value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    /// Restore every hidden field in every configured library
    #[arg(long, conflicts_with_all = ["also_hide", "also_unhide"])]
    pub restore_all: bool,

    /// Also hide this item, even if watched or ignored (e.g. plex://episode/5d9c...)
    #[arg(long, value_name = "URI")]
    pub also_hide: Vec<ItemUri>,

    /// Also unhide this item, even if unwatched (e.g. plex://episode/5d9c...)
    #[arg(long, value_name = "URI")]
    pub also_unhide: Vec<ItemUri>,
}

impl Cli {
    /// Overrides requested on the command line
    pub fn overrides(&self) -> Overrides {
        Overrides {
            restore_all: self.restore_all,
            also_unhide: self.also_unhide.clone(),
            also_hide: self.also_hide.clone(),
        }
    }

    /// Default log filter for the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "trace"
        } else if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}
