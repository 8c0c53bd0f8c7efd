// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Repeatable item reference argument
fn item_uri_arg(id: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(long)
        .value_name("URI")
        .action(ArgAction::Append)
        .help(help)
}

fn flag(id: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(long).action(ArgAction::SetTrue).help(help)
}

fn build_cli() -> Command {
    Command::new("hide-spoilers")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Hide spoilers for unwatched episodes and movies on a Plex server")
        .long_about(
            "Hide summaries, titles and thumbnails of unwatched episodes and movies on a \
             Plex Media Server, and restore them once watched. Hidden fields hold a \
             configured marker string; a field is restored only while it still holds \
             that marker, so hand-edited metadata is never touched.",
        )
        .arg(
            flag("verbose", "verbose", "Print debug messages")
                .short('v')
                .conflicts_with("quiet"),
        )
        .arg(flag("quiet", "quiet", "Only print warnings, errors and the final summary").short('q'))
        .arg(flag("dry_run", "dry-run", "Show what would change without editing anything"))
        .arg(
            Arg::new("config_path")
                .long("config-path")
                .value_name("PATH")
                .help("Path to config.toml (default: next to the executable, then its parent)"),
        )
        .arg(
            flag("restore_all", "restore-all", "Restore every hidden field in every configured library")
                .conflicts_with_all(["also_hide", "also_unhide"]),
        )
        .arg(item_uri_arg(
            "also_hide",
            "also-hide",
            "Also hide this item, even if watched or ignored (e.g. plex://episode/5d9c...)",
        ))
        .arg(item_uri_arg(
            "also_unhide",
            "also-unhide",
            "Also unhide this item, even if unwatched (e.g. plex://episode/5d9c...)",
        ))
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("hide-spoilers.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
