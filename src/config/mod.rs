// src/config/mod.rs

//! Configuration loading
//!
//! Settings live in `config.toml`. Unless a path is given explicitly, the file
//! is looked up next to the executable and then in its parent directory.
//!
//! # Example config.toml
//!
//! ```toml
//! plex_url = "http://192.168.1.10:32400"
//! plex_token = "abcdef123456"
//! libraries = ["TV Shows", "Movies"]
//!
//! hide_summaries = true
//! hide_titles = true
//! hide_thumbnails = true
//! process_thumbnails = true
//!
//! hidden_summary_string = "(Summary hidden)"
//! hidden_title_string = "(Title hidden)"
//! lock_edited_fields = true
//!
//! ignored_items = """
//! Friends
//! The Office
//! """
//! ```

pub mod parser;

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use parser::RawConfig;

/// File name searched for when no path is given
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Values shipped in the sample configuration, rejected as unedited
const PLACEHOLDER_URL: &str = "http://192.168.x.x:32400";
const PLACEHOLDER_TOKEN: &str = "...";

/// Validated configuration
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub plex_url: String,
    pub plex_token: String,
    pub libraries: Vec<String>,
    pub hide_summaries: bool,
    pub hide_titles: bool,
    pub hide_thumbnails: bool,
    pub process_thumbnails: bool,
    pub hidden_summary_string: Option<String>,
    pub hidden_title_string: Option<String>,
    pub lock_edited_fields: bool,
    pub ignored_items: Vec<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("plex_url", &self.plex_url)
            .field("plex_token", &"<redacted>")
            .field("libraries", &self.libraries)
            .field("hide_summaries", &self.hide_summaries)
            .field("hide_titles", &self.hide_titles)
            .field("hide_thumbnails", &self.hide_thumbnails)
            .field("process_thumbnails", &self.process_thumbnails)
            .field("hidden_summary_string", &self.hidden_summary_string)
            .field("hidden_title_string", &self.hidden_title_string)
            .field("lock_edited_fields", &self.lock_edited_fields)
            .field("ignored_items", &self.ignored_items)
            .finish()
    }
}

impl Config {
    /// Configuration with the file defaults: summaries hidden, fields locked
    pub fn new(plex_url: &str, plex_token: &str, libraries: &[&str], summary_marker: &str) -> Self {
        Self {
            plex_url: plex_url.to_string(),
            plex_token: plex_token.to_string(),
            libraries: libraries.iter().map(|l| l.to_string()).collect(),
            hide_summaries: true,
            hide_titles: false,
            hide_thumbnails: false,
            process_thumbnails: false,
            hidden_summary_string: Some(summary_marker.to_string()),
            hidden_title_string: None,
            lock_edited_fields: true,
            ignored_items: Vec::new(),
        }
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawConfig =
            toml::from_str(text).map_err(|e| Error::ConfigInvalid(e.to_string()))?;
        Self::from_raw(raw)
    }

    /// Read, parse and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Err(Error::ConfigInvalid(format!(
                "{} is a directory; --config-path should point to the configuration file itself",
                path.display()
            )));
        }

        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::ConfigNotFound(format!(
                "{}; do you need to copy config_sample.toml to config.toml and edit it?",
                path.display()
            )),
            _ => Error::ConfigUnreadable(format!("{}: {e}", path.display())),
        })?;

        debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&text).map_err(|e| match e {
            Error::ConfigInvalid(msg) => Error::ConfigInvalid(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        for key in raw.unknown.keys() {
            warn!("Unknown setting \"{}\" in config.toml, ignoring", key);
        }

        let plex_url = required(raw.plex_url, "plex_url")?;
        let plex_token = required(raw.plex_token, "plex_token")?;
        if raw.libraries.iter().all(|l| l.trim().is_empty()) {
            return Err(Error::ConfigMissing("libraries".to_string()));
        }

        if plex_url == PLACEHOLDER_URL || plex_token == PLACEHOLDER_TOKEN {
            return Err(Error::ConfigInvalid(
                "plex_url and plex_token still have their sample values; edit config.toml to match your server".to_string(),
            ));
        }
        Url::parse(&plex_url)
            .map_err(|e| Error::ConfigInvalid(format!("plex_url {plex_url} is not a valid URL: {e}")))?;

        if raw.hide_summaries && raw.hidden_summary_string.is_none() {
            return Err(Error::ConfigMissing("hidden_summary_string".to_string()));
        }
        if raw.hide_titles && raw.hidden_title_string.is_none() {
            return Err(Error::ConfigMissing("hidden_title_string".to_string()));
        }
        if raw.hide_thumbnails && !raw.process_thumbnails {
            warn!("hide_thumbnails is set but process_thumbnails is not; thumbnails will not be touched");
        }

        Ok(Self {
            plex_url,
            plex_token,
            libraries: raw
                .libraries
                .into_iter()
                .filter(|l| !l.trim().is_empty())
                .collect(),
            hide_summaries: raw.hide_summaries,
            hide_titles: raw.hide_titles,
            hide_thumbnails: raw.hide_thumbnails,
            process_thumbnails: raw.process_thumbnails,
            hidden_summary_string: raw.hidden_summary_string,
            hidden_title_string: raw.hidden_title_string,
            lock_edited_fields: raw.lock_edited_fields,
            ignored_items: raw.ignored_items.into_entries(),
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::ConfigMissing(name.to_string())),
    }
}

/// Directories searched when no explicit path is given: the executable's
/// directory, then its parent
pub fn default_search_dirs() -> Vec<PathBuf> {
    let Ok(exe) = std::env::current_exe() else {
        return Vec::new();
    };
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent()
        .map(|dir| {
            let mut dirs = vec![dir.to_path_buf()];
            if let Some(parent) = dir.parent() {
                dirs.push(parent.to_path_buf());
            }
            dirs
        })
        .unwrap_or_default()
}

/// Pick the configuration file to load
pub fn resolve_config_path(explicit: Option<&Path>, search_dirs: &[PathBuf]) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    search_dirs
        .iter()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            let looked_in: Vec<String> = search_dirs
                .iter()
                .map(|d| format!("\"{}\"", d.display()))
                .collect();
            Error::ConfigNotFound(format!(
                "{CONFIG_FILE_NAME} not found; looked in {}. Do you need to copy config_sample.toml to config.toml and edit it?",
                looked_in.join(" and ")
            ))
        })
}

/// Resolve and load the configuration in one step
pub fn load_config(explicit: Option<&Path>) -> Result<(PathBuf, Config)> {
    let path = resolve_config_path(explicit, &default_search_dirs())?;
    let config = Config::load(&path)?;
    Ok((path, config))
}
