// src/config/parser.rs

//! Raw `config.toml` layout, before validation.

use serde::Deserialize;

fn default_true() -> bool {
    true
}

/// `ignored_items` may be written as an array or as a multi-line string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IgnoredItems {
    List(Vec<String>),
    Lines(String),
}

impl Default for IgnoredItems {
    fn default() -> Self {
        IgnoredItems::List(Vec::new())
    }
}

impl IgnoredItems {
    /// Flatten to one entry per name, dropping blank entries
    pub fn into_entries(self) -> Vec<String> {
        let entries: Vec<String> = match self {
            IgnoredItems::List(list) => list,
            IgnoredItems::Lines(text) => text.lines().map(str::to_string).collect(),
        };
        entries
            .into_iter()
            .filter(|entry| !entry.trim().is_empty())
            .collect()
    }
}

/// Settings exactly as they appear in the file
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub plex_url: Option<String>,

    #[serde(default)]
    pub plex_token: Option<String>,

    #[serde(default)]
    pub libraries: Vec<String>,

    #[serde(default = "default_true")]
    pub hide_summaries: bool,

    #[serde(default)]
    pub hide_titles: bool,

    #[serde(default)]
    pub hide_thumbnails: bool,

    #[serde(default)]
    pub process_thumbnails: bool,

    #[serde(default)]
    pub hidden_summary_string: Option<String>,

    #[serde(default)]
    pub hidden_title_string: Option<String>,

    #[serde(default = "default_true")]
    pub lock_edited_fields: bool,

    #[serde(default)]
    pub ignored_items: IgnoredItems,

    /// Anything else; reported as a warning
    #[serde(flatten)]
    pub unknown: toml::Table,
}
