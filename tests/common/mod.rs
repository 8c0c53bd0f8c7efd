// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use hide_spoilers::catalog::{CatalogItem, MemoryCatalog};
use hide_spoilers::config::Config;
use hide_spoilers::sync::{Overrides, RunOptions, RunReport, run};

pub const SUMMARY_MARKER: &str = "Summary hidden";
pub const TITLE_MARKER: &str = "Title hidden";

/// Summaries only, over the given libraries
pub fn summary_config(libraries: &[&str]) -> Config {
    Config::new("http://127.0.0.1:32400", "test-token", libraries, SUMMARY_MARKER)
}

/// Summaries, titles and thumbnails
pub fn full_config(libraries: &[&str]) -> Config {
    let mut config = summary_config(libraries);
    config.hide_titles = true;
    config.hidden_title_string = Some(TITLE_MARKER.to_string());
    config.hide_thumbnails = true;
    config.process_thumbnails = true;
    config
}

/// An unwatched episode with real metadata
pub fn episode(key: &str, show: &str, season: u32, number: u32, title: &str) -> CatalogItem {
    let mut ep = CatalogItem::episode(format!("plex://episode/{key}"), key, show);
    ep.season = Some(season);
    ep.episode = Some(number);
    ep.title = title.to_string();
    ep.summary = format!("What happens in {title}.");
    ep.thumbnail = format!("/library/metadata/{key}/thumb/1");
    ep.fallback_thumbnail = Some("/library/metadata/1/thumb/1".to_string());
    ep
}

/// An unwatched movie with real metadata
pub fn movie(key: &str, title: &str, year: u32) -> CatalogItem {
    let mut movie = CatalogItem::movie(format!("plex://movie/{key}"), key, title);
    movie.year = Some(year);
    movie.summary = format!("The plot of {title}.");
    movie.thumbnail = format!("/library/metadata/{key}/thumb/1");
    movie
}

/// A TV library with three unwatched episodes of one show (keys 101-103)
pub fn tv_catalog() -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    catalog.insert("TV Shows", episode("101", "Lost", 1, 1, "Pilot"));
    catalog.insert("TV Shows", episode("102", "Lost", 1, 2, "Tabula Rasa"));
    catalog.insert("TV Shows", episode("103", "Lost", 1, 3, "Walkabout"));
    catalog
}

/// Run one pass with default options, panicking on a fatal error
pub fn run_once(catalog: &mut MemoryCatalog, config: &Config, overrides: &Overrides) -> RunReport {
    run(catalog, config, overrides, RunOptions::default()).unwrap()
}
