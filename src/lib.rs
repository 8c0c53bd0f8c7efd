// src/lib.rs

//! hide-spoilers
//!
//! Hides spoiler-bearing metadata (summaries, titles, thumbnails) of unwatched
//! episodes and movies on a Plex Media Server, and restores it once watched.
//!
//! # Architecture
//!
//! - Stateless: the marker string in a field is the only record of a hide
//! - Per-field state machine: every run diffs desired against observed state
//! - Catalog trait: the engine never talks HTTP directly
//! - Overrides resolved as a separate pass over a library snapshot

pub mod catalog;
pub mod config;
mod error;
pub mod sync;

pub use error::{Error, Result};
