// src/commands/mod.rs
//! Command handlers for the hide-spoilers CLI

mod sync;

pub use sync::cmd_sync;
