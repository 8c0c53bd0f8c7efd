// src/error.rs

//! Crate-wide error type
//!
//! Fatal errors (configuration, connectivity, no usable library) abort a run.
//! Per-item errors (`ItemWriteError`, `ItemVanished`) are collected into the
//! run report instead of being propagated.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(String),

    #[error("Configuration file invalid: {0}")]
    ConfigInvalid(String),

    #[error("Unable to read configuration file: {0}")]
    ConfigUnreadable(String),

    #[error("No {0} specified in config.toml")]
    ConfigMissing(String),

    #[error("Unable to connect to Plex server: {0}")]
    ConnectivityError(String),

    #[error("Plex library {0} not found")]
    LibraryNotFound(String),

    #[error("None of the configured libraries could be used: {0}")]
    NoLibraries(String),

    #[error("Failed to {action} for {item}: {reason}")]
    ItemWriteError {
        item: String,
        action: String,
        reason: String,
    },

    #[error("Item {0} no longer exists on the server")]
    ItemVanished(String),

    #[error("Unexpected response from Plex: {0}")]
    ParseError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

impl Error {
    /// Errors that end the run instead of being recorded against one item
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::LibraryNotFound(_) | Error::ItemWriteError { .. } | Error::ItemVanished(_)
        )
    }

    /// Process exit code for a fatal error
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::ConfigNotFound(_) => 1,
            Error::ConfigInvalid(_) => 2,
            Error::ConfigUnreadable(_) => 4,
            Error::ConfigMissing(_) => 8,
            Error::ConnectivityError(_) | Error::InitError(_) | Error::ParseError(_) => 16,
            Error::NoLibraries(_) => 32,
            Error::LibraryNotFound(_) | Error::ItemWriteError { .. } | Error::ItemVanished(_) => 64,
        }
    }
}

/// Result type for hide-spoilers operations
pub type Result<T> = std::result::Result<T, Error>;
