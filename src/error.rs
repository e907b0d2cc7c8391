//! Error kinds for the indexer and query engine.
//!
//! Mirrors the policy table: most kinds here are logged and skipped by
//! the caller rather than propagated — only [`IndexError::Persist`] and
//! [`QueryError::FatalStartup`] are meant to actually abort a process.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("required index file missing or unreadable: {path}: {source}")]
    FatalStartup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
