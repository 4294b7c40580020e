//! File-backed high-score persistence for the Slither workspace.
//!
//! The persisted state is a single integer in a plain text file. Reads
//! treat missing or corrupt files as a zero score; writes are logged and
//! swallowed on failure so the simulation never trips over disk trouble.

use slither_core::HighScoreStore;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors surfaced by the high-score file store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem failure while writing the score.
    #[error("high score write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Single-integer high score persisted as a plain text file.
#[derive(Debug, Clone)]
pub struct HighScoreFile {
    path: PathBuf,
}

impl HighScoreFile {
    /// Points the store at `path`; the file is created on first record.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path backing this store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted score; missing or corrupt files read as zero.
    #[must_use]
    pub fn read(&self) -> u32 {
        match fs::read_to_string(&self.path) {
            Ok(raw) => raw.trim().parse().unwrap_or(0),
            Err(_) => 0,
        }
    }

    /// Writes `score`, replacing any previous value.
    pub fn write(&self, score: u32) -> Result<(), StorageError> {
        fs::write(&self.path, score.to_string())?;
        Ok(())
    }
}

impl HighScoreStore for HighScoreFile {
    fn load(&mut self) -> u32 {
        self.read()
    }

    fn record(&mut self, score: u32) {
        if let Err(error) = self.write(score) {
            warn!(%error, path = %self.path.display(), "failed to persist high score");
        }
    }
}
