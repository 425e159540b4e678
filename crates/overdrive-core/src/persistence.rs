//! Storage for the single "last score" value.
//!
//! The simulation writes the score of the finished playthrough when a
//! restart is requested and reads it back on startup. Where it lives is up
//! to the host; two stores are provided:
//!
//! - [`MemoryScoreStore`]: in-process, for tests and embedding.
//! - [`JsonFileScoreStore`]: a small JSON document on disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Reads and writes the last score.
pub trait ScoreStore {
    /// Returns the stored score, or `None` if nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read.
    fn load_last_score(&self) -> Result<Option<u32>, PersistenceError>;

    /// Replaces the stored score.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn save_last_score(&mut self, score: u32) -> Result<(), PersistenceError>;
}

/// In-memory store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryScoreStore {
    last_score: Option<u32>,
}

impl MemoryScoreStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load_last_score(&self) -> Result<Option<u32>, PersistenceError> {
        Ok(self.last_score)
    }

    fn save_last_score(&mut self, score: u32) -> Result<(), PersistenceError> {
        self.last_score = Some(score);
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ScoreDocument {
    last_score: u32,
}

/// Store backed by a JSON file such as `{"last_score": 42}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileScoreStore {
    path: PathBuf,
}

impl JsonFileScoreStore {
    /// Creates a store at `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonFileScoreStore {
    fn load_last_score(&self) -> Result<Option<u32>, PersistenceError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let doc: ScoreDocument = serde_json::from_str(&text)?;
        Ok(Some(doc.last_score))
    }

    fn save_last_score(&mut self, score: u32) -> Result<(), PersistenceError> {
        let text = serde_json::to_string(&ScoreDocument { last_score: score })?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}
