//! Single-slot checkpoint file
//!
//! Holds the `place_id` of the last document whose batch was committed. The
//! file is plain text so an operator can inspect or edit it by hand.

use placeload_common::{PlaceloadError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Suffix appended to the input file's base name.
pub const CHECKPOINT_SUFFIX: &str = "_progress.txt";

/// Durable record of the last committed natural key
#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
    current: Option<String>,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: None,
        }
    }

    /// Checkpoint location for an input file: the file stem (name without
    /// its last extension) plus [`CHECKPOINT_SUFFIX`], in the same directory.
    ///
    /// `data/places.2024.csv` -> `data/places.2024_progress.txt`
    pub fn derive_path(input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        input.with_file_name(format!("{}{}", stem, CHECKPOINT_SUFFIX))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Key held in memory for this run (last successful `advance`, or the
    /// value loaded at startup)
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Read the persisted key. A missing or blank file means "start from the
    /// beginning"; any other read failure is fatal.
    pub fn read(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let key = contents.trim();
                Ok((!key.is_empty()).then(|| key.to_string()))
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PlaceloadError::Checkpoint(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Read the persisted key and remember it as the in-memory value
    pub fn load(&mut self) -> Result<Option<String>> {
        let key = self.read()?;
        self.current = key.clone();
        Ok(key)
    }

    /// Replace the file contents with `key`.
    ///
    /// Writes a sibling temp file and renames it over the checkpoint so a
    /// crash mid-write never leaves a truncated key behind.
    pub fn write(&self, key: &str) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, key)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Advance the checkpoint after a successful commit.
    ///
    /// The in-memory value always moves forward. Persisting is best effort: a
    /// failure is logged and reported through the return value, never raised.
    pub fn advance(&mut self, key: &str) -> bool {
        self.current = Some(key.to_string());

        match self.write(key) {
            Ok(()) => {
                debug!(path = %self.path.display(), key, "Checkpoint written");
                true
            },
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    key,
                    error = %e,
                    "Failed to persist checkpoint; a restart may re-process committed rows"
                );
                false
            },
        }
    }
}
