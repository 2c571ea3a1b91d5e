//! Checkpoint file lifecycle: load, save, clear

use crate::state::RunCheckpoint;
use crate::storage::traits::{StorageError, StorageResult};
use crate::storage::{read_json, write_json_atomic};
use std::path::{Path, PathBuf};

/// Owns the checkpoint file of a run
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the checkpoint of an interrupted run
    ///
    /// Any read or parse error is logged and reported as "no checkpoint".
    pub fn load(&self) -> Option<RunCheckpoint> {
        match read_json::<RunCheckpoint>(&self.path) {
            Ok(checkpoint) => checkpoint,
            Err(e) => {
                tracing::warn!("Ignoring unreadable checkpoint: {}", e);
                None
            }
        }
    }

    /// Overwrites the checkpoint with the given cursor
    pub fn save(
        &self,
        category_cursor: usize,
        item_cursor: usize,
        category_count: usize,
        items_persisted: usize,
    ) -> StorageResult<RunCheckpoint> {
        let checkpoint =
            RunCheckpoint::new(category_cursor, item_cursor, category_count, items_persisted);
        write_json_atomic(&self.path, &checkpoint)?;
        tracing::debug!(
            "Checkpoint saved: category={}, item={}",
            category_cursor,
            item_cursor
        );
        Ok(checkpoint)
    }

    /// Removes the checkpoint; a missing file is not an error
    pub fn clear(&self) -> StorageResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Checkpoint cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(&self.path, e)),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}
