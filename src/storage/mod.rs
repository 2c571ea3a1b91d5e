//! Storage module for persisting crawl data
//!
//! This module handles the two files a run owns:
//! - the metadata document, rewritten in full after every appended record
//! - the checkpoint, rewritten after every item attempt and removed when
//!   the traversal completes
//!
//! Both are written through [`write_json_atomic`]. Reads fail soft: a
//! missing or corrupt file is treated as absent.

mod checkpoint;
mod metadata;
mod traits;

pub use checkpoint::CheckpointStore;
pub use metadata::MetadataStore;
pub use traits::{StorageError, StorageResult};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Serializes `value` as pretty-printed JSON and replaces `path` with it
///
/// The document is written to a sibling `.tmp` file first and renamed over
/// the destination, so readers never observe a half-written file.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let encoded =
        serde_json::to_vec_pretty(value).map_err(|e| StorageError::serialization(path, e))?;

    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, encoded).map_err(|e| StorageError::io(&tmp_path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| StorageError::io(path, e))?;

    Ok(())
}

/// Reads a JSON document, returning `Ok(None)` if the file does not exist
pub fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let content = match std::fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::io(path, e)),
    };

    serde_json::from_slice(&content)
        .map(Some)
        .map_err(|e| StorageError::serialization(path, e))
}
