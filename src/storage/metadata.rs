//! Append-only metadata document with full-rewrite persistence

use crate::model::ItemRecord;
use crate::output::MetadataStatistics;
use crate::storage::traits::StorageResult;
use crate::storage::{read_json, write_json_atomic};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// In-memory list of item records mirrored to a JSON document
///
/// Every [`append`](MetadataStore::append) rewrites the whole document, so
/// a record is durable before the crawler moves on. The in-memory list is
/// the source of truth: if a write fails, the next append rewrites
/// everything again.
#[derive(Debug)]
pub struct MetadataStore {
    path: PathBuf,
    records: Vec<ItemRecord>,
    detail_urls: HashSet<String>,
}

impl MetadataStore {
    /// Creates an empty store backed by `path`
    ///
    /// Nothing is read or written until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
            detail_urls: HashSet::new(),
        }
    }

    /// Replaces the in-memory records with the document on disk
    ///
    /// Used only when resuming. A missing or unreadable document yields an
    /// empty list. Returns the number of records loaded.
    pub fn load_existing(&mut self) -> usize {
        let records = match read_json::<Vec<ItemRecord>>(&self.path) {
            Ok(records) => records.unwrap_or_default(),
            Err(e) => {
                tracing::error!("Could not load previous metadata: {}", e);
                Vec::new()
            }
        };

        self.detail_urls = records.iter().map(|r| r.detail_url.clone()).collect();
        self.records = records;
        self.records.len()
    }

    /// Appends a record and rewrites the document
    ///
    /// The record is kept in memory even when the write fails.
    pub fn append(&mut self, record: ItemRecord) -> StorageResult<()> {
        self.detail_urls.insert(record.detail_url.clone());
        self.records.push(record);
        self.save()
    }

    /// Rewrites the full document from memory
    pub fn save(&self) -> StorageResult<()> {
        write_json_atomic(&self.path, &self.records)?;
        tracing::info!("Metadata saved ({} builds)", self.records.len());
        Ok(())
    }

    /// Returns true if a record with this detail URL is already stored
    pub fn contains(&self, detail_url: &str) -> bool {
        self.detail_urls.contains(detail_url)
    }

    pub fn records(&self) -> &[ItemRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Aggregate view over the stored records
    pub fn stats(&self) -> MetadataStatistics {
        MetadataStatistics::from_records(&self.records)
    }
}
