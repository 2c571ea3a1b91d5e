//! Durable traversal cursor and the resume position derived from it
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Position of the last fully attempted item of an interrupted run
///
/// Serialized with the historical `checkpoint.json` key names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunCheckpoint {
    /// Index of the category being processed
    #[serde(rename = "current_category_idx")]
    pub category_cursor: usize,

    /// Index (within the category) of the last attempted item
    #[serde(rename = "current_build_idx")]
    pub item_cursor: usize,

    /// Number of categories discovered by the run that wrote the checkpoint
    #[serde(rename = "total_categories")]
    pub category_count: usize,

    /// Records in the metadata document when the checkpoint was written
    #[serde(rename = "total_builds_processed")]
    pub items_persisted: usize,

    #[serde(rename = "timestamp")]
    pub saved_at: DateTime<Utc>,
}

impl RunCheckpoint {
    pub fn new(
        category_cursor: usize,
        item_cursor: usize,
        category_count: usize,
        items_persisted: usize,
    ) -> Self {
        Self {
            category_cursor,
            item_cursor,
            category_count,
            items_persisted,
            saved_at: Utc::now(),
        }
    }

    /// The `(category, item)` cursor pair, ordered lexicographically
    pub fn position(&self) -> (usize, usize) {
        (self.category_cursor, self.item_cursor)
    }
}

/// Where a run starts, derived from an optional checkpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResumePoint {
    /// First category to process
    pub category: usize,

    /// Items before this index in `category` are skipped
    ///
    /// The cursor item itself is re-attempted: it may have failed, or the
    /// cursor may come from a failed category listing that never reached it.
    /// A record stored for it is caught by the metadata dedupe instead.
    pub item_cursor: Option<usize>,
}

impl ResumePoint {
    /// A run with no prior progress
    pub fn fresh() -> Self {
        Self::default()
    }

    pub fn from_checkpoint(checkpoint: Option<&RunCheckpoint>) -> Self {
        match checkpoint {
            Some(cp) => Self {
                category: cp.category_cursor,
                item_cursor: Some(cp.item_cursor),
            },
            None => Self::fresh(),
        }
    }

    /// Returns true if a previous run moved past this item
    pub fn is_behind_cursor(&self, category: usize, item: usize) -> bool {
        match self.item_cursor {
            Some(cursor) => category == self.category && item < cursor,
            None => false,
        }
    }
}
