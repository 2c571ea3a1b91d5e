//! Statistics over a harvested metadata document
//!
//! This module provides functionality for summarizing stored item records
//! and displaying the result on the console.

use crate::model::ItemRecord;
use crate::storage::{read_json, StorageResult};
use std::collections::BTreeMap;
use std::path::Path;

/// Aggregate counts over stored item records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataStatistics {
    /// Number of stored records
    pub total_items: usize,

    /// Sum of `image_count` over all records
    pub total_images: usize,

    /// `total_images / total_items`, two decimals
    pub average_images_per_item: f64,

    /// Number of distinct tags
    pub unique_tags: usize,

    /// Tag frequency histogram (tag -> number of records carrying it)
    pub tags: BTreeMap<String, usize>,
}

impl MetadataStatistics {
    pub fn from_records(records: &[ItemRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let mut tags = BTreeMap::new();
        let mut total_images = 0;

        for record in records {
            total_images += record.image_count;
            for tag in &record.tags {
                *tags.entry(tag.clone()).or_insert(0) += 1;
            }
        }

        let average = total_images as f64 / records.len() as f64;

        Self {
            total_items: records.len(),
            total_images,
            average_images_per_item: (average * 100.0).round() / 100.0,
            unique_tags: tags.len(),
            tags,
        }
    }

    /// Tags sorted by descending frequency, ties broken alphabetically
    pub fn top_tags(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut sorted: Vec<(&str, usize)> =
            self.tags.iter().map(|(t, c)| (t.as_str(), *c)).collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        sorted.truncate(limit);
        sorted
    }
}

/// Loads statistics from a metadata document
///
/// Unlike resume loading, errors are surfaced: this backs the `--stats`
/// command where a broken file should be reported. A missing file yields
/// empty statistics.
pub fn load_statistics(path: &Path) -> StorageResult<MetadataStatistics> {
    let records: Vec<ItemRecord> = read_json(path)?.unwrap_or_default();
    Ok(MetadataStatistics::from_records(&records))
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &MetadataStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Total builds: {}", stats.total_items);
    println!("  Total images: {}", stats.total_images);
    println!(
        "  Average images per build: {:.2}",
        stats.average_images_per_item
    );
    println!("  Unique tags: {}", stats.unique_tags);
    println!();

    if !stats.tags.is_empty() {
        println!("Top Tags:");
        for (tag, count) in stats.top_tags(20) {
            let percentage = (count as f64 / stats.total_items as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", tag, count, percentage);
        }
    }
}
