//! Typed records produced while walking the catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Absolute URL of a category listing page
///
/// Derived from the home page on every run and never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryRef(Url);

impl CategoryRef {
    pub fn new(url: Url) -> Self {
        Self(url)
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CategoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// An item as listed on a category page
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSummary {
    pub title: String,
    /// Detail page URL; unique key of the item
    pub detail_url: Url,
    pub category_url: String,
    pub discovered_at: DateTime<Utc>,
}

/// Tags and image references read from an item's detail page
///
/// Either field may be empty; whether the item is kept is decided by
/// [`ItemDetail::discard_reasons`], not by the parser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDetail {
    pub tags: BTreeSet<String>,
    pub image_refs: Vec<Url>,
}

impl ItemDetail {
    /// Lists every reason this item cannot become an [`ItemRecord`]
    ///
    /// Missing tags and missing images are reported independently, so an
    /// item lacking both yields two reasons.
    pub fn discard_reasons(&self) -> Vec<DiscardReason> {
        let mut reasons = Vec::new();
        if self.image_refs.is_empty() {
            reasons.push(DiscardReason::MissingImages);
        }
        if self.tags.is_empty() {
            reasons.push(DiscardReason::MissingTags);
        }
        reasons
    }
}

/// Why an item was not turned into a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiscardReason {
    #[error("no tags found on detail page")]
    MissingTags,

    #[error("no images found on detail page")]
    MissingImages,

    #[error("none of the referenced images could be stored")]
    NoImagesStored,
}

/// A fully enriched item as persisted in the metadata document
///
/// Field names on disk match the historical `builds_metadata.json` layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub title: String,

    #[serde(rename = "build_url")]
    pub detail_url: String,

    pub category_url: String,

    #[serde(rename = "scraped_at")]
    pub discovered_at: DateTime<Utc>,

    pub tags: BTreeSet<String>,

    #[serde(rename = "image_urls")]
    pub image_refs: Vec<String>,

    pub local_image_paths: Vec<String>,

    #[serde(rename = "images_count")]
    pub image_count: usize,

    #[serde(rename = "build_directory")]
    pub storage_dir: String,
}

impl ItemRecord {
    /// Builds a record from its parts
    ///
    /// Fails unless the item has at least one tag, at least one image
    /// reference and at least one image stored on disk.
    pub fn assemble(
        summary: ItemSummary,
        detail: ItemDetail,
        storage_dir: &Path,
        local_image_paths: Vec<PathBuf>,
    ) -> Result<Self, DiscardReason> {
        if let Some(reason) = detail.discard_reasons().into_iter().next() {
            return Err(reason);
        }
        if local_image_paths.is_empty() {
            return Err(DiscardReason::NoImagesStored);
        }

        let local_image_paths: Vec<String> = local_image_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();

        Ok(Self {
            title: summary.title,
            detail_url: summary.detail_url.to_string(),
            category_url: summary.category_url,
            discovered_at: summary.discovered_at,
            tags: detail.tags,
            image_refs: detail.image_refs.iter().map(Url::to_string).collect(),
            image_count: local_image_paths.len(),
            local_image_paths,
            storage_dir: storage_dir.display().to_string(),
        })
    }
}
