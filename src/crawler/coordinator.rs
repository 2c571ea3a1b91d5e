//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the harvesting process, including:
//! - Restoring the traversal position from a checkpoint
//! - Discovering categories from the home page
//! - Walking every category's item listing in order
//! - Enriching each item from its detail page and storing its images
//! - Persisting records and the checkpoint after every item

use crate::config::{validate, Config};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::images::ImageAcquirer;
use crate::crawler::parser::{GrabCraftParser, PageParser};
use crate::model::{item_slug, CategoryRef, DiscardReason, ItemRecord, ItemSummary};
use crate::state::{ResumePoint, RunOutcome, RunSummary};
use crate::storage::{CheckpointStore, MetadataStore};
use crate::{HarvestError, Result};
use std::path::PathBuf;
use url::Url;

/// What happened to a single attempted item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// A record was appended with this many stored images
    Stored { images: usize },

    /// The item was rejected; no record was written
    Discarded(DiscardReason),
}

/// Main crawler coordinator structure
///
/// Owns every piece of run state. Nothing is shared between runs except the
/// files under the output root.
pub struct Coordinator<P: PageParser = GrabCraftParser> {
    config: Config,
    base_url: Url,
    parser: P,
    fetcher: PageFetcher,
    images: ImageAcquirer,
    metadata: MetadataStore,
    checkpoints: CheckpointStore,
    images_dir: PathBuf,
}

impl Coordinator<GrabCraftParser> {
    /// Creates a coordinator for grabcraft.com markup
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Output directories exist and the client is built
    /// * `Err(HarvestError)` - Failed to initialize
    pub fn new(config: Config) -> Result<Self> {
        Self::with_parser(config, GrabCraftParser::new()?)
    }
}

impl<P: PageParser> Coordinator<P> {
    /// Creates a coordinator with a custom page parser
    ///
    /// The configuration is validated again here since it may have been
    /// built in code rather than loaded from a file.
    pub fn with_parser(config: Config, parser: P) -> Result<Self> {
        validate(&config)?;
        let base_url = Url::parse(&config.site.base_url)?;

        let images_dir = config.output.images_path();
        let metadata_dir = config.output.metadata_dir_path();
        let checkpoint_path = config.output.checkpoint_path();

        std::fs::create_dir_all(&images_dir)?;
        std::fs::create_dir_all(&metadata_dir)?;
        if let Some(parent) = checkpoint_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let fetcher = PageFetcher::from_config(&config.crawler, &config.user_agent)?;

        Ok(Self {
            images: ImageAcquirer::new(fetcher.clone()),
            metadata: MetadataStore::new(config.output.metadata_path()),
            checkpoints: CheckpointStore::new(checkpoint_path),
            config,
            base_url,
            parser,
            fetcher,
            images_dir,
        })
    }

    /// Runs the harvest to completion, to the item budget, or until the
    /// site structure turns out to be unreadable
    ///
    /// Per-item and per-category failures are logged and counted, never
    /// returned: the summary is the only result.
    pub async fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();

        let checkpoint = if self.config.crawler.resume {
            self.checkpoints.load()
        } else {
            None
        };

        if let Some(cp) = &checkpoint {
            tracing::info!(
                "Resuming from checkpoint: category {}, build {}",
                cp.category_cursor,
                cp.item_cursor
            );
            summary.resumed_items = self.metadata.load_existing();
            tracing::info!("Loaded {} existing builds", summary.resumed_items);
        }
        let resume = ResumePoint::from_checkpoint(checkpoint.as_ref());

        let categories = match self.discover_categories().await {
            Ok(categories) => categories,
            Err(e) => {
                tracing::error!("Aborting run: {}", e);
                return RunSummary::aborted(e.to_string());
            }
        };

        let category_count = categories.len();
        let max_items = self.config.crawler.max_items_per_category;
        let mut attempted = 0usize;

        for (category_idx, category) in categories.iter().enumerate().skip(resume.category) {
            tracing::info!(
                "Processing category {}/{}: {}",
                category_idx + 1,
                category_count,
                category
            );

            let items = match self.list_items(category).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::error!("Error processing category {}: {}", category, e);
                    self.save_checkpoint(category_idx, 0, category_count);
                    continue;
                }
            };
            tracing::info!("Found {} builds in category", items.len());

            for (item_idx, item) in items.into_iter().enumerate() {
                if resume.is_behind_cursor(category_idx, item_idx) {
                    tracing::debug!("Skipping build {} (before checkpoint)", item_idx);
                    continue;
                }
                if self.metadata.contains(item.detail_url.as_str()) {
                    tracing::debug!("Skipping already stored build: {}", item.detail_url);
                    continue;
                }

                let title = item.title.clone();
                tracing::info!(
                    "Processing build {}/{}: {}",
                    item_idx + 1,
                    max_items,
                    title
                );

                let slug_index = category_idx.saturating_mul(max_items).saturating_add(item_idx);
                match self.process_item(item, slug_index).await {
                    Ok(ItemOutcome::Stored { images }) => {
                        tracing::info!("Stored build '{}' with {} images", title, images);
                        summary.record_success(images);
                    }
                    Ok(ItemOutcome::Discarded(reason)) => {
                        tracing::warn!("Discarded build '{}': {}", title, reason);
                        summary.record_discard();
                    }
                    Err(e) => {
                        tracing::error!("Error processing build '{}': {}", title, e);
                        summary.record_failure();
                    }
                }

                self.save_checkpoint(category_idx, item_idx, category_count);
                attempted += 1;

                if self
                    .config
                    .crawler
                    .stop_after_items
                    .is_some_and(|limit| attempted >= limit)
                {
                    tracing::info!(
                        "Item budget reached after {} builds; checkpoint kept for resume",
                        attempted
                    );
                    summary.outcome = RunOutcome::Stopped {
                        after_items: attempted,
                    };
                    summary.finalize();
                    return summary;
                }
            }
        }

        if let Err(e) = self.checkpoints.clear() {
            tracing::error!("Failed to clear checkpoint: {}", e);
        }

        summary.finalize();
        tracing::info!(
            "Scraping completed: {}/{} builds stored, {} images",
            summary.successful_items,
            summary.total_items,
            summary.total_images_downloaded
        );
        summary
    }

    /// Fetches the home page and returns at most `max-categories` links
    async fn discover_categories(&self) -> Result<Vec<CategoryRef>> {
        tracing::info!("Fetching categories from {}", self.base_url);

        let html = self.fetcher.fetch_text(self.base_url.as_str()).await?;
        let mut categories = self.parser.category_links(&html, &self.base_url)?;
        categories.truncate(self.config.crawler.max_categories);

        tracing::info!("Found {} categories", categories.len());
        Ok(categories)
    }

    /// Fetches a category listing and returns at most `max-items-per-category` items
    async fn list_items(&self, category: &CategoryRef) -> Result<Vec<ItemSummary>> {
        let html = self.fetcher.fetch_text(category.as_str()).await?;
        let mut items = self.parser.item_summaries(&html, category);
        items.truncate(self.config.crawler.max_items_per_category);
        Ok(items)
    }

    /// Enriches one item, stores its images and appends its record
    ///
    /// `slug_index` names the image directory; it only depends on the
    /// item's position so a retried item reuses its directory.
    async fn process_item(&mut self, item: ItemSummary, slug_index: usize) -> Result<ItemOutcome> {
        let html = self.fetcher.fetch_text(item.detail_url.as_str()).await?;
        let detail = self.parser.item_detail(&html, &item.detail_url);

        let reasons = detail.discard_reasons();
        for reason in &reasons {
            tracing::warn!("Build '{}' at {}: {}", item.title, item.detail_url, reason);
        }
        if let Some(&reason) = reasons.first() {
            return Ok(ItemOutcome::Discarded(reason));
        }

        let item_dir = self.images_dir.join(item_slug(slug_index, &item.title));
        std::fs::create_dir_all(&item_dir).map_err(HarvestError::Io)?;

        let stored = self.images.acquire_all(&detail.image_refs, &item_dir).await;
        let images = stored.len();

        let record = match ItemRecord::assemble(item, detail, &item_dir, stored) {
            Ok(record) => record,
            Err(reason) => return Ok(ItemOutcome::Discarded(reason)),
        };

        if let Err(e) = self.metadata.append(record) {
            tracing::error!("Failed to save metadata: {}", e);
        }

        Ok(ItemOutcome::Stored { images })
    }

    fn save_checkpoint(&self, category_idx: usize, item_idx: usize, category_count: usize) {
        if let Err(e) =
            self.checkpoints
                .save(category_idx, item_idx, category_count, self.metadata.len())
        {
            tracing::error!("Failed to save checkpoint: {}", e);
        }
    }

    /// Records persisted so far, including resumed ones
    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }
}

/// Runs a complete harvest with the default parser
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Create the output directories
/// 2. Restore the checkpoint of an interrupted run, if any
/// 3. Walk categories and items, persisting after every item
/// 4. Clear the checkpoint once the traversal completes
///
/// # Returns
///
/// * `Ok(RunSummary)` - The run ended (completed, stopped or aborted)
/// * `Err(HarvestError)` - The run could not be initialized
pub async fn run_crawl(config: Config) -> Result<RunSummary> {
    let mut coordinator = Coordinator::new(config)?;
    Ok(coordinator.run().await)
}
