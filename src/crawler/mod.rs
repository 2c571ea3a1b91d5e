//! Crawler module for catalog traversal
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with a fixed politeness delay
//! - HTML parsing of home, category and detail pages
//! - Image download and JPEG normalization
//! - Overall crawl coordination with checkpointed resume

mod coordinator;
mod fetcher;
mod images;
mod parser;

pub use coordinator::{run_crawl, Coordinator, ItemOutcome};
pub use fetcher::{build_http_client, FetchError, PageFetcher};
pub use images::{ImageAcquirer, ImageError, ImageOutcome, JPEG_QUALITY};
pub use parser::{GrabCraftParser, PageParser, ParseError, UNKNOWN_TITLE};
