use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Craft-Harvest
///
/// Every section and field has a default, so an empty file (or no file at
/// all) describes a crawl of the GrabCraft catalog into `data/raw`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Home page of the catalog; category links are discovered from it
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Fixed delay applied before every request (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Resume from an existing checkpoint when one is found
    #[serde(default = "default_resume")]
    pub resume: bool,

    /// Maximum number of categories taken from the home page
    #[serde(rename = "max-categories", default = "default_max_categories")]
    pub max_categories: usize,

    /// Maximum number of items processed per category
    #[serde(
        rename = "max-items-per-category",
        default = "default_max_items_per_category"
    )]
    pub max_items_per_category: usize,

    /// Stop after attempting this many items, leaving the checkpoint in place
    ///
    /// Unset means crawl until every category is exhausted.
    #[serde(rename = "stop-after-items", default)]
    pub stop_after_items: Option<usize>,
}

impl CrawlerConfig {
    /// The politeness delay as a [`Duration`]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// The request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            timeout_secs: default_timeout_secs(),
            resume: default_resume(),
            max_categories: default_max_categories(),
            max_items_per_category: default_max_items_per_category(),
            stop_after_items: None,
        }
    }
}

/// User agent configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: default_user_agent(),
        }
    }
}

/// Output layout configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory for everything the crawler writes
    #[serde(rename = "root-dir", default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Image directory, relative to the root
    #[serde(rename = "images-dir", default = "default_images_dir")]
    pub images_dir: String,

    /// Metadata directory, relative to the root
    #[serde(rename = "metadata-dir", default = "default_metadata_dir")]
    pub metadata_dir: String,

    /// Metadata document file name inside the metadata directory
    #[serde(rename = "metadata-file", default = "default_metadata_file")]
    pub metadata_file: String,

    /// Checkpoint file name, relative to the root
    #[serde(rename = "checkpoint-file", default = "default_checkpoint_file")]
    pub checkpoint_file: String,
}

impl OutputConfig {
    pub fn images_path(&self) -> PathBuf {
        self.root_dir.join(&self.images_dir)
    }

    pub fn metadata_dir_path(&self) -> PathBuf {
        self.root_dir.join(&self.metadata_dir)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.metadata_dir_path().join(&self.metadata_file)
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.root_dir.join(&self.checkpoint_file)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            images_dir: default_images_dir(),
            metadata_dir: default_metadata_dir(),
            metadata_file: default_metadata_file(),
            checkpoint_file: default_checkpoint_file(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.grabcraft.com".to_string()
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_resume() -> bool {
    true
}

fn default_max_categories() -> usize {
    100
}

fn default_max_items_per_category() -> usize {
    100
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_images_dir() -> String {
    "images".to_string()
}

fn default_metadata_dir() -> String {
    "metadata".to_string()
}

fn default_metadata_file() -> String {
    "builds_metadata.json".to_string()
}

fn default_checkpoint_file() -> String {
    "checkpoint.json".to_string()
}
