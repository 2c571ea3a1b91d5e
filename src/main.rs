//! Craft-Harvest main entry point
//!
//! This is the command-line interface for the Craft-Harvest catalog harvester.

use anyhow::Context;
use clap::Parser;
use craft_harvest::config::{load_config_with_hash, Config};
use craft_harvest::crawler::run_crawl;
use craft_harvest::RunOutcome;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Craft-Harvest: a resumable catalog harvester
///
/// Craft-Harvest walks a build catalog category by category, stores the
/// images of every build as JPEG files and keeps a JSON metadata document.
/// An interrupted run resumes from its checkpoint.
#[derive(Parser, Debug)]
#[command(name = "craft-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start a fresh crawl, ignoring any checkpoint
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the metadata document and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Override the maximum number of categories
    #[arg(long, value_name = "N")]
    max_categories: Option<usize>,

    /// Override the maximum number of builds per category
    #[arg(long, value_name = "N")]
    max_items: Option<usize>,

    /// Stop after attempting N builds, keeping the checkpoint
    #[arg(long, value_name = "N")]
    stop_after: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    apply_overrides(&mut config, &cli);
    craft_harvest::config::validate(&config).context("Invalid command-line overrides")?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("craft_harvest=info,warn"),
            1 => EnvFilter::new("craft_harvest=debug,info"),
            2 => EnvFilter::new("craft_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if cli.fresh {
        config.crawler.resume = false;
    }
    if let Some(n) = cli.max_categories {
        config.crawler.max_categories = n;
    }
    if let Some(n) = cli.max_items {
        config.crawler.max_items_per_category = n;
    }
    if cli.stop_after.is_some() {
        config.crawler.stop_after_items = cli.stop_after;
    }
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Craft-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);

    println!("\nCrawler Configuration:");
    println!("  Delay: {}ms", config.crawler.delay_ms);
    println!("  Timeout: {}s", config.crawler.timeout_secs);
    println!("  Resume: {}", config.crawler.resume);
    println!("  Max categories: {}", config.crawler.max_categories);
    println!(
        "  Max builds per category: {}",
        config.crawler.max_items_per_category
    );
    if let Some(limit) = config.crawler.stop_after_items {
        println!("  Stop after: {} builds", limit);
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);

    println!("\nOutput:");
    println!("  Images: {}", config.output.images_path().display());
    println!("  Metadata: {}", config.output.metadata_path().display());
    println!("  Checkpoint: {}", config.output.checkpoint_path().display());

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl up to {} builds",
        config
            .crawler
            .max_categories
            .saturating_mul(config.crawler.max_items_per_category)
    );
}

/// Handles the --stats mode: shows statistics from the metadata document
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use craft_harvest::output::{load_statistics, print_statistics};

    let path = config.output.metadata_path();
    println!("Metadata: {}\n", path.display());

    let stats = load_statistics(&path)
        .with_context(|| format!("Failed to read metadata from {}", path.display()))?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    if config.crawler.resume {
        tracing::info!("Starting crawl (will resume if a checkpoint exists)");
    } else {
        tracing::info!("Starting fresh crawl (ignoring checkpoint)");
    }

    let summary = run_crawl(config).await.context("Crawl failed to start")?;

    println!("\n=== Scraping Summary ===\n");
    println!("{}", summary);

    if let RunOutcome::Aborted { reason } = &summary.outcome {
        anyhow::bail!("Crawl aborted: {}", reason);
    }

    Ok(())
}
