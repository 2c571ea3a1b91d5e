//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a small catalog (home page, category
//! listings, detail pages and PNG images) and drive full runs end-to-end
//! against a temporary output root.

use craft_harvest::config::Config;
use craft_harvest::crawler::{run_crawl, Coordinator};
use craft_harvest::storage::{CheckpointStore, MetadataStore};
use craft_harvest::{ItemRecord, RunOutcome, RunSummary};
use image::{ImageFormat, Rgb, RgbImage};
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mock catalog site
struct MockSite {
    server: MockServer,
}

impl MockSite {
    async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    fn uri(&self) -> String {
        self.server.uri()
    }

    /// Home page linking to `/minecraft/<name>` for each category
    async fn home(&self, categories: &[&str]) {
        let items: String = categories
            .iter()
            .enumerate()
            .map(|(i, name)| {
                format!(
                    r#"<li class="cats-{}"><a href="/minecraft/{}">{}</a></li>"#,
                    i, name, name
                )
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<html><body><ul>{}</ul></body></html>",
                items
            )))
            .mount(&self.server)
            .await;
    }

    /// Category listing with one product box per build slug
    async fn category(&self, name: &str, builds: &[&str]) {
        let boxes: String = builds
            .iter()
            .map(|slug| {
                format!(
                    r#"<div class="product-box"><h3 class="name"><a href="/build/{}">{}</a></h3></div>"#,
                    slug, slug
                )
            })
            .collect();

        Mock::given(method("GET"))
            .and(path(format!("/minecraft/{}", name)))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<html><body>{}</body></html>",
                boxes
            )))
            .mount(&self.server)
            .await;
    }

    /// Detail page with the given tags and `/img/<name>.png` images
    async fn build(&self, slug: &str, tags: &[&str], images: &[&str]) {
        let gallery = if images.is_empty() {
            String::new()
        } else {
            let imgs: String = images
                .iter()
                .map(|name| format!(r#"<img src="/img/{}.png">"#, name))
                .collect();
            format!(r#"<div id="main_pics">{}</div>"#, imgs)
        };
        let tags_cell = if tags.is_empty() {
            String::new()
        } else {
            format!(
                r#"<table><tr><td class="value tags">{}</td></tr></table>"#,
                tags.join(", ")
            )
        };

        Mock::given(method("GET"))
            .and(path(format!("/build/{}", slug)))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<html><body><h1>{}</h1>{}{}</body></html>",
                slug, gallery, tags_cell
            )))
            .mount(&self.server)
            .await;
    }

    /// A complete build: one tag and one image, both served
    async fn complete_build(&self, slug: &str) {
        self.build(slug, &["house"], &[slug]).await;
        self.image(slug).await;
    }

    async fn image(&self, name: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/img/{}.png", name)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes()))
            .mount(&self.server)
            .await;
    }

    async fn failing(&self, route: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}

fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(8, 8, Rgb([30, 120, 60]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Creates a test configuration with no politeness delay
fn create_test_config(base_url: &str, root: &Path) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.crawler.delay_ms = 0;
    config.crawler.timeout_secs = 5;
    config.output.root_dir = root.to_path_buf();
    config
}

fn stored_records(config: &Config) -> Vec<ItemRecord> {
    let mut store = MetadataStore::new(config.output.metadata_path());
    store.load_existing();
    store.records().to_vec()
}

fn detail_urls(records: &[ItemRecord]) -> HashSet<String> {
    records.iter().map(|r| r.detail_url.clone()).collect()
}

#[tokio::test]
async fn test_single_category_with_one_discard() {
    let site = MockSite::start().await;
    site.home(&["houses"]).await;
    site.category("houses", &["oak-cottage", "bare-hut"]).await;
    site.complete_build("oak-cottage").await;
    site.build("bare-hut", &["house"], &[]).await;

    let root = TempDir::new().unwrap();
    let config = create_test_config(&site.uri(), root.path());

    let summary = run_crawl(config.clone()).await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.total_items, 2);
    assert_eq!(summary.successful_items, 1);
    assert_eq!(summary.failed_items, 1);
    assert_eq!(summary.discarded_items, 1);
    assert_eq!(summary.total_images_downloaded, 1);
    assert_eq!(summary.average_images_per_item, 1.0);

    let records = stored_records(&config);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "oak-cottage");
    assert_eq!(records[0].image_count, 1);
    assert!(records[0].tags.contains("house"));

    let image = root
        .path()
        .join("images/build_00000_oak-cottage/image_000.jpg");
    assert!(image.exists());
    assert_eq!(
        image::guess_format(&std::fs::read(&image).unwrap()).unwrap(),
        ImageFormat::Jpeg
    );

    assert!(!config.output.checkpoint_path().exists());
}

#[tokio::test]
async fn test_zero_categories_aborts_without_output() {
    let site = MockSite::start().await;
    site.home(&[]).await;

    let root = TempDir::new().unwrap();
    let config = create_test_config(&site.uri(), root.path());

    let summary = run_crawl(config.clone()).await.unwrap();

    assert!(matches!(summary.outcome, RunOutcome::Aborted { .. }));
    assert_eq!(summary.total_items, 0);
    assert!(!config.output.metadata_path().exists());
    assert!(!config.output.checkpoint_path().exists());
    assert!(config.output.images_path().is_dir());
    assert_eq!(
        std::fs::read_dir(config.output.images_path()).unwrap().count(),
        0
    );
}

#[tokio::test]
async fn test_failures_are_isolated() {
    let site = MockSite::start().await;
    site.home(&["houses", "castles"]).await;
    site.category("houses", &["h1", "h2", "h3", "h4", "h5"]).await;
    for slug in ["h1", "h2", "h4", "h5", "c1"] {
        site.complete_build(slug).await;
    }
    site.failing("/build/h3", 500).await;
    site.category("castles", &["c1"]).await;

    let root = TempDir::new().unwrap();
    let config = create_test_config(&site.uri(), root.path());

    let summary = run_crawl(config.clone()).await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.total_items, 6);
    assert_eq!(summary.successful_items, 5);
    assert_eq!(summary.failed_items, 1);
    assert_eq!(summary.discarded_items, 0);

    let urls = detail_urls(&stored_records(&config));
    assert!(!urls.iter().any(|u| u.ends_with("/build/h3")));
    assert!(urls.iter().any(|u| u.ends_with("/build/c1")));
}

#[tokio::test]
async fn test_failed_category_listing_is_skipped() {
    let site = MockSite::start().await;
    site.home(&["broken", "castles"]).await;
    site.failing("/minecraft/broken", 404).await;
    site.category("castles", &["c1"]).await;
    site.complete_build("c1").await;

    let root = TempDir::new().unwrap();
    let config = create_test_config(&site.uri(), root.path());

    let summary = run_crawl(config.clone()).await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.successful_items, 1);
    assert_eq!(stored_records(&config).len(), 1);
    assert!(!config.output.checkpoint_path().exists());
}

#[tokio::test]
async fn test_every_record_has_tags_and_stored_images() {
    let site = MockSite::start().await;
    site.home(&["mixed"]).await;
    site.category("mixed", &["good", "no-tags", "no-images", "dead-images", "neither"])
        .await;
    site.complete_build("good").await;
    site.build("no-tags", &[], &["no-tags"]).await;
    site.image("no-tags").await;
    site.build("no-images", &["tower"], &[]).await;
    site.build("dead-images", &["tower"], &["gone"]).await;
    site.failing("/img/gone.png", 404).await;
    site.build("neither", &[], &[]).await;

    let root = TempDir::new().unwrap();
    let config = create_test_config(&site.uri(), root.path());

    let summary = run_crawl(config.clone()).await.unwrap();

    assert_eq!(summary.total_items, 5);
    assert_eq!(summary.successful_items, 1);
    assert_eq!(summary.failed_items, 4);
    assert_eq!(summary.discarded_items, 4);

    let records = stored_records(&config);
    assert_eq!(records.len(), 1);
    for record in &records {
        assert!(!record.tags.is_empty());
        assert!(!record.image_refs.is_empty());
        assert!(record.image_count >= 1);
        assert_eq!(record.image_count, record.local_image_paths.len());
        for local in &record.local_image_paths {
            assert!(Path::new(local).exists(), "missing image {}", local);
        }
    }
}

async fn two_by_two_site() -> MockSite {
    let site = MockSite::start().await;
    site.home(&["houses", "castles"]).await;
    site.category("houses", &["h1", "h2"]).await;
    site.category("castles", &["c1", "c2"]).await;
    for slug in ["h1", "h2", "c1", "c2"] {
        site.complete_build(slug).await;
    }
    site
}

#[tokio::test]
async fn test_interrupted_runs_match_uninterrupted_run() {
    let site = two_by_two_site().await;

    let baseline_root = TempDir::new().unwrap();
    let baseline_config = create_test_config(&site.uri(), baseline_root.path());
    let baseline = run_crawl(baseline_config.clone()).await.unwrap();
    assert_eq!(baseline.successful_items, 4);
    let expected = detail_urls(&stored_records(&baseline_config));

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&site.uri(), root.path());
    config.crawler.stop_after_items = Some(1);
    let checkpoints = CheckpointStore::new(config.output.checkpoint_path());

    let mut last_position = None;
    let mut runs = 0;
    let final_summary: RunSummary = loop {
        runs += 1;
        assert!(runs <= 10, "resume never completed");

        let summary = run_crawl(config.clone()).await.unwrap();
        if summary.is_completed() {
            break summary;
        }

        assert_eq!(summary.outcome, RunOutcome::Stopped { after_items: 1 });
        let position = checkpoints.load().expect("checkpoint kept").position();
        if let Some(previous) = last_position {
            assert!(position > previous, "{:?} after {:?}", position, previous);
        }
        last_position = Some(position);
    };

    assert_eq!(runs, 5);
    assert_eq!(final_summary.total_items, 0);
    assert_eq!(final_summary.resumed_items, 4);
    assert!(!checkpoints.exists());

    let records = stored_records(&config);
    assert_eq!(records.len(), 4);
    assert_eq!(detail_urls(&records), expected);
}

#[tokio::test]
async fn test_resume_retries_item_at_cursor() {
    let site = MockSite::start().await;
    site.home(&["houses"]).await;
    site.category("houses", &["h1", "h2"]).await;
    site.complete_build("h1").await;
    site.complete_build("h2").await;

    let root = TempDir::new().unwrap();
    let config = create_test_config(&site.uri(), root.path());

    // Left behind by a run whose listing of category 0 failed
    CheckpointStore::new(config.output.checkpoint_path())
        .save(0, 0, 1, 0)
        .unwrap();

    let summary = run_crawl(config.clone()).await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.successful_items, 2);

    let urls = detail_urls(&stored_records(&config));
    assert!(urls.iter().any(|u| u.ends_with("/build/h1")));
    assert!(urls.iter().any(|u| u.ends_with("/build/h2")));
    assert!(!config.output.checkpoint_path().exists());
}

#[tokio::test]
async fn test_resume_skips_items_before_cursor() {
    let site = MockSite::start().await;
    site.home(&["houses"]).await;
    site.category("houses", &["h1", "h2", "h3"]).await;
    Mock::given(method("GET"))
        .and(path("/build/h1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&site.server)
        .await;
    site.complete_build("h2").await;
    site.complete_build("h3").await;

    let root = TempDir::new().unwrap();
    let config = create_test_config(&site.uri(), root.path());
    CheckpointStore::new(config.output.checkpoint_path())
        .save(0, 1, 1, 0)
        .unwrap();

    let summary = run_crawl(config.clone()).await.unwrap();

    assert_eq!(summary.total_items, 2);
    assert_eq!(summary.successful_items, 2);
    assert_eq!(stored_records(&config).len(), 2);
}

#[tokio::test]
async fn test_fresh_run_ignores_checkpoint() {
    let site = two_by_two_site().await;

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&site.uri(), root.path());
    config.crawler.stop_after_items = Some(3);
    run_crawl(config.clone()).await.unwrap();
    assert!(config.output.checkpoint_path().exists());

    config.crawler.stop_after_items = None;
    config.crawler.resume = false;
    let summary = run_crawl(config.clone()).await.unwrap();

    assert_eq!(summary.total_items, 4);
    assert_eq!(summary.resumed_items, 0);
    assert_eq!(stored_records(&config).len(), 4);
    assert!(!config.output.checkpoint_path().exists());
}

#[tokio::test]
async fn test_corrupt_checkpoint_starts_over() {
    let site = two_by_two_site().await;

    let root = TempDir::new().unwrap();
    let config = create_test_config(&site.uri(), root.path());
    std::fs::write(config.output.checkpoint_path(), "{ not json").unwrap();

    let summary = run_crawl(config.clone()).await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.total_items, 4);
    assert_eq!(summary.resumed_items, 0);
    assert!(!config.output.checkpoint_path().exists());
}

#[tokio::test]
async fn test_existing_images_are_not_refetched() {
    let site = MockSite::start().await;
    site.home(&["houses"]).await;
    site.category("houses", &["oak-cottage"]).await;
    site.build("oak-cottage", &["house"], &["oak-cottage"]).await;
    Mock::given(method("GET"))
        .and(path("/img/oak-cottage.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes()))
        .expect(0)
        .mount(&site.server)
        .await;

    let root = TempDir::new().unwrap();
    let config = create_test_config(&site.uri(), root.path());
    let item_dir = root.path().join("images/build_00000_oak-cottage");
    std::fs::create_dir_all(&item_dir).unwrap();
    std::fs::write(item_dir.join("image_000.jpg"), b"already here").unwrap();

    let mut coordinator = Coordinator::new(config).unwrap();
    let summary = coordinator.run().await;

    assert_eq!(summary.successful_items, 1);
    assert_eq!(summary.total_images_downloaded, 1);
    assert_eq!(coordinator.metadata().len(), 1);
    assert_eq!(
        std::fs::read(item_dir.join("image_000.jpg")).unwrap(),
        b"already here"
    );
}

#[tokio::test]
async fn test_category_and_item_caps() {
    let site = two_by_two_site().await;

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&site.uri(), root.path());
    config.crawler.max_categories = 1;
    config.crawler.max_items_per_category = 1;

    let summary = run_crawl(config.clone()).await.unwrap();

    assert_eq!(summary.total_items, 1);
    let records = stored_records(&config);
    assert_eq!(records.len(), 1);
    assert!(records[0].detail_url.ends_with("/build/h1"));
}
