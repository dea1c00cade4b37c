//! Harvest configuration.
//!
//! Every path and tunable lives in one struct handed to each component at
//! construction, so tests can point the pipeline at a temp directory and a
//! mock server instead of the live site.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Retry/backoff tunables shared by both network phases.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts per item, first try included.
    pub max_attempts: u32,
    /// Exponential backoff base; attempt `n` waits `base * 2^n`.
    pub base: Duration,
    /// Flat extra delay added when the server rate-limits us.
    pub rate_limit_extra: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base: Duration::from_secs(1),
            rate_limit_extra: Duration::from_secs(1),
        }
    }
}

/// Full configuration for one harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Source CSV catalog.
    pub csv_path: PathBuf,
    /// Directory for downloaded object images.
    pub images_dir: PathBuf,
    /// Directory for the generated index files.
    pub index_dir: PathBuf,
    /// Path of the enriched catalog document.
    pub catalog_path: PathBuf,
    /// Path of the two-phase resume checkpoint.
    pub checkpoint_path: PathBuf,

    /// Items per batch. Controls checkpoint and report granularity only;
    /// in-flight request count is bounded by the concurrency fields.
    pub batch_size: usize,
    /// Simultaneous page fetches in phase 1.
    pub scrape_concurrency: usize,
    /// Simultaneous image downloads in phase 2.
    pub image_concurrency: usize,

    pub retry: RetryPolicy,
    /// Per-request timeout for collection pages.
    pub page_timeout: Duration,
    /// Per-request timeout for image downloads (larger bodies).
    pub image_timeout: Duration,

    /// Identifying User-Agent sent with every request.
    pub user_agent: String,
    /// Base URL of the per-object collection pages; the object ID is
    /// appended as the final path segment.
    pub collection_base_url: String,

    /// Description openers that mean "no real description". Matched results
    /// starting with any of these are suppressed to empty. An allow-list of
    /// known junk, not a general cleanliness heuristic.
    pub boilerplate_prefixes: Vec<String>,
}

impl HarvestConfig {
    /// Build a configuration rooted at `root` with production defaults.
    pub fn for_root(root: &Path) -> Self {
        Self {
            csv_path: root.join("objects.csv"),
            images_dir: root.join("images"),
            index_dir: root.join("index"),
            catalog_path: root.join("catalog.json"),
            checkpoint_path: root.join(".checkpoint.json"),
            batch_size: 100,
            scrape_concurrency: 5,
            image_concurrency: 10,
            retry: RetryPolicy::default(),
            page_timeout: Duration::from_secs(45),
            image_timeout: Duration::from_secs(60),
            user_agent: concat!("scarab/", env!("CARGO_PKG_VERSION")).to_string(),
            collection_base_url: "https://www.metmuseum.org/art/collection/search".to_string(),
            boilerplate_prefixes: vec![
                "The Met presents over 5,000 years".to_string(),
                "The Metropolitan Museum of Art".to_string(),
            ],
        }
    }

    /// Deterministic collection-page URL for one object.
    pub fn page_url(&self, object_id: u64) -> String {
        format!(
            "{}/{object_id}",
            self.collection_base_url.trim_end_matches('/')
        )
    }

    /// Deterministic image destination for one object.
    pub fn image_dest(&self, object_id: u64) -> PathBuf {
        self.images_dir.join(format!("{object_id}.jpg"))
    }

    /// Path recorded on the record once an image is on disk, relative to
    /// the data root so the catalog stays relocatable.
    pub fn image_record_path(&self, object_id: u64) -> String {
        format!("images/{object_id}.jpg")
    }
}
