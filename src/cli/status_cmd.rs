//! `scarab status` — read-only checkpoint and coverage report.

use crate::catalog::Coverage;
use crate::cli::output;
use crate::config::HarvestConfig;
use anyhow::Result;

/// Show how far the harvest has progressed.
pub async fn run(config: HarvestConfig) -> Result<()> {
    let (records, stats, _store, checkpoint) = super::load_world(&config)?;
    let coverage = Coverage::of(&records);

    let scrape_pending = records
        .keys()
        .filter(|id| !checkpoint.scrape_done.contains(*id))
        .count();
    let image_pending = records
        .iter()
        .filter(|(id, record)| {
            !checkpoint.image_done.contains(id) && !record.image_url.is_empty()
        })
        .count();

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "objects": coverage.objects,
            "skipped_non_public": stats.skipped_non_public,
            "scrape_done": checkpoint.scrape_done.len(),
            "scrape_pending": scrape_pending,
            "image_done": checkpoint.image_done.len(),
            "image_pending": image_pending,
            "descriptions": coverage.descriptions,
            "inscriptions": coverage.inscriptions,
            "provenance": coverage.provenance,
            "image_urls": coverage.image_urls,
            "images": coverage.images,
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        println!("Objects:        {}", coverage.objects);
        println!(
            "Phase 1 scrape: {} done, {} pending",
            checkpoint.scrape_done.len(),
            scrape_pending
        );
        println!(
            "Phase 2 images: {} done, {} pending",
            checkpoint.image_done.len(),
            image_pending
        );
        println!(
            "Coverage:       desc={} insc={} prov={} urls={} files={}",
            coverage.descriptions,
            coverage.inscriptions,
            coverage.provenance,
            coverage.image_urls,
            coverage.images,
        );
    }
    Ok(())
}
