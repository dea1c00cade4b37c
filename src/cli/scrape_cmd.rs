//! `scarab scrape` — phase 1 only.
//!
//! Still rebuilds the catalog at the end: scraped text lives only in
//! memory until serialized, and the next run restores enrichment from
//! the catalog file.

use crate::catalog::Coverage;
use crate::cli::output;
use crate::config::HarvestConfig;
use crate::pipeline::http::HttpClient;
use crate::{index, pipeline, progress};
use anyhow::Result;

/// Run the scrape phase.
pub async fn run(config: HarvestConfig) -> Result<()> {
    let (mut records, _stats, store, mut checkpoint) = super::load_world(&config)?;

    let client = HttpClient::new(&config.user_agent);
    let (tx, rx) = progress::channel();
    let renderer = (!output::is_quiet()).then(|| super::spawn_renderer(rx));

    let totals = pipeline::fetch::run(
        &config,
        &client,
        &mut records,
        &store,
        &mut checkpoint,
        Some(tx.clone()),
    )
    .await?;

    drop(tx);
    if let Some(handle) = renderer {
        let _ = handle.await;
    }

    index::build(&config, &records)?;
    let coverage = Coverage::of(&records);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "attempted": totals.attempted,
            "descriptions": coverage.descriptions,
            "inscriptions": coverage.inscriptions,
            "provenance": coverage.provenance,
            "image_urls": coverage.image_urls,
        }));
    } else if !output::is_quiet() {
        println!(
            "Scrape done: {} pages attempted; catalog now has {} descriptions, {} inscriptions, {} provenance",
            totals.attempted, coverage.descriptions, coverage.inscriptions, coverage.provenance,
        );
    }
    Ok(())
}
