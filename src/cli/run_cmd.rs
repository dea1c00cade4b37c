//! `scarab run` — all three phases in order.

use crate::catalog::Coverage;
use crate::cli::output;
use crate::config::HarvestConfig;
use crate::pipeline::http::HttpClient;
use crate::{index, pipeline, progress};
use anyhow::Result;
use std::time::Instant;

/// Run the full harvest: scrape, images, build.
pub async fn run(config: HarvestConfig) -> Result<()> {
    let started = Instant::now();
    let (mut records, stats, store, mut checkpoint) = super::load_world(&config)?;

    let client = HttpClient::new(&config.user_agent);
    let (tx, rx) = progress::channel();
    let renderer = (!output::is_quiet()).then(|| super::spawn_renderer(rx));

    pipeline::fetch::run(
        &config,
        &client,
        &mut records,
        &store,
        &mut checkpoint,
        Some(tx.clone()),
    )
    .await?;
    pipeline::assets::run(
        &config,
        &client,
        &mut records,
        &store,
        &mut checkpoint,
        Some(tx.clone()),
    )
    .await?;

    // Closing the channel lets the renderer drain and exit before the
    // summary prints.
    drop(tx);
    if let Some(handle) = renderer {
        let _ = handle.await;
    }

    let summary = index::build(&config, &records)?;
    let coverage = Coverage::of(&records);
    let elapsed = started.elapsed();

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "objects": coverage.objects,
            "skipped_non_public": stats.skipped_non_public,
            "descriptions": coverage.descriptions,
            "inscriptions": coverage.inscriptions,
            "provenance": coverage.provenance,
            "images": coverage.images,
            "indexes": summary.index_groups,
            "elapsed_seconds": elapsed.as_secs(),
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        let minutes = elapsed.as_secs() / 60;
        let seconds = elapsed.as_secs() % 60;
        println!();
        println!("All done in {minutes}m {seconds}s");
        println!("  Total objects:      {}", coverage.objects);
        println!("  Images downloaded:  {}", coverage.images);
        println!("  Descriptions found: {}", coverage.descriptions);
        println!("  Inscriptions found: {}", coverage.inscriptions);
        println!("  Provenance found:   {}", coverage.provenance);
    }
    Ok(())
}
