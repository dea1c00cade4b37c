//! `scarab images` — phase 2 only.

use crate::catalog::Coverage;
use crate::cli::output;
use crate::config::HarvestConfig;
use crate::pipeline::http::HttpClient;
use crate::{index, pipeline, progress};
use anyhow::Result;

/// Run the image-download phase.
pub async fn run(config: HarvestConfig) -> Result<()> {
    let (mut records, _stats, store, mut checkpoint) = super::load_world(&config)?;

    let client = HttpClient::new(&config.user_agent);
    let (tx, rx) = progress::channel();
    let renderer = (!output::is_quiet()).then(|| super::spawn_renderer(rx));

    let totals = pipeline::assets::run(
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
            "downloaded": totals.downloaded,
            "images_on_disk": coverage.images,
        }));
    } else if !output::is_quiet() {
        println!(
            "Images done: {}/{} downloaded this run, {} on disk overall",
            totals.downloaded, totals.attempted, coverage.images,
        );
    }
    Ok(())
}
