//! `scarab build` — phase 3 only: serialize the catalog and indexes.

use crate::cli::output;
use crate::config::HarvestConfig;
use crate::index;
use anyhow::Result;

/// Rebuild the catalog document and the six indexes from the source CSV
/// plus whatever enrichment earlier runs persisted.
pub async fn run(config: HarvestConfig) -> Result<()> {
    let (records, _stats, _store, _checkpoint) = super::load_world(&config)?;
    let summary = index::build(&config, &records)?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "objects": summary.objects,
            "indexes": summary.index_groups,
        }));
    } else if !output::is_quiet() {
        println!("Catalog written: {} objects", summary.objects);
        for (name, groups) in &summary.index_groups {
            println!("  {name}.json: {groups} groups");
        }
    }
    Ok(())
}
