//! CLI subcommand implementations for the scarab binary.

pub mod build_cmd;
pub mod images_cmd;
pub mod output;
pub mod run_cmd;
pub mod scrape_cmd;
pub mod status_cmd;

use crate::catalog::{self, LoadStats, ObjectRecord};
use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::config::HarvestConfig;
use crate::progress::{ProgressEventKind, ProgressReceiver};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use tokio::sync::broadcast::error::RecvError;
use tracing::info;

/// Load the working set, fold in enrichment from a previously built
/// catalog, and open the checkpoint. Shared by every subcommand that
/// touches the pipeline.
pub(crate) fn load_world(
    config: &HarvestConfig,
) -> Result<(BTreeMap<u64, ObjectRecord>, LoadStats, CheckpointStore, Checkpoint)> {
    let (mut records, stats) = catalog::load_catalog(config)?;
    info!(
        objects = stats.included,
        skipped_non_public = stats.skipped_non_public,
        skipped_bad_id = stats.skipped_bad_id,
        "catalog loaded"
    );
    catalog::merge_prior_catalog(&mut records, &config.catalog_path)?;

    let store = CheckpointStore::new(config.checkpoint_path.clone());
    let checkpoint = store.load()?;
    Ok((records, stats, store, checkpoint))
}

/// Render progress events as a per-phase bar. Exits when every sender is
/// gone.
pub(crate) fn spawn_renderer(mut rx: ProgressReceiver) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut bar: Option<ProgressBar> = None;
        loop {
            match rx.recv().await {
                Ok(event) => match event.event {
                    ProgressEventKind::PhaseStarted { phase, total, .. } => {
                        let pb = ProgressBar::new(total as u64);
                        pb.set_style(
                            ProgressStyle::with_template(
                                "  {prefix:>7} [{bar:40}] {pos}/{len} {msg}",
                            )
                            .expect("progress template is valid"),
                        );
                        pb.set_prefix(phase.to_string());
                        bar = Some(pb);
                    }
                    ProgressEventKind::BatchCompleted {
                        processed, detail, ..
                    } => {
                        if let Some(pb) = &bar {
                            pb.set_position(processed as u64);
                            pb.set_message(detail);
                        }
                    }
                    ProgressEventKind::PhaseCompleted { detail, .. } => {
                        if let Some(pb) = bar.take() {
                            pb.finish_with_message(detail);
                        }
                    }
                },
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}
