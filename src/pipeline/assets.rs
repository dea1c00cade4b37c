//! Phase 2 — image download.
//!
//! Consumes the asset URLs phase 1 discovered. The work list is only
//! items with a URL and no image-done mark; an image already on disk is
//! accepted without a network call, so interrupted downloads resume
//! cheaply. Batch and checkpoint cadence mirror phase 1.

use crate::catalog::ObjectRecord;
use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::config::HarvestConfig;
use crate::pipeline::http::HttpClient;
use crate::pipeline::retry::{self, AttemptError, RetryDecision};
use crate::progress::{emit, Phase, ProgressEventKind, ProgressSender};
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Totals across the whole phase.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageTotals {
    pub attempted: usize,
    pub downloaded: usize,
}

/// Run phase 2 over every record with a discovered URL that is not yet
/// in the image-done set.
pub async fn run(
    config: &HarvestConfig,
    client: &HttpClient,
    records: &mut BTreeMap<u64, ObjectRecord>,
    store: &CheckpointStore,
    checkpoint: &mut Checkpoint,
    progress: Option<ProgressSender>,
) -> Result<ImageTotals> {
    let mut seq = 0u64;

    std::fs::create_dir_all(&config.images_dir)
        .with_context(|| format!("creating {}", config.images_dir.display()))?;

    // Items finished on a previous run keep their local path, provided the
    // file is actually there.
    for (&object_id, record) in records.iter_mut() {
        if checkpoint.image_done.contains(&object_id)
            && !record.image_url.is_empty()
            && record.image_file.is_empty()
            && file_non_empty(&config.image_dest(object_id))
        {
            record.image_file = config.image_record_path(object_id);
        }
    }

    // BTreeMap iteration keeps the work list sorted by ID.
    let todo: Vec<(u64, String)> = records
        .iter()
        .filter(|(id, record)| {
            !checkpoint.image_done.contains(id) && !record.image_url.is_empty()
        })
        .map(|(&id, record)| (id, record.image_url.clone()))
        .collect();

    if todo.is_empty() {
        info!("phase 2 (images): already complete");
        emit(
            &progress,
            &mut seq,
            ProgressEventKind::PhaseCompleted {
                phase: Phase::Images,
                detail: "already complete".to_string(),
            },
        );
        return Ok(ImageTotals::default());
    }

    let total = todo.len();
    let batches = total.div_ceil(config.batch_size);
    info!(images = total, batches, "phase 2: downloading images");
    emit(
        &progress,
        &mut seq,
        ProgressEventKind::PhaseStarted {
            phase: Phase::Images,
            total,
            batches,
        },
    );

    let mut totals = ImageTotals::default();

    for (batch_index, batch) in todo.chunks(config.batch_size).enumerate() {
        let started = Instant::now();

        let results: Vec<(u64, bool)> = stream::iter(batch.iter().cloned())
            .map(|(object_id, url)| async move {
                (object_id, download_one(client, config, object_id, &url).await)
            })
            .buffer_unordered(config.image_concurrency)
            .collect()
            .await;

        let mut batch_ok = 0usize;
        for (object_id, downloaded) in results {
            totals.attempted += 1;
            if downloaded {
                if let Some(record) = records.get_mut(&object_id) {
                    record.image_file = config.image_record_path(object_id);
                }
                batch_ok += 1;
            }
        }
        totals.downloaded += batch_ok;

        checkpoint
            .image_done
            .extend(batch.iter().map(|(id, _)| *id));
        store.save(checkpoint)?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let processed = ((batch_index + 1) * config.batch_size).min(total);
        let detail = format!("downloaded={batch_ok}/{}", batch.len());
        info!(
            batch = batch_index + 1,
            batches, processed, total, elapsed_ms, %detail, "image batch complete"
        );
        emit(
            &progress,
            &mut seq,
            ProgressEventKind::BatchCompleted {
                phase: Phase::Images,
                batch: batch_index + 1,
                batches,
                processed,
                total,
                elapsed_ms,
                detail,
            },
        );
    }

    info!(
        downloaded = totals.downloaded,
        attempted = totals.attempted,
        "phase 2 done"
    );
    emit(
        &progress,
        &mut seq,
        ProgressEventKind::PhaseCompleted {
            phase: Phase::Images,
            detail: format!("{}/{} images downloaded", totals.downloaded, totals.attempted),
        },
    );
    Ok(totals)
}

/// Download one image, driving the retry policy with an explicit loop.
/// Returns true when the destination file is in place.
async fn download_one(
    client: &HttpClient,
    config: &HarvestConfig,
    object_id: u64,
    url: &str,
) -> bool {
    let dest = config.image_dest(object_id);
    if file_non_empty(&dest) {
        // Idempotent short-circuit: an earlier run already fetched it.
        return true;
    }

    let mut attempt = 0u32;
    loop {
        let error = match client.get_bytes(url, config.image_timeout).await {
            Ok((200, body)) => {
                if let Err(e) = tokio::fs::write(&dest, &body).await {
                    warn!(object_id, error = %e, "failed writing image to disk");
                    return false;
                }
                return true;
            }
            Ok((429, _)) => AttemptError::RateLimited,
            Ok((status, _)) => AttemptError::Status(status),
            Err(e) => AttemptError::Network(e.to_string()),
        };
        match retry::decide(&config.retry, attempt, &error) {
            RetryDecision::RetryAfter(delay) => {
                debug!(object_id, attempt, %error, delay_ms = delay.as_millis() as u64, "retrying image download");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            RetryDecision::GiveUp => {
                debug!(object_id, %error, "image download yielded no result");
                return false;
            }
        }
    }
}

fn file_non_empty(path: &Path) -> bool {
    path.metadata().map(|meta| meta.len() > 0).unwrap_or(false)
}
