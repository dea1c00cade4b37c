//! Phase 1 — collection-page scrape.
//!
//! Works through the not-yet-done IDs in sorted order, batch by batch.
//! Within a batch every page fetch is dispatched concurrently, bounded
//! by the scrape concurrency limit; the batch's results are merged into
//! the records and checkpointed before the next batch starts, so a crash
//! re-does at most one batch.

use crate::catalog::ObjectRecord;
use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::config::HarvestConfig;
use crate::extract;
use crate::pipeline::http::HttpClient;
use crate::pipeline::retry::{self, AttemptError, RetryDecision};
use crate::progress::{emit, Phase, ProgressEventKind, ProgressSender};
use anyhow::Result;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

/// Annotation tab labels scraped from the page payload.
const INSCRIPTIONS_LABEL: &str = "Signatures, Inscriptions, and Markings";
const PROVENANCE_LABEL: &str = "Provenance";

/// Fields extracted from one collection page.
#[derive(Debug, Default, Clone)]
pub struct PageFields {
    pub description: String,
    pub inscriptions: String,
    pub provenance: String,
    pub image_url: String,
}

/// Totals across the whole phase.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScrapeTotals {
    pub attempted: usize,
    pub descriptions: usize,
    pub inscriptions: usize,
    pub provenance: usize,
    pub image_urls: usize,
}

/// Run phase 1 over every record not yet in the scrape-done set.
pub async fn run(
    config: &HarvestConfig,
    client: &HttpClient,
    records: &mut BTreeMap<u64, ObjectRecord>,
    store: &CheckpointStore,
    checkpoint: &mut Checkpoint,
    progress: Option<ProgressSender>,
) -> Result<ScrapeTotals> {
    let mut seq = 0u64;

    // Sorted for deterministic batching and reporting.
    let todo: Vec<u64> = records
        .keys()
        .copied()
        .filter(|id| !checkpoint.scrape_done.contains(id))
        .collect();

    if todo.is_empty() {
        info!("phase 1 (scrape): already complete");
        emit(
            &progress,
            &mut seq,
            ProgressEventKind::PhaseCompleted {
                phase: Phase::Scrape,
                detail: "already complete".to_string(),
            },
        );
        return Ok(ScrapeTotals::default());
    }

    let total = todo.len();
    let batches = total.div_ceil(config.batch_size);
    info!(pages = total, batches, "phase 1: scraping collection pages");
    emit(
        &progress,
        &mut seq,
        ProgressEventKind::PhaseStarted {
            phase: Phase::Scrape,
            total,
            batches,
        },
    );

    let mut totals = ScrapeTotals::default();

    for (batch_index, batch) in todo.chunks(config.batch_size).enumerate() {
        let started = Instant::now();

        let results: Vec<(u64, Option<PageFields>)> = stream::iter(batch.iter().copied())
            .map(|object_id| {
                let url = config.page_url(object_id);
                async move { (object_id, fetch_one(client, config, &url).await) }
            })
            .buffer_unordered(config.scrape_concurrency)
            .collect()
            .await;

        // Single-threaded merge; each result targets its own record.
        let mut batch_hits = ScrapeTotals::default();
        for (object_id, fields) in results {
            batch_hits.attempted += 1;
            let Some(fields) = fields else { continue };
            if let Some(record) = records.get_mut(&object_id) {
                merge_fields(record, fields, &mut batch_hits);
            }
        }
        totals.attempted += batch_hits.attempted;
        totals.descriptions += batch_hits.descriptions;
        totals.inscriptions += batch_hits.inscriptions;
        totals.provenance += batch_hits.provenance;
        totals.image_urls += batch_hits.image_urls;

        // The whole batch is done — success, permanent failure, or retry
        // exhaustion alike — so none of it is re-attempted after a crash.
        checkpoint.scrape_done.extend(batch.iter().copied());
        store.save(checkpoint)?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let processed = (batch_index + 1) * config.batch_size;
        let processed = processed.min(total);
        let detail = format!(
            "desc={} insc={} prov={} img={}",
            batch_hits.descriptions,
            batch_hits.inscriptions,
            batch_hits.provenance,
            batch_hits.image_urls,
        );
        info!(
            batch = batch_index + 1,
            batches, processed, total, elapsed_ms, %detail, "scrape batch complete"
        );
        emit(
            &progress,
            &mut seq,
            ProgressEventKind::BatchCompleted {
                phase: Phase::Scrape,
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
        descriptions = totals.descriptions,
        inscriptions = totals.inscriptions,
        provenance = totals.provenance,
        image_urls = totals.image_urls,
        "phase 1 done"
    );
    emit(
        &progress,
        &mut seq,
        ProgressEventKind::PhaseCompleted {
            phase: Phase::Scrape,
            detail: format!(
                "{} descriptions, {} inscriptions, {} provenance",
                totals.descriptions, totals.inscriptions, totals.provenance
            ),
        },
    );
    Ok(totals)
}

/// Fetch one page, driving the retry policy with an explicit loop.
/// Returns `None` when the item yields no result for this run.
async fn fetch_one(
    client: &HttpClient,
    config: &HarvestConfig,
    url: &str,
) -> Option<PageFields> {
    let mut attempt = 0u32;
    loop {
        let error = match client.get_text(url, config.page_timeout).await {
            Ok((200, body)) => return Some(extract_fields(&body, config)),
            Ok((429, _)) => AttemptError::RateLimited,
            Ok((status, _)) => AttemptError::Status(status),
            Err(e) => AttemptError::Network(e.to_string()),
        };
        match retry::decide(&config.retry, attempt, &error) {
            RetryDecision::RetryAfter(delay) => {
                debug!(%url, attempt, %error, delay_ms = delay.as_millis() as u64, "retrying page fetch");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            RetryDecision::GiveUp => {
                debug!(%url, %error, "page fetch yielded no result");
                return None;
            }
        }
    }
}

fn extract_fields(html: &str, config: &HarvestConfig) -> PageFields {
    PageFields {
        description: extract::description(html, &config.boilerplate_prefixes),
        inscriptions: extract::annotation(html, INSCRIPTIONS_LABEL),
        provenance: extract::annotation(html, PROVENANCE_LABEL),
        image_url: extract::image_url(html),
    }
}

/// Merge extracted fields into the record. Only non-empty values land —
/// a previously filled field is never cleared by a later empty result.
fn merge_fields(record: &mut ObjectRecord, fields: PageFields, hits: &mut ScrapeTotals) {
    if !fields.description.is_empty() {
        record.description = fields.description;
        hits.descriptions += 1;
    }
    if !fields.inscriptions.is_empty() {
        record.inscriptions = fields.inscriptions;
        hits.inscriptions += 1;
    }
    if !fields.provenance.is_empty() {
        record.provenance = fields.provenance;
        hits.provenance += 1;
    }
    if !fields.image_url.is_empty() {
        record.image_url = fields.image_url;
        hits.image_urls += 1;
    }
}
