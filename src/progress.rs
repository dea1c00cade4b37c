// Copyright 2026 Scarab Contributors
// SPDX-License-Identifier: Apache-2.0

//! Progress event types and broadcast channel for pipeline telemetry.
//!
//! The phases emit `ProgressEvent`s as batches resolve, which flow through
//! a `tokio::sync::broadcast` channel to all subscribers (CLI renderer,
//! log sinks). When no subscriber exists, events are silently dropped.

use serde::{Deserialize, Serialize};

/// A progress event emitted during a harvest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Monotonically increasing sequence number.
    pub seq: u64,
    /// The kind of progress event.
    pub event: ProgressEventKind,
}

/// The specific kind of progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressEventKind {
    /// A phase started with this much outstanding work.
    PhaseStarted {
        phase: Phase,
        total: usize,
        batches: usize,
    },
    /// One batch fully resolved and was checkpointed.
    BatchCompleted {
        phase: Phase,
        batch: usize,
        batches: usize,
        /// Items resolved so far in this phase, cumulative.
        processed: usize,
        total: usize,
        elapsed_ms: u64,
        /// Per-batch hit counts, preformatted for display.
        detail: String,
    },
    /// A phase finished (including the nothing-to-do case).
    PhaseCompleted { phase: Phase, detail: String },
}

/// Identifies which pipeline phase an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Phase 1: collection-page scrape.
    Scrape,
    /// Phase 2: image download.
    Images,
    /// Phase 3: catalog and index build.
    Build,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scrape => write!(f, "Scrape"),
            Self::Images => write!(f, "Images"),
            Self::Build => write!(f, "Build"),
        }
    }
}

/// Sender handle for emitting progress events.
pub type ProgressSender = tokio::sync::broadcast::Sender<ProgressEvent>;

/// Receiver handle for consuming progress events.
pub type ProgressReceiver = tokio::sync::broadcast::Receiver<ProgressEvent>;

/// Create a new progress broadcast channel with a bounded buffer.
///
/// 256 events cover a full run at default settings (a few phase events
/// plus one event per batch).
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::broadcast::channel(256)
}

/// Emit a progress event, silently ignoring send errors (which occur
/// when no receivers are listening).
pub fn emit(tx: &Option<ProgressSender>, seq: &mut u64, event: ProgressEventKind) {
    if let Some(sender) = tx {
        *seq += 1;
        let _ = sender.send(ProgressEvent { seq: *seq, event });
    }
}
