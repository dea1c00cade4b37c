//! The enriched object record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One catalog entry, keyed by its immutable object ID.
///
/// Catalog attributes come straight from the source CSV (renamed and typed
/// by the loader). The five enrichment fields start empty and are filled
/// only by the pipeline: `description`, `inscriptions`, `provenance`,
/// `image_url` by phase 1, `image_file` by phase 2. Enrichment is
/// monotonic — once non-empty, a field is never overwritten with empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectRecord {
    // ── Identity and flags ───────────────────────────────────────────────
    pub object_id: u64,
    pub object_number: String,
    pub is_highlight: bool,
    pub is_timeline_work: bool,
    pub is_public_domain: bool,
    pub gallery_number: String,

    // ── Curatorial attributes ────────────────────────────────────────────
    pub department: String,
    pub accession_year: String,
    pub object_name: String,
    pub title: String,
    pub culture: String,
    pub period: String,
    pub dynasty: String,
    pub reign: String,
    pub portfolio: String,

    // ── Artist attributes ────────────────────────────────────────────────
    pub constituent_id: String,
    pub artist_role: String,
    pub artist_prefix: String,
    pub artist_display_name: String,
    pub artist_display_bio: String,
    pub artist_suffix: String,
    pub artist_alpha_sort: String,
    pub artist_nationality: String,
    pub artist_begin_date: String,
    pub artist_end_date: String,
    pub artist_gender: String,
    pub artist_ulan_url: String,
    pub artist_wikidata_url: String,

    // ── Dating ───────────────────────────────────────────────────────────
    pub date: String,
    /// Begin year; negative means B.C. Garbage in the source parses to None.
    pub date_begin: Option<i64>,
    pub date_end: Option<i64>,

    // ── Physical description ─────────────────────────────────────────────
    pub medium: String,
    pub dimensions: String,
    pub credit_line: String,

    // ── Geography ────────────────────────────────────────────────────────
    pub geography_type: String,
    pub city: String,
    pub state: String,
    pub county: String,
    pub country: String,
    pub region: String,
    pub subregion: String,
    pub locale: String,
    pub locus: String,
    pub excavation: String,
    pub river: String,

    // ── Classification and rights ────────────────────────────────────────
    pub classification: String,
    pub rights_and_reproduction: String,
    /// Raw source link. Internal only — excluded from the catalog output.
    #[serde(skip_serializing)]
    pub link_resource: String,
    pub object_wikidata_url: String,
    pub metadata_date: String,
    pub repository: String,
    pub tags: Vec<String>,
    pub tags_aat_url: String,
    pub tags_wikidata_url: String,

    /// Public collection-page URL for this object.
    pub met_url: String,

    // ── Enrichment (pipeline-owned) ──────────────────────────────────────
    pub description: String,
    pub inscriptions: String,
    pub provenance: String,
    pub image_url: String,
    pub image_file: String,
}

/// Enrichment coverage over a record set, for summaries and `status`.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct Coverage {
    pub objects: usize,
    pub descriptions: usize,
    pub inscriptions: usize,
    pub provenance: usize,
    pub image_urls: usize,
    pub images: usize,
}

impl Coverage {
    pub fn of(records: &BTreeMap<u64, ObjectRecord>) -> Self {
        let mut coverage = Coverage {
            objects: records.len(),
            ..Coverage::default()
        };
        for record in records.values() {
            coverage.descriptions += usize::from(!record.description.is_empty());
            coverage.inscriptions += usize::from(!record.inscriptions.is_empty());
            coverage.provenance += usize::from(!record.provenance.is_empty());
            coverage.image_urls += usize::from(!record.image_url.is_empty());
            coverage.images += usize::from(!record.image_file.is_empty());
        }
        coverage
    }
}
