//! CSV catalog loader.
//!
//! Reads the source catalog, keeps only rows passing the public-domain
//! predicate, applies the column rename/type-coercion schema, and produces
//! the working record set keyed by object ID.

use crate::catalog::record::ObjectRecord;
use crate::config::HarvestConfig;
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::info;

/// Row accounting from one load.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoadStats {
    /// Records in the working set after filtering and dedup.
    pub included: usize,
    /// Rows dropped by the public-domain predicate.
    pub skipped_non_public: usize,
    /// Rows dropped for a missing or unparseable object ID.
    pub skipped_bad_id: usize,
}

/// One source row, fields named exactly as the CSV header spells them.
/// All columns arrive as strings; typing happens in `into_record`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRow {
    #[serde(rename = "Object Number")]
    object_number: String,
    #[serde(rename = "Is Highlight")]
    is_highlight: String,
    #[serde(rename = "Is Timeline Work")]
    is_timeline_work: String,
    #[serde(rename = "Is Public Domain")]
    is_public_domain: String,
    #[serde(rename = "Object ID")]
    object_id: String,
    #[serde(rename = "Gallery Number")]
    gallery_number: String,
    #[serde(rename = "Department")]
    department: String,
    #[serde(rename = "AccessionYear")]
    accession_year: String,
    #[serde(rename = "Object Name")]
    object_name: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Culture")]
    culture: String,
    #[serde(rename = "Period")]
    period: String,
    #[serde(rename = "Dynasty")]
    dynasty: String,
    #[serde(rename = "Reign")]
    reign: String,
    #[serde(rename = "Portfolio")]
    portfolio: String,
    #[serde(rename = "Constituent ID")]
    constituent_id: String,
    #[serde(rename = "Artist Role")]
    artist_role: String,
    #[serde(rename = "Artist Prefix")]
    artist_prefix: String,
    #[serde(rename = "Artist Display Name")]
    artist_display_name: String,
    #[serde(rename = "Artist Display Bio")]
    artist_display_bio: String,
    #[serde(rename = "Artist Suffix")]
    artist_suffix: String,
    #[serde(rename = "Artist Alpha Sort")]
    artist_alpha_sort: String,
    #[serde(rename = "Artist Nationality")]
    artist_nationality: String,
    #[serde(rename = "Artist Begin Date")]
    artist_begin_date: String,
    #[serde(rename = "Artist End Date")]
    artist_end_date: String,
    #[serde(rename = "Artist Gender")]
    artist_gender: String,
    #[serde(rename = "Artist ULAN URL")]
    artist_ulan_url: String,
    #[serde(rename = "Artist Wikidata URL")]
    artist_wikidata_url: String,
    #[serde(rename = "Object Date")]
    date: String,
    #[serde(rename = "Object Begin Date")]
    date_begin: String,
    #[serde(rename = "Object End Date")]
    date_end: String,
    #[serde(rename = "Medium")]
    medium: String,
    #[serde(rename = "Dimensions")]
    dimensions: String,
    #[serde(rename = "Credit Line")]
    credit_line: String,
    #[serde(rename = "Geography Type")]
    geography_type: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "County")]
    county: String,
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Region")]
    region: String,
    #[serde(rename = "Subregion")]
    subregion: String,
    #[serde(rename = "Locale")]
    locale: String,
    #[serde(rename = "Locus")]
    locus: String,
    #[serde(rename = "Excavation")]
    excavation: String,
    #[serde(rename = "River")]
    river: String,
    #[serde(rename = "Classification")]
    classification: String,
    #[serde(rename = "Rights and Reproduction")]
    rights_and_reproduction: String,
    #[serde(rename = "Link Resource")]
    link_resource: String,
    #[serde(rename = "Object Wikidata URL")]
    object_wikidata_url: String,
    #[serde(rename = "Metadata Date")]
    metadata_date: String,
    #[serde(rename = "Repository")]
    repository: String,
    #[serde(rename = "Tags")]
    tags: String,
    #[serde(rename = "Tags AAT URL")]
    tags_aat_url: String,
    #[serde(rename = "Tags Wikidata URL")]
    tags_wikidata_url: String,
}

impl RawRow {
    fn into_record(self, object_id: u64, config: &HarvestConfig) -> ObjectRecord {
        ObjectRecord {
            object_id,
            object_number: trimmed(self.object_number),
            is_highlight: parse_flag(&self.is_highlight),
            is_timeline_work: parse_flag(&self.is_timeline_work),
            // Guaranteed by the inclusion predicate.
            is_public_domain: true,
            gallery_number: trimmed(self.gallery_number),
            department: trimmed(self.department),
            accession_year: trimmed(self.accession_year),
            object_name: trimmed(self.object_name),
            title: trimmed(self.title),
            culture: trimmed(self.culture),
            period: trimmed(self.period),
            dynasty: trimmed(self.dynasty),
            reign: trimmed(self.reign),
            portfolio: trimmed(self.portfolio),
            constituent_id: trimmed(self.constituent_id),
            artist_role: trimmed(self.artist_role),
            artist_prefix: trimmed(self.artist_prefix),
            artist_display_name: trimmed(self.artist_display_name),
            artist_display_bio: trimmed(self.artist_display_bio),
            artist_suffix: trimmed(self.artist_suffix),
            artist_alpha_sort: trimmed(self.artist_alpha_sort),
            artist_nationality: trimmed(self.artist_nationality),
            artist_begin_date: trimmed(self.artist_begin_date),
            artist_end_date: trimmed(self.artist_end_date),
            artist_gender: trimmed(self.artist_gender),
            artist_ulan_url: trimmed(self.artist_ulan_url),
            artist_wikidata_url: trimmed(self.artist_wikidata_url),
            date: trimmed(self.date),
            date_begin: parse_year(&self.date_begin),
            date_end: parse_year(&self.date_end),
            medium: trimmed(self.medium),
            dimensions: trimmed(self.dimensions),
            credit_line: trimmed(self.credit_line),
            geography_type: trimmed(self.geography_type),
            city: trimmed(self.city),
            state: trimmed(self.state),
            county: trimmed(self.county),
            country: trimmed(self.country),
            region: trimmed(self.region),
            subregion: trimmed(self.subregion),
            locale: trimmed(self.locale),
            locus: trimmed(self.locus),
            excavation: trimmed(self.excavation),
            river: trimmed(self.river),
            classification: trimmed(self.classification),
            rights_and_reproduction: trimmed(self.rights_and_reproduction),
            link_resource: trimmed(self.link_resource),
            object_wikidata_url: trimmed(self.object_wikidata_url),
            metadata_date: trimmed(self.metadata_date),
            repository: trimmed(self.repository),
            tags: parse_tags(&self.tags),
            tags_aat_url: trimmed(self.tags_aat_url),
            tags_wikidata_url: trimmed(self.tags_wikidata_url),
            met_url: config.page_url(object_id),
            description: String::new(),
            inscriptions: String::new(),
            provenance: String::new(),
            image_url: String::new(),
            image_file: String::new(),
        }
    }
}

/// Load the working record set from the configured CSV.
///
/// Rows failing the public-domain predicate or lacking a parseable object
/// ID are counted and dropped. Duplicate IDs resolve deterministically:
/// the last row wins.
pub fn load_catalog(
    config: &HarvestConfig,
) -> Result<(BTreeMap<u64, ObjectRecord>, LoadStats)> {
    let reader = open_stripping_bom(&config.csv_path)
        .with_context(|| format!("opening catalog {}", config.csv_path.display()))?;
    let mut csv_reader = ReaderBuilder::new().flexible(true).from_reader(reader);

    let mut records: BTreeMap<u64, ObjectRecord> = BTreeMap::new();
    let mut stats = LoadStats::default();

    for row in csv_reader.deserialize::<RawRow>() {
        let row =
            row.with_context(|| format!("reading catalog {}", config.csv_path.display()))?;

        if !parse_flag(&row.is_public_domain) {
            stats.skipped_non_public += 1;
            continue;
        }
        let Some(object_id) = parse_id(&row.object_id) else {
            stats.skipped_bad_id += 1;
            continue;
        };
        // Last row wins on duplicate IDs.
        records.insert(object_id, row.into_record(object_id, config));
    }

    stats.included = records.len();
    Ok((records, stats))
}

/// Merge enrichment from a previously built catalog document, so re-runs
/// with a complete checkpoint keep already-scraped values instead of
/// emitting an emptied catalog. Absent file is a fresh start; a present
/// but unreadable file is an error, because rebuilding without it would
/// silently discard paid-for scrape results.
pub fn merge_prior_catalog(
    records: &mut BTreeMap<u64, ObjectRecord>,
    path: &Path,
) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading prior catalog {}", path.display()))?;
    let prior: Vec<ObjectRecord> = serde_json::from_str(&data)
        .with_context(|| format!("prior catalog {} is unreadable", path.display()))?;

    let mut merged = 0usize;
    for old in prior {
        let Some(record) = records.get_mut(&old.object_id) else {
            // The source catalog no longer carries this object.
            continue;
        };
        let mut changed = false;
        changed |= merge_non_empty(&mut record.description, old.description);
        changed |= merge_non_empty(&mut record.inscriptions, old.inscriptions);
        changed |= merge_non_empty(&mut record.provenance, old.provenance);
        changed |= merge_non_empty(&mut record.image_url, old.image_url);
        changed |= merge_non_empty(&mut record.image_file, old.image_file);
        if changed {
            merged += 1;
        }
    }
    if merged > 0 {
        info!(objects = merged, "restored enrichment from prior catalog");
    }
    Ok(merged)
}

fn merge_non_empty(target: &mut String, value: String) -> bool {
    if target.is_empty() && !value.is_empty() {
        *target = value;
        return true;
    }
    false
}

/// Open the CSV, skipping a UTF-8 byte-order mark if the file starts with
/// one (the upstream export carries it).
fn open_stripping_bom(path: &Path) -> std::io::Result<BufReader<File>> {
    let mut file = File::open(path)?;
    let mut bom = [0u8; 3];
    let n = file.read(&mut bom)?;
    if n != 3 || bom != [0xEF, 0xBB, 0xBF] {
        file.seek(SeekFrom::Start(0))?;
    }
    Ok(BufReader::new(file))
}

/// The inclusion predicate: true only for the exact case-insensitive
/// token "TRUE" after trimming.
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn parse_id(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

/// Years coerce with a None fallback: empty or garbage is "no date",
/// never zero.
fn parse_year(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

/// Pipe-delimited tag column to trimmed, non-empty tokens.
fn parse_tags(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}
