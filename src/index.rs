//! Phase 3 — catalog serialization and inverted indexes.
//!
//! A pure function of the final record set: no network, no checkpoint.
//! The catalog is an ID-ordered array of records; each index maps a
//! categorical value to the ascending list of object IDs carrying it.
//! Records without a value for an index's source field are simply absent
//! from that index — never filed under a placeholder key.

use crate::catalog::ObjectRecord;
use crate::config::HarvestConfig;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use tracing::info;

/// Group counts per emitted index, for the run summary.
#[derive(Debug, Default, Clone, Serialize)]
pub struct BuildSummary {
    pub objects: usize,
    pub index_groups: Vec<(String, usize)>,
}

/// Serialize the enriched catalog and the six indexes to disk.
pub fn build(
    config: &HarvestConfig,
    records: &BTreeMap<u64, ObjectRecord>,
) -> Result<BuildSummary> {
    fs::create_dir_all(&config.index_dir)
        .with_context(|| format!("creating {}", config.index_dir.display()))?;
    if let Some(parent) = config.catalog_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }

    // Catalog, ordered by ID. `link_resource` is internal-only and falls
    // out at serialization.
    let catalog: Vec<&ObjectRecord> = records.values().collect();
    let json = serde_json::to_string_pretty(&catalog).context("encoding catalog")?;
    fs::write(&config.catalog_path, json)
        .with_context(|| format!("writing {}", config.catalog_path.display()))?;
    info!(objects = catalog.len(), path = %config.catalog_path.display(), "catalog written");

    let mut by_department: Index = BTreeMap::new();
    let mut by_culture: Index = BTreeMap::new();
    let mut by_classification: Index = BTreeMap::new();
    let mut by_century: Index = BTreeMap::new();
    let mut by_tags: Index = BTreeMap::new();
    let mut by_medium: Index = BTreeMap::new();

    for (&object_id, record) in records {
        push_non_empty(&mut by_department, &record.department, object_id);
        push_non_empty(&mut by_culture, &record.culture, object_id);
        push_non_empty(&mut by_classification, &record.classification, object_id);
        if let Some(century) = century_label(record.date_begin, record.date_end) {
            by_century.entry(century).or_default().push(object_id);
        }
        for tag in &record.tags {
            push_non_empty(&mut by_tags, tag, object_id);
        }
        push_non_empty(&mut by_medium, &record.medium, object_id);
    }

    let indexes = [
        ("by_department", by_department),
        ("by_culture", by_culture),
        ("by_classification", by_classification),
        ("by_century", by_century),
        ("by_tags", by_tags),
        ("by_medium", by_medium),
    ];

    let mut summary = BuildSummary {
        objects: catalog.len(),
        index_groups: Vec::new(),
    };
    for (name, index) in indexes {
        let path = config.index_dir.join(format!("{name}.json"));
        let json = serde_json::to_string_pretty(&index)
            .with_context(|| format!("encoding {name}"))?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(index = name, groups = index.len(), "index written");
        summary.index_groups.push((name.to_string(), index.len()));
    }

    Ok(summary)
}

type Index = BTreeMap<String, Vec<u64>>;

fn push_non_empty(index: &mut Index, key: &str, object_id: u64) {
    if !key.is_empty() {
        index.entry(key.to_string()).or_default().push(object_id);
    }
}

/// Century bucket from the object's dates: begin year preferred, end year
/// as fallback. Non-positive years file under B.C.; a record with no
/// usable year gets `None` and stays out of the century index.
pub fn century_label(date_begin: Option<i64>, date_end: Option<i64>) -> Option<String> {
    let year = date_begin.or(date_end)?;
    if year <= 0 {
        // Year zero is not a century of its own; clamp to the 1st.
        let century = year.unsigned_abs().div_ceil(100).max(1);
        Some(format!(
            "{century}{} century B.C.",
            ordinal_suffix(century)
        ))
    } else {
        let century = (year as u64).div_ceil(100);
        Some(format!("{century}{} century", ordinal_suffix(century)))
    }
}

/// English ordinal suffix, with the 11–13 exception folding to "th".
fn ordinal_suffix(n: u64) -> &'static str {
    match n % 100 {
        11..=13 => "th",
        _ => match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_century_label_bc_and_ad() {
        assert_eq!(century_label(Some(-250), None).as_deref(), Some("3rd century B.C."));
        assert_eq!(century_label(Some(1987), None).as_deref(), Some("20th century"));
        assert_eq!(century_label(None, None), None);
    }

    #[test]
    fn test_century_label_prefers_begin_falls_back_to_end() {
        assert_eq!(century_label(Some(-1550), Some(250)).as_deref(), Some("16th century B.C."));
        assert_eq!(century_label(None, Some(250)).as_deref(), Some("3rd century"));
    }

    #[test]
    fn test_century_label_boundaries() {
        assert_eq!(century_label(Some(100), None).as_deref(), Some("1st century"));
        assert_eq!(century_label(Some(101), None).as_deref(), Some("2nd century"));
        assert_eq!(century_label(Some(2000), None).as_deref(), Some("20th century"));
        assert_eq!(century_label(Some(2001), None).as_deref(), Some("21st century"));
        assert_eq!(century_label(Some(-100), None).as_deref(), Some("1st century B.C."));
        assert_eq!(century_label(Some(-101), None).as_deref(), Some("2nd century B.C."));
        assert_eq!(century_label(Some(0), None).as_deref(), Some("1st century B.C."));
    }

    #[test]
    fn test_ordinal_suffix_teens_fold_to_th() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(2), "nd");
        assert_eq!(ordinal_suffix(3), "rd");
        assert_eq!(ordinal_suffix(4), "th");
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(12), "th");
        assert_eq!(ordinal_suffix(13), "th");
        assert_eq!(ordinal_suffix(21), "st");
        assert_eq!(ordinal_suffix(22), "nd");
        assert_eq!(ordinal_suffix(23), "rd");
        assert_eq!(ordinal_suffix(111), "th");
    }

    fn record(object_id: u64) -> ObjectRecord {
        ObjectRecord {
            object_id,
            ..ObjectRecord::default()
        }
    }

    #[test]
    fn test_build_writes_catalog_and_indexes() {
        let dir = TempDir::new().unwrap();
        let config = HarvestConfig::for_root(dir.path());

        let mut records = BTreeMap::new();
        records.insert(
            1,
            ObjectRecord {
                department: "Egyptian Art".to_string(),
                culture: "Egyptian".to_string(),
                classification: "Amulets".to_string(),
                medium: "Faience".to_string(),
                date_begin: Some(-250),
                tags: vec!["A".to_string(), "B".to_string()],
                link_resource: "http://internal/1".to_string(),
                ..record(1)
            },
        );
        records.insert(
            2,
            ObjectRecord {
                department: "Egyptian Art".to_string(),
                // No culture, classification, medium, date, or tags: this
                // record must appear only in the department index.
                ..record(2)
            },
        );

        let summary = build(&config, &records).unwrap();
        assert_eq!(summary.objects, 2);

        let catalog_raw = fs::read_to_string(&config.catalog_path).unwrap();
        assert!(!catalog_raw.contains("link_resource"));
        let catalog: Vec<serde_json::Value> = serde_json::from_str(&catalog_raw).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0]["object_id"], 1);
        assert_eq!(catalog[1]["object_id"], 2);

        let departments: BTreeMap<String, Vec<u64>> = serde_json::from_str(
            &fs::read_to_string(config.index_dir.join("by_department.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(departments["Egyptian Art"], vec![1, 2]);

        let tags: BTreeMap<String, Vec<u64>> = serde_json::from_str(
            &fs::read_to_string(config.index_dir.join("by_tags.json")).unwrap(),
        )
        .unwrap();
        // ID 1 under exactly its two tags, ID 2 nowhere.
        assert_eq!(tags.len(), 2);
        assert_eq!(tags["A"], vec![1]);
        assert_eq!(tags["B"], vec![1]);

        let centuries: BTreeMap<String, Vec<u64>> = serde_json::from_str(
            &fs::read_to_string(config.index_dir.join("by_century.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(centuries["3rd century B.C."], vec![1]);
        assert_eq!(centuries.len(), 1);

        let cultures: BTreeMap<String, Vec<u64>> = serde_json::from_str(
            &fs::read_to_string(config.index_dir.join("by_culture.json")).unwrap(),
        )
        .unwrap();
        assert!(!cultures.contains_key(""));
        assert_eq!(cultures["Egyptian"], vec![1]);
    }

    #[test]
    fn test_catalog_preserves_unicode() {
        let dir = TempDir::new().unwrap();
        let config = HarvestConfig::for_root(dir.path());

        let mut records = BTreeMap::new();
        records.insert(
            1,
            ObjectRecord {
                title: "Ushabti of Nesi-ta-neb-ashru — faïence".to_string(),
                ..record(1)
            },
        );
        build(&config, &records).unwrap();

        let raw = fs::read_to_string(&config.catalog_path).unwrap();
        // Content stays UTF-8, not \u-escaped ASCII.
        assert!(raw.contains("faïence"));
    }
}
