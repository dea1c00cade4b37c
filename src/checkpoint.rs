//! Crash-safe two-phase checkpoint.
//!
//! Two independent done-sets, one per network phase. Membership means
//! "do not re-attempt" — a permanently failed item is marked done so a
//! later run does not hammer a dead link again. Saved whole-file after
//! every batch; an interrupted run loses at most one batch of progress.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

/// The persisted resume state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Object IDs attempted by phase 1 (success or permanent failure).
    #[serde(default)]
    pub scrape_done: BTreeSet<u64>,
    /// Object IDs attempted by phase 2.
    #[serde(default)]
    pub image_done: BTreeSet<u64>,
}

/// Loads and persists the checkpoint file.
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the checkpoint. An absent file is a fresh start; a present but
    /// corrupt file is an error — silently resetting would re-issue every
    /// already-paid network request.
    pub fn load(&self) -> Result<Checkpoint> {
        if !self.path.exists() {
            return Ok(Checkpoint::default());
        }
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("reading checkpoint {}", self.path.display()))?;
        serde_json::from_str(&data).with_context(|| {
            format!(
                "checkpoint {} is corrupt; refusing to reset progress",
                self.path.display()
            )
        })
    }

    /// Persist the checkpoint: write a sibling temp file, then rename over
    /// the old one, so a crash mid-write never leaves a torn file.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_string(checkpoint).context("encoding checkpoint")?;
        fs::write(&tmp, data)
            .with_context(|| format!("writing checkpoint {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing checkpoint {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_absent_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join(".checkpoint.json"));
        let checkpoint = store.load().unwrap();
        assert!(checkpoint.scrape_done.is_empty());
        assert!(checkpoint.image_done.is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join(".checkpoint.json"));

        let mut checkpoint = Checkpoint::default();
        checkpoint.scrape_done.extend([3, 1, 2]);
        checkpoint.image_done.insert(1);
        store.save(&checkpoint).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, checkpoint);

        // Sets serialize as sorted integer arrays.
        let raw = fs::read_to_string(dir.path().join(".checkpoint.json")).unwrap();
        assert!(raw.contains("[1,2,3]"));
    }

    #[test]
    fn test_load_corrupt_file_fails_loudly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".checkpoint.json");
        fs::write(&path, "{not json").unwrap();

        let store = CheckpointStore::new(path);
        let err = store.load().unwrap_err();
        assert!(format!("{err:#}").contains("corrupt"));
    }

    #[test]
    fn test_save_overwrites_whole_file() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join(".checkpoint.json"));

        let mut checkpoint = Checkpoint::default();
        checkpoint.scrape_done.extend(1..=500);
        store.save(&checkpoint).unwrap();

        checkpoint.scrape_done = [7].into_iter().collect();
        store.save(&checkpoint).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.scrape_done.len(), 1);
        // No temp file left behind.
        assert!(!dir.path().join(".checkpoint.json.tmp").exists());
    }
}
