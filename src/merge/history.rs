// Persisted snapshot history - one JSON document per report path

use crate::model::RunSnapshot;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Durable store holding one [`RunSnapshot`] per past invocation.
///
/// Read once and written once per process; concurrent writers are out of
/// scope.
pub struct HistoryStore {
    json_path: PathBuf,
}

impl HistoryStore {
    /// `report_base` is the output path without extension; the history
    /// lives next to the rendered document as `<base>.json`.
    pub fn new(report_base: &Path) -> Self {
        Self {
            json_path: report_base.with_extension("json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.json_path
    }

    /// Load prior snapshots. A missing file is an empty history; a present
    /// but unparseable file is fatal, with no partial recovery.
    pub fn load(&self) -> Result<Vec<RunSnapshot>> {
        if !self.json_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.json_path).with_context(|| {
            format!(
                "Failed to open report history: {}",
                self.json_path.display()
            )
        })?;

        let snapshots: Vec<RunSnapshot> = serde_json::from_reader(file).with_context(|| {
            format!(
                "Report history is corrupted: {}",
                self.json_path.display()
            )
        })?;

        Ok(snapshots)
    }

    /// Rewrite the full history document
    pub fn save(&self, snapshots: &[RunSnapshot]) -> Result<()> {
        if let Some(parent) = self.json_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create report directory: {}", parent.display())
                })?;
            }
        }

        let file = File::create(&self.json_path).with_context(|| {
            format!(
                "Failed to create report history: {}",
                self.json_path.display()
            )
        })?;

        serde_json::to_writer_pretty(file, snapshots)
            .context("Failed to serialize report history")?;

        Ok(())
    }
}
