//! Bulk ingestion of exercise records from JSON.
//!
//! Input is a JSON array of objects in the free-exercise-db layout. Each
//! record is validated on its own; invalid records are skipped and logged.
//! Store failures abort the import.

use std::path::Path;

use anyhow::{Context, Result};

use super::Database;
use crate::models::{NewExercise, ValidationError};

/// Outcome of an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

impl Database {
    /// Import every valid record from a JSON file.
    pub fn import_json_file(&self, path: &Path) -> Result<ImportSummary> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.import_json(&raw)
            .with_context(|| format!("Failed to import {}", path.display()))
    }

    /// Import every valid record from a JSON array document.
    pub fn import_json(&self, json: &str) -> Result<ImportSummary> {
        let records: Vec<serde_json::Value> =
            serde_json::from_str(json).context("Expected a JSON array of exercises")?;

        let mut summary = ImportSummary::default();
        for (index, record) in records.into_iter().enumerate() {
            let input = match serde_json::from_value::<NewExercise>(record) {
                Ok(input) => input,
                Err(e) => {
                    tracing::warn!("Skipping record {}: {}", index, e);
                    summary.skipped += 1;
                    continue;
                }
            };

            let name = input.name.clone();
            match self.insert_exercise(input) {
                Ok(exercise) => {
                    tracing::debug!("Inserted {} as {}", exercise.name, exercise.id);
                    summary.inserted += 1;
                }
                Err(e) if e.is::<ValidationError>() => {
                    tracing::warn!("Skipping record {} ({:?}): {}", index, name, e);
                    summary.skipped += 1;
                }
                Err(e) => return Err(e.context(format!("Failed to insert record {}", index))),
            }
        }

        tracing::info!(
            "Import finished: {} inserted, {} skipped",
            summary.inserted,
            summary.skipped
        );
        Ok(summary)
    }
}
