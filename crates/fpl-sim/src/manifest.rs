//! Simulation run manifest, written as JSON for downstream tooling.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One simulation run's outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimRunRecord {
    pub run_id: String,
    pub run_no: u32,
    pub seed: u64,
    /// "ok", "infeasible", or "error".
    pub status: String,
    pub score: Option<f64>,
    pub error: Option<String>,
}

/// Summary of a whole simulation batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimManifest {
    pub created_at: DateTime<Utc>,
    pub runs: usize,
    pub success: usize,
    pub failure: usize,
    pub noise_magnitude: f64,
    pub records: Vec<SimRunRecord>,
}

pub fn write_manifest(path: &Path, manifest: &SimManifest) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest).context("serialising sim manifest")?;
    fs::write(path, json)
        .with_context(|| format!("writing sim manifest '{}'", path.display()))?;
    Ok(())
}
