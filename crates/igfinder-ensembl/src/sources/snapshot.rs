//! Local JSON snapshot of a fetched annotation.
//!
//! Lets a run be repeated offline against exactly the same input.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use igfinder_common::entities::GeneAnnotation;
use igfinder_common::error::AnnotationError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use super::AnnotationSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationSnapshot {
    pub species: String,
    pub fetched_at: DateTime<Utc>,
    pub genes: Vec<GeneAnnotation>,
}

impl AnnotationSnapshot {
    pub fn new(species: &str, genes: Vec<GeneAnnotation>) -> Self {
        Self {
            species: species.to_string(),
            fetched_at: Utc::now(),
            genes,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create snapshot file: {:?}", path))?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)
            .with_context(|| format!("Failed to write snapshot: {:?}", path))?;
        info!(path = %path.display(), genes = self.genes.len(), "Annotation snapshot saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open snapshot file: {:?}", path))?;
        let snapshot: Self = serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to parse snapshot: {:?}", path))?;
        Ok(snapshot)
    }
}

/// Serves a previously saved snapshot instead of querying the network.
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AnnotationSource for SnapshotSource {
    async fn fetch_genes(&self, species: &str) -> Result<Vec<GeneAnnotation>, AnnotationError> {
        let snapshot = AnnotationSnapshot::load(&self.path)
            .map_err(|e| AnnotationError::Unavailable(format!("{e:#}")))?;
        if !snapshot.species.eq_ignore_ascii_case(species) {
            return Err(AnnotationError::Unavailable(format!(
                "snapshot {} holds species '{}', not '{}'",
                self.path.display(),
                snapshot.species,
                species
            )));
        }
        info!(
            path = %self.path.display(),
            fetched_at = %snapshot.fetched_at,
            genes = snapshot.genes.len(),
            "Loaded annotation snapshot"
        );
        Ok(snapshot.genes)
    }

    fn name(&self) -> &'static str {
        "snapshot"
    }
}
