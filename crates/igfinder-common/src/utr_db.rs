//! UTR-intron exclusion database.
//!
//! A tab-separated file listing genes whose apparent single exon hides an
//! intron inside an untranslated region. Only gene membership matters to the
//! classifier; coordinates are kept for reporting.
//!
//! Layout: no header, `#` comments allowed, gene identifier in a configurable
//! column (default 2). A row with a single field is read as a bare gene list.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{IgFinderError, Result};

/// One row of the UTR database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtrIntronEntry {
    pub gene_id: String,
    /// Intron coordinates, when the row carries them
    pub coordinates: Option<(u64, u64)>,
}

/// Set-membership oracle over UTR-intron genes.
#[derive(Debug, Clone, Default)]
pub struct UtrIntronDb {
    entries: Vec<UtrIntronEntry>,
    gene_ids: HashSet<String>,
}

impl UtrIntronDb {
    pub fn from_entries(entries: Vec<UtrIntronEntry>) -> Self {
        let gene_ids = entries.iter().map(|e| e.gene_id.clone()).collect();
        Self { entries, gene_ids }
    }

    /// Load from a TSV file. A missing file is an error: callers that have no
    /// database simply do not call this.
    pub fn load(path: &Path, gene_id_column: usize) -> Result<Self> {
        if !path.exists() {
            return Err(IgFinderError::Config(format!(
                "UTR database not found: {}",
                path.display()
            )));
        }
        let file = std::fs::File::open(path)?;
        let db = Self::from_reader(file, gene_id_column)?;
        info!(
            path = %path.display(),
            entries = db.entries.len(),
            genes = db.gene_ids.len(),
            "Loaded UTR-intron database"
        );
        Ok(db)
    }

    pub fn from_reader<R: Read>(reader: R, gene_id_column: usize) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut entries = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let fields: Vec<&str> = record.iter().map(str::trim).collect();
            if fields.iter().all(|f| f.is_empty()) {
                continue;
            }

            let gene_id = if fields.len() == 1 {
                fields[0]
            } else {
                match fields.get(gene_id_column) {
                    Some(id) => *id,
                    None => {
                        debug!(?fields, gene_id_column, "UTR row too short, skipping");
                        continue;
                    }
                }
            };
            if gene_id.is_empty() {
                continue;
            }

            let coordinates = if fields.len() >= 3 {
                let others: Vec<&str> = fields
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != gene_id_column)
                    .map(|(_, f)| *f)
                    .take(2)
                    .collect();
                match (others[0].parse::<u64>(), others[1].parse::<u64>()) {
                    (Ok(start), Ok(end)) => Some((start, end)),
                    _ => None,
                }
            } else {
                None
            };

            entries.push(UtrIntronEntry {
                gene_id: gene_id.to_string(),
                coordinates,
            });
        }

        Ok(Self::from_entries(entries))
    }

    pub fn contains(&self, gene_id: &str) -> bool {
        self.gene_ids.contains(gene_id)
    }

    pub fn entries(&self) -> &[UtrIntronEntry] {
        &self.entries
    }

    /// Number of distinct genes.
    pub fn gene_count(&self) -> usize {
        self.gene_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gene_ids.is_empty()
    }
}
