//! In-memory annotation store.
//!
//! Holds genes in input order, an explicit `gene_id -> transcripts` lookup and
//! the optional UTR-intron exclusion set. Read-only once built.

use igfinder_common::entities::{GeneAnnotation, GeneRecord, TranscriptRecord};
use igfinder_common::error::AnnotationError;
use igfinder_common::utr_db::UtrIntronDb;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    genes: Vec<GeneRecord>,
    index: HashMap<String, usize>,
    transcripts: HashMap<String, Vec<TranscriptRecord>>,
    orphan_transcripts: Vec<String>,
    utr_db: Option<UtrIntronDb>,
}

impl AnnotationStore {
    /// Build the store.
    ///
    /// A gene seen twice keeps its first record; transcripts from the repeat
    /// are merged in unless their transcript id is already known. Transcripts
    /// are filed under their own `gene_id`; those whose parent never appears
    /// are kept aside as orphans.
    pub fn new(annotations: impl IntoIterator<Item = GeneAnnotation>, utr_db: Option<UtrIntronDb>) -> Self {
        let mut genes = Vec::new();
        let mut index = HashMap::new();
        let mut transcripts: HashMap<String, Vec<TranscriptRecord>> = HashMap::new();
        let mut seen_transcripts = HashSet::new();
        let mut duplicates = 0usize;

        for GeneAnnotation { gene, transcripts: txs } in annotations {
            for tx in txs {
                if tx.gene_id != gene.id {
                    warn!(
                        transcript = %tx.id,
                        gene = %gene.id,
                        parent = %tx.gene_id,
                        "Transcript listed under a different gene, filing under its parent"
                    );
                }
                if seen_transcripts.insert((tx.gene_id.clone(), tx.id.clone())) {
                    transcripts.entry(tx.gene_id.clone()).or_default().push(tx);
                }
            }
            if !index.contains_key(&gene.id) {
                index.insert(gene.id.clone(), genes.len());
                genes.push(gene);
            } else {
                duplicates += 1;
            }
        }

        if duplicates > 0 {
            debug!(duplicates, "Merged repeated gene records");
        }

        let mut orphan_transcripts: Vec<String> = transcripts
            .iter()
            .filter(|(gene_id, _)| !index.contains_key(*gene_id))
            .flat_map(|(_, txs)| txs.iter().map(|tx| tx.id.clone()))
            .collect();
        orphan_transcripts.sort();
        if !orphan_transcripts.is_empty() {
            warn!(
                "{} transcript(s) reference genes missing from the annotation and were dropped",
                orphan_transcripts.len()
            );
        }

        Self { genes, index, transcripts, orphan_transcripts, utr_db }
    }

    /// Genes in input order.
    pub fn genes(&self) -> impl Iterator<Item = &GeneRecord> {
        self.genes.iter()
    }

    pub fn gene(&self, gene_id: &str) -> Option<&GeneRecord> {
        self.index.get(gene_id).map(|&i| &self.genes[i])
    }

    /// Transcripts of a gene; a gene without any is incomplete.
    pub fn transcripts(&self, gene_id: &str) -> Result<&[TranscriptRecord], AnnotationError> {
        match self.transcripts.get(gene_id) {
            Some(txs) if !txs.is_empty() => Ok(txs),
            _ => Err(AnnotationError::IncompleteAnnotation {
                gene_id: gene_id.to_string(),
            }),
        }
    }

    /// True when a UTR database was supplied and lists the gene.
    pub fn is_utr_flagged(&self, gene_id: &str) -> bool {
        self.utr_db.as_ref().is_some_and(|db| db.contains(gene_id))
    }

    pub fn has_utr_db(&self) -> bool {
        self.utr_db.is_some()
    }

    /// Transcripts whose parent gene is not in the store, sorted by id.
    pub fn orphan_transcripts(&self) -> &[String] {
        &self.orphan_transcripts
    }

    pub fn utr_db(&self) -> Option<&UtrIntronDb> {
        self.utr_db.as_ref()
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}
