//! Gene classification: intronless vs multi-exonic.
//!
//! Per gene, in order:
//!   1. contigs outside "1".."22" are excluded
//!   2. exon counts of the gene's transcripts are aggregated (see [`ExonAggregation`])
//!   3. a single-exon gene listed in the UTR-intron database is excluded,
//!      any other single-exon gene is intronless
//!   4. everything else is multi-exonic
//!
//! Genes with no transcripts or no exons are excluded with a warning; one bad
//! record never stops the run.

use igfinder_common::chromosome::is_canonical;
use igfinder_common::entities::{ClassifiedGene, GeneClass, GeneRecord, TranscriptRecord};
use igfinder_common::error::AnnotationError;
use igfinder_common::run_config::{ClassifierConfig, ExonAggregation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::store::AnnotationStore;

/// Why a gene was left out of both classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    NonCanonicalChromosome,
    UtrIntron,
    IncompleteAnnotation,
    MalformedTranscript,
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionReason::NonCanonicalChromosome => "non-canonical chromosome",
            ExclusionReason::UtrIntron              => "UTR intron",
            ExclusionReason::IncompleteAnnotation   => "incomplete annotation",
            ExclusionReason::MalformedTranscript    => "malformed transcript",
        }
    }

    /// Data problems, as opposed to deliberate filtering.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ExclusionReason::IncompleteAnnotation | ExclusionReason::MalformedTranscript
        )
    }
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&AnnotationError> for ExclusionReason {
    fn from(err: &AnnotationError) -> Self {
        match err {
            AnnotationError::MalformedTranscript { .. } => ExclusionReason::MalformedTranscript,
            _ => ExclusionReason::IncompleteAnnotation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub gene_id: String,
    pub reason: ExclusionReason,
}

/// Outcome for one gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneCall {
    Classified(GeneClass),
    Excluded(ExclusionReason),
}

/// The partition produced by one classification pass, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub genes: Vec<ClassifiedGene>,
    pub exclusions: Vec<Exclusion>,
    /// Transcripts dropped because their gene was never listed.
    #[serde(default)]
    pub orphan_transcripts: usize,
}

impl Classification {
    pub fn of_class(&self, class: GeneClass) -> impl Iterator<Item = &ClassifiedGene> {
        self.genes.iter().filter(move |g| g.class == class)
    }

    pub fn intronless(&self) -> impl Iterator<Item = &ClassifiedGene> {
        self.of_class(GeneClass::Intronless)
    }

    pub fn multi_exonic(&self) -> impl Iterator<Item = &ClassifiedGene> {
        self.of_class(GeneClass::MultiExonic)
    }

    pub fn count(&self, class: GeneClass) -> usize {
        self.of_class(class).count()
    }

    /// Gene lengths of one class, as floating point for the tests.
    pub fn lengths(&self, class: GeneClass) -> Vec<f64> {
        self.of_class(class).map(|g| g.length as f64).collect()
    }

    pub fn class_of(&self, gene_id: &str) -> Option<GeneClass> {
        self.genes.iter().find(|g| g.gene_id == gene_id).map(|g| g.class)
    }

    pub fn exclusion_of(&self, gene_id: &str) -> Option<ExclusionReason> {
        self.exclusions.iter().find(|e| e.gene_id == gene_id).map(|e| e.reason)
    }

    pub fn exclusion_counts(&self) -> BTreeMap<ExclusionReason, usize> {
        let mut counts = BTreeMap::new();
        for e in &self.exclusions {
            *counts.entry(e.reason).or_insert(0) += 1;
        }
        counts
    }

    /// Records dropped because of bad annotation data: excluded genes plus
    /// orphan transcripts.
    pub fn warning_count(&self) -> usize {
        self.exclusions.iter().filter(|e| e.reason.is_warning()).count() + self.orphan_transcripts
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

pub struct GeneClassifier {
    config: ClassifierConfig,
}

impl GeneClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Exon count that decides the class, under the configured policy.
    fn effective_exon_count(
        &self,
        gene_id: &str,
        transcripts: &[TranscriptRecord],
    ) -> Result<usize, AnnotationError> {
        let count = match self.config.aggregation {
            ExonAggregation::MaxAcrossTranscripts => {
                transcripts.iter().map(|t| t.exon_count()).max().unwrap_or(0)
            }
            ExonAggregation::CanonicalOnly => {
                let canonical: Vec<&TranscriptRecord> =
                    transcripts.iter().filter(|t| t.is_canonical).collect();
                if canonical.is_empty() {
                    return Err(AnnotationError::IncompleteAnnotation {
                        gene_id: gene_id.to_string(),
                    });
                }
                canonical.iter().map(|t| t.exon_count()).max().unwrap_or(0)
            }
            ExonAggregation::AnySingleExon => {
                if transcripts.iter().any(|t| t.exon_count() == 1) {
                    1
                } else {
                    transcripts.iter().map(|t| t.exon_count()).max().unwrap_or(0)
                }
            }
        };

        if count == 0 {
            return Err(AnnotationError::MalformedTranscript {
                gene_id: gene_id.to_string(),
            });
        }
        Ok(count)
    }

    /// Decide a single gene.
    pub fn classify_gene(
        &self,
        store: &AnnotationStore,
        gene: &GeneRecord,
    ) -> Result<GeneCall, AnnotationError> {
        if !is_canonical(&gene.chromosome) {
            return Ok(GeneCall::Excluded(ExclusionReason::NonCanonicalChromosome));
        }

        let transcripts = store.transcripts(&gene.id)?;
        let exon_count = self.effective_exon_count(&gene.id, transcripts)?;

        if exon_count == 1 {
            if store.is_utr_flagged(&gene.id) {
                return Ok(GeneCall::Excluded(ExclusionReason::UtrIntron));
            }
            return Ok(GeneCall::Classified(GeneClass::Intronless));
        }
        Ok(GeneCall::Classified(GeneClass::MultiExonic))
    }

    /// Classify every gene in the store.
    pub fn classify(&self, store: &AnnotationStore) -> Classification {
        debug!(aggregation = ?self.config.aggregation, genes = store.len(), "Classifying");
        if !store.has_utr_db() {
            debug!("No UTR database supplied, UTR-intron exclusion disabled");
        }

        let mut result = Classification {
            orphan_transcripts: store.orphan_transcripts().len(),
            ..Default::default()
        };
        for gene in store.genes() {
            match self.classify_gene(store, gene) {
                Ok(GeneCall::Classified(class)) => {
                    result.genes.push(ClassifiedGene::from_record(gene, class));
                }
                Ok(GeneCall::Excluded(reason)) => {
                    result.exclusions.push(Exclusion { gene_id: gene.id.clone(), reason });
                }
                Err(e) => {
                    warn!("{}", e);
                    result.exclusions.push(Exclusion {
                        gene_id: gene.id.clone(),
                        reason: ExclusionReason::from(&e),
                    });
                }
            }
        }

        info!("Valid intronless genes: {}", result.count(GeneClass::Intronless));
        info!("Multi-exonic genes: {}", result.count(GeneClass::MultiExonic));
        for (reason, n) in result.exclusion_counts() {
            info!("Excluded ({}): {}", reason, n);
        }
        let warnings = result.warning_count();
        if warnings > 0 {
            warn!(
                "{} record(s) dropped because of incomplete or malformed annotation ({} orphan transcript(s))",
                warnings, result.orphan_transcripts
            );
        }

        result
    }
}
