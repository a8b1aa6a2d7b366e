//! Annotation source clients.

pub mod ensembl;
pub mod snapshot;

use async_trait::async_trait;
use igfinder_common::entities::GeneAnnotation;
use igfinder_common::error::AnnotationError;

/// Common interface for anything that can supply gene annotation for a species.
///
/// Implementations retry transient failures internally and report only
/// permanent ones, as [`AnnotationError::Unavailable`].
#[async_trait]
pub trait AnnotationSource: Send + Sync {
    /// Every gene on the canonical chromosomes with the exon structure of each of its transcripts.
    async fn fetch_genes(&self, species: &str) -> Result<Vec<GeneAnnotation>, AnnotationError>;

    /// Short name used in log lines.
    fn name(&self) -> &'static str;
}
