use thiserror::Error;

/// Errors raised while obtaining or interpreting gene annotation.
///
/// `Unavailable` is fatal to a run. The per-gene variants are recovered by
/// excluding the gene and counting a warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("Annotation source unavailable: {0}")]
    Unavailable(String),

    #[error("Incomplete annotation: gene {gene_id} has no usable transcripts")]
    IncompleteAnnotation { gene_id: String },

    #[error("Malformed transcript: gene {gene_id} has no exons recorded")]
    MalformedTranscript { gene_id: String },
}

impl AnnotationError {
    /// True for errors that only affect a single gene.
    pub fn is_per_gene(&self) -> bool {
        !matches!(self, AnnotationError::Unavailable(_))
    }
}

#[derive(Debug, Error)]
pub enum IgFinderError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TSV error: {0}")]
    Tsv(#[from] csv::Error),

    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network policy violation: {0}")]
    Security(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, IgFinderError>;
