//! igfinder-common — Shared types, errors, and configuration used across all IGFinder crates.

pub mod error;
pub mod entities;
pub mod chromosome;
pub mod run_config;
pub mod utr_db;
pub mod http;

// Re-export commonly used types
pub use entities::{ClassifiedGene, Exon, GeneAnnotation, GeneClass, GeneRecord, Strand, TranscriptRecord};
pub use error::{AnnotationError, IgFinderError};
pub use run_config::{ClassifierConfig, EnsemblConfig, ExonAggregation, OutputConfig, RunConfig, StatsConfig, UtrDbConfig};
pub use utr_db::{UtrIntronDb, UtrIntronEntry};
