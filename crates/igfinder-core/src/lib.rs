//! igfinder-core — Classification of human genes into intronless and
//! multi-exonic classes, and the statistics comparing the two.
//!
//! Everything here is synchronous and works on an already-built
//! [`AnnotationStore`]:
//!
//! 1. [`GeneClassifier`] partitions the store's genes
//! 2. [`LengthComparator`] runs Welch's t-test on gene lengths
//! 3. [`ChromosomeComparator`] runs a chi-squared test on chromosome counts
//! 4. [`report`] writes the gene table, summary and plot data

pub mod error;
pub mod store;
pub mod classifier;
pub mod distribution;
pub mod length;
pub mod chromosome;
pub mod report;

pub use chromosome::{ChromosomeComparator, ChromosomeComparison, ContingencyTable};
pub use classifier::{Classification, Exclusion, ExclusionReason, GeneCall, GeneClassifier};
pub use error::StatsError;
pub use length::{LengthComparator, LengthComparison};
pub use report::{write_gene_table, write_plot_data, Descriptive, StatisticsSummary, UtrDbSummary};
pub use store::AnnotationStore;
