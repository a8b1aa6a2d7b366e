//! igfinder-ensembl — Gene annotation retrieval.
//! - Ensembl REST client (assembly, windowed overlap, batched lookup)
//! - JSON snapshots for offline re-runs

pub mod models;
pub mod sources;

pub use sources::ensembl::{EnsemblClient, LookupBatch};
pub use sources::snapshot::{AnnotationSnapshot, SnapshotSource};
pub use sources::AnnotationSource;
