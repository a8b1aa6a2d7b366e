//! Snapshot source: a saved annotation is served back unchanged.

use igfinder_common::error::AnnotationError;
use igfinder_ensembl::{AnnotationSnapshot, AnnotationSource, SnapshotSource};
use igfinder_test_utils::scenario_genes;

#[tokio::test]
async fn test_snapshot_source_serves_saved_genes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("homo_sapiens.json");

    let genes = scenario_genes();
    AnnotationSnapshot::new("homo_sapiens", genes.clone()).save(&path).unwrap();

    let source = SnapshotSource::new(&path);
    let loaded = source.fetch_genes("homo_sapiens").await.unwrap();
    assert_eq!(loaded, genes);
    assert_eq!(source.name(), "snapshot");
}

#[tokio::test]
async fn test_snapshot_species_mismatch_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mouse.json");
    AnnotationSnapshot::new("mus_musculus", scenario_genes()).save(&path).unwrap();

    let err = SnapshotSource::new(&path).fetch_genes("homo_sapiens").await.unwrap_err();
    assert!(matches!(err, AnnotationError::Unavailable(_)));
}

#[tokio::test]
async fn test_missing_snapshot_is_unavailable() {
    let err = SnapshotSource::new("/nonexistent/snapshot.json")
        .fetch_genes("homo_sapiens")
        .await
        .unwrap_err();
    assert!(matches!(err, AnnotationError::Unavailable(_)));
}
