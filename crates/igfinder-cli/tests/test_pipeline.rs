//! End-to-end runs against in-memory and snapshot annotation sources.

use async_trait::async_trait;
use igfinder_cli::{Config, Pipeline};
use igfinder_common::entities::{GeneAnnotation, GeneClass};
use igfinder_common::error::AnnotationError;
use igfinder_core::ExclusionReason;
use igfinder_ensembl::{AnnotationSnapshot, AnnotationSource, SnapshotSource};
use igfinder_test_utils::{multi_exon_gene, scenario_genes, single_exon_gene};
use std::path::Path;

struct StaticSource(Vec<GeneAnnotation>);

#[async_trait]
impl AnnotationSource for StaticSource {
    async fn fetch_genes(&self, _species: &str) -> Result<Vec<GeneAnnotation>, AnnotationError> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

struct DownSource;

#[async_trait]
impl AnnotationSource for DownSource {
    async fn fetch_genes(&self, _species: &str) -> Result<Vec<GeneAnnotation>, AnnotationError> {
        Err(AnnotationError::Unavailable("503 after 5 retries".to_string()))
    }

    fn name(&self) -> &'static str {
        "down"
    }
}

fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.run.output.gene_table = dir.join("genes.tsv");
    config.run.output.stats_path = dir.join("stats.txt");
    config.run.output.plots_prefix = dir.join("plots").to_string_lossy().into_owned();
    config.run.output.log_path = None;
    config
}

#[tokio::test]
async fn test_scenario_with_utr_database() {
    let dir = tempfile::tempdir().unwrap();
    let utr_path = dir.path().join("utr.tsv");
    std::fs::write(&utr_path, "# start\tend\tgene\n20010\t20100\tG4\n").unwrap();

    let mut config = config_in(dir.path());
    config.run.utr_db.path = Some(utr_path);
    config.run.output.stats = true;

    let outcome = Pipeline::new(config)
        .run(&StaticSource(scenario_genes()))
        .await
        .unwrap();

    let c = &outcome.classification;
    assert_eq!(c.class_of("G1"), Some(GeneClass::Intronless));
    assert_eq!(c.class_of("G2"), Some(GeneClass::MultiExonic));
    assert_eq!(c.exclusion_of("G3"), Some(ExclusionReason::NonCanonicalChromosome));
    assert_eq!(c.exclusion_of("G4"), Some(ExclusionReason::UtrIntron));

    let table = std::fs::read_to_string(dir.path().join("genes.tsv")).unwrap();
    let ids: Vec<&str> = table.lines().skip(1).map(|l| l.split('\t').next().unwrap()).collect();
    assert_eq!(ids, vec!["G1", "G2"]);
    assert_eq!(outcome.written.len(), 2);

    let summary = std::fs::read_to_string(dir.path().join("stats.txt")).unwrap();
    assert!(summary.contains("UTR-intron database: 1 genes (1 entries, 1 with coordinates)"));
}

#[tokio::test]
async fn test_stats_and_plots_written() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.run.output.stats = true;
    config.run.output.plots = true;

    let genes = vec![
        single_exon_gene("A", "1", 400),
        single_exon_gene("B", "2", 650),
        single_exon_gene("C", "3", 900),
        multi_exon_gene("D", "1", 18_000, 4),
        multi_exon_gene("E", "2", 26_000, 7),
        multi_exon_gene("F", "3", 41_000, 11),
    ];
    let outcome = Pipeline::new(config).run(&StaticSource(genes)).await.unwrap();
    assert_eq!(outcome.written.len(), 4);

    let summary = std::fs::read_to_string(dir.path().join("stats.txt")).unwrap();
    assert!(summary.contains("Welch t-test"));
    assert!(summary.contains("chi2 = "));
    assert!(dir.path().join("plots_lengths.tsv").exists());
    assert!(dir.path().join("plots_chromosomal_distribution.tsv").exists());
}

#[tokio::test]
async fn test_failed_tests_do_not_abort_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.run.output.stats = true;

    let outcome = Pipeline::new(config)
        .run(&StaticSource(vec![single_exon_gene("A", "1", 300)]))
        .await
        .unwrap();
    assert_eq!(outcome.classification.genes.len(), 1);

    let summary = std::fs::read_to_string(dir.path().join("stats.txt")).unwrap();
    assert_eq!(summary.matches("not computable").count(), 2);
}

#[tokio::test]
async fn test_snapshot_round_trip_gives_same_partition() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("annotation.json");

    let first = Pipeline::new(config_in(dir.path()))
        .save_annotations(Some(snapshot.clone()))
        .run(&StaticSource(scenario_genes()))
        .await
        .unwrap();
    assert!(AnnotationSnapshot::load(&snapshot).is_ok());

    let second = Pipeline::new(config_in(dir.path()))
        .run(&SnapshotSource::new(snapshot))
        .await
        .unwrap();
    assert_eq!(first.classification, second.classification);
}

#[tokio::test]
async fn test_unavailable_source_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = Pipeline::new(config_in(dir.path())).run(&DownSource).await.unwrap_err();
    assert!(format!("{err:#}").contains("503"));
    assert!(!dir.path().join("genes.tsv").exists());
}

#[tokio::test]
async fn test_missing_utr_database_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.run.utr_db.path = Some(dir.path().join("missing.tsv"));

    let err = Pipeline::new(config)
        .run(&StaticSource(scenario_genes()))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("UTR"));
}
