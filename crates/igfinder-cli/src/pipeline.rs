//! One IGFinder run: fetch, classify, test, write.

use anyhow::Context;
use igfinder_common::entities::GeneClass;
use igfinder_common::utr_db::UtrIntronDb;
use igfinder_core::report::{write_gene_table_to_path, write_plot_data, StatisticsSummary};
use igfinder_core::{AnnotationStore, ChromosomeComparator, Classification, GeneClassifier, LengthComparator};
use igfinder_ensembl::{AnnotationSnapshot, AnnotationSource};
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;

/// Files produced by a run, with the partition they were built from.
#[derive(Debug)]
pub struct RunOutcome {
    pub classification: Classification,
    pub written: Vec<PathBuf>,
}

pub struct Pipeline {
    config: Config,
    save_annotations: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config, save_annotations: None }
    }

    /// Save the fetched annotation as a snapshot before classifying.
    pub fn save_annotations(mut self, path: Option<PathBuf>) -> Self {
        self.save_annotations = path;
        self
    }

    fn load_utr_db(&self) -> anyhow::Result<Option<UtrIntronDb>> {
        let utr = &self.config.run.utr_db;
        let Some(path) = &utr.path else {
            info!("No UTR-intron database given, single-exon genes are not filtered");
            return Ok(None);
        };
        let db = UtrIntronDb::load(path, utr.gene_id_column)
            .with_context(|| format!("Failed to load UTR-intron database {}", path.display()))?;
        Ok(Some(db))
    }

    pub async fn run(&self, source: &dyn AnnotationSource) -> anyhow::Result<RunOutcome> {
        let species = &self.config.species;
        let run = &self.config.run;

        // Fail on a bad UTR path before spending time on the network
        let utr_db = self.load_utr_db()?;

        info!(source = source.name(), species = %species, "Fetching gene annotation");
        let genes = source
            .fetch_genes(species)
            .await
            .with_context(|| format!("Could not obtain annotation for {species}"))?;
        info!("Total genes found: {}", genes.len());

        if let Some(path) = &self.save_annotations {
            AnnotationSnapshot::new(species, genes.clone()).save(path)?;
        }

        let store = AnnotationStore::new(genes, utr_db);
        let classification = GeneClassifier::new(run.classifier.clone()).classify(&store);

        let mut written = Vec::new();
        write_gene_table_to_path(&run.output.gene_table, &classification)?;
        written.push(run.output.gene_table.clone());

        if run.output.stats {
            let length = LengthComparator::new().compare_classification(&classification);
            let chromosome = ChromosomeComparator::new(run.stats.clone()).compare_classification(&classification);
            let summary = StatisticsSummary::new(species, run.stats.alpha, &classification, length, chromosome)
                .with_utr_db(store.utr_db());
            summary.write_to_path(&run.output.stats_path)?;
            written.push(run.output.stats_path.clone());
        }

        if run.output.plots {
            written.extend(write_plot_data(&run.output.plots_prefix, &classification)?);
        }

        info!(
            intronless = classification.count(GeneClass::Intronless),
            multi_exonic = classification.count(GeneClass::MultiExonic),
            excluded = classification.exclusions.len(),
            "Run complete"
        );
        Ok(RunOutcome { classification, written })
    }
}
