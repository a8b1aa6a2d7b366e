//! Chromosomal distribution of intronless vs multi-exonic genes.
//!
//! Pearson's chi-squared test of independence on a 2 x 22 table
//! (class x autosome). Autosomes with no genes in either class are dropped
//! before expected frequencies are computed and reported separately.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classifier::Classification;
use crate::distribution::chi_squared_sf;
use crate::error::{Result, StatsError};
use igfinder_common::chromosome::{canonical_chromosomes, canonical_index, CANONICAL_CHROMOSOME_COUNT};
use igfinder_common::entities::{ClassifiedGene, GeneClass};
use igfinder_common::run_config::StatsConfig;

/// Gene counts per class (rows) and autosome (columns "1".."22").
///
/// Both rows always have one cell per chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyTable {
    chromosomes: Vec<String>,
    counts: [Vec<u64>; 2],
}

impl Default for ContingencyTable {
    fn default() -> Self {
        Self {
            chromosomes: canonical_chromosomes(),
            counts: [
                vec![0; CANONICAL_CHROMOSOME_COUNT],
                vec![0; CANONICAL_CHROMOSOME_COUNT],
            ],
        }
    }
}

impl ContingencyTable {
    /// Table over arbitrary columns; rows must match the column count.
    pub fn new(chromosomes: Vec<String>, intronless: Vec<u64>, multi_exonic: Vec<u64>) -> Result<Self> {
        let table = Self {
            chromosomes,
            counts: [intronless, multi_exonic],
        };
        table.check_shape()?;
        Ok(table)
    }

    fn check_shape(&self) -> Result<()> {
        let columns = self.chromosomes.len();
        for class in GeneClass::ALL {
            let cells = self.counts[class.index()].len();
            if cells != columns {
                return Err(StatsError::DegenerateTable(format!(
                    "{} row has {} cells for {} chromosomes",
                    class, cells, columns
                )));
            }
        }
        Ok(())
    }

    pub fn chromosomes(&self) -> &[String] {
        &self.chromosomes
    }

    pub fn from_genes<'a>(genes: impl IntoIterator<Item = &'a ClassifiedGene>) -> Self {
        let mut table = Self::default();
        for gene in genes {
            match canonical_index(&gene.chromosome) {
                Some(col) => table.counts[gene.class.index()][col] += 1,
                None => warn!(
                    gene = %gene.gene_id,
                    chromosome = %gene.chromosome,
                    "Classified gene on a non-canonical chromosome, left out of the table"
                ),
            }
        }
        table
    }

    pub fn count(&self, class: GeneClass, col: usize) -> u64 {
        self.counts[class.index()][col]
    }

    pub fn row_total(&self, class: GeneClass) -> u64 {
        self.counts[class.index()].iter().sum()
    }

    pub fn column_total(&self, col: usize) -> u64 {
        self.counts[0][col] + self.counts[1][col]
    }

    pub fn total(&self) -> u64 {
        GeneClass::ALL.iter().map(|&c| self.row_total(c)).sum()
    }
}

/// Chi-squared test result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromosomeComparison {
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
    pub contingency_table: ContingencyTable,
    /// Autosomes with no genes in either class
    pub dropped_columns: Vec<String>,
    pub yates_corrected: bool,
}

pub struct ChromosomeComparator {
    config: StatsConfig,
}

impl ChromosomeComparator {
    pub fn new(config: StatsConfig) -> Self {
        Self { config }
    }

    pub fn compare_classification(&self, classification: &Classification) -> Result<ChromosomeComparison> {
        self.compare(ContingencyTable::from_genes(&classification.genes))
    }

    pub fn compare(&self, table: ContingencyTable) -> Result<ChromosomeComparison> {
        // Deserialized tables skip the constructor
        table.check_shape()?;
        let (kept, dropped): (Vec<usize>, Vec<usize>) =
            (0..table.chromosomes.len()).partition(|&col| table.column_total(col) > 0);

        if kept.len() < 2 {
            return Err(StatsError::InsufficientSample(format!(
                "{} chromosome(s) with genes, need at least 2",
                kept.len()
            )));
        }
        for class in GeneClass::ALL {
            if table.row_total(class) == 0 {
                return Err(StatsError::DegenerateTable(format!("no {} genes", class)));
            }
        }

        let degrees_of_freedom = kept.len() - 1;
        let yates = self.config.yates_correction && degrees_of_freedom == 1;
        let n = table.total() as f64;

        let mut statistic = 0.0;
        for class in GeneClass::ALL {
            let row_total = table.row_total(class) as f64;
            for &col in &kept {
                let expected = row_total * table.column_total(col) as f64 / n;
                let mut diff = (table.count(class, col) as f64 - expected).abs();
                if yates {
                    diff -= diff.min(0.5);
                }
                statistic += diff * diff / expected;
            }
        }
        let p_value = chi_squared_sf(statistic, degrees_of_freedom as f64);

        let dropped_columns: Vec<String> =
            dropped.iter().map(|&col| table.chromosomes[col].clone()).collect();
        info!(
            chi2 = statistic,
            df = degrees_of_freedom,
            p = p_value,
            dropped = dropped_columns.len(),
            "Chromosomal distribution (chi-squared test)"
        );

        Ok(ChromosomeComparison {
            statistic,
            p_value,
            degrees_of_freedom,
            contingency_table: table,
            dropped_columns,
            yates_corrected: yates,
        })
    }
}
