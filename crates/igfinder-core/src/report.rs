//! Output files: gene table, statistics summary, plot data.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::chromosome::ChromosomeComparison;
use crate::classifier::{Classification, ExclusionReason};
use crate::error::StatsError;
use crate::length::LengthComparison;
use igfinder_common::entities::GeneClass;
use igfinder_common::error::Result;
use igfinder_common::utr_db::UtrIntronDb;

const GENE_TABLE_HEADER: [&str; 7] = ["gene_id", "class", "chromosome", "start", "end", "length", "biotype"];

fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer)
}

// ── Gene table ───────────────────────────────────────────────────────────────

/// One row per classified gene, header always present.
pub fn write_gene_table<W: Write>(writer: W, classification: &Classification) -> Result<()> {
    let mut tsv = tsv_writer(writer);
    tsv.write_record(GENE_TABLE_HEADER)?;
    for gene in &classification.genes {
        tsv.serialize(gene)?;
    }
    tsv.flush()?;
    Ok(())
}

pub fn write_gene_table_to_path(path: impl AsRef<Path>, classification: &Classification) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    write_gene_table(file, classification)?;
    info!("Gene table written to {}", path.display());
    Ok(())
}

// ── Plot data ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct LengthRow<'a> {
    class: GeneClass,
    length: u64,
    gene_id: &'a str,
}

/// Write `<prefix>_lengths.tsv` and `<prefix>_chromosomal_distribution.tsv`.
/// Returns the paths written.
pub fn write_plot_data(prefix: &str, classification: &Classification) -> Result<Vec<PathBuf>> {
    let lengths_path = PathBuf::from(format!("{prefix}_lengths.tsv"));
    let mut tsv = tsv_writer(std::fs::File::create(&lengths_path)?);
    tsv.write_record(["class", "length", "gene_id"])?;
    for gene in &classification.genes {
        tsv.serialize(LengthRow {
            class: gene.class,
            length: gene.length,
            gene_id: &gene.gene_id,
        })?;
    }
    tsv.flush()?;

    let distribution_path = PathBuf::from(format!("{prefix}_chromosomal_distribution.tsv"));
    let table = crate::chromosome::ContingencyTable::from_genes(&classification.genes);
    let mut tsv = tsv_writer(std::fs::File::create(&distribution_path)?);
    tsv.write_record(["chromosome", "intronless", "multi-exonic"])?;
    for (col, chromosome) in table.chromosomes().iter().enumerate() {
        tsv.write_record([
            chromosome.clone(),
            table.count(GeneClass::Intronless, col).to_string(),
            table.count(GeneClass::MultiExonic, col).to_string(),
        ])?;
    }
    tsv.flush()?;

    info!(
        "Plot data written to {} and {}",
        lengths_path.display(),
        distribution_path.display()
    );
    Ok(vec![lengths_path, distribution_path])
}

// ── Statistics summary ───────────────────────────────────────────────────────

/// Count, mean, median and range of gene lengths in one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Descriptive {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl Descriptive {
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let n = sorted.len();
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        Some(Self {
            count: n,
            mean: sorted.iter().sum::<f64>() / n as f64,
            median,
            min: sorted[0],
            max: sorted[n - 1],
        })
    }
}

/// What the UTR-intron database contributed to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtrDbSummary {
    pub genes: usize,
    pub entries: usize,
    pub with_coordinates: usize,
}

impl UtrDbSummary {
    pub fn of(db: &UtrIntronDb) -> Self {
        Self {
            genes: db.gene_count(),
            entries: db.entries().len(),
            with_coordinates: db.entries().iter().filter(|e| e.coordinates.is_some()).count(),
        }
    }
}

pub struct StatisticsSummary {
    pub species: String,
    pub generated_at: DateTime<Utc>,
    pub alpha: f64,
    pub descriptive: BTreeMap<GeneClass, Option<Descriptive>>,
    pub biotypes: BTreeMap<GeneClass, BTreeMap<String, usize>>,
    pub exclusions: BTreeMap<ExclusionReason, usize>,
    pub orphan_transcripts: usize,
    pub utr_db: Option<UtrDbSummary>,
    pub length: std::result::Result<LengthComparison, StatsError>,
    pub chromosome: std::result::Result<ChromosomeComparison, StatsError>,
}

impl StatisticsSummary {
    pub fn new(
        species: &str,
        alpha: f64,
        classification: &Classification,
        length: std::result::Result<LengthComparison, StatsError>,
        chromosome: std::result::Result<ChromosomeComparison, StatsError>,
    ) -> Self {
        let mut descriptive = BTreeMap::new();
        let mut biotypes: BTreeMap<GeneClass, BTreeMap<String, usize>> = BTreeMap::new();
        for class in GeneClass::ALL {
            descriptive.insert(class, Descriptive::of(&classification.lengths(class)));
            let counts = biotypes.entry(class).or_default();
            for gene in classification.of_class(class) {
                *counts.entry(gene.biotype.clone()).or_insert(0) += 1;
            }
        }

        Self {
            species: species.to_string(),
            generated_at: Utc::now(),
            alpha,
            descriptive,
            biotypes,
            exclusions: classification.exclusion_counts(),
            orphan_transcripts: classification.orphan_transcripts,
            utr_db: None,
            length,
            chromosome,
        }
    }

    /// Record the UTR-intron database the run filtered with, if any.
    pub fn with_utr_db(mut self, db: Option<&UtrIntronDb>) -> Self {
        self.utr_db = db.map(UtrDbSummary::of);
        self
    }

    fn verdict(&self, p: f64) -> &'static str {
        if p < self.alpha { "significant" } else { "not significant" }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "IGFinder statistics summary")?;
        writeln!(out, "Species: {}", self.species)?;
        writeln!(out, "Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(out)?;

        writeln!(out, "== Gene counts ==")?;
        for (class, stats) in &self.descriptive {
            match stats {
                Some(d) => writeln!(
                    out,
                    "{}: {} genes, length mean {:.1}, median {:.1}, min {:.0}, max {:.0}",
                    class, d.count, d.mean, d.median, d.min, d.max
                )?,
                None => writeln!(out, "{}: 0 genes", class)?,
            }
        }
        if self.exclusions.is_empty() {
            writeln!(out, "Excluded: none")?;
        }
        for (reason, n) in &self.exclusions {
            writeln!(out, "Excluded ({}): {}", reason, n)?;
        }
        if self.orphan_transcripts > 0 {
            writeln!(out, "Transcripts without a listed gene: {}", self.orphan_transcripts)?;
        }
        match &self.utr_db {
            Some(db) => writeln!(
                out,
                "UTR-intron database: {} genes ({} entries, {} with coordinates)",
                db.genes, db.entries, db.with_coordinates
            )?,
            None => writeln!(out, "UTR-intron database: not used")?,
        }
        writeln!(out)?;

        writeln!(out, "== Biotypes ==")?;
        for (class, counts) in &self.biotypes {
            let mut sorted: Vec<(&String, &usize)> = counts.iter().collect();
            sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            let listed: Vec<String> = sorted.iter().map(|(b, n)| format!("{b} {n}")).collect();
            let listed = if listed.is_empty() { "none".to_string() } else { listed.join(", ") };
            writeln!(out, "{}: {}", class, listed)?;
        }
        writeln!(out)?;

        writeln!(out, "== Gene length (Welch t-test) ==")?;
        match &self.length {
            Ok(r) => {
                writeln!(out, "n intronless = {}, n multi-exonic = {}", r.n_intronless, r.n_multi_exonic)?;
                writeln!(
                    out,
                    "mean intronless = {:.1}, mean multi-exonic = {:.1}",
                    r.mean_intronless, r.mean_multi_exonic
                )?;
                writeln!(out, "t = {:.4}, df = {:.2}, p = {:.4e}", r.statistic, r.degrees_of_freedom, r.p_value)?;
                writeln!(out, "Difference is {} at alpha = {}", self.verdict(r.p_value), self.alpha)?;
            }
            Err(e) => writeln!(out, "not computable: {}", e)?,
        }
        writeln!(out)?;

        writeln!(out, "== Chromosomal distribution (chi-squared test) ==")?;
        match &self.chromosome {
            Ok(r) => {
                writeln!(out, "chromosome\tintronless\tmulti-exonic")?;
                let table = &r.contingency_table;
                for (col, chromosome) in table.chromosomes().iter().enumerate() {
                    writeln!(
                        out,
                        "{}\t{}\t{}",
                        chromosome,
                        table.count(GeneClass::Intronless, col),
                        table.count(GeneClass::MultiExonic, col)
                    )?;
                }
                if !r.dropped_columns.is_empty() {
                    writeln!(out, "Chromosomes without genes (left out): {}", r.dropped_columns.join(", "))?;
                }
                let correction = if r.yates_corrected { " (Yates corrected)" } else { "" };
                writeln!(
                    out,
                    "chi2 = {:.4}{}, df = {}, p = {:.4e}",
                    r.statistic, correction, r.degrees_of_freedom, r.p_value
                )?;
                writeln!(out, "Distribution difference is {} at alpha = {}", self.verdict(r.p_value), self.alpha)?;
            }
            Err(e) => writeln!(out, "not computable: {}", e)?,
        }
        Ok(())
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.render())?;
        info!("Statistics summary written to {}", path.display());
        Ok(())
    }
}

impl fmt::Display for StatisticsSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::ChromosomeComparator;
    use crate::classifier::GeneClassifier;
    use crate::length::LengthComparator;
    use crate::store::AnnotationStore;
    use igfinder_common::run_config::{ClassifierConfig, StatsConfig};
    use igfinder_test_utils::{multi_exon_gene, scenario_genes, GeneFixture};
    use pretty_assertions::assert_eq;

    fn scenario() -> Classification {
        let store = AnnotationStore::new(scenario_genes(), None);
        GeneClassifier::new(ClassifierConfig::default()).classify(&store)
    }

    #[test]
    fn test_gene_table_layout() {
        let mut buf = Vec::new();
        write_gene_table(&mut buf, &scenario()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "gene_id\tclass\tchromosome\tstart\tend\tlength\tbiotype");
        assert_eq!(lines[1], "G1\tintronless\t1\t100\t1099\t1000\tprotein_coding");
        assert_eq!(lines[2], "G2\tmulti-exonic\t1\t5000\t9999\t5000\tprotein_coding");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_empty_gene_table_keeps_header() {
        let mut buf = Vec::new();
        write_gene_table(&mut buf, &Classification::default()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_descriptive() {
        let d = Descriptive::of(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(d.count, 4);
        assert_eq!(d.median, 2.5);
        assert_eq!(d.mean, 2.5);
        assert_eq!((d.min, d.max), (1.0, 4.0));
        assert_eq!(Descriptive::of(&[7.0, 1.0, 3.0]).unwrap().median, 3.0);
        assert!(Descriptive::of(&[]).is_none());
    }

    #[test]
    fn test_summary_reports_failed_tests() {
        let classification = scenario();
        let length = LengthComparator::new().compare_classification(&classification);
        let chromosome = ChromosomeComparator::new(StatsConfig::default()).compare_classification(&classification);
        let summary = StatisticsSummary::new("homo_sapiens", 0.05, &classification, length, chromosome);
        let text = summary.render();

        assert!(text.contains("Species: homo_sapiens"));
        assert!(text.contains("not computable: insufficient sample"));
        assert!(text.contains("intronless: 2 genes"));
        assert!(text.contains("Excluded (non-canonical chromosome): 1"));
        assert!(text.contains("protein_coding 1"));
        assert!(text.contains("UTR-intron database: not used"));
        assert!(!text.contains("Transcripts without a listed gene"));
    }

    #[test]
    fn test_summary_describes_utr_database() {
        let db = UtrIntronDb::from_reader("1000\t1200\tG4\n1500\tx\tG4\nG9\n".as_bytes(), 2).unwrap();
        let store = AnnotationStore::new(scenario_genes(), Some(db));
        let classification = GeneClassifier::new(ClassifierConfig::default()).classify(&store);
        let length = LengthComparator::new().compare_classification(&classification);
        let chromosome = ChromosomeComparator::new(StatsConfig::default()).compare_classification(&classification);

        let summary = StatisticsSummary::new("homo_sapiens", 0.05, &classification, length, chromosome)
            .with_utr_db(store.utr_db());
        assert_eq!(
            summary.utr_db,
            Some(UtrDbSummary { genes: 2, entries: 3, with_coordinates: 1 })
        );
        let text = summary.render();
        assert!(text.contains("UTR-intron database: 2 genes (3 entries, 1 with coordinates)"));
        assert!(text.contains("Excluded (UTR intron): 1"));
    }

    #[test]
    fn test_summary_counts_orphan_transcripts() {
        let mut stray = GeneFixture::new("GHOST", "1").transcript(1).build();
        stray.transcripts[0].gene_id = "MISSING".to_string();
        let mut genes = scenario_genes();
        genes.push(stray);

        let store = AnnotationStore::new(genes, None);
        let classification = GeneClassifier::new(ClassifierConfig::default()).classify(&store);
        let length = LengthComparator::new().compare_classification(&classification);
        let chromosome = ChromosomeComparator::new(StatsConfig::default()).compare_classification(&classification);

        let text = StatisticsSummary::new("homo_sapiens", 0.05, &classification, length, chromosome).render();
        assert!(text.contains("Transcripts without a listed gene: 1"));
    }

    #[test]
    fn test_summary_with_results() {
        let genes = vec![
            GeneFixture::new("A", "1").length(400).biotype("lncRNA").transcript(1).build(),
            GeneFixture::new("B", "2").length(600).transcript(1).build(),
            GeneFixture::new("C", "3").length(800).transcript(1).build(),
            multi_exon_gene("D", "1", 20_000, 4),
            multi_exon_gene("E", "2", 25_000, 6),
            multi_exon_gene("F", "3", 40_000, 9),
        ];
        let store = AnnotationStore::new(genes, None);
        let classification = GeneClassifier::new(ClassifierConfig::default()).classify(&store);
        let length = LengthComparator::new().compare_classification(&classification);
        let chromosome = ChromosomeComparator::new(StatsConfig::default()).compare_classification(&classification);
        assert!(length.is_ok());
        assert!(chromosome.is_ok());

        let text = StatisticsSummary::new("homo_sapiens", 0.05, &classification, length, chromosome).to_string();
        assert!(text.contains("t = "));
        assert!(text.contains("chi2 = "));
        assert!(text.contains("df = 2"));
        assert!(text.contains("Chromosomes without genes (left out): 4, 5"));
        assert!(text.contains("lncRNA 1"));
        assert!(!text.contains("not computable"));
    }

    #[test]
    fn test_plot_data_files() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("plots");
        let paths = write_plot_data(prefix.to_str().unwrap(), &scenario()).unwrap();
        assert_eq!(paths.len(), 2);

        let lengths = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(lengths.starts_with("class\tlength\tgene_id\n"));
        assert!(lengths.contains("intronless\t1000\tG1"));

        let distribution = std::fs::read_to_string(&paths[1]).unwrap();
        let lines: Vec<&str> = distribution.lines().collect();
        assert_eq!(lines.len(), 23);
        assert_eq!(lines[1], "1\t2\t1");
        assert_eq!(lines[22], "22\t0\t0");
    }
}
