//! Command-line arguments.

use clap::Parser;
use igfinder_common::run_config::ExonAggregation;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "igfinder",
    version,
    about = "Classify human genes as intronless or multi-exonic and compare the two groups"
)]
pub struct Args {
    /// Ensembl species name
    #[arg(long)]
    pub species: Option<String>,

    /// Tab-separated list of genes carrying UTR introns
    #[arg(long, value_name = "PATH")]
    pub utr_db: Option<PathBuf>,

    /// Output gene table
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Run the statistical tests and write the summary
    #[arg(long)]
    pub stats: bool,

    /// Statistics summary path
    #[arg(long, value_name = "PATH")]
    pub stats_output: Option<PathBuf>,

    /// Write plot-data tables
    #[arg(long)]
    pub plots: bool,

    /// Prefix for plot-data tables
    #[arg(long, value_name = "PREFIX")]
    pub plots_prefix: Option<String>,

    /// Log file, in addition to stdout
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Log to stdout only
    #[arg(long, conflicts_with = "log")]
    pub no_log_file: bool,

    /// Configuration file (default: igfinder.toml or $IGFINDER_CONFIG)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read annotation from a saved snapshot instead of Ensembl
    #[arg(long, value_name = "JSON")]
    pub annotations: Option<PathBuf>,

    /// Save the fetched annotation as a snapshot
    #[arg(long, value_name = "JSON")]
    pub save_annotations: Option<PathBuf>,

    /// How transcript exon counts are combined per gene
    #[arg(long, value_name = "POLICY")]
    pub aggregation: Option<ExonAggregation>,

    /// Skip Yates' correction on a chi-squared test with one degree of freedom
    #[arg(long)]
    pub no_yates: bool,

    /// Significance level used in the summary
    #[arg(long)]
    pub alpha: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::parse_from([
            "igfinder",
            "--species", "homo_sapiens",
            "--utr-db", "utr.tsv",
            "--output", "out.tsv",
            "--stats",
            "--plots",
            "--plots-prefix", "figs/run1",
            "--aggregation", "canonical",
        ]);
        assert_eq!(args.species.as_deref(), Some("homo_sapiens"));
        assert_eq!(args.utr_db, Some(PathBuf::from("utr.tsv")));
        assert!(args.stats && args.plots);
        assert!(!args.no_yates);
        assert_eq!(args.aggregation, Some(ExonAggregation::CanonicalOnly));
    }

    #[test]
    fn test_unknown_aggregation_rejected() {
        let err = Args::try_parse_from(["igfinder", "--aggregation", "median"]).unwrap_err();
        assert!(err.to_string().contains("median"));
    }

    #[test]
    fn test_log_options_conflict() {
        assert!(Args::try_parse_from(["igfinder", "--log", "x.txt", "--no-log-file"]).is_err());
    }
}
