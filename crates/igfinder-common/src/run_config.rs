//! Run configuration.
//!
//! Every component receives its own section at construction; nothing reads
//! process-wide state. Sections can be written in YAML, JSON or TOML and any
//! missing field falls back to its default.

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Complete configuration of one IGFinder run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Remote annotation source
    #[serde(default)]
    pub ensembl: EnsemblConfig,

    /// Classification rules
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// UTR-intron exclusion database
    #[serde(default)]
    pub utr_db: UtrDbConfig,

    /// Hypothesis tests
    #[serde(default)]
    pub stats: StatsConfig,

    /// Output artifacts
    #[serde(default)]
    pub output: OutputConfig,
}

// ── Ensembl ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsemblConfig {
    /// REST server root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bases per overlap query; large regions are rejected by the server
    #[serde(default = "default_window_size")]
    pub window_size: u64,

    /// Identifiers per `/lookup/id` POST
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Attempts after the first failure before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Hosts approved in addition to the built-in Ensembl servers, e.g. a mirror
    #[serde(default)]
    pub extra_hosts: Vec<String>,
}

fn default_base_url() -> String { "https://rest.ensembl.org".to_string() }
fn default_window_size() -> u64 { 1_000_000 }
fn default_batch_size() -> usize { 50 }
fn default_max_retries() -> u32 { 5 }
fn default_base_delay_ms() -> u64 { 500 }
fn default_max_delay_ms() -> u64 { 30_000 }
fn default_timeout_secs() -> u64 { 60 }
fn default_user_agent() -> String { format!("IGFinder/{}", env!("CARGO_PKG_VERSION")) }

impl Default for EnsemblConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            window_size: default_window_size(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            extra_hosts: Vec::new(),
        }
    }
}

// ── Classifier ───────────────────────────────────────────────────────────────

/// How exon evidence from several transcripts is combined into one gene-level call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExonAggregation {
    /// Highest exon count over all transcripts; one spliced transcript makes the gene multi-exonic
    #[default]
    MaxAcrossTranscripts,
    /// Only transcripts flagged canonical are considered
    CanonicalOnly,
    /// Single-exon as soon as any transcript has exactly one exon
    AnySingleExon,
}

impl ExonAggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExonAggregation::MaxAcrossTranscripts => "max",
            ExonAggregation::CanonicalOnly        => "canonical",
            ExonAggregation::AnySingleExon        => "any-single-exon",
        }
    }
}

impl FromStr for ExonAggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "max" | "max-across-transcripts" => Ok(ExonAggregation::MaxAcrossTranscripts),
            "canonical" | "canonical-only"   => Ok(ExonAggregation::CanonicalOnly),
            "any-single-exon"                => Ok(ExonAggregation::AnySingleExon),
            other => Err(format!(
                "unknown exon aggregation policy '{other}' (expected max, canonical or any-single-exon)"
            )),
        }
    }
}

impl std::fmt::Display for ExonAggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub aggregation: ExonAggregation,
}

// ── UTR database ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtrDbConfig {
    /// TSV of genes carrying UTR introns; `None` disables UTR exclusion
    pub path: Option<PathBuf>,

    /// Zero-based column holding the gene identifier
    #[serde(default = "default_gene_id_column")]
    pub gene_id_column: usize,
}

fn default_gene_id_column() -> usize { 2 }

impl Default for UtrDbConfig {
    fn default() -> Self {
        Self {
            path: None,
            gene_id_column: default_gene_id_column(),
        }
    }
}

// ── Statistics ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Significance level used when describing results
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Apply Yates' continuity correction when the chromosome test has one
    /// degree of freedom. On by default; false gives the plain Pearson statistic
    #[serde(default = "default_yates_correction")]
    pub yates_correction: bool,
}

fn default_alpha() -> f64 { 0.05 }
fn default_yates_correction() -> bool { true }

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            yates_correction: default_yates_correction(),
        }
    }
}

// ── Output ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_gene_table")]
    pub gene_table: PathBuf,

    /// Write the statistics summary
    #[serde(default)]
    pub stats: bool,

    #[serde(default = "default_stats_path")]
    pub stats_path: PathBuf,

    /// Write plot-data tables
    #[serde(default)]
    pub plots: bool,

    #[serde(default = "default_plots_prefix")]
    pub plots_prefix: String,

    #[serde(default = "default_log_path")]
    pub log_path: Option<PathBuf>,
}

fn default_gene_table() -> PathBuf { PathBuf::from("genes_filtrados.tsv") }
fn default_stats_path() -> PathBuf { PathBuf::from("IGFinder_stats.txt") }
fn default_plots_prefix() -> String { "IGFinder_plots".to_string() }
fn default_log_path() -> Option<PathBuf> { Some(PathBuf::from("IGFinder_log.txt")) }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            gene_table: default_gene_table(),
            stats: false,
            stats_path: default_stats_path(),
            plots: false,
            plots_prefix: default_plots_prefix(),
            log_path: default_log_path(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

/// On-disk configuration formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// TOML unless the extension says YAML or JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }

    pub fn parse<T: DeserializeOwned>(&self, content: &str) -> anyhow::Result<T> {
        let value = match self {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Ok(value)
    }
}

/// Read and parse any config document, format by extension.
pub fn load_config_file<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    ConfigFormat::from_path(path)
        .parse(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

impl RunConfig {
    /// Reject values no run can work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ensembl.window_size == 0 {
            anyhow::bail!("ensembl.window_size must be greater than zero");
        }
        if self.ensembl.batch_size == 0 {
            anyhow::bail!("ensembl.batch_size must be greater than zero");
        }
        if self.ensembl.base_delay_ms > self.ensembl.max_delay_ms {
            anyhow::bail!(
                "ensembl.base_delay_ms ({}) exceeds ensembl.max_delay_ms ({})",
                self.ensembl.base_delay_ms,
                self.ensembl.max_delay_ms
            );
        }
        if !(self.stats.alpha > 0.0 && self.stats.alpha < 1.0) {
            anyhow::bail!("stats.alpha must lie in (0, 1), got {}", self.stats.alpha);
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
