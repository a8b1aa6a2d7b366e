//! Configuration loading for IGFinder.
//! Reads the file given with `--config`, else the path in IGFINDER_CONFIG,
//! else igfinder.toml from the current directory. Without any of them the
//! built-in defaults apply. Command-line flags override the file.
//!
//! The format follows the extension: `.yaml`/`.yml`, `.json`, anything else
//! is read as TOML.

use igfinder_common::run_config::{load_config_file, RunConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::Args;

pub const CONFIG_ENV: &str = "IGFINDER_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "igfinder.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_species")]
    pub species: String,

    #[serde(flatten)]
    pub run: RunConfig,
}

fn default_species() -> String { "homo_sapiens".to_string() }

impl Default for Config {
    fn default() -> Self {
        Self {
            species: default_species(),
            run: RunConfig::default(),
        }
    }
}

impl Config {
    /// Resolve the config file and parse it.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let env_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        Self::load_from(explicit, env_path.as_deref())
    }

    fn load_from(explicit: Option<&Path>, env_path: Option<&Path>) -> anyhow::Result<Self> {
        // A path named by the user must exist
        if let Some(path) = explicit.or(env_path) {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Self::from_file(path);
        }

        let default = Path::new(DEFAULT_CONFIG_FILE);
        if default.exists() {
            return Self::from_file(default);
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        load_config_file(path)
    }

    /// Apply command-line overrides, then validate.
    pub fn with_args(mut self, args: &Args) -> anyhow::Result<Self> {
        if let Some(species) = &args.species {
            self.species = species.clone();
        }
        if let Some(path) = &args.utr_db {
            self.run.utr_db.path = Some(path.clone());
        }
        if let Some(aggregation) = args.aggregation {
            self.run.classifier.aggregation = aggregation;
        }
        if let Some(alpha) = args.alpha {
            self.run.stats.alpha = alpha;
        }
        if args.no_yates {
            self.run.stats.yates_correction = false;
        }

        let output = &mut self.run.output;
        if let Some(path) = &args.output {
            output.gene_table = path.clone();
        }
        output.stats |= args.stats;
        if let Some(path) = &args.stats_output {
            output.stats_path = path.clone();
        }
        output.plots |= args.plots;
        if let Some(prefix) = &args.plots_prefix {
            output.plots_prefix = prefix.clone();
        }
        if args.no_log_file {
            output.log_path = None;
        } else if let Some(path) = &args.log {
            output.log_path = Some(path.clone());
        }

        self.run.validate()?;
        Ok(self)
    }
}
