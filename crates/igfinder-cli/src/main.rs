//! IGFinder — intronless gene finder.
//! Entry point for the `igfinder` binary.

use clap::Parser;
use igfinder_cli::{logging, Args, Config, Pipeline};
use igfinder_ensembl::{AnnotationSource, EnsemblClient, SnapshotSource};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?.with_args(&args)?;

    logging::init(config.run.output.log_path.as_deref())?;
    info!("IGFinder {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        species = %config.species,
        aggregation = %config.run.classifier.aggregation,
        "Configuration loaded"
    );

    let source: Box<dyn AnnotationSource> = match &args.annotations {
        Some(path) => Box::new(SnapshotSource::new(path.clone())),
        None => Box::new(EnsemblClient::new(config.run.ensembl.clone())?),
    };

    let outcome = Pipeline::new(config)
        .save_annotations(args.save_annotations.clone())
        .run(source.as_ref())
        .await?;

    for path in &outcome.written {
        info!("Wrote {}", path.display());
    }
    Ok(())
}
