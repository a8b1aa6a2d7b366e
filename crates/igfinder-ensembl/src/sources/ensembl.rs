//! Ensembl REST client.
//!
//! Endpoints used:
//!   assembly: GET  /info/assembly/{species}
//!   overlap:  GET  /overlap/region/{species}/{chrom}:{start}-{end}?feature=gene
//!   lookup:   POST /lookup/id?expand=1   body: {"ids": [...]}
//!
//! Chromosomes are scanned in fixed-size windows because the overlap endpoint
//! rejects regions above a server-side size limit. Gene identifiers are then
//! resolved in batches with their transcripts and exons expanded.

use async_trait::async_trait;
use igfinder_common::chromosome::canonical_index;
use igfinder_common::entities::GeneAnnotation;
use igfinder_common::error::{AnnotationError, IgFinderError};
use igfinder_common::http::SandboxClient as Client;
use igfinder_common::run_config::EnsemblConfig;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

use super::AnnotationSource;
use crate::models::{AssemblyInfo, LookupGene, OverlapFeature, TopLevelRegion};

pub struct EnsemblClient {
    client: Client,
    config: EnsemblConfig,
}

/// One resolved lookup batch.
#[derive(Debug, Default)]
pub struct LookupBatch {
    pub annotations: Vec<GeneAnnotation>,
    /// Identifiers the server returned no record for.
    pub unknown: Vec<String>,
    /// Records that could not be converted, with the reason.
    pub unusable: Vec<String>,
}

impl LookupBatch {
    pub fn skipped(&self) -> usize {
        self.unknown.len() + self.unusable.len()
    }
}

#[derive(Serialize)]
struct LookupRequest<'a> {
    ids: &'a [String],
}

fn unavailable(context: &str, err: IgFinderError) -> AnnotationError {
    AnnotationError::Unavailable(format!("{context}: {err}"))
}

/// Split `1..=length` into closed windows of at most `window` bases.
pub fn region_windows(length: u64, window: u64) -> Vec<(u64, u64)> {
    let mut windows = Vec::new();
    if window == 0 {
        return windows;
    }
    let mut start = 1;
    while start <= length {
        let end = (start + window - 1).min(length);
        windows.push((start, end));
        start = end + 1;
    }
    windows
}

/// Drop repeated identifiers, keeping first-seen order.
pub fn dedup_ids(ids: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

impl EnsemblClient {
    pub fn new(config: EnsemblConfig) -> Result<Self, IgFinderError> {
        let client = Client::from_config(&config)?;
        if !client.is_allowed(&config.base_url) {
            return Err(IgFinderError::Security(format!(
                "Ensembl base URL {} is not an approved host",
                config.base_url
            )));
        }
        Ok(Self { client, config })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Canonical chromosomes of the species' assembly, in numeric order.
    #[instrument(skip(self))]
    pub async fn chromosomes(&self, species: &str) -> Result<Vec<TopLevelRegion>, IgFinderError> {
        info!("Connecting to Ensembl for assembly info of {}", species);
        let info: AssemblyInfo = self
            .client
            .get_json(&self.url(&format!("/info/assembly/{species}")), &[])
            .await?;

        let mut regions: Vec<TopLevelRegion> = info
            .top_level_region
            .into_iter()
            .filter(|r| r.is_chromosome() && canonical_index(&r.name).is_some())
            .collect();
        regions.sort_by_key(|r| canonical_index(&r.name));

        debug!(
            assembly = info.assembly_name.as_deref().unwrap_or("unknown"),
            n_chromosomes = regions.len(),
            "Assembly info received"
        );
        Ok(regions)
    }

    /// Identifiers of every gene overlapping the chromosome, window by window.
    #[instrument(skip(self))]
    pub async fn genes_in_chromosome(
        &self,
        species: &str,
        chrom: &str,
        length: u64,
    ) -> Result<Vec<String>, IgFinderError> {
        let mut ids = Vec::new();
        for (start, end) in region_windows(length, self.config.window_size) {
            let endpoint = format!("/overlap/region/{species}/{chrom}:{start}-{end}");
            let features: Vec<OverlapFeature> = self
                .client
                .get_json(&self.url(&endpoint), &[("feature", "gene")])
                .await?;
            ids.extend(features.into_iter().map(|f| f.id));
        }
        Ok(dedup_ids(ids))
    }

    /// Resolve one batch of identifiers; unknown identifiers come back as `None`.
    #[instrument(skip(self, ids), fields(n_ids = ids.len()))]
    pub async fn lookup_batch(&self, ids: &[String]) -> Result<LookupBatch, IgFinderError> {
        let mut resp: HashMap<String, Option<LookupGene>> = self
            .client
            .post_json(&self.url("/lookup/id"), &[("expand", "1")], &LookupRequest { ids })
            .await?;

        let mut batch = LookupBatch {
            annotations: Vec::with_capacity(ids.len()),
            ..Default::default()
        };
        for id in ids {
            match resp.remove(id).flatten() {
                Some(gene) => match gene.into_annotation() {
                    Ok(annotation) => batch.annotations.push(annotation),
                    Err(e) => {
                        warn!("Skipping unusable lookup record: {}", e);
                        batch.unusable.push(e);
                    }
                },
                None => {
                    warn!(gene_id = %id, "Lookup returned no record");
                    batch.unknown.push(id.clone());
                }
            }
        }
        Ok(batch)
    }
}

#[async_trait]
impl AnnotationSource for EnsemblClient {
    async fn fetch_genes(&self, species: &str) -> Result<Vec<GeneAnnotation>, AnnotationError> {
        info!("Retrieving genes for {} from Ensembl...", species);
        let chromosomes = self
            .chromosomes(species)
            .await
            .map_err(|e| unavailable("assembly info", e))?;
        if chromosomes.is_empty() {
            return Err(AnnotationError::Unavailable(format!(
                "no canonical chromosomes reported for species '{species}'"
            )));
        }

        let mut all_ids = Vec::new();
        for region in &chromosomes {
            info!("Processing chromosome {}...", region.name);
            let ids = self
                .genes_in_chromosome(species, &region.name, region.length)
                .await
                .map_err(|e| unavailable(&format!("overlap query on chromosome {}", region.name), e))?;
            info!("  - {}: {} genes", region.name, ids.len());
            all_ids.extend(ids);
        }
        let all_ids = dedup_ids(all_ids);
        info!("Total genes retrieved: {}", all_ids.len());

        let mut annotations = Vec::with_capacity(all_ids.len());
        let (mut unknown, mut unusable) = (0usize, 0usize);
        for (i, chunk) in all_ids.chunks(self.config.batch_size.max(1)).enumerate() {
            let batch = self
                .lookup_batch(chunk)
                .await
                .map_err(|e| unavailable(&format!("lookup batch {}", i + 1), e))?;
            debug!(
                batch = i + 1,
                resolved = batch.annotations.len(),
                skipped = batch.skipped(),
                "Lookup batch done"
            );
            unknown += batch.unknown.len();
            unusable += batch.unusable.len();
            annotations.extend(batch.annotations);
        }

        info!("Resolved {} genes with transcript structure", annotations.len());
        if unknown + unusable > 0 {
            warn!(
                unknown,
                unusable,
                "{} gene record(s) dropped during lookup",
                unknown + unusable
            );
        }
        Ok(annotations)
    }

    fn name(&self) -> &'static str {
        "ensembl"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_cover_chromosome_exactly() {
        let windows = region_windows(2_500_001, 1_000_000);
        assert_eq!(
            windows,
            vec![(1, 1_000_000), (1_000_001, 2_000_000), (2_000_001, 2_500_001)]
        );
    }

    #[test]
    fn test_windows_boundary_cases() {
        assert_eq!(region_windows(1_000_000, 1_000_000), vec![(1, 1_000_000)]);
        assert_eq!(region_windows(1_000_001, 1_000_000).last(), Some(&(1_000_001, 1_000_001)));
        assert!(region_windows(0, 1_000_000).is_empty());
        assert!(region_windows(10, 0).is_empty());
    }

    #[test]
    fn test_dedup_keeps_first_order() {
        let ids = vec!["B", "A", "B", "C", "A"].into_iter().map(String::from);
        assert_eq!(dedup_ids(ids), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_rejects_unapproved_base_url() {
        let config = EnsemblConfig {
            base_url: "https://example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(EnsemblClient::new(config), Err(IgFinderError::Security(_))));
    }

    #[test]
    fn test_url_joins_endpoint() {
        let config = EnsemblConfig {
            base_url: "https://rest.ensembl.org/".to_string(),
            ..Default::default()
        };
        let client = EnsemblClient::new(config).unwrap();
        assert_eq!(client.url("/lookup/id"), "https://rest.ensembl.org/lookup/id");
    }
}
