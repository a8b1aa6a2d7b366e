//! Shared fixtures for IGFinder tests.
//!
//! Genes are described by the exon count of each transcript; exon
//! coordinates are laid out inside the gene span so records stay plausible.

pub mod http_stub;

use igfinder_common::entities::{Exon, GeneAnnotation, GeneRecord, Strand, TranscriptRecord};

pub use pretty_assertions::assert_eq as assert_eq_pretty;

/// Builder for a [`GeneAnnotation`].
#[derive(Debug, Clone)]
pub struct GeneFixture {
    id: String,
    chromosome: String,
    start: u64,
    end: u64,
    biotype: String,
    transcripts: Vec<(usize, bool)>,
}

impl GeneFixture {
    pub fn new(id: &str, chromosome: &str) -> Self {
        Self {
            id: id.to_string(),
            chromosome: chromosome.to_string(),
            start: 1_000,
            end: 1_999,
            biotype: "protein_coding".to_string(),
            transcripts: Vec::new(),
        }
    }

    pub fn span(mut self, start: u64, end: u64) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Set the span from a length, starting at 1.
    pub fn length(self, length: u64) -> Self {
        self.span(1, length)
    }

    pub fn biotype(mut self, biotype: &str) -> Self {
        self.biotype = biotype.to_string();
        self
    }

    /// Add a non-canonical transcript with `exons` exons.
    pub fn transcript(mut self, exons: usize) -> Self {
        self.transcripts.push((exons, false));
        self
    }

    /// Add a canonical transcript with `exons` exons.
    pub fn canonical(mut self, exons: usize) -> Self {
        self.transcripts.push((exons, true));
        self
    }

    pub fn build(self) -> GeneAnnotation {
        let span = self.end.saturating_sub(self.start) + 1;
        let transcripts = self
            .transcripts
            .iter()
            .enumerate()
            .map(|(i, &(n_exons, canonical))| TranscriptRecord {
                id: format!("{}-T{}", self.id, i + 1),
                gene_id: self.id.clone(),
                is_canonical: canonical,
                biotype: Some(self.biotype.clone()),
                exons: exon_layout(self.start, span, n_exons),
            })
            .collect();

        GeneAnnotation {
            gene: GeneRecord {
                id: self.id,
                display_name: None,
                chromosome: self.chromosome,
                start: self.start,
                end: self.end,
                strand: Strand::Forward,
                biotype: self.biotype,
            },
            transcripts,
        }
    }
}

/// `n` equal, non-overlapping exons separated by gaps inside the span.
fn exon_layout(start: u64, span: u64, n: usize) -> Vec<Exon> {
    if n == 0 {
        return Vec::new();
    }
    let slot = (span / (2 * n as u64)).max(1);
    (0..n as u64)
        .map(|i| {
            let s = start + 2 * i * slot;
            Exon::new(s, s + slot - 1)
        })
        .collect()
}

/// Single-transcript, single-exon gene.
pub fn single_exon_gene(id: &str, chromosome: &str, length: u64) -> GeneAnnotation {
    GeneFixture::new(id, chromosome).length(length).transcript(1).build()
}

/// Gene with one spliced transcript of `exons` exons.
pub fn multi_exon_gene(id: &str, chromosome: &str, length: u64, exons: usize) -> GeneAnnotation {
    GeneFixture::new(id, chromosome).length(length).transcript(exons).build()
}

/// The four-gene scenario: intronless, multi-exonic, mitochondrial, UTR-flagged.
pub fn scenario_genes() -> Vec<GeneAnnotation> {
    vec![
        GeneFixture::new("G1", "1").span(100, 1_099).transcript(1).build(),
        GeneFixture::new("G2", "1").span(5_000, 9_999).transcript(1).transcript(2).build(),
        GeneFixture::new("G3", "MT").span(200, 700).transcript(1).build(),
        GeneFixture::new("G4", "1").span(20_000, 20_499).transcript(1).build(),
    ]
}
