//! Annotation records and classification labels.
//!
//! A gene and its transcripts are two separate immutable records linked by
//! `gene_id`. Coordinates are 1-based and inclusive.

use serde::{Deserialize, Serialize};

/// Genomic strand as reported by Ensembl (`1` / `-1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Strand {
    Forward,
    Reverse,
}

impl TryFrom<i8> for Strand {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Strand::Forward),
            -1 => Ok(Strand::Reverse),
            other => Err(format!("invalid strand value: {other}")),
        }
    }
}

impl From<Strand> for i8 {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Forward => 1,
            Strand::Reverse => -1,
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
        })
    }
}

/// A gene as fetched from the annotation source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneRecord {
    /// Stable identifier, unique per species release (e.g. `ENSG00000139618`)
    pub id: String,
    /// Gene symbol, when the source provides one
    #[serde(default)]
    pub display_name: Option<String>,
    /// Chromosome or contig name (`"1"`, `"MT"`, `"KI270728.1"`)
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub biotype: String,
}

impl GeneRecord {
    /// Genomic length, `end - start + 1`.
    pub fn length(&self) -> u64 {
        self.end.saturating_sub(self.start) + 1
    }
}

/// A single exon as a closed coordinate interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exon {
    pub start: u64,
    pub end: u64,
}

impl Exon {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }
}

/// A transcript of exactly one gene, referenced through `gene_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub id: String,
    pub gene_id: String,
    #[serde(default)]
    pub is_canonical: bool,
    #[serde(default)]
    pub biotype: Option<String>,
    /// Exons in the order the source lists them
    pub exons: Vec<Exon>,
}

impl TranscriptRecord {
    pub fn exon_count(&self) -> usize {
        self.exons.len()
    }
}

/// A gene together with every transcript the source returned for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneAnnotation {
    pub gene: GeneRecord,
    pub transcripts: Vec<TranscriptRecord>,
}

/// Gene-level classification label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GeneClass {
    #[serde(rename = "intronless")]
    Intronless,
    #[serde(rename = "multi-exonic")]
    MultiExonic,
}

impl GeneClass {
    pub const ALL: [GeneClass; 2] = [GeneClass::Intronless, GeneClass::MultiExonic];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeneClass::Intronless  => "intronless",
            GeneClass::MultiExonic => "multi-exonic",
        }
    }

    /// Row index in per-class tables.
    pub fn index(&self) -> usize {
        match self {
            GeneClass::Intronless  => 0,
            GeneClass::MultiExonic => 1,
        }
    }
}

impl std::fmt::Display for GeneClass {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A gene that passed every inclusion rule, with its class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedGene {
    pub gene_id: String,
    pub class: GeneClass,
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub length: u64,
    pub biotype: String,
}

impl ClassifiedGene {
    pub fn from_record(gene: &GeneRecord, class: GeneClass) -> Self {
        Self {
            gene_id: gene.id.clone(),
            class,
            chromosome: gene.chromosome.clone(),
            start: gene.start,
            end: gene.end,
            length: gene.length(),
            biotype: gene.biotype.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gene(start: u64, end: u64) -> GeneRecord {
        GeneRecord {
            id: "ENSG00000000001".to_string(),
            display_name: None,
            chromosome: "1".to_string(),
            start,
            end,
            strand: Strand::Forward,
            biotype: "protein_coding".to_string(),
        }
    }

    #[test]
    fn test_length_is_inclusive() {
        assert_eq!(gene(100, 199).length(), 100);
        assert_eq!(gene(5, 5).length(), 1);
    }

    #[test]
    fn test_strand_serializes_as_ensembl_integer() {
        let json = serde_json::to_string(&gene(1, 10)).unwrap();
        assert!(json.contains("\"strand\":1"));
        let parsed: Strand = serde_json::from_str("-1").unwrap();
        assert_eq!(parsed, Strand::Reverse);
        assert!(serde_json::from_str::<Strand>("0").is_err());
    }

    #[test]
    fn test_class_labels() {
        assert_eq!(GeneClass::Intronless.to_string(), "intronless");
        assert_eq!(
            serde_json::to_string(&GeneClass::MultiExonic).unwrap(),
            "\"multi-exonic\""
        );
    }

    #[test]
    fn test_classified_gene_copies_record_fields() {
        let g = gene(1_000, 1_999);
        let c = ClassifiedGene::from_record(&g, GeneClass::Intronless);
        assert_eq!(c.length, 1_000);
        assert_eq!(c.chromosome, "1");
        assert_eq!(c.biotype, "protein_coding");
    }

    #[test]
    fn test_transcript_counts() {
        let tx = TranscriptRecord {
            id: "ENST1".to_string(),
            gene_id: "ENSG1".to_string(),
            is_canonical: true,
            biotype: None,
            exons: vec![Exon::new(1, 10), Exon::new(20, 30), Exon::new(40, 50)],
        };
        assert_eq!(tx.exon_count(), 3);
    }
}
