//! Ensembl REST response models and their conversion into annotation records.

use igfinder_common::entities::{Exon, GeneAnnotation, GeneRecord, Strand, TranscriptRecord};
use serde::{Deserialize, Deserializer, Serialize};

/// `GET /info/assembly/{species}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyInfo {
    #[serde(default)]
    pub assembly_name: Option<String>,
    #[serde(default)]
    pub top_level_region: Vec<TopLevelRegion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopLevelRegion {
    pub name: String,
    pub length: u64,
    #[serde(default)]
    pub coord_system: Option<String>,
}

impl TopLevelRegion {
    pub fn is_chromosome(&self) -> bool {
        self.coord_system.as_deref() == Some("chromosome")
    }
}

/// One element of `GET /overlap/region/{species}/{region}?feature=gene`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlapFeature {
    pub id: String,
    #[serde(default)]
    pub feature_type: Option<String>,
}

/// A gene object from `POST /lookup/id?expand=1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupGene {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub seq_region_name: String,
    pub start: u64,
    pub end: u64,
    pub strand: i8,
    #[serde(default)]
    pub biotype: Option<String>,
    #[serde(rename = "Transcript", default)]
    pub transcripts: Vec<LookupTranscript>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupTranscript {
    pub id: String,
    #[serde(default, deserialize_with = "flag")]
    pub is_canonical: bool,
    #[serde(default)]
    pub biotype: Option<String>,
    #[serde(rename = "Exon", default)]
    pub exons: Vec<LookupExon>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupExon {
    #[serde(default)]
    pub id: Option<String>,
    pub start: u64,
    pub end: u64,
}

/// Ensembl encodes flags as `0`/`1`; older releases used JSON booleans.
fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Null(()),
    }
    Ok(match Flag::deserialize(d)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
        Flag::Null(()) => false,
    })
}

impl LookupGene {
    /// Split into the gene record and its transcripts, linked by gene id.
    pub fn into_annotation(self) -> Result<GeneAnnotation, String> {
        let strand = Strand::try_from(self.strand).map_err(|e| format!("gene {}: {}", self.id, e))?;
        if self.start > self.end {
            return Err(format!(
                "gene {}: start {} is after end {}",
                self.id, self.start, self.end
            ));
        }

        let transcripts = self
            .transcripts
            .into_iter()
            .map(|tx| TranscriptRecord {
                id: tx.id,
                gene_id: self.id.clone(),
                is_canonical: tx.is_canonical,
                biotype: tx.biotype,
                exons: tx.exons.into_iter().map(|e| Exon::new(e.start, e.end)).collect(),
            })
            .collect();

        let gene = GeneRecord {
            id: self.id,
            display_name: self.display_name,
            chromosome: self.seq_region_name,
            start: self.start,
            end: self.end,
            strand,
            biotype: self.biotype.unwrap_or_else(|| "NA".to_string()),
        };

        Ok(GeneAnnotation { gene, transcripts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const LOOKUP_JSON: &str = r#"{
        "ENSG00000184194": {
            "id": "ENSG00000184194", "display_name": "GPR173", "object_type": "Gene",
            "seq_region_name": "X", "start": 53049098, "end": 53085806, "strand": 1,
            "biotype": "protein_coding",
            "Transcript": [
                {"id": "ENST00000332582", "Parent": "ENSG00000184194", "is_canonical": 1,
                 "biotype": "protein_coding",
                 "Exon": [{"id": "ENSE1", "start": 53049098, "end": 53049500},
                          {"id": "ENSE2", "start": 53084000, "end": 53085806}]},
                {"id": "ENST00000450000", "Parent": "ENSG00000184194", "is_canonical": 0,
                 "Exon": [{"id": "ENSE3", "start": 53084100, "end": 53085000}]}
            ]
        },
        "ENSG00000999999": null
    }"#;

    #[test]
    fn test_parse_lookup_batch() {
        let parsed: HashMap<String, Option<LookupGene>> = serde_json::from_str(LOOKUP_JSON).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(parsed["ENSG00000999999"].is_none());

        let gene = parsed["ENSG00000184194"].clone().unwrap();
        let annotation = gene.into_annotation().unwrap();
        assert_eq!(annotation.gene.chromosome, "X");
        assert_eq!(annotation.gene.display_name.as_deref(), Some("GPR173"));
        assert_eq!(annotation.transcripts.len(), 2);
        assert!(annotation.transcripts[0].is_canonical);
        assert!(!annotation.transcripts[1].is_canonical);
        assert_eq!(annotation.transcripts[0].exon_count(), 2);
        assert!(annotation.transcripts.iter().all(|t| t.gene_id == "ENSG00000184194"));
    }

    #[test]
    fn test_missing_biotype_and_transcripts() {
        let gene: LookupGene = serde_json::from_str(
            r#"{"id": "G1", "seq_region_name": "1", "start": 10, "end": 20, "strand": -1}"#,
        )
        .unwrap();
        let annotation = gene.into_annotation().unwrap();
        assert_eq!(annotation.gene.biotype, "NA");
        assert_eq!(annotation.gene.strand, Strand::Reverse);
        assert!(annotation.transcripts.is_empty());
    }

    #[test]
    fn test_invalid_gene_is_rejected() {
        let gene: LookupGene = serde_json::from_str(
            r#"{"id": "G1", "seq_region_name": "1", "start": 30, "end": 20, "strand": 1}"#,
        )
        .unwrap();
        assert!(gene.into_annotation().is_err());
    }

    #[test]
    fn test_assembly_regions() {
        let info: AssemblyInfo = serde_json::from_str(
            r#"{"assembly_name": "GRCh38", "top_level_region": [
                {"coord_system": "chromosome", "name": "1", "length": 248956422},
                {"coord_system": "scaffold", "name": "KI270728.1", "length": 1872759}
            ]}"#,
        )
        .unwrap();
        assert_eq!(info.top_level_region.len(), 2);
        assert!(info.top_level_region[0].is_chromosome());
        assert!(!info.top_level_region[1].is_chromosome());
    }
}
