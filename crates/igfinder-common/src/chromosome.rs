//! The canonical autosome set ("1".."22").
//!
//! Mitochondrial, sex chromosomes and scaffold contigs are outside this set
//! and never reach classification.

pub const CANONICAL_CHROMOSOME_COUNT: usize = 22;

/// Canonical chromosome names in numeric order.
pub fn canonical_chromosomes() -> Vec<String> {
    (1..=CANONICAL_CHROMOSOME_COUNT).map(|n| n.to_string()).collect()
}

/// Zero-based column of a canonical chromosome, or `None` for any other contig.
///
/// Only the exact Ensembl spelling is accepted: `"01"` or `"chr1"` are not canonical.
pub fn canonical_index(name: &str) -> Option<usize> {
    if name.is_empty() || name.starts_with('0') || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match name.parse::<usize>() {
        Ok(n) if (1..=CANONICAL_CHROMOSOME_COUNT).contains(&n) => Some(n - 1),
        _ => None,
    }
}

pub fn is_canonical(name: &str) -> bool {
    canonical_index(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_set() {
        let chroms = canonical_chromosomes();
        assert_eq!(chroms.len(), 22);
        assert_eq!(chroms[0], "1");
        assert_eq!(chroms[21], "22");
    }

    #[test]
    fn test_non_canonical_contigs() {
        for name in ["MT", "X", "Y", "0", "23", "01", "chr1", "KI270728.1", ""] {
            assert!(!is_canonical(name), "{name} should not be canonical");
        }
    }

    #[test]
    fn test_canonical_index() {
        assert_eq!(canonical_index("1"), Some(0));
        assert_eq!(canonical_index("22"), Some(21));
        assert_eq!(canonical_index("10"), Some(9));
    }
}
