//! Gene length comparison between intronless and multi-exonic genes.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::Classification;
use crate::distribution::student_t_two_tailed_p;
use crate::error::{Result, StatsError};
use igfinder_common::entities::GeneClass;

/// Welch two-sample t-test result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthComparison {
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: f64,
    pub n_intronless: usize,
    pub n_multi_exonic: usize,
    pub mean_intronless: f64,
    pub mean_multi_exonic: f64,
}

/// Mean and sample variance (n - 1 denominator).
fn mean_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (mean, ss / (n - 1.0))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LengthComparator;

impl LengthComparator {
    pub fn new() -> Self {
        Self
    }

    /// Welch's unequal-variance t-test of `intronless` against `multi_exonic`.
    pub fn compare(&self, intronless: &[f64], multi_exonic: &[f64]) -> Result<LengthComparison> {
        if intronless.len() < 2 {
            return Err(StatsError::InsufficientSample(format!(
                "{} intronless gene(s), need at least 2",
                intronless.len()
            )));
        }
        if multi_exonic.len() < 2 {
            return Err(StatsError::InsufficientSample(format!(
                "{} multi-exonic gene(s), need at least 2",
                multi_exonic.len()
            )));
        }

        let (n1, n2) = (intronless.len() as f64, multi_exonic.len() as f64);
        let (m1, v1) = mean_variance(intronless);
        let (m2, v2) = mean_variance(multi_exonic);

        let se1 = v1 / n1;
        let se2 = v2 / n2;
        let se = se1 + se2;
        if se == 0.0 {
            return Err(StatsError::ZeroVariance);
        }

        let statistic = (m1 - m2) / se.sqrt();
        let degrees_of_freedom = se * se / (se1 * se1 / (n1 - 1.0) + se2 * se2 / (n2 - 1.0));
        let p_value = student_t_two_tailed_p(statistic, degrees_of_freedom);

        info!(
            t = statistic,
            df = degrees_of_freedom,
            p = p_value,
            "Length comparison (Welch t-test)"
        );

        Ok(LengthComparison {
            statistic,
            p_value,
            degrees_of_freedom,
            n_intronless: intronless.len(),
            n_multi_exonic: multi_exonic.len(),
            mean_intronless: m1,
            mean_multi_exonic: m2,
        })
    }

    pub fn compare_classification(&self, classification: &Classification) -> Result<LengthComparison> {
        self.compare(
            &classification.lengths(GeneClass::Intronless),
            &classification.lengths(GeneClass::MultiExonic),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use igfinder_common::run_config::ClassifierConfig;
    use igfinder_test_utils::{multi_exon_gene, single_exon_gene};

    use crate::classifier::GeneClassifier;
    use crate::store::AnnotationStore;

    #[test]
    fn test_reference_values() {
        let result = LengthComparator::new()
            .compare(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0])
            .unwrap();
        assert!((result.statistic - -1.897_366_596_101_027_5).abs() < 1e-12);
        assert!((result.degrees_of_freedom - 5.882_352_941_176_471).abs() < 1e-12);
        assert!((result.p_value - 0.107_531_194_93).abs() < 1e-8);
        assert_eq!(result.n_intronless, 5);
        assert_eq!(result.mean_multi_exonic, 6.0);
    }

    #[test]
    fn test_shifted_groups_are_significant() {
        let base = [10.0, 12.0, 11.0, 13.0, 9.0, 10.5, 11.5, 12.5];
        let shifted: Vec<f64> = base.iter().map(|v| v + 1_000.0).collect();
        let result = LengthComparator::new().compare(&base, &shifted).unwrap();
        assert!(result.statistic < 0.0);
        assert!(result.p_value < 0.05);
    }

    #[test]
    fn test_swapping_groups_flips_sign_only() {
        let a = [1.0, 3.0, 5.0, 7.0];
        let b = [2.0, 2.5, 9.0];
        let ab = LengthComparator::new().compare(&a, &b).unwrap();
        let ba = LengthComparator::new().compare(&b, &a).unwrap();
        assert!((ab.statistic + ba.statistic).abs() < 1e-12);
        assert!((ab.p_value - ba.p_value).abs() < 1e-12);
    }

    #[test]
    fn test_insufficient_sample() {
        let err = LengthComparator::new().compare(&[1.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, StatsError::InsufficientSample(_)));
        let err = LengthComparator::new().compare(&[1.0, 2.0], &[]).unwrap_err();
        assert!(matches!(err, StatsError::InsufficientSample(_)));
    }

    #[test]
    fn test_zero_variance() {
        let err = LengthComparator::new().compare(&[5.0, 5.0], &[7.0, 7.0, 7.0]).unwrap_err();
        assert_eq!(err, StatsError::ZeroVariance);
    }

    #[test]
    fn test_compare_classification() {
        let genes = vec![
            single_exon_gene("A", "1", 500),
            single_exon_gene("B", "2", 700),
            multi_exon_gene("C", "1", 20_000, 5),
            multi_exon_gene("D", "3", 30_000, 8),
        ];
        let store = AnnotationStore::new(genes, None);
        let classification = GeneClassifier::new(ClassifierConfig::default()).classify(&store);
        let result = LengthComparator::new().compare_classification(&classification).unwrap();
        assert_eq!(result.mean_intronless, 600.0);
        assert_eq!(result.mean_multi_exonic, 25_000.0);
    }
}
