//! Ranking of cleaning variants.
//!
//! Each (method, threshold) variant is scored on a 0-10 band derived from
//! its data loss, then ranked by a fixed, fully deterministic rubric:
//!
//! 1. loss band, descending (less loss is better);
//! 2. reliability improvement over the uncleaned baseline, descending;
//! 3. exact loss fraction, ascending;
//! 4. configuration order (the order variants were produced in).
//!
//! The final tie-break relies on a stable sort over the caller-supplied
//! configuration order, so the winner never depends on map iteration or
//! float quirks.

use crate::config::OutlierMethod;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One cleaning variant's comparable outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantOutcome {
    pub method: OutlierMethod,
    pub threshold: f64,
    pub rows_removed: usize,
    /// Fraction of rows dropped, 0.0..=1.0.
    pub loss_fraction: f64,
    /// Reliability total of the uncleaned baseline.
    pub baseline_score: f64,
    /// Reliability total of this variant's cleaned dataset.
    pub cleaned_score: f64,
    /// `cleaned_score - baseline_score`.
    pub improvement: f64,
    /// Banded loss quality on the 0-10 scale.
    pub band_score: u8,
}

impl VariantOutcome {
    /// Stable identifier, e.g. `iqr_1.5`.
    pub fn id(&self) -> String {
        format!("{}_{}", self.method.key(), self.threshold)
    }
}

/// Ranks cleaning variants under the documented rubric.
pub struct MethodComparator;

impl MethodComparator {
    /// Banded loss quality: under 5% loss scores 10, under 10% scores 7,
    /// under 15% scores 4, anything worse scores 1.
    pub fn band_score(loss_fraction: f64) -> u8 {
        let pct = loss_fraction * 100.0;
        if pct < 5.0 {
            10
        } else if pct < 10.0 {
            7
        } else if pct < 15.0 {
            4
        } else {
            1
        }
    }

    /// Rank variants best-first. The input order is the configuration
    /// order and serves as the final tie-break.
    pub fn rank(variants: Vec<VariantOutcome>) -> Vec<VariantOutcome> {
        let mut ranked = variants;
        ranked.sort_by(|a, b| {
            b.band_score
                .cmp(&a.band_score)
                .then_with(|| {
                    b.improvement
                        .partial_cmp(&a.improvement)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| {
                    a.loss_fraction
                        .partial_cmp(&b.loss_fraction)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        });

        if let Some(best) = ranked.first() {
            info!(
                variant = %best.id(),
                loss_pct = best.loss_fraction * 100.0,
                improvement = best.improvement,
                "selected best cleaning variant"
            );
        }
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(
        method: OutlierMethod,
        threshold: f64,
        loss_fraction: f64,
        improvement: f64,
    ) -> VariantOutcome {
        VariantOutcome {
            method,
            threshold,
            rows_removed: (loss_fraction * 1000.0) as usize,
            loss_fraction,
            baseline_score: 75.0,
            cleaned_score: 75.0 + improvement,
            improvement,
            band_score: MethodComparator::band_score(loss_fraction),
        }
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(MethodComparator::band_score(0.0), 10);
        assert_eq!(MethodComparator::band_score(0.049), 10);
        assert_eq!(MethodComparator::band_score(0.05), 7);
        assert_eq!(MethodComparator::band_score(0.099), 7);
        assert_eq!(MethodComparator::band_score(0.10), 4);
        assert_eq!(MethodComparator::band_score(0.15), 1);
        assert_eq!(MethodComparator::band_score(0.6), 1);
    }

    #[test]
    fn test_lower_loss_band_beats_higher_improvement() {
        // 2% loss with no improvement outranks 10% loss with +1: the loss
        // band dominates the rubric.
        let variants = vec![
            outcome(OutlierMethod::Iqr, 2.0, 0.02, 0.0),
            outcome(OutlierMethod::ZScore, 1.5, 0.10, 1.0),
        ];
        let ranked = MethodComparator::rank(variants);
        assert_eq!(ranked[0].method, OutlierMethod::Iqr);
        assert_eq!(ranked[0].threshold, 2.0);
    }

    #[test]
    fn test_improvement_breaks_band_ties() {
        let variants = vec![
            outcome(OutlierMethod::Iqr, 1.5, 0.03, 0.0),
            outcome(OutlierMethod::ZScore, 2.0, 0.04, 2.5),
        ];
        let ranked = MethodComparator::rank(variants);
        assert_eq!(ranked[0].method, OutlierMethod::ZScore);
    }

    #[test]
    fn test_loss_breaks_improvement_ties() {
        let variants = vec![
            outcome(OutlierMethod::ZScore, 1.5, 0.04, 1.0),
            outcome(OutlierMethod::Iqr, 2.0, 0.01, 1.0),
        ];
        let ranked = MethodComparator::rank(variants);
        assert_eq!(ranked[0].method, OutlierMethod::Iqr);
    }

    #[test]
    fn test_configuration_order_breaks_full_ties() {
        // Identical outcomes: the variant listed first in the sweep wins.
        let variants = vec![
            outcome(OutlierMethod::Iqr, 1.5, 0.0, 0.0),
            outcome(OutlierMethod::Iqr, 2.0, 0.0, 0.0),
            outcome(OutlierMethod::ZScore, 1.5, 0.0, 0.0),
        ];
        let ranked = MethodComparator::rank(variants);
        assert_eq!(ranked[0].method, OutlierMethod::Iqr);
        assert_eq!(ranked[0].threshold, 1.5);
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let variants = vec![
            outcome(OutlierMethod::Iqr, 1.5, 0.02, 0.5),
            outcome(OutlierMethod::ZScore, 2.0, 0.08, 1.5),
            outcome(OutlierMethod::ModifiedZScore, 2.5, 0.01, -0.5),
        ];
        let first = MethodComparator::rank(variants.clone());
        let second = MethodComparator::rank(variants);
        let ids: Vec<String> = first.iter().map(|v| v.id()).collect();
        let ids_again: Vec<String> = second.iter().map(|v| v.id()).collect();
        assert_eq!(ids, ids_again);
    }
}
