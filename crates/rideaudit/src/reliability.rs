//! Reliability scoring.
//!
//! Collapses the battery, outlier-rate, correlation and consistency
//! findings into a single 0-100 score. The four sub-scores carry 25 points
//! each under the default weights:
//!
//! - normality: share of assessed columns judged normally distributed;
//! - outliers: share of assessed columns with acceptable flag rates;
//! - correlation: full points minus 5 per |r| > 0.8 pair, floored at 0;
//! - consistency: full points minus 3 per detected issue, floored at 0.
//!
//! The same weights are applied to the raw and the cleaned dataset. The
//! score is a pure function of its inputs: no randomness, no dependence on
//! iteration order.

use crate::config::ScoreWeights;
use crate::consistency::ConsistencyIssue;
use crate::correlation::CorrelationReport;
use crate::normality::NormalityReport;
use crate::outliers::OutlierRateReport;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Qualitative band for a total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReliabilityGrade {
    /// >= 85
    Excellent,
    /// >= 70
    Good,
    /// >= 50
    Fair,
    /// < 50
    Poor,
}

impl ReliabilityGrade {
    fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Self::Excellent
        } else if score >= 70.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Usage guidance attached to the grade.
    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Excellent => "Dataset is suitable for direct analysis",
            Self::Good => "Usable with minimal cleaning",
            Self::Fair => "Thorough cleaning recommended before analysis",
            Self::Poor => "Heavy preprocessing required",
        }
    }
}

/// The composite score with its sub-scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityBreakdown {
    pub normality_score: f64,
    pub outlier_score: f64,
    pub correlation_score: f64,
    pub consistency_score: f64,
    /// Sum of the sub-scores, scaled to 0-100.
    pub total: f64,
    pub grade: ReliabilityGrade,
    /// Columns judged normal / columns assessed by the battery.
    pub normal_columns: (usize, usize),
    /// Columns with acceptable outlier rates / columns assessed.
    pub acceptable_outlier_columns: (usize, usize),
    pub very_high_correlation_pairs: usize,
    pub consistency_issues: usize,
}

/// Computes the composite score from the per-dimension reports.
pub struct ReliabilityScorer;

impl ReliabilityScorer {
    /// Score one dataset state from its four assessment reports.
    pub fn score(
        normality: &NormalityReport,
        outlier_rates: &OutlierRateReport,
        correlation: &CorrelationReport,
        consistency_issues: &[ConsistencyIssue],
        weights: &ScoreWeights,
    ) -> ReliabilityBreakdown {
        let assessed_normality = normality.assessed_columns();
        let normal = normality.normal_columns();
        let normality_score = if assessed_normality > 0 {
            normal as f64 / assessed_normality as f64 * weights.normality_points
        } else {
            0.0
        };

        let assessed_outliers = outlier_rates.assessed_columns();
        let acceptable = outlier_rates.acceptable_columns();
        let outlier_score = if assessed_outliers > 0 {
            acceptable as f64 / assessed_outliers as f64 * weights.outlier_points
        } else {
            0.0
        };

        let very_high_pairs = correlation.very_high_pairs();
        let correlation_score = (weights.correlation_points
            - very_high_pairs as f64 * weights.high_correlation_penalty)
            .max(0.0);

        let issue_count = consistency_issues.len();
        let consistency_score = (weights.consistency_points
            - issue_count as f64 * weights.consistency_penalty)
            .max(0.0);

        let raw_total = normality_score + outlier_score + correlation_score + consistency_score;
        let total = raw_total / weights.max_total() * 100.0;

        debug!(
            normality_score,
            outlier_score,
            correlation_score,
            consistency_score,
            total,
            "reliability score"
        );

        ReliabilityBreakdown {
            normality_score,
            outlier_score,
            correlation_score,
            consistency_score,
            total,
            grade: ReliabilityGrade::from_score(total),
            normal_columns: (normal, assessed_normality),
            acceptable_outlier_columns: (acceptable, assessed_outliers),
            very_high_correlation_pairs: very_high_pairs,
            consistency_issues: issue_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consistency::IssueKind;
    use crate::correlation::{CorrelationPair, Strength};
    use crate::normality::{ColumnVerdict, NormalityReport};
    use crate::outliers::{ColumnOutlierRate, OutlierRateReport};

    fn verdict(column: &str, is_normal: bool) -> ColumnVerdict {
        ColumnVerdict {
            column: column.to_string(),
            sample_size: 100,
            subsampled: false,
            outcomes: vec![],
            tests_run: 4,
            normal_votes: if is_normal { 3 } else { 0 },
            is_normal,
        }
    }

    fn rate(column: &str, acceptable: bool) -> ColumnOutlierRate {
        let pct = if acceptable { 1.0 } else { 12.0 };
        ColumnOutlierRate {
            column: column.to_string(),
            iqr_pct: pct,
            z_score_pct: pct,
            modified_z_pct: pct,
            average_pct: pct,
            acceptable,
        }
    }

    fn pair(r: f64) -> CorrelationPair {
        CorrelationPair {
            left: "a".to_string(),
            right: "b".to_string(),
            r,
            strength: Strength::from_r(r),
            observations: 100,
        }
    }

    fn correlation_with(pairs: Vec<CorrelationPair>) -> CorrelationReport {
        CorrelationReport {
            columns: vec!["a".to_string(), "b".to_string()],
            matrix: vec![vec![None; 2]; 2],
            pairs,
        }
    }

    fn issue() -> ConsistencyIssue {
        ConsistencyIssue {
            column: "fare".to_string(),
            kind: IssueKind::NegativeValues { count: 3 },
            description: "3 negative values in 'fare'".to_string(),
        }
    }

    #[test]
    fn test_perfect_inputs_score_100() {
        let normality = NormalityReport {
            verdicts: vec![verdict("a", true), verdict("b", true)],
        };
        let rates = OutlierRateReport {
            per_column: vec![rate("a", true), rate("b", true)],
        };
        let correlation = correlation_with(vec![pair(0.2)]);

        let breakdown = ReliabilityScorer::score(
            &normality,
            &rates,
            &correlation,
            &[],
            &ScoreWeights::default(),
        );
        assert!((breakdown.total - 100.0).abs() < 1e-9);
        assert_eq!(breakdown.grade, ReliabilityGrade::Excellent);
    }

    #[test]
    fn test_reference_seventy_five_when_nothing_is_normal() {
        // No normal column, everything else clean: 0 + 25 + 25 + 25 = 75.
        let normality = NormalityReport {
            verdicts: vec![verdict("a", false), verdict("b", false)],
        };
        let rates = OutlierRateReport {
            per_column: vec![rate("a", true), rate("b", true)],
        };
        let correlation = correlation_with(vec![pair(0.4)]);

        let breakdown = ReliabilityScorer::score(
            &normality,
            &rates,
            &correlation,
            &[],
            &ScoreWeights::default(),
        );
        assert!((breakdown.total - 75.0).abs() < 1e-9);
        assert_eq!(breakdown.normality_score, 0.0);
        assert_eq!(breakdown.grade, ReliabilityGrade::Good);
    }

    #[test]
    fn test_high_correlation_penalty() {
        let normality = NormalityReport {
            verdicts: vec![verdict("a", true)],
        };
        let rates = OutlierRateReport {
            per_column: vec![rate("a", true)],
        };
        let correlation = correlation_with(vec![pair(0.95), pair(0.9)]);

        let breakdown = ReliabilityScorer::score(
            &normality,
            &rates,
            &correlation,
            &[],
            &ScoreWeights::default(),
        );
        // 25 - 2 * 5 = 15 correlation points
        assert!((breakdown.correlation_score - 15.0).abs() < 1e-9);
        assert_eq!(breakdown.very_high_correlation_pairs, 2);
    }

    #[test]
    fn test_consistency_penalty_floors_at_zero() {
        let normality = NormalityReport {
            verdicts: vec![verdict("a", true)],
        };
        let rates = OutlierRateReport {
            per_column: vec![rate("a", true)],
        };
        let correlation = correlation_with(vec![]);
        let issues: Vec<ConsistencyIssue> = (0..20).map(|_| issue()).collect();

        let breakdown = ReliabilityScorer::score(
            &normality,
            &rates,
            &correlation,
            &issues,
            &ScoreWeights::default(),
        );
        assert_eq!(breakdown.consistency_score, 0.0);
    }

    #[test]
    fn test_score_is_deterministic() {
        let normality = NormalityReport {
            verdicts: vec![verdict("a", true), verdict("b", false)],
        };
        let rates = OutlierRateReport {
            per_column: vec![rate("a", true), rate("b", false)],
        };
        let correlation = correlation_with(vec![pair(0.85)]);
        let issues = vec![issue()];
        let weights = ScoreWeights::default();

        let first = ReliabilityScorer::score(&normality, &rates, &correlation, &issues, &weights);
        let second = ReliabilityScorer::score(&normality, &rates, &correlation, &issues, &weights);
        assert_eq!(first.total, second.total);
        assert_eq!(first.normality_score, second.normality_score);
    }
}
