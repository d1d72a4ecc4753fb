//! The audit pipeline orchestrator.
//!
//! Runs the full two-phase audit: assess the raw dataset, sweep every
//! configured (method, threshold) cleaning variant, re-assess each
//! candidate, rank them, and re-assess the winner side by side with the
//! baseline. Every stage returns its results to this orchestrator; there is
//! no shared mutable state between components.

use crate::comparator::{MethodComparator, VariantOutcome};
use crate::config::AuditConfig;
use crate::consistency::{ConsistencyChecker, ConsistencyIssue};
use crate::correlation::{
    BucketCounts, CorrelationAnalyzer, CorrelationReport, DomainCheckResult, VifReport,
};
use crate::dataset::Dataset;
use crate::error::{AuditError, Result};
use crate::normality::{NormalityBattery, NormalityReport};
use crate::outliers::{self, OutlierCleaner, OutlierRateReport};
use crate::profiler::{DatasetProfile, DatasetProfiler};
use crate::reliability::{ReliabilityBreakdown, ReliabilityScorer};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything measured about one dataset state (raw or cleaned).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetAssessment {
    pub profile: DatasetProfile,
    pub normality: NormalityReport,
    pub outlier_rates: OutlierRateReport,
    pub correlation: CorrelationReport,
    pub vif: VifReport,
    pub domain_checks: Vec<DomainCheckResult>,
    pub consistency: Vec<ConsistencyIssue>,
    pub reliability: ReliabilityBreakdown,
}

/// Per-column statistic shifts between the raw and cleaned dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnShift {
    pub column: String,
    /// Percent change of the mean; 0.0 when the original mean is zero.
    pub mean_change_pct: f64,
    pub std_change_pct: f64,
    pub median_change_pct: f64,
}

/// Correlation bucket populations before and after cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketShift {
    pub before: BucketCounts,
    pub after: BucketCounts,
}

/// The complete audit output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub generated_at: String,
    pub rows: usize,
    pub columns: usize,
    pub baseline: DatasetAssessment,
    /// All cleaning variants, best first.
    pub variants: Vec<VariantOutcome>,
    /// Identifier of the winning variant, e.g. `iqr_1.5`.
    pub best_variant: String,
    pub best_loss_fraction: f64,
    pub cleaned_rows: usize,
    pub cleaned: DatasetAssessment,
    pub column_shifts: Vec<ColumnShift>,
    pub correlation_shift: BucketShift,
    /// Cleaned reliability total minus the baseline total.
    pub score_improvement: f64,
}

/// Runs the full audit over a dataset.
pub struct AuditPipeline {
    config: AuditConfig,
}

impl AuditPipeline {
    /// Build a pipeline, validating the configuration once.
    pub fn new(config: AuditConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| AuditError::InvalidConfig(e.to_string()))?;
        Ok(Self { config })
    }

    /// Pipeline with the standard nine-variant configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: AuditConfig::default(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Run the two-phase audit.
    ///
    /// Fails fast when the dataset has zero rows or no numeric columns;
    /// every other degenerate condition degrades to flagged results.
    pub fn run(&self, dataset: &Dataset) -> Result<AuditReport> {
        if dataset.height() == 0 {
            return Err(AuditError::EmptyDataset);
        }
        if dataset.numeric_columns().is_empty() {
            return Err(AuditError::NoNumericColumns);
        }

        info!(
            rows = dataset.height(),
            columns = dataset.width(),
            "phase 1: assessing raw dataset"
        );
        let baseline = self.assess(dataset)?;
        let baseline_score = baseline.reliability.total;

        info!(
            variants = self.config.variants().len(),
            "phase 2: cleaning sweep"
        );
        let mut outcomes = Vec::new();
        let mut candidates = Vec::new();
        for (method, threshold) in self.config.variants() {
            let cleaning = OutlierCleaner::clean(dataset, method, threshold)?;
            let assessment = self.assess(&cleaning.dataset)?;
            let cleaned_score = assessment.reliability.total;

            outcomes.push(VariantOutcome {
                method,
                threshold,
                rows_removed: cleaning.rows_removed,
                loss_fraction: cleaning.loss_fraction,
                baseline_score,
                cleaned_score,
                improvement: cleaned_score - baseline_score,
                band_score: MethodComparator::band_score(cleaning.loss_fraction),
            });
            candidates.push((cleaning, assessment));
        }

        let ranked = MethodComparator::rank(outcomes);
        let best = ranked
            .first()
            .cloned()
            .ok_or_else(|| AuditError::InvalidConfig("empty cleaning sweep".to_string()))?;

        let (best_cleaning, best_assessment) = candidates
            .into_iter()
            .find(|(c, _)| c.method == best.method && c.threshold == best.threshold)
            .ok_or_else(|| AuditError::InvalidConfig("best variant not found".to_string()))?;

        info!(
            best = %best.id(),
            loss_pct = best.loss_fraction * 100.0,
            baseline_score,
            cleaned_score = best.cleaned_score,
            "phase 3: before/after comparison"
        );
        let column_shifts = Self::column_shifts(&baseline.profile, &best_assessment.profile);
        let correlation_shift = BucketShift {
            before: baseline.correlation.bucket_counts(),
            after: best_assessment.correlation.bucket_counts(),
        };

        Ok(AuditReport {
            generated_at: Local::now().to_rfc3339(),
            rows: dataset.height(),
            columns: dataset.width(),
            baseline,
            best_variant: best.id(),
            best_loss_fraction: best.loss_fraction,
            cleaned_rows: best_cleaning.dataset.height(),
            score_improvement: best.improvement,
            cleaned: best_assessment,
            column_shifts,
            correlation_shift,
            variants: ranked,
        })
    }

    /// Assess one dataset state. Pure with respect to the dataset: calling
    /// it twice on identical content yields identical results.
    fn assess(&self, dataset: &Dataset) -> Result<DatasetAssessment> {
        let profile = DatasetProfiler::profile(dataset)?;
        let normality = NormalityBattery::assess(dataset, &self.config)?;
        let outlier_rates = outliers::assess_outlier_rates(
            dataset,
            &self.config.detection_thresholds,
            self.config.acceptable_outlier_pct,
        )?;
        let correlation = CorrelationAnalyzer::analyze(dataset, &self.config)?;
        let vif = CorrelationAnalyzer::vif(dataset)?;
        let domain_checks =
            CorrelationAnalyzer::domain_checks(&correlation, &self.config.domain_checks);
        let consistency = ConsistencyChecker::check(dataset, &self.config.consistency)?;

        let reliability = ReliabilityScorer::score(
            &normality,
            &outlier_rates,
            &correlation,
            &consistency,
            &self.config.weights,
        );

        Ok(DatasetAssessment {
            profile,
            normality,
            outlier_rates,
            correlation,
            vif,
            domain_checks,
            consistency,
            reliability,
        })
    }

    fn column_shifts(before: &DatasetProfile, after: &DatasetProfile) -> Vec<ColumnShift> {
        let mut shifts = Vec::new();
        for col in &before.column_profiles {
            let Some(orig) = col.numeric.as_ref() else {
                continue;
            };
            let Some(clean) = after.column(&col.name).and_then(|c| c.numeric.as_ref()) else {
                continue;
            };

            let pct = |old: f64, new: f64| {
                if old != 0.0 {
                    (new - old) / old * 100.0
                } else {
                    0.0
                }
            };

            shifts.push(ColumnShift {
                column: col.name.clone(),
                mean_change_pct: pct(orig.mean, clean.mean),
                std_change_pct: pct(orig.std_dev, clean.std_dev),
                median_change_pct: pct(orig.median, clean.median),
            });
        }
        shifts
    }
}
