//! Outlier detection and row cleaning.
//!
//! Three detection methods over numeric columns: IQR fences, Z-Score and
//! Modified Z-Score (MAD-based). Detection produces a boolean mask per
//! column over the exact dataset it was computed from; cleaning drops every
//! row flagged in *any* numeric column under one (method, threshold) rule
//! and returns a new dataset, leaving the input untouched.
//!
//! Degenerate columns are guarded explicitly: a zero standard deviation or
//! zero MAD yields an all-false mask, never a division.

use crate::config::{DetectionThresholds, OutlierMethod};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::stats;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Consistency constant relating the MAD to the standard deviation of a
/// normal distribution.
pub const MODIFIED_Z_SCALE: f64 = 0.6745;

/// Columns with fewer non-missing values than this produce no flags.
const MIN_OBSERVATIONS: usize = 3;

/// Compute the outlier mask for one column's row values.
///
/// Missing values are never flagged. The returned mask has one entry per
/// input row and is only meaningful for the dataset the values came from.
pub fn outlier_mask(values: &[Option<f64>], method: OutlierMethod, threshold: f64) -> Vec<bool> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.len() < MIN_OBSERVATIONS {
        return vec![false; values.len()];
    }

    match method {
        OutlierMethod::Iqr => {
            let sorted = stats::sorted(&present);
            let q1 = stats::quantile_sorted(&sorted, 0.25);
            let q3 = stats::quantile_sorted(&sorted, 0.75);
            let bound = threshold * (q3 - q1);
            let lower = q1 - bound;
            let upper = q3 + bound;
            values
                .iter()
                .map(|v| v.map(|x| x < lower || x > upper).unwrap_or(false))
                .collect()
        }
        OutlierMethod::ZScore => {
            let mean = stats::mean(&present);
            let std_dev = stats::sample_std(&present);
            if std_dev == 0.0 {
                // Constant column: no row deviates, division never happens.
                return vec![false; values.len()];
            }
            values
                .iter()
                .map(|v| {
                    v.map(|x| ((x - mean) / std_dev).abs() > threshold)
                        .unwrap_or(false)
                })
                .collect()
        }
        OutlierMethod::ModifiedZScore => {
            let sorted = stats::sorted(&present);
            let median = stats::median_sorted(&sorted);
            let mad = stats::median_absolute_deviation(&present, median);
            if mad == 0.0 {
                return vec![false; values.len()];
            }
            values
                .iter()
                .map(|v| {
                    v.map(|x| (MODIFIED_Z_SCALE * (x - median) / mad).abs() > threshold)
                        .unwrap_or(false)
                })
                .collect()
        }
    }
}

/// Result of cleaning a dataset under one (method, threshold) rule.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub method: OutlierMethod,
    pub threshold: f64,
    pub rows_before: usize,
    pub rows_removed: usize,
    /// `rows_removed / rows_before`.
    pub loss_fraction: f64,
    /// Flag counts per numeric column, in declaration order.
    pub column_flag_counts: Vec<(String, usize)>,
    /// The cleaned dataset; the input is left untouched.
    pub dataset: Dataset,
}

/// Applies one (method, threshold) rule across all numeric columns.
pub struct OutlierCleaner;

impl OutlierCleaner {
    /// Drop every row flagged as an outlier in any numeric column.
    ///
    /// Masks are computed fresh against `dataset` and applied to the same
    /// `dataset`; they are never reused across differently-sized frames.
    pub fn clean(
        dataset: &Dataset,
        method: OutlierMethod,
        threshold: f64,
    ) -> Result<CleaningOutcome> {
        let rows_before = dataset.height();
        let mut union = vec![false; rows_before];
        let mut column_flag_counts = Vec::new();

        for column in dataset.numeric_columns() {
            let values = dataset.numeric_values(&column)?;
            let mask = outlier_mask(&values, method, threshold);
            let flagged = mask.iter().filter(|f| **f).count();
            if flagged > 0 {
                for (slot, is_outlier) in union.iter_mut().zip(mask.iter()) {
                    *slot |= *is_outlier;
                }
            }
            column_flag_counts.push((column, flagged));
        }

        let keep: Vec<bool> = union.iter().map(|flagged| !flagged).collect();
        let cleaned = dataset.retain_rows(&keep)?;
        let rows_removed = rows_before - cleaned.height();
        let loss_fraction = if rows_before > 0 {
            rows_removed as f64 / rows_before as f64
        } else {
            0.0
        };

        debug!(
            method = %method,
            threshold,
            rows_before,
            rows_removed,
            "cleaned dataset"
        );

        Ok(CleaningOutcome {
            method,
            threshold,
            rows_before,
            rows_removed,
            loss_fraction,
            column_flag_counts,
            dataset: cleaned,
        })
    }
}

/// Flag rates for one column under the canonical detection thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnOutlierRate {
    pub column: String,
    pub iqr_pct: f64,
    pub z_score_pct: f64,
    pub modified_z_pct: f64,
    /// Mean of the three method percentages.
    pub average_pct: f64,
    /// `average_pct` below the configured acceptable level.
    pub acceptable: bool,
}

/// Outlier-rate assessment across numeric columns, used by the reliability
/// scorer. Rates are measured against fixed canonical thresholds so the
/// assessment is identical regardless of which cleaning variant is being
/// evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierRateReport {
    pub per_column: Vec<ColumnOutlierRate>,
}

impl OutlierRateReport {
    pub fn assessed_columns(&self) -> usize {
        self.per_column.len()
    }

    pub fn acceptable_columns(&self) -> usize {
        self.per_column.iter().filter(|c| c.acceptable).count()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnOutlierRate> {
        self.per_column.iter().find(|c| c.column == name)
    }
}

/// Measure per-column flag rates at the canonical thresholds.
pub fn assess_outlier_rates(
    dataset: &Dataset,
    thresholds: &DetectionThresholds,
    acceptable_pct: f64,
) -> Result<OutlierRateReport> {
    let mut per_column = Vec::new();

    for column in dataset.numeric_columns() {
        let values = dataset.numeric_values(&column)?;
        let present = values.iter().flatten().count();
        if present < MIN_OBSERVATIONS {
            continue;
        }

        let pct = |method: OutlierMethod, threshold: f64| -> f64 {
            let flagged = outlier_mask(&values, method, threshold)
                .iter()
                .filter(|f| **f)
                .count();
            flagged as f64 / present as f64 * 100.0
        };

        let iqr_pct = pct(OutlierMethod::Iqr, thresholds.iqr);
        let z_score_pct = pct(OutlierMethod::ZScore, thresholds.z_score);
        let modified_z_pct = pct(OutlierMethod::ModifiedZScore, thresholds.modified_z);
        let average_pct = (iqr_pct + z_score_pct + modified_z_pct) / 3.0;

        per_column.push(ColumnOutlierRate {
            column,
            iqr_pct,
            z_score_pct,
            modified_z_pct,
            average_pct,
            acceptable: average_pct < acceptable_pct,
        });
    }

    Ok(OutlierRateReport { per_column })
}
