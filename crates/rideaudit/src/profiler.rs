//! Missingness and distribution profiler.
//!
//! Produces one [`ColumnProfile`] per column: counts and missing fraction
//! for every column, descriptive statistics for numeric columns, value
//! frequencies for categorical columns. An entirely-missing numeric column
//! yields a profile whose `numeric` block is `None` rather than an error;
//! downstream components treat that as "undefined" and skip the column.

use crate::dataset::{ColumnKind, Dataset};
use crate::error::Result;
use crate::stats;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Descriptive statistics for a numeric column with at least one value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericStats {
    /// Count of non-missing values.
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std_dev: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
}

impl NumericStats {
    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Value frequencies for a categorical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalStats {
    pub unique_count: usize,
    pub most_frequent: String,
    /// Up to the 10 most frequent values with their counts, descending.
    pub top_values: Vec<(String, usize)>,
}

/// Profile of a single column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub total_rows: usize,
    pub missing_count: usize,
    /// `(total_rows - non-missing) / total_rows`; 1.0 for an empty column.
    pub missing_fraction: f64,
    /// `None` for non-numeric columns and for numeric columns that are
    /// entirely missing.
    pub numeric: Option<NumericStats>,
    /// `None` for non-categorical columns and empty categorical columns.
    pub categorical: Option<CategoricalStats>,
}

impl ColumnProfile {
    /// Whether the numeric statistics are undefined (all-missing column).
    pub fn is_undefined(&self) -> bool {
        self.kind.is_numeric() && self.numeric.is_none()
    }
}

/// Profile of a whole dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetProfile {
    /// (rows, columns).
    pub shape: (usize, usize),
    pub column_profiles: Vec<ColumnProfile>,
    /// Missing cells across the whole table as a fraction of all cells.
    pub total_missing_fraction: f64,
}

impl DatasetProfile {
    /// Profile for a named column, if present.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.column_profiles.iter().find(|c| c.name == name)
    }
}

/// Computes column and dataset profiles.
pub struct DatasetProfiler;

impl DatasetProfiler {
    /// Profile every column of the dataset.
    pub fn profile(dataset: &Dataset) -> Result<DatasetProfile> {
        let total_rows = dataset.height();
        let mut column_profiles = Vec::with_capacity(dataset.width());
        let mut total_missing = 0usize;

        for spec in dataset.schema().columns() {
            let profile = Self::profile_column(dataset, &spec.name, spec.kind)?;
            total_missing += profile.missing_count;
            column_profiles.push(profile);
        }

        let total_cells = total_rows.saturating_mul(dataset.width());
        let total_missing_fraction = if total_cells > 0 {
            total_missing as f64 / total_cells as f64
        } else {
            0.0
        };

        debug!(
            rows = total_rows,
            columns = dataset.width(),
            missing_fraction = total_missing_fraction,
            "profiled dataset"
        );

        Ok(DatasetProfile {
            shape: (total_rows, dataset.width()),
            column_profiles,
            total_missing_fraction,
        })
    }

    fn profile_column(dataset: &Dataset, name: &str, kind: ColumnKind) -> Result<ColumnProfile> {
        let total_rows = dataset.height();
        let col = dataset.frame().column(name)?;
        let missing_count = col.null_count();
        let missing_fraction = if total_rows > 0 {
            missing_count as f64 / total_rows as f64
        } else {
            1.0
        };

        let numeric = if kind.is_numeric() {
            let values = dataset.non_null_numeric(name)?;
            Self::numeric_stats(&values)
        } else {
            None
        };

        let categorical = if kind == ColumnKind::Categorical {
            Self::categorical_stats(col.as_materialized_series())?
        } else {
            None
        };

        Ok(ColumnProfile {
            name: name.to_string(),
            kind,
            total_rows,
            missing_count,
            missing_fraction,
            numeric,
            categorical,
        })
    }

    fn numeric_stats(values: &[f64]) -> Option<NumericStats> {
        if values.is_empty() {
            return None;
        }
        let sorted = stats::sorted(values);
        Some(NumericStats {
            count: values.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: stats::mean(values),
            std_dev: stats::sample_std(values),
            median: stats::median_sorted(&sorted),
            q1: stats::quantile_sorted(&sorted, 0.25),
            q3: stats::quantile_sorted(&sorted, 0.75),
        })
    }

    fn categorical_stats(series: &Series) -> Result<Option<CategoricalStats>> {
        let casted = series.cast(&DataType::String)?;
        let non_null = casted.drop_nulls();
        if non_null.is_empty() {
            return Ok(None);
        }

        let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
        for value in non_null.str()?.into_iter().flatten() {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }

        let unique_count = counts.len();
        let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
        // Count descending, then name, so ties resolve identically every run
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let most_frequent = entries[0].0.clone();
        entries.truncate(10);

        Ok(Some(CategoricalStats {
            unique_count,
            most_frequent,
            top_values: entries,
        }))
    }
}
