//! Correlation and multicollinearity analysis.
//!
//! Builds the full pairwise Pearson matrix over numeric columns using
//! pairwise-complete observations (a row is dropped from a pair only when
//! either side is missing), classifies each unordered pair into strength
//! buckets, computes variance inflation factors by regressing each column
//! on all the others, and evaluates the configured domain-relationship
//! table against the observed coefficients.

use crate::config::{AuditConfig, DomainCheck, ExpectedSign};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::stats;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// R-squared above which a regression is treated as perfectly collinear.
const PERFECT_COLLINEARITY_R2: f64 = 0.9999;

/// Pivot magnitude below which the normal equations are singular.
const SINGULAR_PIVOT: f64 = 1e-10;

/// Strength bucket derived from |r|.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strength {
    /// |r| > 0.8
    VeryHigh,
    /// 0.6 < |r| <= 0.8
    High,
    /// 0.3 < |r| <= 0.6
    Moderate,
    /// 0.1 < |r| <= 0.3
    Low,
    /// |r| <= 0.1
    Negligible,
}

impl Strength {
    /// Classify an absolute coefficient.
    pub fn from_r(r: f64) -> Self {
        let abs = r.abs();
        if abs > 0.8 {
            Self::VeryHigh
        } else if abs > 0.6 {
            Self::High
        } else if abs > 0.3 {
            Self::Moderate
        } else if abs > 0.1 {
            Self::Low
        } else {
            Self::Negligible
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::VeryHigh => "very high",
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Low => "low",
            Self::Negligible => "negligible",
        }
    }
}

/// One unordered pair of numeric columns with its coefficient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub left: String,
    pub right: String,
    pub r: f64,
    pub strength: Strength,
    /// Pairwise-complete observations the coefficient was computed from.
    pub observations: usize,
}

/// Pair population per strength bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    pub very_high: usize,
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
    pub negligible: usize,
}

/// Full correlation analysis over a dataset's numeric columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationReport {
    /// Columns in declaration order; indexes into `matrix`.
    pub columns: Vec<String>,
    /// Symmetric matrix; `None` on the diagonal and wherever the pair had
    /// too few complete observations or a constant side.
    pub matrix: Vec<Vec<Option<f64>>>,
    /// Every computable unordered pair exactly once.
    pub pairs: Vec<CorrelationPair>,
}

impl CorrelationReport {
    /// Coefficient between two named columns, if computable.
    pub fn r_between(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.matrix[i][j]
    }

    /// Pairs with |r| > 0.8.
    pub fn very_high_pairs(&self) -> usize {
        self.pairs
            .iter()
            .filter(|p| p.strength == Strength::VeryHigh)
            .count()
    }

    /// Pair population per bucket.
    pub fn bucket_counts(&self) -> BucketCounts {
        let mut counts = BucketCounts::default();
        for pair in &self.pairs {
            match pair.strength {
                Strength::VeryHigh => counts.very_high += 1,
                Strength::High => counts.high += 1,
                Strength::Moderate => counts.moderate += 1,
                Strength::Low => counts.low += 1,
                Strength::Negligible => counts.negligible += 1,
            }
        }
        counts
    }
}

/// Multicollinearity severity derived from a VIF value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VifSeverity {
    /// VIF < 5
    Acceptable,
    /// 5 <= VIF < 10
    Moderate,
    /// VIF >= 10
    Severe,
}

impl VifSeverity {
    fn from_vif(vif: f64) -> Self {
        if vif >= 10.0 {
            Self::Severe
        } else if vif >= 5.0 {
            Self::Moderate
        } else {
            Self::Acceptable
        }
    }
}

/// VIF result for one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VifEntry {
    pub column: String,
    /// `None` when the regression is perfectly collinear and the factor is
    /// undefined; reported as a flag, never as infinity.
    pub vif: Option<f64>,
    pub severity: Option<VifSeverity>,
}

/// VIF results over the dataset's usable numeric columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VifReport {
    pub entries: Vec<VifEntry>,
    /// Constant or all-missing columns left out of the regression.
    pub excluded_columns: Vec<String>,
}

/// Verdict for one domain-relationship check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainVerdict {
    /// Expected sign with |r| > 0.3.
    Pass,
    /// Right sign but |r| <= 0.3, or too weak to confirm.
    Weak,
    /// Observed sign contradicts the expectation.
    Fail,
}

/// One evaluated domain check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainCheckResult {
    pub left_column: String,
    pub right_column: String,
    pub expectation: ExpectedSign,
    pub rationale: String,
    pub r: f64,
    pub verdict: DomainVerdict,
}

/// Computes correlation, VIF and domain-check results.
pub struct CorrelationAnalyzer;

impl CorrelationAnalyzer {
    /// Build the pairwise-complete Pearson matrix and pair table.
    pub fn analyze(dataset: &Dataset, config: &AuditConfig) -> Result<CorrelationReport> {
        let columns = dataset.numeric_columns();
        let mut series: Vec<Vec<Option<f64>>> = Vec::with_capacity(columns.len());
        for name in &columns {
            series.push(dataset.numeric_values(name)?);
        }

        let size = columns.len();
        let mut matrix = vec![vec![None; size]; size];
        let mut pairs = Vec::new();

        for i in 0..size {
            for j in (i + 1)..size {
                let mut x = Vec::new();
                let mut y = Vec::new();
                for (a, b) in series[i].iter().zip(series[j].iter()) {
                    if let (Some(a), Some(b)) = (a, b) {
                        x.push(*a);
                        y.push(*b);
                    }
                }
                if x.len() < config.min_observations {
                    continue;
                }
                if let Some(r) = stats::pearson(&x, &y) {
                    matrix[i][j] = Some(r);
                    matrix[j][i] = Some(r);
                    pairs.push(CorrelationPair {
                        left: columns[i].clone(),
                        right: columns[j].clone(),
                        r,
                        strength: Strength::from_r(r),
                        observations: x.len(),
                    });
                }
            }
        }

        Ok(CorrelationReport {
            columns,
            matrix,
            pairs,
        })
    }

    /// Compute the variance inflation factor of every usable numeric column
    /// by regressing it on all the others over complete-case rows.
    pub fn vif(dataset: &Dataset) -> Result<VifReport> {
        let columns = dataset.numeric_columns();
        let mut series: Vec<Vec<Option<f64>>> = Vec::with_capacity(columns.len());
        for name in &columns {
            series.push(dataset.numeric_values(name)?);
        }

        // Complete-case rows across all numeric columns.
        let height = dataset.height();
        let complete_rows: Vec<usize> = (0..height)
            .filter(|row| series.iter().all(|col| col[*row].is_some()))
            .collect();

        let mut included: Vec<usize> = Vec::new();
        let mut excluded_columns = Vec::new();
        let mut data: Vec<Vec<f64>> = Vec::new();

        for (idx, name) in columns.iter().enumerate() {
            let values: Vec<f64> = complete_rows
                .iter()
                .map(|row| series[idx][*row].unwrap_or_default())
                .collect();
            let sd = stats::sample_std(&values);
            if values.len() < 3 || sd == 0.0 {
                debug!(column = %name, "excluded from VIF (constant or too sparse)");
                excluded_columns.push(name.clone());
                continue;
            }
            let mean = stats::mean(&values);
            data.push(values.iter().map(|v| (v - mean) / sd).collect());
            included.push(idx);
        }

        if included.len() < 2 {
            return Ok(VifReport {
                entries: Vec::new(),
                excluded_columns,
            });
        }

        let mut entries = Vec::with_capacity(included.len());
        for target in 0..included.len() {
            let predictors: Vec<&Vec<f64>> = data
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != target)
                .map(|(_, col)| col)
                .collect();
            let r_squared = regression_r_squared(&data[target], &predictors);

            let (vif, severity) = match r_squared {
                Some(r2) if r2 < PERFECT_COLLINEARITY_R2 => {
                    let vif = 1.0 / (1.0 - r2);
                    (Some(vif), Some(VifSeverity::from_vif(vif)))
                }
                // Singular system or R^2 -> 1: the factor is undefined.
                _ => (None, None),
            };

            entries.push(VifEntry {
                column: columns[included[target]].clone(),
                vif,
                severity,
            });
        }

        Ok(VifReport {
            entries,
            excluded_columns,
        })
    }

    /// Evaluate the configured relationship table against observed
    /// coefficients. Patterns that match no column pair produce no result.
    pub fn domain_checks(
        report: &CorrelationReport,
        checks: &[DomainCheck],
    ) -> Vec<DomainCheckResult> {
        let mut results = Vec::new();

        for check in checks {
            let left_matches = columns_matching(&report.columns, &check.left_pattern);
            let right_matches = columns_matching(&report.columns, &check.right_pattern);

            for left in &left_matches {
                for right in &right_matches {
                    if left == right {
                        continue;
                    }
                    let Some(r) = report.r_between(left, right) else {
                        continue;
                    };
                    let verdict = classify_expectation(r, check.expectation);
                    results.push(DomainCheckResult {
                        left_column: left.clone(),
                        right_column: right.clone(),
                        expectation: check.expectation,
                        rationale: check.rationale.clone(),
                        r,
                        verdict,
                    });
                }
            }
        }

        results
    }
}

fn columns_matching(columns: &[String], pattern: &str) -> Vec<String> {
    let needle = pattern.to_lowercase();
    columns
        .iter()
        .filter(|c| c.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

fn classify_expectation(r: f64, expectation: ExpectedSign) -> DomainVerdict {
    match expectation {
        ExpectedSign::Positive | ExpectedSign::WeakPositive => {
            if r < 0.0 {
                DomainVerdict::Fail
            } else if r > 0.3 {
                DomainVerdict::Pass
            } else {
                DomainVerdict::Weak
            }
        }
    }
}

/// R-squared of an ordinary least-squares fit of `y` on `predictors` plus
/// an intercept, solved through the normal equations. `None` when the
/// system is singular.
fn regression_r_squared(y: &[f64], predictors: &[&Vec<f64>]) -> Option<f64> {
    let n = y.len();
    let p = predictors.len() + 1; // intercept first

    // Design matrix rows on the fly: x[0] = 1, x[k] = predictors[k-1][row].
    let mut xtx = vec![vec![0.0f64; p]; p];
    let mut xty = vec![0.0f64; p];
    for row in 0..n {
        let mut x = Vec::with_capacity(p);
        x.push(1.0);
        for col in predictors {
            x.push(col[row]);
        }
        for i in 0..p {
            xty[i] += x[i] * y[row];
            for j in 0..p {
                xtx[i][j] += x[i] * x[j];
            }
        }
    }

    let beta = solve_linear_system(&mut xtx, &mut xty)?;

    let mean_y = stats::mean(y);
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for row in 0..n {
        let mut fitted = beta[0];
        for (k, col) in predictors.iter().enumerate() {
            fitted += beta[k + 1] * col[row];
        }
        ss_res += (y[row] - fitted).powi(2);
        ss_tot += (y[row] - mean_y).powi(2);
    }
    if ss_tot == 0.0 {
        return None;
    }
    Some((1.0 - ss_res / ss_tot).clamp(0.0, 1.0))
}

/// Gaussian elimination with partial pivoting; consumes its inputs.
fn solve_linear_system(a: &mut [Vec<f64>], b: &mut [f64]) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n).max_by(|i, j| {
            a[*i][col]
                .abs()
                .partial_cmp(&a[*j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[pivot_row][col].abs() < SINGULAR_PIVOT {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0f64; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for col in (row + 1)..n {
            sum -= a[row][col] * x[col];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}
