//! Value-plausibility checks over numeric columns.
//!
//! Three rule families, all configured in [`ConsistencyRules`]: columns
//! that must never be negative, columns where a large share of zeros is
//! suspect, and an extreme-value rule flagging observations far above the
//! 99.9th percentile. Issue counts feed the reliability score's
//! consistency sub-score.

use crate::config::ConsistencyRules;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::stats;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Kind of consistency violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IssueKind {
    /// Negative values in a column declared non-negative.
    NegativeValues { count: usize },
    /// Zero share above the configured threshold.
    ExcessZeros { count: usize, share: f64 },
    /// Values above `multiplier * p99.9`.
    ExtremeValues { count: usize },
}

/// One detected consistency issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyIssue {
    pub column: String,
    pub kind: IssueKind,
    pub description: String,
}

/// Runs the configured plausibility rules.
pub struct ConsistencyChecker;

impl ConsistencyChecker {
    /// Check every numeric column against the rules, returning all issues.
    pub fn check(dataset: &Dataset, rules: &ConsistencyRules) -> Result<Vec<ConsistencyIssue>> {
        let mut issues = Vec::new();

        for column in dataset.numeric_columns() {
            let values = dataset.non_null_numeric(&column)?;
            if values.is_empty() {
                continue;
            }
            let lower = column.to_lowercase();

            if matches_any(&lower, &rules.non_negative_patterns) {
                let count = values.iter().filter(|v| **v < 0.0).count();
                if count > 0 {
                    issues.push(ConsistencyIssue {
                        column: column.clone(),
                        kind: IssueKind::NegativeValues { count },
                        description: format!("{count} negative values in '{column}'"),
                    });
                }
            }

            if matches_any(&lower, &rules.zero_suspect_patterns) {
                let count = values.iter().filter(|v| **v == 0.0).count();
                let share = count as f64 / values.len() as f64;
                if share > rules.zero_share_threshold {
                    issues.push(ConsistencyIssue {
                        column: column.clone(),
                        kind: IssueKind::ExcessZeros { count, share },
                        description: format!(
                            "{count} zero values in '{column}' ({:.1}% of rows)",
                            share * 100.0
                        ),
                    });
                }
            }

            // Extreme-value rule applies to every numeric column.
            let sorted = stats::sorted(&values);
            let p999 = stats::quantile_sorted(&sorted, 0.999);
            let cutoff = p999 * rules.extreme_multiplier;
            if cutoff > 0.0 {
                let count = values.iter().filter(|v| **v > cutoff).count();
                if count > 0 {
                    issues.push(ConsistencyIssue {
                        column: column.clone(),
                        kind: IssueKind::ExtremeValues { count },
                        description: format!(
                            "{count} values in '{column}' above {:.1}x the 99.9th percentile",
                            rules.extreme_multiplier
                        ),
                    });
                }
            }
        }

        debug!(issues = issues.len(), "consistency check complete");
        Ok(issues)
    }
}

fn matches_any(column_lower: &str, patterns: &[String]) -> bool {
    patterns
        .iter()
        .any(|p| column_lower.contains(&p.to_lowercase()))
}
