//! Normality test battery.
//!
//! Runs four independent tests per numeric column (Shapiro-Wilk,
//! Kolmogorov-Smirnov against a fitted normal, Jarque-Bera and
//! Anderson-Darling) and records every outcome, even when an earlier test
//! already rejected. Each test votes "normal" when its p-value exceeds the
//! configured significance level; a column is judged normally distributed
//! when at least two of the tests that actually ran vote normal.
//!
//! Shapiro-Wilk is only applied up to its validity ceiling (5,000 by
//! default). Longer columns are subsampled with a fixed-seed generator so
//! repeated runs see the identical subsample.

mod anderson;
mod kolmogorov;
mod moments;
mod shapiro;

use crate::config::AuditConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::stats;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum observations for the Anderson-Darling small-sample adjustment.
const ANDERSON_MIN_N: usize = 8;

/// Votes needed from completed tests for a "normal" column verdict.
const NORMAL_VOTES_REQUIRED: usize = 2;

/// The four tests in the battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalityTest {
    ShapiroWilk,
    KolmogorovSmirnov,
    JarqueBera,
    AndersonDarling,
}

impl NormalityTest {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ShapiroWilk => "Shapiro-Wilk",
            Self::KolmogorovSmirnov => "Kolmogorov-Smirnov",
            Self::JarqueBera => "Jarque-Bera",
            Self::AndersonDarling => "Anderson-Darling",
        }
    }
}

impl std::fmt::Display for NormalityTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Result of one completed test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOutcome {
    pub test: NormalityTest,
    pub statistic: f64,
    pub p_value: f64,
    /// `p_value > alpha`.
    pub normal: bool,
}

/// A test that either completed or was recorded as not applicable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TestRun {
    Completed(TestOutcome),
    NotApplicable { test: NormalityTest, reason: String },
}

impl TestRun {
    /// The completed outcome, if any.
    pub fn outcome(&self) -> Option<&TestOutcome> {
        match self {
            Self::Completed(outcome) => Some(outcome),
            Self::NotApplicable { .. } => None,
        }
    }
}

/// Battery verdict for one numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnVerdict {
    pub column: String,
    pub sample_size: usize,
    /// True when Shapiro-Wilk ran on a seeded subsample instead of the
    /// full column.
    pub subsampled: bool,
    pub outcomes: Vec<TestRun>,
    /// Tests that completed.
    pub tests_run: usize,
    /// Completed tests that voted "normal".
    pub normal_votes: usize,
    /// `normal_votes >= 2`.
    pub is_normal: bool,
}

/// Battery verdicts for all assessed numeric columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalityReport {
    pub verdicts: Vec<ColumnVerdict>,
}

impl NormalityReport {
    /// Columns with enough data to be assessed.
    pub fn assessed_columns(&self) -> usize {
        self.verdicts.len()
    }

    /// Columns judged normally distributed.
    pub fn normal_columns(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_normal).count()
    }

    /// Verdict for a named column, if assessed.
    pub fn column(&self, name: &str) -> Option<&ColumnVerdict> {
        self.verdicts.iter().find(|v| v.column == name)
    }
}

/// Runs the four-test battery over every numeric column.
pub struct NormalityBattery;

impl NormalityBattery {
    /// Assess all numeric columns of the dataset.
    ///
    /// Columns with fewer than `config.min_observations` non-missing values
    /// are skipped entirely (they appear in no verdict).
    pub fn assess(dataset: &Dataset, config: &AuditConfig) -> Result<NormalityReport> {
        let mut verdicts = Vec::new();

        for column in dataset.numeric_columns() {
            let values = dataset.non_null_numeric(&column)?;
            if values.len() < config.min_observations {
                debug!(column = %column, n = values.len(), "too few observations, skipping");
                continue;
            }
            verdicts.push(Self::assess_column(&column, &values, config));
        }

        Ok(NormalityReport { verdicts })
    }

    fn assess_column(column: &str, values: &[f64], config: &AuditConfig) -> ColumnVerdict {
        let n = values.len();
        let sorted = stats::sorted(values);
        let mean = stats::mean(values);
        let std_dev = stats::sample_std(values);
        let constant = std_dev == 0.0;

        let mut outcomes = Vec::with_capacity(4);
        let mut subsampled = false;

        // Shapiro-Wilk, subsampled deterministically past its ceiling.
        if constant {
            outcomes.push(Self::not_applicable(
                NormalityTest::ShapiroWilk,
                "zero variance",
            ));
        } else if n > config.shapiro_max_sample {
            let sample =
                Self::seeded_subsample(values, config.shapiro_max_sample, config.shapiro_seed);
            subsampled = true;
            outcomes.push(Self::record(
                NormalityTest::ShapiroWilk,
                shapiro::shapiro_wilk(&sample),
                config.alpha,
            ));
        } else {
            outcomes.push(Self::record(
                NormalityTest::ShapiroWilk,
                shapiro::shapiro_wilk(&sorted),
                config.alpha,
            ));
        }

        // Kolmogorov-Smirnov against the fitted normal.
        if constant {
            outcomes.push(Self::not_applicable(
                NormalityTest::KolmogorovSmirnov,
                "zero variance",
            ));
        } else {
            outcomes.push(Self::record(
                NormalityTest::KolmogorovSmirnov,
                kolmogorov::kolmogorov_smirnov(&sorted, mean, std_dev),
                config.alpha,
            ));
        }

        // Jarque-Bera.
        if constant {
            outcomes.push(Self::not_applicable(
                NormalityTest::JarqueBera,
                "zero variance",
            ));
        } else {
            outcomes.push(Self::record(
                NormalityTest::JarqueBera,
                moments::jarque_bera(values),
                config.alpha,
            ));
        }

        // Anderson-Darling.
        if constant {
            outcomes.push(Self::not_applicable(
                NormalityTest::AndersonDarling,
                "zero variance",
            ));
        } else if n < ANDERSON_MIN_N {
            outcomes.push(Self::not_applicable(
                NormalityTest::AndersonDarling,
                "requires at least 8 observations",
            ));
        } else {
            outcomes.push(Self::record(
                NormalityTest::AndersonDarling,
                anderson::anderson_darling(&sorted, mean, std_dev),
                config.alpha,
            ));
        }

        let tests_run = outcomes.iter().filter(|r| r.outcome().is_some()).count();
        let normal_votes = outcomes
            .iter()
            .filter_map(TestRun::outcome)
            .filter(|o| o.normal)
            .count();
        let is_normal = normal_votes >= NORMAL_VOTES_REQUIRED;

        debug!(
            column = %column,
            n,
            tests_run,
            normal_votes,
            is_normal,
            "normality verdict"
        );

        ColumnVerdict {
            column: column.to_string(),
            sample_size: n,
            subsampled,
            outcomes,
            tests_run,
            normal_votes,
            is_normal,
        }
    }

    fn record(test: NormalityTest, result: Option<(f64, f64)>, alpha: f64) -> TestRun {
        match result {
            Some((statistic, p_value)) => TestRun::Completed(TestOutcome {
                test,
                statistic,
                p_value,
                normal: p_value > alpha,
            }),
            None => Self::not_applicable(test, "numerical failure"),
        }
    }

    fn not_applicable(test: NormalityTest, reason: &str) -> TestRun {
        TestRun::NotApplicable {
            test,
            reason: reason.to_string(),
        }
    }

    /// Draw a fixed-size subsample with a seeded generator and return it
    /// sorted. The same seed always selects the same rows.
    fn seeded_subsample(values: &[f64], size: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let indices = rand::seq::index::sample(&mut rng, values.len(), size);
        let mut sample: Vec<f64> = indices.iter().map(|i| values[i]).collect();
        sample.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sample
    }
}
