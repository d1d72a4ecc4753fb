//! Ride-Booking Data Reliability Audit
//!
//! A batch statistical data-quality pipeline built with Rust and Polars.
//!
//! # Overview
//!
//! Given a tabular ride-booking dataset, the pipeline:
//!
//! - **Profiles** every column: missingness, descriptive statistics, value
//!   frequencies
//! - **Tests normality** per numeric column with a four-test battery
//!   (Shapiro-Wilk, Kolmogorov-Smirnov, Jarque-Bera, Anderson-Darling)
//! - **Analyzes correlation**: pairwise-complete Pearson matrix, variance
//!   inflation factors, and a table of expected domain relationships
//! - **Detects and removes outliers** with three methods at three
//!   thresholds each, producing nine candidate cleaned datasets
//! - **Ranks the candidates** on a deterministic loss/improvement rubric
//! - **Scores reliability** on a 0-100 scale for the raw dataset and the
//!   winning cleaned dataset
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rideaudit::{AuditPipeline, ReportRenderer, ingest};
//! use std::path::Path;
//!
//! let dataset = ingest::load_csv(Path::new("bookings.csv"))?;
//! let report = AuditPipeline::with_defaults().run(&dataset)?;
//!
//! println!("{}", ReportRenderer::render_text(&report));
//! println!(
//!     "reliability: {:.1} -> {:.1}",
//!     report.baseline.reliability.total,
//!     report.cleaned.reliability.total,
//! );
//! ```
//!
//! # Configuration
//!
//! The sweep and every decision table are configurable through
//! [`AuditConfig`]:
//!
//! ```rust,ignore
//! use rideaudit::{AuditConfig, AuditPipeline, OutlierMethod};
//!
//! let config = AuditConfig::builder()
//!     .methods(vec![OutlierMethod::Iqr, OutlierMethod::ModifiedZScore])
//!     .thresholds(vec![1.5, 3.0])
//!     .alpha(0.01)
//!     .build()?;
//!
//! let pipeline = AuditPipeline::new(config)?;
//! ```

pub mod comparator;
pub mod config;
pub mod consistency;
pub mod correlation;
pub mod dataset;
pub mod error;
pub mod ingest;
pub mod normality;
pub mod outliers;
pub mod pipeline;
pub mod profiler;
pub mod report;
pub mod reliability;
pub mod stats;

// Re-exports for convenient access
pub use comparator::{MethodComparator, VariantOutcome};
pub use config::{
    AuditConfig, AuditConfigBuilder, ConfigValidationError, ConsistencyRules, DetectionThresholds,
    DomainCheck, ExpectedSign, OutlierMethod, ScoreWeights,
};
pub use consistency::{ConsistencyChecker, ConsistencyIssue, IssueKind};
pub use correlation::{
    BucketCounts, CorrelationAnalyzer, CorrelationPair, CorrelationReport, DomainCheckResult,
    DomainVerdict, Strength, VifEntry, VifReport, VifSeverity,
};
pub use dataset::{ColumnKind, ColumnSpec, Dataset, TableSchema};
pub use error::{AuditError, Result as AuditResult, ResultExt};
pub use normality::{
    ColumnVerdict, NormalityBattery, NormalityReport, NormalityTest, TestOutcome, TestRun,
};
pub use outliers::{CleaningOutcome, OutlierCleaner, OutlierRateReport, outlier_mask};
pub use pipeline::{AuditPipeline, AuditReport, DatasetAssessment};
pub use profiler::{ColumnProfile, DatasetProfile, DatasetProfiler};
pub use reliability::{ReliabilityBreakdown, ReliabilityGrade, ReliabilityScorer};
pub use report::ReportRenderer;
