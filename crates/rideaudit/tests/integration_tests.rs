//! Integration tests for the audit pipeline.
//!
//! These tests drive the full pipeline end-to-end on synthetic datasets
//! with known statistical shape.

use polars::prelude::*;
use pretty_assertions::assert_eq;
use rideaudit::{
    AuditError, AuditPipeline, Dataset, DomainVerdict, OutlierMethod, ReportRenderer,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Two tightly clustered modes far apart: symmetric, wildly non-normal,
/// yet free of outliers under every method and threshold in the sweep.
fn bimodal_column(offset_pattern: fn(usize) -> bool) -> Vec<f64> {
    let mut low = 0usize;
    let mut high = 0usize;
    (0..60)
        .map(|i| {
            if offset_pattern(i) {
                low += 1;
                (low - 1) as f64 * 0.01
            } else {
                high += 1;
                100.0 + (high - 1) as f64 * 0.01
            }
        })
        .collect()
}

/// A dataset engineered to score exactly 75/100: no outliers, no very-high
/// correlation, no consistency issues, and no normally distributed column.
fn reference_dataset() -> Dataset {
    let alpha = bimodal_column(|i| i % 2 == 0);
    let beta = bimodal_column(|i| i % 4 < 2);
    Dataset::from_frame(df!["alpha" => alpha, "beta" => beta].unwrap()).unwrap()
}

/// Ride-shaped data with strong internal relationships and one absurd fare.
fn ride_dataset() -> Dataset {
    let n = 80usize;
    let distance: Vec<f64> = (0..n)
        .map(|i| 1.0 + i as f64 * 0.35 + (i as f64 * 0.9).sin().abs())
        .collect();
    let duration: Vec<f64> = distance
        .iter()
        .enumerate()
        .map(|(i, d)| 8.0 + 2.2 * d + (i as f64 * 0.7).cos() * 1.5)
        .collect();
    let mut fare: Vec<f64> = distance
        .iter()
        .enumerate()
        .map(|(i, d)| 2.5 + 1.8 * d + (i as f64 * 1.3).sin() * 0.8)
        .collect();
    fare[n - 1] = 50_000.0;
    let tip: Vec<f64> = fare
        .iter()
        .enumerate()
        .map(|(i, f)| 0.08 * f.min(100.0) + (i as f64 * 0.5).cos().abs())
        .collect();
    let rating: Vec<f64> = (0..n)
        .map(|i| 3.6 + ((i * 7) % 14) as f64 * 0.1)
        .collect();

    Dataset::from_frame(
        df![
            "ride_distance" => distance,
            "ride_duration" => duration,
            "fare_amount" => fare,
            "tip_amount" => tip,
            "driver_rating" => rating,
        ]
        .unwrap(),
    )
    .unwrap()
}

// ============================================================================
// Reference Score Behaviour
// ============================================================================

#[test]
fn test_reference_dataset_scores_75_before_and_after_cleaning() {
    let report = AuditPipeline::with_defaults()
        .run(&reference_dataset())
        .unwrap();

    // No column is normally distributed; everything else is clean.
    assert_eq!(report.baseline.reliability.normality_score, 0.0);
    assert_eq!(report.baseline.reliability.outlier_score, 25.0);
    assert_eq!(report.baseline.reliability.correlation_score, 25.0);
    assert_eq!(report.baseline.reliability.consistency_score, 25.0);
    assert!((report.baseline.reliability.total - 75.0).abs() < 1e-9);

    // Every variant removes nothing, so the sweep ties and the first
    // configured variant wins without changing the score.
    assert_eq!(report.best_variant, "iqr_1.5");
    assert_eq!(report.best_loss_fraction, 0.0);
    assert_eq!(report.cleaned_rows, report.rows);
    assert!((report.cleaned.reliability.total - 75.0).abs() < 1e-9);
    assert_eq!(report.score_improvement, 0.0);
}

#[test]
fn test_reference_dataset_verdicts_reject_normality() {
    let report = AuditPipeline::with_defaults()
        .run(&reference_dataset())
        .unwrap();
    for verdict in &report.baseline.normality.verdicts {
        assert!(!verdict.is_normal, "{} judged normal", verdict.column);
        assert_eq!(verdict.tests_run, 4);
    }
}

// ============================================================================
// Full Pipeline on Ride-Shaped Data
// ============================================================================

#[test]
fn test_ride_dataset_removes_extreme_fare() {
    let report = AuditPipeline::with_defaults().run(&ride_dataset()).unwrap();

    assert!(report.cleaned_rows < report.rows);
    let fare = report
        .cleaned
        .profile
        .column("fare_amount")
        .unwrap()
        .numeric
        .as_ref()
        .unwrap();
    assert!(fare.max < 50_000.0);
}

#[test]
fn test_ride_dataset_domain_checks_confirm_expected_relationships() {
    let report = AuditPipeline::with_defaults().run(&ride_dataset()).unwrap();

    let find = |checks: &[rideaudit::DomainCheckResult], left: &str, right: &str| {
        checks
            .iter()
            .find(|c| c.left_column == left && c.right_column == right)
            .map(|c| c.verdict)
            .unwrap_or_else(|| panic!("no check for {left} <-> {right}"))
    };

    // Distance and duration move together regardless of the fare outlier.
    assert_eq!(
        find(&report.baseline.domain_checks, "ride_distance", "ride_duration"),
        DomainVerdict::Pass
    );

    // The absurd fare drowns the fare relationships on the raw data; once
    // the outlier row is removed they come back.
    assert_eq!(
        find(&report.cleaned.domain_checks, "ride_distance", "fare_amount"),
        DomainVerdict::Pass
    );
    assert_eq!(
        find(&report.cleaned.domain_checks, "ride_duration", "fare_amount"),
        DomainVerdict::Pass
    );
}

#[test]
fn test_ride_dataset_correlation_matrix_is_symmetric() {
    let report = AuditPipeline::with_defaults().run(&ride_dataset()).unwrap();
    let matrix = &report.baseline.correlation.matrix;
    let size = matrix.len();
    for i in 0..size {
        assert!(matrix[i][i].is_none(), "self-pair computed at {i}");
        for j in 0..size {
            assert_eq!(matrix[i][j], matrix[j][i]);
        }
    }
    // Every unordered pair of the 5 numeric columns appears exactly once.
    assert_eq!(report.baseline.correlation.pairs.len(), 10);
}

#[test]
fn test_zscore_variant_losses_monotone_in_threshold() {
    let report = AuditPipeline::with_defaults().run(&ride_dataset()).unwrap();

    let loss = |threshold: f64| {
        report
            .variants
            .iter()
            .find(|v| v.method == OutlierMethod::ZScore && v.threshold == threshold)
            .map(|v| v.loss_fraction)
            .unwrap()
    };
    assert!(loss(1.5) >= loss(2.0));
    assert!(loss(2.0) >= loss(2.5));
}

#[test]
fn test_pipeline_is_deterministic_across_runs() {
    let ds = ride_dataset();
    let pipeline = AuditPipeline::with_defaults();
    let first = pipeline.run(&ds).unwrap();
    let second = pipeline.run(&ds).unwrap();

    assert_eq!(
        first.baseline.reliability.total,
        second.baseline.reliability.total
    );
    assert_eq!(first.best_variant, second.best_variant);
    assert_eq!(first.cleaned_rows, second.cleaned_rows);
    let firsts: Vec<f64> = first.variants.iter().map(|v| v.cleaned_score).collect();
    let seconds: Vec<f64> = second.variants.iter().map(|v| v.cleaned_score).collect();
    assert_eq!(firsts, seconds);
}

// ============================================================================
// Degenerate Inputs
// ============================================================================

#[test]
fn test_all_missing_column_degrades_without_error() {
    let df = df![
        "good" => (0..20).map(|i| i as f64).collect::<Vec<_>>(),
        "empty" => std::iter::repeat(None::<f64>).take(20).collect::<Vec<_>>(),
    ]
    .unwrap();
    let ds = Dataset::from_frame(df).unwrap();
    let report = AuditPipeline::with_defaults().run(&ds).unwrap();

    let empty = report.baseline.profile.column("empty").unwrap();
    assert!(empty.is_undefined());
    // Excluded from the correlation matrix without raising.
    assert!(report.baseline.correlation.pairs.is_empty());
    // And from the battery.
    assert!(report.baseline.normality.column("empty").is_none());
}

#[test]
fn test_constant_column_produces_no_flags_anywhere() {
    let df = df![
        "constant" => vec![4.2f64; 60],
        "varying" => bimodal_column(|i| i % 2 == 0),
    ]
    .unwrap();
    let ds = Dataset::from_frame(df).unwrap();
    let report = AuditPipeline::with_defaults().run(&ds).unwrap();

    let rate = report
        .baseline
        .outlier_rates
        .column("constant")
        .unwrap();
    assert_eq!(rate.z_score_pct, 0.0);
    assert_eq!(rate.modified_z_pct, 0.0);
    // No variant drops a row on account of the constant column.
    for variant in &report.variants {
        assert_eq!(variant.rows_removed, 0);
    }
}

#[test]
fn test_zero_rows_aborts_with_specific_error() {
    let ds = Dataset::from_frame(df!["v" => Vec::<f64>::new()].unwrap()).unwrap();
    let result = AuditPipeline::with_defaults().run(&ds);
    assert!(matches!(result, Err(AuditError::EmptyDataset)));
}

#[test]
fn test_text_report_renders_for_ride_data() {
    let report = AuditPipeline::with_defaults().run(&ride_dataset()).unwrap();
    let text = ReportRenderer::render_text(&report);
    assert!(text.contains("ride_distance"));
    assert!(text.contains("Best variant:"));
    assert!(text.contains("Domain checks:"));
}
