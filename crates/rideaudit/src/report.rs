//! Report rendering.
//!
//! Turns an [`AuditReport`] into a human-readable text summary or a JSON
//! file. Plot rendering is a downstream consumer of the same numbers and
//! lives outside this crate.

use crate::correlation::BucketCounts;
use crate::error::Result;
use crate::normality::TestRun;
use crate::pipeline::{AuditReport, DatasetAssessment};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

const RULE_WIDTH: usize = 78;

/// Renders audit reports for CLI and file output.
pub struct ReportRenderer;

impl ReportRenderer {
    /// Render the full text report.
    pub fn render_text(report: &AuditReport) -> String {
        let mut out = String::new();

        heading(&mut out, "DATASET RELIABILITY AUDIT");
        let _ = writeln!(out, "Generated: {}", report.generated_at);
        let _ = writeln!(
            out,
            "Rows: {}    Columns: {}    Missing cells: {:.2}%",
            report.rows,
            report.columns,
            report.baseline.profile.total_missing_fraction * 100.0
        );

        heading(&mut out, "RAW DATASET");
        render_assessment(&mut out, &report.baseline);

        heading(&mut out, "CLEANING SWEEP");
        let _ = writeln!(
            out,
            "{:<22} {:>10} {:>10} {:>10} {:>6}",
            "variant", "loss %", "score", "delta", "band"
        );
        let _ = writeln!(out, "{}", "-".repeat(62));
        for variant in &report.variants {
            let _ = writeln!(
                out,
                "{:<22} {:>10.2} {:>10.1} {:>+10.1} {:>6}",
                variant.id(),
                variant.loss_fraction * 100.0,
                variant.cleaned_score,
                variant.improvement,
                variant.band_score
            );
        }
        let _ = writeln!(
            out,
            "\nBest variant: {} (loss {:.2}%)",
            report.best_variant,
            report.best_loss_fraction * 100.0
        );

        heading(&mut out, "CLEANED DATASET");
        let _ = writeln!(
            out,
            "Rows after cleaning: {} ({} removed)",
            report.cleaned_rows,
            report.rows - report.cleaned_rows
        );
        render_assessment(&mut out, &report.cleaned);

        heading(&mut out, "BEFORE vs AFTER");
        for shift in &report.column_shifts {
            let _ = writeln!(
                out,
                "  {:<24} mean {:+6.1}%   std {:+6.1}%   median {:+6.1}%",
                shift.column, shift.mean_change_pct, shift.std_change_pct, shift.median_change_pct
            );
        }
        let _ = writeln!(out, "\nCorrelation bucket shift:");
        render_bucket_shift(
            &mut out,
            &report.correlation_shift.before,
            &report.correlation_shift.after,
        );
        let _ = writeln!(
            out,
            "\nReliability: {:.1} -> {:.1} ({:+.1})",
            report.baseline.reliability.total,
            report.cleaned.reliability.total,
            report.score_improvement
        );
        let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));

        out
    }

    /// Write the report as pretty JSON to `<output_dir>/<stem>_audit.json`.
    pub fn write_json(report: &AuditReport, output_dir: &Path, stem: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join(format!("{stem}_audit.json"));
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&path)?;
        file.write_all(json.as_bytes())?;
        info!(path = %path.display(), "wrote audit report");
        Ok(path)
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
}

fn render_assessment(out: &mut String, assessment: &DatasetAssessment) {
    let reliability = &assessment.reliability;
    let _ = writeln!(
        out,
        "Reliability: {:.1}/100 ({:?}) - {}",
        reliability.total,
        reliability.grade,
        reliability.grade.recommendation()
    );
    let _ = writeln!(
        out,
        "  normality {:.1}  outliers {:.1}  correlation {:.1}  consistency {:.1}",
        reliability.normality_score,
        reliability.outlier_score,
        reliability.correlation_score,
        reliability.consistency_score
    );

    let _ = writeln!(out, "\nNormality battery:");
    for verdict in &assessment.normality.verdicts {
        let mark = if verdict.is_normal { "normal" } else { "not normal" };
        let _ = writeln!(
            out,
            "  {:<24} {} ({}/{} tests)",
            verdict.column, mark, verdict.normal_votes, verdict.tests_run
        );
        for run in &verdict.outcomes {
            match run {
                TestRun::Completed(o) => {
                    let _ = writeln!(
                        out,
                        "    {:<20} stat={:<12.4} p={:.4}",
                        o.test.display_name(),
                        o.statistic,
                        o.p_value
                    );
                }
                TestRun::NotApplicable { test, reason } => {
                    let _ = writeln!(
                        out,
                        "    {:<20} not applicable ({reason})",
                        test.display_name()
                    );
                }
            }
        }
    }

    let _ = writeln!(out, "\nOutlier rates (canonical thresholds):");
    for rate in &assessment.outlier_rates.per_column {
        let mark = if rate.acceptable { "ok" } else { "high" };
        let _ = writeln!(
            out,
            "  {:<24} iqr {:>5.2}%  z {:>5.2}%  mz {:>5.2}%  avg {:>5.2}%  [{mark}]",
            rate.column, rate.iqr_pct, rate.z_score_pct, rate.modified_z_pct, rate.average_pct
        );
    }

    let _ = writeln!(out, "\nCorrelation buckets:");
    render_bucket_counts(out, &assessment.correlation.bucket_counts());
    for pair in &assessment.correlation.pairs {
        if pair.r.abs() > 0.6 {
            let _ = writeln!(
                out,
                "  {} <-> {}: r = {:.3} ({})",
                pair.left,
                pair.right,
                pair.r,
                pair.strength.display_name()
            );
        }
    }

    if !assessment.vif.entries.is_empty() {
        let _ = writeln!(out, "\nVariance inflation:");
        for entry in &assessment.vif.entries {
            match entry.vif {
                Some(vif) => {
                    let severity = entry
                        .severity
                        .map(|s| format!("{s:?}"))
                        .unwrap_or_else(|| "unknown".to_string());
                    let _ = writeln!(
                        out,
                        "  {:<24} VIF = {:>8.2} ({severity})",
                        entry.column, vif
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "  {:<24} VIF undefined (perfect collinearity)",
                        entry.column
                    );
                }
            }
        }
    }

    if !assessment.domain_checks.is_empty() {
        let _ = writeln!(out, "\nDomain checks:");
        for check in &assessment.domain_checks {
            let _ = writeln!(
                out,
                "  {} <-> {}: r = {:.3} [{:?}] ({})",
                check.left_column, check.right_column, check.r, check.verdict, check.rationale
            );
        }
    }

    if assessment.consistency.is_empty() {
        let _ = writeln!(out, "\nConsistency: no issues");
    } else {
        let _ = writeln!(out, "\nConsistency issues:");
        for issue in &assessment.consistency {
            let _ = writeln!(out, "  - {}", issue.description);
        }
    }
}

fn render_bucket_counts(out: &mut String, counts: &BucketCounts) {
    let _ = writeln!(
        out,
        "  very high: {}  high: {}  moderate: {}  low: {}  negligible: {}",
        counts.very_high, counts.high, counts.moderate, counts.low, counts.negligible
    );
}

fn render_bucket_shift(out: &mut String, before: &BucketCounts, after: &BucketCounts) {
    let rows = [
        ("very high", before.very_high, after.very_high),
        ("high", before.high, after.high),
        ("moderate", before.moderate, after.moderate),
        ("low", before.low, after.low),
        ("negligible", before.negligible, after.negligible),
    ];
    for (label, b, a) in rows {
        let delta = a as i64 - b as i64;
        let _ = writeln!(out, "  {label:<12} {b} -> {a} ({delta:+})");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::pipeline::AuditPipeline;
    use polars::prelude::*;

    fn sample_report() -> AuditReport {
        let mut fare: Vec<f64> = (1..=30).map(|i| 10.0 + i as f64).collect();
        fare.push(9999.0);
        let distance: Vec<f64> = (0..31).map(|i| 1.0 + (i as f64 * 0.61).cos().abs()).collect();
        let ds = Dataset::from_frame(df!["fare" => fare, "distance" => distance].unwrap()).unwrap();
        AuditPipeline::with_defaults().run(&ds).unwrap()
    }

    #[test]
    fn test_text_report_mentions_key_sections() {
        let text = ReportRenderer::render_text(&sample_report());
        assert!(text.contains("DATASET RELIABILITY AUDIT"));
        assert!(text.contains("CLEANING SWEEP"));
        assert!(text.contains("Best variant:"));
        assert!(text.contains("Reliability:"));
        assert!(text.contains("Normality battery:"));
    }

    #[test]
    fn test_text_report_lists_all_variants() {
        let report = sample_report();
        let text = ReportRenderer::render_text(&report);
        for variant in &report.variants {
            assert!(text.contains(&variant.id()), "missing {}", variant.id());
        }
    }

    #[test]
    fn test_write_json_roundtrip() {
        let report = sample_report();
        let dir = std::env::temp_dir().join("rideaudit_report_test");
        let path = ReportRenderer::write_json(&report, &dir, "sample").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["rows"], serde_json::json!(report.rows));
        std::fs::remove_file(path).ok();
    }
}
