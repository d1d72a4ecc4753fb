//! CLI entry point for the data reliability audit.

use anyhow::{Result, anyhow};
use clap::Parser;
use rideaudit::{AuditPipeline, ReportRenderer, ingest};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Statistical reliability audit for ride-booking datasets",
    long_about = "Profiles a CSV dataset, runs a four-test normality battery, analyzes\n\
                  correlation and multicollinearity, sweeps nine outlier-cleaning\n\
                  variants and reports a 0-100 reliability score before and after\n\
                  cleaning.\n\n\
                  EXAMPLES:\n  \
                  # Audit a dataset and print the text report\n  \
                  rideaudit -i bookings.csv\n\n  \
                  # Machine-readable output\n  \
                  rideaudit -i bookings.csv --json | jq .best_variant\n\n  \
                  # Also write the JSON report next to other outputs\n  \
                  rideaudit -i bookings.csv -o results/ --emit-report"
)]
struct Args {
    /// Path to the CSV file to audit
    #[arg(short, long)]
    input: String,

    /// Output directory for emitted reports
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Write a detailed JSON report to the output directory
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Output JSON to stdout instead of the text report
    ///
    /// Disables all progress logs; only the final JSON is written.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and the final report)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let input = Path::new(&args.input);
    if !input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    info!("Loading dataset from: {}", args.input);
    let dataset = ingest::load_csv(input)?;

    let pipeline = AuditPipeline::with_defaults();
    let report = pipeline
        .run(&dataset)
        .map_err(|e| anyhow!("Audit failed: {e}"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.emit_report {
        let stem = extract_file_stem(&args.input);
        let path = ReportRenderer::write_json(&report, &PathBuf::from(&args.output), &stem)?;
        info!("Report written to: {}", path.display());
    }

    println!("{}", ReportRenderer::render_text(&report));
    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string()
}
