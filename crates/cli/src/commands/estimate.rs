//! `estimate` command implementation.

use anyhow::{Context, Result};
use contracts::OffsetEstimate;
use serde::Serialize;
use tracing::info;

use super::{load_inputs, resolve_config};
use crate::cli::EstimateArgs;
use crate::error::CliError;

/// Estimate report for JSON output
#[derive(Serialize)]
struct EstimateReport {
    #[serde(flatten)]
    estimate: OffsetEstimate,
    /// Offset expressed as a shift of W_E, for consumers that move the eye stream
    offset_w_e_s: f64,
    resolution_s: f64,
}

/// Execute the `estimate` command
pub fn run_estimate(args: &EstimateArgs) -> Result<()> {
    let config = resolve_config(&args.tuning)?;
    let (poses_b_h, poses_w_e) = load_inputs(&args.input)?;

    let estimate =
        time_alignment::estimate_time_offset(&poses_b_h, &poses_w_e, &config.filtering)
            .inspect_err(|e| observability::record_failure("estimate", e))
            .map_err(CliError::from)
            .context("Failed to estimate time offset")?;
    observability::record_estimate(&estimate);

    info!(offset = %estimate.offset, confidence = estimate.confidence, "Estimate complete");

    let report = EstimateReport {
        estimate,
        offset_w_e_s: estimate.offset.reversed().seconds(),
        resolution_s: estimate.resolution_s(),
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize estimate")?;
        println!("{}", json);
    } else {
        print_estimate(&report);
    }

    Ok(())
}

fn print_estimate(report: &EstimateReport) {
    let estimate = &report.estimate;
    println!("✓ Time offset: {}", estimate.offset);
    println!("\n  Confidence: {:.4}", estimate.confidence);
    println!(
        "  Lag: {} samples at {} Hz (±{:.6} s)",
        estimate.lag_samples, estimate.resampling_rate_hz, report.resolution_s
    );
    println!("  Overlap: {} samples", estimate.overlap_samples);
    println!("  Equivalent W_E shift: {:+.6} s", report.offset_w_e_s);
}
