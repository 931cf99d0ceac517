//! `align` command implementation.

use anyhow::{Context, Result};
use contracts::{GridStrategy, Stream, TimeAlignmentConfig, TimeOffset};
use observability::AlignmentStatsAggregator;
use tracing::{info, warn};

use super::{load_inputs, resolve_config};
use crate::cli::{AlignArgs, GridArg};
use crate::error::CliError;

/// Execute the `align` command
pub fn run_align(args: &AlignArgs) -> Result<()> {
    let mut config = resolve_config(&args.tuning)?;
    apply_grid_override(args, &mut config)?;

    let (poses_b_h, poses_w_e) = load_inputs(&args.input)?;
    let mut stats = AlignmentStatsAggregator::new();

    let offset = match args.time_offset {
        Some(seconds) => {
            info!(offset_s = seconds, "Using time offset from CLI, estimation skipped");
            TimeOffset::shifting_a(seconds)
        }
        None => {
            let estimate =
                time_alignment::estimate_time_offset(&poses_b_h, &poses_w_e, &config.filtering)
                    .inspect_err(|e| {
                        observability::record_failure("estimate", e);
                        stats.update_failure(e);
                    })
                    .map_err(CliError::from)
                    .context("Failed to estimate time offset")?;
            observability::record_estimate(&estimate);
            stats.update_estimate(&estimate);
            estimate.offset
        }
    };

    let pair = time_alignment::align_poses(&poses_b_h, &poses_w_e, &offset, &config.alignment)
        .inspect_err(|e| {
            observability::record_failure("align", e);
            stats.update_failure(e);
        })
        .map_err(CliError::from)
        .with_context(|| format!("Failed to align poses with offset {offset}"))?;

    let residual = match time_alignment::alignment_residual(&pair) {
        Ok(residual) => Some(residual),
        Err(e) => {
            warn!(error = %e, "Alignment residual unavailable");
            None
        }
    };
    observability::record_alignment(&pair, residual);
    stats.update_alignment(&pair, residual);

    let samples = pair.len();
    let (aligned_b_h, aligned_w_e) = pair.into_parts();
    pose_io::write_poses(&args.aligned_b_h, &aligned_b_h)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to write {}", args.aligned_b_h.display()))?;
    pose_io::write_poses(&args.aligned_w_e, &aligned_w_e)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to write {}", args.aligned_w_e.display()))?;

    info!(
        samples,
        b_h = %args.aligned_b_h.display(),
        w_e = %args.aligned_w_e.display(),
        "Aligned poses written"
    );

    println!("Time offset: {offset}");
    println!(
        "Aligned {samples} poses per stream over [{:.6}, {:.6}] ({} clock)",
        aligned_b_h.start_time(),
        aligned_b_h.end_time(),
        offset.shifts().other().label()
    );
    println!("{}", stats.summary());

    Ok(())
}

fn apply_grid_override(args: &AlignArgs, config: &mut TimeAlignmentConfig) -> Result<()> {
    let Some(grid) = args.grid else {
        if args.grid_rate.is_some() {
            warn!("--grid-rate ignored without --grid uniform");
        }
        return Ok(());
    };

    config.alignment.grid = match grid {
        GridArg::ReferenceA => GridStrategy::Reference { stream: Stream::A },
        GridArg::ReferenceB => GridStrategy::Reference { stream: Stream::B },
        GridArg::Union => GridStrategy::Union,
        GridArg::Uniform => {
            let rate_hz = args.grid_rate.ok_or_else(|| {
                CliError::invalid_argument("--grid-rate", "required with --grid uniform")
            })?;
            GridStrategy::Uniform { rate_hz }
        }
    };

    config_loader::validate_alignment(&config.alignment)
        .map_err(CliError::from)
        .context("Invalid grid override")?;
    info!(grid = ?config.alignment.grid, "Overriding alignment grid from CLI");
    Ok(())
}
