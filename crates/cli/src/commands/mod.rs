//! Command implementations.

mod align;
mod estimate;
mod validate;

pub use align::run_align;
pub use estimate::run_estimate;
pub use validate::run_validate;

use anyhow::{Context, Result};
use contracts::{PoseSequence, Stream, TimeAlignmentConfig};
use std::path::Path;
use tracing::info;

use crate::cli::{InputArgs, TuningArgs};
use crate::error::CliError;

/// Load the configuration file (or defaults) and apply command-line overrides
fn resolve_config(tuning: &TuningArgs) -> Result<TimeAlignmentConfig> {
    let mut config = match &tuning.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()).into());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .map_err(CliError::from)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => TimeAlignmentConfig::default(),
    };

    let filtering = &mut config.filtering;
    if let Some(window) = tuning.smoothing_window {
        info!(window, "Overriding smoothing window from CLI");
        filtering.smoothing_window_size = window;
    }
    if let Some(rate) = tuning.resampling_rate {
        info!(rate, "Overriding resampling rate from CLI");
        filtering.resampling_rate_hz = rate;
    }
    if let Some(confidence) = tuning.min_confidence {
        info!(confidence, "Overriding minimum confidence from CLI");
        filtering.min_correlation_confidence = confidence;
    }
    if let Some(max_offset) = tuning.max_offset {
        info!(max_offset, "Overriding maximum offset from CLI");
        filtering.max_offset_s = Some(max_offset);
    }

    config_loader::validate(&config)
        .map_err(CliError::from)
        .context("Invalid configuration after applying CLI overrides")?;
    Ok(config)
}

/// Read both input pose files
fn load_inputs(input: &InputArgs) -> Result<(PoseSequence, PoseSequence)> {
    let a = load_stream(&input.poses_b_h, Stream::A)?;
    let b = load_stream(&input.poses_w_e, Stream::B)?;
    Ok((a, b))
}

fn load_stream(path: &Path, stream: Stream) -> Result<PoseSequence> {
    if !path.exists() {
        return Err(CliError::input_not_found(path.display().to_string()).into());
    }
    let poses = pose_io::read_poses(path)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to read {} poses from {}", stream.label(), path.display()))?;

    info!(
        %stream,
        path = %path.display(),
        poses = poses.len(),
        start = poses.start_time(),
        end = poses.end_time(),
        "Loaded poses"
    );
    observability::record_input(stream, &poses);
    Ok(poses)
}
