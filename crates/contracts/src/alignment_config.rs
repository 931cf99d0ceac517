//! Estimator and aligner configuration contracts shared across crates.
//!
//! Every field has a default so partial config files stay valid; the caller
//! always hands a fully resolved value to the core.

use serde::{Deserialize, Serialize};

use crate::{AlignError, Stream};

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeAlignmentConfig {
    /// Offset estimator knobs
    #[serde(default)]
    pub filtering: FilteringConfig,

    /// Pose aligner knobs
    #[serde(default)]
    pub alignment: AlignmentConfig,
}

/// Offset estimator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilteringConfig {
    /// Moving-average window (samples) applied to the angular-rate signal
    pub smoothing_window_size: usize,

    /// Common rate both angular-rate signals are resampled to (Hz)
    pub resampling_rate_hz: f64,

    /// Minimum normalized cross-correlation peak accepted
    pub min_correlation_confidence: f64,

    /// Clip angular-rate spikes above `clipping_percentile`
    pub clip_outliers: bool,

    /// Percentile (0-100] used for spike clipping
    pub clipping_percentile: f64,

    /// Suppress samples below `low_motion_threshold_rad_s`
    pub discard_low_motion: bool,

    /// Noise floor for the low-motion filter (rad/s)
    pub low_motion_threshold_rad_s: f64,

    /// Peak angular speed below which a stream counts as stationary (rad/s)
    pub min_motion_rad_s: f64,

    /// Minimum overlap of a candidate lag, as a fraction of the shorter signal
    pub min_overlap_fraction: f64,

    /// Optional bound on |offset| searched (seconds)
    pub max_offset_s: Option<f64>,
}

impl Default for FilteringConfig {
    fn default() -> Self {
        Self {
            smoothing_window_size: 5,
            resampling_rate_hz: 100.0,
            min_correlation_confidence: 0.5,
            clip_outliers: true,
            clipping_percentile: 99.5,
            discard_low_motion: true,
            low_motion_threshold_rad_s: 0.02,
            min_motion_rad_s: 0.05,
            min_overlap_fraction: 0.5,
            max_offset_s: None,
        }
    }
}

impl TimeAlignmentConfig {
    /// Check both sections, returning the first violation
    pub fn validate(&self) -> Result<(), AlignError> {
        self.filtering.validate()?;
        self.alignment.validate()
    }
}

impl FilteringConfig {
    /// Spacing of the shared resampling grid (seconds)
    pub fn resampling_period(&self) -> f64 {
        1.0 / self.resampling_rate_hz
    }

    /// Check every knob; NaN fails every range check
    ///
    /// # Errors
    /// `ConfigValidation` naming the first offending field.
    pub fn validate(&self) -> Result<(), AlignError> {
        positive("filtering.resampling_rate_hz", self.resampling_rate_hz)?;

        if self.smoothing_window_size == 0 {
            return Err(AlignError::config_validation(
                "filtering.smoothing_window_size",
                "smoothing_window_size must be >= 1",
            ));
        }

        if !(0.0..=1.0).contains(&self.min_correlation_confidence) {
            return Err(AlignError::config_validation(
                "filtering.min_correlation_confidence",
                format!(
                    "min_correlation_confidence must be in [0, 1], got {}",
                    self.min_correlation_confidence
                ),
            ));
        }

        if !(self.clipping_percentile > 0.0 && self.clipping_percentile <= 100.0) {
            return Err(AlignError::config_validation(
                "filtering.clipping_percentile",
                format!(
                    "clipping_percentile must be in (0, 100], got {}",
                    self.clipping_percentile
                ),
            ));
        }

        non_negative(
            "filtering.low_motion_threshold_rad_s",
            self.low_motion_threshold_rad_s,
        )?;
        non_negative("filtering.min_motion_rad_s", self.min_motion_rad_s)?;

        if !(self.min_overlap_fraction > 0.0 && self.min_overlap_fraction <= 1.0) {
            return Err(AlignError::config_validation(
                "filtering.min_overlap_fraction",
                format!(
                    "min_overlap_fraction must be in (0, 1], got {}",
                    self.min_overlap_fraction
                ),
            ));
        }

        if let Some(max_offset) = self.max_offset_s {
            positive("filtering.max_offset_s", max_offset)?;
        }

        Ok(())
    }
}

/// Pose aligner configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// How the common timestamp grid is chosen
    pub grid: GridStrategy,
}

/// Common timestamp grid used by the aligner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridStrategy {
    /// Timestamps of one stream inside the overlap
    Reference { stream: Stream },
    /// Union of both streams' timestamps inside the overlap
    Union,
    /// Regular grid from the overlap start
    Uniform { rate_hz: f64 },
}

impl AlignmentConfig {
    /// # Errors
    /// `ConfigValidation` for a non-positive uniform grid rate.
    pub fn validate(&self) -> Result<(), AlignError> {
        if let GridStrategy::Uniform { rate_hz } = self.grid {
            positive("alignment.grid.rate_hz", rate_hz)?;
        }
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<(), AlignError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AlignError::config_validation(
            field,
            format!("value must be > 0, got {value}"),
        ))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), AlignError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AlignError::config_validation(
            field,
            format!("value must be >= 0, got {value}"),
        ))
    }
}

impl Default for GridStrategy {
    fn default() -> Self {
        GridStrategy::Reference { stream: Stream::B }
    }
}
