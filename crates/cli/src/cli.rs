//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pose Align - time alignment of hand (B_H) and eye (W_E) pose streams
#[derive(Parser, Debug)]
#[command(
    name = "pose-align",
    author,
    version,
    about = "Estimate the time offset between two pose streams and align them",
    long_about = "Estimates the clock offset between two independently timestamped 6-DoF pose \n\
                  streams from their rotational motion, then resamples both onto a common \n\
                  timestamp grid restricted to their overlap."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "POSE_ALIGN_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "POSE_ALIGN_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate the offset, align both streams and write them out
    Align(AlignArgs),

    /// Estimate the time offset only
    Estimate(EstimateArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Input pose files
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// CSV file with hand poses B_H (stream A)
    #[arg(long, alias = "poses_B_H_csv_file", env = "POSE_ALIGN_POSES_B_H")]
    pub poses_b_h: PathBuf,

    /// CSV file with eye poses W_E (stream B)
    #[arg(long, alias = "poses_W_E_csv_file", env = "POSE_ALIGN_POSES_W_E")]
    pub poses_w_e: PathBuf,
}

/// Configuration file plus estimator overrides
#[derive(Args, Debug, Clone, Default)]
pub struct TuningArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "POSE_ALIGN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override filtering.smoothing_window_size
    #[arg(long)]
    pub smoothing_window: Option<usize>,

    /// Override filtering.resampling_rate_hz
    #[arg(long)]
    pub resampling_rate: Option<f64>,

    /// Override filtering.min_correlation_confidence
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Override filtering.max_offset_s
    #[arg(long)]
    pub max_offset: Option<f64>,
}

/// Arguments for the `align` command
#[derive(Parser, Debug, Clone)]
pub struct AlignArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Output CSV for aligned hand poses B_H
    #[arg(long, alias = "aligned_poses_B_H_csv_file")]
    pub aligned_b_h: PathBuf,

    /// Output CSV for aligned eye poses W_E
    #[arg(long, alias = "aligned_poses_W_E_csv_file")]
    pub aligned_w_e: PathBuf,

    /// Override alignment.grid
    #[arg(long, value_enum)]
    pub grid: Option<GridArg>,

    /// Rate of the uniform grid (Hz), required with `--grid uniform`
    #[arg(long)]
    pub grid_rate: Option<f64>,

    /// Skip estimation and shift B_H by this many seconds
    #[arg(long, allow_negative_numbers = true)]
    pub time_offset: Option<f64>,
}

/// Arguments for the `estimate` command
#[derive(Parser, Debug, Clone)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Output the estimate as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "alignment.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Alignment grid choice
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridArg {
    /// Timestamps of B_H inside the overlap
    ReferenceA,
    /// Timestamps of W_E inside the overlap
    ReferenceB,
    /// Union of both streams' timestamps
    Union,
    /// Regular grid at `--grid-rate`
    Uniform,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
