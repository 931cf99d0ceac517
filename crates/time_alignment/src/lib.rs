//! # Time Alignment
//!
//! 两路位姿流的时间偏移估计与对齐。
//!
//! 负责：
//! - 由姿态序列计算角速度信号（裁剪、低速抑制、平滑、均匀重采样）
//! - 归一化互相关求时间偏移，输出 `OffsetEstimate`
//! - 按偏移平移、求交集、在公共时间网格上插值，输出 `AlignedPosePair`
//!
//! ## 使用示例
//!
//! ```ignore
//! use time_alignment::{align_poses, estimate_time_offset, TimeAlignmentConfig};
//!
//! let config = TimeAlignmentConfig::default();
//! let estimate = estimate_time_offset(&poses_b_h, &poses_w_e, &config.filtering)?;
//! let aligned = align_poses(&poses_b_h, &poses_w_e, &estimate.offset, &config.alignment)?;
//! let (aligned_b_h, aligned_w_e) = aligned.into_parts();
//! ```

mod aligner;
mod correlation;
mod estimator;
mod interpolation;
mod signal;

pub use aligner::{align_poses, alignment_residual, overlap};
pub use correlation::{correlate, CorrelationPeak};
pub use estimator::{estimate_time_offset, motion_signature};
pub use interpolation::{interpolate_pose, resample};
pub use signal::{AngularRateSignal, UniformSignal};

// Re-export contracts types
pub use contracts::{
    AlignError, AlignedPosePair, AlignmentConfig, FilteringConfig, GridStrategy, OffsetEstimate,
    PoseSequence, Stream, TimeAlignmentConfig, TimeOffset, TimedPose,
};
