//! Pose interpolation between bracketing samples.

use contracts::{AlignError, PoseSequence, TimedPose};

/// Pose of `sequence` at time `t`
///
/// Positions are interpolated linearly, orientations by shortest-arc slerp.
/// A timestamp that hits a stored sample returns that sample unchanged.
///
/// # Errors
/// `InterpolationRange` when `t` lies outside the sequence's time range.
pub fn interpolate_pose(sequence: &PoseSequence, t: f64) -> Result<TimedPose, AlignError> {
    let (start, end) = sequence.time_range();
    if !(start..=end).contains(&t) {
        return Err(AlignError::InterpolationRange { t, start, end });
    }

    let poses = sequence.poses();
    // First index with poses[idx].t() >= t
    let idx = poses.partition_point(|p| p.t() < t);
    let upper = &poses[idx];
    if upper.t() == t {
        return Ok(*upper);
    }

    let lower = &poses[idx - 1];
    let f = (t - lower.t()) / (upper.t() - lower.t());
    let position = lower.position().lerp(upper.position(), f);
    let orientation = lower.orientation().slerp(upper.orientation(), f);
    TimedPose::new(t, position, orientation)
}

/// Resample `sequence` at every timestamp of `grid`
///
/// # Errors
/// `InterpolationRange` for any grid time outside the sequence; `MalformedInput`
/// if the grid is empty or not strictly increasing.
pub fn resample(sequence: &PoseSequence, grid: &[f64]) -> Result<PoseSequence, AlignError> {
    let poses = grid
        .iter()
        .map(|&t| interpolate_pose(sequence, t))
        .collect::<Result<Vec<_>, _>>()?;
    PoseSequence::new(poses)
}
