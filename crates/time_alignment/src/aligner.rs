//! Pose alignment: shift, intersect, resample onto a common grid.

use contracts::{
    AlignError, AlignedPosePair, AlignmentConfig, GridStrategy, PoseSequence, Stream, TimeOffset,
};
use tracing::{debug, info, instrument};

use crate::interpolation::resample;

/// Union grid timestamps closer than this are merged.
const GRID_MERGE_TOLERANCE_S: f64 = 1e-9;

/// Align two pose streams on their common time support
///
/// The stream named by `offset.shifts()` is moved by `offset.seconds()`; the
/// other stays on its own clock, which is also the clock of the output.
///
/// # Errors
/// - `NoOverlap` when the shifted time ranges are disjoint or the chosen grid
///   has no sample inside the overlap
/// - `ConfigValidation` for a non-positive uniform grid rate
/// - `InterpolationRange` if a grid sample escapes a source range
#[instrument(
    name = "time_alignment_align",
    skip_all,
    fields(offset_s = offset.seconds(), shifts = %offset.shifts(), grid = ?config.grid)
)]
pub fn align_poses(
    a: &PoseSequence,
    b: &PoseSequence,
    offset: &TimeOffset,
    config: &AlignmentConfig,
) -> Result<AlignedPosePair, AlignError> {
    let (a, b) = offset.apply(a, b)?;

    let (lo, hi) = overlap(&a, &b)?;
    let grid = build_grid(&a, &b, lo, hi, &config.grid)?;
    if grid.is_empty() {
        return Err(AlignError::NoOverlap {
            a_range: a.time_range(),
            b_range: b.time_range(),
        });
    }
    debug!(start = lo, end = hi, samples = grid.len(), "alignment grid built");

    let aligned_a = resample(&a, &grid)?;
    let aligned_b = resample(&b, &grid)?;
    let pair = AlignedPosePair::new(aligned_a, aligned_b)?;

    metrics::counter!("time_alignment_alignments_total").increment(1);
    metrics::histogram!("time_alignment_aligned_samples").record(pair.len() as f64);

    info!(
        samples = pair.len(),
        start = lo,
        end = hi,
        "poses aligned"
    );
    Ok(pair)
}

/// Common time support `[max(t0), min(tN)]` of two sequences
///
/// # Errors
/// `NoOverlap` when the lower bound is not below the upper bound.
pub fn overlap(a: &PoseSequence, b: &PoseSequence) -> Result<(f64, f64), AlignError> {
    let lo = a.start_time().max(b.start_time());
    let hi = a.end_time().min(b.end_time());
    if lo >= hi {
        return Err(AlignError::NoOverlap {
            a_range: a.time_range(),
            b_range: b.time_range(),
        });
    }
    Ok((lo, hi))
}

fn build_grid(
    a: &PoseSequence,
    b: &PoseSequence,
    lo: f64,
    hi: f64,
    strategy: &GridStrategy,
) -> Result<Vec<f64>, AlignError> {
    let inside = |t: &f64| (lo..=hi).contains(t);
    let grid = match *strategy {
        GridStrategy::Reference { stream } => {
            let reference = match stream {
                Stream::A => a,
                Stream::B => b,
            };
            reference.times().filter(inside).collect()
        }
        GridStrategy::Union => {
            let mut times: Vec<f64> = a.times().chain(b.times()).filter(inside).collect();
            times.sort_by(f64::total_cmp);
            times.dedup_by(|later, kept| *later - *kept < GRID_MERGE_TOLERANCE_S);
            times
        }
        GridStrategy::Uniform { rate_hz } => {
            if !(rate_hz.is_finite() && rate_hz > 0.0) {
                return Err(AlignError::config_validation(
                    "alignment.grid.rate_hz",
                    format!("must be > 0, got {rate_hz}"),
                ));
            }
            let period = 1.0 / rate_hz;
            let count = ((hi - lo) / period + 1e-9).floor() as usize + 1;
            (0..count)
                .map(|k| lo + k as f64 * period)
                .filter(inside)
                .collect()
        }
    };
    Ok(grid)
}

/// Mean absolute difference of angular rate between the two aligned streams
///
/// Rotation angles of relative motion are unaffected by a fixed mounting
/// rotation, so a correctly aligned hand/eye pair scores close to zero.
///
/// # Errors
/// `MalformedInput` for a pair with fewer than two samples.
pub fn alignment_residual(pair: &AlignedPosePair) -> Result<f64, AlignError> {
    if pair.len() < 2 {
        return Err(AlignError::malformed(
            "alignment residual needs at least 2 aligned samples",
        ));
    }
    let a = pair.a().poses();
    let b = pair.b().poses();
    let total: f64 = a
        .windows(2)
        .zip(b.windows(2))
        .map(|(wa, wb)| {
            let dt = wa[1].t() - wa[0].t();
            let rate_a = wa[0].orientation().angle_to(wa[1].orientation()) / dt;
            let rate_b = wb[0].orientation().angle_to(wb[1].orientation()) / dt;
            (rate_a - rate_b).abs()
        })
        .sum();
    Ok(total / (pair.len() - 1) as f64)
}
