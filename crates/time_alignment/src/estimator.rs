//! Time offset estimation from rotational motion signatures.
//!
//! Pipeline per stream: angular rate → spike clipping → low-motion suppression
//! → moving average → uniform resampling. The two resampled signals are then
//! cross-correlated and the winning lag becomes an offset that shifts stream A.

use contracts::{AlignError, FilteringConfig, OffsetEstimate, PoseSequence, Stream, TimeOffset};
use tracing::{debug, info, instrument, warn};

use crate::correlation::correlate;
use crate::signal::{AngularRateSignal, UniformSignal};

/// Estimate the offset that aligns stream `a` onto stream `b`'s clock
///
/// The returned offset is tagged [`Stream::A`]: adding it to every timestamp
/// of `a` expresses `a` on `b`'s clock.
///
/// # Errors
/// - `MalformedInput` if a stream has fewer than two poses
/// - `ConfigValidation` for an unusable configuration
/// - `InsufficientSignal` for a stationary stream or a correlation peak below
///   `min_correlation_confidence`
/// - `NoOverlap` when no candidate lag overlaps enough
#[instrument(
    name = "time_alignment_estimate",
    skip_all,
    fields(poses_a = a.len(), poses_b = b.len(), rate_hz = config.resampling_rate_hz)
)]
pub fn estimate_time_offset(
    a: &PoseSequence,
    b: &PoseSequence,
    config: &FilteringConfig,
) -> Result<OffsetEstimate, AlignError> {
    config.validate()?;

    let signal_a = motion_signature(a, Stream::A, config)?;
    let signal_b = motion_signature(b, Stream::B, config)?;

    let peak = match correlate(&signal_a, &signal_b, config) {
        Ok(peak) => peak,
        Err(e) => {
            metrics::counter!("time_alignment_estimates_total", "status" => "failed").increment(1);
            return Err(e);
        }
    };

    if peak.correlation < config.min_correlation_confidence {
        warn!(
            confidence = peak.correlation,
            required = config.min_correlation_confidence,
            "correlation peak below confidence threshold"
        );
        metrics::counter!("time_alignment_estimates_total", "status" => "low_confidence")
            .increment(1);
        return Err(AlignError::low_confidence(
            peak.correlation,
            config.min_correlation_confidence,
        ));
    }

    let estimate = OffsetEstimate {
        offset: TimeOffset::shifting_a(peak.shift_s),
        confidence: peak.correlation,
        lag_samples: peak.lag,
        overlap_samples: peak.overlap,
        resampling_rate_hz: config.resampling_rate_hz,
    };

    metrics::counter!("time_alignment_estimates_total", "status" => "ok").increment(1);
    metrics::histogram!("time_alignment_confidence").record(estimate.confidence);
    metrics::gauge!("time_alignment_offset_s").set(peak.shift_s);

    info!(
        offset_s = peak.shift_s,
        confidence = peak.correlation,
        lag = peak.lag,
        overlap = peak.overlap,
        "time offset estimated"
    );

    Ok(estimate)
}

/// Filtered, smoothed and resampled angular-rate signal of one stream
#[instrument(name = "time_alignment_motion_signature", level = "debug", skip(poses, config))]
pub fn motion_signature(
    poses: &PoseSequence,
    stream: Stream,
    config: &FilteringConfig,
) -> Result<UniformSignal, AlignError> {
    let mut signal = AngularRateSignal::from_poses(poses)
        .map_err(|e| annotate(e, stream))?;
    let raw_peak = signal.peak();

    if config.clip_outliers {
        signal.clip_to_percentile(config.clipping_percentile);
    }

    if signal.peak() < config.min_motion_rad_s {
        metrics::counter!("time_alignment_estimates_total", "status" => "stationary").increment(1);
        return Err(AlignError::insufficient_signal(format!(
            "stream {stream} is near-stationary: peak angular rate {:.6} rad/s below {:.6} rad/s",
            signal.peak(),
            config.min_motion_rad_s
        )));
    }

    let suppressed = if config.discard_low_motion {
        signal.suppress_below(config.low_motion_threshold_rad_s)
    } else {
        0
    };

    signal.smooth(config.smoothing_window_size);

    let uniform = signal
        .resample(config.resampling_rate_hz)
        .map_err(|e| annotate(e, stream))?;

    debug!(
        %stream,
        samples = signal.len(),
        raw_peak,
        clipped_peak = signal.peak(),
        suppressed,
        resampled = uniform.len(),
        "motion signature derived"
    );

    Ok(uniform)
}

fn annotate(err: AlignError, stream: Stream) -> AlignError {
    match err {
        AlignError::MalformedInput { message } => {
            AlignError::malformed(format!("stream {stream}: {message}"))
        }
        AlignError::InsufficientSignal {
            message,
            confidence,
        } => AlignError::InsufficientSignal {
            message: format!("stream {stream}: {message}"),
            confidence,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Quaternion, TimedPose, Vector3};

    /// Orientation profile with non-periodic angular speed
    fn orientation_at(t: f64) -> Quaternion {
        let yaw = 0.9 * (1.3 * t).sin() + 0.4 * (3.1 * t + 0.5).sin();
        let pitch = 0.5 * (0.7 * t).sin() * (2.3 * t).cos();
        Quaternion::from_axis_angle(Vector3::z(), yaw)
            * Quaternion::from_axis_angle(Vector3::y(), pitch)
    }

    fn sampled(rate_hz: f64, duration: f64, delay: f64) -> PoseSequence {
        let n = (duration * rate_hz).round() as usize + 1;
        let poses = (0..n)
            .map(|i| {
                let t = i as f64 / rate_hz;
                TimedPose::new(t, Vector3::new(t, 0.0, 0.0), orientation_at(t - delay)).unwrap()
            })
            .collect();
        PoseSequence::new(poses).unwrap()
    }

    #[test]
    fn test_identical_streams_give_zero_offset() {
        let a = sampled(100.0, 8.0, 0.0);
        let estimate = estimate_time_offset(&a, &a, &FilteringConfig::default()).unwrap();
        assert!(estimate.offset.seconds().abs() < 1e-9);
        assert_eq!(estimate.offset.shifts(), Stream::A);
        assert!(estimate.confidence > 0.99);
    }

    #[test]
    fn test_recovers_delay_across_rates() {
        let config = FilteringConfig::default();
        let a = sampled(100.0, 10.0, 0.0);
        let b = sampled(60.0, 10.0, 0.37);
        let estimate = estimate_time_offset(&a, &b, &config).unwrap();
        assert!(
            (estimate.offset.seconds() - 0.37).abs() <= config.resampling_period(),
            "estimated {}",
            estimate.offset
        );
    }

    #[test]
    fn test_stationary_stream_is_reported() {
        let a = sampled(100.0, 5.0, 0.0);
        let still = PoseSequence::new(
            (0..300)
                .map(|i| {
                    TimedPose::new(i as f64 / 60.0, Vector3::zeros(), Quaternion::identity())
                        .unwrap()
                })
                .collect(),
        )
        .unwrap();
        let err = estimate_time_offset(&a, &still, &FilteringConfig::default()).unwrap_err();
        match err {
            AlignError::InsufficientSignal { message, .. } => {
                assert!(message.contains("stationary"), "got: {message}");
                assert!(message.contains("W_E"), "got: {message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_confidence_threshold_enforced() {
        let a = sampled(100.0, 6.0, 0.0);
        let b = sampled(60.0, 6.0, 0.37);
        let config = FilteringConfig {
            min_correlation_confidence: 1.0,
            ..Default::default()
        };
        let err = estimate_time_offset(&a, &b, &config).unwrap_err();
        assert!(matches!(
            err,
            AlignError::InsufficientSignal {
                confidence: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_single_pose_rejected() {
        let a = sampled(100.0, 2.0, 0.0);
        let single = PoseSequence::new(vec![a.poses()[0]]).unwrap();
        assert!(matches!(
            estimate_time_offset(&a, &single, &FilteringConfig::default()),
            Err(AlignError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_nan_confidence_is_not_a_pass() {
        let a = sampled(100.0, 6.0, 0.0);
        let b = sampled(60.0, 6.0, 0.37);
        let config = FilteringConfig {
            min_correlation_confidence: f64::NAN,
            ..Default::default()
        };
        match estimate_time_offset(&a, &b, &config) {
            Err(AlignError::ConfigValidation { field, .. }) => {
                assert_eq!(field, "filtering.min_correlation_confidence")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_nan_search_bound_rejected() {
        let a = sampled(100.0, 6.0, 0.0);
        let b = sampled(60.0, 6.0, 0.37);
        let config = FilteringConfig {
            max_offset_s: Some(f64::NAN),
            ..Default::default()
        };
        assert!(matches!(
            estimate_time_offset(&a, &b, &config),
            Err(AlignError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_invalid_rate_rejected() {
        let a = sampled(100.0, 2.0, 0.0);
        let config = FilteringConfig {
            resampling_rate_hz: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            estimate_time_offset(&a, &a, &config),
            Err(AlignError::ConfigValidation { .. })
        ));
    }
}
