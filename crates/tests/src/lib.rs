//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合成位姿流上的偏移估计与对齐场景
//! - 符号约定回归
//! - CSV / 配置文件贯通测试

#[cfg(test)]
mod synthetic {
    use contracts::{PoseSequence, Quaternion, TimedPose, Vector3};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Rotation of the rig at time `t`; angular speed is not periodic over 20 s
    pub fn rig_orientation(t: f64) -> Quaternion {
        let yaw = 0.9 * (1.3 * t).sin() + 0.4 * (3.1 * t + 0.5).sin();
        let pitch = 0.5 * (0.7 * t).sin() * (2.3 * t).cos();
        let roll = 0.3 * (1.9 * t + 1.0).sin();
        Quaternion::from_axis_angle(Vector3::z(), yaw)
            * Quaternion::from_axis_angle(Vector3::y(), pitch)
            * Quaternion::from_axis_angle(Vector3::x(), roll)
    }

    pub fn rig_position(t: f64) -> Vector3<f64> {
        Vector3::new((0.5 * t).sin(), (0.3 * t).cos(), 0.1 * t)
    }

    /// Hand poses B_H: rig motion on the hand clock
    pub fn hand_stream(rate_hz: f64, duration: f64) -> PoseSequence {
        sample(rate_hz, duration, 0.0, |t| {
            (rig_position(t), rig_orientation(t))
        })
    }

    /// Eye poses W_E: the same motion seen through a fixed mounting and world
    /// frame, on a clock that starts at `clock_start` and lags by `delay`
    pub fn eye_stream(rate_hz: f64, duration: f64, clock_start: f64, delay: f64) -> PoseSequence {
        let world = Quaternion::from_axis_angle(Vector3::new(1.0, 1.0, 0.0), 0.7);
        let mounting = Quaternion::from_axis_angle(Vector3::new(0.0, 1.0, 1.0), -0.4);
        sample(rate_hz, duration, clock_start, move |t| {
            let s = t - clock_start - delay;
            (rig_position(s), world * rig_orientation(s) * mounting)
        })
    }

    /// Perturb every orientation by a random small rotation
    pub fn with_rotation_noise(poses: &PoseSequence, max_angle: f64, seed: u64) -> PoseSequence {
        let mut rng = StdRng::seed_from_u64(seed);
        let noisy = poses
            .poses()
            .iter()
            .map(|p| {
                let axis = Vector3::new(
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                ) + Vector3::new(1e-3, 0.0, 0.0);
                let angle = rng.random_range(-max_angle..max_angle);
                let q = *p.orientation() * Quaternion::from_axis_angle(axis, angle);
                TimedPose::new(p.t(), *p.position(), q).unwrap()
            })
            .collect();
        PoseSequence::new(noisy).unwrap()
    }

    fn sample(
        rate_hz: f64,
        duration: f64,
        clock_start: f64,
        motion: impl Fn(f64) -> (Vector3<f64>, Quaternion),
    ) -> PoseSequence {
        let n = (duration * rate_hz).round() as usize + 1;
        let poses = (0..n)
            .map(|i| {
                let t = clock_start + i as f64 / rate_hz;
                let (position, orientation) = motion(t);
                TimedPose::new(t, position, orientation).unwrap()
            })
            .collect();
        PoseSequence::new(poses).unwrap()
    }
}

#[cfg(test)]
mod scenario_tests {
    use super::synthetic::*;
    use contracts::{AlignError, AlignmentConfig, FilteringConfig, Stream, TimeOffset};
    use time_alignment::{align_poses, alignment_residual, estimate_time_offset};

    /// A at 100 Hz for 10 s, B the same motion delayed by 0.37 s at 60 Hz
    #[test]
    fn test_delayed_eye_stream_recovered() {
        let config = FilteringConfig::default();
        let hand = hand_stream(100.0, 10.0);
        let eye = eye_stream(60.0, 10.0, 0.0, 0.37);

        let estimate = estimate_time_offset(&hand, &eye, &config).unwrap();
        assert_eq!(estimate.offset.shifts(), Stream::A);
        assert!(
            (estimate.offset.seconds() - 0.37).abs() <= config.resampling_period(),
            "estimated {}",
            estimate.offset
        );
        assert!(estimate.confidence >= config.min_correlation_confidence);

        let pair = align_poses(&hand, &eye, &estimate.offset, &AlignmentConfig::default()).unwrap();
        assert_eq!(pair.a().len(), pair.b().len());
        let (start, end) = pair.time_range();
        assert!(start >= estimate.offset.seconds() - 1e-12);
        assert!(end <= 10.0 + 1e-12);
        // trimmed to the overlap, still covering most of it
        assert!(end - start > 9.0);
    }

    #[test]
    fn test_estimate_applied_as_documented_beats_opposite_sign() {
        let hand = hand_stream(100.0, 10.0);
        let eye = eye_stream(60.0, 10.0, 0.0, 0.37);
        let estimate = estimate_time_offset(&hand, &eye, &FilteringConfig::default()).unwrap();

        let grid = AlignmentConfig::default();
        let documented = align_poses(&hand, &eye, &estimate.offset, &grid).unwrap();
        let flipped = TimeOffset::shifting_a(-estimate.offset.seconds());
        let opposite = align_poses(&hand, &eye, &flipped, &grid).unwrap();

        let good = alignment_residual(&documented).unwrap();
        let bad = alignment_residual(&opposite).unwrap();
        assert!(good < 0.5 * bad, "documented {good} vs opposite {bad}");
    }

    #[test]
    fn test_reversed_offset_is_same_alignment() {
        let hand = hand_stream(100.0, 10.0);
        let eye = eye_stream(60.0, 10.0, 0.0, 0.37);
        let offset = TimeOffset::shifting_a(0.37);

        let on_eye_clock = align_poses(&hand, &eye, &offset, &AlignmentConfig::default()).unwrap();
        let on_hand_clock =
            align_poses(&hand, &eye, &offset.reversed(), &AlignmentConfig::default()).unwrap();

        assert_eq!(on_eye_clock.len(), on_hand_clock.len());
        for (x, y) in on_eye_clock
            .a()
            .poses()
            .iter()
            .zip(on_hand_clock.a().poses())
        {
            assert!((x.t() - y.t() - 0.37).abs() < 1e-9);
            assert!((x.position() - y.position()).norm() < 1e-9);
            assert!(x.orientation().angle_to(y.orientation()) < 1e-9);
        }
    }

    #[test]
    fn test_large_clock_offset_recovered() {
        let hand = hand_stream(100.0, 10.0);
        let eye = eye_stream(60.0, 10.0, 1000.0, 0.37);
        let config = FilteringConfig::default();

        let estimate = estimate_time_offset(&hand, &eye, &config).unwrap();
        assert!(
            (estimate.offset.seconds() - 1000.37).abs() <= config.resampling_period(),
            "estimated {}",
            estimate.offset
        );

        let pair = align_poses(&hand, &eye, &estimate.offset, &AlignmentConfig::default()).unwrap();
        assert!(pair.time_range().0 >= 1000.0);
    }

    #[test]
    fn test_noisy_eye_stream_recovered() {
        let hand = hand_stream(100.0, 10.0);
        let eye = with_rotation_noise(&eye_stream(60.0, 10.0, 0.0, 0.37), 0.001, 42);
        let config = FilteringConfig::default();

        let estimate = estimate_time_offset(&hand, &eye, &config).unwrap();
        assert!(
            (estimate.offset.seconds() - 0.37).abs() <= 2.0 * config.resampling_period(),
            "estimated {}",
            estimate.offset
        );
    }

    #[test]
    fn test_estimation_is_deterministic() {
        let hand = hand_stream(100.0, 6.0);
        let eye = eye_stream(60.0, 6.0, 0.0, 0.2);
        let config = FilteringConfig::default();
        let first = estimate_time_offset(&hand, &eye, &config).unwrap();
        let second = estimate_time_offset(&hand, &eye, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_disjoint_streams_never_partially_aligned() {
        let hand = hand_stream(100.0, 5.0);
        let eye = eye_stream(60.0, 5.0, 100.0, 0.0);
        let err = align_poses(
            &hand,
            &eye,
            &TimeOffset::shifting_a(0.0),
            &AlignmentConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AlignError::NoOverlap { .. }));
    }

    #[test]
    fn test_bounded_search_never_exceeds_bound() {
        let hand = hand_stream(100.0, 10.0);
        let eye = eye_stream(60.0, 10.0, 0.0, 0.37);
        let config = FilteringConfig {
            max_offset_s: Some(0.2),
            ..Default::default()
        };
        match estimate_time_offset(&hand, &eye, &config) {
            Ok(estimate) => assert!(estimate.offset.seconds().abs() <= 0.2 + 1e-9),
            Err(AlignError::InsufficientSignal { confidence, .. }) => assert!(confidence.is_some()),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
}

#[cfg(test)]
mod file_tests {
    use super::synthetic::*;
    use config_loader::ConfigLoader;
    use contracts::GridStrategy;
    use std::io::Write;
    use time_alignment::{align_poses, estimate_time_offset};

    #[test]
    fn test_csv_round_trip_preserves_estimate() {
        let dir = tempfile::tempdir().unwrap();
        let hand = hand_stream(100.0, 8.0);
        let eye = eye_stream(60.0, 8.0, 0.0, 0.25);
        let config = contracts::FilteringConfig::default();

        let hand_path = dir.path().join("poses_B_H.csv");
        let eye_path = dir.path().join("poses_W_E.csv");
        pose_io::write_poses(&hand_path, &hand).unwrap();
        pose_io::write_poses(&eye_path, &eye).unwrap();

        let hand_loaded = pose_io::read_poses(&hand_path).unwrap();
        let eye_loaded = pose_io::read_poses(&eye_path).unwrap();

        let direct = estimate_time_offset(&hand, &eye, &config).unwrap();
        let via_files = estimate_time_offset(&hand_loaded, &eye_loaded, &config).unwrap();
        assert_eq!(direct.lag_samples, via_files.lag_samples);
        assert!((direct.offset.seconds() - via_files.offset.seconds()).abs() < 1e-9);
    }

    #[test]
    fn test_config_file_drives_pipeline() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[filtering]
smoothing_window_size = 9
resampling_rate_hz = 200.0

[alignment.grid]
kind = "uniform"
rate_hz = 20.0
"#
        )
        .unwrap();
        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.alignment.grid, GridStrategy::Uniform { rate_hz: 20.0 });

        let hand = hand_stream(100.0, 8.0);
        let eye = eye_stream(60.0, 8.0, 0.0, 0.25);
        let estimate = estimate_time_offset(&hand, &eye, &config.filtering).unwrap();
        assert!((estimate.offset.seconds() - 0.25).abs() <= 0.005 + 1e-9);
        assert_eq!(estimate.resampling_rate_hz, 200.0);

        let pair = align_poses(&hand, &eye, &estimate.offset, &config.alignment).unwrap();
        let times: Vec<f64> = pair.b().times().collect();
        for step in times.windows(2) {
            assert!((step[1] - step[0] - 0.05).abs() < 1e-9);
        }
    }

    #[test]
    fn test_aggregator_summarises_run() {
        let hand = hand_stream(100.0, 6.0);
        let eye = eye_stream(60.0, 6.0, 0.0, 0.1);
        let estimate =
            estimate_time_offset(&hand, &eye, &contracts::FilteringConfig::default()).unwrap();
        let pair = align_poses(&hand, &eye, &estimate.offset, &Default::default()).unwrap();

        let mut stats = observability::AlignmentStatsAggregator::new();
        stats.update_estimate(&estimate);
        stats.update_alignment(&pair, time_alignment::alignment_residual(&pair).ok());
        let summary = stats.summary();
        assert_eq!(summary.estimates, 1);
        assert_eq!(summary.aligned_poses, pair.len() as u64);
        assert!((summary.offset_ms.mean - estimate.offset.seconds() * 1000.0).abs() < 1e-6);
    }
}
