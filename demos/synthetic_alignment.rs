//! Synthetic Alignment Example
//!
//! Generates a hand stream at 100 Hz and an eye stream at 60 Hz that sees the
//! same motion 0.37 s later, estimates the offset, aligns both streams and
//! writes the four CSV files into an output directory.
//!
//! Run with: cargo run --bin synthetic_alignment [config.toml] [output_dir]

use std::path::{Path, PathBuf};

use config_loader::ConfigLoader;
use contracts::{AlignError, PoseSequence, Quaternion, TimeAlignmentConfig, TimedPose, Vector3};
use time_alignment::{align_poses, alignment_residual, estimate_time_offset};

const DELAY_S: f64 = 0.37;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Synthetic Alignment Demo");

    // ==== Stage 1: Use default config or load from file ====
    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(path = %path, "Loading alignment config");
            ConfigLoader::load_from_path(Path::new(&path))?
        }
        None => TimeAlignmentConfig::default(),
    };
    let output_dir = std::env::args()
        .nth(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./output"));
    std::fs::create_dir_all(&output_dir)?;

    // ==== Stage 2: Generate and store input streams ====
    let poses_b_h = generate(100.0, 10.0, 0.0)?;
    let poses_w_e = generate(60.0, 10.0, DELAY_S)?;
    pose_io::write_poses(&output_dir.join("poses_B_H.csv"), &poses_b_h)?;
    pose_io::write_poses(&output_dir.join("poses_W_E.csv"), &poses_w_e)?;
    tracing::info!(
        b_h = poses_b_h.len(),
        w_e = poses_w_e.len(),
        "Synthetic streams generated"
    );

    // ==== Stage 3: Estimate ====
    let estimate = estimate_time_offset(&poses_b_h, &poses_w_e, &config.filtering)?;
    tracing::info!(
        offset = %estimate.offset,
        confidence = estimate.confidence,
        error_s = estimate.offset.seconds() - DELAY_S,
        "Offset estimated"
    );

    // ==== Stage 4: Align and write ====
    let pair = align_poses(&poses_b_h, &poses_w_e, &estimate.offset, &config.alignment)?;
    let residual = alignment_residual(&pair)?;
    let (aligned_b_h, aligned_w_e) = pair.into_parts();
    pose_io::write_poses(&output_dir.join("aligned_poses_B_H.csv"), &aligned_b_h)?;
    pose_io::write_poses(&output_dir.join("aligned_poses_W_E.csv"), &aligned_w_e)?;

    tracing::info!(
        samples = aligned_b_h.len(),
        residual_rad_s = residual,
        output = %output_dir.display(),
        "Demo completed"
    );
    Ok(())
}

/// Pose stream sampled at `rate_hz` that shows the motion `delay` seconds late
fn generate(rate_hz: f64, duration: f64, delay: f64) -> Result<PoseSequence, AlignError> {
    let n = (duration * rate_hz).round() as usize + 1;
    let poses = (0..n)
        .map(|i| {
            let t = i as f64 / rate_hz;
            let s = t - delay;
            let yaw = 0.9 * (1.3 * s).sin() + 0.4 * (3.1 * s + 0.5).sin();
            let pitch = 0.5 * (0.7 * s).sin() * (2.3 * s).cos();
            let orientation = Quaternion::from_axis_angle(Vector3::z(), yaw)
                * Quaternion::from_axis_angle(Vector3::y(), pitch);
            TimedPose::new(t, Vector3::new(s.sin(), s.cos(), 0.1 * s), orientation)
        })
        .collect::<Result<Vec<_>, _>>()?;
    PoseSequence::new(poses)
}
