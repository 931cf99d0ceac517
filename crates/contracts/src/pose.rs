//! Timestamped poses and pose sequences
//!
//! A `PoseSequence` is validated once on construction and never mutated:
//! timestamps are finite and strictly increasing, orientations are unit norm.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{AlignError, Quaternion};

/// External 8-field pose record
///
/// `timestamp [s], x [m], y [m], z [m], qx, qy, qz, qw`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseRecord {
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub qx: f64,
    pub qy: f64,
    pub qz: f64,
    pub qw: f64,
}

impl PoseRecord {
    /// Number of fields in one record
    pub const FIELD_COUNT: usize = 8;

    /// Build a record from a field slice in record order
    ///
    /// # Errors
    /// `MalformedInput` when the slice does not hold exactly 8 values.
    pub fn from_fields(fields: &[f64]) -> Result<Self, AlignError> {
        match fields {
            &[timestamp, x, y, z, qx, qy, qz, qw] => Ok(Self {
                timestamp,
                x,
                y,
                z,
                qx,
                qy,
                qz,
                qw,
            }),
            _ => Err(AlignError::malformed(format!(
                "expected {} fields per pose record, got {}",
                Self::FIELD_COUNT,
                fields.len()
            ))),
        }
    }

    pub fn to_fields(&self) -> [f64; 8] {
        [
            self.timestamp,
            self.x,
            self.y,
            self.z,
            self.qx,
            self.qy,
            self.qz,
            self.qw,
        ]
    }
}

/// Pose at an instant: position plus unit orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedPose {
    t: f64,
    position: Vector3<f64>,
    orientation: Quaternion,
}

impl TimedPose {
    /// Create a pose, normalizing the orientation
    ///
    /// # Errors
    /// `MalformedInput` for a non-finite timestamp/position or a quaternion
    /// that cannot be normalized.
    pub fn new(t: f64, position: Vector3<f64>, orientation: Quaternion) -> Result<Self, AlignError> {
        if !t.is_finite() {
            return Err(AlignError::malformed(format!("non-finite timestamp {t}")));
        }
        if position.iter().any(|c| !c.is_finite()) {
            return Err(AlignError::malformed(format!(
                "non-finite position at t={t}"
            )));
        }
        let orientation = orientation.normalized()?;
        Ok(Self {
            t,
            position,
            orientation,
        })
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }

    pub fn orientation(&self) -> &Quaternion {
        &self.orientation
    }

    /// Same pose at a different timestamp
    pub fn with_time(&self, t: f64) -> Self {
        Self { t, ..*self }
    }

    pub fn to_record(&self) -> PoseRecord {
        PoseRecord {
            timestamp: self.t,
            x: self.position.x,
            y: self.position.y,
            z: self.position.z,
            qx: self.orientation.x,
            qy: self.orientation.y,
            qz: self.orientation.z,
            qw: self.orientation.w,
        }
    }
}

impl TryFrom<PoseRecord> for TimedPose {
    type Error = AlignError;

    fn try_from(record: PoseRecord) -> Result<Self, Self::Error> {
        TimedPose::new(
            record.timestamp,
            Vector3::new(record.x, record.y, record.z),
            Quaternion::new(record.qx, record.qy, record.qz, record.qw),
        )
    }
}

/// Ordered, immutable sequence of poses with strictly increasing timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSequence {
    poses: Vec<TimedPose>,
}

impl PoseSequence {
    /// Validate and wrap a pose vector
    ///
    /// # Errors
    /// `MalformedInput` if the vector is empty or timestamps are not strictly
    /// increasing.
    pub fn new(poses: Vec<TimedPose>) -> Result<Self, AlignError> {
        if poses.is_empty() {
            return Err(AlignError::malformed("pose sequence is empty"));
        }
        if let Some(idx) = poses.windows(2).position(|w| w[1].t <= w[0].t) {
            return Err(AlignError::malformed(format!(
                "timestamps must be strictly increasing: index {} has t={} after t={}",
                idx + 1,
                poses[idx + 1].t,
                poses[idx].t
            )));
        }
        Ok(Self { poses })
    }

    /// Ingest external records, normalizing every orientation
    pub fn from_records(records: &[PoseRecord]) -> Result<Self, AlignError> {
        let poses = records
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                TimedPose::try_from(*record).map_err(|e| match e {
                    AlignError::MalformedInput { message } => {
                        AlignError::malformed(format!("record {idx}: {message}"))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(poses)
    }

    pub fn to_records(&self) -> Vec<PoseRecord> {
        self.poses.iter().map(TimedPose::to_record).collect()
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn poses(&self) -> &[TimedPose] {
        &self.poses
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.poses.iter().map(|p| p.t)
    }

    pub fn orientations(&self) -> impl Iterator<Item = &Quaternion> + '_ {
        self.poses.iter().map(|p| &p.orientation)
    }

    pub fn start_time(&self) -> f64 {
        self.poses[0].t
    }

    pub fn end_time(&self) -> f64 {
        self.poses[self.poses.len() - 1].t
    }

    pub fn time_range(&self) -> (f64, f64) {
        (self.start_time(), self.end_time())
    }

    pub fn duration(&self) -> f64 {
        self.end_time() - self.start_time()
    }

    /// Mean sampling period; `None` for a single pose
    pub fn mean_period(&self) -> Option<f64> {
        if self.poses.len() < 2 {
            return None;
        }
        Some(self.duration() / (self.poses.len() - 1) as f64)
    }

    /// Copy with `seconds` added to every timestamp
    ///
    /// # Errors
    /// `MalformedInput` if the shift is not finite or collapses neighbouring
    /// timestamps through floating-point rounding.
    pub fn shifted(&self, seconds: f64) -> Result<Self, AlignError> {
        if !seconds.is_finite() {
            return Err(AlignError::malformed(format!(
                "time shift must be finite, got {seconds}"
            )));
        }
        if seconds == 0.0 {
            return Ok(self.clone());
        }
        Self::new(
            self.poses
                .iter()
                .map(|p| p.with_time(p.t + seconds))
                .collect(),
        )
    }
}
