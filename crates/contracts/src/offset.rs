//! Time offset contracts
//!
//! The offset is always tagged with the stream whose clock it shifts. The
//! estimator produces it, the aligner consumes it, and no bare float crosses
//! that boundary.
//!
//! Convention: adding `seconds` to every timestamp of `shifts` expresses that
//! stream on the other stream's clock.

use serde::{Deserialize, Serialize};

use crate::{AlignError, PoseSequence};

/// One of the two pose streams of a calibration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stream {
    /// First stream, hand poses in the body frame (`B_H`)
    A,
    /// Second stream, eye poses in the world frame (`W_E`)
    B,
}

impl Stream {
    pub fn other(self) -> Self {
        match self {
            Stream::A => Stream::B,
            Stream::B => Stream::A,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stream::A => "B_H",
            Stream::B => "W_E",
        }
    }
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stream::A => write!(f, "A ({})", self.label()),
            Stream::B => write!(f, "B ({})", self.label()),
        }
    }
}

/// Clock offset tagged with the stream it is added to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeOffset {
    seconds: f64,
    shifts: Stream,
}

impl TimeOffset {
    /// Offset added to stream A timestamps
    pub fn shifting_a(seconds: f64) -> Self {
        Self {
            seconds,
            shifts: Stream::A,
        }
    }

    /// Offset added to stream B timestamps
    pub fn shifting_b(seconds: f64) -> Self {
        Self {
            seconds,
            shifts: Stream::B,
        }
    }

    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    pub fn shifts(&self) -> Stream {
        self.shifts
    }

    /// The same alignment expressed as a shift of the other stream
    pub fn reversed(&self) -> Self {
        Self {
            seconds: -self.seconds,
            shifts: self.shifts.other(),
        }
    }

    /// Seconds to add to `stream` for this alignment
    pub fn seconds_for(&self, stream: Stream) -> f64 {
        if stream == self.shifts {
            self.seconds
        } else {
            -self.seconds
        }
    }

    /// Apply the offset to the tagged stream, returning `(a, b)`
    ///
    /// The untagged stream is returned unchanged.
    pub fn apply(
        &self,
        a: &PoseSequence,
        b: &PoseSequence,
    ) -> Result<(PoseSequence, PoseSequence), AlignError> {
        match self.shifts {
            Stream::A => Ok((a.shifted(self.seconds)?, b.clone())),
            Stream::B => Ok((a.clone(), b.shifted(self.seconds)?)),
        }
    }
}

impl std::fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+.6} s applied to stream {}", self.seconds, self.shifts)
    }
}

/// Estimator output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetEstimate {
    /// Estimated offset (always tagged `Stream::A` by the estimator)
    pub offset: TimeOffset,
    /// Normalized cross-correlation peak in `[-1, 1]`
    pub confidence: f64,
    /// Winning lag in resampled samples
    pub lag_samples: i64,
    /// Number of samples that overlapped at the winning lag
    pub overlap_samples: usize,
    /// Rate the signals were resampled to
    pub resampling_rate_hz: f64,
}

impl OffsetEstimate {
    /// Resolution of the estimate (one resampling step)
    pub fn resolution_s(&self) -> f64 {
        1.0 / self.resampling_rate_hz
    }
}

/// Two time-aligned sequences with index correspondence
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPosePair {
    a: PoseSequence,
    b: PoseSequence,
}

impl AlignedPosePair {
    /// Pair two sequences sampled on the same grid
    ///
    /// # Errors
    /// `MalformedInput` if lengths or timestamps differ.
    pub fn new(a: PoseSequence, b: PoseSequence) -> Result<Self, AlignError> {
        if a.len() != b.len() {
            return Err(AlignError::malformed(format!(
                "aligned sequences differ in length: {} vs {}",
                a.len(),
                b.len()
            )));
        }
        if a.times().zip(b.times()).any(|(ta, tb)| ta != tb) {
            return Err(AlignError::malformed(
                "aligned sequences must share the same timestamp grid",
            ));
        }
        Ok(Self { a, b })
    }

    pub fn a(&self) -> &PoseSequence {
        &self.a
    }

    pub fn b(&self) -> &PoseSequence {
        &self.b
    }

    pub fn len(&self) -> usize {
        self.a.len()
    }

    /// Always false; an aligned pair holds at least one sample
    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    pub fn time_range(&self) -> (f64, f64) {
        self.a.time_range()
    }

    pub fn into_parts(self) -> (PoseSequence, PoseSequence) {
        (self.a, self.b)
    }
}
