//! Angular-rate signal derivation, filtering and resampling.

use contracts::{AlignError, PoseSequence};

/// Angular speed samples derived from consecutive orientations
///
/// Sample `k` covers poses `k` and `k + 1` and is stamped at their midpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct AngularRateSignal {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl AngularRateSignal {
    /// Derive the signal from a pose sequence
    ///
    /// # Errors
    /// `MalformedInput` if the sequence holds fewer than two poses.
    pub fn from_poses(poses: &PoseSequence) -> Result<Self, AlignError> {
        if poses.len() < 2 {
            return Err(AlignError::malformed(format!(
                "at least 2 poses are required to derive angular rate, got {}",
                poses.len()
            )));
        }

        let (times, values) = poses
            .poses()
            .windows(2)
            .map(|pair| {
                let dt = pair[1].t() - pair[0].t();
                let angle = pair[0].orientation().angle_to(pair[1].orientation());
                (0.5 * (pair[0].t() + pair[1].t()), angle / dt)
            })
            .unzip();

        Ok(Self { times, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Largest angular speed in the signal (rad/s)
    pub fn peak(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Clip values above the given percentile
    pub fn clip_to_percentile(&mut self, percentile: f64) {
        if let Some(limit) = percentile_of(&self.values, percentile) {
            for v in &mut self.values {
                *v = v.min(limit);
            }
        }
    }

    /// Zero out samples below `threshold`, keeping the sample grid
    ///
    /// Returns how many samples were suppressed.
    pub fn suppress_below(&mut self, threshold: f64) -> usize {
        let mut suppressed = 0;
        for v in &mut self.values {
            if *v < threshold {
                *v = 0.0;
                suppressed += 1;
            }
        }
        suppressed
    }

    /// Centered moving average over `window` samples
    pub fn smooth(&mut self, window: usize) {
        self.values = moving_average(&self.values, window);
    }

    /// Linearly resample onto `start + k / rate_hz` covering the signal span
    ///
    /// # Errors
    /// `InsufficientSignal` if fewer than two grid samples fit.
    pub fn resample(&self, rate_hz: f64) -> Result<UniformSignal, AlignError> {
        let period = 1.0 / rate_hz;
        let start = self.times[0];
        let span = self.times[self.times.len() - 1] - start;
        let count = (span / period + 1e-9).floor() as usize + 1;
        if count < 2 {
            return Err(AlignError::insufficient_signal(format!(
                "signal spans {span:.6} s, too short to resample at {rate_hz} Hz"
            )));
        }

        let mut values = Vec::with_capacity(count);
        let mut idx = 0usize;
        for k in 0..count {
            let t = start + k as f64 * period;
            while idx + 2 < self.times.len() && self.times[idx + 1] < t {
                idx += 1;
            }
            values.push(lerp_at(&self.times, &self.values, idx, t));
        }

        Ok(UniformSignal {
            start,
            period,
            values,
        })
    }
}

/// Uniformly sampled scalar signal
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSignal {
    /// Time of the first sample
    pub start: f64,
    /// Sample spacing (seconds)
    pub period: f64,
    pub values: Vec<f64>,
}

impl UniformSignal {
    pub fn new(start: f64, period: f64, values: Vec<f64>) -> Self {
        Self {
            start,
            period,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn end(&self) -> f64 {
        self.start + (self.values.len().saturating_sub(1)) as f64 * self.period
    }
}

/// Linear interpolation between samples `idx` and `idx + 1`, clamped to that span.
fn lerp_at(times: &[f64], values: &[f64], idx: usize, t: f64) -> f64 {
    if times.len() == 1 {
        return values[0];
    }
    let (t0, t1) = (times[idx], times[idx + 1]);
    let f = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
    values[idx] + (values[idx + 1] - values[idx]) * f
}

/// Percentile with linear interpolation between closest ranks
fn percentile_of(values: &[f64], percentile: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (percentile.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let f = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * f)
}

/// Centered moving average; the window shrinks at the edges
fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    if window == 1 || values.is_empty() {
        return values.to_vec();
    }

    let mut prefix = Vec::with_capacity(values.len() + 1);
    prefix.push(0.0);
    for v in values {
        prefix.push(prefix[prefix.len() - 1] + v);
    }

    let left = (window - 1) / 2;
    let right = window / 2;
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(left);
            let hi = (i + right + 1).min(values.len());
            (prefix[hi] - prefix[lo]) / (hi - lo) as f64
        })
        .collect()
}
