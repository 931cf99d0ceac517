//! Normalized cross-correlation of uniformly resampled signals.
//!
//! Lag `L` pairs `a[i]` with `b[i + L]`. Both signals share one sample period,
//! so the time shift that maps `a` onto `b` at lag `L` is
//! `L * period + (b.start - a.start)`.

use contracts::{AlignError, FilteringConfig};
use tracing::{debug, instrument};

use crate::UniformSignal;

/// Variance below this is treated as a flat signal.
const MIN_VARIANCE: f64 = 1e-18;

/// Best lag found by [`correlate`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationPeak {
    /// Winning lag in samples
    pub lag: i64,
    /// Pearson correlation at the winning lag
    pub correlation: f64,
    /// Overlapping samples at the winning lag
    pub overlap: usize,
    /// Seconds to add to `a`'s clock to land on `b`'s
    pub shift_s: f64,
    /// Number of lags that were scored
    pub lags_evaluated: usize,
}

/// Search all admissible lags for the maximum normalized cross-correlation
///
/// A lag is admissible when its overlap reaches
/// `min_overlap_fraction * min(len_a, len_b)` samples (at least 2) and, if
/// `max_offset_s` is set, its shift lies within that bound.
///
/// # Errors
/// - `ConfigValidation` for an invalid configuration or a signal period mismatch
/// - `NoOverlap` when no lag is admissible
/// - `InsufficientSignal` when every admissible overlap is flat
#[instrument(
    name = "time_alignment_correlate",
    level = "debug",
    skip_all,
    fields(len_a = a.len(), len_b = b.len())
)]
pub fn correlate(
    a: &UniformSignal,
    b: &UniformSignal,
    config: &FilteringConfig,
) -> Result<CorrelationPeak, AlignError> {
    config.validate()?;
    if (a.period - b.period).abs() > 1e-12 * a.period.abs().max(1.0) {
        return Err(AlignError::config_validation(
            "resampling_rate_hz",
            format!(
                "signals must share one sample period, got {} and {}",
                a.period, b.period
            ),
        ));
    }

    let na = a.len() as i64;
    let nb = b.len() as i64;
    let period = a.period;
    let origin_shift = b.start - a.start;

    let shorter = na.min(nb) as f64;
    let min_overlap = ((config.min_overlap_fraction * shorter).ceil() as i64).max(2);

    let (mut lag_lo, mut lag_hi) = (-(na - 1), nb - 1);
    if let Some(max_offset) = config.max_offset_s {
        lag_lo = lag_lo.max(((-max_offset - origin_shift) / period).ceil() as i64);
        lag_hi = lag_hi.min(((max_offset - origin_shift) / period).floor() as i64);
    }

    let mut best: Option<CorrelationPeak> = None;
    let mut admissible = 0usize;
    let mut scored = 0usize;

    for lag in lag_lo..=lag_hi {
        let start = 0i64.max(-lag);
        let end = na.min(nb - lag);
        let overlap = end - start;
        if overlap < min_overlap {
            continue;
        }
        admissible += 1;

        let xs = &a.values[start as usize..end as usize];
        let ys = &b.values[(start + lag) as usize..(end + lag) as usize];
        let Some(r) = pearson(xs, ys) else {
            continue;
        };
        scored += 1;

        let better = match best {
            None => true,
            Some(ref current) => {
                r > current.correlation
                    || (r == current.correlation && lag.abs() < current.lag.abs())
            }
        };
        if better {
            best = Some(CorrelationPeak {
                lag,
                correlation: r,
                overlap: overlap as usize,
                shift_s: lag as f64 * period + origin_shift,
                lags_evaluated: 0,
            });
        }
    }

    if admissible == 0 {
        return Err(AlignError::NoOverlap {
            a_range: (a.start, a.end()),
            b_range: (b.start, b.end()),
        });
    }

    let mut peak = best.ok_or_else(|| {
        AlignError::insufficient_signal(
            "angular-rate signals are flat over every admissible overlap",
        )
    })?;
    peak.lags_evaluated = scored;

    debug!(
        lag = peak.lag,
        correlation = peak.correlation,
        overlap = peak.overlap,
        shift_s = peak.shift_s,
        lags_evaluated = scored,
        "correlation peak located"
    );

    Ok(peak)
}

/// Pearson correlation; `None` if either side is flat
fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx / n < MIN_VARIANCE || syy / n < MIN_VARIANCE {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}
