//! 时间对齐指标收集模块
//!
//! CLI 层在每次估计/对齐后调用，核心库自身记录 `time_alignment_*` 指标。

use std::collections::HashMap;

use contracts::{AlignError, AlignedPosePair, OffsetEstimate, PoseSequence, Stream};
use metrics::{counter, gauge, histogram};

/// 记录输入位姿流
pub fn record_input(stream: Stream, poses: &PoseSequence) {
    gauge!("pose_align_input_poses", "stream" => stream.label()).set(poses.len() as f64);
    if let Some(period) = poses.mean_period() {
        gauge!("pose_align_input_rate_hz", "stream" => stream.label()).set(1.0 / period);
    }
}

/// 记录一次成功的偏移估计
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_estimate;
///
/// let estimate = estimate_time_offset(&a, &b, &config.filtering)?;
/// record_estimate(&estimate);
/// ```
pub fn record_estimate(estimate: &OffsetEstimate) {
    counter!("pose_align_estimates_total", "status" => "ok").increment(1);

    // 偏移 (秒 -> 毫秒)
    let offset_ms = estimate.offset.seconds_for(Stream::A) * 1000.0;
    gauge!("pose_align_offset_ms").set(offset_ms);
    histogram!("pose_align_offset_ms_hist").record(offset_ms.abs());

    gauge!("pose_align_confidence").set(estimate.confidence);
    histogram!("pose_align_overlap_samples").record(estimate.overlap_samples as f64);
}

/// 记录一次失败，按错误类别打标签
pub fn record_failure(stage: &'static str, err: &AlignError) {
    counter!(
        "pose_align_failures_total",
        "stage" => stage,
        "kind" => error_kind(err)
    )
    .increment(1);
}

/// 记录一次对齐输出
pub fn record_alignment(pair: &AlignedPosePair, residual: Option<f64>) {
    counter!("pose_align_alignments_total").increment(1);
    gauge!("pose_align_output_poses").set(pair.len() as f64);

    let (start, end) = pair.time_range();
    gauge!("pose_align_overlap_s").set(end - start);

    if let Some(residual) = residual {
        histogram!("pose_align_residual_rad_s").record(residual);
    }
}

fn error_kind(err: &AlignError) -> &'static str {
    match err {
        AlignError::MalformedInput { .. } => "malformed_input",
        AlignError::InsufficientSignal { .. } => "insufficient_signal",
        AlignError::NoOverlap { .. } => "no_overlap",
        AlignError::InterpolationRange { .. } => "interpolation_range",
        AlignError::ConfigParse { .. } | AlignError::ConfigValidation { .. } => "config",
        AlignError::Io(_) => "io",
    }
}

/// 对齐指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct AlignmentStatsAggregator {
    /// 成功估计次数
    pub estimates: u64,

    /// 对齐次数
    pub alignments: u64,

    /// 输出位姿总数
    pub aligned_poses: u64,

    /// 偏移统计 (毫秒，相对流 A)
    pub offset_stats: RunningStats,

    /// 相关峰值统计
    pub confidence_stats: RunningStats,

    /// 重叠时长统计 (秒)
    pub overlap_stats: RunningStats,

    /// 残差统计 (rad/s)
    pub residual_stats: RunningStats,

    /// 各类错误次数
    pub failures: HashMap<&'static str, u64>,
}

impl AlignmentStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 累加一次估计
    pub fn update_estimate(&mut self, estimate: &OffsetEstimate) {
        self.estimates += 1;
        self.offset_stats
            .push(estimate.offset.seconds_for(Stream::A) * 1000.0);
        self.confidence_stats.push(estimate.confidence);
    }

    /// 累加一次对齐
    pub fn update_alignment(&mut self, pair: &AlignedPosePair, residual: Option<f64>) {
        self.alignments += 1;
        self.aligned_poses += pair.len() as u64;
        let (start, end) = pair.time_range();
        self.overlap_stats.push(end - start);
        if let Some(residual) = residual {
            self.residual_stats.push(residual);
        }
    }

    /// 累加一次失败
    pub fn update_failure(&mut self, err: &AlignError) {
        *self.failures.entry(error_kind(err)).or_insert(0) += 1;
    }

    /// 生成摘要报告
    pub fn summary(&self) -> AlignmentSummary {
        AlignmentSummary {
            estimates: self.estimates,
            alignments: self.alignments,
            aligned_poses: self.aligned_poses,
            offset_ms: StatsSummary::from(&self.offset_stats),
            confidence: StatsSummary::from(&self.confidence_stats),
            overlap_s: StatsSummary::from(&self.overlap_stats),
            residual_rad_s: StatsSummary::from(&self.residual_stats),
            failures: self.failures.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct AlignmentSummary {
    pub estimates: u64,
    pub alignments: u64,
    pub aligned_poses: u64,
    pub offset_ms: StatsSummary,
    pub confidence: StatsSummary,
    pub overlap_s: StatsSummary,
    pub residual_rad_s: StatsSummary,
    pub failures: HashMap<&'static str, u64>,
}

impl std::fmt::Display for AlignmentSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Alignment Summary ===")?;
        writeln!(f, "Estimates: {}", self.estimates)?;
        writeln!(f, "Offset (ms, stream A): {}", self.offset_ms)?;
        writeln!(f, "Confidence: {}", self.confidence)?;
        writeln!(
            f,
            "Alignments: {} ({} aligned poses per stream)",
            self.alignments, self.aligned_poses
        )?;
        writeln!(f, "Overlap (s): {}", self.overlap_s)?;
        writeln!(f, "Residual (rad/s): {}", self.residual_rad_s)?;

        if !self.failures.is_empty() {
            let mut failures: Vec<_> = self.failures.iter().collect();
            failures.sort();
            writeln!(f, "Failures:")?;
            for (kind, count) in failures {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.count {
            0 => write!(f, "N/A"),
            1 => write!(f, "{:.6}", self.mean),
            n => write!(
                f,
                "min={:.6}, max={:.6}, mean={:.6}, std={:.6} (n={})",
                self.min, self.max, self.mean, self.std_dev, n
            ),
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
