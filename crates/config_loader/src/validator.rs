//! 配置校验模块
//!
//! 校验规则：
//! - resampling_rate_hz > 0
//! - smoothing_window_size >= 1
//! - min_correlation_confidence ∈ [0, 1]
//! - clipping_percentile ∈ (0, 100]
//! - 阈值非负，min_overlap_fraction ∈ (0, 1]
//! - max_offset_s > 0（若设置）
//! - 均匀网格 rate_hz > 0

use contracts::{AlignError, AlignmentConfig, FilteringConfig, TimeAlignmentConfig};

/// 校验 TimeAlignmentConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。规则定义在 contracts 中，核心算法在运行前执行同一套校验。
pub fn validate(config: &TimeAlignmentConfig) -> Result<(), AlignError> {
    validate_filtering(&config.filtering)?;
    validate_alignment(&config.alignment)?;
    Ok(())
}

/// 校验估计器配置
pub fn validate_filtering(filtering: &FilteringConfig) -> Result<(), AlignError> {
    filtering.validate()
}

/// 校验对齐器配置
pub fn validate_alignment(alignment: &AlignmentConfig) -> Result<(), AlignError> {
    alignment.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::GridStrategy;

    fn field_of(err: AlignError) -> String {
        match err {
            AlignError::ConfigValidation { field, .. } => field,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&TimeAlignmentConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_resampling_rate() {
        let mut config = TimeAlignmentConfig::default();
        config.filtering.resampling_rate_hz = -5.0;
        let err = validate(&config).unwrap_err();
        assert_eq!(field_of(err), "filtering.resampling_rate_hz");
    }

    #[test]
    fn test_zero_smoothing_window() {
        let mut config = TimeAlignmentConfig::default();
        config.filtering.smoothing_window_size = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("smoothing_window_size"), "got: {err}");
    }

    #[test]
    fn test_confidence_out_of_range() {
        let mut config = TimeAlignmentConfig::default();
        config.filtering.min_correlation_confidence = 1.5;
        let err = validate(&config).unwrap_err();
        assert_eq!(field_of(err), "filtering.min_correlation_confidence");
    }

    #[test]
    fn test_nan_confidence_rejected() {
        let mut config = TimeAlignmentConfig::default();
        config.filtering.min_correlation_confidence = f64::NAN;
        let err = validate(&config).unwrap_err();
        assert_eq!(field_of(err), "filtering.min_correlation_confidence");
    }

    #[test]
    fn test_clipping_percentile_bounds() {
        let mut config = TimeAlignmentConfig::default();
        config.filtering.clipping_percentile = 0.0;
        assert!(validate(&config).is_err());
        config.filtering.clipping_percentile = 100.0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_overlap_fraction_bounds() {
        let mut config = TimeAlignmentConfig::default();
        config.filtering.min_overlap_fraction = 0.0;
        let err = validate(&config).unwrap_err();
        assert_eq!(field_of(err), "filtering.min_overlap_fraction");
    }

    #[test]
    fn test_negative_max_offset() {
        let mut config = TimeAlignmentConfig::default();
        config.filtering.max_offset_s = Some(-1.0);
        let err = validate(&config).unwrap_err();
        assert_eq!(field_of(err), "filtering.max_offset_s");
    }

    #[test]
    fn test_uniform_grid_rate() {
        let mut config = TimeAlignmentConfig::default();
        config.alignment.grid = GridStrategy::Uniform { rate_hz: 0.0 };
        let err = validate(&config).unwrap_err();
        assert_eq!(field_of(err), "alignment.grid.rate_hz");
    }
}
