//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。

use contracts::{AlignError, TimeAlignmentConfig};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<TimeAlignmentConfig, AlignError> {
    toml::from_str(content).map_err(|e| AlignError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<TimeAlignmentConfig, AlignError> {
    serde_json::from_str(content).map_err(|e| AlignError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<TimeAlignmentConfig, AlignError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{GridStrategy, Stream};

    #[test]
    fn test_parse_toml_full() {
        let content = r#"
[filtering]
smoothing_window_size = 25
resampling_rate_hz = 200.0
min_correlation_confidence = 0.7
clip_outliers = true
clipping_percentile = 99.0
max_offset_s = 2.0

[alignment.grid]
kind = "reference"
stream = "a"
"#;
        let config = parse_toml(content).unwrap();
        assert_eq!(config.filtering.smoothing_window_size, 25);
        assert_eq!(config.filtering.resampling_rate_hz, 200.0);
        assert_eq!(config.filtering.max_offset_s, Some(2.0));
        assert_eq!(
            config.alignment.grid,
            GridStrategy::Reference { stream: Stream::A }
        );
    }

    #[test]
    fn test_parse_empty_toml_is_default() {
        let config = parse_toml("").unwrap();
        assert_eq!(config, TimeAlignmentConfig::default());
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "filtering": { "smoothing_window_size": 9 },
            "alignment": { "grid": { "kind": "uniform", "rate_hz": 50.0 } }
        }"#;
        let config = parse_json(content).unwrap();
        assert_eq!(config.filtering.smoothing_window_size, 9);
        assert_eq!(config.filtering.resampling_rate_hz, 100.0);
        assert_eq!(config.alignment.grid, GridStrategy::Uniform { rate_hz: 50.0 });
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, AlignError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_unknown_grid_kind() {
        let content = r#"
[alignment.grid]
kind = "nearest"
"#;
        assert!(matches!(
            parse_toml(content),
            Err(AlignError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
