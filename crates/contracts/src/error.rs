//! Layered error definitions
//!
//! Categorized by source: input / signal / alignment / config / io

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum AlignError {
    // ===== Input Errors =====
    /// Pose data violates the sequence preconditions
    #[error("malformed input: {message}")]
    MalformedInput { message: String },

    // ===== Estimation Errors =====
    /// Motion too small or too noisy to estimate an offset
    #[error("insufficient signal: {message}")]
    InsufficientSignal {
        message: String,
        /// Achieved correlation peak, when the failure happened after correlation
        confidence: Option<f64>,
    },

    // ===== Alignment Errors =====
    /// Shifted sequences share no common time support
    #[error("no overlap between stream A [{:.6}, {:.6}] and stream B [{:.6}, {:.6}]", a_range.0, a_range.1, b_range.0, b_range.1)]
    NoOverlap {
        a_range: (f64, f64),
        b_range: (f64, f64),
    },

    /// Query time outside the source range (internal invariant violation)
    #[error("interpolation query t={t:.9} outside source range [{start:.9}, {end:.9}]")]
    InterpolationRange { t: f64, start: f64, end: f64 },

    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AlignError {
    /// Create malformed input error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// Create insufficient signal error without a correlation value
    pub fn insufficient_signal(message: impl Into<String>) -> Self {
        Self::InsufficientSignal {
            message: message.into(),
            confidence: None,
        }
    }

    /// Create insufficient signal error carrying the achieved confidence
    pub fn low_confidence(confidence: f64, required: f64) -> Self {
        Self::InsufficientSignal {
            message: format!(
                "correlation peak {confidence:.4} below required confidence {required:.4}"
            ),
            confidence: Some(confidence),
        }
    }

    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_overlap_message_contains_ranges() {
        let err = AlignError::NoOverlap {
            a_range: (0.0, 1.0),
            b_range: (2.0, 3.0),
        };
        let msg = err.to_string();
        assert!(msg.contains("no overlap"), "got: {msg}");
        assert!(msg.contains("2.000000"), "got: {msg}");
    }

    #[test]
    fn test_low_confidence_carries_value() {
        match AlignError::low_confidence(0.3, 0.5) {
            AlignError::InsufficientSignal { confidence, message } => {
                assert_eq!(confidence, Some(0.3));
                assert!(message.contains("0.3000"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
