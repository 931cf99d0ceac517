//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `TimeAlignmentConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("alignment.toml")).unwrap();
//! println!("Resampling at {} Hz", config.filtering.resampling_rate_hz);
//! ```

mod parser;
mod validator;

pub use contracts::TimeAlignmentConfig;
pub use parser::ConfigFormat;
pub use validator::{validate, validate_alignment, validate_filtering};

use contracts::AlignError;
use std::path::Path;

/// Loads `TimeAlignmentConfig` from TOML/JSON and rejects invalid values
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a config file; the format follows the extension
    ///
    /// # Errors
    /// `ConfigParse` for an unknown extension or bad syntax, `Io` when the file
    /// cannot be read, `ConfigValidation` for out-of-range values.
    pub fn load_from_path(path: &Path) -> Result<TimeAlignmentConfig, AlignError> {
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ConfigFormat::from_extension)
            .ok_or_else(|| {
                AlignError::config_parse(format!(
                    "unsupported config format: {} (expected .toml or .json)",
                    path.display()
                ))
            })?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Parse and validate config content
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<TimeAlignmentConfig, AlignError> {
        let config = parser::parse(content, format)?;
        validate(&config)?;
        Ok(config)
    }

    pub fn to_toml(config: &TimeAlignmentConfig) -> Result<String, AlignError> {
        toml::to_string_pretty(config)
            .map_err(|e| AlignError::config_parse(format!("TOML serialize error: {e}")))
    }

    pub fn to_json(config: &TimeAlignmentConfig) -> Result<String, AlignError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| AlignError::config_parse(format!("JSON serialize error: {e}")))
    }
}
