//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{GridStrategy, TimeAlignmentConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::error::CliError;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<TimeAlignmentConfig>,
    #[serde(skip)]
    failure: Option<CliError>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let mut result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    match result.failure.take() {
        Some(err) => Err(err).context("Configuration validation failed"),
        None => Ok(()),
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path: config_path.clone(),
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            config: None,
            failure: Some(CliError::config_not_found(config_path.clone())),
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                config: Some(config),
                failure: None,
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            config: None,
            failure: Some(CliError::Alignment(e)),
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &TimeAlignmentConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let filtering = &config.filtering;

    if filtering.min_correlation_confidence == 0.0 {
        warnings.push(
            "min_correlation_confidence is 0 - any correlation peak will be accepted".to_string(),
        );
    }

    // Smoothing longer than one second washes out the motion signature
    let smoothing_s = filtering.smoothing_window_size as f64 / filtering.resampling_rate_hz;
    if smoothing_s > 1.0 {
        warnings.push(format!(
            "smoothing window spans about {smoothing_s:.2} s of signal"
        ));
    }

    if filtering.discard_low_motion
        && filtering.low_motion_threshold_rad_s >= filtering.min_motion_rad_s
    {
        warnings.push(
            "low_motion_threshold_rad_s >= min_motion_rad_s - weak motion will be fully suppressed"
                .to_string(),
        );
    }

    if let GridStrategy::Uniform { rate_hz } = config.alignment.grid {
        if rate_hz > filtering.resampling_rate_hz {
            warnings.push(format!(
                "uniform grid at {rate_hz} Hz is denser than the offset resolution ({} Hz)",
                filtering.resampling_rate_hz
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref config) = result.config {
            let filtering = &config.filtering;
            println!("\n  Smoothing window: {} samples", filtering.smoothing_window_size);
            println!("  Resampling rate: {} Hz", filtering.resampling_rate_hz);
            println!(
                "  Min confidence: {}",
                filtering.min_correlation_confidence
            );
            match filtering.max_offset_s {
                Some(max) => println!("  Max offset: ±{max} s"),
                None => println!("  Max offset: unbounded"),
            }
            println!("  Grid: {:?}", config.alignment.grid);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
