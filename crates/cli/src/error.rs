//! Error types for CLI operations.

use contracts::AlignError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Input pose file not found
    #[error("Pose file not found: {path}")]
    InputNotFound { path: String },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Command-line arguments that cannot be combined or applied
    #[error("Invalid argument {argument}: {message}")]
    InvalidArgument { argument: String, message: String },

    /// Estimation or alignment failure
    #[error(transparent)]
    Alignment(#[from] AlignError),
}

impl CliError {
    pub fn input_not_found(path: impl Into<String>) -> Self {
        Self::InputNotFound { path: path.into() }
    }

    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InputNotFound { .. } | Self::ConfigNotFound { .. } => 3,
            Self::InvalidArgument { .. } => 2,
            Self::Alignment(err) => align_exit_code(err),
        }
    }
}

fn align_exit_code(err: &AlignError) -> i32 {
    match err {
        AlignError::ConfigParse { .. } | AlignError::ConfigValidation { .. } => 2,
        AlignError::InsufficientSignal { .. } | AlignError::NoOverlap { .. } => 4,
        _ => 1,
    }
}

/// Exit code for any command error
///
/// Walks the `anyhow` chain for the first `CliError` or `AlignError`.
pub fn exit_code_of(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(cli) = cause.downcast_ref::<CliError>() {
            return cli.exit_code();
        }
        if let Some(align) = cause.downcast_ref::<AlignError>() {
            return align_exit_code(align);
        }
    }
    1
}
