//! # Pose Align CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载、覆盖与验证
//! - 位姿 CSV 读取、时间偏移估计与对齐输出
//! - 失败时按错误类别返回退出码

mod cli;
mod commands;
mod error;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_align, run_estimate, run_validate};

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Pose Align CLI starting"
    );

    if let Err(e) = run(&cli) {
        tracing::error!(error = %format!("{e:#}"), "Command failed");
        eprintln!("Error: {e:#}");
        std::process::exit(error::exit_code_of(&e));
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Align(args) => run_align(args),
        Commands::Estimate(args) => run_estimate(args),
        Commands::Validate(args) => run_validate(args),
    }
}

/// Initialize logging based on CLI options
///
/// `RUST_LOG` takes precedence over `-v` / `-q`.
fn init_logging(cli: &Cli) -> Result<()> {
    observability::init_with_config(ObservabilityConfig::for_verbosity(
        cli.log_format.into(),
        cli.verbose,
        cli.quiet,
    ))
}
