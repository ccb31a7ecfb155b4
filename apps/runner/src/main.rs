mod commands;
mod config;
mod main_lib;

use clap::Parser;
use std::process::ExitCode;

use commands::{execute, Commands};
use config::Config;
use main_lib::{build_state, init_tracing};

/// Straight-line depreciation runs, schedules, and disposals
#[derive(Parser, Debug)]
#[command(name = "deprecio-runner", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database file; overrides DEPRECIO_DB_PATH
    #[arg(long, global = true)]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    init_tracing(config.log_format);

    let state = build_state(&config).await?;
    let output = execute(&state, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    // A failed single-asset run or batch entries that failed still print their report.
    let failed = output.get("status").and_then(|s| s.as_str()) == Some("FAILED")
        || output
            .get("failed")
            .and_then(|f| f.as_u64())
            .is_some_and(|n| n > 0);
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
