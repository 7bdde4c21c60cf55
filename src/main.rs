//! eegan CLI
//!
//! # Usage
//!
//! ```bash
//! # Validate config
//! eegan validate gan.yaml --detailed
//!
//! # Show config info
//! eegan info gan.yaml --format json
//!
//! # Train the reference networks on synthetic data
//! eegan demo gan.yaml --epochs 2 --telemetry scalars.jsonl
//! ```

use clap::Parser;
use eegan::cli::{init_tracing, run_command, Cli, LogLevel};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(LogLevel::from_flags(cli.verbose, cli.quiet));

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
