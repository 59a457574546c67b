// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! stepline - Sequential Command Pipelines

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stepline::cli::Cli;

#[tokio::main]
async fn main() {
    // Usage errors follow the same contract as run failures: stdout, exit 1
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            println!("{}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    let default_filter = if cli.verbose {
        "stepline=debug"
    } else {
        "stepline=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if !stepline::utils::should_use_colors() {
        colored::control::set_override(false);
    }

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        if let Err(e) = std::env::set_current_dir(dir) {
            println!("Failed to change to directory '{}': {}", dir.display(), e);
            std::process::exit(1);
        }
    }

    // Failures are reported on stdout
    if let Err(report) = stepline::cli::run::run(cli).await {
        println!("{:?}", report);
        std::process::exit(1);
    }
}
