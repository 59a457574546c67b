// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! CLI definition and handlers
//!
//! Defines the command-line interface for stepline.

pub mod run;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::parsers::DEFAULT_CONTAINER_RUNTIME;

/// Sequential command pipeline runner
///
/// Renders a templated pipeline file against the environment and runs its
/// steps in order.
#[derive(Parser, Debug)]
#[clap(
    name = "stepline",
    version,
    about = "Run a templated YAML pipeline of commands and container steps",
    long_about = None,
    after_help = "Examples:\n\
        stepline pipeline.yaml                 Run the pipeline\n\
        stepline --dry-run pipeline.yaml       Show the resolved steps\n\
        stepline -v pipeline.yaml              Run with debug logging"
)]
pub struct Cli {
    /// Pipeline file
    #[clap(value_name = "PIPELINE")]
    pub pipeline: PathBuf,

    /// Enable verbose output
    #[clap(short, long)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Resolve the pipeline and show the plan without running anything
    #[clap(long)]
    pub dry_run: bool,

    /// Plan format for --dry-run
    #[clap(
        short,
        long,
        value_enum,
        default_value_t = PlanFormat::Text,
        requires = "dry_run"
    )]
    pub format: PlanFormat,

    /// Binary used to run docker steps
    #[clap(
        long,
        env = "STEPLINE_CONTAINER_RUNTIME",
        default_value = DEFAULT_CONTAINER_RUNTIME,
        value_name = "BIN"
    )]
    pub container_runtime: String,
}

/// Output format for the dry-run plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "stepline",
            "--dry-run",
            "--format",
            "json",
            "--container-runtime",
            "podman",
            "ci.yaml",
        ]);

        assert!(cli.dry_run);
        assert_eq!(cli.format, PlanFormat::Json);
        assert_eq!(cli.container_runtime, "podman");
        assert_eq!(cli.pipeline, PathBuf::from("ci.yaml"));
    }

    #[test]
    fn test_format_requires_dry_run() {
        let err = Cli::try_parse_from(["stepline", "--format", "json", "ci.yaml"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from(["stepline", "ci.yaml"]).unwrap();
        assert_eq!(cli.format, PlanFormat::Text);
    }

    #[test]
    fn test_pipeline_is_required() {
        assert!(Cli::try_parse_from(["stepline"]).is_err());
    }
}
