// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Run command - resolve and execute the pipeline

use miette::{Result, WrapErr};

use super::{Cli, PlanFormat};
use crate::errors::SteplineError;
use crate::parsers::ParserOptions;
use crate::pipeline::{load_pipeline, ExecutionOptions, PipelineExecutor, StepRegistry};
use crate::runner::SystemRunner;
use crate::template::Environment;
use crate::utils::{print_info, print_warning};

/// Run the pipeline named on the command line
pub async fn run(cli: Cli) -> Result<()> {
    let path = &cli.pipeline;

    let source = std::fs::read_to_string(path).map_err(|e| SteplineError::FileReadError {
        path: path.clone(),
        error: e.to_string(),
    })?;

    let registry = StepRegistry::with_builtins(&ParserOptions {
        container_runtime: cli.container_runtime.clone(),
    });
    let env = Environment::capture();

    let pipeline = load_pipeline(&source, &env, &registry)
        .wrap_err_with(|| format!("Failed to load pipeline file {}", path.display()))?;

    if cli.dry_run && cli.format == PlanFormat::Json {
        let json = serde_json::to_string_pretty(&pipeline).map_err(SteplineError::from)?;
        println!("{}", json);
        return Ok(());
    }

    if pipeline.is_empty() {
        print_warning(&format!("{} has no steps", path.display()));
        return Ok(());
    }

    tracing::debug!(steps = ?pipeline.step_names(), "resolved pipeline");
    print_info(&format!("Loaded {} from {}", pluralize(pipeline.len()), path.display()));

    let options = ExecutionOptions {
        dry_run: cli.dry_run,
        verbose: cli.verbose,
    };

    let executor = PipelineExecutor::new(Box::new(SystemRunner::new()));
    let report = executor.execute(&pipeline, &options).await?;

    if !cli.dry_run && report.skipped() > 0 {
        print_info(&format!(
            "{} ran, {} skipped",
            pluralize(report.ran()),
            pluralize(report.skipped())
        ));
    }

    Ok(())
}

fn pluralize(count: usize) -> String {
    format!("{} step{}", count, if count == 1 { "" } else { "s" })
}
