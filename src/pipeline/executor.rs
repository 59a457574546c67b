// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Pipeline executor
//!
//! Runs resolved steps one at a time in declared order. The first failing
//! step stops the run; steps that already ran are left as they are.

use std::time::{Duration, Instant};

use colored::Colorize;

use crate::errors::{SteplineError, SteplineResult};
use crate::pipeline::{check_conditions, Pipeline, Step, UnmetCondition};
use crate::runner::{Invocation, ProcessRunner, RunOutcome};

/// Pipeline execution options
#[derive(Debug, Clone, Default)]
pub struct ExecutionOptions {
    /// Only show what would be done
    pub dry_run: bool,
    /// Verbose output
    pub verbose: bool,
}

/// What happened to a single step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step's command ran and exited successfully
    Ran(RunOutcome),
    /// A condition was not met
    Skipped(UnmetCondition),
}

impl StepOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

/// Result of a successful pipeline run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Outcome for each step, in execution order
    pub results: Vec<(String, StepOutcome)>,
    /// Total execution time
    pub duration: Duration,
}

impl RunReport {
    pub fn ran(&self) -> usize {
        self.results.iter().filter(|(_, o)| !o.is_skipped()).count()
    }

    pub fn skipped(&self) -> usize {
        self.results.iter().filter(|(_, o)| o.is_skipped()).count()
    }
}

/// Runs a single step through a process runner
pub struct StepExecutor<'r> {
    runner: &'r dyn ProcessRunner,
}

impl<'r> StepExecutor<'r> {
    pub fn new(runner: &'r dyn ProcessRunner) -> Self {
        Self { runner }
    }

    /// Check conditions and, if they hold, run the step
    ///
    /// A skipped step is not an error.
    pub async fn execute(&self, step: &Step) -> SteplineResult<StepOutcome> {
        if let Err(unmet) = check_conditions(step) {
            tracing::info!(step = %step.name, reason = %unmet, "skipping step");
            return Ok(StepOutcome::Skipped(unmet));
        }

        let invocation = Invocation::from_step(step);
        tracing::debug!(
            step = %step.name,
            command = %step.command_line(),
            env = ?invocation.env_lines(),
            "running step"
        );

        let outcome = self.runner.run(&invocation).await.map_err(|e| {
            tracing::error!(step = %step.name, error = %e, "step could not start");
            SteplineError::step_spawn_failed(&step.name, &step.command, &e.to_string())
        })?;

        if !outcome.is_success() {
            tracing::error!(step = %step.name, exit_code = ?outcome.exit_code, "step failed");
            return Err(SteplineError::step_exited(
                &step.name,
                &step.command,
                outcome.exit_code,
            ));
        }

        Ok(StepOutcome::Ran(outcome))
    }
}

/// Pipeline executor
pub struct PipelineExecutor {
    runner: Box<dyn ProcessRunner>,
}

impl PipelineExecutor {
    /// Create a new pipeline executor
    pub fn new(runner: Box<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Execute a pipeline
    pub async fn execute(
        &self,
        pipeline: &Pipeline,
        options: &ExecutionOptions,
    ) -> SteplineResult<RunReport> {
        let start = Instant::now();

        self.print_execution_plan(pipeline, options);

        if options.dry_run {
            return Ok(RunReport {
                results: Vec::new(),
                duration: start.elapsed(),
            });
        }

        let executor = StepExecutor::new(self.runner.as_ref());
        let mut results = Vec::with_capacity(pipeline.len());

        for step in &pipeline.steps {
            println!("  {} {}", "→".blue(), step.name.bold());

            let outcome = match executor.execute(step).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    println!("  {} {} failed", "✗".red(), step.name.bold());
                    println!();
                    println!(
                        "{}",
                        format!("Pipeline failed after {:.2}s", start.elapsed().as_secs_f64())
                            .red()
                    );
                    return Err(e);
                }
            };

            match &outcome {
                StepOutcome::Ran(run) => println!(
                    "  {} {} ({:.2}s)",
                    "✓".green(),
                    step.name.bold(),
                    run.duration.as_secs_f64()
                ),
                StepOutcome::Skipped(unmet) => println!(
                    "  {} {} {}",
                    "○".dimmed(),
                    step.name.dimmed(),
                    format!("(skipped: {})", unmet).dimmed()
                ),
            }

            results.push((step.name.clone(), outcome));
        }

        let duration = start.elapsed();

        println!();
        println!(
            "{}",
            format!("Pipeline completed successfully in {:.2}s", duration.as_secs_f64()).green()
        );

        Ok(RunReport { results, duration })
    }

    /// Print the execution plan
    fn print_execution_plan(&self, pipeline: &Pipeline, options: &ExecutionOptions) {
        println!();
        println!(
            "Execution plan ({} step{}):",
            pipeline.len(),
            if pipeline.len() == 1 { "" } else { "s" }
        );
        println!();

        for (i, step) in pipeline.steps.iter().enumerate() {
            print!("  {}. {} ({})", i + 1, step.name.bold(), step.step_type);

            if let Err(unmet) = check_conditions(step) {
                print!(" {}", format!("[skip: {}]", unmet).dimmed());
            }

            println!();

            if options.verbose || options.dry_run {
                println!("     {}", step.command_line().dimmed());
            }
        }

        println!();
    }
}
