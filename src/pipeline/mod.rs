// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Pipeline resolution and execution
//!
//! This module covers the path from a rendered pipeline document to
//! executed steps: generic records, the step type registry, the resolver,
//! run conditions and the executor.

mod condition;
mod definition;
mod executor;
mod record;
mod registry;
mod resolver;

pub use condition::{check_conditions, should_run, UnmetCondition};
pub use definition::*;
pub use executor::{ExecutionOptions, PipelineExecutor, RunReport, StepExecutor, StepOutcome};
pub use record::{FromRecord, StepRecord};
pub use registry::{StepParser, StepRegistry};
pub use resolver::{load_pipeline, parse_records, PipelineResolver};
