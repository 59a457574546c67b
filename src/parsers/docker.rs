// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Docker step parser
//!
//! Expands a container step into a plain `docker run` command. The image
//! entrypoint is always cleared so the step's own command runs as given.

use std::collections::BTreeMap;

use crate::errors::DecodeError;
use crate::pipeline::{FromRecord, Step, StepParser, StepRecord};

/// Container runtime binary used when none is configured
pub const DEFAULT_CONTAINER_RUNTIME: &str = "docker";

/// Fields of a `docker` step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DockerStepConfig {
    pub image: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl FromRecord for DockerStepConfig {
    fn from_record(record: &StepRecord) -> Result<Self, DecodeError> {
        Ok(Self {
            image: record.field_or_default("image")?,
            command: record.field_or_default("command")?,
            args: record.field_or_default("args")?,
            env: record.field_or_default("env")?,
        })
    }
}

/// Parser for the `docker` step type
#[derive(Debug, Clone)]
pub struct DockerParser {
    runtime: String,
}

impl DockerParser {
    /// Create a parser that runs containers with `runtime`
    pub fn new(runtime: &str) -> Self {
        Self {
            runtime: runtime.to_string(),
        }
    }
}

impl Default for DockerParser {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAINER_RUNTIME)
    }
}

impl StepParser for DockerParser {
    fn parse(&self, record: &StepRecord) -> Result<Step, DecodeError> {
        let config = DockerStepConfig::from_record(record)?;

        if config.image.is_empty() {
            return Err(DecodeError::missing("image"));
        }

        let mut args = vec![
            "run".to_string(),
            "-t".to_string(),
            "--entrypoint=".to_string(),
            config.image,
            config.command,
        ];
        args.extend(config.args);

        Ok(Step::command(self.runtime.clone(), args).with_env(config.env))
    }
}
