// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Process runners
//!
//! The executor hands each step to a [`ProcessRunner`] as an [`Invocation`].
//! [`SystemRunner`] spawns real processes; tests substitute a recorder.

mod system;

pub use system::SystemRunner;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;

use crate::pipeline::Step;

/// A process that could not be started
#[derive(Error, Debug)]
pub enum RunError {
    #[error("could not find '{command}' in PATH")]
    NotFound { command: String },

    #[error("could not start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// A fully specified process launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable name or path
    pub command: String,
    /// Positional arguments
    pub args: Vec<String>,
    /// The entire child environment
    pub env: BTreeMap<String, String>,
}

impl Invocation {
    /// Build the invocation for a step
    pub fn from_step(step: &Step) -> Self {
        Self {
            command: step.command.clone(),
            args: step.args.clone(),
            env: step.env.clone(),
        }
    }

    /// Environment as sorted `KEY=VALUE` lines
    pub fn env_lines(&self) -> Vec<String> {
        self.env
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect()
    }
}

/// Result of a process that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Exit code, `None` when killed by a signal
    pub exit_code: Option<i32>,
    /// Wall-clock duration
    pub duration: Duration,
}

impl RunOutcome {
    pub fn success(duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            duration,
        }
    }

    pub fn failure(exit_code: Option<i32>, duration: Duration) -> Self {
        Self {
            exit_code,
            duration,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a command to completion, forwarding its output
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `invocation` and wait for it to exit
    ///
    /// Returns an error only when the process could not be started; a
    /// non-zero exit is reported through [`RunOutcome`].
    async fn run(&self, invocation: &Invocation) -> Result<RunOutcome, RunError>;
}
