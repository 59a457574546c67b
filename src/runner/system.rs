// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! System process runner
//!
//! Spawns the step command with exactly the step environment. Output goes
//! straight to this process's stdout and stderr.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

use super::{Invocation, ProcessRunner, RunError, RunOutcome};

/// Runs invocations as child processes
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner
    pub fn new() -> Self {
        Self
    }

    /// Locate the executable using the ambient PATH
    ///
    /// The child environment usually lacks PATH, so bare names are looked
    /// up here rather than by the child.
    fn locate(command: &str) -> Result<PathBuf, RunError> {
        if command.contains(std::path::MAIN_SEPARATOR) || command.contains('/') {
            return Ok(PathBuf::from(command));
        }

        which::which(command).map_err(|_| RunError::NotFound {
            command: command.to_string(),
        })
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<RunOutcome, RunError> {
        let program = Self::locate(&invocation.command)?;

        let start = Instant::now();

        let mut cmd = Command::new(&program);
        cmd.args(&invocation.args);
        cmd.env_clear();
        cmd.envs(&invocation.env);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        let status = cmd.status().await.map_err(|source| RunError::Spawn {
            command: invocation.command.clone(),
            source,
        })?;

        let duration = start.elapsed();

        if status.success() {
            Ok(RunOutcome::success(duration))
        } else {
            Ok(RunOutcome::failure(status.code(), duration))
        }
    }
}
