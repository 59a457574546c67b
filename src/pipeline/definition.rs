// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Resolved pipeline structures
//!
//! These are the executable forms produced by the resolver. The document
//! schema itself is open-ended, since each step type decodes its own fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Step type used when a record has no `type`
pub const DEFAULT_STEP_TYPE: &str = "command";

/// An ordered list of resolved steps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Steps in execution order
    pub steps: Vec<Step>,
}

impl Pipeline {
    /// Get all step names
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// A single executable step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Step name (`step-<index>` when not given)
    pub name: String,

    /// Step type tag that selected the parser
    #[serde(rename = "type")]
    pub step_type: String,

    /// Executable name or path
    pub command: String,

    /// Positional arguments
    #[serde(default)]
    pub args: Vec<String>,

    /// Complete environment of the child process
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Required `KEY: value` equalities against `env`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conditions: BTreeMap<String, String>,
}

impl Step {
    /// Create a step running `command` with `args`
    pub fn command(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            ..Self::default()
        }
    }

    /// Set the step environment
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Command line for display
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Default name for the step at `index`
pub fn default_step_name(index: usize) -> String {
    format!("step-{}", index)
}
