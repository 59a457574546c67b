// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Built-in step parsers
//!
//! This module provides the parsers registered for the `command` and
//! `docker` step types.

mod command;
mod docker;

pub use command::{CommandParser, CommandStepConfig};
pub use docker::{DockerParser, DockerStepConfig, DEFAULT_CONTAINER_RUNTIME};

/// Options that shape the built-in parsers
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Binary used for `docker` steps
    pub container_runtime: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            container_runtime: DEFAULT_CONTAINER_RUNTIME.to_string(),
        }
    }
}
