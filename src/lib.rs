// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! # stepline - Sequential Command Pipelines
//!
//! `stepline` runs a YAML list of steps, one after another, stopping at the
//! first failure.
//!
//! ## Features
//!
//! - **Templated documents** - `${VAR}` substitution from the environment,
//!   then a `{{ ... }}` template pass with string helpers
//! - **Pluggable step types** - each `type` tag maps to a parser in a
//!   [`StepRegistry`]; `command` and `docker` are built in
//! - **Run conditions** - `when:` entries gate a step on its own environment
//! - **Hermetic environments** - a step sees only the `env` it declares
//!
//! ## Quick Start
//!
//! ```yaml
//! steps:
//!   - name: build
//!     command: make
//!     args: [release]
//!   - type: docker
//!     image: alpine:${ALPINE_VERSION:-3.19}
//!     command: echo
//!     args: ["done"]
//!   - name: deploy
//!     command: ./deploy.sh
//!     env:
//!       BRANCH: ${BRANCH}
//!     when:
//!       BRANCH: main
//! ```
//!
//! ```bash
//! stepline pipeline.yaml
//! ```

pub mod cli;
pub mod errors;
pub mod parsers;
pub mod pipeline;
pub mod runner;
pub mod template;
pub mod utils;

// Re-export commonly used types
pub use errors::{DecodeError, SteplineError, SteplineResult};
pub use pipeline::{
    load_pipeline, Pipeline, PipelineExecutor, PipelineResolver, Step, StepParser, StepRecord,
    StepRegistry,
};
pub use runner::{Invocation, ProcessRunner, SystemRunner};
pub use template::Environment;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
