// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Error types
//!
//! Resolution errors carry the offending step's index or resolved name so
//! the user can find the record in the pipeline document.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for stepline operations
pub type SteplineResult<T> = Result<T, SteplineError>;

/// Main error type for stepline
#[derive(Error, Debug, Diagnostic)]
pub enum SteplineError {
    // ─────────────────────────────────────────────────────────────────────────
    // Document Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Malformed pipeline document: {reason}")]
    #[diagnostic(
        code(stepline::malformed_document),
        help("A pipeline document is a mapping with a 'steps' key holding a list of step mappings")
    )]
    MalformedDocument { reason: String },

    #[error("Template error: {message}")]
    #[diagnostic(code(stepline::template))]
    Template {
        message: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Step Resolution Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Step {index}: invalid value for '{field}': {reason}")]
    #[diagnostic(code(stepline::invalid_field))]
    InvalidField {
        index: usize,
        field: String,
        reason: String,
    },

    #[error("Step {index}: unable to find parser for step type '{step_type}'")]
    #[diagnostic(code(stepline::unknown_step_type))]
    UnknownStepType {
        index: usize,
        step_type: String,
        #[help]
        help: Option<String>,
    },

    #[error("Step '{step}': missing required field '{field}'")]
    #[diagnostic(
        code(stepline::missing_field),
        help("Add a non-empty '{field}' to the step")
    )]
    MissingField { step: String, field: String },

    #[error("Step '{step}': field '{field}' has the wrong type: {reason}")]
    #[diagnostic(code(stepline::type_mismatch))]
    TypeMismatch {
        step: String,
        field: String,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Execution Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Step '{step}' failed: {reason}")]
    #[diagnostic(code(stepline::step_failed))]
    StepFailed {
        step: String,
        reason: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(stepline::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("JSON error: {message}")]
    #[diagnostic(code(stepline::json_error))]
    Json { message: String },
}

impl From<serde_json::Error> for SteplineError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<handlebars::RenderError> for SteplineError {
    fn from(e: handlebars::RenderError) -> Self {
        Self::Template {
            message: e.to_string(),
            help: Some("Check the {{ ... }} expressions in the pipeline file".into()),
        }
    }
}

/// Error produced while decoding a generic step record into a typed shape
///
/// Parsers return this; the resolver attaches the step index or name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("field '{field}': {reason}")]
    TypeMismatch { field: String, reason: String },
}

impl DecodeError {
    pub fn missing(field: &str) -> Self {
        Self::MissingField { field: field.to_string() }
    }

    /// Name of the field this error refers to
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field } | Self::TypeMismatch { field, .. } => field,
        }
    }

    /// Attach the resolved step name, producing a resolution error
    pub fn for_step(self, step: &str) -> SteplineError {
        match self {
            Self::MissingField { field } => SteplineError::MissingField {
                step: step.to_string(),
                field,
            },
            Self::TypeMismatch { field, reason } => SteplineError::TypeMismatch {
                step: step.to_string(),
                field,
                reason,
            },
        }
    }

    /// Attach the step index for one of the resolver-owned fields
    /// (`name`, `type`, `when`)
    pub fn for_index(self, index: usize) -> SteplineError {
        let field = self.field().to_string();
        let reason = match self {
            Self::MissingField { .. } => "value is required".to_string(),
            Self::TypeMismatch { reason, .. } => reason,
        };
        SteplineError::InvalidField { index, field, reason }
    }
}

impl SteplineError {
    /// Create a step failure from a non-zero exit status
    pub fn step_exited(step: &str, command: &str, exit_code: Option<i32>) -> Self {
        let reason = match exit_code {
            Some(code) => format!("'{}' exited with status {}", command, code),
            None => format!("'{}' was terminated by a signal", command),
        };
        Self::StepFailed {
            step: step.to_string(),
            reason,
            help: None,
        }
    }

    /// Create a step failure for a process that could not be started
    pub fn step_spawn_failed(step: &str, command: &str, error: &str) -> Self {
        Self::StepFailed {
            step: step.to_string(),
            reason: error.to_string(),
            help: Some(format!(
                "Check that '{}' is installed and in your PATH",
                command
            )),
        }
    }

    /// Create an unknown step type error listing the registered types
    pub fn unknown_step_type(index: usize, step_type: &str, known: &[&str]) -> Self {
        let help = if known.is_empty() {
            None
        } else {
            Some(format!("Registered step types: {}", known.join(", ")))
        };
        Self::UnknownStepType {
            index,
            step_type: step_type.to_string(),
            help,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_for_step_keeps_field() {
        let err = DecodeError::missing("image").for_step("build");
        match err {
            SteplineError::MissingField { step, field } => {
                assert_eq!(step, "build");
                assert_eq!(field, "image");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_error_for_index_is_invalid_field() {
        let err = DecodeError::TypeMismatch {
            field: "name".into(),
            reason: "expected a string".into(),
        }
        .for_index(3);

        assert!(matches!(
            err,
            SteplineError::InvalidField { index: 3, ref field, .. } if field == "name"
        ));
        assert!(err.to_string().contains("Step 3"));
    }

    #[test]
    fn test_step_exited_message() {
        let err = SteplineError::step_exited("test", "make", Some(2));
        assert_eq!(err.to_string(), "Step 'test' failed: 'make' exited with status 2");
    }

    #[test]
    fn test_unknown_step_type_help_lists_types() {
        let err = SteplineError::unknown_step_type(1, "nope", &["command", "docker"]);
        match err {
            SteplineError::UnknownStepType { help, .. } => {
                assert_eq!(help.as_deref(), Some("Registered step types: command, docker"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
