// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Command step parser
//!
//! Runs an executable directly.

use std::collections::BTreeMap;

use crate::errors::DecodeError;
use crate::pipeline::{FromRecord, Step, StepParser, StepRecord};

/// Fields of a `command` step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandStepConfig {
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl FromRecord for CommandStepConfig {
    fn from_record(record: &StepRecord) -> Result<Self, DecodeError> {
        Ok(Self {
            command: record.field_or_default("command")?,
            args: record.field_or_default("args")?,
            env: record.field_or_default("env")?,
        })
    }
}

/// Parser for the `command` step type
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandParser;

impl StepParser for CommandParser {
    fn parse(&self, record: &StepRecord) -> Result<Step, DecodeError> {
        let config = CommandStepConfig::from_record(record)?;

        if config.command.is_empty() {
            return Err(DecodeError::missing("command"));
        }

        Ok(Step::command(config.command, config.args).with_env(config.env))
    }
}
