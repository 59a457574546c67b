// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Step type registry
//!
//! Maps a step's `type` tag to the parser that turns its record into an
//! executable [`Step`]. The registry is built once at startup and then only
//! read, so the resolver borrows it immutably.

use std::collections::HashMap;

use crate::errors::DecodeError;
use crate::parsers::{CommandParser, DockerParser, ParserOptions};
use crate::pipeline::{Step, StepRecord};

/// Converts a generic step record into an executable step
///
/// Parsers fill in `command`, `args` and `env`. The resolver sets `name`,
/// `step_type` and `conditions` afterwards.
pub trait StepParser: Send + Sync {
    fn parse(&self, record: &StepRecord) -> Result<Step, DecodeError>;
}

impl<F> StepParser for F
where
    F: Fn(&StepRecord) -> Result<Step, DecodeError> + Send + Sync,
{
    fn parse(&self, record: &StepRecord) -> Result<Step, DecodeError> {
        self(record)
    }
}

/// Registered step parsers by type tag
#[derive(Default)]
pub struct StepRegistry {
    parsers: HashMap<String, Box<dyn StepParser>>,
}

impl StepRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in `command` and `docker` types
    pub fn with_builtins(options: &ParserOptions) -> Self {
        let mut registry = Self::new();
        registry.register("command", CommandParser);
        registry.register("docker", DockerParser::new(&options.container_runtime));
        registry
    }

    /// Register a parser for `tag`, replacing any earlier one
    pub fn register(&mut self, tag: &str, parser: impl StepParser + 'static) {
        if self.parsers.insert(tag.to_string(), Box::new(parser)).is_some() {
            tracing::debug!(tag, "replaced step parser");
        }
    }

    /// Look up the parser for `tag`
    pub fn get(&self, tag: &str) -> Option<&dyn StepParser> {
        self.parsers.get(tag).map(|p| p.as_ref())
    }

    /// Registered type tags, sorted
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepRegistry")
            .field("types", &self.types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> StepRecord {
        StepRecord::new(0, serde_yaml::Mapping::new())
    }

    fn fixed(
        command: &'static str,
    ) -> impl Fn(&StepRecord) -> Result<Step, DecodeError> + Send + Sync {
        move |_| Ok(Step::command(command, vec![]))
    }

    #[test]
    fn test_builtins_registered() {
        let registry = StepRegistry::with_builtins(&ParserOptions::default());
        assert_eq!(registry.types(), vec!["command", "docker"]);
        assert!(registry.get("command").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_closure_parser() {
        let mut registry = StepRegistry::new();
        registry.register("noop", fixed("true"));

        let step = registry.get("noop").unwrap().parse(&record()).unwrap();
        assert_eq!(step.command, "true");
    }

    #[test]
    fn test_later_registration_replaces_earlier() {
        let mut registry = StepRegistry::new();
        registry.register("x", fixed("first"));
        registry.register("x", fixed("second"));

        let step = registry.get("x").unwrap().parse(&record()).unwrap();
        assert_eq!(step.command, "second");
        assert_eq!(registry.types(), vec!["x"]);
    }
}
