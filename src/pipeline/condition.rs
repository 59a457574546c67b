// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Step run conditions
//!
//! A step's `when` entries are a conjunction of exact equalities against the
//! step's own resolved environment.

use std::fmt;

use crate::pipeline::Step;

/// The first condition that stopped a step from running
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmetCondition {
    pub key: String,
    pub expected: String,
    /// Value found in the step environment, `None` when unset
    pub actual: Option<String>,
}

impl fmt::Display for UnmetCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actual {
            Some(actual) => write!(
                f,
                "{} is '{}', expected '{}'",
                self.key, actual, self.expected
            ),
            None => write!(f, "{} is not set, expected '{}'", self.key, self.expected),
        }
    }
}

/// Check every condition of `step`, returning the first one not met
pub fn check_conditions(step: &Step) -> Result<(), UnmetCondition> {
    for (key, expected) in &step.conditions {
        let actual = step.env.get(key);
        if actual != Some(expected) {
            return Err(UnmetCondition {
                key: key.clone(),
                expected: expected.clone(),
                actual: actual.cloned(),
            });
        }
    }
    Ok(())
}

/// Whether `step` should run
pub fn should_run(step: &Step) -> bool {
    check_conditions(step).is_ok()
}
