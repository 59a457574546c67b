// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Pipeline document templating
//!
//! A pipeline file is rendered in two passes before it is parsed: shell-style
//! variable substitution against the environment snapshot, then a template
//! pass for helpers and conditionals.

mod render;
mod substitute;

pub use render::TemplateRenderer;
pub use substitute::substitute;

use std::collections::BTreeMap;

use crate::errors::SteplineResult;

/// Snapshot of the invoking process environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Capture the current process environment
    pub fn capture() -> Self {
        std::env::vars().collect()
    }

    /// Look up a single variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Run both template passes over a raw pipeline document
pub fn render_document(source: &str, env: &Environment) -> SteplineResult<String> {
    let substituted = substitute(source, |name| env.get(name))?;
    TemplateRenderer::new().render(&substituted)
}
