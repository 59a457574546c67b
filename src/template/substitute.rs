// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Shell-style variable substitution
//!
//! Supported forms:
//!
//! - `$VAR` and `${VAR}`
//! - `${VAR:-default}` and `${VAR:=default}` use `default` when `VAR` is
//!   unset or empty
//! - `${VAR-default}` and `${VAR=default}` use `default` only when `VAR`
//!   is unset
//! - `${#VAR}` is the length of the value in characters
//! - `${VAR^}`, `${VAR^^}`, `${VAR,}`, `${VAR,,}` change case of the first
//!   or of every character
//! - `${VAR#prefix}`, `${VAR##prefix}`, `${VAR%suffix}`, `${VAR%%suffix}`
//!   strip a literal prefix or suffix
//! - `${VAR/from/to}` replaces the first match, `${VAR//from/to}` every
//!   match, `${VAR/#from/to}` a leading match, `${VAR/%from/to}` a
//!   trailing match
//! - `${VAR:offset}` and `${VAR:offset:length}` take a substring
//! - `$$` for a literal `$`
//!
//! Unset variables expand to the empty string. Assignment forms do not
//! write back to the environment. Patterns are literal text, not globs.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::errors::{SteplineError, SteplineResult};

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"\$\$|\$\{(#?)([A-Za-z_][A-Za-z0-9_]*)([^}\n]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)",
        )
        .expect("substitution pattern is valid")
    })
}

/// Substitute variable references in `input` using `lookup`
pub fn substitute<'a, F>(input: &str, lookup: F) -> SteplineResult<String>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut out = String::with_capacity(input.len());
    let mut last = 0;

    for caps in pattern().captures_iter(input) {
        let Some(whole) = caps.get(0) else { continue };

        check_literal(input, last, whole.start())?;
        out.push_str(&input[last..whole.start()]);

        let expanded = expand(&caps, &lookup).map_err(|reason| SteplineError::Template {
            message: format!(
                "bad substitution '{}' on line {}: {}",
                whole.as_str(),
                line_of(input, whole.start()),
                reason
            ),
            help: None,
        })?;
        out.push_str(&expanded);
        last = whole.end();
    }

    check_literal(input, last, input.len())?;
    out.push_str(&input[last..]);

    Ok(out)
}

fn expand<'a, F>(caps: &Captures<'_>, lookup: &F) -> Result<String, String>
where
    F: Fn(&str) -> Option<&'a str>,
{
    if let Some(name) = caps.get(4) {
        return Ok(lookup(name.as_str()).unwrap_or_default().to_string());
    }

    let Some(name) = caps.get(2) else {
        // `$$`
        return Ok("$".to_string());
    };

    let raw = lookup(name.as_str());
    let value = raw.unwrap_or_default();
    let op = caps.get(3).map(|m| m.as_str()).unwrap_or_default();

    if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
        return if op.is_empty() {
            Ok(value.chars().count().to_string())
        } else {
            Err("length takes no operator".to_string())
        };
    }

    apply(value, raw.is_some(), op)
}

/// Apply the operator text that follows the variable name
fn apply(value: &str, is_set: bool, op: &str) -> Result<String, String> {
    if op.is_empty() {
        return Ok(value.to_string());
    }

    if let Some(default) = op.strip_prefix(":-").or_else(|| op.strip_prefix(":=")) {
        return Ok(if value.is_empty() { default } else { value }.to_string());
    }
    if let Some(default) = op.strip_prefix('-').or_else(|| op.strip_prefix('=')) {
        return Ok(if is_set { value } else { default }.to_string());
    }

    match op {
        "^^" => return Ok(value.to_uppercase()),
        ",," => return Ok(value.to_lowercase()),
        "^" => return Ok(map_first(value, |c| c.to_uppercase().collect())),
        "," => return Ok(map_first(value, |c| c.to_lowercase().collect())),
        _ => {}
    }

    if let Some(prefix) = op.strip_prefix("##").or_else(|| op.strip_prefix('#')) {
        return Ok(value.strip_prefix(prefix).unwrap_or(value).to_string());
    }
    if let Some(suffix) = op.strip_prefix("%%").or_else(|| op.strip_prefix('%')) {
        return Ok(value.strip_suffix(suffix).unwrap_or(value).to_string());
    }

    if let Some(rest) = op.strip_prefix('/') {
        return Ok(replace(value, rest));
    }

    if let Some(range) = op.strip_prefix(':') {
        return substring(value, range);
    }

    Err(format!("unsupported operator '{}'", op))
}

fn map_first(value: &str, f: impl Fn(char) -> String) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => f(first) + chars.as_str(),
        None => String::new(),
    }
}

/// `from/to` after the leading `/`, with the `/`, `#` and `%` anchors
fn replace(value: &str, spec: &str) -> String {
    let (mode, spec) = match spec.chars().next() {
        Some(c @ ('/' | '#' | '%')) => (Some(c), &spec[1..]),
        _ => (None, spec),
    };
    let (from, to) = spec.split_once('/').unwrap_or((spec, ""));

    if from.is_empty() {
        return value.to_string();
    }

    match mode {
        Some('/') => value.replace(from, to),
        Some('#') => match value.strip_prefix(from) {
            Some(rest) => format!("{}{}", to, rest),
            None => value.to_string(),
        },
        Some('%') => match value.strip_suffix(from) {
            Some(rest) => format!("{}{}", rest, to),
            None => value.to_string(),
        },
        _ => value.replacen(from, to, 1),
    }
}

/// `offset` or `offset:length`, both counted in characters
fn substring(value: &str, range: &str) -> Result<String, String> {
    let (offset, length) = match range.split_once(':') {
        Some((offset, length)) => (offset, Some(length)),
        None => (range, None),
    };

    let offset: usize = offset
        .trim()
        .parse()
        .map_err(|_| format!("offset '{}' is not a number", offset))?;
    let length = match length {
        Some(length) => Some(
            length
                .trim()
                .parse::<usize>()
                .map_err(|_| format!("length '{}' is not a number", length))?,
        ),
        None => None,
    };

    let rest = value.chars().skip(offset);
    Ok(match length {
        Some(length) => rest.take(length).collect(),
        None => rest.collect(),
    })
}

fn line_of(input: &str, offset: usize) -> usize {
    input[..offset].matches('\n').count() + 1
}

/// Reject `${` sequences the pattern did not consume
fn check_literal(input: &str, start: usize, end: usize) -> SteplineResult<()> {
    if let Some(offset) = input[start..end].find("${") {
        return Err(SteplineError::Template {
            message: format!(
                "invalid or unterminated variable reference on line {}",
                line_of(input, start + offset)
            ),
            help: Some("Variable references look like ${NAME} or ${NAME:-default}; use $$ for a literal $".into()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env() -> HashMap<&'static str, &'static str> {
        HashMap::from([("HOME", "/home/ci"), ("EMPTY", ""), ("TAG", "v1")])
    }

    fn run(input: &str) -> SteplineResult<String> {
        let env = env();
        substitute(input, |name| env.get(name).copied())
    }

    #[test]
    fn test_braced_and_bare_variables() {
        assert_eq!(run("${HOME}/bin:$TAG").unwrap(), "/home/ci/bin:v1");
    }

    #[test]
    fn test_unset_variable_is_empty() {
        assert_eq!(run("x${MISSING}y$MISSING").unwrap(), "xy");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(run("${MISSING:-dflt}").unwrap(), "dflt");
        assert_eq!(run("${EMPTY:-dflt}").unwrap(), "dflt");
        assert_eq!(run("${EMPTY-dflt}").unwrap(), "");
        assert_eq!(run("${MISSING-dflt}").unwrap(), "dflt");
        assert_eq!(run("${TAG:-dflt}").unwrap(), "v1");
    }

    #[test]
    fn test_assignment_defaults() {
        assert_eq!(run("${MISSING:=dflt}").unwrap(), "dflt");
        assert_eq!(run("${EMPTY:=dflt}").unwrap(), "dflt");
        assert_eq!(run("${EMPTY=dflt}").unwrap(), "");
        assert_eq!(run("${MISSING=dflt}").unwrap(), "dflt");
        assert_eq!(run("${TAG:=dflt}").unwrap(), "v1");
    }

    #[test]
    fn test_length() {
        assert_eq!(run("${#HOME}").unwrap(), "8");
        assert_eq!(run("${#MISSING}").unwrap(), "0");
    }

    #[test]
    fn test_case_operators() {
        let env = HashMap::from([("NAME", "hello World")]);
        let run = |input: &str| substitute(input, |name| env.get(name).copied()).unwrap();

        assert_eq!(run("${NAME^^}"), "HELLO WORLD");
        assert_eq!(run("${NAME,,}"), "hello world");
        assert_eq!(run("${NAME^}"), "Hello World");
        assert_eq!(run("${TAG^}"), "");
    }

    #[test]
    fn test_prefix_and_suffix_removal() {
        let env = HashMap::from([("FILE", "release.tar.gz"), ("REF", "refs/heads/main")]);
        let run = |input: &str| substitute(input, |name| env.get(name).copied()).unwrap();

        assert_eq!(run("${REF#refs/heads/}"), "main");
        assert_eq!(run("${REF##refs/}"), "heads/main");
        assert_eq!(run("${FILE%.gz}"), "release.tar");
        assert_eq!(run("${FILE%%.zip}"), "release.tar.gz");
    }

    #[test]
    fn test_replacement() {
        let env = HashMap::from([("PATHS", "a-b-c")]);
        let run = |input: &str| substitute(input, |name| env.get(name).copied()).unwrap();

        assert_eq!(run("${PATHS/-/_}"), "a_b-c");
        assert_eq!(run("${PATHS//-/_}"), "a_b_c");
        assert_eq!(run("${PATHS/#a/x}"), "x-b-c");
        assert_eq!(run("${PATHS/%c/z}"), "a-b-z");
        assert_eq!(run("${PATHS/-}"), "ab-c");
    }

    #[test]
    fn test_substring() {
        assert_eq!(run("${HOME:1}").unwrap(), "home/ci");
        assert_eq!(run("${HOME:1:4}").unwrap(), "home");
        assert_eq!(run("${TAG:5}").unwrap(), "");
    }

    #[test]
    fn test_unsupported_operator_is_error() {
        let err = run("steps:\n  - args: [\"${TAG@Q}\"]").unwrap_err();
        assert!(matches!(err, SteplineError::Template { .. }));
        assert!(err.to_string().contains("line 2"));

        assert!(run("${TAG:x}").is_err());
        assert!(run("${#TAG:-x}").is_err());
    }

    #[test]
    fn test_escaped_dollar() {
        assert_eq!(run("cost: $$5 and $${TAG}").unwrap(), "cost: $5 and ${TAG}");
    }

    #[test]
    fn test_lone_dollar_is_literal() {
        assert_eq!(run("echo $ 1").unwrap(), "echo $ 1");
    }

    #[test]
    fn test_unterminated_reference_reports_line() {
        let err = run("steps:\n  - name: ${TAG").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
