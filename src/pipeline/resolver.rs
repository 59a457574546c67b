// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Pipeline resolver
//!
//! Turns a rendered pipeline document into an ordered list of executable
//! steps by dispatching each record to the parser registered for its type.
//! Resolution is all-or-nothing: the first bad record fails the whole
//! document.

use std::collections::BTreeMap;

use serde_yaml::Value;

use crate::errors::{SteplineError, SteplineResult};
use crate::pipeline::{
    default_step_name, Pipeline, Step, StepRecord, StepRegistry, DEFAULT_STEP_TYPE,
};
use crate::template::{render_document, Environment};

/// Resolves pipeline documents against a step registry
pub struct PipelineResolver<'a> {
    registry: &'a StepRegistry,
}

impl<'a> PipelineResolver<'a> {
    pub fn new(registry: &'a StepRegistry) -> Self {
        Self { registry }
    }

    /// Resolve a rendered document into a pipeline
    pub fn resolve(&self, payload: &str) -> SteplineResult<Pipeline> {
        let records = parse_records(payload)?;

        let steps = records
            .iter()
            .map(|record| self.resolve_step(record))
            .collect::<SteplineResult<Vec<_>>>()?;

        Ok(Pipeline { steps })
    }

    /// Resolve a single record
    pub fn resolve_step(&self, record: &StepRecord) -> SteplineResult<Step> {
        let index = record.index();

        let name = record
            .field::<String>("name")
            .map_err(|e| e.for_index(index))?
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| default_step_name(index));

        let step_type = record
            .field::<String>("type")
            .map_err(|e| e.for_index(index))?
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_STEP_TYPE.to_string());

        let conditions: BTreeMap<String, String> = record
            .field_or_default("when")
            .map_err(|e| e.for_index(index))?;

        let parser = self.registry.get(&step_type).ok_or_else(|| {
            SteplineError::unknown_step_type(index, &step_type, &self.registry.types())
        })?;

        let mut step = parser.parse(record).map_err(|e| e.for_step(&name))?;

        tracing::debug!(
            index,
            name = %name,
            step_type = %step_type,
            command = %step.command_line(),
            "resolved step"
        );

        step.name = name;
        step.step_type = step_type;
        step.conditions = conditions;

        Ok(step)
    }
}

/// Split a rendered document into generic step records
///
/// An empty document, or one without `steps`, has no steps.
pub fn parse_records(payload: &str) -> SteplineResult<Vec<StepRecord>> {
    let document: Value = serde_yaml::from_str(payload).map_err(|e| {
        SteplineError::MalformedDocument {
            reason: e.to_string(),
        }
    })?;

    let root = match document {
        Value::Null => return Ok(vec![]),
        Value::Mapping(root) => root,
        other => {
            return Err(SteplineError::MalformedDocument {
                reason: format!("expected a mapping at the top level, found {}", kind(&other)),
            })
        }
    };

    let steps = match root.get("steps") {
        None | Some(Value::Null) => return Ok(vec![]),
        Some(Value::Sequence(steps)) => steps,
        Some(other) => {
            return Err(SteplineError::MalformedDocument {
                reason: format!("'steps' must be a list, found {}", kind(other)),
            })
        }
    };

    steps
        .iter()
        .enumerate()
        .map(|(index, step)| match step {
            Value::Mapping(fields) => Ok(StepRecord::new(index, fields.clone())),
            other => Err(SteplineError::MalformedDocument {
                reason: format!("step {} must be a mapping, found {}", index, kind(other)),
            }),
        })
        .collect()
}

/// Render a raw pipeline document and resolve it
pub fn load_pipeline(
    source: &str,
    env: &Environment,
    registry: &StepRegistry,
) -> SteplineResult<Pipeline> {
    let rendered = render_document(source, env)?;
    tracing::debug!(document = %rendered, "rendered pipeline document");

    PipelineResolver::new(registry).resolve(&rendered)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::ParserOptions;

    fn registry() -> StepRegistry {
        StepRegistry::with_builtins(&ParserOptions::default())
    }

    fn resolve(yaml: &str) -> SteplineResult<Pipeline> {
        PipelineResolver::new(&registry()).resolve(yaml)
    }

    #[test]
    fn test_resolve_preserves_order_and_defaults() {
        let pipeline = resolve(
            r#"
steps:
  - command: echo
    args: [one]
  - name: second
    command: echo
    args: [two]
  - type: command
    command: echo
    args: [three]
"#,
        )
        .unwrap();

        assert_eq!(pipeline.len(), 3);
        assert_eq!(pipeline.step_names(), vec!["step-0", "second", "step-2"]);
        assert!(pipeline.steps.iter().all(|s| s.step_type == "command"));
        assert_eq!(pipeline.steps[1].args, vec!["two"]);
    }

    #[test]
    fn test_resolve_docker_step() {
        let pipeline = resolve(
            r#"
steps:
  - type: docker
    image: alpine
    command: echo
    args: ["hi"]
"#,
        )
        .unwrap();

        let step = &pipeline.steps[0];
        assert_eq!(step.step_type, "docker");
        assert_eq!(step.command, "docker");
        assert_eq!(
            step.args,
            vec!["run", "-t", "--entrypoint=", "alpine", "echo", "hi"]
        );
    }

    #[test]
    fn test_docker_missing_image() {
        let err = resolve("steps:\n  - name: box\n    type: docker\n    command: echo").unwrap_err();
        assert!(matches!(
            err,
            SteplineError::MissingField { ref step, ref field } if step == "box" && field == "image"
        ));
    }

    #[test]
    fn test_unknown_step_type() {
        let err = resolve("steps:\n  - command: ls\n  - type: nonexistent").unwrap_err();
        match err {
            SteplineError::UnknownStepType { index, step_type, .. } => {
                assert_eq!(index, 1);
                assert_eq!(step_type, "nonexistent");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_conditions_from_when() {
        let pipeline = resolve(
            "steps:\n  - command: deploy\n    when:\n      BRANCH: main\n    env:\n      BRANCH: main\n",
        )
        .unwrap();

        let step = &pipeline.steps[0];
        assert_eq!(step.conditions.get("BRANCH").map(String::as_str), Some("main"));
    }

    #[test]
    fn test_invalid_name_and_when() {
        let err = resolve("steps:\n  - name: [a]\n    command: ls").unwrap_err();
        assert!(matches!(
            err,
            SteplineError::InvalidField { index: 0, ref field, .. } if field == "name"
        ));

        let err = resolve("steps:\n  - command: ls\n  - command: ls\n    when: [FOO]").unwrap_err();
        assert!(matches!(
            err,
            SteplineError::InvalidField { index: 1, ref field, .. } if field == "when"
        ));

        let err = resolve("steps:\n  - type: 7\n    command: ls").unwrap_err();
        assert!(matches!(
            err,
            SteplineError::InvalidField { index: 0, ref field, .. } if field == "type"
        ));
    }

    #[test]
    fn test_parser_type_mismatch_names_step() {
        let err = resolve("steps:\n  - name: build\n    command: make\n    env: [A]").unwrap_err();
        assert!(matches!(
            err,
            SteplineError::TypeMismatch { ref step, ref field, .. } if step == "build" && field == "env"
        ));
    }

    #[test]
    fn test_malformed_documents() {
        for doc in ["- a\n- b", "steps: 3", "steps:\n  - just-a-string", "steps: ["] {
            let err = resolve(doc).unwrap_err();
            assert!(
                matches!(err, SteplineError::MalformedDocument { .. }),
                "{doc:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_empty_document() {
        assert!(resolve("").unwrap().is_empty());
        assert!(resolve("steps:").unwrap().is_empty());
        assert!(resolve("other: 1").unwrap().is_empty());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let doc = r#"
steps:
  - command: env
    env: {B: "2", A: "1"}
    when: {A: "1"}
  - type: docker
    image: busybox
    command: "true"
"#;
        assert_eq!(resolve(doc).unwrap(), resolve(doc).unwrap());
    }

    #[test]
    fn test_load_pipeline_substitutes_environment() {
        let env: Environment = [("IMAGE", "alpine:3.19"), ("GREETING", "hello")]
            .into_iter()
            .collect();
        let source = r#"
steps:
  - name: greet
    type: docker
    image: ${IMAGE}
    command: echo
    args: ["{{upper "$GREETING"}}"]
"#;

        let pipeline = load_pipeline(source, &env, &registry()).unwrap();
        assert_eq!(
            pipeline.steps[0].args,
            vec!["run", "-t", "--entrypoint=", "alpine:3.19", "echo", "HELLO"]
        );
    }

    #[test]
    fn test_unset_variable_in_env_resolves_to_empty_value() {
        let source = "steps:\n  - name: deploy\n    command: ./deploy.sh\n    env:\n      BRANCH: ${BRANCH}\n    when:\n      BRANCH: main\n";

        let pipeline = load_pipeline(source, &Environment::default(), &registry()).unwrap();

        let step = &pipeline.steps[0];
        assert_eq!(step.env.get("BRANCH").map(String::as_str), Some(""));
        assert_eq!(step.conditions.get("BRANCH").map(String::as_str), Some("main"));
        assert!(!crate::pipeline::should_run(step));
    }

    #[test]
    fn test_unset_variable_in_args_resolves_to_empty_arg() {
        let source = "steps:\n  - command: echo\n    args:\n      - before\n      - ${FLAG}\n      - after\n";

        let pipeline = load_pipeline(source, &Environment::default(), &registry()).unwrap();

        assert_eq!(pipeline.steps[0].args, vec!["before", "", "after"]);
    }
}
