// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::Utc;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::dsl::document::{StepDocument, WorkflowDocument};
use crate::errors::{CompileError, ParseError, ValidationErrors};
use crate::observability::messages::dsl::{WorkflowCompiled, WorkflowRejected};
use crate::observability::messages::StructuredLog;
use crate::registry::{RegistrySnapshot, Resolution};
use crate::workflow::{
    coerce_parameters, ProcessingStep, WorkflowDefinition, DEFAULT_VERSION, RESERVED_KEYS,
};

/// Translates between [`WorkflowDefinition`] and its YAML text form.
///
/// With a registry snapshot, step parameters are coerced to the types their
/// component declares while compiling, and constraint violations are reported
/// right away. A detached compiler keeps values exactly as written.
#[derive(Debug, Clone, Default)]
pub struct DslCompiler {
    registry: Option<Arc<RegistrySnapshot>>,
}

impl DslCompiler {
    pub fn new(registry: Arc<RegistrySnapshot>) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    pub fn detached() -> Self {
        Self { registry: None }
    }

    /// Canonical text for `workflow`.
    pub fn compile_to_text(&self, workflow: &WorkflowDefinition) -> Result<String, ParseError> {
        Ok(serde_yaml::to_string(&to_document(workflow))?)
    }

    /// Parse `text` into a draft-editable definition.
    ///
    /// Nothing is returned unless the whole document compiles.
    pub fn compile_from_text(&self, text: &str) -> Result<WorkflowDefinition, CompileError> {
        let result = self.compile_document(text);
        match &result {
            Ok(workflow) => WorkflowCompiled {
                workflow: workflow.name(),
                step_count: workflow.step_count(),
                opaque_keys: workflow.metadata().len(),
            }
            .log(),
            Err(error) => WorkflowRejected { error }.log(),
        }
        result
    }

    pub fn compile_file(&self, path: impl AsRef<Path>) -> Result<WorkflowDefinition, CompileError> {
        let text = fs::read_to_string(path.as_ref()).map_err(ParseError::from)?;
        self.compile_from_text(&text)
    }

    pub fn write_file(
        &self,
        workflow: &WorkflowDefinition,
        path: impl AsRef<Path>,
    ) -> Result<(), ParseError> {
        let text = self.compile_to_text(workflow)?;
        fs::write(path.as_ref(), text)?;
        Ok(())
    }

    fn compile_document(&self, text: &str) -> Result<WorkflowDefinition, CompileError> {
        let document: WorkflowDocument = serde_yaml::from_str(text).map_err(ParseError::from)?;

        let name = match document.name {
            None => return Err(ParseError::MissingField { field: "name" }.into()),
            Some(name) if name.trim().is_empty() => {
                return Err(ParseError::InvalidField {
                    field: "name".to_string(),
                    reason: "must not be empty".to_string(),
                }
                .into())
            }
            Some(name) => name,
        };

        let steps = document
            .steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| to_step(index, step))
            .collect::<Result<Vec<_>, _>>()?;
        let steps = self.coerce_steps(steps)?;

        let created = document.created.unwrap_or_else(Utc::now);
        let modified = document.modified.unwrap_or(created);

        Ok(WorkflowDefinition::from_parts(
            name,
            document
                .version
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            document.description.unwrap_or_default(),
            document.state.unwrap_or_default(),
            document.tags.unwrap_or_default(),
            steps,
            created,
            modified,
            document.metadata,
        ))
    }

    /// Coerce parameters of steps whose component resolves. Unresolved
    /// components are left for workflow validation to report.
    fn coerce_steps(&self, mut steps: Vec<ProcessingStep>) -> Result<Vec<ProcessingStep>, CompileError> {
        let Some(registry) = &self.registry else {
            return Ok(steps);
        };

        let mut errors = Vec::new();
        for (index, step) in steps.iter_mut().enumerate() {
            let Resolution::Found(descriptor) = registry.resolve(&step.component) else {
                continue;
            };
            match coerce_parameters(index, descriptor, &step.parameters) {
                Ok(coerced) => step.parameters = coerced,
                Err(step_errors) => errors.extend(step_errors),
            }
        }

        if errors.is_empty() {
            Ok(steps)
        } else {
            Err(ValidationErrors(errors).into())
        }
    }
}

fn to_step(index: usize, step: StepDocument) -> Result<ProcessingStep, ParseError> {
    let component = step
        .component
        .filter(|c| !c.trim().is_empty())
        .ok_or(ParseError::MissingComponent { step_index: index })?;

    Ok(ProcessingStep {
        component,
        version: step.version,
        label: step.label,
        parameters: step.parameters,
    })
}

fn to_document(workflow: &WorkflowDefinition) -> WorkflowDocument {
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

    WorkflowDocument {
        name: Some(workflow.name().to_string()),
        version: Some(workflow.version().to_string()),
        description: non_empty(workflow.description()),
        state: Some(workflow.state()),
        tags: (!workflow.tags().is_default()).then(|| workflow.tags().clone()),
        created: Some(workflow.created()),
        modified: Some(workflow.modified()),
        steps: workflow
            .steps()
            .iter()
            .map(|step| StepDocument {
                component: Some(step.component.clone()),
                version: step.version.clone(),
                label: step.label.clone(),
                parameters: step.parameters.clone(),
            })
            .collect(),
        metadata: workflow
            .metadata()
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::builtin_namespace;
    use crate::errors::ValidationError;
    use crate::registry::scan_shared;
    use crate::workflow::{step, ImageModality, ParamValue, WorkflowBuilder, WorkflowState};

    fn sample() -> WorkflowDefinition {
        WorkflowBuilder::new("sar-quicklook")
            .description("Gain, bias and clamp")
            .modality(ImageModality::Sar)
            .step(step("builtin.Scale").param("factor", 2.5))
            .step(step("builtin.Offset").label("bias").param("offset", -1.0))
            .step(
                step("builtin.Clip")
                    .version("1.0.0")
                    .param("low", 0.0)
                    .param("high", 10.0),
            )
            .step(step("third_party.Tagger").param("mode", "fast").param("passes", 3).param("keep", true))
            .build()
    }

    #[test]
    fn round_trip_reproduces_definition() {
        let compiler = DslCompiler::detached();
        let workflow = sample();

        let text = compiler.compile_to_text(&workflow).unwrap();
        let back = compiler.compile_from_text(&text).unwrap();

        assert_eq!(back, workflow);
    }

    #[test]
    fn round_trip_survives_metadata_named_like_fields() {
        let compiler = DslCompiler::detached();

        for key in RESERVED_KEYS {
            let workflow = WorkflowBuilder::new("sar-quicklook")
                .description("Gain only")
                .step(step("builtin.Scale").param("factor", 2.0))
                .metadata("author", serde_yaml::Value::String("ops".to_string()))
                .metadata(key, serde_yaml::Value::String("shadow".to_string()))
                .build();

            let text = compiler.compile_to_text(&workflow).unwrap();
            let back = compiler.compile_from_text(&text);

            assert_eq!(back.as_ref().ok(), Some(&workflow), "key '{}'", key);
        }
    }

    #[test]
    fn round_trip_with_registry_keeps_typed_values() {
        let compiler = DslCompiler::new(scan_shared(&[builtin_namespace()]));
        let workflow = sample();

        let text = compiler.compile_to_text(&workflow).unwrap();
        let back = compiler.compile_from_text(&text).unwrap();

        assert_eq!(back.steps(), workflow.steps());
        assert_eq!(back.name(), workflow.name());
    }

    #[test]
    fn text_form_is_canonical_across_authoring_styles() {
        let compiler = DslCompiler::detached();
        let built = sample();

        let mut manual = WorkflowDefinition::new(built.name());
        manual.set_description(built.description()).unwrap();
        manual.set_tags(built.tags().clone()).unwrap();
        for step in built.steps() {
            manual.add_step(step.clone()).unwrap();
        }

        let without_stamps = |text: String| {
            text.lines()
                .filter(|line| !line.starts_with("created:") && !line.starts_with("modified:"))
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(
            without_stamps(compiler.compile_to_text(&manual).unwrap()),
            without_stamps(compiler.compile_to_text(&built).unwrap())
        );
    }

    #[test]
    fn parse_errors() {
        struct TestCase {
            name: &'static str,
            text: &'static str,
            expected: ParseError,
        }

        let test_cases = vec![
            TestCase {
                name: "missing name",
                text: "steps:\n  - component: builtin.Scale\n",
                expected: ParseError::MissingField { field: "name" },
            },
            TestCase {
                name: "step without component",
                text: "name: w\nsteps:\n  - component: builtin.Scale\n  - label: orphan\n",
                expected: ParseError::MissingComponent { step_index: 1 },
            },
            TestCase {
                name: "blank component",
                text: "name: w\nsteps:\n  - component: ''\n",
                expected: ParseError::MissingComponent { step_index: 0 },
            },
        ];

        for test_case in test_cases {
            let result = DslCompiler::detached().compile_from_text(test_case.text);
            assert_eq!(
                result,
                Err(CompileError::Parse(test_case.expected)),
                "Test case '{}'",
                test_case.name
            );
        }
    }

    #[test]
    fn malformed_documents_are_rejected() {
        let cases = [
            "name: [unclosed",
            "- just\n- a list\n",
            "name: w\nsteps:\n  - component: a\n    paramters: {x: 1}\n",
            "name: w\nstate: archived\n",
        ];
        for text in cases {
            let result = DslCompiler::detached().compile_from_text(text);
            assert!(
                matches!(result, Err(CompileError::Parse(ParseError::Malformed(_)))),
                "expected malformed for {:?}, got {:?}",
                text,
                result
            );
        }
    }

    #[test]
    fn unknown_top_level_keys_are_preserved() {
        let text = "name: w\nlayout:\n  x: 10\n  y: 20\nauthor: ops\nsteps: []\n";
        let compiler = DslCompiler::detached();

        let workflow = compiler.compile_from_text(text).unwrap();

        assert_eq!(workflow.metadata().len(), 2);
        assert_eq!(
            workflow.metadata()["author"],
            serde_yaml::Value::String("ops".to_string())
        );

        let rewritten = compiler.compile_to_text(&workflow).unwrap();
        let again = compiler.compile_from_text(&rewritten).unwrap();
        assert_eq!(again.metadata(), workflow.metadata());
    }

    #[test]
    fn constraint_violations_surface_at_compile_time() {
        let compiler = DslCompiler::new(scan_shared(&[builtin_namespace()]));
        let text = "name: w\nsteps:\n  - component: builtin.Scale\n    parameters:\n      factor: 2\n  - component: builtin.Scale\n    parameters:\n      factor: fast\n";

        match compiler.compile_from_text(text) {
            Err(CompileError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(matches!(
                    &errors.0[0],
                    ValidationError::InvalidParameter { step_index: 1, parameter, .. } if parameter == "factor"
                ));
            }
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn integer_literals_become_floats_for_float_parameters() {
        let compiler = DslCompiler::new(scan_shared(&[builtin_namespace()]));
        let text = "name: w\nsteps:\n  - component: Scale\n    parameters:\n      factor: 2\n";

        let workflow = compiler.compile_from_text(text).unwrap();

        assert_eq!(workflow.steps()[0].parameters["factor"], ParamValue::Float(2.0));
    }

    #[test]
    fn defaults_for_optional_fields() {
        let workflow = DslCompiler::detached().compile_from_text("name: w\n").unwrap();

        assert_eq!(workflow.version(), DEFAULT_VERSION);
        assert_eq!(workflow.state(), WorkflowState::Draft);
        assert!(workflow.is_empty());
        assert_eq!(workflow.created(), workflow.modified());
    }

    #[test]
    fn file_helpers_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workflow.yaml");
        let compiler = DslCompiler::detached();
        let workflow = sample();

        compiler.write_file(&workflow, &path).unwrap();
        let back = compiler.compile_file(&path).unwrap();

        assert_eq!(back, workflow);
        assert!(matches!(
            compiler.compile_file(dir.path().join("missing.yaml")),
            Err(CompileError::Parse(ParseError::Io(_)))
        ));
    }
}
