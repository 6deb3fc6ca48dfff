// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Checking steps against a registry snapshot.
//!
//! Every check accumulates errors instead of stopping at the first one, so a
//! caller sees all problems of a workflow in one pass.

use crate::errors::{ValidationError, ValidationErrors};
use crate::registry::{ComponentDescriptor, RegistrySnapshot, Resolution};
use crate::workflow::params::Parameters;
use crate::workflow::step::ProcessingStep;

/// A step bound to its component, with the parameters it will run with.
#[derive(Debug, Clone)]
pub struct ResolvedStep<'a> {
    pub index: usize,
    pub descriptor: &'a ComponentDescriptor,
    pub parameters: Parameters,
}

/// Coerce the values a step supplies, without filling defaults.
///
/// A component that declares no parameters accepts any values unchecked.
pub fn coerce_parameters(
    step_index: usize,
    descriptor: &ComponentDescriptor,
    given: &Parameters,
) -> Result<Parameters, Vec<ValidationError>> {
    if descriptor.parameters().is_empty() {
        return Ok(given.clone());
    }

    let mut coerced = Parameters::new();
    let mut errors = Vec::new();

    for (name, value) in given {
        match descriptor.parameter(name) {
            None => errors.push(ValidationError::UnknownParameter {
                step_index,
                component: descriptor.qualified_name().to_string(),
                parameter: name.clone(),
            }),
            Some(spec) => match spec.coerce(value) {
                Ok(value) => {
                    coerced.insert(name.clone(), value);
                }
                Err(violation) => errors.push(ValidationError::InvalidParameter {
                    step_index,
                    component: descriptor.qualified_name().to_string(),
                    parameter: name.clone(),
                    violation,
                }),
            },
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(errors)
    }
}

/// Effective parameters of a step: supplied values coerced, declared defaults
/// filled in, required parameters enforced.
pub fn resolve_parameters(
    step_index: usize,
    descriptor: &ComponentDescriptor,
    given: &Parameters,
) -> Result<Parameters, Vec<ValidationError>> {
    let (mut effective, mut errors) = match coerce_parameters(step_index, descriptor, given) {
        Ok(coerced) => (coerced, Vec::new()),
        Err(errors) => (Parameters::new(), errors),
    };

    for spec in descriptor.parameters() {
        if given.contains_key(&spec.name) {
            continue;
        }
        match &spec.default {
            Some(default) => match spec.coerce(default) {
                Ok(value) => {
                    effective.insert(spec.name.clone(), value);
                }
                Err(violation) => errors.push(ValidationError::InvalidParameter {
                    step_index,
                    component: descriptor.qualified_name().to_string(),
                    parameter: spec.name.clone(),
                    violation,
                }),
            },
            None if spec.required => errors.push(ValidationError::MissingParameter {
                step_index,
                component: descriptor.qualified_name().to_string(),
                parameter: spec.name.clone(),
            }),
            None => {}
        }
    }

    if errors.is_empty() {
        Ok(effective)
    } else {
        Err(errors)
    }
}

/// Look a step's component up in `snapshot`.
pub fn resolve_component<'a>(
    step_index: usize,
    step: &ProcessingStep,
    snapshot: &'a RegistrySnapshot,
) -> Result<&'a ComponentDescriptor, ValidationError> {
    match snapshot.resolve(&step.component) {
        Resolution::Found(descriptor) => Ok(descriptor),
        Resolution::Unknown => Err(ValidationError::UnknownComponent {
            step_index,
            component: step.component.clone(),
        }),
        Resolution::Ambiguous(candidates) => Err(ValidationError::AmbiguousComponent {
            step_index,
            component: step.component.clone(),
            candidates,
        }),
    }
}

/// Bind every step to its component and effective parameters.
pub fn resolve_steps<'a>(
    steps: &[ProcessingStep],
    snapshot: &'a RegistrySnapshot,
) -> Result<Vec<ResolvedStep<'a>>, ValidationErrors> {
    let mut resolved = Vec::with_capacity(steps.len());
    let mut errors = Vec::new();

    for (index, step) in steps.iter().enumerate() {
        let descriptor = match resolve_component(index, step, snapshot) {
            Ok(descriptor) => descriptor,
            Err(error) => {
                errors.push(error);
                continue;
            }
        };

        match resolve_parameters(index, descriptor, &step.parameters) {
            Ok(parameters) => resolved.push(ResolvedStep {
                index,
                descriptor,
                parameters,
            }),
            Err(step_errors) => errors.extend(step_errors),
        }
    }

    if errors.is_empty() {
        Ok(resolved)
    } else {
        Err(ValidationErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::ImageArray;
    use crate::registry::{scan, ComponentClass, Namespace};
    use crate::traits::Transform;
    use crate::workflow::{ParamValue, ParameterSpec};

    struct Noop;

    impl Transform for Noop {
        fn apply(
            &self,
            array: &ImageArray,
            _params: &Parameters,
            _progress: &dyn Fn(f64),
        ) -> anyhow::Result<ImageArray> {
            Ok(array.clone())
        }
    }

    fn snapshot() -> RegistrySnapshot {
        scan(&[Namespace::new("ns")
            .with(
                ComponentClass::transform("Median", Noop)
                    .parameter(ParameterSpec::int("kernel_size", Some(1), Some(15)).with_default(3))
                    .parameter(ParameterSpec::choice("mode", ["reflect", "wrap"]).required()),
            )
            .with(ComponentClass::transform("Free", Noop))
            .with(
                ComponentClass::transform("Gain", Noop)
                    .parameter(ParameterSpec::float("factor", Some(0.0), None).with_default(2)),
            )
            .with(
                ComponentClass::transform("Threshold", Noop)
                    .parameter(ParameterSpec::float("level", Some(0.0), Some(1.0)).with_default(5.0)),
            )])
    }

    fn params(pairs: &[(&str, ParamValue)]) -> Parameters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn resolve_fills_defaults() {
        let snapshot = snapshot();
        let descriptor = snapshot.get("ns.Median").unwrap();

        let effective =
            resolve_parameters(0, descriptor, &params(&[("mode", "wrap".into())])).unwrap();

        assert_eq!(effective["kernel_size"], ParamValue::Int(3));
        assert_eq!(effective["mode"], ParamValue::Str("wrap".to_string()));
    }

    #[test]
    fn resolve_accumulates_every_problem() {
        let snapshot = snapshot();
        let descriptor = snapshot.get("ns.Median").unwrap();

        let errors = resolve_parameters(
            2,
            descriptor,
            &params(&[("kernel_size", 99.into()), ("radius", 1.into())]),
        )
        .unwrap_err();

        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.step_index() == 2));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::MissingParameter { parameter, .. } if parameter == "mode")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnknownParameter { parameter, .. } if parameter == "radius")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidParameter { parameter, .. } if parameter == "kernel_size")));
    }

    #[test]
    fn declared_defaults_meet_their_own_constraints() {
        let snapshot = snapshot();

        let gain = snapshot.get("ns.Gain").unwrap();
        let effective = resolve_parameters(0, gain, &Parameters::new()).unwrap();
        assert_eq!(effective["factor"], ParamValue::Float(2.0));

        let threshold = snapshot.get("ns.Threshold").unwrap();
        let errors = resolve_parameters(4, threshold, &Parameters::new()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ValidationError::InvalidParameter { step_index: 4, parameter, .. } if parameter == "level"
        ));

        let given = params(&[("level", 0.5.into())]);
        assert!(resolve_parameters(0, threshold, &given).is_ok());
    }

    #[test]
    fn undeclared_parameters_pass_through() {
        let snapshot = snapshot();
        let descriptor = snapshot.get("ns.Free").unwrap();
        let given = params(&[("anything", true.into())]);

        assert_eq!(resolve_parameters(0, descriptor, &given).unwrap(), given);
    }

    #[test]
    fn resolve_steps_reports_unknown_components_by_index() {
        let snapshot = snapshot();
        let steps = vec![
            ProcessingStep::new("Free"),
            ProcessingStep::new("ns.Missing"),
            ProcessingStep::new("Free"),
        ];

        let errors = resolve_steps(&steps, &snapshot).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first_step(), Some(1));
    }
}
