// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

/// Why a single parameter value was rejected by its declared constraint.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterViolation {
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} outside [{min}, {max}]")]
    OutOfRange { value: f64, min: String, max: String },

    #[error("'{value}' is not one of [{}]", choices.join(", "))]
    NotAChoice { value: String, choices: Vec<String> },
}

/// A workflow that cannot run against the active registry.
///
/// Raised before execution begins; a run never produces one mid-way.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("step {step_index}: unknown component '{component}'")]
    UnknownComponent { step_index: usize, component: String },

    #[error("step {step_index}: component name '{component}' is ambiguous, candidates: {}", candidates.join(", "))]
    AmbiguousComponent {
        step_index: usize,
        component: String,
        candidates: Vec<String>,
    },

    #[error("step {step_index}: parameter '{parameter}' of '{component}' is invalid: {violation}")]
    InvalidParameter {
        step_index: usize,
        component: String,
        parameter: String,
        violation: ParameterViolation,
    },

    #[error("step {step_index}: required parameter '{parameter}' of '{component}' is missing")]
    MissingParameter {
        step_index: usize,
        component: String,
        parameter: String,
    },

    #[error("step {step_index}: '{component}' declares no parameter named '{parameter}'")]
    UnknownParameter {
        step_index: usize,
        component: String,
        parameter: String,
    },

    #[error("step {step_index}: coregistration component '{component}' needs a reference image")]
    MissingReference { step_index: usize, component: String },
}

impl ValidationError {
    pub fn step_index(&self) -> usize {
        match self {
            ValidationError::UnknownComponent { step_index, .. }
            | ValidationError::AmbiguousComponent { step_index, .. }
            | ValidationError::InvalidParameter { step_index, .. }
            | ValidationError::MissingParameter { step_index, .. }
            | ValidationError::UnknownParameter { step_index, .. }
            | ValidationError::MissingReference { step_index, .. } => *step_index,
        }
    }
}

/// Every validation error found in one pass, in step order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowest step index that failed validation.
    pub fn first_step(&self) -> Option<usize> {
        self.0.iter().map(ValidationError::step_index).min()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Workflow validation failed:")?;
        for error in &self.0 {
            write!(f, "\n  {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}
