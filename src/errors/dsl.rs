// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ValidationErrors;
use thiserror::Error;

/// Workflow text that cannot become a workflow definition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("malformed workflow document: {0}")]
    Malformed(String),

    #[error("workflow document is missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("step {step_index} has no 'component' reference")]
    MissingComponent { step_index: usize },

    #[error("field '{field}' is invalid: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("cannot read or write workflow file: {0}")]
    Io(String),
}

impl From<serde_yaml::Error> for ParseError {
    fn from(e: serde_yaml::Error) -> Self {
        match e.location() {
            Some(loc) => ParseError::Malformed(format!(
                "{} (line {}, column {})",
                e,
                loc.line(),
                loc.column()
            )),
            None => ParseError::Malformed(e.to_string()),
        }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        ParseError::Io(e.to_string())
    }
}

/// Failure of `compile_from_text`: either the document itself or a parameter
/// value that breaks its component's declared constraints.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}
