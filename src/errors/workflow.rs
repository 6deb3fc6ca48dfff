// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::workflow::WorkflowState;
use thiserror::Error;

/// Illegal edits and state transitions on a workflow definition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("workflow '{name}' is published; clone it into a new draft to edit")]
    Published { name: String },

    #[error("step index {index} out of range for a workflow with {len} steps")]
    StepOutOfRange { index: usize, len: usize },

    #[error("workflow '{name}' must be validated before publishing (state: {state})")]
    NotValidated { name: String, state: WorkflowState },
}
