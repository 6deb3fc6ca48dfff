// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Declarative text form of workflows.
//!
//! The text form is data only. It is what gets published, diffed and handed
//! to the headless runner. `compile_from_text(compile_to_text(w))` reproduces
//! `w`.

pub mod compiler;
pub mod document;

pub use compiler::DslCompiler;
pub use document::{StepDocument, WorkflowDocument};

use crate::errors::{CompileError, ParseError};
use crate::workflow::WorkflowDefinition;

/// [`DslCompiler::compile_to_text`] without a registry.
pub fn compile_to_text(workflow: &WorkflowDefinition) -> Result<String, ParseError> {
    DslCompiler::detached().compile_to_text(workflow)
}

/// [`DslCompiler::compile_from_text`] without a registry.
pub fn compile_from_text(text: &str) -> Result<WorkflowDefinition, CompileError> {
    DslCompiler::detached().compile_from_text(text)
}
