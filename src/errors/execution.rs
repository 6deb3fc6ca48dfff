// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

/// Bucket a component failure falls into for logging.
///
/// Callers depend on the step index of an [`ExecutionError`], never on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Raised by the processing library's own error hierarchy.
    Library,
    /// Anything else.
    Generic,
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureClass::Library => write!(f, "library"),
            FailureClass::Generic => write!(f, "generic"),
        }
    }
}

/// A failed accelerated attempt. Absorbed by the dispatcher's CPU retry.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("transfer to {accelerator} failed: {reason}")]
    TransferIn { accelerator: String, reason: String },

    #[error("transfer from {accelerator} failed: {reason}")]
    TransferOut { accelerator: String, reason: String },

    #[error("accelerated invocation failed: {0:#}")]
    Invocation(anyhow::Error),

    #[error("component task did not complete: {0}")]
    Join(String),
}

/// A step whose entry point failed on its final execution path.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("step {step_index} ('{component}') failed: {cause}")]
pub struct ExecutionError {
    pub step_index: usize,
    pub component: String,
    pub class: FailureClass,
    /// Rendered cause chain of the underlying failure.
    pub cause: String,
}
