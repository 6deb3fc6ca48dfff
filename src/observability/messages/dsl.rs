// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for workflow text compilation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Workflow text compiled into a definition.
///
/// # Log Level
/// `debug!`
pub struct WorkflowCompiled<'a> {
    pub workflow: &'a str,
    pub step_count: usize,
    pub opaque_keys: usize,
}

impl Display for WorkflowCompiled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compiled workflow '{}' with {} steps",
            self.workflow, self.step_count
        )
    }
}

impl StructuredLog for WorkflowCompiled<'_> {
    fn log(&self) {
        tracing::debug!(
            workflow = self.workflow,
            step_count = self.step_count,
            opaque_keys = self.opaque_keys,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "dsl_compile",
            span_name = name,
            workflow = self.workflow,
            step_count = self.step_count,
        )
    }
}

/// Workflow text rejected.
///
/// # Log Level
/// `warn!`
pub struct WorkflowRejected<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for WorkflowRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Workflow text rejected: {}", self.error)
    }
}

impl StructuredLog for WorkflowRejected<'_> {
    fn log(&self) {
        tracing::warn!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("dsl_rejected", span_name = name)
    }
}
