// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for workflow run lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Run start and terminal status (succeeded, failed, cancelled)
//! * Per-step start and completion with the device that produced the result

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Workflow run started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use grdk_core::observability::messages::engine::ExecutionStarted;
///
/// let msg = ExecutionStarted {
///     workflow: "sar-despeckle",
///     step_count: 3,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ExecutionStarted<'a> {
    pub workflow: &'a str,
    pub step_count: usize,
}

impl Display for ExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting workflow '{}': {} steps",
            self.workflow, self.step_count
        )
    }
}

impl StructuredLog for ExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            step_count = self.step_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution",
            span_name = name,
            workflow = self.workflow,
            step_count = self.step_count,
        )
    }
}

/// Workflow run succeeded.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExecutionCompleted<'a> {
    pub workflow: &'a str,
    pub step_count: usize,
    pub duration: Duration,
}

impl Display for ExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Workflow '{}' completed: {} steps in {:?}",
            self.workflow, self.step_count, self.duration
        )
    }
}

impl StructuredLog for ExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            step_count = self.step_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution_completed",
            span_name = name,
            workflow = self.workflow,
            duration = ?self.duration,
        )
    }
}

/// Workflow run halted by a failing step.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ExecutionFailed<'a> {
    pub workflow: &'a str,
    pub step_index: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for ExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Workflow '{}' failed at step {}: {}",
            self.workflow, self.step_index, self.error
        )
    }
}

impl StructuredLog for ExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            workflow = self.workflow,
            step_index = self.step_index,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "execution_failed",
            span_name = name,
            workflow = self.workflow,
            step_index = self.step_index,
        )
    }
}

/// Workflow run stopped at a step boundary after cancellation.
///
/// # Log Level
/// `info!`
pub struct ExecutionCancelled<'a> {
    pub workflow: &'a str,
    pub completed_steps: usize,
    pub step_count: usize,
}

impl Display for ExecutionCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Workflow '{}' cancelled after {}/{} steps",
            self.workflow, self.completed_steps, self.step_count
        )
    }
}

impl StructuredLog for ExecutionCancelled<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            completed_steps = self.completed_steps,
            step_count = self.step_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution_cancelled",
            span_name = name,
            workflow = self.workflow,
        )
    }
}

/// A step began.
///
/// # Log Level
/// `debug!`
pub struct StepStarted<'a> {
    pub workflow: &'a str,
    pub step_index: usize,
    pub component: &'a str,
}

impl Display for StepStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Step {} of '{}': running '{}'",
            self.step_index, self.workflow, self.component
        )
    }
}

impl StructuredLog for StepStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            workflow = self.workflow,
            step_index = self.step_index,
            component = self.component,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "step",
            span_name = name,
            step_index = self.step_index,
            component = self.component,
        )
    }
}

/// A step produced its result.
///
/// # Log Level
/// `debug!`
pub struct StepCompleted<'a> {
    pub step_index: usize,
    pub component: &'a str,
    pub device: &'a str,
    pub duration: Duration,
}

impl Display for StepCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Step {} ('{}') completed on {} in {:?}",
            self.step_index, self.component, self.device, self.duration
        )
    }
}

impl StructuredLog for StepCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            step_index = self.step_index,
            component = self.component,
            device = self.device,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "step_completed",
            span_name = name,
            step_index = self.step_index,
            device = self.device,
        )
    }
}
